use tracing_subscriber::EnvFilter;
use veo_gateway::{server, GatewayConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = GatewayConfig::from_env();
    if config.demo {
        tracing::warn!("DEMO=true, every request returns the sample video");
    } else if config.project_id.is_none() {
        tracing::warn!("GCP_PROJECT_ID is not set, /generate will answer 500");
    }
    server::serve(config).await?;
    Ok(())
}
