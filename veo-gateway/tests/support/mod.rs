#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use wiremock::{MockServer, Request, Respond, ResponseTemplate};

use veo_gateway::server::router;
use veo_gateway::{GatewayConfig, PollPolicy, StaticTokenSource, VideoGenerator};

pub const MODEL_PREFIX: &str = "/v1/projects/proj/locations/loc/publishers/google/models";

pub fn predict_path(model: &str) -> String {
    format!("{MODEL_PREFIX}/{model}:predictLongRunning")
}

pub fn fetch_path(model: &str) -> String {
    format!("{MODEL_PREFIX}/{model}:fetchPredictOperation")
}

/// Config pointed at `server`, polling without delay.
pub fn live_config(server: &MockServer) -> GatewayConfig {
    GatewayConfig::default()
        .with_project_id("proj")
        .with_location("loc")
        .with_base_url(server.uri())
        .with_poll_policy(PollPolicy::new(Duration::ZERO, 60))
}

/// Start the gateway with a fixed bearer token and return its base URL.
pub async fn spawn_gateway(config: GatewayConfig) -> String {
    let generator = VideoGenerator::new(config)
        .unwrap()
        .with_token_source(Arc::new(StaticTokenSource::new("test-token")));
    spawn_generator(generator).await
}

pub async fn spawn_generator(generator: VideoGenerator) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(generator)).await.unwrap();
    });
    format!("http://{addr}")
}

/// Answers with `pending` until call `done_at`, then with `done`.
#[derive(Clone)]
pub struct SequenceResponder {
    pub calls: Arc<AtomicUsize>,
    pub done_at: usize,
    pub pending: ResponseTemplate,
    pub done: ResponseTemplate,
}

impl Respond for SequenceResponder {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let idx = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if idx >= self.done_at {
            self.done.clone()
        } else {
            self.pending.clone()
        }
    }
}
