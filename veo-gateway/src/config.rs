//! Gateway configuration, read once at process start.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use crate::poller::PollPolicy;

/// Region used when `GCP_LOCATION` is unset.
pub const DEFAULT_LOCATION: &str = "us-central1";
/// Listen port used when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 3000;
/// Largest accepted request body; image data URLs make bodies large.
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;
/// OAuth scope requested for Vertex AI calls.
pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Serve the sample video without calling the provider.
    pub demo: bool,
    /// GCP project id; required outside demo mode.
    pub project_id: Option<String>,
    /// Vertex AI region.
    pub location: String,
    /// Service-account key JSON. `None` falls back to Application Default Credentials.
    pub service_account_json: Option<String>,
    /// Override of the provider base URL.
    pub base_url: Option<String>,
    /// OAuth scopes requested for the bearer token.
    pub auth_scopes: Vec<String>,
    /// Poll cadence and attempt budget.
    pub poll: PollPolicy,
    /// Per-call timeout for provider requests.
    pub http_timeout: Option<Duration>,
    /// Address the HTTP server binds to.
    pub listen_addr: SocketAddr,
    /// Request body size limit in bytes.
    pub max_body_bytes: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            demo: false,
            project_id: None,
            location: DEFAULT_LOCATION.to_string(),
            service_account_json: None,
            base_url: None,
            auth_scopes: vec![CLOUD_PLATFORM_SCOPE.to_string()],
            poll: PollPolicy::default(),
            http_timeout: None,
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl GatewayConfig {
    /// Build a configuration from environment variables.
    ///
    /// Blank values count as unset. Numbers that fail to parse keep their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self {
            demo: env_value("DEMO").is_some_and(|value| value == "true"),
            project_id: env_value("GCP_PROJECT_ID"),
            service_account_json: env_value("GCP_SERVICE_ACCOUNT_JSON"),
            base_url: env_value("VEO_API_BASE_URL"),
            ..Self::default()
        };
        if let Some(location) = env_value("GCP_LOCATION") {
            config.location = location;
        }
        if let Some(ms) = env_parse::<u64>("VEO_POLL_INTERVAL_MS") {
            config.poll.interval = Duration::from_millis(ms);
        }
        if let Some(attempts) = env_parse::<u32>("VEO_POLL_MAX_ATTEMPTS") {
            config.poll.max_attempts = attempts;
        }
        config.http_timeout = env_parse::<u64>("VEO_HTTP_TIMEOUT_SECS").map(Duration::from_secs);
        if let Some(limit) = env_parse::<usize>("VEO_MAX_BODY_BYTES") {
            config.max_body_bytes = limit;
        }

        let host = env_parse::<IpAddr>("HOST").unwrap_or(config.listen_addr.ip());
        let port = env_parse::<u16>("PORT").unwrap_or(DEFAULT_PORT);
        config.listen_addr = SocketAddr::new(host, port);
        config
    }

    /// Enable or disable demo mode.
    #[must_use]
    pub const fn with_demo(mut self, demo: bool) -> Self {
        self.demo = demo;
        self
    }

    /// Set the GCP project id.
    #[must_use]
    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    /// Set the Vertex AI region.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Set the service-account key JSON.
    #[must_use]
    pub fn with_service_account_json(mut self, json: impl Into<String>) -> Self {
        self.service_account_json = Some(json.into());
        self
    }

    /// Point provider calls at a custom base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Replace the poll policy.
    #[must_use]
    pub const fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    /// Set the per-call provider timeout.
    #[must_use]
    pub const fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = Some(timeout);
        self
    }

    /// Set the listen address.
    #[must_use]
    pub const fn with_listen_addr(mut self, addr: SocketAddr) -> Self {
        self.listen_addr = addr;
        self
    }

    /// Provider base URL, always ending in `/`.
    pub fn api_base_url(&self) -> String {
        self.base_url.as_deref().map_or_else(
            || format!("https://{}-aiplatform.googleapis.com/", self.location),
            normalize_base_url,
        )
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = env_value(key)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(variable = key, value = %raw, "ignoring unparsable environment value");
            None
        }
    }
}

fn normalize_base_url(base_url: &str) -> String {
    let mut value = base_url.trim().to_string();
    if !value.ends_with('/') {
        value.push('/');
    }
    value
}
