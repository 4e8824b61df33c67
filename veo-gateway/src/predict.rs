//! Vertex AI `predictLongRunning` / `fetchPredictOperation` transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::Client as HttpClient;
use veo_gateway_types::operations::{FetchPredictOperationRequest, VideoOperation};
use veo_gateway_types::predict::{PredictLongRunningRequest, PredictLongRunningResponse};

use crate::config::GatewayConfig;
use crate::error::{Error, Result};

const API_VERSION: &str = "v1";

/// Publisher model addressed by a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelEndpoint {
    pub project: String,
    pub location: String,
    pub model: String,
}

impl ModelEndpoint {
    pub fn new(
        project: impl Into<String>,
        location: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            location: location.into(),
            model: model.into(),
        }
    }

    /// Path of a model method, relative to the API base URL.
    pub fn method_path(&self, method: &str) -> String {
        format!(
            "{API_VERSION}/projects/{}/locations/{}/publishers/google/models/{}:{method}",
            self.project, self.location, self.model
        )
    }
}

/// Long-running prediction calls against the provider.
#[async_trait]
pub trait PredictionService: Send + Sync {
    /// Submit a job and return its operation name.
    ///
    /// # Errors
    /// A non-success status is returned as [`Error::ApiError`] with the body untouched.
    async fn predict_long_running(
        &self,
        endpoint: &ModelEndpoint,
        token: &str,
        body: &PredictLongRunningRequest,
    ) -> Result<String>;

    /// Fetch the current state of an operation.
    async fn fetch_operation(
        &self,
        endpoint: &ModelEndpoint,
        token: &str,
        operation_name: &str,
    ) -> Result<VideoOperation>;
}

/// [`PredictionService`] over HTTPS with `reqwest`.
#[derive(Debug, Clone)]
pub struct VertexPredictionService {
    http: HttpClient,
    base_url: String,
}

impl VertexPredictionService {
    /// # Errors
    /// Returns an error when the HTTP client cannot be built.
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        Ok(Self {
            http: build_http_client(config.http_timeout)?,
            base_url: config.api_base_url(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn method_url(&self, endpoint: &ModelEndpoint, method: &str) -> String {
        format!("{}{}", self.base_url, endpoint.method_path(method))
    }

    async fn post_json<B: serde::Serialize + Sync>(
        &self,
        url: String,
        token: &str,
        body: &B,
    ) -> Result<reqwest::Response> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
            Error::Auth {
                message: "Invalid access token".into(),
            }
        })?;
        auth.set_sensitive(true);
        Ok(self
            .http
            .post(url)
            .header(AUTHORIZATION, auth)
            .json(body)
            .send()
            .await?)
    }
}

#[async_trait]
impl PredictionService for VertexPredictionService {
    async fn predict_long_running(
        &self,
        endpoint: &ModelEndpoint,
        token: &str,
        body: &PredictLongRunningRequest,
    ) -> Result<String> {
        let url = self.method_url(endpoint, "predictLongRunning");
        let response = self.post_json(url, token, body).await?;
        if !response.status().is_success() {
            return Err(Error::ApiError {
                status: response.status().as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let created = response.json::<PredictLongRunningResponse>().await?;
        created
            .name
            .filter(|name| !name.is_empty())
            .ok_or_else(|| Error::Parse {
                message: "predictLongRunning response has no operation name".into(),
            })
    }

    async fn fetch_operation(
        &self,
        endpoint: &ModelEndpoint,
        token: &str,
        operation_name: &str,
    ) -> Result<VideoOperation> {
        let url = self.method_url(endpoint, "fetchPredictOperation");
        let body = FetchPredictOperationRequest::new(operation_name);
        let response = self.post_json(url, token, &body).await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            tracing::warn!(
                operation = %operation_name,
                status = status.as_u16(),
                "fetchPredictOperation returned a non-success status"
            );
        }
        serde_json::from_str(&text).map_err(|err| Error::Parse {
            message: format!(
                "Invalid operation status (status {}): {err}",
                status.as_u16()
            ),
        })
    }
}

fn build_http_client(timeout: Option<Duration>) -> Result<HttpClient> {
    let mut builder = HttpClient::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}
