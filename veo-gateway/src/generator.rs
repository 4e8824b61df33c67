//! End-to-end video generation: validate, submit, poll, extract.

use std::sync::Arc;

use veo_gateway_types::api::GenerateRequest;

use crate::auth::{GoogleTokenSource, TokenSource};
use crate::config::GatewayConfig;
use crate::error::{Error, Result};
use crate::extract::{extract_video, VideoReference};
use crate::poller::{poll_until, PollOutcome, Sleeper, TokioSleeper};
use crate::predict::{ModelEndpoint, PredictionService, VertexPredictionService};
use crate::request::NormalizedRequest;

/// Sample video served in demo mode.
pub const DEMO_VIDEO_URL: &str =
    "https://sample-videos.com/video321/mp4/720/big_buck_bunny_720p_1mb.mp4";

pub(crate) const TIMEOUT_MESSAGE: &str = "Generation timed out or video missing";
pub(crate) const MISSING_PROJECT_MESSAGE: &str = "Missing GCP_PROJECT_ID";

/// Runs one video generation job per call. Holds no per-request state.
#[derive(Clone)]
pub struct VideoGenerator {
    config: Arc<GatewayConfig>,
    tokens: Arc<dyn TokenSource>,
    service: Arc<dyn PredictionService>,
    sleeper: Arc<dyn Sleeper>,
}

impl VideoGenerator {
    /// Generator wired to Google credentials, Vertex AI and real delays.
    ///
    /// # Errors
    /// Returns an error when the HTTP client cannot be built.
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let tokens = Arc::new(GoogleTokenSource::from_config(&config));
        let service = Arc::new(VertexPredictionService::new(&config)?);
        tracing::debug!(
            base_url = service.base_url(),
            service_account = tokens.uses_service_account(),
            max_wait = ?config.poll.max_wait(),
            "video generator configured"
        );
        Ok(Self::with_parts(config, tokens, service, Arc::new(TokioSleeper)))
    }

    /// Generator with explicit collaborators.
    pub fn with_parts(
        config: GatewayConfig,
        tokens: Arc<dyn TokenSource>,
        service: Arc<dyn PredictionService>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            tokens,
            service,
            sleeper,
        }
    }

    #[must_use]
    pub fn with_token_source(mut self, tokens: Arc<dyn TokenSource>) -> Self {
        self.tokens = tokens;
        self
    }

    #[must_use]
    pub fn with_prediction_service(mut self, service: Arc<dyn PredictionService>) -> Self {
        self.service = service;
        self
    }

    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Generate a video for `request`.
    ///
    /// # Errors
    /// - [`Error::InvalidRequest`] when neither prompt nor image is given
    /// - [`Error::InvalidConfig`] when no project id is configured
    /// - [`Error::Auth`] when no token can be obtained
    /// - [`Error::ApiError`] when the provider rejects the submission
    /// - [`Error::Timeout`] when the job does not finish with a usable video
    pub async fn generate(&self, request: GenerateRequest) -> Result<VideoReference> {
        let request = NormalizedRequest::from_request(request)?;
        if self.config.demo {
            tracing::info!("demo mode, returning sample video");
            return Ok(VideoReference::remote(DEMO_VIDEO_URL));
        }

        let project = self
            .config
            .project_id
            .as_deref()
            .ok_or_else(|| Error::InvalidConfig {
                message: MISSING_PROJECT_MESSAGE.into(),
            })?;
        let endpoint = ModelEndpoint::new(project, self.config.location.as_str(), request.model);
        tracing::debug!(
            model = request.model,
            has_prompt = request.prompt.is_some(),
            has_image = request.image.is_some(),
            camera = request.camera.as_deref(),
            style = request.style.as_deref(),
            "normalized generation request"
        );

        let token = self.tokens.access_token().await?;
        let operation_name = self.submit(&endpoint, &token, &request).await?;
        self.wait_for_video(&endpoint, &token, &operation_name).await
    }

    async fn submit(
        &self,
        endpoint: &ModelEndpoint,
        token: &str,
        request: &NormalizedRequest,
    ) -> Result<String> {
        let body = request.to_predict_request();
        let operation_name = self
            .service
            .predict_long_running(endpoint, token, &body)
            .await?;
        tracing::info!(
            operation = %operation_name,
            model = %endpoint.model,
            "submitted video generation job"
        );
        Ok(operation_name)
    }

    async fn wait_for_video(
        &self,
        endpoint: &ModelEndpoint,
        token: &str,
        operation_name: &str,
    ) -> Result<VideoReference> {
        let policy = self.config.poll;
        let outcome = poll_until(
            &policy,
            self.sleeper.as_ref(),
            |attempt| {
                tracing::debug!(
                    operation = %operation_name,
                    attempt,
                    max_attempts = policy.max_attempts,
                    "polling video generation"
                );
                self.service.fetch_operation(endpoint, token, operation_name)
            },
            |operation| operation.is_done(),
        )
        .await?;

        let operation = match outcome {
            PollOutcome::Done { value, attempts } => {
                tracing::info!(operation = %operation_name, attempts, "video generation finished");
                value
            }
            PollOutcome::TimedOut { attempts } => {
                tracing::warn!(operation = %operation_name, attempts, "video generation timed out");
                return Err(timeout_error());
            }
        };

        if let Some(error) = &operation.error {
            tracing::warn!(
                operation = %operation_name,
                code = error.code,
                message = error.message.as_deref().unwrap_or_default(),
                "operation finished with an error"
            );
        }
        match extract_video(&operation) {
            Some(video) => {
                tracing::debug!(
                    operation = %operation_name,
                    video = %video,
                    inline = video.is_inline(),
                    "extracted video"
                );
                Ok(video)
            }
            None => {
                tracing::warn!(operation = %operation_name, "finished operation has no usable video");
                Err(timeout_error())
            }
        }
    }
}

fn timeout_error() -> Error {
    Error::Timeout {
        message: TIMEOUT_MESSAGE.into(),
    }
}
