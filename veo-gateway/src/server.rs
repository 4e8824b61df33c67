//! HTTP surface: `/generate` and `/register`.

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{post, MethodRouter};
use axum::{middleware, Json, Router};
use serde::de::DeserializeOwned;
use veo_gateway_types::api::{GenerateRequest, GenerateResponse, RegisterRequest, RegisterResponse};

use crate::config::GatewayConfig;
use crate::error::{Error, Result};
use crate::generator::VideoGenerator;

const FALLBACK_ERROR_MESSAGE: &str = "Server error";

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub generator: VideoGenerator,
}

/// Build the router for a generator.
pub fn router(generator: VideoGenerator) -> Router {
    let body_limit = generator.config().max_body_bytes;
    let generate_route = with_preflight(post(generate));
    let register_route = with_preflight(post(register));
    Router::new()
        .route("/generate", generate_route.clone())
        .route("/api/generate-video", generate_route)
        .route("/register", register_route.clone())
        .route("/api/register", register_route)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::map_response(with_cors_headers))
        .with_state(AppState { generator })
}

/// Bind `config.listen_addr` and serve until Ctrl-C.
///
/// # Errors
/// Returns an error when the generator cannot be built or the listener fails.
pub async fn serve(config: GatewayConfig) -> Result<()> {
    let addr = config.listen_addr;
    let demo = config.demo;
    let generator = VideoGenerator::new(config)?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, demo, "veo-gateway listening");
    axum::serve(listener, router(generator))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("veo-gateway stopped");
    Ok(())
}

fn with_preflight(route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route.options(preflight).fallback(method_not_allowed)
}

async fn generate(
    State(state): State<AppState>,
    body: Bytes,
) -> std::result::Result<Json<GenerateResponse>, Error> {
    let request: GenerateRequest = parse_body(&body);
    let video = state.generator.generate(request).await?;
    Ok(Json(GenerateResponse {
        video_url: video.to_url(),
    }))
}

async fn register(body: Bytes) -> Json<RegisterResponse> {
    let request: RegisterRequest = parse_body(&body);
    tracing::debug!(has_email = request.email.is_some(), "registration received");
    Json(RegisterResponse::default())
}

async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn method_not_allowed() -> (StatusCode, &'static str) {
    (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
}

async fn with_cors_headers(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    response
}

/// Lenient body parsing: anything that is not a JSON object reads as empty.
fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> T {
    if body.is_empty() {
        return T::default();
    }
    serde_json::from_slice(body).unwrap_or_else(|err| {
        tracing::debug!(error = %err, "unparsable request body, treating as empty");
        T::default()
    })
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

impl Error {
    /// HTTP status reported to the caller.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            Self::ApiError { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Self::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Plain-text body reported to the caller.
    pub fn public_message(&self) -> String {
        let message = match self {
            Self::InvalidRequest { message }
            | Self::InvalidConfig { message }
            | Self::Auth { message }
            | Self::Timeout { message } => message.clone(),
            Self::ApiError { message, .. } => return message.clone(),
            other => other.to_string(),
        };
        if message.is_empty() {
            FALLBACK_ERROR_MESSAGE.to_string()
        } else {
            message
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            Self::ApiError { status, .. } => {
                tracing::warn!(status, "provider rejected the request");
            }
            Self::InvalidRequest { .. } | Self::Timeout { .. } => {
                tracing::warn!(error = %self, "generation failed");
            }
            _ => tracing::error!(error = %self, "generation failed"),
        }
        (status, self.public_message()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                Error::InvalidRequest {
                    message: "Missing prompt or image".into(),
                },
                400,
                "Missing prompt or image",
            ),
            (
                Error::InvalidConfig {
                    message: "Missing GCP_PROJECT_ID".into(),
                },
                500,
                "Missing GCP_PROJECT_ID",
            ),
            (
                Error::Auth {
                    message: "invalid_grant".into(),
                },
                500,
                "invalid_grant",
            ),
            (
                Error::ApiError {
                    status: 403,
                    message: "forbidden".into(),
                },
                403,
                "forbidden",
            ),
            (
                Error::Timeout {
                    message: "Generation timed out or video missing".into(),
                },
                504,
                "Generation timed out or video missing",
            ),
            (
                Error::Parse {
                    message: "bad".into(),
                },
                500,
                "Parse error: bad",
            ),
        ];
        for (err, status, body) in cases {
            assert_eq!(err.status_code().as_u16(), status);
            assert_eq!(err.public_message(), body);
        }
    }

    #[test]
    fn test_empty_messages_use_fallback() {
        let err = Error::Auth {
            message: String::new(),
        };
        assert_eq!(err.public_message(), "Server error");

        let err = Error::ApiError {
            status: 429,
            message: String::new(),
        };
        assert_eq!(err.public_message(), "");
    }

    #[test]
    fn test_invalid_upstream_status_maps_to_bad_gateway() {
        let err = Error::ApiError {
            status: 42,
            message: "odd".into(),
        };
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_parse_body_is_lenient() {
        let parsed: GenerateRequest = parse_body(&Bytes::from_static(b"not json"));
        assert_eq!(parsed, GenerateRequest::default());

        let parsed: GenerateRequest = parse_body(&Bytes::new());
        assert_eq!(parsed, GenerateRequest::default());

        let parsed: GenerateRequest = parse_body(&Bytes::from_static(br#"{"prompt":"a cat"}"#));
        assert_eq!(parsed.prompt.as_deref(), Some("a cat"));
    }

    #[test]
    fn test_parse_body_keeps_prompt_beside_mistyped_hints() {
        let parsed: GenerateRequest = parse_body(&Bytes::from_static(
            br#"{"prompt":"a cat","camera":{"pan":"left"},"model":5}"#,
        ));
        assert_eq!(parsed.prompt.as_deref(), Some("a cat"));
        assert!(parsed.camera.is_none());
        assert!(parsed.model.is_none());
    }
}
