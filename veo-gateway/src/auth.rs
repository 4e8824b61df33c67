//! Bearer token acquisition for Vertex AI calls.

use std::sync::Arc;

use async_trait::async_trait;
use google_cloud_auth::credentials::service_account::{
    AccessSpecifier, Builder as ServiceAccountBuilder,
};
use google_cloud_auth::credentials::{
    Builder as AuthBuilder, CacheableResource, Credentials as GoogleCredentials,
};
use http::Extensions;
use reqwest::header::{HeaderMap, AUTHORIZATION};
use tokio::sync::OnceCell;

use crate::config::GatewayConfig;
use crate::error::{Error, Result};

/// Yields a bearer token valid for the lifetime of one request.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String>;
}

/// Where Google credentials come from.
#[derive(Clone)]
enum CredentialSource {
    /// Raw service-account key JSON.
    ServiceAccount(String),
    /// Application Default Credentials.
    ApplicationDefault,
}

/// Token source backed by `google-cloud-auth`.
///
/// The credentials object is built on first use and reused afterwards; it caches and refreshes
/// access tokens internally.
#[derive(Clone)]
pub struct GoogleTokenSource {
    source: CredentialSource,
    scopes: Vec<String>,
    credentials: Arc<OnceCell<Arc<GoogleCredentials>>>,
}

impl GoogleTokenSource {
    /// Service-account credentials when the config carries a key, ADC otherwise.
    pub fn from_config(config: &GatewayConfig) -> Self {
        let source = config
            .service_account_json
            .clone()
            .map_or(CredentialSource::ApplicationDefault, CredentialSource::ServiceAccount);
        Self {
            source,
            scopes: config.auth_scopes.clone(),
            credentials: Arc::new(OnceCell::new()),
        }
    }

    pub const fn uses_service_account(&self) -> bool {
        matches!(self.source, CredentialSource::ServiceAccount(_))
    }

    async fn credentials(&self) -> Result<&Arc<GoogleCredentials>> {
        self.credentials
            .get_or_try_init(|| async { self.build_credentials().map(Arc::new) })
            .await
    }

    fn build_credentials(&self) -> Result<GoogleCredentials> {
        match &self.source {
            CredentialSource::ServiceAccount(raw) => {
                let key: serde_json::Value =
                    serde_json::from_str(raw).map_err(|err| Error::Auth {
                        message: format!("Failed to parse service account JSON: {err}"),
                    })?;
                ServiceAccountBuilder::new(key)
                    .with_access_specifier(AccessSpecifier::from_scopes(self.scopes.clone()))
                    .build()
                    .map_err(|err| Error::Auth {
                        message: format!("Service account init failed: {err}"),
                    })
            }
            CredentialSource::ApplicationDefault => AuthBuilder::default()
                .with_scopes(self.scopes.iter().map(String::as_str))
                .build()
                .map_err(|err| Error::Auth {
                    message: format!("ADC init failed: {err}"),
                }),
        }
    }
}

#[async_trait]
impl TokenSource for GoogleTokenSource {
    async fn access_token(&self) -> Result<String> {
        let credentials = self.credentials().await?;
        let headers = credentials
            .headers(Extensions::new())
            .await
            .map_err(|err| Error::Auth {
                message: format!("Access token fetch failed: {err}"),
            })?;
        match headers {
            CacheableResource::New { data, .. } => bearer_from_headers(&data),
            CacheableResource::NotModified => Err(Error::Auth {
                message: "Access token fetch returned NotModified without cached headers".into(),
            }),
        }
    }
}

/// Fixed token, for local development against a proxy and for tests.
#[derive(Debug, Clone)]
pub struct StaticTokenSource {
    token: String,
}

impl StaticTokenSource {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenSource for StaticTokenSource {
    async fn access_token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}

fn bearer_from_headers(headers: &HeaderMap) -> Result<String> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::Auth {
            message: "Credentials did not produce an authorization header".into(),
        })?
        .to_str()
        .map_err(|_| Error::Auth {
            message: "Authorization header is not valid ASCII".into(),
        })?;
    value
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
        .map(ToString::to_string)
        .ok_or_else(|| Error::Auth {
            message: "Authorization header is not a bearer token".into(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_bearer_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer ya29.token"));
        assert_eq!(bearer_from_headers(&headers).unwrap(), "ya29.token");
    }

    #[test]
    fn test_non_bearer_header_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(matches!(
            bearer_from_headers(&headers),
            Err(Error::Auth { .. })
        ));
        assert!(matches!(
            bearer_from_headers(&HeaderMap::new()),
            Err(Error::Auth { .. })
        ));
    }

    #[test]
    fn test_source_selection() {
        let adc = GoogleTokenSource::from_config(&GatewayConfig::default());
        assert!(!adc.uses_service_account());

        let sa = GoogleTokenSource::from_config(
            &GatewayConfig::default().with_service_account_json("{}"),
        );
        assert!(sa.uses_service_account());
    }

    #[tokio::test]
    async fn test_invalid_service_account_json_is_auth_error() {
        let source = GoogleTokenSource::from_config(
            &GatewayConfig::default().with_service_account_json("not json"),
        );
        let err = source.access_token().await.unwrap_err();
        assert!(
            matches!(err, Error::Auth { message } if message.contains("service account JSON"))
        );
    }

    #[tokio::test]
    async fn test_static_token_source() {
        let source = StaticTokenSource::new("token-1");
        assert_eq!(source.access_token().await.unwrap(), "token-1");
    }
}
