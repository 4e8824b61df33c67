//! Caller-facing request and response bodies.

use serde::{Deserialize, Serialize};

/// Body of `POST /generate`.
///
/// Fields are independent: a field of the wrong type reads as absent without discarding the rest.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(
        default,
        deserialize_with = "crate::lenient_serde::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub prompt: Option<String>,
    /// Model hint, e.g. `veo3-fast`.
    #[serde(
        default,
        deserialize_with = "crate::lenient_serde::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub model: Option<String>,
    #[serde(
        default,
        deserialize_with = "crate::lenient_serde::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub camera: Option<String>,
    #[serde(
        default,
        deserialize_with = "crate::lenient_serde::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub style: Option<String>,
    /// `data:<mime>;base64,<payload>`
    #[serde(
        default,
        deserialize_with = "crate::lenient_serde::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub image_data_url: Option<String>,
}

/// Successful `POST /generate` response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub video_url: String,
}

/// Body of `POST /register`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct RegisterRequest {
    #[serde(
        default,
        deserialize_with = "crate::lenient_serde::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub email: Option<String>,
}

/// `POST /register` acknowledgment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegisterResponse {
    pub ok: bool,
}

impl Default for RegisterResponse {
    fn default() -> Self {
        Self { ok: true }
    }
}
