use serde::{Deserialize, Serialize};
use serde_json::Value;

/// LRO error.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct OperationError {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Body of a `fetchPredictOperation` call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FetchPredictOperationRequest {
    pub operation_name: String,
}

impl FetchPredictOperationRequest {
    pub fn new(operation_name: impl Into<String>) -> Self {
        Self {
            operation_name: operation_name.into(),
        }
    }
}

/// Long-running video generation operation as reported by `fetchPredictOperation`.
///
/// Only `done` is read strictly. A result of the wrong shape reads as absent, so a finished
/// operation with a malformed payload has no video rather than failing to parse.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct VideoOperation {
    #[serde(
        default,
        deserialize_with = "crate::lenient_serde::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub done: Option<bool>,
    #[serde(
        default,
        deserialize_with = "crate::lenient_serde::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub error: Option<OperationError>,
    #[serde(
        default,
        deserialize_with = "crate::lenient_serde::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub response: Option<GenerateVideosResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl VideoOperation {
    /// Whether the provider reported the operation as finished.
    pub fn is_done(&self) -> bool {
        self.done.unwrap_or(false)
    }

    /// First generated video, if any.
    pub fn first_video(&self) -> Option<&GeneratedVideo> {
        self.response
            .as_ref()
            .and_then(|response| response.videos.as_ref())
            .and_then(|videos| videos.first())
    }
}

/// Payload of a finished operation.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVideosResponse {
    #[serde(
        default,
        deserialize_with = "crate::lenient_serde::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub videos: Option<Vec<GeneratedVideo>>,
    #[serde(
        default,
        deserialize_with = "crate::lenient_serde::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub rai_media_filtered_count: Option<i32>,
    #[serde(
        default,
        deserialize_with = "crate::lenient_serde::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub rai_media_filtered_reasons: Option<Vec<String>>,
}

/// One generated video: inline base64 bytes or a Cloud Storage URI.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedVideo {
    #[serde(
        default,
        deserialize_with = "crate::lenient_serde::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub bytes_base64_encoded: Option<String>,
    #[serde(
        default,
        deserialize_with = "crate::lenient_serde::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub gcs_uri: Option<String>,
    #[serde(
        default,
        deserialize_with = "crate::lenient_serde::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub mime_type: Option<String>,
}
