//! Video reference extraction from finished operations.

use std::fmt;

use veo_gateway_types::operations::VideoOperation;

/// MIME type used for inline video data URIs.
pub const VIDEO_MIME_TYPE: &str = "video/mp4";

/// Playable reference handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoReference {
    /// Base64 video bytes, rendered as a `data:` URI.
    Inline { base64: String },
    /// Remote URI (usually `gs://`), returned as-is.
    Remote { uri: String },
}

impl VideoReference {
    pub fn remote(uri: impl Into<String>) -> Self {
        Self::Remote { uri: uri.into() }
    }

    /// String placed in the `videoUrl` response field.
    pub fn to_url(&self) -> String {
        match self {
            Self::Inline { base64 } => format!("data:{VIDEO_MIME_TYPE};base64,{base64}"),
            Self::Remote { uri } => uri.clone(),
        }
    }

    pub const fn is_inline(&self) -> bool {
        matches!(self, Self::Inline { .. })
    }
}

impl fmt::Display for VideoReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inline { base64 } => write!(f, "inline {VIDEO_MIME_TYPE} ({} bytes)", base64.len()),
            Self::Remote { uri } => f.write_str(uri),
        }
    }
}

/// Extract the video from `videos[0]`, preferring inline bytes over `gcsUri`.
///
/// Later entries are ignored. Empty strings count as absent.
pub fn extract_video(operation: &VideoOperation) -> Option<VideoReference> {
    let video = operation.first_video()?;
    if let Some(base64) = video
        .bytes_base64_encoded
        .as_deref()
        .filter(|value| !value.is_empty())
    {
        return Some(VideoReference::Inline {
            base64: base64.to_string(),
        });
    }
    video
        .gcs_uri
        .as_deref()
        .filter(|value| !value.is_empty())
        .map(VideoReference::remote)
}
