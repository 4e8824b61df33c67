//! Request validation and model selection.

use veo_gateway_types::api::GenerateRequest;
use veo_gateway_types::predict::{
    InstanceImage, PredictLongRunningRequest, VideoInstance, VideoParameters,
};

use crate::error::{Error, Result};

/// Image-to-video model; mandatory whenever an image is supplied.
pub const IMAGE_MODEL: &str = "veo-3.0-generate-preview";
/// Model selected by the [`FAST_MODEL_HINT`] hint.
pub const FAST_MODEL: &str = "veo-3.0-fast-generate-001";
/// Text-to-video model used otherwise.
pub const DEFAULT_MODEL: &str = "veo-3.0-generate-001";
/// Caller-facing `model` value that selects [`FAST_MODEL`].
pub const FAST_MODEL_HINT: &str = "veo3-fast";
/// MIME type assumed when a data URL does not declare one.
pub const DEFAULT_IMAGE_MIME_TYPE: &str = "image/png";

pub const DURATION_SECONDS: u32 = 8;
pub const SAMPLE_COUNT: u32 = 1;

pub(crate) const MISSING_INPUT_MESSAGE: &str = "Missing prompt or image";

/// Pick the model for a request. An image always wins over the hint.
pub fn select_model(has_image: bool, model_hint: Option<&str>) -> &'static str {
    if has_image {
        IMAGE_MODEL
    } else if model_hint == Some(FAST_MODEL_HINT) {
        FAST_MODEL
    } else {
        DEFAULT_MODEL
    }
}

/// Preview-tier models get audio generation.
pub fn is_preview_model(model: &str) -> bool {
    model.contains("preview")
}

/// Image decoded from a `data:<mime>;base64,<payload>` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput {
    pub mime_type: String,
    /// Base64 payload after the first comma; `None` when the URL has no comma.
    pub data: Option<String>,
}

impl ImageInput {
    pub fn from_data_url(data_url: &str) -> Self {
        let (meta, data) = match data_url.split_once(',') {
            Some((meta, data)) => (meta, Some(data.to_string())),
            None => (data_url, None),
        };
        let mime_type = parse_mime_type(meta)
            .unwrap_or(DEFAULT_IMAGE_MIME_TYPE)
            .to_string();
        Self { mime_type, data }
    }
}

fn parse_mime_type(meta: &str) -> Option<&str> {
    let start = meta.find("data:")? + "data:".len();
    let rest = &meta[start..];
    let end = rest.find(";base64")?;
    Some(&rest[..end]).filter(|mime| !mime.is_empty())
}

/// A validated generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRequest {
    pub prompt: Option<String>,
    pub image: Option<ImageInput>,
    pub model: &'static str,
    pub camera: Option<String>,
    pub style: Option<String>,
}

impl NormalizedRequest {
    /// Validate a caller request. Empty strings count as absent.
    ///
    /// # Errors
    /// Returns [`Error::InvalidRequest`] when neither a prompt nor an image is present.
    pub fn from_request(request: GenerateRequest) -> Result<Self> {
        let GenerateRequest {
            prompt,
            model,
            camera,
            style,
            image_data_url,
        } = request;
        let prompt = non_empty(prompt);
        let image_data_url = non_empty(image_data_url);
        if prompt.is_none() && image_data_url.is_none() {
            return Err(Error::InvalidRequest {
                message: MISSING_INPUT_MESSAGE.into(),
            });
        }

        let image = image_data_url.as_deref().map(ImageInput::from_data_url);
        let model = select_model(image.is_some(), model.as_deref());
        Ok(Self {
            prompt,
            image,
            model,
            camera: non_empty(camera),
            style: non_empty(style),
        })
    }

    /// Build the `predictLongRunning` body for this request.
    pub fn to_predict_request(&self) -> PredictLongRunningRequest {
        let instance = VideoInstance {
            prompt: self.prompt.clone(),
            image: self.image.as_ref().map(|image| InstanceImage {
                bytes_base64_encoded: image.data.clone(),
                mime_type: image.mime_type.clone(),
            }),
        };
        PredictLongRunningRequest {
            instances: vec![instance],
            parameters: VideoParameters {
                duration_seconds: DURATION_SECONDS,
                sample_count: SAMPLE_COUNT,
                generate_audio: is_preview_model(self.model).then_some(true),
            },
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(prompt: Option<&str>, model: Option<&str>, image: Option<&str>) -> GenerateRequest {
        GenerateRequest {
            prompt: prompt.map(ToString::to_string),
            model: model.map(ToString::to_string),
            image_data_url: image.map(ToString::to_string),
            ..GenerateRequest::default()
        }
    }

    #[test]
    fn test_image_overrides_every_hint() {
        for hint in [None, Some("veo3-fast"), Some("veo3"), Some("unknown")] {
            assert_eq!(select_model(true, hint), IMAGE_MODEL);
        }
    }

    #[test]
    fn test_fast_hint_without_image() {
        assert_eq!(select_model(false, Some("veo3-fast")), FAST_MODEL);
        assert_eq!(select_model(false, Some("VEO3-FAST")), DEFAULT_MODEL);
        assert_eq!(select_model(false, Some("veo3")), DEFAULT_MODEL);
        assert_eq!(select_model(false, None), DEFAULT_MODEL);
    }

    #[test]
    fn test_selection_is_pure() {
        let first = select_model(false, Some("veo3-fast"));
        let second = select_model(false, Some("veo3-fast"));
        assert_eq!(first, second);
    }

    #[test]
    fn test_only_image_model_is_preview() {
        assert!(is_preview_model(IMAGE_MODEL));
        assert!(!is_preview_model(FAST_MODEL));
        assert!(!is_preview_model(DEFAULT_MODEL));
    }

    #[test]
    fn test_missing_prompt_and_image_is_rejected() {
        let err = NormalizedRequest::from_request(request(None, Some("veo3-fast"), None))
            .unwrap_err();
        assert!(
            matches!(err, Error::InvalidRequest { message } if message == "Missing prompt or image")
        );

        let err = NormalizedRequest::from_request(request(Some(""), None, Some(""))).unwrap_err();
        assert!(matches!(err, Error::InvalidRequest { .. }));
    }

    #[test]
    fn test_mime_type_from_prefix() {
        let image = ImageInput::from_data_url("data:image/jpeg;base64,/9j/4AAQ");
        assert_eq!(image.mime_type, "image/jpeg");
        assert_eq!(image.data.as_deref(), Some("/9j/4AAQ"));
    }

    #[test]
    fn test_mime_type_defaults_to_png() {
        for url in [
            "image/jpeg,AAAA",
            "data:image/jpeg,AAAA",
            "data:;base64,AAAA",
            "AAAA",
        ] {
            assert_eq!(ImageInput::from_data_url(url).mime_type, "image/png");
        }
        assert!(ImageInput::from_data_url("AAAA").data.is_none());
    }

    #[test]
    fn test_payload_is_everything_after_first_comma() {
        let image = ImageInput::from_data_url("data:image/webp;base64,AB,CD");
        assert_eq!(image.mime_type, "image/webp");
        assert_eq!(image.data.as_deref(), Some("AB,CD"));
    }

    #[test]
    fn test_prompt_only_body_has_no_audio() {
        let normalized =
            NormalizedRequest::from_request(request(Some("a cat"), None, None)).unwrap();
        assert_eq!(normalized.model, DEFAULT_MODEL);
        assert_eq!(
            serde_json::to_value(normalized.to_predict_request()).unwrap(),
            json!({
                "instances": [{"prompt": "a cat"}],
                "parameters": {"durationSeconds": 8, "sampleCount": 1}
            })
        );
    }

    #[test]
    fn test_image_body_enables_audio() {
        let normalized = NormalizedRequest::from_request(request(
            None,
            Some("veo3-fast"),
            Some("data:image/jpeg;base64,QUJD"),
        ))
        .unwrap();
        assert_eq!(normalized.model, IMAGE_MODEL);
        assert_eq!(
            serde_json::to_value(normalized.to_predict_request()).unwrap(),
            json!({
                "instances": [{"image": {"bytesBase64Encoded": "QUJD", "mimeType": "image/jpeg"}}],
                "parameters": {"durationSeconds": 8, "sampleCount": 1, "generateAudio": true}
            })
        );
    }
}
