//! HTTP gateway that turns a prompt and/or an image into a Veo video on Vertex AI.
//!
//! A request is validated, submitted as a long-running prediction, polled at a fixed cadence
//! and resolved to a playable reference: an inline `data:` URI or a Cloud Storage URI.

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod generator;
pub mod poller;
pub mod predict;
pub mod request;
pub mod server;

#[cfg(test)]
mod test_support;

pub use veo_gateway_types as types;

pub use auth::{GoogleTokenSource, StaticTokenSource, TokenSource};
pub use config::GatewayConfig;
pub use error::{Error, Result};
pub use extract::VideoReference;
pub use generator::{VideoGenerator, DEMO_VIDEO_URL};
pub use poller::{PollPolicy, Sleeper, TokioSleeper};
pub use predict::{ModelEndpoint, PredictionService, VertexPredictionService};
