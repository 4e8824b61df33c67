//! Wire types for the Veo video generation gateway.

pub mod api;
pub mod lenient_serde;
pub mod operations;
pub mod predict;
