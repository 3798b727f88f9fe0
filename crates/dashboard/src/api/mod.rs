//! HTTP client for the FarmVibes.AI REST service.

pub mod client;
pub mod error;

pub use client::{RunQuery, VibeClient};
pub use error::ApiError;
