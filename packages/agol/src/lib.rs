#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! The ArcGIS Online destination side of the sync.
//!
//! [`columns`] maps cleaned column names onto the hosted layer's naming
//! convention; [`client`] owns the narrow write contract (token, truncate,
//! bulk add) that the rest of the pipeline treats as a collaborator.

pub mod client;
pub mod columns;

pub use client::{Feature, FeatureLoader, ServiceUpdater};

/// Errors from the destination service.
#[derive(Debug, thiserror::Error)]
pub enum AgolError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The portal refused the token request.
    #[error("token generation failed: {message}")]
    Token {
        /// Portal error description.
        message: String,
    },

    /// The service reported an error body or per-feature failures.
    #[error("feature service operation failed: {message}")]
    Service {
        /// What the service reported.
        message: String,
    },
}
