#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Upstream data fetchers for the lead-map sync job.
//!
//! Three read-only sources feed a run: the lead service line GraphQL
//! endpoint ([`graphql`]), two Google Sheets tabs ([`gsheet`] + [`table`]),
//! and the authoritative service-area feature layer ([`feature_service`]).
//! All HTTP goes through the [`retry`] helpers so transient failures are
//! retried with backoff before they abort the run.

pub mod feature_service;
pub mod graphql;
pub mod gsheet;
pub mod parsing;
pub mod retry;
pub mod table;

/// Errors that can occur while fetching or decoding upstream data.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The service answered with an application-level error payload.
    #[error("API error: {message}")]
    Api {
        /// Description from the service's error body.
        message: String,
    },

    /// The pagination loop ran past its guard without seeing a short page.
    #[error("pagination did not terminate after {pages} pages")]
    PageLimitExceeded {
        /// Number of pages fetched before giving up.
        pages: u64,
    },

    /// A tabular response was structurally unusable.
    #[error("table error: {message}")]
    Table {
        /// What was wrong with the grid.
        message: String,
    },
}
