#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! End-of-run operator notification.
//!
//! [`summary`] turns the run's counters and warning reports into the
//! plain-text body an operator reads; [`sendgrid`] delivers it. Delivery is
//! the last step of a run: the data-quality reports are already logged, so
//! the mail is the digest, not the system of record.

pub mod sendgrid;
pub mod summary;

pub use sendgrid::{MessageDetails, SendGridHandler, SendGridSettings};
pub use summary::{MissingGeometryLine, RunSummary};

/// Errors from the notification layer.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Reading an attachment failed.
    #[error("attachment read failed: {0}")]
    Io(#[from] std::io::Error),

    /// The mail API rejected the message.
    #[error("mail delivery failed with HTTP {status}")]
    Api {
        /// Status code from the mail API.
        status: u16,
    },
}
