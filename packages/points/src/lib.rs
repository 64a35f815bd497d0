#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! The service line point pipeline: spatialize, then clean.
//!
//! [`spatialize`] turns raw records into Web Mercator points, routing rows
//! with missing coordinates into a side report instead of dropping them.
//! [`clean`] then shapes each point's attributes for the destination layer.

pub mod clean;
pub mod spatialize;

pub use clean::{CleanedPoint, clean};
pub use spatialize::{SpatialPoint, SpatializeOutcome, spatialize};
