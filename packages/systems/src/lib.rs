#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Water system reconciliation.
//!
//! Three sources describe whole systems: the approved-systems sheet tab,
//! the interactive-map links tab, and the authoritative service-area layer.
//! The modules here normalize each source's identifiers to a common integer
//! PWSID, deduplicate within each source, and left-join the union against
//! the geometry layer. Anything malformed (invalid identifiers, duplicate
//! identifiers, systems without a boundary) is collected into reports and
//! carried to the end-of-run summary; none of it stops the job.

pub mod approved;
pub mod areas;
pub mod links;
pub mod merge;
pub mod pwsid;

use strum_macros::{AsRefStr, Display};

/// Which source a reconciled system row came from. The display strings are
/// the destination layer's `area_type` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
pub enum AreaType {
    /// Row from the approved-systems sheet.
    #[strum(serialize = "Approved System")]
    ApprovedSystem,
    /// Row from the interactive-map links sheet.
    #[strum(serialize = "Link")]
    Link,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_type_display_matches_destination_values() {
        assert_eq!(AreaType::ApprovedSystem.to_string(), "Approved System");
        assert_eq!(AreaType::Link.to_string(), "Link");
    }
}
