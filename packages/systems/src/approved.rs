//! Approved-systems sheet cleaning.
//!
//! The sheet is padded with blank rows by its formatting, identifiers are
//! human-entered, and a system may be approved more than once. Cleaning
//! keeps only rows with a valid PWSID and, per PWSID, the row with the
//! latest submission time.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use lead_map_source::parsing::parse_mixed_timestamp;
use lead_map_source::table::SheetTable;

use crate::pwsid;

/// Sheet column holding the human-entered identifier.
pub const PWS_ID_COLUMN: &str = "PWS ID";
/// Sheet column holding the submission timestamp (mixed formats).
pub const TIME_COLUMN: &str = "Time";
/// Sheet column holding the system name.
pub const SYSTEM_NAME_COLUMN: &str = "System Name";
/// Sheet column holding the approval status.
pub const APPROVED_COLUMN: &str = "Approved";
/// Sheet column holding the system classification.
pub const CLASSIFICATION_COLUMN: &str = "SC, LC, on NTNC";

/// One approved system, deduplicated to its most recent submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovedSystem {
    /// Normalized integer identifier.
    pub pwsid: i64,
    pub system_name: Option<String>,
    pub approved: Option<String>,
    pub classification: Option<String>,
    /// Parsed submission time; `None` when the cell was missing or in no
    /// recognized format. Undated rows lose deduplication to dated ones.
    pub submitted_time: Option<NaiveDateTime>,
}

/// The cleaned approved systems plus the identifiers that failed
/// normalization.
#[derive(Debug, Default)]
pub struct ApprovedOutcome {
    /// One row per PWSID, ordered by identifier.
    pub systems: Vec<ApprovedSystem>,
    /// Raw identifier strings that were reported and excluded.
    pub invalid_pwsids: Vec<String>,
}

/// Cleans the approved-systems table.
#[must_use]
pub fn clean_approved(table: &SheetTable) -> ApprovedOutcome {
    let mut rows = Vec::new();
    let mut invalid_pwsids = Vec::new();

    for row in table.rows() {
        // Blank padding rows have no identifier at all.
        let Some(raw_pwsid) = row.get(PWS_ID_COLUMN) else {
            continue;
        };

        let pwsid = match pwsid::normalize(raw_pwsid) {
            Ok(pwsid) => pwsid,
            Err(_) => {
                invalid_pwsids.push(raw_pwsid.to_owned());
                continue;
            }
        };

        rows.push(ApprovedSystem {
            pwsid,
            system_name: row.get(SYSTEM_NAME_COLUMN).map(ToOwned::to_owned),
            approved: row.get(APPROVED_COLUMN).map(ToOwned::to_owned),
            classification: row.get(CLASSIFICATION_COLUMN).map(ToOwned::to_owned),
            submitted_time: row.get(TIME_COLUMN).and_then(parse_mixed_timestamp),
        });
    }

    if !invalid_pwsids.is_empty() {
        log::warn!(
            "The following PWSIDs are invalid: {}",
            invalid_pwsids.join(", ")
        );
    }

    // Latest submission wins. The sort is stable, so among equal timestamps
    // the later sheet row survives.
    rows.sort_by(|a, b| a.submitted_time.cmp(&b.submitted_time));
    let mut deduplicated: BTreeMap<i64, ApprovedSystem> = BTreeMap::new();
    for row in rows {
        deduplicated.insert(row.pwsid, row);
    }

    ApprovedOutcome {
        systems: deduplicated.into_values().collect(),
        invalid_pwsids,
    }
}
