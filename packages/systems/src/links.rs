//! Interactive-map links sheet cleaning.
//!
//! One row per system with an external map URL. Duplicate identifiers are
//! a data-entry error worth surfacing: every duplicated row's name/id pair
//! goes into the report, even though only the last-seen row survives into
//! the kept set.

use std::collections::BTreeMap;

use lead_map_source::table::SheetTable;

use crate::pwsid;

/// Sheet column holding the identifier.
pub const PWSID_COLUMN: &str = "PWSID";
/// Sheet column holding the system name (the sheet's own spelling).
pub const NAME_COLUMN: &str = "Water Systme Name";
/// Sheet column holding the external map URL.
pub const LINK_COLUMN: &str = "Interactive map link";

/// One system's interactive map link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemLink {
    /// Normalized integer identifier.
    pub pwsid: i64,
    pub system_name: Option<String>,
    /// External map URL.
    pub link: Option<String>,
}

/// The cleaned links plus the duplicate-identifier report.
#[derive(Debug, Default)]
pub struct LinksOutcome {
    /// One row per PWSID (last-seen wins), ordered by identifier.
    pub links: Vec<SystemLink>,
    /// Every row that shared its PWSID with another, as `(name, pwsid)`.
    pub duplicate_pwsids: Vec<(String, i64)>,
}

/// Cleans the links table.
#[must_use]
pub fn clean_links(table: &SheetTable) -> LinksOutcome {
    let mut rows = Vec::new();

    for row in table.rows() {
        let Some(raw_pwsid) = row.get(PWSID_COLUMN) else {
            continue;
        };

        let pwsid = match pwsid::normalize(raw_pwsid) {
            Ok(pwsid) => pwsid,
            Err(e) => {
                log::warn!("Skipping interactive map link row: {e}");
                continue;
            }
        };

        rows.push(SystemLink {
            pwsid,
            system_name: row.get(NAME_COLUMN).map(ToOwned::to_owned),
            link: row.get(LINK_COLUMN).map(ToOwned::to_owned),
        });
    }

    let mut occurrences: BTreeMap<i64, usize> = BTreeMap::new();
    for row in &rows {
        *occurrences.entry(row.pwsid).or_default() += 1;
    }

    let duplicate_pwsids: Vec<(String, i64)> = rows
        .iter()
        .filter(|row| occurrences[&row.pwsid] > 1)
        .map(|row| (row.system_name.clone().unwrap_or_default(), row.pwsid))
        .collect();

    if !duplicate_pwsids.is_empty() {
        log::warn!(
            "Duplicate PWSIDs found in the interactive maps sheet: {}",
            duplicate_pwsids
                .iter()
                .map(|(_, pwsid)| pwsid.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    let mut deduplicated: BTreeMap<i64, SystemLink> = BTreeMap::new();
    for row in rows {
        deduplicated.insert(row.pwsid, row);
    }

    LinksOutcome {
        links: deduplicated.into_values().collect(),
        duplicate_pwsids,
    }
}
