//! Reconciliation of system rows against authoritative boundaries.
//!
//! The approved-systems rows and link rows are stacked, not joined, since a
//! system may legitimately appear once per source. The union is left-joined
//! against
//! the service-area map by PWSID. Rows with no boundary are excluded from
//! the reconciled output but retained in the missing-geometry report.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use crate::AreaType;
use crate::approved::ApprovedSystem;
use crate::areas::ServiceArea;
use crate::links::SystemLink;

/// One row of the unioned approved + links set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemRow {
    pub pwsid: i64,
    pub system_name: Option<String>,
    pub approved: Option<String>,
    pub classification: Option<String>,
    /// External map URL; only present on link rows.
    pub link: Option<String>,
    /// Submission time; only present on approved-system rows.
    pub submitted_time: Option<NaiveDateTime>,
    pub area_type: AreaType,
}

impl From<ApprovedSystem> for SystemRow {
    fn from(system: ApprovedSystem) -> Self {
        Self {
            pwsid: system.pwsid,
            system_name: system.system_name,
            approved: system.approved,
            classification: system.classification,
            link: None,
            submitted_time: system.submitted_time,
            area_type: AreaType::ApprovedSystem,
        }
    }
}

impl From<SystemLink> for SystemRow {
    fn from(link: SystemLink) -> Self {
        Self {
            pwsid: link.pwsid,
            system_name: link.system_name,
            approved: None,
            classification: None,
            link: link.link,
            submitted_time: None,
            area_type: AreaType::Link,
        }
    }
}

/// A system row matched to its authoritative boundary.
#[derive(Debug, Clone)]
pub struct ReconciledSystem {
    /// The tabular side of the join.
    pub system: SystemRow,
    /// The boundary layer's attributes for the matched feature.
    pub area_attributes: serde_json::Map<String, serde_json::Value>,
    /// The matched Esri-JSON polygon.
    pub geometry: Option<serde_json::Value>,
}

/// What is known about a system that has no boundary in the layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingGeometry {
    pub system_name: Option<String>,
    pub classification: Option<String>,
    pub area_type: AreaType,
}

/// The reconciled rows plus the missing-geometry report.
#[derive(Debug, Default)]
pub struct MergeOutcome {
    /// Rows with a matched boundary, union order preserved (approved rows
    /// first, then link rows).
    pub reconciled: Vec<ReconciledSystem>,
    /// Systems with tabular data but no boundary, keyed by PWSID.
    pub missing_geometries: BTreeMap<i64, MissingGeometry>,
}

/// Left-joins the approved + links union against the service-area map.
#[must_use]
pub fn merge_systems(
    approved: Vec<ApprovedSystem>,
    links: Vec<SystemLink>,
    areas: &BTreeMap<i64, ServiceArea>,
) -> MergeOutcome {
    let union = approved
        .into_iter()
        .map(SystemRow::from)
        .chain(links.into_iter().map(SystemRow::from));

    let mut outcome = MergeOutcome::default();

    for row in union {
        match areas.get(&row.pwsid) {
            Some(area) => outcome.reconciled.push(ReconciledSystem {
                system: row,
                area_attributes: area.attributes.clone(),
                geometry: area.geometry.clone(),
            }),
            None => {
                outcome.missing_geometries.insert(
                    row.pwsid,
                    MissingGeometry {
                        system_name: row.system_name,
                        classification: row.classification,
                        area_type: row.area_type,
                    },
                );
            }
        }
    }

    if !outcome.missing_geometries.is_empty() {
        log::warn!(
            "The following PWSIDs were not found in the service areas layer: {}",
            outcome
                .missing_geometries
                .keys()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    outcome
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn approved(pwsid: i64, name: &str) -> ApprovedSystem {
        ApprovedSystem {
            pwsid,
            system_name: Some(name.to_owned()),
            approved: Some("Yes".to_owned()),
            classification: Some("SC".to_owned()),
            submitted_time: None,
        }
    }

    fn link(pwsid: i64, name: &str) -> SystemLink {
        SystemLink {
            pwsid,
            system_name: Some(name.to_owned()),
            link: Some("https://example.com".to_owned()),
        }
    }

    fn area(pwsid: i64) -> (i64, ServiceArea) {
        let mut attributes = serde_json::Map::new();
        attributes.insert("FID".to_owned(), json!(pwsid));
        attributes.insert("DWSYSNUM".to_owned(), json!(format!("UTAH{pwsid}")));
        (
            pwsid,
            ServiceArea {
                pwsid,
                attributes,
                geometry: Some(json!({ "rings": [] })),
            },
        )
    }

    #[test]
    fn unmatched_rows_go_to_the_missing_report_only() {
        let areas = BTreeMap::from([area(1234)]);
        let outcome = merge_systems(
            vec![approved(1234, "Matched"), approved(5678, "Orphan")],
            Vec::new(),
            &areas,
        );

        assert_eq!(outcome.reconciled.len(), 1);
        assert_eq!(outcome.reconciled[0].system.pwsid, 1234);

        let missing = &outcome.missing_geometries[&5678];
        assert_eq!(missing.system_name.as_deref(), Some("Orphan"));
        assert_eq!(missing.area_type, AreaType::ApprovedSystem);
        assert!(!outcome.reconciled.iter().any(|r| r.system.pwsid == 5678));
    }

    #[test]
    fn matched_rows_appear_exactly_once() {
        let areas = BTreeMap::from([area(1234), area(42)]);
        let outcome = merge_systems(
            vec![approved(1234, "A")],
            vec![link(42, "B")],
            &areas,
        );

        assert_eq!(outcome.reconciled.len(), 2);
        assert!(outcome.missing_geometries.is_empty());
    }

    #[test]
    fn cross_source_collisions_are_not_deduplicated() {
        // The same system can hold an approved row and a link row; both
        // survive the join as distinct area types.
        let areas = BTreeMap::from([area(1234)]);
        let outcome = merge_systems(vec![approved(1234, "A")], vec![link(1234, "A")], &areas);

        assert_eq!(outcome.reconciled.len(), 2);
        let types: Vec<AreaType> = outcome
            .reconciled
            .iter()
            .map(|r| r.system.area_type)
            .collect();
        assert_eq!(types, [AreaType::ApprovedSystem, AreaType::Link]);
    }

    #[test]
    fn joined_rows_carry_the_boundary_attributes() {
        let areas = BTreeMap::from([area(1234)]);
        let outcome = merge_systems(vec![approved(1234, "A")], Vec::new(), &areas);

        let reconciled = &outcome.reconciled[0];
        assert_eq!(reconciled.area_attributes["FID"], json!(1234));
        assert!(reconciled.geometry.is_some());
    }
}
