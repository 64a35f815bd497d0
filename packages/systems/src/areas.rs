//! Service-area geometry layer cleaning.
//!
//! The authoritative boundary layer keys systems by `DWSYSNUM`. Placeholder
//! rows (a blank identifier) are excluded, identifiers are normalized to
//! integer PWSIDs, and the result is keyed for the reconciliation join.
//! Geometries stay opaque Esri JSON from here to the destination load.

use std::collections::BTreeMap;

use lead_map_source::feature_service::LayerFeature;

use crate::pwsid;

/// Attribute holding the raw system identifier.
pub const DWSYSNUM_COLUMN: &str = "DWSYSNUM";

/// One system's authoritative boundary.
#[derive(Debug, Clone)]
pub struct ServiceArea {
    /// Normalized integer identifier.
    pub pwsid: i64,
    /// The layer's attributes, as fetched (includes `FID`).
    pub attributes: serde_json::Map<String, serde_json::Value>,
    /// Esri-JSON polygon, passed through untouched.
    pub geometry: Option<serde_json::Value>,
}

/// Cleans the queried layer into a PWSID-keyed map.
///
/// A duplicated `DWSYSNUM` keeps its first feature and logs the rest; the
/// join downstream must see at most one boundary per system.
#[must_use]
pub fn clean_service_areas(features: Vec<LayerFeature>) -> BTreeMap<i64, ServiceArea> {
    let mut areas: BTreeMap<i64, ServiceArea> = BTreeMap::new();

    for feature in features {
        let raw = feature
            .attributes
            .get(DWSYSNUM_COLUMN)
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default();

        if pwsid::is_placeholder(raw) {
            continue;
        }

        let pwsid = match pwsid::normalize_dwsysnum(raw) {
            Ok(pwsid) => pwsid,
            Err(e) => {
                log::warn!("Skipping service area feature: {e}");
                continue;
            }
        };

        if areas.contains_key(&pwsid) {
            log::warn!("Duplicate DWSYSNUM in service areas layer for PWSID {pwsid}; keeping the first");
            continue;
        }

        areas.insert(
            pwsid,
            ServiceArea {
                pwsid,
                attributes: feature.attributes,
                geometry: feature.geometry,
            },
        );
    }

    log::debug!("{} service area boundaries", areas.len());
    areas
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn feature(dwsysnum: &str, fid: i64) -> LayerFeature {
        let mut attributes = serde_json::Map::new();
        attributes.insert(DWSYSNUM_COLUMN.to_owned(), json!(dwsysnum));
        attributes.insert("FID".to_owned(), json!(fid));
        LayerFeature {
            attributes,
            geometry: Some(json!({ "rings": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]] })),
        }
    }

    #[test]
    fn placeholder_identifiers_are_excluded() {
        let areas = clean_service_areas(vec![feature(" ", 1), feature("UTAH18005", 2)]);
        assert_eq!(areas.len(), 1);
        assert!(areas.contains_key(&18005));
    }

    #[test]
    fn identifiers_are_normalized_with_the_suffix_token() {
        let areas = clean_service_areas(vec![feature("UTAH18005Z", 1)]);
        assert!(areas.contains_key(&18005));
    }

    #[test]
    fn duplicate_identifiers_keep_the_first_feature() {
        let areas = clean_service_areas(vec![feature("UTAH18005", 1), feature("utah18005", 2)]);
        assert_eq!(areas.len(), 1);
        assert_eq!(areas[&18005].attributes["FID"], json!(1));
    }

    #[test]
    fn malformed_identifiers_are_skipped() {
        let areas = clean_service_areas(vec![feature("UTAH18X05", 1)]);
        assert!(areas.is_empty());
    }
}
