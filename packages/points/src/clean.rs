//! Point attribute cleaning for the destination layer.
//!
//! A pure column-level transform: the over-long material classification
//! field is renamed to the destination schema's truncated column, ZIP values
//! lose their +4 suffix and become nullable ints, and the population and
//! system id fields are pinned to nullable ints. No row is added or removed,
//! and re-cleaning already-clean attributes changes nothing.

use geo::Point;
use serde_json::{Map, Value};

use crate::SpatialPoint;

/// Upstream field name, with the upstream schema's own spelling.
pub const RAW_MATERIAL_CLASSIFICATION: &str = "serviceline_material_cassification";

/// Destination column, truncated to the layer's name-length cap.
pub const DEST_MATERIAL_CLASSIFICATION: &str = "serviceline_material_cassificat";

/// Attribute keys coerced to nullable integers.
const NULLABLE_INT_COLUMNS: &[&str] = &["pws_population", "system_id"];

/// A point ready for the destination layer.
#[derive(Debug, Clone)]
pub struct CleanedPoint {
    /// Web Mercator geometry.
    pub geometry: Point<f64>,
    /// Destination-shaped attribute map.
    pub attributes: Map<String, Value>,
}

/// Cleans a batch of spatialized points.
#[must_use]
pub fn clean(points: Vec<SpatialPoint>) -> Vec<CleanedPoint> {
    log::debug!("Cleaning {} point rows", points.len());
    points
        .into_iter()
        .map(|point| CleanedPoint {
            geometry: point.geometry,
            attributes: clean_attributes(raw_attributes(&point.record)),
        })
        .collect()
}

/// Applies the column-level cleanup to an attribute map. Idempotent:
/// applying it to its own output is a no-op.
#[must_use]
pub fn clean_attributes(mut attributes: Map<String, Value>) -> Map<String, Value> {
    if let Some(value) = attributes.remove(RAW_MATERIAL_CLASSIFICATION) {
        attributes.insert(DEST_MATERIAL_CLASSIFICATION.to_owned(), value);
    }

    if let Some(value) = attributes.remove("pws_zipcode") {
        attributes.insert("pws_zipcode".to_owned(), zip_value(&value));
    }

    for column in NULLABLE_INT_COLUMNS {
        if let Some(value) = attributes.remove(*column) {
            attributes.insert((*column).to_owned(), int_value(&value));
        }
    }

    attributes
}

/// Truncates a ZIP value to its leading five digits as a nullable int.
/// Handles ZIP+4 strings, plain ints, and genuinely missing values.
fn zip_value(value: &Value) -> Value {
    let text = match value {
        Value::String(s) => s.trim().to_owned(),
        Value::Number(n) => n.to_string(),
        _ => return Value::Null,
    };

    let leading: String = text.chars().take(5).collect();
    leading
        .parse::<i64>()
        .map_or(Value::Null, |zip| Value::Number(zip.into()))
}

/// Coerces a value to a nullable integer.
#[allow(clippy::cast_possible_truncation)]
fn int_value(value: &Value) -> Value {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| {
                let f = n.as_f64()?;
                (f.fract() == 0.0).then_some(f as i64)
            })
            .map_or(Value::Null, |i| Value::Number(i.into())),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_or(Value::Null, |i| Value::Number(i.into())),
        _ => Value::Null,
    }
}

/// Lays a record's fields out as a destination attribute map, keeping the
/// upstream column names.
fn raw_attributes(record: &lead_map_source_models::ServiceLineRecord) -> Map<String, Value> {
    // Round-tripping through serde keeps this in lockstep with the record
    // struct's field list.
    match serde_json::to_value(record) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}
