#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! The lead service line record model.
//!
//! The upstream GraphQL endpoint is loosely typed: numeric fields arrive as
//! numbers or numeric strings depending on how the row was entered, and
//! missing values show up as `null`, an empty string, or an absent key. The
//! lenient deserializers here fold all of those into `Option` so the rest of
//! the pipeline only ever deals with one null representation.

use serde::{Deserialize, Deserializer, Serialize};

/// One lead service line entry as returned by the GraphQL endpoint.
///
/// Field names match the upstream schema verbatim, including its
/// `serviceline_material_cassification` spelling; the rename to the
/// destination column happens in the point cleaner, not here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceLineRecord {
    /// Internal system key from the source database.
    #[serde(default, deserialize_with = "lenient_i64")]
    pub system_id: Option<i64>,
    /// Human-entered public water system identifier (e.g. `"UTAH18005"`).
    #[serde(default, deserialize_with = "lenient_string")]
    pub pws_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub pws_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub pws_county: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub pws_population: Option<i64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub serviceline_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub pws_address: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub pws_city: Option<String>,
    /// Raw ZIP value; may be 5-digit, ZIP+4, or numeric. Cleaned downstream.
    #[serde(default, deserialize_with = "lenient_string")]
    pub pws_zipcode: Option<String>,
    /// Latitude in either decimal degrees or a UTM northing; the datum is
    /// inferred later from the magnitude.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees or a UTM easting, paired with `latitude`.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub longitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub serviceline_address: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub serviceline_zipcode: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sensitive_population: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub system_owned_material: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub previously_lead: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub so_year_installed: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub co_year_installed: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub so_basis_classification: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub co_basis_classification: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub co_material: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub so_material: Option<String>,
    /// Upstream schema's own spelling; renamed to the truncated destination
    /// column by the cleaner.
    #[serde(default, deserialize_with = "lenient_string")]
    pub serviceline_material_cassification: Option<String>,
}

impl ServiceLineRecord {
    /// Returns `true` when either coordinate is missing. Such records are
    /// reported rather than spatialized.
    #[must_use]
    pub const fn missing_coordinates(&self) -> bool {
        self.latitude.is_none() || self.longitude.is_none()
    }
}

/// Parses raw GraphQL page records into typed service line records.
///
/// # Errors
///
/// Returns a [`serde_json::Error`] if a record is not a JSON object, a
/// malformed-response condition that aborts the run.
pub fn parse_records(
    records: Vec<serde_json::Value>,
) -> Result<Vec<ServiceLineRecord>, serde_json::Error> {
    records.into_iter().map(serde_json::from_value).collect()
}

/// Accepts an integer, a float with no fractional part, or a numeric string.
/// Anything else (including an empty string) becomes `None`.
fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_i64))
}

#[allow(clippy::cast_possible_truncation)]
fn value_to_i64(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(n) => n.as_i64().or_else(|| {
            let f = n.as_f64()?;
            (f.fract() == 0.0).then_some(f as i64)
        }),
        serde_json::Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| value_to_i64(&serde_json::Value::from(trimmed.parse::<f64>().ok()?)))
        }
        _ => None,
    }
}

/// Accepts a float, an integer, or a numeric string.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(|v| match v {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }))
}

/// Accepts a string or a number; empty strings become `None` so downstream
/// null-checks see a single missing-value representation.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::String(s) => {
            if s.trim().is_empty() {
                None
            } else {
                Some(s)
            }
        }
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }))
}
