//! Destination column naming.
//!
//! Hosted layers accept lowercase names with no punctuation. Every column
//! except the geometry column gets each non-alphanumeric character replaced
//! with an underscore and is lowercased; the service's computed geometry
//! metrics (`Shape__Area`/`Shape__Length`) are dropped outright because the
//! destination schema recomputes them itself.

use std::sync::LazyLock;

use regex::Regex;

/// The geometry column keeps its original name.
pub const GEOMETRY_COLUMN: &str = "SHAPE";

/// Computed geometry-metric columns the destination does not accept,
/// matched after renaming.
const DROPPED_METRIC_COLUMNS: &[&str] = &["shape__area", "shape__length"];

static NON_ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[^A-Za-z0-9]").unwrap_or_else(|e| unreachable!("{e}")));

/// Renames one column to the destination convention.
#[must_use]
pub fn rename_column(name: &str) -> String {
    NON_ALPHANUMERIC.replace_all(name, "_").to_lowercase()
}

/// Applies the destination naming convention to an attribute map, leaving
/// [`GEOMETRY_COLUMN`] untouched and dropping the computed metric columns.
#[must_use]
pub fn normalize_for_destination(
    attributes: serde_json::Map<String, serde_json::Value>,
) -> serde_json::Map<String, serde_json::Value> {
    let mut normalized = serde_json::Map::new();

    for (name, value) in attributes {
        if name == GEOMETRY_COLUMN {
            normalized.insert(name, value);
            continue;
        }

        let renamed = rename_column(&name);
        if DROPPED_METRIC_COLUMNS.contains(&renamed.as_str()) {
            continue;
        }
        normalized.insert(renamed, value);
    }

    normalized
}
