//! Run summary assembly.
//!
//! One plain-text digest per run: timings, load counts, and one section per
//! non-empty warning report. Sections for empty reports are omitted
//! entirely so a clean run reads as a clean run.

use std::collections::BTreeMap;

use chrono::{DateTime, Local};

/// One line of the missing-geometries section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingGeometryLine {
    pub pwsid: i64,
    pub system_name: String,
    pub classification: String,
    pub area_type: String,
}

/// Everything the end-of-run mail reports.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Job name used in the title line.
    pub skid_name: String,
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
    pub points_loaded: u64,
    pub areas_loaded: u64,
    /// `(pws_id, pws_name)` per point record that lacked coordinates.
    pub missing_coords: Vec<(String, String)>,
    /// Raw identifier strings that failed normalization.
    pub invalid_pwsids: Vec<String>,
    /// `(system name, pwsid)` per duplicated links-sheet row.
    pub duplicate_link_pwsids: Vec<(String, i64)>,
    /// Systems with tabular data but no boundary.
    pub missing_geometries: Vec<MissingGeometryLine>,
}

impl RunSummary {
    /// Subject line for the notification.
    #[must_use]
    pub fn subject(&self) -> String {
        format!("{} Update Summary", self.skid_name)
    }

    /// The full plain-text body.
    #[must_use]
    pub fn body(&self) -> String {
        let mut rows = vec![
            format!("{} update {}", self.skid_name, self.start.format("%Y-%m-%d")),
            "=".repeat(20),
            String::new(),
            format!("Start time: {}", self.start.format("%H:%M:%S")),
            format!("End time: {}", self.end.format("%H:%M:%S")),
            format!("Duration: {}", format_duration(self.end - self.start)),
            format!("Points loaded: {}", self.points_loaded),
            format!("Areas loaded: {}", self.areas_loaded),
        ];

        if !self.missing_coords.is_empty() {
            rows.push(format!(
                "\n{} Point records are missing coordinates",
                self.missing_coords.len()
            ));
            rows.push("-".repeat(20));
            rows.extend(count_missing_coords(&self.missing_coords));
        }

        if !self.invalid_pwsids.is_empty() {
            rows.push(format!(
                "\n{} Invalid PWSIDs found:",
                self.invalid_pwsids.len()
            ));
            rows.push("-".repeat(20));
            rows.extend(self.invalid_pwsids.iter().cloned());
        }

        if !self.duplicate_link_pwsids.is_empty() {
            rows.push(format!(
                "\n{} Duplicate PWSIDs found in the interactive maps sheet:",
                self.duplicate_link_pwsids.len()
            ));
            rows.push("-".repeat(20));
            for (name, pwsid) in &self.duplicate_link_pwsids {
                rows.push(format!("{name}: {pwsid}"));
            }
        }

        if !self.missing_geometries.is_empty() {
            rows.push(format!(
                "\n{} Systems are missing geometries:",
                self.missing_geometries.len()
            ));
            rows.push("-".repeat(20));
            for line in &self.missing_geometries {
                rows.push(format!(
                    "{}: {} (classification: {}, type: {})",
                    line.pwsid, line.system_name, line.classification, line.area_type
                ));
            }
        }

        rows.join("\n")
    }
}

/// Groups missing-coordinate records into `pws_id pws_name: count` lines,
/// largest groups first.
fn count_missing_coords(missing: &[(String, String)]) -> Vec<String> {
    let mut counts: BTreeMap<&(String, String), u64> = BTreeMap::new();
    for pair in missing {
        *counts.entry(pair).or_default() += 1;
    }

    let mut grouped: Vec<(&(String, String), u64)> = counts.into_iter().collect();
    grouped.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    grouped
        .into_iter()
        .map(|((pws_id, pws_name), count)| format!("{pws_id} {pws_name}: {count}"))
        .collect()
}

/// Formats an elapsed duration as `H:MM:SS`.
fn format_duration(duration: chrono::Duration) -> String {
    let total_seconds = duration.num_seconds().max(0);
    format!(
        "{}:{:02}:{:02}",
        total_seconds / 3600,
        (total_seconds % 3600) / 60,
        total_seconds % 60
    )
}
