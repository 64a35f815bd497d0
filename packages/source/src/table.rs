//! Header-aware view over a worksheet grid.
//!
//! Sheets come back as bare string grids. [`SheetTable`] names the columns
//! and normalizes missing values: an empty (or whitespace-only) cell and an
//! absent trailing cell both read as `None`, so downstream null-checks see a
//! single missing-value representation regardless of how the sheet encoded
//! it.

use std::collections::BTreeMap;

use crate::SourceError;

/// A worksheet with named columns.
#[derive(Debug, Clone)]
pub struct SheetTable {
    columns: Vec<String>,
    rows: Vec<SheetRow>,
}

/// One data row; only non-empty cells are stored.
#[derive(Debug, Clone, Default)]
pub struct SheetRow(BTreeMap<String, String>);

impl SheetRow {
    /// Returns the cell under `column`, or `None` when the cell was empty,
    /// missing, or the column does not exist.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.0.get(column).map(String::as_str)
    }
}

impl SheetTable {
    /// Builds a table whose header is the grid's first row.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Table`] when the grid has no header row.
    pub fn from_grid(grid: Vec<Vec<String>>) -> Result<Self, SourceError> {
        let mut rows = grid.into_iter();
        let header = rows.next().ok_or_else(|| SourceError::Table {
            message: "worksheet is empty; no header row".to_owned(),
        })?;
        Ok(Self::build(header, rows))
    }

    /// Builds a table from a grid whose first physical row is a formatting
    /// artifact and the true header is the second row. The artifact row is
    /// discarded.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Table`] when the grid is too short to contain
    /// the artifact row plus a header.
    pub fn from_grid_skipping_artifact_row(grid: Vec<Vec<String>>) -> Result<Self, SourceError> {
        if grid.len() < 2 {
            return Err(SourceError::Table {
                message: format!(
                    "worksheet has {} row(s); expected a formatting row plus a header",
                    grid.len()
                ),
            });
        }
        let mut rows = grid.into_iter();
        rows.next();
        let header = rows.next().unwrap_or_default();
        Ok(Self::build(header, rows))
    }

    fn build(header: Vec<String>, rows: impl Iterator<Item = Vec<String>>) -> Self {
        let columns: Vec<String> = header.into_iter().map(|c| c.trim().to_owned()).collect();

        let rows = rows
            .map(|cells| {
                let mut row = BTreeMap::new();
                for (column, cell) in columns.iter().zip(cells) {
                    if !column.is_empty() && !cell.trim().is_empty() {
                        row.insert(column.clone(), cell);
                    }
                }
                SheetRow(row)
            })
            .collect();

        Self { columns, rows }
    }

    /// Column names, in sheet order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Data rows, in sheet order.
    #[must_use]
    pub fn rows(&self) -> &[SheetRow] {
        &self.rows
    }

    /// Number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(ToString::to_string).collect())
            .collect()
    }

    #[test]
    fn artifact_row_is_discarded_and_second_row_becomes_header() {
        let table = SheetTable::from_grid_skipping_artifact_row(grid(&[
            &["Approved systems tracking", "", ""],
            &["PWS ID", "Time", "System Name"],
            &["UTAH1234", "1/1/2024", "Central Valley"],
        ]))
        .unwrap();

        assert_eq!(table.columns(), ["PWS ID", "Time", "System Name"]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].get("PWS ID"), Some("UTAH1234"));
        assert_eq!(table.rows()[0].get("System Name"), Some("Central Valley"));
    }

    #[test]
    fn empty_cells_read_as_none() {
        let table = SheetTable::from_grid(grid(&[
            &["PWSID", "Water Systme Name", "Interactive map link"],
            &["UTAH1234", "", "   "],
        ]))
        .unwrap();

        let row = &table.rows()[0];
        assert_eq!(row.get("PWSID"), Some("UTAH1234"));
        assert_eq!(row.get("Water Systme Name"), None);
        assert_eq!(row.get("Interactive map link"), None);
    }

    #[test]
    fn short_rows_read_as_none_for_trailing_columns() {
        let table = SheetTable::from_grid(grid(&[
            &["PWSID", "Water Systme Name"],
            &["UTAH1234"],
        ]))
        .unwrap();

        assert_eq!(table.rows()[0].get("Water Systme Name"), None);
    }

    #[test]
    fn unknown_columns_read_as_none() {
        let table = SheetTable::from_grid(grid(&[&["PWSID"], &["UTAH1234"]])).unwrap();
        assert_eq!(table.rows()[0].get("No Such Column"), None);
    }

    #[test]
    fn empty_grid_is_an_error() {
        assert!(SheetTable::from_grid(Vec::new()).is_err());
        assert!(SheetTable::from_grid_skipping_artifact_row(grid(&[&["only row"]])).is_err());
    }
}
