//! Google Sheets worksheet fetcher.
//!
//! Reads a whole tab through the Sheets v4 `values.get` endpoint and hands
//! back the raw 2-D grid. Header handling (including the approved-systems
//! tab's formatting-artifact first row) lives in [`crate::table`].

use crate::{SourceError, retry};

/// Base URL of the Google Sheets v4 REST API.
const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Identifies one worksheet tab within a spreadsheet.
pub struct WorksheetRef<'a> {
    /// Spreadsheet document ID.
    pub spreadsheet_id: &'a str,
    /// Worksheet tab title.
    pub tab: &'a str,
}

/// Fetches a worksheet as a grid of cell strings.
///
/// Ragged rows are returned as-is; trailing empty cells are simply absent,
/// which the table layer treats the same as an empty string.
///
/// # Errors
///
/// Returns [`SourceError`] if the request fails or the response body is not
/// the expected `values` shape.
pub async fn load_worksheet(
    client: &reqwest::Client,
    api_key: &str,
    sheet: &WorksheetRef<'_>,
) -> Result<Vec<Vec<String>>, SourceError> {
    let url = format!(
        "{SHEETS_API}/{}/values/{}?majorDimension=ROWS&key={api_key}",
        sheet.spreadsheet_id, sheet.tab
    );

    log::debug!("Loading worksheet '{}'", sheet.tab);
    let body = retry::send_json(|| client.get(&url)).await?;

    if let Some(error) = body.get("error") {
        let message = error
            .get("message")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("unknown Sheets API error");
        return Err(SourceError::Api {
            message: message.to_owned(),
        });
    }

    // An entirely empty tab has no "values" key at all.
    let rows = body
        .get("values")
        .and_then(serde_json::Value::as_array)
        .cloned()
        .unwrap_or_default();

    Ok(rows
        .into_iter()
        .map(|row| {
            row.as_array()
                .map(|cells| cells.iter().map(cell_to_string).collect())
                .unwrap_or_default()
        })
        .collect())
}

/// The Sheets API returns formatted cell values as strings, but be lenient
/// about numbers and booleans anyway.
fn cell_to_string(cell: &serde_json::Value) -> String {
    match cell {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}
