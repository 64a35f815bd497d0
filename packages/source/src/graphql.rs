//! Paginated GraphQL record fetcher.
//!
//! The lead service line endpoint exposes one collection field queried with
//! `offset`/`limit` variables. Pages are requested at increasing offsets
//! until a page comes back shorter than the limit, which means a dataset
//! whose size is an exact multiple of the page size costs one extra,
//! empty-yielding request before the loop can stop.

use crate::{SourceError, retry};

/// Guard on the pagination loop. A source that keeps returning full pages
/// (misconfigured limit, server ignoring `offset`) fails with
/// [`SourceError::PageLimitExceeded`] instead of spinning forever.
pub const DEFAULT_MAX_PAGES: u64 = 1000;

/// Configuration for a paginated GraphQL fetch.
pub struct GraphqlQuery<'a> {
    /// GraphQL endpoint URL.
    pub url: &'a str,
    /// Query document with `$offset`/`$limit` variables.
    pub query: &'a str,
    /// Name of the collection field the records come back under.
    pub collection: &'a str,
    /// Records per page.
    pub page_size: u64,
}

/// Fetches every record from a paginated GraphQL collection.
///
/// # Errors
///
/// Returns [`SourceError`] if any page request fails, the response carries a
/// GraphQL `errors` array, the collection field is missing, or the loop runs
/// past `max_pages`. A failed page aborts the whole fetch; there is no
/// partial-result recovery.
pub async fn fetch_records(
    client: &reqwest::Client,
    config: &GraphqlQuery<'_>,
    max_pages: u64,
) -> Result<Vec<serde_json::Value>, SourceError> {
    drain_pages(config.page_size, max_pages, |offset| {
        let body = serde_json::json!({
            "query": config.query,
            "variables": { "offset": offset, "limit": config.page_size },
        });
        async move {
            let response = retry::send_json(|| client.post(config.url).json(&body)).await?;
            extract_records(&response, config.collection)
        }
    })
    .await
}

/// Drives the offset/limit loop, accumulating records until a short page.
///
/// Factored over an async closure so the termination behavior is testable
/// without a live endpoint.
async fn drain_pages<F, Fut>(
    page_size: u64,
    max_pages: u64,
    mut fetch_page: F,
) -> Result<Vec<serde_json::Value>, SourceError>
where
    F: FnMut(u64) -> Fut,
    Fut: Future<Output = Result<Vec<serde_json::Value>, SourceError>>,
{
    let mut records = Vec::new();
    let mut offset: u64 = 0;
    let mut pages: u64 = 0;

    loop {
        if pages >= max_pages {
            return Err(SourceError::PageLimitExceeded { pages });
        }

        let page = fetch_page(offset).await?;
        let count = page.len() as u64;
        log::debug!("offset {offset}: {count} records");

        records.extend(page);
        pages += 1;

        if count < page_size {
            break;
        }
        offset += page_size;
    }

    Ok(records)
}

/// Pulls the record array out of a GraphQL response body.
fn extract_records(
    body: &serde_json::Value,
    collection: &str,
) -> Result<Vec<serde_json::Value>, SourceError> {
    if let Some(errors) = body.get("errors").and_then(serde_json::Value::as_array) {
        let messages: Vec<&str> = errors
            .iter()
            .filter_map(|e| e.get("message").and_then(serde_json::Value::as_str))
            .collect();
        return Err(SourceError::Api {
            message: format!("GraphQL errors: {}", messages.join("; ")),
        });
    }

    body.get("data")
        .and_then(|data| data.get(collection))
        .and_then(serde_json::Value::as_array)
        .cloned()
        .ok_or_else(|| SourceError::Api {
            message: format!("response does not contain data.{collection}"),
        })
}
