//! ArcGIS feature layer query fetcher.
//!
//! Pulls every feature from a `FeatureServer` layer with
//! `resultOffset`/`resultRecordCount` pagination. Continuation is signaled
//! by `exceededTransferLimit`, because the server silently caps results at
//! its own `maxRecordCount`; a short page alone does not mean end-of-data
//! here.

use crate::{SourceError, retry};

/// Configuration for one full-layer query.
pub struct LayerQuery<'a> {
    /// Full REST layer URL, including the layer index.
    pub url: &'a str,
    /// Max records per request.
    pub page_size: u64,
    /// Spatial reference to request geometries in.
    pub out_wkid: i32,
}

/// One feature from a layer query: its attribute map plus the untouched
/// Esri-JSON geometry.
#[derive(Debug, Clone)]
pub struct LayerFeature {
    /// Attribute name/value pairs, including `FID`.
    pub attributes: serde_json::Map<String, serde_json::Value>,
    /// Esri-JSON geometry, passed through opaquely.
    pub geometry: Option<serde_json::Value>,
}

/// Fetches all features from the layer.
///
/// # Errors
///
/// Returns [`SourceError`] if a request fails or the service answers with
/// an error body.
pub async fn query_layer(
    client: &reqwest::Client,
    query: &LayerQuery<'_>,
) -> Result<Vec<LayerFeature>, SourceError> {
    let mut features = Vec::new();
    let mut offset: u64 = 0;

    loop {
        let url = format!(
            "{}/query?where=1%3D1&outFields=*&f=json&outSR={}&resultRecordCount={}&resultOffset={offset}",
            query.url, query.out_wkid, query.page_size
        );

        log::debug!("Querying layer: offset={offset}");
        let body = retry::send_json(|| client.get(&url)).await?;

        // ArcGIS reports errors in a 200 body.
        if let Some(error) = body.get("error") {
            return Err(SourceError::Api {
                message: format!("feature service error: {error}"),
            });
        }

        let page = body
            .get("features")
            .and_then(serde_json::Value::as_array)
            .cloned()
            .unwrap_or_default();

        let count = page.len() as u64;
        if count == 0 {
            break;
        }

        for feature in page {
            let Some(attributes) = feature
                .get("attributes")
                .and_then(serde_json::Value::as_object)
                .cloned()
            else {
                continue;
            };
            features.push(LayerFeature {
                attributes,
                geometry: feature.get("geometry").cloned(),
            });
        }

        offset += count;

        let exceeded = body
            .get("exceededTransferLimit")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false);
        if !exceeded {
            break;
        }
    }

    log::debug!("Layer query complete: {} features", features.len());
    Ok(features)
}
