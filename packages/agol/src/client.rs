//! Hosted feature layer write client.
//!
//! The pipeline's only write path: generate a portal token, truncate the
//! destination layer (`deleteFeatures` with `where=1=1`), then bulk-add the
//! new features in chunks. Every run is a full replace; there is no
//! incremental diff.

use async_trait::async_trait;
use serde::Deserialize;

use crate::AgolError;

/// Features per `addFeatures` request.
const ADD_CHUNK_SIZE: usize = 500;

/// One feature destined for a hosted layer: an attribute map plus Esri-JSON
/// geometry.
#[derive(Debug, Clone)]
pub struct Feature {
    /// Destination-named attributes.
    pub attributes: serde_json::Map<String, serde_json::Value>,
    /// Esri-JSON geometry (`{"x": …, "y": …, "spatialReference": …}` for
    /// points, `{"rings": …}` for polygons).
    pub geometry: Option<serde_json::Value>,
}

impl Feature {
    fn to_esri_json(&self) -> serde_json::Value {
        serde_json::json!({
            "attributes": self.attributes,
            "geometry": self.geometry,
        })
    }
}

/// The destination write seam. The orchestrator only ever needs "replace
/// this layer's contents with these features".
#[async_trait]
pub trait FeatureLoader: Send + Sync {
    /// Truncates the layer and loads `features`, returning the count loaded.
    ///
    /// # Errors
    ///
    /// Returns [`AgolError`] if the truncate or any add request fails; a
    /// failed load does not roll back, but it stops the run.
    async fn truncate_and_load(
        &self,
        layer_url: &str,
        features: &[Feature],
    ) -> Result<u64, AgolError>;
}

/// REST implementation of [`FeatureLoader`] against ArcGIS Online.
pub struct ServiceUpdater {
    client: reqwest::Client,
    token: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: Option<String>,
    error: Option<serde_json::Value>,
}

impl ServiceUpdater {
    /// Authenticates against the org portal and returns a ready updater.
    ///
    /// # Errors
    ///
    /// Returns [`AgolError::Token`] when the portal refuses the credentials.
    pub async fn connect(
        client: reqwest::Client,
        org_url: &str,
        username: &str,
        password: &str,
    ) -> Result<Self, AgolError> {
        let url = format!("{org_url}/sharing/rest/generateToken");
        let params = [
            ("username", username),
            ("password", password),
            ("referer", org_url),
            ("f", "json"),
        ];

        log::debug!("Requesting portal token from {org_url}");
        let response: TokenResponse = client.post(&url).form(&params).send().await?.json().await?;

        match response.token {
            Some(token) => Ok(Self { client, token }),
            None => Err(AgolError::Token {
                message: response
                    .error
                    .map_or_else(|| "no token in response".to_owned(), |e| e.to_string()),
            }),
        }
    }

    async fn truncate(&self, layer_url: &str) -> Result<(), AgolError> {
        let url = format!("{layer_url}/deleteFeatures");
        let params = [
            ("where", "1=1"),
            ("f", "json"),
            ("token", self.token.as_str()),
        ];

        log::info!("Truncating layer {layer_url}");
        let body: serde_json::Value = self
            .client
            .post(&url)
            .form(&params)
            .send()
            .await?
            .json()
            .await?;

        if let Some(error) = body.get("error") {
            return Err(AgolError::Service {
                message: format!("truncate failed: {error}"),
            });
        }
        Ok(())
    }

    async fn add_chunk(&self, layer_url: &str, chunk: &[Feature]) -> Result<u64, AgolError> {
        let url = format!("{layer_url}/addFeatures");
        let features: Vec<serde_json::Value> = chunk.iter().map(Feature::to_esri_json).collect();
        let payload = serde_json::to_string(&features)?;
        let params = [
            ("features", payload.as_str()),
            ("f", "json"),
            ("token", self.token.as_str()),
        ];

        let body: serde_json::Value = self
            .client
            .post(&url)
            .form(&params)
            .send()
            .await?
            .json()
            .await?;

        if let Some(error) = body.get("error") {
            return Err(AgolError::Service {
                message: format!("addFeatures failed: {error}"),
            });
        }

        let results = body
            .get("addResults")
            .and_then(serde_json::Value::as_array)
            .cloned()
            .unwrap_or_default();

        let succeeded = results
            .iter()
            .filter(|r| {
                r.get("success")
                    .and_then(serde_json::Value::as_bool)
                    .unwrap_or(false)
            })
            .count();

        if succeeded != chunk.len() {
            return Err(AgolError::Service {
                message: format!(
                    "addFeatures reported {} failures",
                    chunk.len() - succeeded
                ),
            });
        }

        Ok(succeeded as u64)
    }
}

#[async_trait]
impl FeatureLoader for ServiceUpdater {
    async fn truncate_and_load(
        &self,
        layer_url: &str,
        features: &[Feature],
    ) -> Result<u64, AgolError> {
        self.truncate(layer_url).await?;

        let mut loaded: u64 = 0;
        for chunk in features.chunks(ADD_CHUNK_SIZE) {
            loaded += self.add_chunk(layer_url, chunk).await?;
            log::debug!("{loaded}/{} features loaded", features.len());
        }

        log::info!("Loaded {loaded} features into {layer_url}");
        Ok(loaded)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn feature_serializes_to_esri_json() {
        let mut attributes = serde_json::Map::new();
        attributes.insert("pwsid".to_owned(), json!(1234));
        let feature = Feature {
            attributes,
            geometry: Some(json!({ "x": 1.0, "y": 2.0 })),
        };

        let value = feature.to_esri_json();
        assert_eq!(value["attributes"]["pwsid"], json!(1234));
        assert_eq!(value["geometry"]["x"], json!(1.0));
    }

    #[test]
    fn missing_geometry_serializes_as_null() {
        let feature = Feature {
            attributes: serde_json::Map::new(),
            geometry: None,
        };
        assert!(feature.to_esri_json()["geometry"].is_null());
    }
}
