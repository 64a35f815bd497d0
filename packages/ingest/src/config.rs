//! Static run configuration, embedded at compile time.
//!
//! Everything that is the same for every run (the GraphQL query document,
//! page sizes, layer URLs, mail addressing) lives in `config/skid.toml`
//! and is baked into the binary. Per-deployment values (credentials, sheet
//! IDs, endpoint URLs) come from [`crate::secrets`] instead.

use serde::Deserialize;

/// The embedded TOML document.
const SKID_TOML: &str = include_str!("../config/skid.toml");

/// Top-level run configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SkidConfig {
    /// Job name used in logs and the summary mail.
    pub skid_name: String,
    /// AGOL organization portal URL (token endpoint).
    pub agol_org: String,
    pub graphql: GraphqlConfig,
    pub layers: LayersConfig,
    pub feature_service: FeatureServiceConfig,
    pub mail: MailConfig,
}

/// GraphQL extraction settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphqlConfig {
    /// Collection field the records come back under.
    pub collection: String,
    /// Records per page.
    pub page_size: u64,
    /// Pagination guard.
    #[serde(default = "default_max_pages")]
    pub max_pages: u64,
    /// Query document with `$offset`/`$limit` variables.
    pub query: String,
}

/// Source and destination layer URLs.
#[derive(Debug, Clone, Deserialize)]
pub struct LayersConfig {
    /// Destination: lead service line points layer.
    pub points_url: String,
    /// Destination: system areas layer.
    pub areas_url: String,
    /// Source: authoritative service-area boundaries layer.
    pub service_areas_source_url: String,
}

/// Source feature-service query settings.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureServiceConfig {
    /// Records per query page.
    pub page_size: u64,
}

/// Summary mail addressing.
#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub from_address: String,
    pub to_addresses: Vec<String>,
}

const fn default_max_pages() -> u64 {
    lead_map_source::graphql::DEFAULT_MAX_PAGES
}

impl SkidConfig {
    /// Parses the embedded configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`toml::de::Error`] if the embedded document does not
    /// match this schema, which is a build problem, not a runtime one.
    pub fn embedded() -> Result<Self, toml::de::Error> {
        toml::from_str(SKID_TOML)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_config_parses() {
        let config = SkidConfig::embedded().unwrap();
        assert_eq!(config.skid_name, "lead-map");
        assert_eq!(config.graphql.collection, "getLccrMapUGRC");
        assert_eq!(config.graphql.page_size, 8000);
        assert!(config.graphql.query.contains("$offset"));
        assert!(!config.mail.to_addresses.is_empty());
    }

    #[test]
    fn max_pages_defaults_when_absent() {
        let config: SkidConfig = toml::from_str(
            r#"
            skid_name = "t"
            agol_org = "https://example.maps.arcgis.com"

            [graphql]
            collection = "c"
            page_size = 10
            query = "q"

            [layers]
            points_url = "p"
            areas_url = "a"
            service_areas_source_url = "s"

            [feature_service]
            page_size = 100

            [mail]
            from_address = "noreply@example.gov"
            to_addresses = ["ops@example.gov"]
            "#,
        )
        .unwrap();

        assert_eq!(
            config.graphql.max_pages,
            lead_map_source::graphql::DEFAULT_MAX_PAGES
        );
    }
}
