//! Per-deployment secrets.
//!
//! Loaded once per run, before any network call: from the cloud secret
//! mount when present, otherwise from a local development copy. A missing
//! secrets file is fatal, since there is nothing useful a sync run can do
//! without credentials.

use std::path::Path;

use serde::Deserialize;

/// Cloud secret mount location.
const MOUNT_PATH: &str = "/secrets/app/secrets.json";

/// Local development fallback, relative to the working directory.
const LOCAL_PATH: &str = "secrets/secrets.json";

/// Everything a run needs that varies per deployment.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Secrets {
    pub agol_user: String,
    pub agol_password: String,
    pub sendgrid_api_key: String,
    /// Lead service line GraphQL endpoint.
    pub graphql_url: String,
    pub sheets_api_key: String,
    /// Approved-systems spreadsheet ID and tab title.
    pub sheet_id: String,
    pub sheet_name: String,
    /// Interactive-map links spreadsheet ID and tab title.
    pub links_id: String,
    pub links_name: String,
}

/// Errors while loading secrets.
#[derive(Debug, thiserror::Error)]
pub enum SecretsError {
    /// Neither the mount point nor the local copy exists.
    #[error("secrets file not found; looked for {MOUNT_PATH} and {LOCAL_PATH}")]
    NotFound,

    /// The file exists but could not be read.
    #[error("failed to read secrets: {0}")]
    Io(#[from] std::io::Error),

    /// The file exists but is not valid secrets JSON.
    #[error("failed to parse secrets: {0}")]
    Json(#[from] serde_json::Error),
}

/// Loads secrets from the mount point, falling back to the local copy.
///
/// # Errors
///
/// Returns [`SecretsError`] when no file is found or it cannot be parsed.
pub fn load() -> Result<Secrets, SecretsError> {
    for path in [MOUNT_PATH, LOCAL_PATH] {
        let path = Path::new(path);
        if path.exists() {
            log::debug!("Loading secrets from {}", path.display());
            let text = std::fs::read_to_string(path)?;
            return parse(&text);
        }
    }
    Err(SecretsError::NotFound)
}

fn parse(text: &str) -> Result<Secrets, SecretsError> {
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_deployment_key_names() {
        let secrets = parse(
            r#"{
                "AGOL_USER": "user",
                "AGOL_PASSWORD": "pass",
                "SENDGRID_API_KEY": "sg",
                "GRAPHQL_URL": "https://example.gov/graphql",
                "SHEETS_API_KEY": "sheets",
                "SHEET_ID": "abc",
                "SHEET_NAME": "Approved",
                "LINKS_ID": "def",
                "LINKS_NAME": "Links"
            }"#,
        )
        .unwrap();

        assert_eq!(secrets.agol_user, "user");
        assert_eq!(secrets.links_name, "Links");
    }

    #[test]
    fn missing_keys_are_an_error() {
        assert!(matches!(
            parse(r#"{ "AGOL_USER": "user" }"#),
            Err(SecretsError::Json(_))
        ));
    }
}
