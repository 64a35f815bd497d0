//! SendGrid mail delivery.
//!
//! A thin wrapper over the v3 `mail/send` JSON API: subject, plain-text
//! body, optional file attachment. The subject is prefixed with the
//! configured job identity so operator inboxes sort by source.

use std::path::PathBuf;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;

use crate::NotifyError;

/// SendGrid v3 send endpoint.
const SEND_URL: &str = "https://api.sendgrid.com/v3/mail/send";

/// One outbound message.
#[derive(Debug, Clone)]
pub struct MessageDetails {
    pub subject: String,
    /// Plain-text body.
    pub body: String,
    /// Optional file to attach.
    pub attachment: Option<PathBuf>,
}

/// Static mail configuration for a deployment.
#[derive(Debug, Clone, Deserialize)]
pub struct SendGridSettings {
    pub from_address: String,
    pub to_addresses: Vec<String>,
    /// Prepended to every subject line (e.g. `"lead-map on gcf: "`).
    pub prefix: String,
}

/// Sends run notifications through SendGrid.
pub struct SendGridHandler {
    api_key: String,
    settings: SendGridSettings,
}

impl SendGridHandler {
    #[must_use]
    pub const fn new(api_key: String, settings: SendGridSettings) -> Self {
        Self { api_key, settings }
    }

    /// Delivers the message.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] if the attachment cannot be read, the request
    /// fails, or SendGrid answers with a non-success status.
    pub async fn notify(
        &self,
        client: &reqwest::Client,
        message: &MessageDetails,
    ) -> Result<(), NotifyError> {
        let payload = self.build_payload(message)?;

        log::info!("Sending summary notification: {}", message.subject);
        let response = client
            .post(SEND_URL)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Api {
                status: status.as_u16(),
            });
        }
        Ok(())
    }

    fn build_payload(&self, message: &MessageDetails) -> Result<serde_json::Value, NotifyError> {
        let recipients: Vec<serde_json::Value> = self
            .settings
            .to_addresses
            .iter()
            .map(|address| serde_json::json!({ "email": address }))
            .collect();

        let mut payload = serde_json::json!({
            "personalizations": [{ "to": recipients }],
            "from": { "email": self.settings.from_address },
            "subject": format!("{}{}", self.settings.prefix, message.subject),
            "content": [{ "type": "text/plain", "value": message.body }],
        });

        if let Some(path) = &message.attachment {
            let bytes = std::fs::read(path)?;
            let filename = path
                .file_name()
                .map_or_else(|| "attachment.txt".to_owned(), |n| n.to_string_lossy().into_owned());
            payload["attachments"] = serde_json::json!([{
                "content": BASE64.encode(bytes),
                "filename": filename,
                "type": "text/plain",
                "disposition": "attachment",
            }]);
        }

        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler() -> SendGridHandler {
        SendGridHandler::new(
            "key".to_owned(),
            SendGridSettings {
                from_address: "noreply@example.gov".to_owned(),
                to_addresses: vec!["ops@example.gov".to_owned()],
                prefix: "lead-map on gcf: ".to_owned(),
            },
        )
    }

    #[test]
    fn payload_prefixes_the_subject() {
        let payload = handler()
            .build_payload(&MessageDetails {
                subject: "lead-map Update Summary".to_owned(),
                body: "ok".to_owned(),
                attachment: None,
            })
            .unwrap();

        assert_eq!(
            payload["subject"],
            serde_json::json!("lead-map on gcf: lead-map Update Summary")
        );
        assert_eq!(
            payload["personalizations"][0]["to"][0]["email"],
            serde_json::json!("ops@example.gov")
        );
        assert!(payload.get("attachments").is_none());
    }

    #[test]
    fn attachment_is_base64_encoded() {
        let path = std::env::temp_dir().join("lead_map_notify_test_attachment.txt");
        std::fs::write(&path, b"log line").unwrap();

        let payload = handler()
            .build_payload(&MessageDetails {
                subject: "s".to_owned(),
                body: "b".to_owned(),
                attachment: Some(path.clone()),
            })
            .unwrap();

        assert_eq!(
            payload["attachments"][0]["content"],
            serde_json::json!(BASE64.encode(b"log line"))
        );
        assert_eq!(
            payload["attachments"][0]["filename"],
            serde_json::json!("lead_map_notify_test_attachment.txt")
        );

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn missing_attachment_file_is_an_error() {
        let result = handler().build_payload(&MessageDetails {
            subject: "s".to_owned(),
            body: "b".to_owned(),
            attachment: Some(PathBuf::from("/no/such/file.txt")),
        });
        assert!(matches!(result, Err(NotifyError::Io(_))));
    }
}
