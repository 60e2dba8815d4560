//! Outbound email through the SendGrid v3 HTTP API
//!
//! Emails are best-effort: handlers hand them to [`Mailer::send_in_background`]
//! and never wait on or observe the result.

use serde_json::json;
use thiserror::Error;

const SENDGRID_SEND_URL: &str = "https://api.sendgrid.com/v3/mail/send";

#[derive(Error, Debug)]
pub enum EmailError {
    #[error("Email transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Email provider rejected message ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// A rendered message ready to send
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

impl OutgoingEmail {
    /// Sent to customers the first time they sign up for the beta
    pub fn welcome(to: &str) -> Self {
        Self {
            to: to.to_string(),
            subject: "Finally, financial advice that reduces anxiety".to_string(),
            text: "Hi there,\n\n\
                   Thank you for joining the beta.\n\n\
                   Your lessons and calculators are waiting on your dashboard. \
                   Start with one calculator, then one lesson. \
                   Progress beats perfection.\n\n\
                   All the Best,\nThe ZeroFinanx Team"
                .to_string(),
            html: "<p>Hi there,</p>\
                   <p>Thank you for joining the beta.</p>\
                   <p>Your lessons and calculators are waiting on your dashboard. \
                   Start with one calculator, then one lesson. \
                   <em>Progress beats perfection.</em></p>\
                   <p>All the Best,<br>The ZeroFinanx Team</p>"
                .to_string(),
        }
    }

    /// Sent when an email joins the waitlist
    pub fn waitlist_confirmation(to: &str) -> Self {
        Self {
            to: to.to_string(),
            subject: "You're on the ZeroFinanx waitlist!".to_string(),
            text: "Hi there,\n\n\
                   Thanks for joining our waitlist! You'll be among the first to know \
                   when ZeroFinanx launches.\n\n\
                   All the Best,\nThe ZeroFinanx Team"
                .to_string(),
            html: "<p>Hi there,</p>\
                   <p>Thanks for joining our waitlist! You'll be among the first to know \
                   when ZeroFinanx launches.</p>\
                   <p>All the Best,<br>The ZeroFinanx Team</p>"
                .to_string(),
        }
    }
}

/// SendGrid client; disabled when no API key is configured
#[derive(Clone)]
pub struct Mailer {
    client: reqwest::Client,
    api_key: Option<String>,
    from: String,
}

impl Mailer {
    pub fn new(api_key: Option<String>, from: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            from: from.into(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    /// Send a message and wait for the provider's answer
    pub async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
        let Some(api_key) = &self.api_key else {
            tracing::info!("SENDGRID_API_KEY not configured - skipping email to {}", email.to);
            return Ok(());
        };

        let payload = json!({
            "personalizations": [{ "to": [{ "email": email.to }] }],
            "from": { "email": self.from },
            "subject": email.subject,
            "content": [
                { "type": "text/plain", "value": email.text },
                { "type": "text/html", "value": email.html },
            ],
        });

        let response = self
            .client
            .post(SENDGRID_SEND_URL)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!("Email '{}' sent to {}", email.subject, email.to);
        Ok(())
    }

    /// Send without blocking the caller; failures are only logged
    pub fn send_in_background(&self, email: OutgoingEmail) -> tokio::task::JoinHandle<()> {
        let mailer = self.clone();
        tokio::spawn(async move {
            if let Err(e) = mailer.send(&email).await {
                tracing::error!("Failed to send '{}' to {}: {}", email.subject, email.to, e);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_address_recipient() {
        let welcome = OutgoingEmail::welcome("jane@example.com");
        assert_eq!(welcome.to, "jane@example.com");
        assert!(welcome.text.contains("joining the beta"));

        let waitlist = OutgoingEmail::waitlist_confirmation("joe@example.com");
        assert_eq!(waitlist.to, "joe@example.com");
        assert!(waitlist.subject.contains("waitlist"));
    }

    #[tokio::test]
    async fn test_disabled_mailer_skips_send() {
        let mailer = Mailer::new(None, "hello@zerofinanx.com");
        assert!(!mailer.is_enabled());

        let email = OutgoingEmail::welcome("jane@example.com");
        assert!(mailer.send(&email).await.is_ok());

        // Background sends complete without surfacing anything
        mailer.send_in_background(email).await.unwrap();
    }
}
