//! Client for the notification email service.
//!
//! The service accepts `POST` requests with a JSON body of
//! `{ "to", "subject", "text" }`. When no endpoint is configured the mailer is
//! disabled and sending is a logged no-op. Failures are reported once and
//! never retried.

use crate::{
    core::report::format_amount,
    entities::{campaign, donation, user},
    errors::{Error, Result},
};
use serde::Serialize;
use tracing::{debug, info};

/// One outgoing email
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    /// Recipient address
    pub to: String,
    /// Subject line
    pub subject: String,
    /// Plain-text body
    pub text: String,
}

/// Sends [`EmailMessage`]s to the configured service
#[derive(Debug, Clone)]
pub struct Mailer {
    client: reqwest::Client,
    endpoint: Option<String>,
}

impl Mailer {
    /// A mailer that never sends anything.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: None,
        }
    }

    /// A mailer posting to `endpoint`. Blank endpoints disable it.
    #[must_use]
    pub fn new(endpoint: Option<String>) -> Self {
        let endpoint = endpoint
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty());
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }

    /// Whether an endpoint is configured
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Sends one message. Returns `false` when the mailer is disabled.
    pub async fn send(&self, message: &EmailMessage) -> Result<bool> {
        let Some(endpoint) = &self.endpoint else {
            debug!(to = %message.to, "Mail service disabled, skipping email");
            return Ok(false);
        };

        let response = self.client.post(endpoint).json(message).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Mail {
                message: format!("{status}: {body}"),
            });
        }

        info!(to = %message.to, subject = %message.subject, "Email sent");
        Ok(true)
    }
}

/// Receipt sent to a donor after their donation settles.
#[must_use]
pub fn donation_receipt(
    donor: &user::Model,
    campaign: &campaign::Model,
    donation: &donation::Model,
) -> EmailMessage {
    let mut text = format!(
        "Hi {},\n\nThank you for donating {} to \"{}\".\n\nDonation reference: #{}\n",
        donor.display_name,
        format_amount(donation.amount),
        campaign.title,
        donation.id,
    );
    if let Some(message) = &donation.message {
        text.push_str(&format!("Your message: {message}\n"));
    }

    EmailMessage {
        to: donor.email.clone(),
        subject: format!("Your donation to {}", campaign.title),
        text,
    }
}

/// Notice sent to an owner when their campaign reaches its target.
#[must_use]
pub fn campaign_completed(owner: &user::Model, campaign: &campaign::Model) -> EmailMessage {
    EmailMessage {
        to: owner.email.clone(),
        subject: format!("{} reached its goal", campaign.title),
        text: format!(
            "Hi {},\n\n\"{}\" has raised {} of its {} target from {} donation(s).\n",
            owner.display_name,
            campaign.title,
            format_amount(campaign.donated_amount),
            format_amount(campaign.target_amount),
            campaign.donor_count,
        ),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_disabled_mailer_skips() -> Result<()> {
        let mailer = Mailer::disabled();
        assert!(!mailer.is_enabled());

        let message = EmailMessage {
            to: "sam@example.com".to_string(),
            subject: "Hello".to_string(),
            text: "Body".to_string(),
        };
        assert!(!mailer.send(&message).await?);

        Ok(())
    }

    #[test]
    fn test_blank_endpoint_disables() {
        assert!(!Mailer::new(Some("   ".to_string())).is_enabled());
        assert!(!Mailer::new(None).is_enabled());
        assert!(Mailer::new(Some("http://localhost:8025/send".to_string())).is_enabled());
    }

    #[test]
    fn test_email_payload_shape() {
        let message = EmailMessage {
            to: "sam@example.com".to_string(),
            subject: "Hi".to_string(),
            text: "Thanks".to_string(),
        };
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "to": "sam@example.com",
                "subject": "Hi",
                "text": "Thanks",
            })
        );
    }

    #[test]
    fn test_donation_receipt() {
        let donor = sample_user_model("donor", "Sam");
        let mut campaign = sample_campaign_model();
        campaign.title = "Clean Water".to_string();
        let mut donation = sample_donation_model(9, 2500.0);
        donation.message = Some("For the well".to_string());

        let receipt = donation_receipt(&donor, &campaign, &donation);
        assert_eq!(receipt.to, donor.email);
        assert_eq!(receipt.subject, "Your donation to Clean Water");
        assert!(receipt.text.contains("$2,500.00"));
        assert!(receipt.text.contains("#9"));
        assert!(receipt.text.contains("For the well"));
    }

    #[test]
    fn test_campaign_completed() {
        let owner = sample_user_model("owner", "Robin");
        let mut campaign = sample_campaign_model();
        campaign.title = "Library Books".to_string();
        campaign.target_amount = 500.0;
        campaign.donated_amount = 520.0;
        campaign.donor_count = 4;

        let notice = campaign_completed(&owner, &campaign);
        assert_eq!(notice.subject, "Library Books reached its goal");
        assert!(notice.text.contains("$520.00 of its $500.00 target"));
        assert!(notice.text.contains("4 donation(s)"));
    }
}
