//! SMS delivery through the Twilio Messages API

use super::{check_status, http_client, ExternalServiceError};
use async_trait::async_trait;

/// Default Twilio API base
pub const DEFAULT_BASE_URL: &str = "https://api.twilio.com";

const SERVICE: &str = "Twilio";

/// Sends a text message to one phone number
#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send(&self, to: &str, body: &str) -> Result<(), ExternalServiceError>;
}

/// Twilio REST client
pub struct TwilioSmsSender {
    client: reqwest::Client,
    base_url: String,
    account_sid: String,
    auth_token: String,
    from_number: String,
}

impl std::fmt::Debug for TwilioSmsSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioSmsSender")
            .field("base_url", &self.base_url)
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"[REDACTED]")
            .field("from_number", &self.from_number)
            .finish()
    }
}

impl TwilioSmsSender {
    /// Client for the Messages API at `base_url` (normally [`DEFAULT_BASE_URL`])
    pub fn new(
        base_url: impl Into<String>,
        account_sid: impl Into<String>,
        auth_token: impl Into<String>,
        from_number: impl Into<String>,
    ) -> Result<Self, ExternalServiceError> {
        Ok(Self {
            client: http_client()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
            from_number: from_number.into(),
        })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        )
    }
}

#[async_trait]
impl SmsSender for TwilioSmsSender {
    async fn send(&self, to: &str, body: &str) -> Result<(), ExternalServiceError> {
        let form = [("To", to), ("From", self.from_number.as_str()), ("Body", body)];

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&form)
            .send()
            .await?;

        check_status(SERVICE, response).await?;
        tracing::debug!(to = %to, "SMS accepted");
        Ok(())
    }
}
