use anyhow::Context;
use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info};

/// Outbound delivery of password-reset codes.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send_reset_code(&self, to: &str, code: &str) -> anyhow::Result<()>;
}

pub fn reset_email_html(code: &str, ttl_minutes: i64) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px; border: 1px solid #e0e0e0; border-radius: 8px;">
  <h1 style="color: #333; font-size: 24px;">Reset Your Password</h1>
  <p style="color: #666; font-size: 16px; line-height: 1.5;">Use the verification code below to reset your password:</p>
  <div style="background-color: #f4f7fb; padding: 15px; border-radius: 6px; margin: 20px 0; text-align: center;">
    <p style="font-size: 24px; font-weight: bold; letter-spacing: 5px; margin: 0; color: #1a1a1a;">{code}</p>
  </div>
  <p style="color: #666; font-size: 16px; line-height: 1.5;">This code will expire in {ttl_minutes} minutes. If you didn't request a password reset, you can ignore this email.</p>
</div>"#
    )
}

/// Sends through the Resend HTTP API.
pub struct ResendMailer {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    from: String,
    ttl_minutes: i64,
}

impl ResendMailer {
    pub fn new(endpoint: &str, api_key: &str, from: &str, ttl_minutes: i64) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
            from: from.to_string(),
            ttl_minutes,
        }
    }
}

#[async_trait]
impl EmailSender for ResendMailer {
    async fn send_reset_code(&self, to: &str, code: &str) -> anyhow::Result<()> {
        let body = json!({
            "from": self.from,
            "to": [to],
            "subject": "Reset Your Password",
            "html": reset_email_html(code, self.ttl_minutes),
        });
        let res = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("email api request")?;

        let status = res.status();
        if !status.is_success() {
            let detail = res.text().await.unwrap_or_default();
            anyhow::bail!("email api returned {}: {}", status, detail);
        }
        debug!(to, "reset email accepted by provider");
        Ok(())
    }
}

/// Fallback when no provider is configured: the code only goes to the log.
pub struct LogMailer;

#[async_trait]
impl EmailSender for LogMailer {
    async fn send_reset_code(&self, to: &str, code: &str) -> anyhow::Result<()> {
        info!(to, code, "reset code (no email provider configured)");
        Ok(())
    }
}

#[cfg(test)]
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: tokio::sync::Mutex<Vec<(String, String)>>,
}

#[cfg(test)]
impl RecordingMailer {
    pub async fn last_code_for(&self, to: &str) -> Option<String> {
        self.sent
            .lock()
            .await
            .iter()
            .rev()
            .find(|(addr, _)| addr == to)
            .map(|(_, code)| code.clone())
    }
}

#[cfg(test)]
#[async_trait]
impl EmailSender for RecordingMailer {
    async fn send_reset_code(&self, to: &str, code: &str) -> anyhow::Result<()> {
        self.sent.lock().await.push((to.to_string(), code.to_string()));
        Ok(())
    }
}

#[cfg(test)]
pub struct FailingMailer;

#[cfg(test)]
#[async_trait]
impl EmailSender for FailingMailer {
    async fn send_reset_code(&self, _to: &str, _code: &str) -> anyhow::Result<()> {
        anyhow::bail!("smtp relay unavailable")
    }
}
