use rand::Rng;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

/// A one-time numeric code proving control of an email address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetCode {
    pub email: String,
    pub code: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
    pub used: bool,
}

impl ResetCode {
    pub fn issue(email: &str, now: OffsetDateTime, ttl: Duration) -> Self {
        Self {
            email: email.trim().to_lowercase(),
            code: generate_code(),
            expires_at: now + ttl,
            used: false,
        }
    }

    pub fn is_active(&self, now: OffsetDateTime) -> bool {
        !self.used && now < self.expires_at
    }

    pub fn matches(&self, email: &str, code: &str, now: OffsetDateTime) -> bool {
        self.is_active(now) && self.email == email.trim().to_lowercase() && self.code == code.trim()
    }
}

/// Uniform over 000000..=999999.
pub fn generate_code() -> String {
    let n: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{:06}", n)
}
