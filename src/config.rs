use std::net::SocketAddr;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub api_key: Option<String>,
    pub from: String,
    pub api_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: String,
    pub reset_code_ttl_minutes: i64,
    pub mail: MailConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let mail = MailConfig {
            api_key: std::env::var("RESEND_API_KEY").ok().filter(|k| !k.is_empty()),
            from: std::env::var("MAIL_FROM")
                .unwrap_or_else(|_| "Password Reset <onboarding@resend.dev>".into()),
            api_url: std::env::var("MAIL_API_URL")
                .unwrap_or_else(|_| "https://api.resend.com/emails".into()),
        };
        let reset_code_ttl_minutes = std::env::var("RESET_CODE_TTL_MINUTES")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|m| *m > 0)
            .unwrap_or(15);
        let port = match std::env::var("APP_PORT") {
            Ok(v) => v.parse::<u16>().with_context(|| format!("APP_PORT {:?}", v))?,
            Err(_) => 8080,
        };
        Ok(Self {
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port,
            data_dir: std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".into()),
            reset_code_ttl_minutes,
            mail,
        })
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("bind address {}:{}", self.host, self.port))
    }
}
