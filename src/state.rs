use crate::auth::mailer::{EmailSender, LogMailer, ResendMailer};
use crate::config::AppConfig;
use crate::db::Database;
use crate::storage::{FileStore, KeyValueStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub config: Arc<AppConfig>,
    pub mailer: Arc<dyn EmailSender>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let kv = Arc::new(FileStore::new(&config.data_dir).await?) as Arc<dyn KeyValueStore>;
        let db = Arc::new(Database::open(kv).await?);

        let mailer = match &config.mail.api_key {
            Some(key) => Arc::new(ResendMailer::new(
                &config.mail.api_url,
                key,
                &config.mail.from,
                config.reset_code_ttl_minutes,
            )) as Arc<dyn EmailSender>,
            None => {
                tracing::warn!("RESEND_API_KEY not set; reset codes will only be logged");
                Arc::new(LogMailer) as Arc<dyn EmailSender>
            }
        };

        Ok(Self::from_parts(db, config, mailer))
    }

    pub fn from_parts(db: Arc<Database>, config: Arc<AppConfig>, mailer: Arc<dyn EmailSender>) -> Self {
        Self { db, config, mailer }
    }

    /// In-memory store plus a mailer that just records what it was asked to send.
    #[cfg(test)]
    pub async fn fake() -> Self {
        Self::fake_with_mailer(Arc::new(crate::auth::mailer::RecordingMailer::default())).await
    }

    #[cfg(test)]
    pub async fn fake_with_mailer(mailer: Arc<dyn EmailSender>) -> Self {
        let kv = Arc::new(crate::storage::MemoryStore::new()) as Arc<dyn KeyValueStore>;
        let db = Arc::new(Database::open(kv).await.expect("memory store opens"));
        let config = Arc::new(AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            data_dir: "unused".into(),
            reset_code_ttl_minutes: 15,
            mail: crate::config::MailConfig {
                api_key: None,
                from: "test@example.com".into(),
                api_url: "http://localhost/unused".into(),
            },
        });
        Self::from_parts(db, config, mailer)
    }
}
