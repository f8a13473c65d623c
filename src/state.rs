use std::sync::Arc;

use crate::auth::jwt::JwtKeys;
use crate::auth::repo::{PgUserStore, UserStore};
use crate::config::AppConfig;
use crate::jobs::repo::{JobStore, PgJobStore};
use crate::mailer::{self, Mailer};
use crate::storage::{Storage, StorageClient};

#[derive(Clone)]
pub struct AppState {
    pub jwt: JwtKeys,
    pub users: Arc<dyn UserStore>,
    pub jobs: Arc<dyn JobStore>,
    pub storage: Arc<dyn StorageClient>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;

        let db = crate::db::connect(&config.database_url).await?;
        let storage = Arc::new(Storage::new(&config.storage).await?) as Arc<dyn StorageClient>;
        let mailer = mailer::from_config(&config.email).await;

        Ok(Self {
            jwt: JwtKeys::new(&config.jwt),
            users: Arc::new(PgUserStore::new(db.clone())),
            jobs: Arc::new(PgJobStore::new(db)),
            storage,
            mailer,
        })
    }
}
