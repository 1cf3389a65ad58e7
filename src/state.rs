use std::sync::Arc;

use crate::config::AppConfig;
use crate::db;
use crate::users::repo::{InMemoryUserStore, MongoUserStore, UserStore};
use crate::users::services::UserService;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: UserService,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        if config.secret_key == "your-secret-key" {
            tracing::warn!("SECRET_KEY not set; using development default");
        }

        let db = db::connect(&config).await?;
        if let Err(e) = db::ensure_indexes(&db).await {
            tracing::warn!(error = %e, "could not create indexes; continuing");
        }

        let store = Arc::new(MongoUserStore::new(db)) as Arc<dyn UserStore>;
        Ok(Self::from_parts(config, store))
    }

    pub fn from_parts(config: Arc<AppConfig>, store: Arc<dyn UserStore>) -> Self {
        Self {
            config,
            users: UserService::new(store),
        }
    }

    pub fn fake() -> Self {
        let config = Arc::new(AppConfig {
            mongo_url: "mongodb://localhost:27017".into(),
            mongo_db: "userhub-test".into(),
            secret_key: "test".into(),
        });
        let store = Arc::new(InMemoryUserStore::new()) as Arc<dyn UserStore>;
        Self::from_parts(config, store)
    }
}
