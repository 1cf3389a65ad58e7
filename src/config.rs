use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub mongo_url: String,
    pub mongo_db: String,
    /// Reserved for token signing; not consumed by any current endpoint.
    pub secret_key: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let mongo_url =
            std::env::var("MONGO_URL").unwrap_or_else(|_| "mongodb://mongodb:27017".into());
        let mongo_db = std::env::var("MONGO_DATABASE").unwrap_or_else(|_| "userdb".into());
        let secret_key =
            std::env::var("SECRET_KEY").unwrap_or_else(|_| "your-secret-key".into());
        Ok(Self {
            mongo_url,
            mongo_db,
            secret_key,
        })
    }
}
