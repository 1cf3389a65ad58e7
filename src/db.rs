use std::time::Duration;

use anyhow::Context;
use bson::doc;
use mongodb::{
    options::{ClientOptions, IndexOptions},
    Client, Database, IndexModel,
};

use crate::config::AppConfig;
use crate::users::entity::UserDocument;

pub const USERS_COLLECTION: &str = "users";

/// Connect to the document store and verify the connection with a ping.
pub async fn connect(config: &AppConfig) -> anyhow::Result<Database> {
    let mut options = ClientOptions::parse(&config.mongo_url)
        .await
        .context("parse MONGO_URL")?;
    options.app_name = Some("userhub".into());
    options.max_pool_size = Some(10);
    options.connect_timeout = Some(Duration::from_secs(10));
    options.server_selection_timeout = Some(Duration::from_secs(30));

    let client = Client::with_options(options).context("build mongodb client")?;
    let db = client.database(&config.mongo_db);

    db.run_command(doc! { "ping": 1 })
        .await
        .context("connect to mongodb")?;

    tracing::info!(database = %config.mongo_db, "connected to mongodb");
    Ok(db)
}

/// Unique index on `email`; the store-level guarantee behind the service's
/// check-then-insert uniqueness probe.
pub async fn ensure_indexes(db: &Database) -> anyhow::Result<()> {
    let index = IndexModel::builder()
        .keys(doc! { "email": 1 })
        .options(IndexOptions::builder().unique(true).build())
        .build();

    db.collection::<UserDocument>(USERS_COLLECTION)
        .create_index(index)
        .await
        .context("create unique email index")?;
    Ok(())
}
