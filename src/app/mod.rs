pub mod pipelines;

use crate::adapters::http::build_client;
use crate::adapters::{BiggClient, KeggClient, SqliteStore};
use crate::core::ConfigProvider;
use crate::utils::error::Result;

/// REST clients sharing one connection pool.
#[derive(Debug, Clone)]
pub struct Clients {
    pub kegg: KeggClient,
    pub bigg: BiggClient,
}

impl Clients {
    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let client = build_client(config.request_timeout())?;
        Ok(Self {
            kegg: KeggClient::new(client.clone(), config.kegg_base_url()),
            bigg: BiggClient::new(client, config.bigg_base_url()),
        })
    }
}

/// Connect to the configured database and make sure the schema exists.
pub async fn open_store<C: ConfigProvider>(config: &C) -> Result<SqliteStore> {
    tracing::debug!("Connecting to {}", config.database_url());
    let store = SqliteStore::connect(config.database_url()).await?;
    store.migrate().await?;
    Ok(store)
}
