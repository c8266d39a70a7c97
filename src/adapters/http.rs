//! Thin REST clients for KEGG and BiGG.

use crate::core::kegg;
use crate::domain::model::{BiggVersion, KeggInfo};
use crate::utils::error::Result;
use reqwest::Client;
use std::time::Duration;

pub const KEGG_BASE_URL: &str = "http://rest.kegg.jp";
pub const BIGG_BASE_URL: &str = "http://bigg.ucsd.edu/api/v2";

/// One connection pool shared by every request of a run.
pub fn build_client(timeout: Duration) -> Result<Client> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(concat!("metanetx-post/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

fn join(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path)
}

#[derive(Debug, Clone)]
pub struct KeggClient {
    client: Client,
    base_url: String,
}

impl KeggClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    async fn get_text(&self, path: &str) -> Result<String> {
        let url = join(&self.base_url, path);
        tracing::debug!("GET {}", url);
        let response = self.client.get(&url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }

    /// KEGG database version information.
    pub async fn info(&self) -> Result<KeggInfo> {
        let text = self.get_text("info/kegg").await?;
        let release = kegg::parse_release(&text);
        Ok(KeggInfo { text, release })
    }

    /// The full reaction list, read chunk by chunk into one buffer.
    pub async fn list_reactions(&self) -> Result<String> {
        let url = join(&self.base_url, "list/reaction");
        tracing::debug!("GET {}", url);
        let mut response = self.client.get(&url).send().await?.error_for_status()?;

        let mut buffer = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            buffer.extend_from_slice(&chunk);
        }
        tracing::debug!("Received {} bytes of KEGG reaction list", buffer.len());
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    /// Flat-file description of a single entry, e.g. `R00001`.
    pub async fn get_entry(&self, identifier: &str) -> Result<String> {
        self.get_text(&format!("get/{}", identifier)).await
    }

    /// MDL MOL block of a compound entry, e.g. `C00001`.
    pub async fn get_mol(&self, identifier: &str) -> Result<String> {
        self.get_text(&format!("get/{}/mol", identifier)).await
    }
}

#[derive(Debug, Clone)]
pub struct BiggClient {
    client: Client,
    base_url: String,
}

impl BiggClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    async fn get_text(&self, path: &str) -> Result<String> {
        let url = join(&self.base_url, path);
        tracing::debug!("GET {}", url);
        let response = self.client.get(&url).send().await?.error_for_status()?;
        // text() 會依照 Content-Type 的 charset 解碼
        Ok(response.text().await?)
    }

    pub async fn database_version(&self) -> Result<BiggVersion> {
        let text = self.get_text("database_version").await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// All universal reactions as the raw JSON body.
    pub async fn universal_reactions(&self) -> Result<String> {
        self.get_text("universal/reactions").await
    }
}
