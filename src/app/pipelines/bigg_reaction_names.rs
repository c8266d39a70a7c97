use super::BIGG_REACTION_NAMESPACE;
use crate::adapters::{BiggClient, SqliteStore};
use crate::core::{bigg, LoadSummary, Pipeline, Storage};
use crate::domain::model::{RawResponse, ReactionName};
use crate::utils::error::{EtlError, Result};
use std::collections::BTreeMap;

/// BiGG universal reaction names attached to reactions with BiGG annotations.
pub struct BiggReactionNamePipeline {
    bigg: BiggClient,
    store: Option<SqliteStore>,
    batch_size: usize,
}

impl BiggReactionNamePipeline {
    pub fn new(bigg: BiggClient, store: SqliteStore, batch_size: usize) -> Self {
        Self {
            bigg,
            store: Some(store),
            batch_size: batch_size.max(1),
        }
    }

    /// A pipeline that can only [`collect`](Self::collect); `load` needs a store.
    pub fn without_store(bigg: BiggClient) -> Self {
        Self {
            bigg,
            store: None,
            batch_size: 1,
        }
    }

    /// Extract and transform: the identifier to name mapping.
    pub async fn collect(&self) -> Result<BTreeMap<String, String>> {
        let raw = self.extract().await?;
        self.transform(raw).await
    }

    /// Write the mapping as compact JSON.
    pub async fn dump<S: Storage>(
        &self,
        storage: &S,
        path: &str,
    ) -> Result<BTreeMap<String, String>> {
        let id2name = self.collect().await?;
        let json = serde_json::to_vec(&id2name)?;
        storage.write_file(path, &json).await?;
        tracing::info!("Wrote {} BiGG reaction names to {}", id2name.len(), path);
        Ok(id2name)
    }

    fn store(&self) -> Result<&SqliteStore> {
        self.store
            .as_ref()
            .ok_or_else(|| EtlError::MissingConfigError {
                field: "database.url".to_string(),
            })
    }
}

#[async_trait::async_trait]
impl Pipeline for BiggReactionNamePipeline {
    type Extracted = RawResponse;
    type Transformed = BTreeMap<String, String>;

    fn name(&self) -> &str {
        "BiGG Reaction"
    }

    async fn extract(&self) -> Result<RawResponse> {
        let body = self.bigg.universal_reactions().await?;
        tracing::debug!("BiGG universal reactions: {} bytes", body.len());
        Ok(RawResponse { body })
    }

    async fn transform(&self, data: RawResponse) -> Result<BTreeMap<String, String>> {
        bigg::reaction_names(&data.body)
    }

    async fn load(&self, id2name: BTreeMap<String, String>) -> Result<LoadSummary> {
        let store = self.store()?;
        let namespace_id = store.namespace_id(BIGG_REACTION_NAMESPACE).await?;
        let annotations = store.reaction_annotations(namespace_id).await?;
        let total = annotations.len();

        let mut summary = LoadSummary::default();
        for (index, batch) in annotations.chunks(self.batch_size).enumerate() {
            let names: Vec<ReactionName> = batch
                .iter()
                .filter_map(|annotation| {
                    id2name.get(&annotation.identifier).map(|name| ReactionName {
                        reaction_id: annotation.entity_id,
                        namespace_id,
                        name: name.clone(),
                    })
                })
                .collect();
            summary.skipped += batch.len() - names.len();
            summary.loaded += store.insert_reaction_names(&names).await?;
            tracing::info!(
                "BiGG Reaction: {}/{} annotations processed",
                (index * self.batch_size + batch.len()).min(total),
                total
            );
        }

        Ok(summary)
    }
}
