use super::{fetch_concurrently, group_by_identifier, KEGG_REACTION_NAMESPACE};
use crate::adapters::{KeggClient, SqliteStore};
use crate::core::{kegg, LoadSummary, Pipeline};
use crate::domain::model::{Extraction, FetchedEntry, ReactionName};
use crate::utils::error::Result;
use std::collections::HashSet;

/// KEGG reaction names for reactions annotated in `kegg.reaction`.
pub struct KeggReactionNamePipeline {
    kegg: KeggClient,
    store: SqliteStore,
    batch_size: usize,
    concurrent_requests: usize,
}

impl KeggReactionNamePipeline {
    pub fn new(
        kegg: KeggClient,
        store: SqliteStore,
        batch_size: usize,
        concurrent_requests: usize,
    ) -> Self {
        Self {
            kegg,
            store,
            batch_size: batch_size.max(1),
            concurrent_requests: concurrent_requests.max(1),
        }
    }
}

#[async_trait::async_trait]
impl Pipeline for KeggReactionNamePipeline {
    type Extracted = Extraction<FetchedEntry>;
    type Transformed = Extraction<(i64, String)>;

    fn name(&self) -> &str {
        "KEGG Reaction"
    }

    async fn extract(&self) -> Result<Extraction<FetchedEntry>> {
        let namespace_id = self.store.namespace_id(KEGG_REACTION_NAMESPACE).await?;
        let annotations = self.store.reaction_annotations(namespace_id).await?;

        let listed: HashSet<String> = kegg::parse_list(&self.kegg.list_reactions().await?)?
            .into_iter()
            .map(|entry| entry.identifier)
            .collect();
        tracing::info!("KEGG lists {} reactions", listed.len());

        // 只抓 KEGG 目前仍存在的條目
        let (known, unknown): (Vec<_>, Vec<_>) = group_by_identifier(annotations)
            .into_iter()
            .partition(|(identifier, _)| listed.contains(identifier));
        for (identifier, _) in &unknown {
            tracing::debug!("{} is not in the KEGG reaction list", identifier);
        }

        let kegg = &self.kegg;
        let (entries, failed) = fetch_concurrently(
            known.into_iter().collect(),
            self.concurrent_requests,
            |identifier| async move { kegg.get_entry(&identifier).await },
        )
        .await;

        Ok(Extraction::new(entries, unknown.len() + failed))
    }

    async fn transform(&self, data: Extraction<FetchedEntry>) -> Result<Extraction<(i64, String)>> {
        let mut rows = Vec::new();
        let mut skipped = data.skipped;

        for entry in data.items {
            let Some(names) = kegg::parse_reaction_names(&entry.body)? else {
                tracing::debug!("{} has no NAME line", entry.identifier);
                skipped += 1;
                continue;
            };
            for reaction_id in &entry.entity_ids {
                rows.extend(names.iter().map(|name| (*reaction_id, name.clone())));
            }
        }

        Ok(Extraction::new(rows, skipped))
    }

    async fn load(&self, data: Extraction<(i64, String)>) -> Result<LoadSummary> {
        let namespace_id = self.store.namespace_id(KEGG_REACTION_NAMESPACE).await?;
        let total = data.items.len();

        let mut summary = LoadSummary {
            skipped: data.skipped,
            ..Default::default()
        };
        for batch in data.items.chunks(self.batch_size) {
            let names: Vec<ReactionName> = batch
                .iter()
                .map(|(reaction_id, name)| ReactionName {
                    reaction_id: *reaction_id,
                    namespace_id,
                    name: name.clone(),
                })
                .collect();
            summary.loaded += self.store.insert_reaction_names(&names).await?;
            tracing::info!("KEGG Reaction: {}/{} names loaded", summary.loaded, total);
        }

        Ok(summary)
    }
}
