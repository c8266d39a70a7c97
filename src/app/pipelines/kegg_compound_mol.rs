use super::{fetch_concurrently, group_by_identifier, KEGG_COMPOUND_NAMESPACE};
use crate::adapters::{KeggClient, SqliteStore};
use crate::core::molfile::MolBlock;
use crate::core::{LoadSummary, MoleculeToolkit, Pipeline};
use crate::domain::model::{Extraction, FetchedEntry};
use crate::utils::error::Result;
use futures::stream::{self, StreamExt};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::Arc;

/// InChIs for KEGG-annotated compounds, converted from KEGG MOL files.
pub struct KeggCompoundMolPipeline {
    kegg: KeggClient,
    store: SqliteStore,
    toolkit: Arc<dyn MoleculeToolkit>,
    batch_size: usize,
    concurrent_requests: usize,
}

impl KeggCompoundMolPipeline {
    pub fn new(
        kegg: KeggClient,
        store: SqliteStore,
        toolkit: Arc<dyn MoleculeToolkit>,
        batch_size: usize,
        concurrent_requests: usize,
    ) -> Self {
        Self {
            kegg,
            store,
            toolkit,
            batch_size: batch_size.max(1),
            concurrent_requests: concurrent_requests.max(1),
        }
    }

    /// Convert one fetched MOL block; `None` when it has to be skipped.
    async fn mol_to_inchi(&self, entry: &FetchedEntry) -> Option<String> {
        if let Err(e) = MolBlock::parse(&entry.body) {
            tracing::debug!("{}: {}", entry.identifier, e);
            return None;
        }
        match self.toolkit.mol_to_inchi(&entry.body).await {
            Ok(Some(inchi)) => Some(inchi),
            Ok(None) => {
                tracing::debug!("{}: no InChI produced", entry.identifier);
                None
            }
            Err(e) => {
                tracing::debug!("{}: {}", entry.identifier, e);
                None
            }
        }
    }
}

#[async_trait::async_trait]
impl Pipeline for KeggCompoundMolPipeline {
    type Extracted = Extraction<FetchedEntry>;
    type Transformed = Extraction<(i64, String)>;

    fn name(&self) -> &str {
        "KEGG Compound"
    }

    async fn extract(&self) -> Result<Extraction<FetchedEntry>> {
        let namespace_id = self.store.namespace_id(KEGG_COMPOUND_NAMESPACE).await?;
        let annotations = self
            .store
            .compound_annotations_without_inchi(namespace_id)
            .await?;
        let groups = group_by_identifier(annotations);
        tracing::info!("{} KEGG compounds lack an InChI", groups.len());

        let kegg = &self.kegg;
        let (entries, failed) =
            fetch_concurrently(groups, self.concurrent_requests, |identifier| async move {
                kegg.get_mol(&identifier).await
            })
            .await;

        Ok(Extraction::new(entries, failed))
    }

    async fn transform(&self, data: Extraction<FetchedEntry>) -> Result<Extraction<(i64, String)>> {
        let converted: Vec<(FetchedEntry, Option<String>)> = stream::iter(data.items)
            .map(|entry| async move {
                let inchi = self.mol_to_inchi(&entry).await;
                (entry, inchi)
            })
            .buffer_unordered(self.concurrent_requests)
            .collect()
            .await;

        let mut skipped = data.skipped;
        // 同一個化合物有多個 KEGG 註解時，保留 identifier 排序最前面的結果
        let mut inchis: BTreeMap<i64, (String, String)> = BTreeMap::new();
        for (entry, inchi) in converted {
            let Some(inchi) = inchi else {
                skipped += 1;
                continue;
            };
            for compound_id in entry.entity_ids {
                let candidate = (entry.identifier.clone(), inchi.clone());
                match inchis.entry(compound_id) {
                    Entry::Vacant(slot) => {
                        slot.insert(candidate);
                    }
                    Entry::Occupied(mut slot) => {
                        if candidate.0 < slot.get().0 {
                            slot.insert(candidate);
                        }
                    }
                }
            }
        }

        let rows = inchis
            .into_iter()
            .map(|(compound_id, (_, inchi))| (compound_id, inchi))
            .collect();
        Ok(Extraction::new(rows, skipped))
    }

    async fn load(&self, data: Extraction<(i64, String)>) -> Result<LoadSummary> {
        let total = data.items.len();
        let mut summary = LoadSummary {
            skipped: data.skipped,
            ..Default::default()
        };

        for batch in data.items.chunks(self.batch_size) {
            summary.loaded += self.store.set_compound_inchis(batch).await?;
            tracing::info!("KEGG Compound: {}/{} InChIs stored", summary.loaded, total);
        }

        Ok(summary)
    }
}
