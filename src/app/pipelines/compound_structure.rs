use crate::adapters::SqliteStore;
use crate::core::{LoadSummary, MoleculeToolkit, Pipeline};
use crate::domain::model::{CompoundRecord, Extraction};
use crate::utils::error::Result;
use std::sync::Arc;

/// Fill in missing InChIKey, SMILES, formula, mass and charge from the InChI.
pub struct CompoundStructurePipeline {
    store: SqliteStore,
    toolkit: Arc<dyn MoleculeToolkit>,
    batch_size: usize,
}

impl CompoundStructurePipeline {
    pub fn new(store: SqliteStore, toolkit: Arc<dyn MoleculeToolkit>, batch_size: usize) -> Self {
        Self {
            store,
            toolkit,
            batch_size: batch_size.max(1),
        }
    }
}

#[async_trait::async_trait]
impl Pipeline for CompoundStructurePipeline {
    type Extracted = Extraction<CompoundRecord>;
    type Transformed = Extraction<CompoundRecord>;

    fn name(&self) -> &str {
        "Compound"
    }

    /// Page through compounds with an InChI and keep the incomplete ones.
    async fn extract(&self) -> Result<Extraction<CompoundRecord>> {
        let total = self.store.count_compounds_with_inchi().await?;
        let mut incomplete = Vec::new();
        let mut complete = 0;
        let mut seen = 0;
        let mut after_id = 0;

        loop {
            let page = self.store.compounds_with_inchi(after_id, self.batch_size).await?;
            let Some(last) = page.last() else {
                break;
            };
            after_id = last.id;
            seen += page.len();

            for compound in page {
                if compound.is_complete() {
                    complete += 1;
                } else {
                    incomplete.push(compound);
                }
            }
            tracing::info!("Compound: {}/{} scanned", seen, total);
        }

        Ok(Extraction::new(incomplete, complete))
    }

    async fn transform(&self, data: Extraction<CompoundRecord>) -> Result<Extraction<CompoundRecord>> {
        let mut skipped = data.skipped;
        let mut updated = Vec::with_capacity(data.items.len());

        for mut compound in data.items {
            let Some(inchi) = compound.inchi.clone() else {
                skipped += 1;
                continue;
            };
            tracing::debug!("{}", inchi);
            let description = match self.toolkit.describe_inchi(&inchi).await {
                Ok(description) => description,
                Err(e) => {
                    tracing::error!("Failed to read InChI for compound {}.", compound.id);
                    tracing::debug!("{}", e);
                    skipped += 1;
                    continue;
                }
            };
            if compound.fill_missing(&description) {
                updated.push(compound);
            } else {
                skipped += 1;
            }
        }

        Ok(Extraction::new(updated, skipped))
    }

    async fn load(&self, data: Extraction<CompoundRecord>) -> Result<LoadSummary> {
        let total = data.items.len();
        let mut summary = LoadSummary {
            skipped: data.skipped,
            ..Default::default()
        };

        for batch in data.items.chunks(self.batch_size) {
            summary.loaded += self.store.update_compound_structures(batch).await?;
            tracing::info!("Compound: {}/{} updated", summary.loaded, total);
        }

        Ok(summary)
    }
}
