use crate::domain::model::{Extraction, LoadSummary, MoleculeDescription, RawResponse};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn database_url(&self) -> &str;
    fn kegg_base_url(&self) -> &str;
    fn bigg_base_url(&self) -> &str;
    fn request_timeout(&self) -> Duration;
    fn batch_size(&self) -> usize;
    fn concurrent_requests(&self) -> usize;
}

/// Anything a pipeline phase hands over, so the engine can report sizes.
pub trait Records {
    fn record_count(&self) -> usize;
}

impl<T> Records for Vec<T> {
    fn record_count(&self) -> usize {
        self.len()
    }
}

impl<T> Records for Extraction<T> {
    fn record_count(&self) -> usize {
        self.items.len()
    }
}

impl Records for RawResponse {
    fn record_count(&self) -> usize {
        1
    }
}

impl<K, V> Records for BTreeMap<K, V> {
    fn record_count(&self) -> usize {
        self.len()
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    type Extracted: Records + Send;
    type Transformed: Records + Send;

    fn name(&self) -> &str;
    async fn extract(&self) -> Result<Self::Extracted>;
    async fn transform(&self, data: Self::Extracted) -> Result<Self::Transformed>;
    async fn load(&self, data: Self::Transformed) -> Result<LoadSummary>;
}

/// Structure conversions delegated to a cheminformatics toolkit.
#[async_trait]
pub trait MoleculeToolkit: Send + Sync {
    /// `Ok(None)` when the toolkit produced no InChI for the structure.
    async fn mol_to_inchi(&self, mol_block: &str) -> Result<Option<String>>;
    async fn describe_inchi(&self, inchi: &str) -> Result<MoleculeDescription>;
}
