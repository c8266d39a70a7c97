pub mod bigg;
pub mod etl;
pub mod kegg;
pub mod molfile;

pub use crate::domain::model::LoadSummary;
pub use crate::domain::ports::{ConfigProvider, MoleculeToolkit, Pipeline, Records, Storage};
pub use crate::utils::error::Result;
