pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;
pub use config::Settings;

pub use adapters::{BiggClient, KeggClient, LocalStorage, OpenBabelToolkit, SqliteStore};
pub use app::pipelines::{
    BiggReactionNamePipeline, CompoundStructurePipeline, KeggCompoundMolPipeline,
    KeggReactionNamePipeline,
};
pub use core::etl::EtlEngine;
pub use utils::error::{EtlError, Result};
