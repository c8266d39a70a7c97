// Adapters layer: concrete implementations for external systems.

pub mod chem;
pub mod http;
pub mod storage;
pub mod store;

pub use chem::OpenBabelToolkit;
pub use http::{BiggClient, KeggClient};
pub use storage::LocalStorage;
pub use store::SqliteStore;
