//! kbase-vector
//!
//! Vector index backends behind [`kbase_core::traits::VectorStore`]: a LanceDB
//! table for persistent use and an in-memory list for tests and throwaway runs.

use std::sync::Arc;

use kbase_core::error::Result;
use kbase_core::settings::{Settings, StoreBackend};
use kbase_core::traits::VectorStore;

pub mod lance;
pub mod memory;
pub mod schema;
pub mod table;

pub use lance::LanceVectorStore;
pub use memory::MemoryVectorStore;

/// Open the backend selected by `vector_store.backend`.
pub async fn open_store(settings: &Settings) -> Result<Arc<dyn VectorStore>> {
    let cfg = &settings.vector_store;
    let dim = settings.embedding.dim;
    match cfg.backend {
        StoreBackend::Lance => Ok(Arc::new(LanceVectorStore::open(&cfg.uri, &cfg.table, dim).await?)),
        StoreBackend::Memory => Ok(Arc::new(MemoryVectorStore::new(dim))),
    }
}
