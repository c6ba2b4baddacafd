pub mod cache;
pub mod client;
pub mod directory;

pub use cache::{MemoryCache, NoCache, RowCache};
pub use client::{CatalogClient, CatalogError, ModelSpec, SourceFile};
pub use directory::DirectoryCatalog;
