//! This module is separated into its own crate to enable simple dynamic linking for `tessera`, and should not be used directly.

/// `use tessera::prelude::*;` to import commonly used items.
pub mod prelude;

// Re-export the member crates for convenience
pub use tessera_cache;
pub use tessera_types;

// Re-export commonly used types at crate root
pub use tessera_cache::{AssetStore, CacheError, CacheStats, Residency, StoreConfig};
pub use tessera_types::file::{
	AssetKey, AssetKind, Catalog, ContainerBuilder, ContainerError, Reader,
};
