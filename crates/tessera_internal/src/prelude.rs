//! Prelude module for `tessera_internal`.
//!
//! This module provides a convenient way to import commonly used types and traits.
//!
//! # Examples
//!
//! ```rust
//! use tessera_internal::prelude::*;
//!
//! let mut builder = ContainerBuilder::new();
//! builder.add_palette(vec![0; 32]).unwrap();
//!
//! let mut store = AssetStore::from_bytes(builder.to_bytes(), StoreConfig::default()).unwrap();
//! assert_eq!(store.palette(0).unwrap(), 0);
//! assert!(store.residency(AssetKey::palette(0)).video);
//! ```

// Re-export everything from the cache prelude, which includes the container types
#[doc(inline)]
pub use tessera_cache::prelude::*;

// Re-export the member crates for advanced usage
#[doc(inline)]
pub use tessera_cache;
#[doc(inline)]
pub use tessera_types;
