//! Two-tier asset cache for the `tessera` project.
//!
//! Assets live in one container file (see [`tessera_types`]). This crate keeps
//! them close to the hardware in two tiers:
//!
//! - **Main memory**: payload buffers read from the container on first use and
//!   kept until freed ([`MainMemory`]).
//! - **Video memory**: graphics copied into sprite memory regions and palettes
//!   written to hardware palette slots ([`VideoCache`]). Anything resident in
//!   video memory is also resident in main memory.
//!
//! On top of both sits [`AssetStore`], which also owns the catalog, the single
//! current level and the per-level deduplicated backgrounds.
//!
//! # Examples
//!
//! ```no_run
//! use tessera_cache::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = StoreConfig::load(None)?;
//! let mut store = AssetStore::open("GAME.DAT", config)?;
//! let handle = store.graphics(0)?;
//! println!("{handle} {:?}", store.residency(AssetKey::graphics(0)));
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod level;
mod main_memory;
mod store;
mod video;

pub use config::StoreConfig;
pub use error::CacheError;
pub use level::LevelSlot;
pub use main_memory::MainMemory;
pub use store::{AssetStore, CacheStats, Residency};
pub use video::{
	PaletteSlots, SPRITE_BUCKETS, SoftVideoBus, SpriteSize, TILE_BYTES, TilePool, TransferToken,
	VideoBus, VideoCache, VramAllocator, VramHandle,
};

/// `use tessera_cache::prelude::*;` to import commonly used items.
pub mod prelude {
	#[doc(inline)]
	pub use crate::{
		AssetStore, CacheError, CacheStats, Residency, StoreConfig, VideoBus, VramHandle,
	};
	#[doc(inline)]
	pub use tessera_types::prelude::*;
}
