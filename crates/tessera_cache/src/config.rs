//! Store configuration.
//!
//! Values come from, in increasing priority: built-in defaults, an optional
//! TOML file, and `TESSERA_*` environment variables.
//!
//! ```toml
//! vram_tiles = 1024
//! palette_slots = 32
//! palette_slot_bytes = 32
//! main_memory_budget = 4194304
//! missing_palette = "zero"
//! free_main_memory_on_level_change = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tessera_types::file::MissingPalettePolicy;

use crate::CacheError;

/// Sizing and policy knobs for an [`AssetStore`](crate::AssetStore)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
	/// Number of 32-byte tiles in the video memory pool
	pub vram_tiles: usize,
	/// Number of hardware palette slots
	pub palette_slots: usize,
	/// Bytes per hardware palette slot
	pub palette_slot_bytes: usize,
	/// Upper bound on main-memory payload bytes, unbounded when `None`
	pub main_memory_budget: Option<usize>,
	/// Palette resolution for background tiles without palette or default
	pub missing_palette: MissingPalettePolicy,
	/// Release every main-memory buffer (and its video residency) on level change
	pub free_main_memory_on_level_change: bool,
}

impl Default for StoreConfig {
	fn default() -> Self {
		Self {
			vram_tiles: 1024,
			palette_slots: 32,
			palette_slot_bytes: 32,
			main_memory_budget: None,
			missing_palette: MissingPalettePolicy::Error,
			free_main_memory_on_level_change: false,
		}
	}
}

impl StoreConfig {
	/// Environment variable prefix
	pub const ENV_PREFIX: &'static str = "TESSERA";

	/// Loads the configuration from an optional TOML file and the environment
	pub fn load(path: Option<&Path>) -> Result<Self, CacheError> {
		let mut builder = config::Config::builder();
		if let Some(path) = path {
			builder = builder.add_source(config::File::from(path));
		}
		let config = builder
			.add_source(config::Environment::with_prefix(Self::ENV_PREFIX).try_parsing(true))
			.build()?;
		Ok(config.try_deserialize()?)
	}

	/// Size of the video memory pool in bytes
	pub fn vram_bytes(&self) -> usize {
		self.vram_tiles * crate::video::TILE_BYTES
	}
}
