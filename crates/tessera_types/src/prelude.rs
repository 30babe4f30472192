//! Prelude module for `tessera_types`.
//!
//! This module provides a convenient way to import commonly used types, traits, and constants.
//!
//! # Examples
//!
//! ```no_run
//! use tessera_types::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = Catalog::open("GAME.DAT")?;
//! let gfx: &GraphicsEntry = catalog.get(0)?;
//! # Ok(())
//! # }
//! ```

// File module types
#[doc(inline)]
pub use crate::file::{
	// Catalog types
	Animation,
	AnimationFrame,
	Asset,
	AssetKey,
	AssetKind,

	// Background types
	BackgroundEntry,
	BackgroundSize,
	Catalog,
	CompactedBackground,
	ContainerBuilder,
	ContainerError,

	// Level types
	Fx12,
	Gravity,
	GraphicsEntry,
	LayerRef,
	Level,
	LevelEntry,
	MapEntry,
	MissingPalettePolicy,
	ObjectDef,
	PaletteEntry,
	Placement,
	Reader,
	Record,
	Tile,
	TileRef,
};

// Re-export the file module for advanced usage
#[doc(inline)]
pub use crate::file;
