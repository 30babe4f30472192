//! Container format support for `tessera`.

mod error;
mod reader;

pub mod background;
pub mod builder;
pub mod catalog;
pub mod level;

// Re-export unified error type
pub use error::{AssetKind, ContainerError};
pub use reader::Reader;

// Re-export main container types
pub use background::{
	BackgroundSize, CompactedBackground, MapEntry, MissingPalettePolicy, Tile, TileRef,
	deduplicate,
};
pub use builder::ContainerBuilder;
pub use catalog::{
	Animation, AnimationFrame, Asset, AssetKey, BackgroundEntry, Catalog, GraphicsEntry,
	LevelEntry, ObjectDef, PaletteEntry, Record, Summary as CatalogSummary,
};
pub use level::{Fx12, Gravity, LayerRef, Level, Placement};
