//! Catalog entry types.

use std::fmt;

use serde::Serialize;

use super::Catalog;
use crate::file::{AssetKind, background::BackgroundSize};

/// Location of an asset payload inside the container
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Record {
	/// Byte offset of the payload
	pub offset: u64,
	/// Declared payload length in bytes
	pub length: u32,
}

impl Record {
	/// Offset one past the end of the payload
	pub fn end(&self) -> u64 {
		self.offset + self.length as u64
	}
}

impl fmt::Display for Record {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "0x{:08X}+{}", self.offset, self.length)
	}
}

/// Identifies a single asset across every kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct AssetKey {
	/// Asset kind
	pub kind: AssetKind,
	/// Id within the kind
	pub id: usize,
}

impl AssetKey {
	/// Creates a new key
	pub const fn new(kind: AssetKind, id: usize) -> Self {
		Self {
			kind,
			id,
		}
	}

	/// Key of a graphics asset
	pub const fn graphics(id: usize) -> Self {
		Self::new(AssetKind::Graphics, id)
	}

	/// Key of a palette asset
	pub const fn palette(id: usize) -> Self {
		Self::new(AssetKind::Palette, id)
	}

	/// Key of a background asset
	pub const fn background(id: usize) -> Self {
		Self::new(AssetKind::Background, id)
	}
}

impl fmt::Display for AssetKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}#{}", self.kind, self.id)
	}
}

/// An indexed catalog entry of a specific kind
pub trait Asset: Sized {
	/// Kind of this entry
	const KIND: AssetKind;

	/// Payload location
	fn record(&self) -> Record;

	/// All entries of this kind in the catalog
	fn entries(catalog: &Catalog) -> &[Self];
}

/// Graphics tile sheet header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct GraphicsEntry {
	/// Payload location
	pub record: Record,
	/// Width in pixels
	pub width: u8,
	/// Height in pixels
	pub height: u8,
	/// Top offset of the visible sub-rectangle
	pub top: u8,
	/// Left offset of the visible sub-rectangle
	pub left: u8,
}

/// Palette header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PaletteEntry {
	/// Payload location
	pub record: Record,
}

/// Background header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BackgroundEntry {
	/// Payload location (the tile reference array)
	pub record: Record,
	/// Palette used by tiles that omit their own
	pub default_palette: Option<u32>,
	/// Dimensions in tiles
	pub size: BackgroundSize,
}

/// One frame of an object animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct AnimationFrame {
	/// Graphics id shown during the frame
	pub graphics_id: u32,
	/// Palette id applied to the graphics
	pub palette_id: u32,
	/// Display duration in ticks
	pub duration: u8,
}

/// Ordered frames of one animation
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Animation {
	/// Frames in playback order
	pub frames: Vec<AnimationFrame>,
}

/// Object definition; fully parsed at index time, never cached
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ObjectDef {
	/// Location of the whole object block
	pub record: Record,
	/// Physics weight
	pub weight: u8,
	/// Animations in declaration order
	pub animations: Vec<Animation>,
}

/// Level header; placements are materialized on demand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LevelEntry {
	/// Location of the whole level block
	pub record: Record,
}

macro_rules! impl_asset {
	($ty:ty, $kind:expr, $field:ident) => {
		impl Asset for $ty {
			const KIND: AssetKind = $kind;

			fn record(&self) -> Record {
				self.record
			}

			fn entries(catalog: &Catalog) -> &[Self] {
				&catalog.$field
			}
		}
	};
}

impl_asset!(GraphicsEntry, AssetKind::Graphics, graphics);
impl_asset!(PaletteEntry, AssetKind::Palette, palettes);
impl_asset!(BackgroundEntry, AssetKind::Background, backgrounds);
impl_asset!(ObjectDef, AssetKind::Object, objects);
impl_asset!(LevelEntry, AssetKind::Level, levels);
