//! Tiled background support.
//!
//! A background payload in the container is a row-major array of `u32` tile
//! references. Before a background can be handed to the tile hardware its
//! references are deduplicated into a dense local tile/palette index space and
//! re-encoded as 16-bit [`MapEntry`] values.
//!
//! # Tile reference layout (`u32`, little-endian on disk)
//!
//! | Bits  | Field                                   |
//! |-------|-----------------------------------------|
//! | 0-15  | Tile id                                 |
//! | 16-23 | Palette id (`0xFF` = use the default)   |
//! | 24    | Horizontal flip                         |
//! | 25    | Vertical flip                           |
//! | 26-31 | Reserved, zero                          |
//!
//! # Map entry layout (`u16`)
//!
//! | Bits  | Field                |
//! |-------|----------------------|
//! | 0-9   | Local tile index     |
//! | 10    | Horizontal flip      |
//! | 11    | Vertical flip        |
//! | 12-15 | Local palette slot   |
//!
//! # Examples
//!
//! ```
//! use tessera_types::file::background::{BackgroundSize, MissingPalettePolicy, TileRef, deduplicate};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let size = BackgroundSize::from_class(0).unwrap();
//! let row = [TileRef::new(7, Some(2), false, false), TileRef::new(7, Some(2), false, false)];
//! let compacted = deduplicate(size, [&row[..]], None, MissingPalettePolicy::Error)?;
//!
//! // two identical cells share one local tile, the rest of the map is zero-filled
//! assert_eq!(compacted.tile_count(), 2);
//! assert_eq!(compacted.map()[0], compacted.map()[1]);
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::fmt;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::ContainerError;

mod constants {
	/// Maximum number of distinct tiles per background (10-bit local index)
	pub const MAX_TILES: usize = 1 << 10;

	/// Maximum number of distinct palettes per background (4-bit local slot)
	pub const MAX_PALETTES: usize = 1 << 4;

	/// Palette id stored in a tile reference when the tile uses the background default
	pub const PALETTE_OMITTED: u8 = 0xFF;

	/// Mask of the reserved bits of a tile reference
	pub const REF_RESERVED_MASK: u32 = 0xFC00_0000;
}

pub use constants::{MAX_PALETTES, MAX_TILES, PALETTE_OMITTED};

/// Dimensions of a background in tiles, derived from the on-disk size class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BackgroundSize {
	/// Width in tiles
	pub width: u16,
	/// Height in tiles
	pub height: u16,
}

impl BackgroundSize {
	/// Maps a size class to its dimensions.
	///
	/// Classes follow the tile hardware's screen-block layouts:
	/// `0` = 32×32, `1` = 64×32, `2` = 32×64, `3` = 64×64.
	pub const fn from_class(class: u8) -> Option<Self> {
		let (width, height) = match class {
			0 => (32, 32),
			1 => (64, 32),
			2 => (32, 64),
			3 => (64, 64),
			_ => return None,
		};
		Some(Self {
			width,
			height,
		})
	}

	/// Inverse of [`BackgroundSize::from_class`]
	pub const fn class(self) -> Option<u8> {
		match (self.width, self.height) {
			(32, 32) => Some(0),
			(64, 32) => Some(1),
			(32, 64) => Some(2),
			(64, 64) => Some(3),
			_ => None,
		}
	}

	/// Number of cells in the map
	pub const fn cells(self) -> usize {
		self.width as usize * self.height as usize
	}
}

impl fmt::Display for BackgroundSize {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}x{}", self.width, self.height)
	}
}

/// What to do when a tile omits its palette and the background declares no default
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingPalettePolicy {
	/// Fail with [`ContainerError::MissingPalette`]
	#[default]
	Error,
	/// Fall back to palette 0
	Zero,
}

/// Raw per-cell tile reference as stored in the container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileRef {
	/// Tile id in the source tile set
	pub tile_id: u16,
	/// Palette id, `None` when the cell uses the background default
	pub palette: Option<u8>,
	/// Horizontal flip
	pub hflip: bool,
	/// Vertical flip
	pub vflip: bool,
}

impl TileRef {
	/// Creates a new tile reference
	pub const fn new(tile_id: u16, palette: Option<u8>, hflip: bool, vflip: bool) -> Self {
		Self {
			tile_id,
			palette,
			hflip,
			vflip,
		}
	}

	/// Decodes a tile reference from its `u32` container form. Reserved bits are ignored.
	pub const fn from_u32(raw: u32) -> Self {
		let palette = ((raw >> 16) & 0xFF) as u8;
		Self {
			tile_id: (raw & 0xFFFF) as u16,
			palette: if palette == PALETTE_OMITTED {
				None
			} else {
				Some(palette)
			},
			hflip: raw & (1 << 24) != 0,
			vflip: raw & (1 << 25) != 0,
		}
	}

	/// Encodes the tile reference into its `u32` container form
	pub const fn to_u32(self) -> u32 {
		let palette = match self.palette {
			Some(p) => p,
			None => PALETTE_OMITTED,
		};
		(self.tile_id as u32) |
			((palette as u32) << 16) |
			((self.hflip as u32) << 24) |
			((self.vflip as u32) << 25)
	}
}

impl Default for TileRef {
	/// The zero-filled cell: tile 0, palette 0, no flips
	fn default() -> Self {
		Self::from_u32(0)
	}
}

/// A tile reference whose palette has been resolved to a concrete palette id.
///
/// This is the deduplication key: two cells share a local tile index only if
/// all four fields match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Tile {
	/// Tile id in the source tile set
	pub tile_id: u16,
	/// Catalog palette id
	pub palette_id: u32,
	/// Horizontal flip
	pub hflip: bool,
	/// Vertical flip
	pub vflip: bool,
}

/// Packed 16-bit hardware map entry
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MapEntry(u16);

impl MapEntry {
	/// Packs the fields; out-of-range values are masked to their bit width
	pub const fn pack(tile_index: u16, hflip: bool, vflip: bool, palette_slot: u8) -> Self {
		Self(
			(tile_index & 0x03FF) |
				((hflip as u16) << 10) |
				((vflip as u16) << 11) |
				(((palette_slot & 0x0F) as u16) << 12),
		)
	}

	/// Wraps a raw packed value
	pub const fn from_raw(raw: u16) -> Self {
		Self(raw)
	}

	/// Raw packed value
	pub const fn raw(self) -> u16 {
		self.0
	}

	/// Local tile index (bits 0-9)
	pub const fn tile_index(self) -> u16 {
		self.0 & 0x03FF
	}

	/// Horizontal flip (bit 10)
	pub const fn hflip(self) -> bool {
		self.0 & (1 << 10) != 0
	}

	/// Vertical flip (bit 11)
	pub const fn vflip(self) -> bool {
		self.0 & (1 << 11) != 0
	}

	/// Local palette slot (bits 12-15)
	pub const fn palette_slot(self) -> u8 {
		(self.0 >> 12) as u8
	}
}

impl fmt::Display for MapEntry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "0x{:04X}", self.0)
	}
}

/// A deduplicated background ready for upload to the tile hardware
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompactedBackground {
	size: BackgroundSize,
	tiles: Vec<Tile>,
	palettes: Vec<u32>,
	map: Vec<MapEntry>,
}

impl CompactedBackground {
	/// Parses a raw background payload (row-major `u32` tile references) and deduplicates it.
	///
	/// A payload shorter than the map is zero-filled; trailing partial references are dropped.
	/// Sizes without a size class are [`ContainerError::Malformed`].
	pub fn from_payload(
		size: BackgroundSize,
		payload: &[u8],
		default_palette: Option<u32>,
		policy: MissingPalettePolicy,
	) -> Result<Self, ContainerError> {
		if size.class().is_none() {
			return Err(ContainerError::malformed(
				0,
				format!("{size} is not a supported background size"),
			));
		}

		let mut refs = Vec::with_capacity(payload.len() / 4);
		let mut reserved = 0usize;
		for chunk in payload.chunks_exact(4) {
			let raw = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
			if raw & constants::REF_RESERVED_MASK != 0 {
				reserved += 1;
			}
			refs.push(TileRef::from_u32(raw));
		}
		if reserved > 0 {
			warn!("{reserved} tile references have reserved bits set, ignoring them");
		}

		let width = size.width as usize;
		deduplicate(size, refs.chunks(width), default_palette, policy)
	}

	/// Background dimensions
	pub fn size(&self) -> BackgroundSize {
		self.size
	}

	/// Distinct tiles in local-index order
	pub fn tiles(&self) -> &[Tile] {
		&self.tiles
	}

	/// Number of distinct tiles
	pub fn tile_count(&self) -> usize {
		self.tiles.len()
	}

	/// Distinct catalog palette ids in local-slot order
	pub fn palettes(&self) -> &[u32] {
		&self.palettes
	}

	/// Remapped map, `width * height` entries
	pub fn map(&self) -> &[MapEntry] {
		&self.map
	}

	/// Resolves a map cell back through the compaction maps
	pub fn decode(&self, cell: usize) -> Option<Tile> {
		let entry = self.map.get(cell)?;
		self.tiles.get(entry.tile_index() as usize).copied()
	}

	/// Map as raw `u16` values, as consumed by the tile hardware
	pub fn raw_map(&self) -> Vec<u16> {
		self.map.iter().map(|entry| entry.raw()).collect()
	}
}

/// Builds the palette and tile compaction maps for a background and emits its packed map.
///
/// `rows` are row-major; missing cells in short rows and missing rows are
/// treated as [`TileRef::default()`]. Local indices are assigned first-seen-wins.
pub fn deduplicate<'a, I>(
	size: BackgroundSize,
	rows: I,
	default_palette: Option<u32>,
	policy: MissingPalettePolicy,
) -> Result<CompactedBackground, ContainerError>
where
	I: IntoIterator<Item = &'a [TileRef]>,
{
	let width = size.width as usize;
	let height = size.height as usize;

	let mut palette_slots: HashMap<u32, u8> = HashMap::new();
	let mut palettes = Vec::new();
	let mut tile_indices: HashMap<Tile, u16> = HashMap::new();
	let mut tiles = Vec::new();
	let mut map = Vec::with_capacity(size.cells());

	let mut rows = rows.into_iter();
	let mut dropped = 0usize;
	for y in 0..height {
		let row = rows.next().unwrap_or(&[]);
		dropped += row.len().saturating_sub(width);

		for x in 0..width {
			let cell = y * width + x;
			let tile_ref = row.get(x).copied().unwrap_or_default();

			let palette_id = match (tile_ref.palette, default_palette, policy) {
				(Some(palette), _, _) => palette as u32,
				(None, Some(default), _) => default,
				(None, None, MissingPalettePolicy::Zero) => 0,
				(None, None, MissingPalettePolicy::Error) => {
					return Err(ContainerError::MissingPalette {
						cell,
					});
				}
			};

			let palette_slot = match palette_slots.get(&palette_id) {
				Some(&slot) => slot,
				None => {
					if palettes.len() == MAX_PALETTES {
						return Err(ContainerError::TooManyPalettes {
							limit: MAX_PALETTES,
						});
					}
					let slot = palettes.len() as u8;
					palette_slots.insert(palette_id, slot);
					palettes.push(palette_id);
					slot
				}
			};

			let tile = Tile {
				tile_id: tile_ref.tile_id,
				palette_id,
				hflip: tile_ref.hflip,
				vflip: tile_ref.vflip,
			};
			let tile_index = match tile_indices.get(&tile) {
				Some(&index) => index,
				None => {
					if tiles.len() == MAX_TILES {
						return Err(ContainerError::TooManyTiles {
							limit: MAX_TILES,
						});
					}
					let index = tiles.len() as u16;
					tile_indices.insert(tile, index);
					tiles.push(tile);
					index
				}
			};

			map.push(MapEntry::pack(tile_index, tile.hflip, tile.vflip, palette_slot));
		}
	}

	dropped += rows.map(<[TileRef]>::len).sum::<usize>();
	if dropped > 0 {
		warn!("{dropped} tile references fall outside the {size} map and were ignored");
	}
	debug!(
		"Deduplicated {size} background: {} cells -> {} tiles, {} palettes",
		map.len(),
		tiles.len(),
		palettes.len()
	);

	Ok(CompactedBackground {
		size,
		tiles,
		palettes,
		map,
	})
}
