//! Asset catalog support for `tessera` containers.
//!
//! The catalog is the in-memory index of a container: for every asset it
//! records where the payload starts and how long it is, without reading the
//! pixel or color payload itself. It is built once by a single forward scan
//! and is immutable afterwards.
//!
//! # File Structure
//!
//! All values are little-endian and unpadded:
//!
//! ```text
//! u16 version
//! u32 totalAssetCount
//! u32 gfxCount;        gfxCount × { u8 w, u8 h, u8 top, u8 left, u16 len, <len bytes> }
//! u32 paletteCount;    paletteCount × { u16 len, <len bytes> }
//! u32 backgroundCount; backgroundCount × { u32 paletteId, u8 sizeClass,
//!                          <cells × u32 tile refs> }
//! u32 objectCount;     objectCount × { u8 weight, u32 animCount;
//!                          animCount × { u16 frameCount;
//!                              frameCount × { u32 gfxId, u32 palId, u8 time } } }
//! u32 levelCount;      levelCount × <level block>
//! ```
//!
//! See [`crate::file::level`] for the level block and [`crate::file::background`]
//! for the tile reference layout.
//!
//! # Examples
//!
//! ```no_run
//! use tessera_types::file::catalog::Catalog;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = Catalog::open("GAME.DAT")?;
//!
//! println!("{catalog}");
//! let gfx = catalog.graphics(3)?;
//! println!("graphics 3: {}x{} at {}", gfx.width, gfx.height, gfx.record);
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use log::{debug, info, warn};
use serde::Serialize;

use super::{
	AssetKind, ContainerError, Reader, background::BackgroundSize, level::skip_level,
};

mod entry;

pub use self::entry::{
	Animation, AnimationFrame, Asset, AssetKey, BackgroundEntry, GraphicsEntry, LevelEntry,
	ObjectDef, PaletteEntry, Record,
};

mod constants {
	/// Container version understood by this reader
	pub const VERSION: u16 = 1;

	/// Size of the file header (version + total count)
	pub const FILE_HEADER_SIZE: u64 = 6;

	/// Fixed header bytes of a graphics entry
	pub const GRAPHICS_HEADER_SIZE: u64 = 6;

	/// Fixed header bytes of a palette entry
	pub const PALETTE_HEADER_SIZE: u64 = 2;

	/// Fixed header bytes of a background entry
	pub const BACKGROUND_HEADER_SIZE: u64 = 5;

	/// Minimum bytes of an object entry (weight + animation count)
	pub const OBJECT_MIN_SIZE: u64 = 5;

	/// Minimum bytes of an animation (frame count)
	pub const ANIMATION_MIN_SIZE: u64 = 2;

	/// Bytes of an animation frame
	pub const FRAME_SIZE: u64 = 9;

	/// Minimum bytes of a level (layer table + two counts)
	pub const LEVEL_MIN_SIZE: u64 = 40;

	/// Background palette id meaning "no default declared"
	pub const NO_DEFAULT_PALETTE: u32 = u32::MAX;
}

pub use constants::{NO_DEFAULT_PALETTE, VERSION};

/// In-memory index of every asset in a container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
	version: u16,
	declared_total: u32,
	len: u64,
	graphics: Vec<GraphicsEntry>,
	palettes: Vec<PaletteEntry>,
	backgrounds: Vec<BackgroundEntry>,
	objects: Vec<ObjectDef>,
	levels: Vec<LevelEntry>,
}

/// Per-kind asset counts, for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
	/// Container version
	pub version: u16,
	/// Container length in bytes
	pub bytes: u64,
	/// Total asset count declared in the header
	pub declared_total: u32,
	/// Number of graphics
	pub graphics: usize,
	/// Number of palettes
	pub palettes: usize,
	/// Number of backgrounds
	pub backgrounds: usize,
	/// Number of objects
	pub objects: usize,
	/// Number of levels
	pub levels: usize,
}

impl Catalog {
	/// Indexes a container by scanning it once from offset 0.
	///
	/// Only fixed-size headers are read; payloads are skipped using their
	/// declared lengths. Any length or count that would run past the end of
	/// the container is reported as [`ContainerError::Malformed`].
	pub fn index<R: Read + Seek>(reader: &mut Reader<R>) -> Result<Self, ContainerError> {
		reader.seek_to(0)?;
		if reader.len() < constants::FILE_HEADER_SIZE {
			return Err(ContainerError::malformed(
				0,
				format!("container is {} bytes, shorter than its header", reader.len()),
			));
		}

		let version = reader.read_u16()?;
		if version != VERSION {
			return Err(ContainerError::UnsupportedVersion {
				found: version,
				supported: VERSION,
			});
		}
		let declared_total = reader.read_u32()?;

		let graphics = read_section(
			reader,
			AssetKind::Graphics,
			constants::GRAPHICS_HEADER_SIZE,
			read_graphics,
		)?;
		let palettes =
			read_section(reader, AssetKind::Palette, constants::PALETTE_HEADER_SIZE, read_palette)?;
		let backgrounds = read_section(
			reader,
			AssetKind::Background,
			constants::BACKGROUND_HEADER_SIZE,
			|r| read_background(r, palettes.len()),
		)?;
		let objects =
			read_section(reader, AssetKind::Object, constants::OBJECT_MIN_SIZE, read_object)?;
		let levels = read_section(reader, AssetKind::Level, constants::LEVEL_MIN_SIZE, |r| {
			let offset = r.position();
			let length = skip_level(r)?;
			Ok(LevelEntry {
				record: Record {
					offset,
					length: length as u32,
				},
			})
		})?;

		if reader.remaining() > 0 {
			warn!("{} trailing bytes after the level section", reader.remaining());
		}

		let catalog = Self {
			version,
			declared_total,
			len: reader.len(),
			graphics,
			palettes,
			backgrounds,
			objects,
			levels,
		};

		if catalog.asset_count() != declared_total as usize {
			warn!(
				"Container declares {declared_total} assets but {} were indexed",
				catalog.asset_count()
			);
		}
		catalog.check_object_references();
		info!("Indexed container: {catalog}");

		Ok(catalog)
	}

	/// Indexes a container held in memory
	pub fn from_bytes(data: &[u8]) -> Result<Self, ContainerError> {
		let mut reader = Reader::new(Cursor::new(data))?;
		Self::index(&mut reader)
	}

	/// Opens and indexes a container file
	pub fn open(path: impl AsRef<Path>) -> Result<Self, ContainerError> {
		let mut reader = Reader::open(path)?;
		Self::index(&mut reader)
	}

	/// Bounds-checked lookup shared by every id-indexed accessor
	pub fn get<T: Asset>(&self, id: usize) -> Result<&T, ContainerError> {
		let entries = T::entries(self);
		entries.get(id).ok_or_else(|| ContainerError::out_of_range(T::KIND, id, entries.len()))
	}

	/// Graphics entry by id
	pub fn graphics(&self, id: usize) -> Result<&GraphicsEntry, ContainerError> {
		self.get(id)
	}

	/// Palette entry by id
	pub fn palette(&self, id: usize) -> Result<&PaletteEntry, ContainerError> {
		self.get(id)
	}

	/// Background entry by id
	pub fn background(&self, id: usize) -> Result<&BackgroundEntry, ContainerError> {
		self.get(id)
	}

	/// Object definition by id
	pub fn object(&self, id: usize) -> Result<&ObjectDef, ContainerError> {
		self.get(id)
	}

	/// Level entry by id
	pub fn level(&self, id: usize) -> Result<&LevelEntry, ContainerError> {
		self.get(id)
	}

	/// Payload location of any asset
	pub fn record(&self, key: AssetKey) -> Result<Record, ContainerError> {
		match key.kind {
			AssetKind::Graphics => self.get::<GraphicsEntry>(key.id).map(Asset::record),
			AssetKind::Palette => self.get::<PaletteEntry>(key.id).map(Asset::record),
			AssetKind::Background => self.get::<BackgroundEntry>(key.id).map(Asset::record),
			AssetKind::Object => self.get::<ObjectDef>(key.id).map(Asset::record),
			AssetKind::Level => self.get::<LevelEntry>(key.id).map(Asset::record),
		}
	}

	/// Number of assets of the given kind
	pub fn count(&self, kind: AssetKind) -> usize {
		match kind {
			AssetKind::Graphics => self.graphics.len(),
			AssetKind::Palette => self.palettes.len(),
			AssetKind::Background => self.backgrounds.len(),
			AssetKind::Object => self.objects.len(),
			AssetKind::Level => self.levels.len(),
		}
	}

	/// Iterates over every asset key in container order
	pub fn keys(&self) -> impl Iterator<Item = AssetKey> + '_ {
		AssetKind::ALL
			.into_iter()
			.flat_map(move |kind| (0..self.count(kind)).map(move |id| AssetKey::new(kind, id)))
	}

	/// Total number of indexed assets
	pub fn asset_count(&self) -> usize {
		AssetKind::ALL.iter().map(|&kind| self.count(kind)).sum()
	}

	/// Container version
	pub fn version(&self) -> u16 {
		self.version
	}

	/// Total asset count declared in the header
	pub fn declared_total(&self) -> u32 {
		self.declared_total
	}

	/// All graphics entries
	pub fn graphics_entries(&self) -> &[GraphicsEntry] {
		&self.graphics
	}

	/// All palette entries
	pub fn palette_entries(&self) -> &[PaletteEntry] {
		&self.palettes
	}

	/// All background entries
	pub fn background_entries(&self) -> &[BackgroundEntry] {
		&self.backgrounds
	}

	/// All object definitions
	pub fn object_entries(&self) -> &[ObjectDef] {
		&self.objects
	}

	/// All level entries
	pub fn level_entries(&self) -> &[LevelEntry] {
		&self.levels
	}

	/// Per-kind counts
	pub fn summary(&self) -> Summary {
		Summary {
			version: self.version,
			bytes: self.len,
			declared_total: self.declared_total,
			graphics: self.graphics.len(),
			palettes: self.palettes.len(),
			backgrounds: self.backgrounds.len(),
			objects: self.objects.len(),
			levels: self.levels.len(),
		}
	}

	fn check_object_references(&self) {
		for (id, object) in self.objects.iter().enumerate() {
			let dangling = object
				.animations
				.iter()
				.flat_map(|animation| &animation.frames)
				.filter(|frame| {
					frame.graphics_id as usize >= self.graphics.len() ||
						frame.palette_id as usize >= self.palettes.len()
				})
				.count();
			if dangling > 0 {
				warn!("Object {id} has {dangling} frames referencing missing graphics or palettes");
			}
		}
	}
}

impl fmt::Display for Catalog {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"v{} {} bytes: {} graphics, {} palettes, {} backgrounds, {} objects, {} levels",
			self.version,
			self.len,
			self.graphics.len(),
			self.palettes.len(),
			self.backgrounds.len(),
			self.objects.len(),
			self.levels.len()
		)
	}
}

/// Reads a counted section, rejecting counts that cannot fit in the rest of the container
fn read_section<R, T, F>(
	reader: &mut Reader<R>,
	kind: AssetKind,
	min_entry_size: u64,
	mut read_entry: F,
) -> Result<Vec<T>, ContainerError>
where
	R: Read + Seek,
	F: FnMut(&mut Reader<R>) -> Result<T, ContainerError>,
{
	let at = reader.position();
	let count = reader.read_u32()? as u64;
	check_fits(reader, at, count, min_entry_size, kind.name())?;

	let mut entries = Vec::with_capacity(count as usize);
	for _ in 0..count {
		entries.push(read_entry(reader)?);
	}
	debug!("Indexed {count} {kind} entries from 0x{at:08X}");
	Ok(entries)
}

fn check_fits<R: Read + Seek>(
	reader: &Reader<R>,
	at: u64,
	count: u64,
	min_entry_size: u64,
	what: &str,
) -> Result<(), ContainerError> {
	let needed = count * min_entry_size;
	if needed > reader.remaining() {
		return Err(ContainerError::malformed(
			at,
			format!(
				"{count} {what} entries need at least {needed} bytes, only {} left",
				reader.remaining()
			),
		));
	}
	Ok(())
}

fn read_graphics<R: Read + Seek>(reader: &mut Reader<R>) -> Result<GraphicsEntry, ContainerError> {
	let width = reader.read_u8()?;
	let height = reader.read_u8()?;
	let top = reader.read_u8()?;
	let left = reader.read_u8()?;
	let length = reader.read_u16()? as u32;
	let offset = reader.position();
	reader.skip(length as u64)?;

	Ok(GraphicsEntry {
		record: Record {
			offset,
			length,
		},
		width,
		height,
		top,
		left,
	})
}

fn read_palette<R: Read + Seek>(reader: &mut Reader<R>) -> Result<PaletteEntry, ContainerError> {
	let length = reader.read_u16()? as u32;
	let offset = reader.position();
	reader.skip(length as u64)?;

	Ok(PaletteEntry {
		record: Record {
			offset,
			length,
		},
	})
}

fn read_background<R: Read + Seek>(
	reader: &mut Reader<R>,
	palette_count: usize,
) -> Result<BackgroundEntry, ContainerError> {
	let at = reader.position();
	let palette = reader.read_u32()?;
	if palette != NO_DEFAULT_PALETTE && palette as usize >= palette_count {
		return Err(ContainerError::malformed(
			at,
			format!("default palette {palette} does not exist ({palette_count} palettes)"),
		));
	}
	let class = reader.read_u8()?;
	let size = BackgroundSize::from_class(class).ok_or_else(|| {
		ContainerError::malformed(
			reader.position() - 1,
			format!("unknown background size class {class}"),
		)
	})?;
	let length = size.cells() as u32 * 4;
	let offset = reader.position();
	reader.skip(length as u64)?;

	Ok(BackgroundEntry {
		record: Record {
			offset,
			length,
		},
		default_palette: (palette != NO_DEFAULT_PALETTE).then_some(palette),
		size,
	})
}

fn read_object<R: Read + Seek>(reader: &mut Reader<R>) -> Result<ObjectDef, ContainerError> {
	let offset = reader.position();
	let weight = reader.read_u8()?;

	let at = reader.position();
	let animation_count = reader.read_u32()? as u64;
	check_fits(reader, at, animation_count, constants::ANIMATION_MIN_SIZE, "animation")?;

	let mut animations = Vec::with_capacity(animation_count as usize);
	for _ in 0..animation_count {
		let at = reader.position();
		let frame_count = reader.read_u16()? as u64;
		check_fits(reader, at, frame_count, constants::FRAME_SIZE, "frame")?;

		let mut frames = Vec::with_capacity(frame_count as usize);
		for _ in 0..frame_count {
			frames.push(AnimationFrame {
				graphics_id: reader.read_u32()?,
				palette_id: reader.read_u32()?,
				duration: reader.read_u8()?,
			});
		}
		animations.push(Animation {
			frames,
		});
	}

	Ok(ObjectDef {
		record: Record {
			offset,
			length: (reader.position() - offset) as u32,
		},
		weight,
		animations,
	})
}
