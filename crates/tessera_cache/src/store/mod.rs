//! Asset store: the catalog plus both cache tiers behind one interface.
//!
//! The store is what the game loop talks to. Graphics and palettes are
//! resolved to video memory on first use, backgrounds are deduplicated on
//! first use, and one level at a time is materialized.
//!
//! # Examples
//!
//! ```no_run
//! use tessera_cache::{AssetStore, StoreConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut store = AssetStore::open("GAME.DAT", StoreConfig::default())?;
//!
//! let layers: Vec<_> = store.load_level(0)?.active_layers().collect();
//! for (slot, layer) in layers {
//!     let background = store.background_compacted(layer.background_id as usize)?;
//!     println!("layer {slot}: {} tiles", background.tile_count());
//! }
//!
//! let sprite = store.graphics(12)?;
//! let palette = store.palette(3)?;
//! println!("sprite at {sprite}, palette slot {palette}");
//!
//! // frame boundary
//! store.end_frame();
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::fs;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

use log::debug;
use serde::Serialize;
use tessera_types::file::{
	AssetKey, AssetKind, Catalog, CompactedBackground, ContainerError, Level, Reader,
};

use crate::{
	CacheError, LevelSlot, MainMemory, PaletteSlots, SoftVideoBus, StoreConfig, TilePool,
	VideoBus, VideoCache, VramAllocator, VramHandle,
};

/// Residency of one asset in the two tiers
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Residency {
	/// Payload is in main memory
	pub main: bool,
	/// Asset is mapped into video memory; implies `main`
	pub video: bool,
}

/// Snapshot of cache usage
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
	/// Buffers resident in main memory
	pub main_buffers: usize,
	/// Payload bytes resident in main memory
	pub main_bytes: usize,
	/// Container reads performed
	pub main_loads: usize,
	/// Graphics mapped into video memory
	pub video_graphics: usize,
	/// Palettes written to hardware slots
	pub video_palettes: usize,
	/// Video memory tiles leased
	pub vram_tiles_in_use: usize,
	/// Video memory tiles in the pool
	pub vram_tiles_capacity: usize,
	/// Palette slots assigned this session
	pub palette_slots_assigned: usize,
	/// Transfers issued but not yet completed
	pub pending_transfers: usize,
	/// Deduplicated backgrounds held for the current level
	pub compacted_backgrounds: usize,
}

/// Catalog and cache tiers over one container
#[derive(Debug)]
pub struct AssetStore<R, B = SoftVideoBus, A = TilePool> {
	reader: Reader<R>,
	catalog: Catalog,
	config: StoreConfig,
	main: MainMemory,
	video: VideoCache<B, A>,
	level: LevelSlot,
	backgrounds: HashMap<usize, CompactedBackground>,
}

impl AssetStore<BufReader<fs::File>> {
	/// Opens and indexes a container file, emulating video hardware in memory
	pub fn open(path: impl AsRef<Path>, config: StoreConfig) -> Result<Self, CacheError> {
		let reader = Reader::open(path)?;
		let video = soft_video(&config);
		Self::new(reader, video, config)
	}
}

impl AssetStore<Cursor<Vec<u8>>> {
	/// Indexes a container held in memory, emulating video hardware in memory
	pub fn from_bytes(data: Vec<u8>, config: StoreConfig) -> Result<Self, CacheError> {
		let reader = Reader::new(Cursor::new(data))?;
		let video = soft_video(&config);
		Self::new(reader, video, config)
	}
}

fn soft_video(config: &StoreConfig) -> VideoCache<SoftVideoBus> {
	VideoCache::new(
		SoftVideoBus::new(config.vram_bytes(), config.palette_slots, config.palette_slot_bytes),
		TilePool::new(config.vram_tiles),
		PaletteSlots::new(config.palette_slots),
	)
}

impl<R: Read + Seek, B: VideoBus, A: VramAllocator> AssetStore<R, B, A> {
	/// Indexes the container behind `reader` and wires up the cache tiers.
	///
	/// Indexing runs exactly once, here.
	pub fn new(
		mut reader: Reader<R>,
		video: VideoCache<B, A>,
		config: StoreConfig,
	) -> Result<Self, CacheError> {
		let catalog = Catalog::index(&mut reader)?;
		Ok(Self {
			reader,
			catalog,
			main: MainMemory::new(config.main_memory_budget),
			config,
			video,
			level: LevelSlot::new(),
			backgrounds: HashMap::new(),
		})
	}

	/// The asset catalog
	pub fn catalog(&self) -> &Catalog {
		&self.catalog
	}

	/// Active configuration
	pub fn config(&self) -> &StoreConfig {
		&self.config
	}

	/// The video-memory tier
	pub fn video(&self) -> &VideoCache<B, A> {
		&self.video
	}

	/// The main-memory tier
	pub fn main_memory(&self) -> &MainMemory {
		&self.main
	}

	/// Brings the payload of any asset into main memory
	pub fn ensure_main_memory(&mut self, key: AssetKey) -> Result<&[u8], CacheError> {
		let record = self.catalog.record(key)?;
		self.main.ensure(key, record, &mut self.reader)
	}

	/// Maps graphics `id` into video memory, returning its region
	pub fn graphics(&mut self, id: usize) -> Result<VramHandle, CacheError> {
		let entry = self.catalog.graphics(id)?;
		self.video.ensure_graphics(id, entry, &mut self.main, &mut self.reader)
	}

	/// Writes palette `id` to a hardware slot, returning the slot
	pub fn palette(&mut self, id: usize) -> Result<usize, CacheError> {
		let entry = self.catalog.palette(id)?;
		self.video.ensure_palette(id, entry, &mut self.main, &mut self.reader)
	}

	/// Deduplicated form of background `id`, built on first use.
	///
	/// Results are kept until the next level change.
	pub fn background_compacted(&mut self, id: usize) -> Result<&CompactedBackground, CacheError> {
		let entry = *self.catalog.background(id)?;
		if !self.backgrounds.contains_key(&id) {
			let key = AssetKey::background(id);
			let payload = self.main.ensure(key, entry.record, &mut self.reader)?;
			let compacted = CompactedBackground::from_payload(
				entry.size,
				payload,
				entry.default_palette,
				self.config.missing_palette,
			)?;
			let palette_count = self.catalog.count(AssetKind::Palette);
			let mut palettes = compacted.palettes().iter();
			if let Some(palette) = palettes.find(|&&palette| palette as usize >= palette_count) {
				return Err(ContainerError::malformed(
					entry.record.offset,
					format!("background#{id} uses palette {palette}, only {palette_count} exist"),
				)
				.into());
			}
			self.backgrounds.insert(id, compacted);
		}
		Ok(&self.backgrounds[&id])
	}

	/// Hardware palette slots for each local palette of background `id`, in local-slot order
	pub fn background_palette_slots(&mut self, id: usize) -> Result<Vec<usize>, CacheError> {
		let palettes = self.background_compacted(id)?.palettes().to_vec();
		palettes.into_iter().map(|palette| self.palette(palette as usize)).collect()
	}

	/// Materializes level `id` into the current-level slot.
	///
	/// The previous level and the deduplicated backgrounds built for it are
	/// released first. An unknown id fails before anything is released.
	pub fn load_level(&mut self, id: usize) -> Result<&Level, CacheError> {
		self.catalog.level(id)?;

		self.backgrounds.clear();
		if self.config.free_main_memory_on_level_change {
			self.free_all();
		}
		self.level.load(id, &self.catalog, &mut self.reader)
	}

	/// The materialized level, if any
	pub fn current_level(&self) -> Option<&Level> {
		self.level.current()
	}

	/// Returns the video region of graphics `id` to the pool
	pub fn release_graphics(&mut self, id: usize) -> bool {
		self.video.release_graphics(id)
	}

	/// Frees the main-memory buffer of `key`.
	///
	/// Graphics lose their video region and palettes their residency first, so
	/// nothing stays video-resident without its main-memory payload.
	pub fn free(&mut self, key: AssetKey) -> bool {
		match key.kind {
			AssetKind::Graphics => {
				self.video.release_graphics(key.id);
			}
			AssetKind::Palette => {
				self.video.evict_palette(key.id);
			}
			AssetKind::Background | AssetKind::Object | AssetKind::Level => {}
		}
		self.main.free(key)
	}

	/// Frees every main-memory buffer along with every video residency
	pub fn free_all(&mut self) {
		self.video.clear();
		self.main.free_all();
		debug!("Released all cached assets");
	}

	/// Residency of `key` in both tiers
	pub fn residency(&self, key: AssetKey) -> Residency {
		let video = match key.kind {
			AssetKind::Graphics => self.video.graphics_handle(key.id).is_some(),
			AssetKind::Palette => self.video.palette_slot(key.id).is_some(),
			AssetKind::Background | AssetKind::Object | AssetKind::Level => false,
		};
		Residency {
			main: self.main.contains(key),
			video,
		}
	}

	/// Frame boundary: lets queued transfers complete
	pub fn end_frame(&mut self) {
		self.video.end_frame();
	}

	/// Waits for every issued transfer to complete
	pub fn sync(&mut self) {
		self.video.sync();
	}

	/// Snapshot of cache usage
	pub fn stats(&self) -> CacheStats {
		CacheStats {
			main_buffers: self.main.len(),
			main_bytes: self.main.bytes_used(),
			main_loads: self.main.loads(),
			video_graphics: self.video.graphics_count(),
			video_palettes: self.video.palette_count(),
			vram_tiles_in_use: self.video.pool().tiles_in_use(),
			vram_tiles_capacity: self.video.pool().capacity(),
			palette_slots_assigned: self.video.palette_slots().assigned(),
			pending_transfers: self.video.bus().pending(),
			compacted_backgrounds: self.backgrounds.len(),
		}
	}
}
