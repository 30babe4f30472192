//! Unit tests for the video-memory cache

use std::io::Cursor;

use tessera_types::file::{Catalog, ContainerBuilder};

use super::*;

struct Fixture {
	reader: Reader<Cursor<Vec<u8>>>,
	catalog: Catalog,
	main: MainMemory,
	video: VideoCache<SoftVideoBus>,
}

fn fixture(vram_tiles: usize, palette_slots: usize) -> Fixture {
	let mut builder = ContainerBuilder::new();
	builder.add_graphics(16, 16, 0, 0, (0..128).map(|i| i as u8).collect()).unwrap();
	builder.add_graphics(8, 8, 0, 0, vec![0x77; 32]).unwrap();
	builder.add_graphics(100, 8, 0, 0, vec![0x55; 400]).unwrap();
	builder.add_palette(vec![0x01; 32]).unwrap();
	builder.add_palette(vec![0x02; 32]).unwrap();

	let mut reader = Reader::new(Cursor::new(builder.to_bytes())).unwrap();
	let catalog = Catalog::index(&mut reader).unwrap();
	Fixture {
		reader,
		catalog,
		main: MainMemory::new(None),
		video: VideoCache::new(
			SoftVideoBus::new(vram_tiles * TILE_BYTES, palette_slots, 32),
			TilePool::new(vram_tiles),
			PaletteSlots::new(palette_slots),
		),
	}
}

impl Fixture {
	fn graphics(&mut self, id: usize) -> Result<VramHandle, CacheError> {
		let entry = *self.catalog.graphics(id)?;
		self.video.ensure_graphics(id, &entry, &mut self.main, &mut self.reader)
	}

	fn palette(&mut self, id: usize) -> Result<usize, CacheError> {
		let entry = *self.catalog.palette(id)?;
		self.video.ensure_palette(id, &entry, &mut self.main, &mut self.reader)
	}
}

#[test]
fn test_graphics_idempotent_single_copy() {
	let mut f = fixture(64, 4);
	let first = f.graphics(0).unwrap();
	let second = f.graphics(0).unwrap();

	assert_eq!(first, second);
	assert_eq!(f.video.bus().copies_issued(), 1);
	assert_eq!(f.main.loads(), 1);
	assert_eq!(first.tiles, 4);
}

#[test]
fn test_transfer_is_not_awaited() {
	let mut f = fixture(64, 4);
	let handle = f.graphics(0).unwrap();
	let token = f.video.graphics_transfer(0).unwrap().clone();
	assert!(!token.is_complete());

	let region = handle.offset()..handle.offset() + 128;
	assert!(f.video.bus().vram()[region.clone()].iter().all(|&b| b == 0));

	f.video.end_frame();
	assert!(token.is_complete());
	let expected: Vec<u8> = (0..128).map(|i| i as u8).collect();
	assert_eq!(&f.video.bus().vram()[region], &expected[..]);
}

#[test]
fn test_sync_completes_transfers() {
	let mut f = fixture(64, 4);
	f.graphics(0).unwrap();
	f.graphics(1).unwrap();
	assert_eq!(f.video.bus().pending(), 2);
	f.video.sync();
	assert_eq!(f.video.bus().pending(), 0);
	assert!(f.video.graphics_transfer(1).unwrap().is_complete());
}

#[test]
fn test_oversized_graphics_clamped() {
	let mut f = fixture(64, 4);
	let handle = f.graphics(2).unwrap();
	// 100 wide clamps to 64, 8 high stays 8
	assert_eq!(handle.tiles, 8);
	f.video.sync();
	assert_eq!(f.video.bus().bytes_copied(), 8 * TILE_BYTES);
}

#[test]
fn test_release_returns_region() {
	let mut f = fixture(4, 4);
	let handle = f.graphics(0).unwrap();
	assert!(matches!(f.graphics(1), Err(CacheError::VideoMemoryExhausted {
		requested: 1,
		free: 0,
		capacity: 4
	})));

	assert!(f.video.release_graphics(0));
	assert!(!f.video.release_graphics(0));
	assert_eq!(f.video.graphics_handle(0), None);
	assert_eq!(f.graphics(1).unwrap().first_tile, handle.first_tile);
	// still in main memory, only the video residency was dropped
	assert!(f.main.contains(AssetKey::graphics(0)));
}

#[test]
fn test_palette_slots_monotonic() {
	let mut f = fixture(16, 4);
	assert_eq!(f.palette(1).unwrap(), 0);
	assert_eq!(f.palette(0).unwrap(), 1);
	assert_eq!(f.palette(1).unwrap(), 0);
	assert_eq!(f.video.bus().palette(0).unwrap(), &[0x02; 32]);
	assert_eq!(f.video.bus().palette(1).unwrap(), &[0x01; 32]);

	// eviction does not recycle the slot
	assert!(f.video.evict_palette(1));
	assert_eq!(f.palette(1).unwrap(), 2);
	assert_eq!(f.video.palette_slots().assigned(), 3);
}

#[test]
fn test_palette_slots_exhausted() {
	let mut f = fixture(16, 1);
	f.palette(0).unwrap();
	let err = f.palette(1).unwrap_err();
	assert!(matches!(err, CacheError::PaletteSlotsExhausted {
		capacity: 1
	}));

	f.video.reset_palettes();
	assert_eq!(f.palette(1).unwrap(), 0);
}

#[test]
fn test_clear() {
	let mut f = fixture(16, 4);
	f.graphics(0).unwrap();
	f.graphics(1).unwrap();
	f.palette(0).unwrap();
	assert_eq!(f.video.pool().tiles_in_use(), 5);

	f.video.clear();
	assert_eq!(f.video.graphics_count(), 0);
	assert_eq!(f.video.palette_count(), 0);
	assert_eq!(f.video.pool().tiles_in_use(), 0);
}
