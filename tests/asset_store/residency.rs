//! Residency across the two cache tiers

use tessera::prelude::*;

use crate::sample_container;

fn store() -> AssetStore<std::io::Cursor<Vec<u8>>> {
	AssetStore::from_bytes(sample_container().to_bytes(), StoreConfig::default()).unwrap()
}

fn assert_video_implies_main(store: &AssetStore<std::io::Cursor<Vec<u8>>>) {
	for key in store.catalog().keys() {
		let residency = store.residency(key);
		assert!(!residency.video || residency.main, "{key} is in video memory only");
	}
}

#[test_log::test]
fn test_video_implies_main_throughout() {
	let mut store = store();
	assert_video_implies_main(&store);

	store.graphics(0).unwrap();
	store.graphics(1).unwrap();
	store.palette(2).unwrap();
	assert_video_implies_main(&store);

	store.free(AssetKey::graphics(0));
	store.free(AssetKey::palette(2));
	assert_video_implies_main(&store);

	store.release_graphics(1);
	store.free_all();
	assert_video_implies_main(&store);
}

#[test]
fn test_repeated_requests_are_free() {
	let mut store = store();
	let handle = store.graphics(0).unwrap();
	let slot = store.palette(1).unwrap();
	let before = store.stats();

	for _ in 0..100 {
		assert_eq!(store.graphics(0).unwrap(), handle);
		assert_eq!(store.palette(1).unwrap(), slot);
		store.end_frame();
	}

	let after = store.stats();
	assert_eq!(after.main_loads, before.main_loads);
	assert_eq!(after.vram_tiles_in_use, before.vram_tiles_in_use);
	assert_eq!(after.palette_slots_assigned, before.palette_slots_assigned);
	assert_eq!(store.video().bus().copies_issued(), 1);
}

#[test]
fn test_sprite_regions_do_not_overlap() {
	let mut store = store();
	let a = store.graphics(0).unwrap();
	let b = store.graphics(1).unwrap();

	assert_eq!(a.tiles, 16);
	assert_eq!(b.tiles, 2);
	let a_range = a.first_tile..a.first_tile + a.tiles;
	assert!(!a_range.contains(&b.first_tile));

	store.sync();
	let vram = store.video().bus().vram();
	assert!(vram[a.offset()..a.offset() + 512].iter().all(|&byte| byte == 0x3C));
	assert!(vram[b.offset()..b.offset() + 64].iter().all(|&byte| byte == 0x5A));
}

#[test]
fn test_background_palettes_in_local_order() {
	let mut store = store();
	let background = store.background_compacted(0).unwrap();
	// cell 0 omits its palette and takes the default, cell 1 uses palette 2
	assert_eq!(background.palettes(), &[1, 2]);
	assert_eq!(background.tile_count(), 6);
	assert_eq!(background.map()[0].palette_slot(), 0);
	assert_eq!(background.map()[1].palette_slot(), 1);
	assert!(background.map()[1].hflip());

	let slots = store.background_palette_slots(0).unwrap();
	assert_eq!(slots.len(), 2);
	assert_eq!(store.residency(AssetKey::palette(1)), Residency {
		main: true,
		video: true,
	});
	assert!(!store.residency(AssetKey::palette(0)).main);
}

#[test]
fn test_stats_serialize() {
	let mut store = store();
	store.graphics(1).unwrap();
	let json = serde_json::to_value(store.stats()).unwrap();
	assert_eq!(json["video_graphics"], 1);
	assert_eq!(json["pending_transfers"], 1);
}
