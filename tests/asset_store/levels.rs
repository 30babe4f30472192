//! Level loading

use tessera::prelude::*;

use crate::sample_container;

#[test_log::test]
fn test_level_switch() {
	let data = sample_container().to_bytes();
	let mut store = AssetStore::from_bytes(data, StoreConfig::default()).unwrap();

	let level = store.load_level(0).unwrap();
	assert_eq!(level.heroes.len(), 1);
	assert_eq!(level.heroes[0].gravity.vertical.to_f32(), 1.5);
	assert_eq!(level.objects[0].x, 300);
	let layers: Vec<_> = level.active_layers().collect();
	assert_eq!(layers.len(), 1);

	for (_, layer) in layers {
		store.background_compacted(layer.background_id as usize).unwrap();
	}

	let level = store.load_level(1).unwrap();
	assert!(level.heroes.is_empty());
	assert!(level.objects.is_empty());
	assert_eq!(level.active_layers().map(|(slot, _)| slot).collect::<Vec<_>>(), vec![2]);
	assert_eq!(store.stats().compacted_backgrounds, 0);
}

#[test]
fn test_dangling_layer_is_fatal() {
	let mut builder = sample_container();
	let mut level = Level::new();
	level.layers[1] = Some(LayerRef {
		background_id: 7,
		distance: 0,
	});
	builder.add_level(level);

	let mut store = AssetStore::from_bytes(builder.to_bytes(), StoreConfig::default()).unwrap();
	let err = store.load_level(2).unwrap_err();
	assert!(matches!(err, CacheError::Container(ContainerError::Malformed { .. })));
	assert!(err.is_fatal());
	assert!(store.current_level().is_none());
}

#[test]
fn test_level_change_can_free_everything() {
	let config = StoreConfig {
		free_main_memory_on_level_change: true,
		..StoreConfig::default()
	};
	let mut store = AssetStore::from_bytes(sample_container().to_bytes(), config).unwrap();
	store.load_level(0).unwrap();
	store.graphics(0).unwrap();
	store.background_compacted(0).unwrap();

	store.load_level(1).unwrap();
	let stats = store.stats();
	assert_eq!(stats.main_buffers, 0);
	assert_eq!(stats.video_graphics, 0);
	assert_eq!(stats.vram_tiles_in_use, 0);
	assert!(store.current_level().is_some());
}
