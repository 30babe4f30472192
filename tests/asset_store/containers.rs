//! Container files on disk

use std::fs;

use tessera::prelude::*;

use crate::sample_container;

#[test_log::test]
fn test_open_saved_container() -> anyhow::Result<()> {
	let dir = tempfile::tempdir()?;
	let path = dir.path().join("GAME.DAT");
	sample_container().save(&path)?;

	let store = AssetStore::open(&path, StoreConfig::default())?;
	let summary = store.catalog().summary();
	assert_eq!(summary.graphics, 2);
	assert_eq!(summary.palettes, 3);
	assert_eq!(summary.backgrounds, 1);
	assert_eq!(summary.objects, 2);
	assert_eq!(summary.levels, 2);
	assert_eq!(summary.declared_total, 10);
	assert_eq!(summary.bytes, fs::metadata(&path)?.len());

	let object = store.catalog().object(0)?;
	assert_eq!(object.weight, 10);
	assert_eq!(object.animations.len(), 2);
	assert_eq!(object.animations[1].frames[0].graphics_id, 1);
	Ok(())
}

#[test]
fn test_payloads_read_back() {
	let data = sample_container().to_bytes();
	let mut store = AssetStore::from_bytes(data, StoreConfig::default()).unwrap();

	let data = store.ensure_main_memory(AssetKey::graphics(1)).unwrap();
	assert_eq!(data, &[0x5A; 64]);
	let data = store.ensure_main_memory(AssetKey::palette(2)).unwrap();
	assert_eq!(hex::encode(&data[..4]), "02020202");
}

#[test_log::test]
fn test_truncated_file_is_fatal() {
	let data = sample_container().to_bytes();
	let mut file = tempfile::NamedTempFile::new().unwrap();
	std::io::Write::write_all(&mut file, &data[..data.len() / 2]).unwrap();

	let err = AssetStore::open(file.path(), StoreConfig::default()).unwrap_err();
	assert!(err.is_fatal());
}

#[test]
fn test_missing_file_is_fatal() {
	let dir = tempfile::tempdir().unwrap();
	let err = AssetStore::open(dir.path().join("NOPE.DAT"), StoreConfig::default()).unwrap_err();
	assert!(matches!(err, CacheError::Container(ContainerError::Io(_))));
	assert!(err.is_fatal());
}

#[test]
fn test_unsupported_version() {
	let mut data = sample_container().to_bytes();
	data[0] = 2;
	let err = AssetStore::from_bytes(data, StoreConfig::default()).unwrap_err();
	assert!(matches!(err, CacheError::Container(ContainerError::UnsupportedVersion {
		found: 2,
		..
	})));
}

#[test]
fn test_config_file() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("tessera.toml");
	fs::write(&path, "vram_tiles = 16\npalette_slots = 2\n").unwrap();

	let config = StoreConfig::load(Some(&path)).unwrap();
	let mut store = AssetStore::from_bytes(sample_container().to_bytes(), config).unwrap();

	// the 32x32 sprite fills the whole pool
	store.graphics(0).unwrap();
	let err = store.graphics(1).unwrap_err();
	assert!(!err.is_fatal());

	store.palette(0).unwrap();
	store.palette(1).unwrap();
	assert!(matches!(store.palette(2), Err(CacheError::PaletteSlotsExhausted {
		capacity: 2
	})));
}

#[test]
fn test_every_asset_reads_its_declared_length() -> anyhow::Result<()> {
	let data = sample_container().to_bytes();
	let mut store = AssetStore::from_bytes(data, StoreConfig::default())?;

	let keys: Vec<AssetKey> = store.catalog().keys().collect();
	assert_eq!(keys.len(), store.catalog().asset_count());
	for key in keys {
		let expected = store.catalog().record(key)?.length as usize;
		assert_eq!(store.ensure_main_memory(key)?.len(), expected, "{key}");
	}
	assert_eq!(store.stats().main_buffers, store.catalog().asset_count());
	Ok(())
}
