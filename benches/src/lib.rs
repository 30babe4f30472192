//! Benchmark helper utilities for tessera
//!
//! This module provides generators for synthetic containers and tile maps used
//! by the benchmark suite. Generation is seeded so runs are comparable.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tessera_types::file::{
	BackgroundSize, ContainerBuilder, Gravity, LayerRef, Level, Placement, TileRef,
};

/// Seed shared by every generator
pub const SEED: u64 = 0x7E55_E7A0;

/// Generates a row-major tile map drawing from `distinct_tiles` tile ids and `palettes` palettes.
///
/// Roughly one reference in eight omits its palette and one in four is flipped.
pub fn generate_tile_map(size: BackgroundSize, distinct_tiles: u16, palettes: u8) -> Vec<TileRef> {
	let mut rng = SmallRng::seed_from_u64(SEED);
	(0..size.cells())
		.map(|_| {
			let palette = if rng.random_ratio(1, 8) {
				None
			} else {
				Some(rng.random_range(0..palettes.max(1)))
			};
			TileRef::new(
				rng.random_range(0..distinct_tiles.max(1)),
				palette,
				rng.random_ratio(1, 4),
				rng.random_ratio(1, 4),
			)
		})
		.collect()
}

/// Generates a container with `scale` assets of each kind.
///
/// Backgrounds use the largest size class and levels place `scale` objects.
pub fn generate_container(scale: usize) -> Vec<u8> {
	let mut rng = SmallRng::seed_from_u64(SEED);
	let mut builder = ContainerBuilder::new();
	let size = BackgroundSize::from_class(3).unwrap_or(BackgroundSize {
		width: 64,
		height: 64,
	});

	for _ in 0..scale {
		let data: Vec<u8> = (0..128).map(|_| rng.random()).collect();
		// generated sizes stay inside the format's limits
		let _ = builder.add_graphics(16, 16, 0, 0, data);
		let _ = builder.add_palette(vec![rng.random(); 32]);
		let _ = builder.add_background(size, Some(0), generate_tile_map(size, 32, 4));
		let _ = builder.add_object(rng.random(), Vec::new());
	}

	for _ in 0..scale {
		let mut level = Level::new();
		level.layers[0] = Some(LayerRef {
			background_id: rng.random_range(0..scale.max(1) as u32),
			distance: 0,
		});
		level.objects = (0..scale)
			.map(|_| Placement {
				object_id: rng.random_range(0..scale.max(1) as u32),
				x: rng.random(),
				y: rng.random(),
				gravity: Gravity::default(),
			})
			.collect();
		builder.add_level(level);
	}

	builder.to_bytes()
}

/// Common benchmark scales for synthetic containers
pub mod scales {
	/// A handful of assets per kind
	pub const TINY: usize = 4;
	/// A small game
	pub const SMALL: usize = 32;
	/// A full game's worth of assets
	pub const LARGE: usize = 256;
}

#[cfg(test)]
mod tests {
	use tessera_types::file::Catalog;

	use super::*;

	#[test]
	fn test_generate_container() {
		let data = generate_container(scales::TINY);
		let catalog = Catalog::from_bytes(&data).unwrap();
		assert_eq!(catalog.asset_count(), 5 * scales::TINY);
	}

	#[test]
	fn test_generate_tile_map_is_seeded() {
		let size = BackgroundSize::from_class(0).unwrap();
		let a = generate_tile_map(size, 16, 4);
		assert_eq!(a.len(), size.cells());
		assert_eq!(a, generate_tile_map(size, 16, 4));
	}
}
