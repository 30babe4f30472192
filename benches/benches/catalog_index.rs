//! Benchmark suite for container indexing and the cache tiers
//!
//! Measures the single forward indexing scan and the cost of cache hits,
//! which run every frame.
//!
//! Run with: cargo bench --manifest-path benches/Cargo.toml

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use tessera_benches::{generate_container, scales};
use tessera_cache::{AssetStore, StoreConfig};
use tessera_types::file::Catalog;

/// Benchmark catalog indexing across container sizes
fn bench_index(c: &mut Criterion) {
	let mut group = c.benchmark_group("catalog_index");

	let scales = [("tiny", scales::TINY), ("small", scales::SMALL), ("large", scales::LARGE)];
	for (name, scale) in scales {
		let data = generate_container(scale);
		group.throughput(Throughput::Bytes(data.len() as u64));
		group.bench_with_input(BenchmarkId::new("index", name), &data, |b, data| {
			b.iter(|| black_box(Catalog::from_bytes(black_box(data))));
		});
	}

	group.finish();
}

/// Benchmark repeated residency lookups once assets are mapped
fn bench_cache_hits(c: &mut Criterion) {
	let mut group = c.benchmark_group("cache_hits");
	let data = generate_container(scales::SMALL);

	let Ok(mut store) = AssetStore::from_bytes(data, StoreConfig::default()) else {
		eprintln!("Warning: could not index the synthetic container");
		return;
	};
	for id in 0..scales::SMALL {
		if store.graphics(id).is_err() || store.palette(id).is_err() {
			eprintln!("Warning: could not map asset {id}");
			return;
		}
	}
	store.sync();

	group.throughput(Throughput::Elements(scales::SMALL as u64));
	group.bench_function("graphics", |b| {
		b.iter(|| {
			for id in 0..scales::SMALL {
				let _ = black_box(store.graphics(black_box(id)));
			}
		});
	});
	group.bench_function("palette", |b| {
		b.iter(|| {
			for id in 0..scales::SMALL {
				let _ = black_box(store.palette(black_box(id)));
			}
		});
	});

	group.finish();
}

/// Benchmark level materialization
fn bench_level_load(c: &mut Criterion) {
	let mut group = c.benchmark_group("level_load");

	for (name, scale) in [("small", scales::SMALL), ("large", scales::LARGE)] {
		let data = generate_container(scale);
		let Ok(mut store) = AssetStore::from_bytes(data, StoreConfig::default()) else {
			continue;
		};
		group.throughput(Throughput::Elements(scale as u64));
		group.bench_function(BenchmarkId::new("load_level", name), |b| {
			let mut id = 0;
			b.iter(|| {
				id = (id + 1) % scale;
				let _ = black_box(store.load_level(id));
			});
		});
	}

	group.finish();
}

criterion_group!(benches, bench_index, bench_cache_hits, bench_level_load);
criterion_main!(benches);
