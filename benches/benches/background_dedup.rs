//! Benchmark suite for background deduplication
//!
//! Run with: cargo bench --manifest-path benches/Cargo.toml --bench background_dedup

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use tessera_benches::generate_tile_map;
use tessera_types::file::{BackgroundSize, MissingPalettePolicy, deduplicate};

/// Benchmark deduplication for every size class
fn bench_deduplicate(c: &mut Criterion) {
	let mut group = c.benchmark_group("background_dedup");

	for class in 0..4 {
		let Some(size) = BackgroundSize::from_class(class) else {
			continue;
		};
		let refs = generate_tile_map(size, 64, 4);
		group.throughput(Throughput::Elements(size.cells() as u64));
		group.bench_with_input(BenchmarkId::new("deduplicate", size), &refs, |b, refs| {
			b.iter(|| {
				let result = deduplicate(
					size,
					black_box(refs).chunks(size.width as usize),
					Some(0),
					MissingPalettePolicy::Error,
				);
				black_box(result)
			});
		});
	}

	group.finish();
}

/// Benchmark the worst case: every cell a distinct tile
fn bench_all_distinct(c: &mut Criterion) {
	let Some(size) = BackgroundSize::from_class(0) else {
		return;
	};
	let refs: Vec<_> = (0..size.cells() as u16)
		.map(|tile| tessera_types::file::TileRef::new(tile, Some(0), false, false))
		.collect();

	c.bench_function("background_dedup/all_distinct", |b| {
		b.iter(|| {
			black_box(deduplicate(
				size,
				black_box(&refs).chunks(size.width as usize),
				None,
				MissingPalettePolicy::Error,
			))
		});
	});
}

criterion_group!(benches, bench_deduplicate, bench_all_distinct);
criterion_main!(benches);
