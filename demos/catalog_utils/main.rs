//! Asset container CLI utility
//!
//! A command-line tool for inspecting and validating `tessera` asset containers.
//!
//! # Features
//!
//! - **info**: Display container header information and per-kind counts
//! - **list**: List catalog records of every (or one) asset kind
//! - **dump**: Print the payload of one asset as hex
//! - **level**: Materialize a level and print its layers and placements
//! - **background**: Deduplicate a background and print its tiles and map
//! - **verify**: Load every asset through the cache tiers
//! - **sample**: Write a small sample container
//!
//! # Usage Examples
//!
//! ```bash
//! # Write a sample container to play with
//! cargo run --example catalog_utils -- sample bin/SAMPLE.DAT
//!
//! # Display information about a container
//! cargo run --example catalog_utils -- info bin/SAMPLE.DAT
//!
//! # List backgrounds as JSON
//! cargo run --example catalog_utils -- list bin/SAMPLE.DAT --kind background --format json
//!
//! # Show the deduplicated map of background 0
//! cargo run --example catalog_utils -- background bin/SAMPLE.DAT 0 --map
//!
//! # Verify with a custom configuration file
//! cargo run --example catalog_utils -- verify bin/SAMPLE.DAT --config tessera.toml
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use log::{error, info, warn};
use serde::Serialize;
use tessera::prelude::*;

#[derive(Parser)]
#[command(name = "catalog_utils")]
#[command(author = "tessera project")]
#[command(version = "1.0")]
#[command(about = "Asset container utility - inspect, dump, verify and generate", long_about = None)]
struct Cli {
	/// Store configuration file (TOML); `TESSERA_*` environment variables override it
	#[arg(short, long, global = true, value_name = "CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Display container information and statistics
	Info {
		/// Container file
		#[arg(value_name = "INPUT")]
		input: PathBuf,

		/// Output format
		#[arg(short, long, value_enum, default_value = "table")]
		format: OutputFormat,
	},

	/// List catalog records
	List {
		/// Container file
		#[arg(value_name = "INPUT")]
		input: PathBuf,

		/// Only list assets of this kind
		#[arg(short, long, value_enum)]
		kind: Option<KindArg>,

		/// Output format
		#[arg(short, long, value_enum, default_value = "table")]
		format: OutputFormat,
	},

	/// Print the payload of one asset as hex
	Dump {
		/// Container file
		#[arg(value_name = "INPUT")]
		input: PathBuf,

		/// Asset kind
		#[arg(value_enum)]
		kind: KindArg,

		/// Asset id within the kind
		id: usize,

		/// Bytes per output row
		#[arg(short, long, default_value = "16")]
		width: usize,
	},

	/// Materialize a level and print it
	Level {
		/// Container file
		#[arg(value_name = "INPUT")]
		input: PathBuf,

		/// Level id
		id: usize,

		/// Output format
		#[arg(short, long, value_enum, default_value = "table")]
		format: OutputFormat,
	},

	/// Deduplicate a background and print the result
	Background {
		/// Container file
		#[arg(value_name = "INPUT")]
		input: PathBuf,

		/// Background id
		id: usize,

		/// Print the packed map entries
		#[arg(short, long)]
		map: bool,

		/// Output format
		#[arg(short, long, value_enum, default_value = "table")]
		format: OutputFormat,
	},

	/// Load every asset through the cache tiers
	Verify {
		/// Container file
		#[arg(value_name = "INPUT")]
		input: PathBuf,

		/// Also map every graphics asset into video memory
		#[arg(short, long)]
		video: bool,
	},

	/// Write a small sample container
	Sample {
		/// Output file
		#[arg(value_name = "OUTPUT")]
		output: PathBuf,
	},
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
	/// Table format
	Table,
	/// JSON format
	Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindArg {
	/// Sprite graphics
	Graphics,
	/// Palettes
	Palette,
	/// Background tile maps
	Background,
	/// Object definitions
	Object,
	/// Levels
	Level,
}

impl From<KindArg> for AssetKind {
	fn from(kind: KindArg) -> Self {
		match kind {
			KindArg::Graphics => AssetKind::Graphics,
			KindArg::Palette => AssetKind::Palette,
			KindArg::Background => AssetKind::Background,
			KindArg::Object => AssetKind::Object,
			KindArg::Level => AssetKind::Level,
		}
	}
}

#[derive(Debug, Serialize)]
struct ListRow {
	kind: AssetKind,
	id: usize,
	offset: u64,
	length: u32,
	detail: String,
}

/// Opens a container with the configuration from `--config` and the environment
fn open_store(
	input: &Path,
	config: Option<&Path>,
) -> Result<AssetStore<BufReader<File>>, CacheError> {
	let config = StoreConfig::load(config)?;
	info!("Opening {}", input.display());
	AssetStore::open(input, config)
}

fn to_json<T: Serialize>(value: &T) -> String {
	serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
}

/// Handles the 'info' command
fn handle_info(
	input: &Path,
	config: Option<&Path>,
	format: OutputFormat,
) -> Result<(), CacheError> {
	let store = open_store(input, config)?;
	let summary = store.catalog().summary();

	match format {
		OutputFormat::Table => {
			println!("\n=== Container Information ===");
			println!("File: {}", input.display());
			println!("Version: {}", summary.version);
			println!("Size: {} bytes ({:.2} KB)", summary.bytes, summary.bytes as f64 / 1024.0);
			println!("Declared Assets: {}", summary.declared_total);
			println!();
			println!("Graphics: {}", summary.graphics);
			println!("Palettes: {}", summary.palettes);
			println!("Backgrounds: {}", summary.backgrounds);
			println!("Objects: {}", summary.objects);
			println!("Levels: {}", summary.levels);
			if summary.declared_total as usize != store.catalog().asset_count() {
				warn!(
					"Header declares {} assets but {} were indexed",
					summary.declared_total,
					store.catalog().asset_count()
				);
			}
		}
		OutputFormat::Json => println!("{}", to_json(&summary)),
	}

	Ok(())
}

fn describe(catalog: &Catalog, key: AssetKey) -> Result<String, CacheError> {
	let detail = match key.kind {
		AssetKind::Graphics => {
			let entry = catalog.graphics(key.id)?;
			format!("{}x{} at ({}, {})", entry.width, entry.height, entry.left, entry.top)
		}
		AssetKind::Background => {
			let entry = catalog.background(key.id)?;
			match entry.default_palette {
				Some(palette) => format!("{} default palette {palette}", entry.size),
				None => format!("{} no default palette", entry.size),
			}
		}
		AssetKind::Object => {
			let object = catalog.object(key.id)?;
			let frames: usize = object.animations.iter().map(|a| a.frames.len()).sum();
			format!(
				"weight {} {} animations {frames} frames",
				object.weight,
				object.animations.len()
			)
		}
		AssetKind::Palette | AssetKind::Level => String::new(),
	};
	Ok(detail)
}

/// Handles the 'list' command
fn handle_list(
	input: &Path,
	config: Option<&Path>,
	kind: Option<KindArg>,
	format: OutputFormat,
) -> Result<(), CacheError> {
	let store = open_store(input, config)?;
	let catalog = store.catalog();
	let kind = kind.map(AssetKind::from);

	let mut rows = Vec::new();
	for key in catalog.keys().filter(|key| kind.is_none_or(|kind| key.kind == kind)) {
		let record = catalog.record(key)?;
		rows.push(ListRow {
			kind: key.kind,
			id: key.id,
			offset: record.offset,
			length: record.length,
			detail: describe(catalog, key)?,
		});
	}

	match format {
		OutputFormat::Table => {
			println!(
				"\n{:>10} | {:>5} | {:>10} | {:>8} | Detail",
				"Kind", "Id", "Offset", "Length"
			);
			println!("{:-<10}-+-{:-<5}-+-{:-<10}-+-{:-<8}-+-{:-<24}", "", "", "", "", "");
			for row in &rows {
				println!(
					"{:>10} | {:>5} | 0x{:08X} | {:>8} | {}",
					row.kind, row.id, row.offset, row.length, row.detail
				);
			}
			println!("\nTotal: {} assets", rows.len());
		}
		OutputFormat::Json => println!("{}", to_json(&rows)),
	}

	Ok(())
}

/// Handles the 'dump' command
fn handle_dump(
	input: &Path,
	config: Option<&Path>,
	kind: KindArg,
	id: usize,
	width: usize,
) -> Result<(), CacheError> {
	let mut store = open_store(input, config)?;
	let key = AssetKey::new(kind.into(), id);
	let data = store.ensure_main_memory(key)?;

	println!("{key}: {} bytes", data.len());
	for (row, chunk) in data.chunks(width.max(1)).enumerate() {
		println!("{:08X}: {}", row * width.max(1), hex::encode(chunk));
	}
	Ok(())
}

/// Handles the 'level' command
fn handle_level(
	input: &Path,
	config: Option<&Path>,
	id: usize,
	format: OutputFormat,
) -> Result<(), CacheError> {
	let mut store = open_store(input, config)?;
	let level = store.load_level(id)?;

	match format {
		OutputFormat::Table => {
			println!("\n=== Level {id} ===");
			for (slot, layer) in level.layers.iter().enumerate() {
				match layer {
					Some(layer) => println!(
						"Layer {slot}: background {} distance {}",
						layer.background_id, layer.distance
					),
					None => println!("Layer {slot}: unused"),
				}
			}

			for (title, placements) in [("Heroes", &level.heroes), ("Objects", &level.objects)] {
				println!("\n{title}: {}", placements.len());
				for placement in placements {
					println!(
						"  object {:>4} at ({:>5}, {:>5}) gravity ({}, {})",
						placement.object_id,
						placement.x,
						placement.y,
						placement.gravity.horizontal,
						placement.gravity.vertical
					);
				}
			}
		}
		OutputFormat::Json => println!("{}", to_json(level)),
	}

	Ok(())
}

/// Handles the 'background' command
fn handle_background(
	input: &Path,
	config: Option<&Path>,
	id: usize,
	map: bool,
	format: OutputFormat,
) -> Result<(), CacheError> {
	let mut store = open_store(input, config)?;
	let slots = store.background_palette_slots(id)?;
	let background = store.background_compacted(id)?;

	match format {
		OutputFormat::Table => {
			let size = background.size();
			println!("\n=== Background {id} ({size}) ===");
			println!("Distinct tiles: {} of {} cells", background.tile_count(), size.cells());
			println!("Palettes: {:?} (hardware slots {slots:?})", background.palettes());

			println!(
				"\n{:>5} | {:>7} | {:>7} | {:>5} | {:>5}",
				"Index", "Tile", "Palette", "HFlip", "VFlip"
			);
			println!("{:-<5}-+-{:-<7}-+-{:-<7}-+-{:-<5}-+-{:-<5}", "", "", "", "", "");
			for (index, tile) in background.tiles().iter().enumerate() {
				println!(
					"{:>5} | {:>7} | {:>7} | {:>5} | {:>5}",
					index, tile.tile_id, tile.palette_id, tile.hflip, tile.vflip
				);
			}

			if map {
				println!();
				for row in background.map().chunks(size.width as usize) {
					let line: Vec<String> =
						row.iter().map(|entry| format!("{:04X}", entry.raw())).collect();
					println!("{}", line.join(" "));
				}
			}
		}
		OutputFormat::Json => {
			let value = serde_json::json!({
				"id": id,
				"background": background,
				"palette_slots": slots,
			});
			println!("{}", to_json(&value));
		}
	}

	Ok(())
}

/// Handles the 'verify' command
fn handle_verify(input: &Path, config: Option<&Path>, video: bool) -> Result<(), CacheError> {
	let mut store = open_store(input, config)?;
	let keys: Vec<AssetKey> = store.catalog().keys().collect();
	let mut problems = 0usize;

	for &key in &keys {
		let expected = store.catalog().record(key)?.length as usize;
		let length = store.ensure_main_memory(key)?.len();
		if length != expected {
			error!("{key}: read {length} bytes, catalog declares {expected}");
			problems += 1;
		}
	}
	println!("Read {} payloads ({} bytes)", keys.len(), store.stats().main_bytes);

	for id in 0..store.catalog().count(AssetKind::Background) {
		match store.background_compacted(id) {
			Ok(background) => info!("background#{id}: {} distinct tiles", background.tile_count()),
			Err(e) if e.is_fatal() => {
				error!("background#{id}: {e}");
				problems += 1;
			}
			Err(e) => return Err(e),
		}
	}

	for id in 0..store.catalog().count(AssetKind::Level) {
		if let Err(e) = store.load_level(id) {
			error!("level#{id}: {e}");
			problems += 1;
		}
	}

	if video {
		for id in 0..store.catalog().count(AssetKind::Graphics) {
			let handle = store.graphics(id)?;
			info!("graphics#{id}: {handle}");
			store.release_graphics(id);
		}
		store.sync();
	}

	let stats = store.stats();
	println!("\n=== Verification ===");
	println!(
		"Main memory: {} buffers, {} bytes, {} loads",
		stats.main_buffers, stats.main_bytes, stats.main_loads
	);
	println!(
		"Video memory: {} of {} tiles in use",
		stats.vram_tiles_in_use, stats.vram_tiles_capacity
	);
	if problems == 0 {
		println!("All {} assets OK", keys.len());
	} else {
		println!("{problems} problems found");
	}

	Ok(())
}

/// Handles the 'sample' command
fn handle_sample(output: &Path) -> Result<(), CacheError> {
	let mut builder = ContainerBuilder::new();

	// 16x16 ramp sprite and an 8x8 solid one
	builder.add_graphics(16, 16, 0, 0, (0..128).map(|i| i as u8).collect())?;
	builder.add_graphics(8, 8, 4, 4, vec![0x11; 32])?;
	builder.add_palette((0..32).collect())?;
	builder.add_palette(vec![0xFF; 32])?;

	let size = BackgroundSize::from_class(0)
		.ok_or_else(|| ContainerError::malformed(0, "no 32x32 size class"))?;
	let checker: Vec<TileRef> = (0..size.cells())
		.map(|cell| {
			let (x, y) = (cell % size.width as usize, cell / size.width as usize);
			TileRef::new(((x + y) % 2) as u16, None, x % 4 == 0, false)
		})
		.collect();
	builder.add_background(size, Some(0), checker)?;

	builder.add_object(2, vec![Animation {
		frames: vec![
			AnimationFrame {
				graphics_id: 0,
				palette_id: 0,
				duration: 8,
			},
			AnimationFrame {
				graphics_id: 1,
				palette_id: 1,
				duration: 8,
			},
		],
	}])?;

	let mut level = Level::new();
	level.layers[0] = Some(LayerRef {
		background_id: 0,
		distance: 0,
	});
	level.heroes.push(Placement {
		object_id: 0,
		x: 32,
		y: 64,
		gravity: Gravity {
			horizontal: Fx12(0),
			vertical: Fx12::from_f32(0.5),
		},
	});
	builder.add_level(level);

	builder.save(output)?;
	println!("Wrote {} assets to {}", builder.asset_count(), output.display());
	Ok(())
}

fn main() {
	env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

	let cli = Cli::parse();
	let config = cli.config.as_deref();

	let result = match cli.command {
		Commands::Info {
			input,
			format,
		} => handle_info(&input, config, format),
		Commands::List {
			input,
			kind,
			format,
		} => handle_list(&input, config, kind, format),
		Commands::Dump {
			input,
			kind,
			id,
			width,
		} => handle_dump(&input, config, kind, id, width),
		Commands::Level {
			input,
			id,
			format,
		} => handle_level(&input, config, id, format),
		Commands::Background {
			input,
			id,
			map,
			format,
		} => handle_background(&input, config, id, map, format),
		Commands::Verify {
			input,
			video,
		} => handle_verify(&input, config, video),
		Commands::Sample {
			output,
		} => handle_sample(&output),
	};

	if let Err(e) = result {
		if e.is_fatal() {
			error!("Fatal: {e}");
		} else {
			error!("{e}");
		}
		std::process::exit(1);
	}
}
