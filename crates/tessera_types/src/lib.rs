//! This crate provides the container format types for the `tessera` project.
//!
//! # Container
//!
//! A single append-only binary file holds every game asset. Assets are located
//! by byte offset; the [`Catalog`](file::Catalog) indexes them in one forward
//! scan without reading payloads.
//!
//! - **Graphics**: sprite tile sheets with sub-rectangle metadata
//! - **Palettes**: raw color tables written to hardware palette slots
//! - **Backgrounds**: tile maps, deduplicated into 16-bit hardware map entries
//! - **Objects**: animation definitions referencing graphics and palettes
//! - **Levels**: background layers plus hero and object placements
//!
//! # Examples
//!
//! Using the prelude (recommended):
//!
//! ```no_run
//! use tessera_types::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut reader = Reader::open("GAME.DAT")?;
//! let catalog = Catalog::index(&mut reader)?;
//!
//! let mut level = Level::new();
//! reader.seek_to(catalog.level(0)?.record.offset)?;
//! level.read_from(&mut reader)?;
//! println!("{} heroes", level.heroes.len());
//! # Ok(())
//! # }
//! ```
//!
//! Or use explicit paths:
//!
//! ```
//! use tessera_types::file::background::MapEntry;
//!
//! assert_eq!(MapEntry::pack(5, true, false, 3).raw(), 0x3405);
//! ```

pub mod file;

/// `use tessera_types::prelude::*;` to import commonly used items.
pub mod prelude;
