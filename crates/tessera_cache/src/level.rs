//! The single current-level slot.

use std::io::{Read, Seek};

use log::info;
use tessera_types::file::{AssetKind, Catalog, Level, Reader};

use crate::CacheError;

/// Owns the one materialized level of a session.
///
/// Loading a level clears and reuses the slot's storage, so at most one
/// level is materialized at a time. The returned `&Level` borrows the slot,
/// which keeps callers from holding on to it across the next load.
#[derive(Debug, Default)]
pub struct LevelSlot {
	level: Level,
	id: Option<usize>,
}

impl LevelSlot {
	/// Creates an empty slot
	pub fn new() -> Self {
		Self::default()
	}

	/// Materializes level `id`, replacing whatever the slot held
	pub fn load<R: Read + Seek>(
		&mut self,
		id: usize,
		catalog: &Catalog,
		reader: &mut Reader<R>,
	) -> Result<&Level, CacheError> {
		let record = catalog.level(id)?.record;

		self.release();
		reader.seek_to(record.offset)?;
		self.level.read_from(reader)?;
		self.level.validate(
			record.offset,
			catalog.count(AssetKind::Object),
			catalog.count(AssetKind::Background),
		)?;
		self.id = Some(id);

		info!(
			"Loaded level {id}: {} layers, {} heroes, {} objects",
			self.level.active_layers().count(),
			self.level.heroes.len(),
			self.level.objects.len()
		);
		Ok(&self.level)
	}

	/// Clears the materialized level
	pub fn release(&mut self) {
		self.level.clear();
		self.id = None;
	}

	/// Id of the materialized level
	pub fn current_id(&self) -> Option<usize> {
		self.id
	}

	/// The materialized level, if any
	pub fn current(&self) -> Option<&Level> {
		self.id.map(|_| &self.level)
	}
}
