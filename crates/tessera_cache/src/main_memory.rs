//! Main-memory tier.
//!
//! An arena of payload buffers keyed by [`AssetKey`]. A payload is read from
//! the container the first time it is referenced and stays resident until it
//! is explicitly freed. Loading is synchronous and blocking, so it belongs at
//! scene-transition call sites, never in the per-frame path.

use std::collections::HashMap;
use std::io::{Read, Seek};

use log::{debug, trace};
use tessera_types::file::{AssetKey, Reader, Record};

use crate::CacheError;

/// Arena of main-memory payload buffers
#[derive(Debug, Default)]
pub struct MainMemory {
	buffers: HashMap<AssetKey, Vec<u8>>,
	used: usize,
	budget: Option<usize>,
	loads: usize,
}

impl MainMemory {
	/// Creates an empty arena with an optional byte budget
	pub fn new(budget: Option<usize>) -> Self {
		Self {
			budget,
			..Self::default()
		}
	}

	/// Returns the payload of `key`, reading it from the container on first use.
	///
	/// Exactly `record.length` bytes are read from `record.offset`; a short read
	/// is a fatal [`ContainerError::Io`](tessera_types::file::ContainerError::Io).
	pub fn ensure<R: Read + Seek>(
		&mut self,
		key: AssetKey,
		record: Record,
		reader: &mut Reader<R>,
	) -> Result<&[u8], CacheError> {
		if self.buffers.contains_key(&key) {
			trace!("{key} already in main memory");
		} else {
			let length = record.length as usize;
			if let Some(budget) = self.budget &&
				self.used + length > budget
			{
				return Err(CacheError::MainMemoryBudget {
					requested: length,
					used: self.used,
					budget,
				});
			}

			reader.seek_to(record.offset)?;
			let data = reader.read_bytes(length)?;
			debug!("Loaded {key} into main memory ({length} bytes from {record})");

			self.used += length;
			self.loads += 1;
			self.buffers.insert(key, data);
		}

		Ok(&self.buffers[&key])
	}

	/// Payload of `key` if resident
	pub fn get(&self, key: AssetKey) -> Option<&[u8]> {
		self.buffers.get(&key).map(Vec::as_slice)
	}

	/// Whether `key` is resident
	pub fn contains(&self, key: AssetKey) -> bool {
		self.buffers.contains_key(&key)
	}

	/// Releases the buffer of `key`, returning whether it was resident
	pub fn free(&mut self, key: AssetKey) -> bool {
		match self.buffers.remove(&key) {
			Some(data) => {
				self.used -= data.len();
				debug!("Freed {key} from main memory ({} bytes)", data.len());
				true
			}
			None => false,
		}
	}

	/// Releases every buffer
	pub fn free_all(&mut self) {
		debug!("Freeing {} main-memory buffers ({} bytes)", self.buffers.len(), self.used);
		self.buffers.clear();
		self.used = 0;
	}

	/// Keys of every resident buffer
	pub fn keys(&self) -> impl Iterator<Item = AssetKey> + '_ {
		self.buffers.keys().copied()
	}

	/// Number of resident buffers
	pub fn len(&self) -> usize {
		self.buffers.len()
	}

	/// Returns `true` if nothing is resident
	pub fn is_empty(&self) -> bool {
		self.buffers.is_empty()
	}

	/// Resident payload bytes
	pub fn bytes_used(&self) -> usize {
		self.used
	}

	/// Number of container reads performed since creation
	pub fn loads(&self) -> usize {
		self.loads
	}
}

#[cfg(test)]
mod tests {
	use std::io::Cursor;

	use tessera_types::file::ContainerError;

	use super::*;

	fn reader() -> Reader<Cursor<Vec<u8>>> {
		Reader::new(Cursor::new((0u8..64).collect())).unwrap()
	}

	fn record(offset: u64, length: u32) -> Record {
		Record {
			offset,
			length,
		}
	}

	#[test]
	fn test_ensure_is_idempotent() {
		let mut reader = reader();
		let mut main = MainMemory::new(None);
		let key = AssetKey::graphics(0);

		assert_eq!(main.ensure(key, record(4, 3), &mut reader).unwrap(), &[4, 5, 6]);
		assert_eq!(main.ensure(key, record(4, 3), &mut reader).unwrap(), &[4, 5, 6]);
		assert_eq!(main.loads(), 1);
		assert_eq!(main.bytes_used(), 3);
		assert!(main.contains(key));
	}

	#[test]
	fn test_free() {
		let mut reader = reader();
		let mut main = MainMemory::new(None);
		main.ensure(AssetKey::graphics(0), record(0, 8), &mut reader).unwrap();
		main.ensure(AssetKey::palette(0), record(8, 8), &mut reader).unwrap();

		assert!(main.free(AssetKey::graphics(0)));
		assert!(!main.free(AssetKey::graphics(0)));
		assert_eq!(main.bytes_used(), 8);

		main.free_all();
		assert!(main.is_empty());
		assert_eq!(main.bytes_used(), 0);

		// reloading after a free reads the container again
		main.ensure(AssetKey::graphics(0), record(0, 8), &mut reader).unwrap();
		assert_eq!(main.loads(), 3);
	}

	#[test]
	fn test_short_read_is_fatal() {
		let mut reader = reader();
		let mut main = MainMemory::new(None);
		let err = main.ensure(AssetKey::graphics(0), record(60, 8), &mut reader).unwrap_err();
		assert!(matches!(err, CacheError::Container(ContainerError::Io(_))));
		assert!(err.is_fatal());
		assert!(!main.contains(AssetKey::graphics(0)));
	}

	#[test]
	fn test_budget() {
		let mut reader = reader();
		let mut main = MainMemory::new(Some(10));
		main.ensure(AssetKey::graphics(0), record(0, 8), &mut reader).unwrap();
		let err = main.ensure(AssetKey::graphics(1), record(8, 8), &mut reader).unwrap_err();
		assert!(matches!(err, CacheError::MainMemoryBudget {
			requested: 8,
			used: 8,
			budget: 10
		}));
		assert!(!err.is_fatal());

		main.free(AssetKey::graphics(0));
		main.ensure(AssetKey::graphics(1), record(8, 8), &mut reader).unwrap();
	}
}
