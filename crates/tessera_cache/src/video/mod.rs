//! Video-memory tier.
//!
//! The second, smaller cache tier: graphics are copied into leased regions of
//! the sprite memory pool and palettes into hardware palette slots. Residency
//! is tracked per asset id so that repeated requests across frames cost a
//! hash lookup and never reissue a transfer.
//!
//! # Lifetimes
//!
//! - Graphics regions are only returned to the pool by
//!   [`VideoCache::release_graphics`]; nothing is evicted automatically.
//! - Palette slots are assigned from a strictly increasing counter and are
//!   never reused within a session, even after [`VideoCache::evict_palette`].
//!   [`PaletteSlots::release_all`] starts a new session.
//!
//! # Examples
//!
//! ```
//! use std::io::Cursor;
//!
//! use tessera_cache::{MainMemory, PaletteSlots, SoftVideoBus, TilePool, VideoCache};
//! use tessera_types::file::{Catalog, ContainerBuilder, Reader};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut builder = ContainerBuilder::new();
//! builder.add_graphics(16, 16, 0, 0, vec![0x11; 128])?;
//! let mut reader = Reader::new(Cursor::new(builder.to_bytes()))?;
//! let catalog = Catalog::index(&mut reader)?;
//!
//! let mut main = MainMemory::new(None);
//! let mut video =
//!     VideoCache::new(SoftVideoBus::new(4096, 16, 32), TilePool::new(128), PaletteSlots::new(16));
//!
//! let entry = catalog.graphics(0)?;
//! let handle = video.ensure_graphics(0, entry, &mut main, &mut reader)?;
//! assert_eq!(video.ensure_graphics(0, entry, &mut main, &mut reader)?, handle);
//! assert_eq!(video.bus().copies_issued(), 1);
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::io::{Read, Seek};

use log::{debug, trace};
use tessera_types::file::{AssetKey, GraphicsEntry, PaletteEntry, Reader};

use crate::{CacheError, MainMemory};

mod bus;
mod pool;

pub use self::bus::{SoftVideoBus, TransferToken, VideoBus};
pub use self::pool::{SPRITE_BUCKETS, SpriteSize, TILE_BYTES, TilePool, VramAllocator, VramHandle};

/// Session allocator for hardware palette slots.
///
/// Slots are handed out in increasing order starting at 0 and are never
/// reused until [`PaletteSlots::release_all`].
#[derive(Debug, Clone)]
pub struct PaletteSlots {
	next: usize,
	capacity: usize,
}

impl PaletteSlots {
	/// Creates an allocator over `capacity` slots
	pub fn new(capacity: usize) -> Self {
		Self {
			next: 0,
			capacity,
		}
	}

	/// Assigns the next slot
	pub fn allocate(&mut self) -> Result<usize, CacheError> {
		if self.next == self.capacity {
			return Err(CacheError::PaletteSlotsExhausted {
				capacity: self.capacity,
			});
		}
		self.next += 1;
		Ok(self.next - 1)
	}

	/// Resets the counter, starting a new session
	pub fn release_all(&mut self) {
		self.next = 0;
	}

	/// Slots assigned in this session
	pub fn assigned(&self) -> usize {
		self.next
	}

	/// Total slots
	pub fn capacity(&self) -> usize {
		self.capacity
	}
}

#[derive(Debug, Clone)]
struct GraphicsResidence {
	handle: VramHandle,
	transfer: TransferToken,
}

/// Video-memory residency cache for graphics and palettes
#[derive(Debug)]
pub struct VideoCache<B, A = TilePool> {
	bus: B,
	pool: A,
	slots: PaletteSlots,
	graphics: HashMap<usize, GraphicsResidence>,
	palettes: HashMap<usize, usize>,
}

impl<B: VideoBus, A: VramAllocator> VideoCache<B, A> {
	/// Creates a cache over the given bus, pool and palette slot allocator
	pub fn new(bus: B, pool: A, slots: PaletteSlots) -> Self {
		Self {
			bus,
			pool,
			slots,
			graphics: HashMap::new(),
			palettes: HashMap::new(),
		}
	}

	/// Maps graphics `id` into video memory, returning its region.
	///
	/// A resident graphics asset returns its existing handle without a new
	/// transfer. Otherwise the payload is brought into main memory, a region
	/// sized to the sprite's size class is leased and an asynchronous copy is
	/// issued; the call does not wait for it.
	pub fn ensure_graphics<R: Read + Seek>(
		&mut self,
		id: usize,
		entry: &GraphicsEntry,
		main: &mut MainMemory,
		reader: &mut Reader<R>,
	) -> Result<VramHandle, CacheError> {
		if let Some(residence) = self.graphics.get(&id) {
			trace!("graphics#{id} already in video memory at {}", residence.handle);
			return Ok(residence.handle);
		}

		let data = main.ensure(AssetKey::graphics(id), entry.record, reader)?;
		let size = SpriteSize::for_dimensions(entry.width, entry.height);
		let handle = self.pool.allocate(size).ok_or_else(|| CacheError::VideoMemoryExhausted {
			requested: size.tiles(),
			free: self.pool.capacity() - self.pool.tiles_in_use(),
			capacity: self.pool.capacity(),
		})?;

		let len = data.len().min(handle.byte_len());
		if len < data.len() {
			debug!(
				"graphics#{id} payload of {} bytes truncated to its {size} region ({len} bytes)",
				data.len()
			);
		}
		let transfer = self.bus.copy_async(handle.offset(), &data[..len]);
		debug!("Mapped graphics#{id} ({}x{} as {size}) to {handle}", entry.width, entry.height);

		self.graphics.insert(id, GraphicsResidence {
			handle,
			transfer,
		});
		Ok(handle)
	}

	/// Writes palette `id` into the next hardware slot, returning the slot.
	///
	/// A resident palette returns its existing slot without rewriting it.
	pub fn ensure_palette<R: Read + Seek>(
		&mut self,
		id: usize,
		entry: &PaletteEntry,
		main: &mut MainMemory,
		reader: &mut Reader<R>,
	) -> Result<usize, CacheError> {
		if let Some(&slot) = self.palettes.get(&id) {
			trace!("palette#{id} already in slot {slot}");
			return Ok(slot);
		}

		let data = main.ensure(AssetKey::palette(id), entry.record, reader)?;
		let slot = self.slots.allocate()?;
		self.bus.write_palette(slot, data);
		debug!("Wrote palette#{id} to slot {slot}");

		self.palettes.insert(id, slot);
		Ok(slot)
	}

	/// Returns the region of graphics `id` to the pool
	pub fn release_graphics(&mut self, id: usize) -> bool {
		match self.graphics.remove(&id) {
			Some(residence) => {
				self.pool.release(residence.handle);
				debug!("Released graphics#{id} from {}", residence.handle);
				true
			}
			None => false,
		}
	}

	/// Forgets the residency of palette `id`; its slot is not reassigned
	pub fn evict_palette(&mut self, id: usize) -> bool {
		self.palettes.remove(&id).is_some()
	}

	/// Releases every graphics region and forgets every palette
	pub fn clear(&mut self) {
		for (_, residence) in self.graphics.drain() {
			self.pool.release(residence.handle);
		}
		self.palettes.clear();
	}

	/// Region of graphics `id` if resident
	pub fn graphics_handle(&self, id: usize) -> Option<VramHandle> {
		self.graphics.get(&id).map(|residence| residence.handle)
	}

	/// Completion token of the transfer that mapped graphics `id`
	pub fn graphics_transfer(&self, id: usize) -> Option<&TransferToken> {
		self.graphics.get(&id).map(|residence| &residence.transfer)
	}

	/// Slot of palette `id` if resident
	pub fn palette_slot(&self, id: usize) -> Option<usize> {
		self.palettes.get(&id).copied()
	}

	/// Number of resident graphics
	pub fn graphics_count(&self) -> usize {
		self.graphics.len()
	}

	/// Number of resident palettes
	pub fn palette_count(&self) -> usize {
		self.palettes.len()
	}

	/// Frame boundary: lets the bus complete queued transfers
	pub fn end_frame(&mut self) {
		self.bus.poll();
	}

	/// Waits for every issued transfer to complete
	pub fn sync(&mut self) {
		self.bus.flush();
	}

	/// The hardware bus
	pub fn bus(&self) -> &B {
		&self.bus
	}

	/// The sprite memory pool
	pub fn pool(&self) -> &A {
		&self.pool
	}

	/// The palette slot allocator
	pub fn palette_slots(&self) -> &PaletteSlots {
		&self.slots
	}

	/// Starts a new palette session: forgets every palette and resets the slot counter
	pub fn reset_palettes(&mut self) {
		self.palettes.clear();
		self.slots.release_all();
	}
}

#[cfg(test)]
mod tests;
