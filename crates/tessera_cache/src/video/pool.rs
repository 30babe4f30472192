//! Video memory pool bookkeeping.
//!
//! Sprite memory is handed out in whole 32-byte tiles (8×8 pixels at 4bpp).
//! A sprite's footprint is its hardware size class, not its exact pixel size.

use std::fmt;

use serde::Serialize;

/// Bytes per hardware tile (8×8 pixels, 4 bits per pixel)
pub const TILE_BYTES: usize = 32;

/// Supported sprite dimensions, in pixels
pub const SPRITE_BUCKETS: [u8; 4] = [8, 16, 32, 64];

/// Hardware sprite size class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SpriteSize {
	/// Width bucket in pixels
	pub width: u8,
	/// Height bucket in pixels
	pub height: u8,
}

impl SpriteSize {
	/// Size class for a sprite of the given pixel dimensions.
	///
	/// Each dimension rounds up to the next bucket; anything above 64 clamps to 64.
	pub fn for_dimensions(width: u8, height: u8) -> Self {
		Self {
			width: Self::bucket(width),
			height: Self::bucket(height),
		}
	}

	fn bucket(dimension: u8) -> u8 {
		SPRITE_BUCKETS.into_iter().find(|&bucket| dimension <= bucket).unwrap_or(64)
	}

	/// Footprint in tiles
	pub fn tiles(self) -> usize {
		(self.width as usize / 8) * (self.height as usize / 8)
	}

	/// Footprint in bytes
	pub fn bytes(self) -> usize {
		self.tiles() * TILE_BYTES
	}
}

impl fmt::Display for SpriteSize {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}x{}", self.width, self.height)
	}
}

/// Lease on a contiguous run of tiles in video memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct VramHandle {
	/// First tile of the region
	pub first_tile: u16,
	/// Number of tiles in the region
	pub tiles: u16,
}

impl VramHandle {
	/// Byte offset of the region in video memory
	pub fn offset(&self) -> usize {
		self.first_tile as usize * TILE_BYTES
	}

	/// Region length in bytes
	pub fn byte_len(&self) -> usize {
		self.tiles as usize * TILE_BYTES
	}
}

impl fmt::Display for VramHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "tiles {}..{}", self.first_tile, self.first_tile + self.tiles)
	}
}

/// Allocator over the hardware sprite memory pool
pub trait VramAllocator {
	/// Reserves a region for a sprite of the given size class
	fn allocate(&mut self, size: SpriteSize) -> Option<VramHandle>;

	/// Returns a region to the pool
	fn release(&mut self, handle: VramHandle);

	/// Total tiles in the pool
	fn capacity(&self) -> usize;

	/// Tiles currently leased
	fn tiles_in_use(&self) -> usize;
}

/// First-fit allocator over a fixed number of tiles
#[derive(Debug, Clone)]
pub struct TilePool {
	used: Vec<bool>,
	in_use: usize,
}

impl TilePool {
	/// Creates a pool of `tiles` free tiles (at most `u16::MAX`)
	pub fn new(tiles: usize) -> Self {
		Self {
			used: vec![false; tiles.min(u16::MAX as usize)],
			in_use: 0,
		}
	}

	fn find_run(&self, len: usize) -> Option<usize> {
		let mut start = 0;
		let mut run = 0;
		for (index, &used) in self.used.iter().enumerate() {
			if used {
				run = 0;
				start = index + 1;
			} else {
				run += 1;
				if run == len {
					return Some(start);
				}
			}
		}
		None
	}
}

impl VramAllocator for TilePool {
	fn allocate(&mut self, size: SpriteSize) -> Option<VramHandle> {
		let tiles = size.tiles();
		let start = self.find_run(tiles)?;
		self.used[start..start + tiles].fill(true);
		self.in_use += tiles;
		Some(VramHandle {
			first_tile: start as u16,
			tiles: tiles as u16,
		})
	}

	fn release(&mut self, handle: VramHandle) {
		let start = handle.first_tile as usize;
		let end = (start + handle.tiles as usize).min(self.used.len());
		for used in &mut self.used[start.min(end)..end] {
			if *used {
				*used = false;
				self.in_use -= 1;
			}
		}
	}

	fn capacity(&self) -> usize {
		self.used.len()
	}

	fn tiles_in_use(&self) -> usize {
		self.in_use
	}
}
