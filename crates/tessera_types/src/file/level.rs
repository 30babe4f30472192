//! Level placement data.
//!
//! A level block in the container is laid out as:
//!
//! ```text
//! 4 × { u32 backgroundId, u32 distance }          layer table, backgroundId 0xFFFFFFFF = unused
//! u32 heroCount;   heroCount × placement
//! u32 objectCount; objectCount × placement
//!
//! placement = { u32 objectId, u16 x, u16 y, i16 gravityX, i16 gravityY }
//! ```
//!
//! Gravity components are signed 4.12 fixed point.

use std::fmt;
use std::io::{Read, Seek};

use serde::Serialize;

use super::{ContainerError, Reader};

/// Number of background layer slots per level
pub const LAYER_COUNT: usize = 4;

/// Background id marking an unused layer slot
pub const LAYER_UNUSED: u32 = u32::MAX;

/// Size of the layer table in bytes
pub const LAYER_TABLE_SIZE: u64 = LAYER_COUNT as u64 * 8;

/// Size of one placement record in bytes
pub const PLACEMENT_SIZE: u64 = 12;

/// Signed fixed-point number with 12 fractional bits
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Fx12(pub i16);

impl Fx12 {
	/// Number of fractional bits
	pub const FRACTION_BITS: u32 = 12;

	/// Scale factor between the raw value and its real value
	pub const SCALE: f32 = (1 << Self::FRACTION_BITS) as f32;

	/// Converts to a float
	pub fn to_f32(self) -> f32 {
		self.0 as f32 / Self::SCALE
	}

	/// Converts from a float, saturating at the representable range
	pub fn from_f32(value: f32) -> Self {
		Self((value * Self::SCALE).round() as i16)
	}
}

impl fmt::Display for Fx12 {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:.4}", self.to_f32())
	}
}

/// Per-placement gravity vector
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Gravity {
	/// Horizontal component
	pub horizontal: Fx12,
	/// Vertical component
	pub vertical: Fx12,
}

/// A hero or object placed in a level
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Placement {
	/// Object definition id
	pub object_id: u32,
	/// X position in pixels
	pub x: u16,
	/// Y position in pixels
	pub y: u16,
	/// Gravity applied to the placed object
	pub gravity: Gravity,
}

impl Placement {
	fn read_from<R: Read + Seek>(reader: &mut Reader<R>) -> Result<Self, ContainerError> {
		Ok(Self {
			object_id: reader.read_u32()?,
			x: reader.read_u16()?,
			y: reader.read_u16()?,
			gravity: Gravity {
				horizontal: Fx12(reader.read_i16()?),
				vertical: Fx12(reader.read_i16()?),
			},
		})
	}

	/// Serializes the placement to its 12-byte container form
	pub fn to_bytes(&self) -> [u8; PLACEMENT_SIZE as usize] {
		let mut buffer = [0u8; PLACEMENT_SIZE as usize];
		buffer[0..4].copy_from_slice(&self.object_id.to_le_bytes());
		buffer[4..6].copy_from_slice(&self.x.to_le_bytes());
		buffer[6..8].copy_from_slice(&self.y.to_le_bytes());
		buffer[8..10].copy_from_slice(&self.gravity.horizontal.0.to_le_bytes());
		buffer[10..12].copy_from_slice(&self.gravity.vertical.0.to_le_bytes());
		buffer
	}
}

/// Reference from a level layer slot to a background
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LayerRef {
	/// Background id
	pub background_id: u32,
	/// Parallax distance
	pub distance: u32,
}

/// Materialized level: background layers plus hero and object placements
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Level {
	/// Background layer slots, `None` for unused slots
	pub layers: [Option<LayerRef>; LAYER_COUNT],
	/// Hero placements
	pub heroes: Vec<Placement>,
	/// Object placements
	pub objects: Vec<Placement>,
}

impl Level {
	/// Creates an empty level
	pub fn new() -> Self {
		Self::default()
	}

	/// Drops all placements and layer references, keeping the list allocations
	pub fn clear(&mut self) {
		self.layers = [None; LAYER_COUNT];
		self.heroes.clear();
		self.objects.clear();
	}

	/// Returns `true` if nothing is materialized
	pub fn is_empty(&self) -> bool {
		self.layers.iter().all(Option::is_none) && self.heroes.is_empty() && self.objects.is_empty()
	}

	/// Iterates over the used layer slots as `(slot, layer)`
	pub fn active_layers(&self) -> impl Iterator<Item = (usize, LayerRef)> + '_ {
		self.layers.iter().enumerate().filter_map(|(slot, layer)| layer.map(|l| (slot, l)))
	}

	/// Clears the level and re-populates it from the reader's current position
	pub fn read_from<R: Read + Seek>(
		&mut self,
		reader: &mut Reader<R>,
	) -> Result<(), ContainerError> {
		self.clear();

		for slot in &mut self.layers {
			let background_id = reader.read_u32()?;
			let distance = reader.read_u32()?;
			*slot = (background_id != LAYER_UNUSED).then_some(LayerRef {
				background_id,
				distance,
			});
		}

		read_placements(reader, &mut self.heroes)?;
		read_placements(reader, &mut self.objects)?;
		Ok(())
	}

	/// Checks that every placement and layer refers to an existing asset.
	///
	/// `offset` is the level block's position, reported in the error.
	pub fn validate(
		&self,
		offset: u64,
		object_count: usize,
		background_count: usize,
	) -> Result<(), ContainerError> {
		for (slot, layer) in self.active_layers() {
			if layer.background_id as usize >= background_count {
				return Err(ContainerError::malformed(
					offset,
					format!(
						"layer {slot} references background {} (catalog has {background_count})",
						layer.background_id
					),
				));
			}
		}
		for placement in self.heroes.iter().chain(&self.objects) {
			if placement.object_id as usize >= object_count {
				return Err(ContainerError::malformed(
					offset,
					format!(
						"placement references object {} (catalog has {object_count})",
						placement.object_id
					),
				));
			}
		}
		Ok(())
	}

	/// Serializes the level block to its container form
	pub fn to_bytes(&self) -> Vec<u8> {
		let mut data = Vec::with_capacity(
			LAYER_TABLE_SIZE as usize +
				8 + (self.heroes.len() + self.objects.len()) * PLACEMENT_SIZE as usize,
		);
		for layer in &self.layers {
			let (background_id, distance) =
				layer.map_or((LAYER_UNUSED, 0), |l| (l.background_id, l.distance));
			data.extend_from_slice(&background_id.to_le_bytes());
			data.extend_from_slice(&distance.to_le_bytes());
		}
		for list in [&self.heroes, &self.objects] {
			data.extend_from_slice(&(list.len() as u32).to_le_bytes());
			for placement in list {
				data.extend_from_slice(&placement.to_bytes());
			}
		}
		data
	}
}

fn read_placements<R: Read + Seek>(
	reader: &mut Reader<R>,
	list: &mut Vec<Placement>,
) -> Result<(), ContainerError> {
	let at = reader.position();
	let count = reader.read_u32()? as u64;
	if count * PLACEMENT_SIZE > reader.remaining() {
		return Err(ContainerError::malformed(
			at,
			format!("{count} placements do not fit in the {} remaining bytes", reader.remaining()),
		));
	}
	list.reserve(count as usize);
	for _ in 0..count {
		list.push(Placement::read_from(reader)?);
	}
	Ok(())
}

/// Skips over a level block, returning its total length in bytes
pub(crate) fn skip_level<R: Read + Seek>(reader: &mut Reader<R>) -> Result<u64, ContainerError> {
	let start = reader.position();
	reader.skip(LAYER_TABLE_SIZE)?;
	for _ in 0..2 {
		let count = reader.read_u32()? as u64;
		reader.skip(count * PLACEMENT_SIZE)?;
	}
	Ok(reader.position() - start)
}

#[cfg(test)]
mod tests {
	use std::io::Cursor;

	use super::*;

	fn sample_level() -> Level {
		Level {
			layers: [
				Some(LayerRef {
					background_id: 0,
					distance: 0,
				}),
				None,
				Some(LayerRef {
					background_id: 1,
					distance: 4,
				}),
				None,
			],
			heroes: vec![Placement {
				object_id: 0,
				x: 16,
				y: 32,
				gravity: Gravity {
					horizontal: Fx12(0),
					vertical: Fx12::from_f32(0.5),
				},
			}],
			objects: vec![
				Placement {
					object_id: 1,
					x: 100,
					y: 8,
					gravity: Gravity::default(),
				},
				Placement {
					object_id: 1,
					x: 140,
					y: 8,
					gravity: Gravity {
						horizontal: Fx12(-4096),
						vertical: Fx12(0),
					},
				},
			],
		}
	}

	#[test]
	fn test_fixed_point() {
		assert_eq!(Fx12::from_f32(1.0), Fx12(4096));
		assert_eq!(Fx12(-2048).to_f32(), -0.5);
		assert_eq!(Fx12::from_f32(0.25).0, 1024);
	}

	#[test]
	fn test_read_level() {
		let level = sample_level();
		let bytes = level.to_bytes();
		assert_eq!(bytes.len() as u64, LAYER_TABLE_SIZE + 8 + 3 * PLACEMENT_SIZE);

		let mut reader = Reader::new(Cursor::new(bytes)).unwrap();
		let mut parsed = Level::new();
		parsed.read_from(&mut reader).unwrap();
		assert_eq!(parsed, level);
		assert_eq!(parsed.active_layers().count(), 2);
		assert_eq!(parsed.objects[1].gravity.horizontal.to_f32(), -1.0);
	}

	#[test]
	fn test_read_replaces_previous_contents() {
		let mut parsed = sample_level();
		let empty = Level::new().to_bytes();
		let mut reader = Reader::new(Cursor::new(empty)).unwrap();
		parsed.read_from(&mut reader).unwrap();
		assert!(parsed.is_empty());
	}

	#[test]
	fn test_skip_level_measures_block() {
		let bytes = sample_level().to_bytes();
		let len = bytes.len() as u64;
		let mut reader = Reader::new(Cursor::new(bytes)).unwrap();
		assert_eq!(skip_level(&mut reader).unwrap(), len);
	}

	#[test]
	fn test_truncated_placements() {
		let mut bytes = sample_level().to_bytes();
		bytes.truncate(bytes.len() - 4);
		let mut reader = Reader::new(Cursor::new(bytes.clone())).unwrap();
		assert!(Level::new().read_from(&mut reader).unwrap_err().is_fatal());
		let mut reader = Reader::new(Cursor::new(bytes)).unwrap();
		assert!(matches!(skip_level(&mut reader), Err(ContainerError::Malformed { .. })));
	}

	#[test]
	fn test_validate_references() {
		let level = sample_level();
		assert!(level.validate(0, 2, 2).is_ok());
		assert!(level.validate(0, 1, 2).is_err());
		assert!(matches!(level.validate(64, 2, 1), Err(ContainerError::Malformed {
			offset: 64,
			..
		})));
	}
}
