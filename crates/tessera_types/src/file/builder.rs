//! Container builder.
//!
//! Assembles a container in memory in the layout read by
//! [`Catalog::index`](super::catalog::Catalog::index). Assets receive ids in
//! insertion order within their kind.

use std::io::Write;
use std::path::Path;

use super::{
	ContainerError,
	background::{BackgroundSize, TileRef},
	catalog::{Animation, NO_DEFAULT_PALETTE, VERSION},
	level::Level,
};

#[derive(Debug, Clone)]
struct GraphicsSource {
	width: u8,
	height: u8,
	top: u8,
	left: u8,
	data: Vec<u8>,
}

#[derive(Debug, Clone)]
struct BackgroundSource {
	default_palette: Option<u32>,
	size: BackgroundSize,
	refs: Vec<TileRef>,
}

#[derive(Debug, Clone)]
struct ObjectSource {
	weight: u8,
	animations: Vec<Animation>,
}

/// Builder for container files
#[derive(Debug, Clone, Default)]
pub struct ContainerBuilder {
	graphics: Vec<GraphicsSource>,
	palettes: Vec<Vec<u8>>,
	backgrounds: Vec<BackgroundSource>,
	objects: Vec<ObjectSource>,
	levels: Vec<Level>,
}

impl ContainerBuilder {
	/// Creates an empty builder
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a graphics asset and returns its id
	pub fn add_graphics(
		&mut self,
		width: u8,
		height: u8,
		top: u8,
		left: u8,
		data: Vec<u8>,
	) -> Result<usize, ContainerError> {
		check_len(data.len(), "graphics")?;
		self.graphics.push(GraphicsSource {
			width,
			height,
			top,
			left,
			data,
		});
		Ok(self.graphics.len() - 1)
	}

	/// Adds a palette and returns its id
	pub fn add_palette(&mut self, data: Vec<u8>) -> Result<usize, ContainerError> {
		check_len(data.len(), "palette")?;
		self.palettes.push(data);
		Ok(self.palettes.len() - 1)
	}

	/// Adds a background and returns its id.
	///
	/// `refs` is row-major; it is zero-padded or truncated to the map size.
	pub fn add_background(
		&mut self,
		size: BackgroundSize,
		default_palette: Option<u32>,
		refs: Vec<TileRef>,
	) -> Result<usize, ContainerError> {
		if size.class().is_none() {
			return Err(ContainerError::malformed(
				0,
				format!("{size} is not a supported background size"),
			));
		}
		self.backgrounds.push(BackgroundSource {
			default_palette,
			size,
			refs,
		});
		Ok(self.backgrounds.len() - 1)
	}

	/// Adds an object definition and returns its id
	pub fn add_object(
		&mut self,
		weight: u8,
		animations: Vec<Animation>,
	) -> Result<usize, ContainerError> {
		if let Some(animation) = animations.iter().find(|a| a.frames.len() > u16::MAX as usize) {
			return Err(ContainerError::malformed(
				0,
				format!(
					"animation has {} frames, at most {} fit",
					animation.frames.len(),
					u16::MAX
				),
			));
		}
		self.objects.push(ObjectSource {
			weight,
			animations,
		});
		Ok(self.objects.len() - 1)
	}

	/// Adds a level and returns its id
	pub fn add_level(&mut self, level: Level) -> usize {
		self.levels.push(level);
		self.levels.len() - 1
	}

	/// Number of assets added so far
	pub fn asset_count(&self) -> usize {
		self.graphics.len() +
			self.palettes.len() +
			self.backgrounds.len() +
			self.objects.len() +
			self.levels.len()
	}

	/// Serializes the container
	pub fn to_bytes(&self) -> Vec<u8> {
		let mut data = Vec::new();
		put_u16(&mut data, VERSION);
		put_u32(&mut data, self.asset_count() as u32);

		put_u32(&mut data, self.graphics.len() as u32);
		for gfx in &self.graphics {
			data.extend_from_slice(&[gfx.width, gfx.height, gfx.top, gfx.left]);
			put_u16(&mut data, gfx.data.len() as u16);
			data.extend_from_slice(&gfx.data);
		}

		put_u32(&mut data, self.palettes.len() as u32);
		for palette in &self.palettes {
			put_u16(&mut data, palette.len() as u16);
			data.extend_from_slice(palette);
		}

		put_u32(&mut data, self.backgrounds.len() as u32);
		for background in &self.backgrounds {
			put_u32(&mut data, background.default_palette.unwrap_or(NO_DEFAULT_PALETTE));
			data.push(background.size.class().unwrap_or_default());
			for cell in 0..background.size.cells() {
				let tile_ref = background.refs.get(cell).map_or(0, |r| r.to_u32());
				put_u32(&mut data, tile_ref);
			}
		}

		put_u32(&mut data, self.objects.len() as u32);
		for object in &self.objects {
			data.push(object.weight);
			put_u32(&mut data, object.animations.len() as u32);
			for animation in &object.animations {
				put_u16(&mut data, animation.frames.len() as u16);
				for frame in &animation.frames {
					put_u32(&mut data, frame.graphics_id);
					put_u32(&mut data, frame.palette_id);
					data.push(frame.duration);
				}
			}
		}

		put_u32(&mut data, self.levels.len() as u32);
		for level in &self.levels {
			data.extend_from_slice(&level.to_bytes());
		}

		data
	}

	/// Writes the container to the given writer
	pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), ContainerError> {
		writer.write_all(&self.to_bytes())?;
		Ok(())
	}

	/// Writes the container to a file
	pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ContainerError> {
		std::fs::write(path, self.to_bytes())?;
		Ok(())
	}
}

fn check_len(len: usize, what: &str) -> Result<(), ContainerError> {
	if len > u16::MAX as usize {
		return Err(ContainerError::malformed(
			0,
			format!("{what} payload of {len} bytes exceeds the {} byte limit", u16::MAX),
		));
	}
	Ok(())
}

fn put_u16(data: &mut Vec<u8>, value: u16) {
	data.extend_from_slice(&value.to_le_bytes());
}

fn put_u32(data: &mut Vec<u8>, value: u32) {
	data.extend_from_slice(&value.to_le_bytes());
}
