//! Error types for container parsing and asset resolution.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Kind of asset stored in the container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
	/// Graphics tile sheet (sprite frame)
	Graphics,
	/// Palette
	Palette,
	/// Tiled background
	Background,
	/// Object / animation definition
	Object,
	/// Level placement data
	Level,
}

impl AssetKind {
	/// All kinds, in container section order
	pub const ALL: [AssetKind; 5] =
		[Self::Graphics, Self::Palette, Self::Background, Self::Object, Self::Level];

	/// Lowercase name of the kind
	pub const fn name(self) -> &'static str {
		match self {
			Self::Graphics => "graphics",
			Self::Palette => "palette",
			Self::Background => "background",
			Self::Object => "object",
			Self::Level => "level",
		}
	}
}

impl fmt::Display for AssetKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.pad(self.name())
	}
}

/// Errors that can occur when indexing the container or resolving assets from it
#[derive(Debug, Error)]
pub enum ContainerError {
	/// Open, seek or read failure against the container
	#[error("I/O failure: {0}")]
	Io(#[from] std::io::Error),

	/// Offset, length or count inconsistency in the container
	#[error("Malformed container at offset 0x{offset:08X}: {message}")]
	Malformed {
		/// Byte offset where the inconsistency was detected
		offset: u64,
		/// Description of the inconsistency
		message: String,
	},

	/// Container was written by an unsupported packer version
	#[error("Unsupported container version {found} (supported: {supported})")]
	UnsupportedVersion {
		/// Version found in the container
		found: u16,
		/// Version this reader understands
		supported: u16,
	},

	/// Caller passed an id that is not present in the catalog
	#[error("{kind} id {id} out of range (catalog has {count})")]
	OutOfRange {
		/// Kind of the requested asset
		kind: AssetKind,
		/// Requested id
		id: usize,
		/// Number of assets of this kind in the catalog
		count: usize,
	},

	/// A background references more distinct tiles than the 10-bit map index can address
	#[error("Background uses more than {limit} distinct tiles")]
	TooManyTiles {
		/// Maximum number of distinct tiles per background
		limit: usize,
	},

	/// A background references more distinct palettes than the 4-bit map slot can address
	#[error("Background uses more than {limit} distinct palettes")]
	TooManyPalettes {
		/// Maximum number of distinct palettes per background
		limit: usize,
	},

	/// A tile omits its palette and the background declares no default
	#[error("Cell {cell} omits its palette and no default palette is declared")]
	MissingPalette {
		/// Row-major cell index
		cell: usize,
	},
}

impl ContainerError {
	/// Creates a [`ContainerError::Malformed`] error
	pub fn malformed(offset: u64, message: impl Into<String>) -> Self {
		Self::Malformed {
			offset,
			message: message.into(),
		}
	}

	/// Creates a [`ContainerError::OutOfRange`] error
	pub fn out_of_range(kind: AssetKind, id: usize, count: usize) -> Self {
		Self::OutOfRange {
			kind,
			id,
			count,
		}
	}

	/// Whether the error indicates a broken asset build rather than a caller mistake.
	///
	/// Fatal errors have no recovery path: the container is a required, trusted artifact.
	pub fn is_fatal(&self) -> bool {
		!matches!(self, Self::OutOfRange { .. })
	}
}
