//! Error types for the cache tiers.

use thiserror::Error;

use tessera_types::file::ContainerError;

/// Errors that can occur while loading or caching assets
#[derive(Debug, Error)]
pub enum CacheError {
	/// Container read or format failure
	#[error(transparent)]
	Container(#[from] ContainerError),

	/// The video memory pool has no free region large enough
	#[error("Video memory exhausted: {requested} tiles requested, {free} of {capacity} free")]
	VideoMemoryExhausted {
		/// Tiles requested
		requested: usize,
		/// Tiles currently free (possibly fragmented)
		free: usize,
		/// Total tiles in the pool
		capacity: usize,
	},

	/// Every palette slot of the session has been handed out
	#[error("All {capacity} palette slots have been assigned")]
	PaletteSlotsExhausted {
		/// Number of slots in the palette table
		capacity: usize,
	},

	/// Loading a payload would exceed the main-memory budget
	#[error("Main memory budget exceeded: loading {requested} bytes with {used} of {budget} in use")]
	MainMemoryBudget {
		/// Bytes the load needs
		requested: usize,
		/// Bytes already resident
		used: usize,
		/// Configured budget
		budget: usize,
	},

	/// Configuration could not be loaded
	#[error("Configuration error: {0}")]
	Config(#[from] config::ConfigError),
}

impl CacheError {
	/// Whether the error indicates a broken asset build or setup with no recovery path
	pub fn is_fatal(&self) -> bool {
		match self {
			Self::Container(e) => e.is_fatal(),
			Self::Config(_) => true,
			Self::VideoMemoryExhausted {
				..
			} |
			Self::PaletteSlotsExhausted {
				..
			} |
			Self::MainMemoryBudget {
				..
			} => false,
		}
	}
}
