//! Random-access reader over the container file.
//!
//! Wraps any `Read + Seek` source and knows the total stream length, so that
//! seeking or skipping past the end is reported as a malformed container
//! instead of silently succeeding (plain `Seek` allows positions past EOF).

use std::fs;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use super::ContainerError;

/// Random-access little-endian reader used by the indexer and the loaders
#[derive(Debug)]
pub struct Reader<R> {
	inner: R,
	len: u64,
	pos: u64,
}

impl<R: Read + Seek> Reader<R> {
	/// Wraps a reader, measuring the stream length and rewinding to offset 0
	pub fn new(mut inner: R) -> Result<Self, ContainerError> {
		let len = inner.seek(SeekFrom::End(0))?;
		inner.seek(SeekFrom::Start(0))?;
		Ok(Self {
			inner,
			len,
			pos: 0,
		})
	}

	/// Total length of the underlying stream in bytes
	pub fn len(&self) -> u64 {
		self.len
	}

	/// Returns `true` if the underlying stream is empty
	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	/// Current byte position
	pub fn position(&self) -> u64 {
		self.pos
	}

	/// Bytes left between the current position and the end of the stream
	pub fn remaining(&self) -> u64 {
		self.len.saturating_sub(self.pos)
	}

	/// Seeks to an absolute position previously recorded by the indexer
	pub fn seek_to(&mut self, pos: u64) -> Result<(), ContainerError> {
		if pos > self.len {
			return Err(ContainerError::malformed(
				pos,
				format!("seek past end of container (length {})", self.len),
			));
		}
		self.inner.seek(SeekFrom::Start(pos))?;
		self.pos = pos;
		Ok(())
	}

	/// Skips `count` bytes of payload without reading them
	pub fn skip(&mut self, count: u64) -> Result<(), ContainerError> {
		let target = self.pos.checked_add(count).filter(|&end| end <= self.len).ok_or_else(|| {
			ContainerError::malformed(
				self.pos,
				format!(
					"declared length {count} runs past end of container ({} bytes left)",
					self.remaining()
				),
			)
		})?;
		self.seek_to(target)
	}

	/// Reads exactly `N` bytes
	fn read_array<const N: usize>(&mut self) -> Result<[u8; N], ContainerError> {
		let mut buffer = [0u8; N];
		self.inner.read_exact(&mut buffer)?;
		self.pos += N as u64;
		Ok(buffer)
	}

	/// Reads a `u8`
	pub fn read_u8(&mut self) -> Result<u8, ContainerError> {
		Ok(self.read_array::<1>()?[0])
	}

	/// Reads a little-endian `u16`
	pub fn read_u16(&mut self) -> Result<u16, ContainerError> {
		self.read_array().map(u16::from_le_bytes)
	}

	/// Reads a little-endian `i16`
	pub fn read_i16(&mut self) -> Result<i16, ContainerError> {
		self.read_array().map(i16::from_le_bytes)
	}

	/// Reads a little-endian `u32`
	pub fn read_u32(&mut self) -> Result<u32, ContainerError> {
		self.read_array().map(u32::from_le_bytes)
	}

	/// Reads exactly `len` bytes into a freshly allocated buffer.
	///
	/// A short read surfaces as [`ContainerError::Io`] with `UnexpectedEof`.
	pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>, ContainerError> {
		let mut buffer = vec![0u8; len];
		self.inner.read_exact(&mut buffer)?;
		self.pos += len as u64;
		Ok(buffer)
	}

	/// Consumes the reader, returning the wrapped source
	pub fn into_inner(self) -> R {
		self.inner
	}
}

impl Reader<BufReader<fs::File>> {
	/// Opens a container file from the given path
	pub fn open(path: impl AsRef<Path>) -> Result<Self, ContainerError> {
		let file = fs::File::open(path)?;
		Self::new(BufReader::new(file))
	}
}
