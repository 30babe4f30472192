//! Transfer and palette hardware interface.
//!
//! Bulk copies into video memory are fire-and-forget: [`VideoBus::copy_async`]
//! returns before the data lands and hands back a [`TransferToken`] that can be
//! polled. Nothing waits on it unless the caller asks to.

use std::cell::Cell;
use std::rc::Rc;

use log::{trace, warn};

/// Pollable completion flag of an asynchronous transfer
#[derive(Debug, Clone, Default)]
pub struct TransferToken(Rc<Cell<bool>>);

impl TransferToken {
	/// Creates a token for a transfer that has not completed yet
	pub fn pending() -> Self {
		Self::default()
	}

	/// Creates a token for a transfer that already completed
	pub fn completed() -> Self {
		let token = Self::default();
		token.complete();
		token
	}

	/// Marks the transfer as complete; called by the bus
	pub fn complete(&self) {
		self.0.set(true);
	}

	/// Whether the transfer has landed in video memory
	pub fn is_complete(&self) -> bool {
		self.0.get()
	}
}

/// Hardware collaborator performing video memory and palette writes
pub trait VideoBus {
	/// Copies `src` to video memory at byte offset `dst`, completing before returning
	fn copy(&mut self, dst: usize, src: &[u8]);

	/// Starts a copy of `src` to video memory at byte offset `dst` without waiting
	fn copy_async(&mut self, dst: usize, src: &[u8]) -> TransferToken;

	/// Writes palette data into hardware palette slot `slot`
	fn write_palette(&mut self, slot: usize, data: &[u8]);

	/// Frame boundary; transfers issued before this call complete
	fn poll(&mut self);

	/// Blocks until every issued transfer has completed
	fn flush(&mut self) {
		self.poll();
	}

	/// Number of transfers not yet completed
	fn pending(&self) -> usize;
}

#[derive(Debug)]
struct PendingCopy {
	dst: usize,
	data: Vec<u8>,
	token: TransferToken,
}

/// In-memory emulation of sprite memory and palette RAM.
///
/// Asynchronous copies are queued and only land on the next [`VideoBus::poll`],
/// the way a DMA channel finishes during the following blank period.
#[derive(Debug)]
pub struct SoftVideoBus {
	vram: Vec<u8>,
	palette_ram: Vec<u8>,
	slot_bytes: usize,
	queue: Vec<PendingCopy>,
	copies: usize,
	bytes_copied: usize,
}

impl SoftVideoBus {
	/// Creates a bus with `vram_bytes` of video memory and `slots` palette slots of `slot_bytes`
	pub fn new(vram_bytes: usize, slots: usize, slot_bytes: usize) -> Self {
		Self {
			vram: vec![0; vram_bytes],
			palette_ram: vec![0; slots * slot_bytes],
			slot_bytes,
			queue: Vec::new(),
			copies: 0,
			bytes_copied: 0,
		}
	}

	/// Video memory contents
	pub fn vram(&self) -> &[u8] {
		&self.vram
	}

	/// Contents of one palette slot, `None` past the end of palette RAM
	pub fn palette(&self, slot: usize) -> Option<&[u8]> {
		let start = slot * self.slot_bytes;
		self.palette_ram.get(start..start + self.slot_bytes)
	}

	/// Number of copies issued, synchronous and asynchronous
	pub fn copies_issued(&self) -> usize {
		self.copies
	}

	/// Bytes written to video memory so far
	pub fn bytes_copied(&self) -> usize {
		self.bytes_copied
	}

	fn write(&mut self, dst: usize, src: &[u8]) {
		let end = (dst + src.len()).min(self.vram.len());
		if end < dst + src.len() {
			warn!("Copy to 0x{dst:06X} of {} bytes runs past video memory, truncated", src.len());
		}
		if dst < end {
			self.vram[dst..end].copy_from_slice(&src[..end - dst]);
			self.bytes_copied += end - dst;
		}
	}
}

impl VideoBus for SoftVideoBus {
	fn copy(&mut self, dst: usize, src: &[u8]) {
		self.copies += 1;
		self.write(dst, src);
	}

	fn copy_async(&mut self, dst: usize, src: &[u8]) -> TransferToken {
		self.copies += 1;
		let token = TransferToken::pending();
		self.queue.push(PendingCopy {
			dst,
			data: src.to_vec(),
			token: token.clone(),
		});
		trace!("Queued {} byte transfer to 0x{dst:06X}", src.len());
		token
	}

	fn write_palette(&mut self, slot: usize, data: &[u8]) {
		let start = slot * self.slot_bytes;
		let Some(target) = self.palette_ram.get_mut(start..start + self.slot_bytes) else {
			warn!("Palette slot {slot} is outside palette RAM, write dropped");
			return;
		};
		let len = data.len().min(target.len());
		if len < data.len() {
			warn!("Palette of {} bytes truncated to the {} byte slot", data.len(), target.len());
		}
		target[..len].copy_from_slice(&data[..len]);
	}

	fn poll(&mut self) {
		for copy in std::mem::take(&mut self.queue) {
			self.write(copy.dst, &copy.data);
			copy.token.complete();
		}
	}

	fn pending(&self) -> usize {
		self.queue.len()
	}
}
