//! Per-frame GPU texture slots of one sprite.

use log::{debug, trace};

use crate::backend::{GpuBackend, TextureHandle};
use crate::compositor::IndexedBitmap;
use crate::error::RenderError;

/// An uploaded frame bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Texture {
	/// Backend handle
	pub handle: TextureHandle,
	/// Width in pixels
	pub width: u32,
	/// Height in pixels
	pub height: u32,
}

/// Texture slots indexed by frame id.
///
/// Slots are only filled by [`get_or_build`](Self::get_or_build) and only
/// emptied by [`reset`](Self::reset), which releases every handle it drops.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextureCache {
	slots: Vec<Option<Texture>>,
}

impl TextureCache {
	/// A cache with `len` empty slots.
	pub fn new(len: usize) -> Self {
		Self {
			slots: vec![None; len],
		}
	}

	/// Number of slots.
	#[inline]
	pub fn len(&self) -> usize {
		self.slots.len()
	}

	/// Returns `true` if the cache has no slots.
	#[inline]
	pub fn is_empty(&self) -> bool {
		self.slots.is_empty()
	}

	/// Texture in slot `frame`.
	pub fn get(&self, frame: usize) -> Option<Texture> {
		self.slots.get(frame).copied().flatten()
	}

	/// Number of filled slots.
	pub fn occupied(&self) -> usize {
		self.slots.iter().filter(|slot| slot.is_some()).count()
	}

	/// Returns the texture of `frame`, building and uploading it on first use.
	///
	/// Returns `Ok(None)` if `frame` has no slot or the built bitmap is empty.
	///
	/// # Errors
	///
	/// Propagates upload failures; the slot stays empty.
	pub fn get_or_build(
		&mut self,
		frame: usize,
		backend: &mut dyn GpuBackend,
		build: impl FnOnce() -> IndexedBitmap,
	) -> Result<Option<Texture>, RenderError> {
		let Some(slot) = self.slots.get_mut(frame) else {
			return Ok(None);
		};
		if let Some(texture) = slot {
			return Ok(Some(*texture));
		}

		let bitmap = build();
		if bitmap.is_empty() {
			return Ok(None);
		}
		let handle = backend.upload_texture(bitmap.width(), bitmap.height(), bitmap.pixels())?;
		trace!("cached frame {frame} as {handle}");
		let texture = Texture {
			handle,
			width: bitmap.width(),
			height: bitmap.height(),
		};
		*slot = Some(texture);
		Ok(Some(texture))
	}

	/// Releases every texture and resizes to `len` empty slots. Returns the
	/// number of released handles.
	pub fn reset(&mut self, len: usize, backend: &mut dyn GpuBackend) -> usize {
		let released = self.release_all(backend);
		self.slots = vec![None; len];
		released
	}

	/// Releases every texture, keeping the slot count.
	pub fn release_all(&mut self, backend: &mut dyn GpuBackend) -> usize {
		let mut released = 0;
		for texture in self.slots.iter_mut().filter_map(Option::take) {
			backend.release_texture(texture.handle);
			released += 1;
		}
		if released > 0 {
			debug!("released {released} cached textures");
		}
		released
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::backend::HeadlessBackend;

	fn bitmap() -> IndexedBitmap {
		let mut bitmap = IndexedBitmap::new(2, 2);
		bitmap.set(1, 1, 7);
		bitmap
	}

	#[test]
	fn test_builds_once() {
		let mut backend = HeadlessBackend::new();
		let mut cache = TextureCache::new(3);
		let mut builds = 0;
		for _ in 0..3 {
			cache
				.get_or_build(1, &mut backend, || {
					builds += 1;
					bitmap()
				})
				.unwrap();
		}
		assert_eq!(builds, 1);
		assert_eq!(backend.upload_count(), 1);
		assert_eq!(cache.occupied(), 1);
		let texture = cache.get(1).unwrap();
		assert_eq!(backend.texture(texture.handle).unwrap().bytes, vec![0, 0, 0, 7]);
	}

	#[test]
	fn test_out_of_range_and_empty() {
		let mut backend = HeadlessBackend::new();
		let mut cache = TextureCache::new(1);
		assert_eq!(cache.get_or_build(5, &mut backend, bitmap).unwrap(), None);
		assert_eq!(cache.get_or_build(0, &mut backend, IndexedBitmap::default).unwrap(), None);
		assert_eq!(backend.upload_count(), 0);
	}

	#[test]
	fn test_reset_releases_everything() {
		let mut backend = HeadlessBackend::new();
		let mut cache = TextureCache::new(4);
		for frame in [0, 2, 3] {
			cache.get_or_build(frame, &mut backend, bitmap).unwrap();
		}
		assert_eq!(cache.reset(2, &mut backend), 3);
		assert_eq!(backend.release_count(), 3);
		assert_eq!(backend.live_textures(), 0);
		assert_eq!(cache.len(), 2);
		assert_eq!(cache.occupied(), 0);
	}

	#[test]
	fn test_upload_failure_leaves_slot_empty() {
		let mut backend = HeadlessBackend::with_texture_budget(0);
		let mut cache = TextureCache::new(1);
		assert!(cache.get_or_build(0, &mut backend, bitmap).is_err());
		assert_eq!(cache.get(0), None);
	}
}
