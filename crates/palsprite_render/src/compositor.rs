//! Cell-grid compositing into one indexed bitmap.
//!
//! A logical frame may be a `cell_x × cell_y` grid of raw frames, stored
//! row-major starting at the logical frame id. Cells of a grid row are placed
//! left to right. Each grid row starts below the previous one, at the height
//! of that row's first cell.

use log::trace;
use palsprite_types::sprite::SequenceProvider;

/// A rectangular buffer of palette indices.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IndexedBitmap {
	width: u32,
	height: u32,
	pixels: Vec<u8>,
}

impl IndexedBitmap {
	/// A bitmap filled with index 0.
	pub fn new(width: u32, height: u32) -> Self {
		Self {
			width,
			height,
			pixels: vec![0; width as usize * height as usize],
		}
	}

	/// Width in pixels.
	#[inline]
	pub fn width(&self) -> u32 {
		self.width
	}

	/// Height in pixels.
	#[inline]
	pub fn height(&self) -> u32 {
		self.height
	}

	/// Row-major indices.
	#[inline]
	pub fn pixels(&self) -> &[u8] {
		&self.pixels
	}

	/// Consumes the bitmap and returns its indices.
	pub fn into_pixels(self) -> Vec<u8> {
		self.pixels
	}

	/// Returns `true` if either side is zero.
	pub fn is_empty(&self) -> bool {
		self.pixels.is_empty()
	}

	/// Index at `(x, y)`, if inside.
	pub fn get(&self, x: u32, y: u32) -> Option<u8> {
		if x >= self.width || y >= self.height {
			return None;
		}
		self.pixels.get((y * self.width + x) as usize).copied()
	}

	/// Writes `index` at `(x, y)`. Writes outside the bitmap are dropped.
	pub fn set(&mut self, x: u32, y: u32, index: u8) {
		if x < self.width && y < self.height {
			self.pixels[(y * self.width + x) as usize] = index;
		}
	}
}

/// Builds the bitmap of logical frame `frame` of `sequence`.
///
/// The result is `frame_width(sequence, frame, cell_x)` by
/// `frame_height(sequence, frame, cell_x, cell_y)`. Cells that overhang the
/// bitmap are clipped.
pub fn build_frame<P: SequenceProvider + ?Sized>(
	provider: &P,
	sequence: usize,
	frame: usize,
	cell_x: usize,
	cell_y: usize,
) -> IndexedBitmap {
	let width = provider.frame_width(sequence, frame, cell_x);
	let height = provider.frame_height(sequence, frame, cell_x, cell_y);
	let mut bitmap = IndexedBitmap::new(width, height);
	if bitmap.is_empty() {
		return bitmap;
	}

	let count = provider.frame_count(sequence);
	let mut target_y = 0u32;
	for row in 0..cell_y {
		let Some(row_start) = row.checked_mul(cell_x).and_then(|step| frame.checked_add(step)) else {
			break;
		};
		if row_start >= count {
			break;
		}
		let mut target_x = 0u32;
		for cell in row_start..row_start.saturating_add(cell_x).min(count) {
			let cell_width = provider.frame_width(sequence, cell, 1);
			let cell_height = provider.frame_height(sequence, cell, 1, 1);
			for y in 0..cell_height {
				for x in 0..cell_width {
					let index = provider.color_index_at(sequence, cell, x, y);
					bitmap.set(target_x + x, target_y + y, index);
				}
			}
			target_x = target_x.saturating_add(cell_width);
		}
		target_y = target_y.saturating_add(provider.frame_height(sequence, row_start, 1, 1));
	}

	trace!("composited sequence {sequence} frame {frame} ({cell_x}x{cell_y} cells) into {width}x{height}");
	bitmap
}
