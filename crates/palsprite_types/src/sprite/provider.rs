//! Uniform queries over decoded sequences.
//!
//! Every query takes plain ids and answers with the zero value when an id is
//! out of range. Rendering code calls these mid-frame and must never abort on a
//! stale id. Builds with the `strict-bounds` feature and debug assertions
//! panic instead, to surface such ids during development.

use log::warn;

use super::{Frame, SpriteAsset};

#[inline]
fn out_of_range(query: &str, sequence: usize, frame: usize) {
	if cfg!(all(debug_assertions, feature = "strict-bounds")) {
		panic!("{query}: sequence {sequence} frame {frame} out of range");
	}
	warn!("{query}: sequence {sequence} frame {frame} out of range, answering 0");
}

/// Read access to a set of decoded sequences.
///
/// Implementors supply the three primitive lookups; the geometry queries are
/// derived from them.
pub trait SequenceProvider {
	/// Number of sequences.
	fn sequence_count(&self) -> usize;

	/// Number of raw frames in `sequence`, 0 for an unknown sequence.
	fn frame_count(&self, sequence: usize) -> usize;

	/// Raw frame lookup.
	fn frame(&self, sequence: usize, frame: usize) -> Option<&Frame>;

	/// Summed width of `cell_size_x` consecutive raw frames starting at `frame`.
	///
	/// Frames past the end of the sequence count as 0.
	fn frame_width(&self, sequence: usize, frame: usize, cell_size_x: usize) -> u32 {
		let count = self.frame_count(sequence);
		let end = frame.saturating_add(cell_size_x);
		if cell_size_x > 0 && end > count {
			out_of_range("frame_width", sequence, frame.max(count));
		}
		(frame..end.min(count))
			.filter_map(|id| self.frame(sequence, id))
			.fold(0u32, |width, f| width.saturating_add(f.width()))
	}

	/// Summed height of the raw frames at `frame + i * cell_size_x` for
	/// `i in 0..cell_size_y`.
	///
	/// Rows starting past the end of the sequence count as 0.
	fn frame_height(&self, sequence: usize, frame: usize, cell_size_x: usize, cell_size_y: usize) -> u32 {
		if cell_size_y == 0 {
			return 0;
		}
		let Some(first) = self.frame(sequence, frame) else {
			out_of_range("frame_height", sequence, frame);
			return 0;
		};
		if cell_size_x == 0 {
			let rows = u32::try_from(cell_size_y).unwrap_or(u32::MAX);
			return first.height().saturating_mul(rows);
		}

		let mut height = 0u32;
		for i in 0..cell_size_y {
			let id = i.checked_mul(cell_size_x).and_then(|step| frame.checked_add(step));
			match id.and_then(|id| self.frame(sequence, id)) {
				Some(f) => height = height.saturating_add(f.height()),
				None => {
					out_of_range("frame_height", sequence, id.unwrap_or(usize::MAX));
					break;
				}
			}
		}
		height
	}

	/// Palette index at `(x, y)` of a raw frame.
	fn color_index_at(&self, sequence: usize, frame: usize, x: u32, y: u32) -> u8 {
		match self.frame(sequence, frame) {
			Some(f) => f.color_index_at(x, y),
			None => {
				out_of_range("color_index_at", sequence, frame);
				0
			}
		}
	}

	/// Horizontal draw offset of a raw frame.
	fn frame_offset_x(&self, sequence: usize, frame: usize) -> i32 {
		match self.frame(sequence, frame) {
			Some(f) => f.offset_x(),
			None => {
				out_of_range("frame_offset_x", sequence, frame);
				0
			}
		}
	}

	/// Vertical draw offset of a raw frame.
	fn frame_offset_y(&self, sequence: usize, frame: usize) -> i32 {
		match self.frame(sequence, frame) {
			Some(f) => f.offset_y(),
			None => {
				out_of_range("frame_offset_y", sequence, frame);
				0
			}
		}
	}
}

impl SequenceProvider for SpriteAsset {
	#[inline]
	fn sequence_count(&self) -> usize {
		self.sequences.len()
	}

	#[inline]
	fn frame_count(&self, sequence: usize) -> usize {
		self.sequences.get(sequence).map_or(0, |s| s.len())
	}

	#[inline]
	fn frame(&self, sequence: usize, frame: usize) -> Option<&Frame> {
		self.sequences.get(sequence)?.frames().get(frame)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::sprite::{Sequence, SpriteFormat};

	fn frame(width: u32, height: u32, offset_x: i32) -> Frame {
		let pixels = (0..width * height).map(|i| (i % 200) as u8 + 1).collect();
		Frame::new(width, height, offset_x, -(height as i32), pixels).unwrap()
	}

	fn asset() -> SpriteAsset {
		let walk = Sequence::new(vec![frame(10, 20, 0), frame(12, 20, 1), frame(11, 20, 2), frame(13, 20, 3)]);
		let grid = Sequence::new(vec![frame(4, 3, 0), frame(5, 3, 0), frame(4, 6, 0), frame(5, 6, 0)]);
		SpriteAsset::new(SpriteFormat::Dc6, vec![walk, grid])
	}

	#[test]
	fn test_counts() {
		let asset = asset();
		assert_eq!(asset.sequence_count(), 2);
		assert_eq!(asset.frame_count(0), 4);
		assert_eq!(asset.frame_count(9), 0);
	}

	#[test]
	fn test_width_aggregation() {
		let asset = asset();
		assert_eq!(asset.frame_width(0, 0, 2), 22);
		for f in 0..4 {
			assert_eq!(asset.frame_width(0, f, 1), asset.frame(0, f).unwrap().width());
		}
		let summed: u32 = (0..3).map(|i| asset.frame_width(0, 1 + i, 1)).sum();
		assert_eq!(asset.frame_width(0, 1, 3), summed);
	}

	#[test]
	fn test_height_aggregation() {
		let asset = asset();
		// column 0 of a 2x2 grid: frames 0 and 2
		assert_eq!(asset.frame_height(1, 0, 2, 2), 9);
		assert_eq!(asset.frame_height(1, 1, 2, 2), 9);
		assert_eq!(asset.frame_height(1, 0, 1, 1), 3);
	}

	#[test_log::test]
	#[cfg(not(feature = "strict-bounds"))]
	fn test_out_of_range_is_zero() {
		let asset = asset();
		assert_eq!(asset.frame_width(5, 0, 1), 0);
		assert_eq!(asset.frame_width(0, 3, 2), 13);
		assert_eq!(asset.frame_height(0, 9, 1, 1), 0);
		assert_eq!(asset.color_index_at(0, 99, 0, 0), 0);
		assert_eq!(asset.color_index_at(0, 0, 100, 0), 0);
		assert_eq!(asset.frame_offset_x(3, 0), 0);
		assert_eq!(asset.frame_offset_y(0, 4), 0);
	}

	#[test_log::test]
	#[cfg(not(feature = "strict-bounds"))]
	fn test_id_arithmetic_saturates() {
		let asset = asset();
		assert_eq!(asset.frame_width(0, usize::MAX, 2), 0);
		assert_eq!(asset.frame_width(0, 2, usize::MAX), 24);
		assert_eq!(asset.frame_height(0, usize::MAX, 2, 2), 0);
		assert_eq!(asset.frame_height(1, 0, usize::MAX, 2), 3);
		assert_eq!(asset.frame_height(1, 1, 2, usize::MAX), 9);
		assert_eq!(asset.frame_height(0, 0, 0, 3), 60);
		assert_eq!(asset.color_index_at(0, usize::MAX, 0, 0), 0);
	}

	#[test]
	fn test_offsets_and_pixels() {
		let asset = asset();
		assert_eq!(asset.frame_offset_x(0, 3), 3);
		assert_eq!(asset.frame_offset_y(0, 0), -20);
		assert_eq!(asset.color_index_at(1, 0, 1, 1), 6);
	}
}
