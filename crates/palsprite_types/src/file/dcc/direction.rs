//! DCC direction blocks.
//!
//! A direction is one LSB-first bitstream holding every frame header of the
//! direction followed by five interleaved sub-streams. Pixels are coded per
//! 4×4 cell of the direction's bounding box: each cell either repeats the
//! previous frame's cell, or carries up to four palette values and a 1 or 2
//! bit index per pixel.

use log::trace;

use crate::file::reader::BitReader;
use crate::file::{FileError, FileType};

use super::constants;

/// Bit widths addressed by the 4-bit field codes of a direction header.
pub const BIT_WIDTH_TABLE: [u32; 16] = [0, 1, 2, 4, 6, 8, 10, 12, 14, 16, 20, 24, 26, 28, 30, 32];

/// Number of pixel values stored for each 4-bit cell mask.
const PIXEL_MASK_LOOKUP: [usize; 16] = [0, 1, 1, 2, 1, 2, 2, 3, 1, 2, 2, 3, 2, 3, 3, 4];

/// Side length of a direction grid cell.
const CELL_SIZE: i32 = 4;

/// Axis-aligned rectangle in sprite space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
	/// Left edge
	pub left: i32,
	/// Top edge
	pub top: i32,
	/// Width in pixels
	pub width: i32,
	/// Height in pixels
	pub height: i32,
}

impl Rect {
	/// Exclusive right edge.
	#[inline]
	pub fn right(&self) -> i32 {
		self.left + self.width
	}

	/// Exclusive bottom edge.
	#[inline]
	pub fn bottom(&self) -> i32 {
		self.top + self.height
	}

	/// Smallest rectangle containing all of `rects`.
	pub fn bounding<'a>(rects: impl IntoIterator<Item = &'a Rect>) -> Self {
		let mut iter = rects.into_iter();
		let Some(first) = iter.next() else {
			return Self::default();
		};
		let (mut left, mut top, mut right, mut bottom) =
			(first.left, first.top, first.right(), first.bottom());
		for rect in iter {
			left = left.min(rect.left);
			top = top.min(rect.top);
			right = right.max(rect.right());
			bottom = bottom.max(rect.bottom());
		}
		Self {
			left,
			top,
			width: right - left,
			height: bottom - top,
		}
	}
}

/// Field widths declared at the start of a direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectionHeader {
	/// Declared decoded size
	pub out_size_coded: u32,
	/// Bit 1: equal-cells stream present. Bit 0: encoding-type and raw-pixel streams present.
	pub compression_flags: u32,
	/// Bits of the unused per-frame `variable0` field
	pub variable0_bits: u32,
	/// Bits of each frame width
	pub width_bits: u32,
	/// Bits of each frame height
	pub height_bits: u32,
	/// Bits of each signed frame x offset
	pub x_offset_bits: u32,
	/// Bits of each signed frame y offset
	pub y_offset_bits: u32,
	/// Bits of each optional-bytes count
	pub optional_bytes_bits: u32,
	/// Bits of each coded-bytes count
	pub coded_bytes_bits: u32,
}

/// Per-frame header of a DCC direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameHeader {
	/// Unused
	pub variable0: u32,
	/// Frame width
	pub width: u32,
	/// Frame height
	pub height: u32,
	/// Left edge
	pub x_offset: i32,
	/// Bottom edge (inclusive)
	pub y_offset: i32,
	/// Optional trailing bytes
	pub optional_bytes: u32,
	/// Coded byte count
	pub coded_bytes: u32,
	/// Bottom-up storage flag
	pub bottom_up: bool,
}

impl FrameHeader {
	/// Frame rectangle; `y_offset` names the bottom row.
	pub fn bounds(&self) -> Rect {
		Rect {
			left: self.x_offset,
			top: self.y_offset - self.height as i32 + 1,
			width: self.width as i32,
			height: self.height as i32,
		}
	}
}

/// A fully decoded direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Direction {
	header: DirectionHeader,
	frame_headers: Vec<FrameHeader>,
	bounds: Rect,
	palette_entries: Vec<u8>,
	frames: Vec<Vec<u8>>,
}

#[derive(Debug, Clone, Copy)]
struct Cell {
	x: usize,
	y: usize,
	width: usize,
	height: usize,
}

#[derive(Debug, Clone)]
struct FrameCells {
	columns: usize,
	rows: usize,
	cells: Vec<Cell>,
}

#[derive(Debug, Clone, Copy)]
struct PixelBufferEntry {
	values: [u8; 4],
	frame: usize,
	frame_cell: usize,
}

/// Size and placement a direction grid cell had the last time it was drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LastCell {
	width: usize,
	height: usize,
	x: usize,
	y: usize,
}

/// The sub-streams following the palette entry set.
#[derive(Debug, Clone)]
struct Streams<'a> {
	equal_cells: Option<BitReader<'a>>,
	pixel_mask: BitReader<'a>,
	encoding_type: Option<BitReader<'a>>,
	raw_pixels: BitReader<'a>,
	pixel_codes: BitReader<'a>,
}

impl Direction {
	/// Decodes the direction starting at byte `offset` of `data`.
	///
	/// # Errors
	///
	/// Returns `CorruptData` when the bitstream ends early, a frame uses
	/// bottom-up storage or optional data, or the frame geometry is invalid.
	pub fn decode(data: &[u8], offset: usize, frame_count: usize) -> Result<Self, FileError> {
		let mut bits = BitReader::at_byte(data, offset, FileType::Dcc)?;

		let out_size_coded = bits.read_bits(32)?;
		let compression_flags = bits.read_bits(2)?;
		let mut width_code = || -> Result<u32, FileError> {
			Ok(BIT_WIDTH_TABLE[bits.read_bits(4)? as usize])
		};
		let header = DirectionHeader {
			out_size_coded,
			compression_flags,
			variable0_bits: width_code()?,
			width_bits: width_code()?,
			height_bits: width_code()?,
			x_offset_bits: width_code()?,
			y_offset_bits: width_code()?,
			optional_bytes_bits: width_code()?,
			coded_bytes_bits: width_code()?,
		};

		let mut frame_headers = Vec::with_capacity(frame_count.min(256));
		for index in 0..frame_count {
			let frame = FrameHeader {
				variable0: bits.read_bits(header.variable0_bits)?,
				width: bits.read_bits(header.width_bits)?,
				height: bits.read_bits(header.height_bits)?,
				x_offset: bits.read_signed(header.x_offset_bits)?,
				y_offset: bits.read_signed(header.y_offset_bits)?,
				optional_bytes: bits.read_bits(header.optional_bytes_bits)?,
				coded_bytes: bits.read_bits(header.coded_bytes_bits)?,
				bottom_up: bits.read_bit()? == 1,
			};
			if frame.bottom_up {
				return Err(FileError::corrupt(FileType::Dcc, format!("frame {index} is stored bottom-up")));
			}
			if frame.width > constants::MAX_DIMENSION || frame.height > constants::MAX_DIMENSION {
				return Err(FileError::corrupt(
					FileType::Dcc,
					format!("frame {index} size {}x{} exceeds the format limit", frame.width, frame.height),
				));
			}
			frame_headers.push(frame);
		}

		if header.optional_bytes_bits > 0 {
			return Err(FileError::corrupt(FileType::Dcc, "optional frame data is not supported"));
		}

		let frame_bounds: Vec<Rect> = frame_headers.iter().map(FrameHeader::bounds).collect();
		let bounds = Rect::bounding(&frame_bounds);
		if bounds.width as i64 > constants::MAX_DIMENSION as i64
			|| bounds.height as i64 > constants::MAX_DIMENSION as i64
		{
			return Err(FileError::corrupt(
				FileType::Dcc,
				format!("direction box {}x{} exceeds the format limit", bounds.width, bounds.height),
			));
		}

		let equal_cells_size = if compression_flags & 0x2 != 0 {
			bits.read_bits(20)? as usize
		} else {
			0
		};
		let pixel_mask_size = bits.read_bits(20)? as usize;
		let (encoding_type_size, raw_pixels_size) = if compression_flags & 0x1 != 0 {
			(bits.read_bits(20)? as usize, bits.read_bits(20)? as usize)
		} else {
			(0, 0)
		};

		let mut palette_entries = Vec::new();
		for index in 0..=255u8 {
			if bits.read_bit()? == 1 {
				palette_entries.push(index);
			}
		}

		// Sub-streams start at bit granularity, right after each other.
		let equal_cells = bits.clone();
		bits.skip(equal_cells_size)?;
		let pixel_mask = bits.clone();
		bits.skip(pixel_mask_size)?;
		let encoding_type = bits.clone();
		bits.skip(encoding_type_size)?;
		let raw_pixels = bits.clone();
		bits.skip(raw_pixels_size)?;

		let mut streams = Streams {
			equal_cells: (equal_cells_size > 0).then_some(equal_cells),
			pixel_mask,
			encoding_type: (encoding_type_size > 0).then_some(encoding_type),
			raw_pixels,
			pixel_codes: bits,
		};

		let grid = Grid::new(bounds);
		let frame_cells: Vec<FrameCells> =
			frame_bounds.iter().map(|frame| FrameCells::new(frame, &bounds)).collect();
		for cells in &frame_cells {
			grid.check(cells)?;
		}

		let palette = expand_palette_entries(&palette_entries);
		let pixel_buffer = fill_pixel_buffer(&grid, &frame_bounds, &bounds, &frame_cells, &mut streams, &palette)?;
		let frames = generate_frames(&grid, &frame_cells, &pixel_buffer, &mut streams.pixel_codes)?;

		trace!(
			"decoded DCC direction: {} frames, box {}x{} at ({}, {}), {} palette entries",
			frames.len(),
			bounds.width,
			bounds.height,
			bounds.left,
			bounds.top,
			palette_entries.len()
		);

		Ok(Self {
			header,
			frame_headers,
			bounds,
			palette_entries,
			frames,
		})
	}

	/// Field widths of the direction.
	#[inline]
	pub fn header(&self) -> &DirectionHeader {
		&self.header
	}

	/// Per-frame headers as stored.
	#[inline]
	pub fn frame_headers(&self) -> &[FrameHeader] {
		&self.frame_headers
	}

	/// Bounding box of every frame in the direction.
	#[inline]
	pub fn bounds(&self) -> Rect {
		self.bounds
	}

	/// Palette indices used by the direction, ascending.
	#[inline]
	pub fn palette_entries(&self) -> &[u8] {
		&self.palette_entries
	}

	/// Number of frames.
	#[inline]
	pub fn frame_count(&self) -> usize {
		self.frames.len()
	}

	/// Decoded frame pixels, each `bounds().width * bounds().height` bytes.
	#[inline]
	pub fn frames(&self) -> &[Vec<u8>] {
		&self.frames
	}

	/// Consumes the direction and returns its frame pixels.
	pub fn into_frames(self) -> Vec<Vec<u8>> {
		self.frames
	}
}

/// 4×4 grid over the direction box, with the last placement of each cell.
#[derive(Debug, Clone)]
struct Grid {
	columns: usize,
	rows: usize,
	width: usize,
	height: usize,
}

impl Grid {
	fn new(bounds: Rect) -> Self {
		let width = bounds.width.max(0) as usize;
		let height = bounds.height.max(0) as usize;
		Self {
			columns: 1 + width.saturating_sub(1) / CELL_SIZE as usize,
			rows: 1 + height.saturating_sub(1) / CELL_SIZE as usize,
			width,
			height,
		}
	}

	#[inline]
	fn len(&self) -> usize {
		self.columns * self.rows
	}

	#[inline]
	fn index_of(&self, cell: &Cell) -> usize {
		cell.x / CELL_SIZE as usize + (cell.y / CELL_SIZE as usize) * self.columns
	}

	/// Rejects frame cells that would land outside the direction box.
	fn check(&self, frame: &FrameCells) -> Result<(), FileError> {
		for cell in &frame.cells {
			if cell.x + cell.width > self.width
				|| cell.y + cell.height > self.height
				|| self.index_of(cell) >= self.len()
			{
				return Err(FileError::corrupt(FileType::Dcc, "frame cell outside direction box"));
			}
		}
		Ok(())
	}
}

/// Splits one axis of a frame into cell lengths. The first cell ends on the
/// direction grid; a trailing sliver of one pixel is merged into its neighbour.
fn split_axis(start: i32, length: i32) -> Vec<usize> {
	let first = CELL_SIZE - start.rem_euclid(CELL_SIZE);
	if length - first <= 1 {
		return vec![length.max(0) as usize];
	}

	let rest = length - first - 1;
	let mut count = 2 + rest / CELL_SIZE;
	if rest % CELL_SIZE == 0 {
		count -= 1;
	}

	let mut sizes = Vec::with_capacity(count as usize);
	sizes.push(first as usize);
	sizes.extend(std::iter::repeat_n(CELL_SIZE as usize, (count - 2) as usize));
	sizes.push((length - first - CELL_SIZE * (count - 2)) as usize);
	sizes
}

impl FrameCells {
	fn new(frame: &Rect, direction: &Rect) -> Self {
		let start_x = frame.left - direction.left;
		let start_y = frame.top - direction.top;
		let widths = split_axis(start_x, frame.width);
		let heights = split_axis(start_y, frame.height);

		let mut cells = Vec::with_capacity(widths.len() * heights.len());
		let mut y = start_y.max(0) as usize;
		for &height in &heights {
			let mut x = start_x.max(0) as usize;
			for &width in &widths {
				cells.push(Cell {
					x,
					y,
					width,
					height,
				});
				x += width;
			}
			y += height;
		}

		Self {
			columns: widths.len(),
			rows: heights.len(),
			cells,
		}
	}
}

/// Maps stored value indices to real palette indices; unused slots stay 0.
fn expand_palette_entries(entries: &[u8]) -> [u8; 256] {
	let mut out = [0u8; 256];
	out[..entries.len()].copy_from_slice(entries);
	out
}

fn fill_pixel_buffer(
	grid: &Grid,
	frame_bounds: &[Rect],
	bounds: &Rect,
	frame_cells: &[FrameCells],
	streams: &mut Streams<'_>,
	palette: &[u8; 256],
) -> Result<Vec<PixelBufferEntry>, FileError> {
	let mut pixel_buffer: Vec<PixelBufferEntry> = Vec::new();
	let mut cell_buffer: Vec<Option<usize>> = vec![None; grid.len()];

	for (frame_index, (frame, cells)) in frame_bounds.iter().zip(frame_cells).enumerate() {
		let origin_x = ((frame.left - bounds.left) / CELL_SIZE) as usize;
		let origin_y = ((frame.top - bounds.top) / CELL_SIZE) as usize;

		for cell_y in 0..cells.rows {
			for cell_x in 0..cells.columns {
				let current = origin_x + cell_x + (origin_y + cell_y) * grid.columns;
				let Some(&previous) = cell_buffer.get(current) else {
					return Err(FileError::corrupt(FileType::Dcc, "cell outside direction grid"));
				};

				let mask = match previous {
					Some(_) => {
						let same = match streams.equal_cells.as_mut() {
							Some(stream) => stream.read_bit()? == 1,
							None => false,
						};
						if same {
							continue;
						}
						streams.pixel_mask.read_bits(4)?
					}
					None => 0x0F,
				};

				let pixel_count = PIXEL_MASK_LOOKUP[mask as usize];
				let raw = match streams.encoding_type.as_mut() {
					Some(stream) if pixel_count > 0 => stream.read_bit()? == 1,
					_ => false,
				};

				let mut stack = [0u32; 4];
				let mut last = 0u32;
				let mut decoded = 0usize;
				for slot in stack.iter_mut().take(pixel_count) {
					let value = if raw {
						streams.raw_pixels.read_bits(8)?
					} else {
						let mut value = last;
						loop {
							let displacement = streams.pixel_codes.read_bits(4)?;
							value = value.wrapping_add(displacement);
							if displacement != 15 {
								break;
							}
						}
						value
					};

					if value == last {
						break;
					}
					*slot = value;
					last = value;
					decoded += 1;
				}

				let old = previous.map_or([0u8; 4], |index| pixel_buffer[index].values);
				let mut values = [0u8; 4];
				let mut remaining = decoded;
				for (bit, value) in values.iter_mut().enumerate() {
					*value = if mask & (1 << bit) != 0 {
						if remaining > 0 {
							remaining -= 1;
							stack[remaining] as u8
						} else {
							0
						}
					} else {
						old[bit]
					};
				}

				pixel_buffer.push(PixelBufferEntry {
					values,
					frame: frame_index,
					frame_cell: cell_x + cell_y * cells.columns,
				});
				cell_buffer[current] = Some(pixel_buffer.len() - 1);
			}
		}
	}

	// Entries hold indices into the used-palette list until here.
	for entry in &mut pixel_buffer {
		for value in &mut entry.values {
			*value = palette[*value as usize];
		}
	}

	Ok(pixel_buffer)
}

fn generate_frames(
	grid: &Grid,
	frame_cells: &[FrameCells],
	pixel_buffer: &[PixelBufferEntry],
	pixel_codes: &mut BitReader<'_>,
) -> Result<Vec<Vec<u8>>, FileError> {
	let stride = grid.width;
	let mut canvas = vec![0u8; grid.width * grid.height];
	let mut last_cells: Vec<Option<LastCell>> = vec![None; grid.len()];
	let mut frames = Vec::with_capacity(frame_cells.len());
	let mut buffer_index = 0usize;

	for (frame_index, cells) in frame_cells.iter().enumerate() {
		let mut pixels = vec![0u8; grid.width * grid.height];

		for (cell_index, cell) in cells.cells.iter().enumerate() {
			let grid_index = grid.index_of(cell);
			let entry = pixel_buffer
				.get(buffer_index)
				.filter(|entry| entry.frame == frame_index && entry.frame_cell == cell_index);

			match entry {
				None => match last_cells[grid_index] {
					Some(last) if last.width == cell.width && last.height == cell.height => {
						for y in 0..cell.height {
							for x in 0..cell.width {
								let from = last.x + x + (last.y + y) * stride;
								let to = cell.x + x + (cell.y + y) * stride;
								canvas[to] = canvas[from];
								pixels[to] = canvas[to];
							}
						}
					}
					_ => {
						for y in 0..cell.height {
							let row = cell.x + (cell.y + y) * stride;
							canvas[row..row + cell.width].fill(0);
						}
					}
				},
				Some(entry) => {
					if entry.values[0] == entry.values[1] {
						for y in 0..cell.height {
							let row = cell.x + (cell.y + y) * stride;
							canvas[row..row + cell.width].fill(entry.values[0]);
						}
					} else {
						let bits = if entry.values[1] == entry.values[2] {
							1
						} else {
							2
						};
						for y in 0..cell.height {
							for x in 0..cell.width {
								let index = pixel_codes.read_bits(bits)? as usize;
								canvas[cell.x + x + (cell.y + y) * stride] = entry.values[index];
							}
						}
					}

					for y in 0..cell.height {
						let row = cell.x + (cell.y + y) * stride;
						pixels[row..row + cell.width].copy_from_slice(&canvas[row..row + cell.width]);
					}
					buffer_index += 1;
				}
			}

			last_cells[grid_index] = Some(LastCell {
				width: cell.width,
				height: cell.height,
				x: cell.x,
				y: cell.y,
			});
		}

		frames.push(pixels);
	}

	Ok(frames)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_split_axis() {
		assert_eq!(split_axis(0, 4), vec![4]);
		assert_eq!(split_axis(0, 5), vec![5]);
		assert_eq!(split_axis(0, 6), vec![4, 2]);
		assert_eq!(split_axis(2, 3), vec![3]);
		assert_eq!(split_axis(2, 9), vec![2, 4, 3]);
		assert_eq!(split_axis(1, 12), vec![3, 4, 5]);
		assert_eq!(split_axis(0, 10), vec![4, 4, 2]);
		assert_eq!(split_axis(0, 0), vec![0]);
	}

	#[test]
	fn test_bounding_rect() {
		let a = Rect {
			left: -2,
			top: -10,
			width: 4,
			height: 10,
		};
		let b = Rect {
			left: 1,
			top: -4,
			width: 6,
			height: 8,
		};
		let both = Rect::bounding([&a, &b]);
		assert_eq!(
			both,
			Rect {
				left: -2,
				top: -10,
				width: 9,
				height: 14,
			}
		);
		assert_eq!(Rect::bounding(&[]), Rect::default());
	}

	#[test]
	fn test_frame_bounds() {
		let header = FrameHeader {
			width: 4,
			height: 4,
			x_offset: -1,
			y_offset: 3,
			..FrameHeader::default()
		};
		assert_eq!(header.bounds().top, 0);
		assert_eq!(header.bounds().left, -1);
	}

	#[test]
	fn test_frame_cells_offsets() {
		let direction = Rect {
			left: 0,
			top: 0,
			width: 12,
			height: 8,
		};
		let frame = Rect {
			left: 1,
			top: 0,
			width: 11,
			height: 8,
		};
		let cells = FrameCells::new(&frame, &direction);
		assert_eq!(cells.columns, 3);
		assert_eq!(cells.rows, 2);
		let xs: Vec<usize> = cells.cells.iter().take(3).map(|c| c.x).collect();
		assert_eq!(xs, vec![1, 4, 8]);
		assert_eq!(Grid::new(direction).len(), 6);
	}
}
