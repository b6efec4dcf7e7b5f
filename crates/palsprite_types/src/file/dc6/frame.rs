//! DC6 frame blocks and the scanline RLE codec.

use std::fmt;

use crate::file::{FileError, FileType};

use super::constants;

/// A decoded DC6 frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
	/// Non-zero when scanlines are stored top-down
	pub flipped: u32,
	/// Frame width in pixels
	pub width: u32,
	/// Frame height in pixels
	pub height: u32,
	/// Horizontal draw offset
	pub offset_x: i32,
	/// Vertical draw offset
	pub offset_y: i32,
	/// Unused header field, preserved for re-encoding
	pub unknown: u32,
	/// Decoded palette indices, row-major, top row first
	pixels: Vec<u8>,
}

impl Frame {
	/// Creates a frame from already decoded palette indices.
	///
	/// # Errors
	///
	/// Returns `CorruptData` if `pixels.len() != width * height`.
	pub fn new(
		width: u32,
		height: u32,
		offset_x: i32,
		offset_y: i32,
		pixels: Vec<u8>,
	) -> Result<Self, FileError> {
		let expected = width as usize * height as usize;
		if pixels.len() != expected {
			return Err(FileError::corrupt(
				FileType::Dc6,
				format!("frame {width}x{height} needs {expected} pixels, got {}", pixels.len()),
			));
		}

		Ok(Self {
			flipped: 0,
			width,
			height,
			offset_x,
			offset_y,
			unknown: 0,
			pixels,
		})
	}

	/// Decoded palette indices, row-major.
	#[inline]
	pub fn pixels(&self) -> &[u8] {
		&self.pixels
	}

	/// Consumes the frame and returns its pixels.
	pub fn into_pixels(self) -> Vec<u8> {
		self.pixels
	}

	/// Returns the palette index at `(x, y)`, or 0 outside the frame.
	#[inline]
	pub fn color_index_at(&self, x: u32, y: u32) -> u8 {
		if x >= self.width || y >= self.height {
			return 0;
		}
		self.pixels[(y * self.width + x) as usize]
	}

	/// Parses a frame block starting at the current position of `data`.
	///
	/// The decoded pixel count is taken from `pixel_budget`; a frame that does
	/// not fit is `CorruptData`. Returns the frame and the number of bytes
	/// consumed.
	pub(crate) fn parse(data: &[u8], pixel_budget: &mut usize) -> Result<(Self, usize), FileError> {
		if data.len() < constants::FRAME_HEADER_SIZE {
			return Err(FileError::insufficient_data(
				FileType::Dc6,
				constants::FRAME_HEADER_SIZE,
				data.len(),
			));
		}

		let field = |index: usize| {
			let o = index * 4;
			[data[o], data[o + 1], data[o + 2], data[o + 3]]
		};
		let flipped = u32::from_le_bytes(field(0));
		let width = u32::from_le_bytes(field(1));
		let height = u32::from_le_bytes(field(2));
		let offset_x = i32::from_le_bytes(field(3));
		let offset_y = i32::from_le_bytes(field(4));
		let unknown = u32::from_le_bytes(field(5));
		// field 6 is the next-block pointer, recomputed on encode
		let length = u32::from_le_bytes(field(7)) as usize;

		if width > constants::MAX_FRAME_DIMENSION || height > constants::MAX_FRAME_DIMENSION {
			return Err(FileError::corrupt(
				FileType::Dc6,
				format!("frame dimensions {width}x{height} exceed the format limit"),
			));
		}

		let data_end = constants::FRAME_HEADER_SIZE.saturating_add(length);
		if data.len() < data_end {
			return Err(FileError::insufficient_data(FileType::Dc6, data_end, data.len()));
		}
		// Every stored scanline ends with its own end-of-line byte.
		if width > 0 && height as usize > length {
			return Err(FileError::corrupt(
				FileType::Dc6,
				format!("{height} rows cannot be stored in {length} bytes"),
			));
		}
		let area = width as usize * height as usize;
		*pixel_budget = pixel_budget.checked_sub(area).ok_or_else(|| {
			FileError::corrupt(FileType::Dc6, format!("frame {width}x{height} exceeds the decode limit"))
		})?;
		let encoded = &data[constants::FRAME_HEADER_SIZE..data_end];
		let pixels = decode_rle(encoded, width, height, flipped != 0)?;

		// Terminator bytes are optional at the very end of a truncated file.
		let consumed = (data_end + constants::FRAME_TERMINATOR_SIZE).min(data.len());

		Ok((
			Self {
				flipped,
				width,
				height,
				offset_x,
				offset_y,
				unknown,
				pixels,
			},
			consumed,
		))
	}

	/// Serializes the frame block; `next_block` is the absolute offset of the
	/// following block.
	pub(crate) fn write(&self, next_block: u32, out: &mut Vec<u8>) {
		let encoded = encode_rle(&self.pixels, self.width, self.height, self.flipped != 0);
		out.extend_from_slice(&self.flipped.to_le_bytes());
		out.extend_from_slice(&self.width.to_le_bytes());
		out.extend_from_slice(&self.height.to_le_bytes());
		out.extend_from_slice(&self.offset_x.to_le_bytes());
		out.extend_from_slice(&self.offset_y.to_le_bytes());
		out.extend_from_slice(&self.unknown.to_le_bytes());
		out.extend_from_slice(&next_block.to_le_bytes());
		out.extend_from_slice(&(encoded.len() as u32).to_le_bytes());
		out.extend_from_slice(&encoded);
		out.extend_from_slice(&constants::FRAME_TERMINATOR);
	}

	/// Size of the serialized block in bytes.
	pub(crate) fn encoded_len(&self) -> usize {
		constants::FRAME_HEADER_SIZE
			+ encode_rle(&self.pixels, self.width, self.height, self.flipped != 0).len()
			+ constants::FRAME_TERMINATOR_SIZE
	}
}

impl fmt::Display for Frame {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{}x{} @ ({}, {}){}",
			self.width,
			self.height,
			self.offset_x,
			self.offset_y,
			if self.flipped != 0 {
				" flipped"
			} else {
				""
			}
		)
	}
}

/// Yields row indices in storage order.
fn storage_rows(height: u32, flipped: bool) -> impl Iterator<Item = u32> {
	let rows = 0..height;
	let reversed = (0..height).rev();
	rows.filter(move |_| flipped).chain(reversed.filter(move |_| !flipped))
}

/// Decodes DC6 scanline RLE into a `width * height` index buffer.
///
/// Scanlines are stored bottom-up unless `flipped`. `0x80` ends a scanline,
/// bytes with the high bit set skip `b & 0x7F` transparent pixels, anything
/// else is a literal run of `b` indices.
pub fn decode_rle(data: &[u8], width: u32, height: u32, flipped: bool) -> Result<Vec<u8>, FileError> {
	let w = width as usize;
	let mut pixels = vec![0u8; w * height as usize];
	if pixels.is_empty() {
		return Ok(pixels);
	}

	let mut rows = storage_rows(height, flipped);
	let mut y = match rows.next() {
		Some(y) => y as usize,
		None => return Ok(pixels),
	};
	let mut x = 0usize;
	let mut offset = 0usize;

	while offset < data.len() {
		let b = data[offset];
		offset += 1;

		if b == constants::END_OF_LINE {
			match rows.next() {
				Some(next) => {
					y = next as usize;
					x = 0;
				}
				None => break,
			}
		} else if b & constants::SKIP_FLAG != 0 {
			x += usize::from(b & constants::RUN_MASK);
			if x > w {
				return Err(FileError::corrupt(
					FileType::Dc6,
					format!("transparent run past row end at ({x}, {y})"),
				));
			}
		} else {
			let run = usize::from(b);
			let Some(literal) = data.get(offset..offset + run) else {
				return Err(FileError::corrupt(FileType::Dc6, "literal run past end of frame data"));
			};
			if x + run > w {
				return Err(FileError::corrupt(
					FileType::Dc6,
					format!("literal run of {run} past row end at ({x}, {y})"),
				));
			}
			let start = y * w + x;
			pixels[start..start + run].copy_from_slice(literal);
			offset += run;
			x += run;
		}
	}

	Ok(pixels)
}

/// Encodes an index buffer with DC6 scanline RLE. Index 0 is written as
/// transparent.
pub fn encode_rle(pixels: &[u8], width: u32, height: u32, flipped: bool) -> Vec<u8> {
	let w = width as usize;
	let mut out = Vec::new();
	if w == 0 {
		return out;
	}

	for y in storage_rows(height, flipped) {
		let start = y as usize * w;
		let Some(row) = pixels.get(start..start + w) else {
			break;
		};

		// Trailing transparency is implied by the end-of-line marker.
		let used = row.iter().rposition(|&p| p != 0).map_or(0, |i| i + 1);
		let mut x = 0;
		while x < used {
			if row[x] == 0 {
				let run = row[x..used].iter().take_while(|&&p| p == 0).count();
				let run = run.min(usize::from(constants::RUN_MASK));
				out.push(constants::SKIP_FLAG | run as u8);
				x += run;
			} else {
				let run = row[x..used].iter().take_while(|&&p| p != 0).count();
				let run = run.min(usize::from(constants::RUN_MASK));
				out.push(run as u8);
				out.extend_from_slice(&row[x..x + run]);
				x += run;
			}
		}
		out.push(constants::END_OF_LINE);
	}

	out
}
