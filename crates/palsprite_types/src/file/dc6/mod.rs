//! `.DC6` sprite sheet support.
//!
//! DC6 files hold one or more directions, each a flat list of frames whose
//! pixels are stored as scanline run-length encoded palette indices. Every
//! frame carries its own size and draw offset, so no cross-frame state is
//! needed to decode it.
//!
//! # File Structure
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0x00 | 4 | version (`i32`, always 6) |
//! | 0x04 | 4 | flags (`u32`, usually 1) |
//! | 0x08 | 4 | encoding (`u32`, usually 0) |
//! | 0x0C | 4 | termination bytes |
//! | 0x10 | 4 | direction count |
//! | 0x14 | 4 | frames per direction |
//! | 0x18 | 4 × n | absolute frame block pointers, direction-major |
//!
//! Each frame block is a 32-byte header (`flipped`, `width`, `height`,
//! `offset_x`, `offset_y`, `unknown`, `next_block`, `length`), `length` bytes
//! of RLE data and a 3-byte terminator.
//!
//! # Example
//!
//! ```no_run
//! use palsprite_types::file::dc6::File;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let dc6 = File::open("cursor.dc6")?;
//! for (dir, frames) in dc6.directions().iter().enumerate() {
//!     for (index, frame) in frames.iter().enumerate() {
//!         println!("dir {dir} frame {index}: {frame}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::io::Read;
use std::path::Path;

use log::{debug, warn};

use crate::file::reader::ByteReader;
use crate::file::{FileError, FileType};

pub mod frame;

pub use frame::{Frame, decode_rle, encode_rle};

/// DC6 file constants.
pub mod constants {
	/// The only supported format version
	pub const VERSION: i32 = 6;

	/// Flags value written by the encoder
	pub const DEFAULT_FLAGS: u32 = 1;

	/// Encoding value written by the encoder
	pub const DEFAULT_ENCODING: u32 = 0;

	/// Termination bytes written by the encoder
	pub const TERMINATION: [u8; 4] = [0xEE; 4];

	/// Size of the file header, excluding frame pointers
	pub const HEADER_SIZE: usize = 24;

	/// Size of a frame block header
	pub const FRAME_HEADER_SIZE: usize = 32;

	/// Bytes following each frame's RLE data
	pub const FRAME_TERMINATOR_SIZE: usize = 3;

	/// Terminator written after each frame
	pub const FRAME_TERMINATOR: [u8; 3] = [0xEE; 3];

	/// Scanline terminator
	pub const END_OF_LINE: u8 = 0x80;

	/// High bit marks a transparent run
	pub const SKIP_FLAG: u8 = 0x80;

	/// Run length mask
	pub const RUN_MASK: u8 = 0x7F;

	/// Largest width or height accepted by the parser
	pub const MAX_FRAME_DIMENSION: u32 = 0x4000;

	/// Largest direction count accepted by the parser
	pub const MAX_DIRECTIONS: u32 = 0xFF;

	/// Decoded pixels allowed per file, summed over all frames
	pub const MAX_DECODED_PIXELS: usize = 0x400_0000;
}

/// DC6 file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
	/// Format version
	pub version: i32,
	/// Flags field
	pub flags: u32,
	/// Encoding field
	pub encoding: u32,
	/// Termination bytes
	pub termination: [u8; 4],
	/// Number of directions
	pub directions: u32,
	/// Frames in each direction
	pub frames_per_direction: u32,
}

impl Default for Header {
	fn default() -> Self {
		Self {
			version: constants::VERSION,
			flags: constants::DEFAULT_FLAGS,
			encoding: constants::DEFAULT_ENCODING,
			termination: constants::TERMINATION,
			directions: 0,
			frames_per_direction: 0,
		}
	}
}

/// A parsed DC6 file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
	header: Header,
	directions: Vec<Vec<Frame>>,
}

impl File {
	/// Builds a file from per-direction frame lists.
	///
	/// # Errors
	///
	/// Returns `CorruptData` if the directions do not all hold the same number
	/// of frames.
	pub fn from_directions(directions: Vec<Vec<Frame>>) -> Result<Self, FileError> {
		let frames_per_direction = directions.first().map_or(0, Vec::len);
		if directions.iter().any(|d| d.len() != frames_per_direction) {
			return Err(FileError::corrupt(
				FileType::Dc6,
				"every direction must hold the same number of frames",
			));
		}

		Ok(Self {
			header: Header {
				directions: directions.len() as u32,
				frames_per_direction: frames_per_direction as u32,
				..Header::default()
			},
			directions,
		})
	}

	/// Opens a DC6 file from disk.
	///
	/// # Errors
	///
	/// Returns an error if the file cannot be read or is malformed.
	pub fn open(path: impl AsRef<Path>) -> Result<Self, FileError> {
		let data = std::fs::read(path)?;
		Self::from_bytes(&data)
	}

	/// Loads a DC6 file from any reader.
	pub fn from_reader<R: Read>(reader: &mut R) -> Result<Self, FileError> {
		let mut data = Vec::new();
		reader.read_to_end(&mut data)?;
		Self::from_bytes(&data)
	}

	/// Parses a DC6 file from a byte slice.
	///
	/// # Errors
	///
	/// Returns an error if:
	/// - The data is shorter than the header or pointer table
	/// - The version is not 6
	/// - The direction or frame counts cannot be backed by the data
	/// - A frame pointer or RLE run points outside the data
	/// - The frames decode to more than [`constants::MAX_DECODED_PIXELS`]
	pub fn from_bytes(data: &[u8]) -> Result<Self, FileError> {
		let mut reader = ByteReader::new(data, FileType::Dc6);
		let header = Header {
			version: reader.read_i32()?,
			flags: reader.read_u32()?,
			encoding: reader.read_u32()?,
			termination: reader.read_array()?,
			directions: reader.read_u32()?,
			frames_per_direction: reader.read_u32()?,
		};

		if header.version != constants::VERSION {
			return Err(FileError::InvalidVersion {
				file_type: FileType::Dc6,
				version: header.version,
			});
		}
		if header.flags != constants::DEFAULT_FLAGS || header.encoding != constants::DEFAULT_ENCODING {
			warn!("DC6 with non-standard flags {:#X} / encoding {}", header.flags, header.encoding);
		}

		if header.directions > constants::MAX_DIRECTIONS {
			return Err(FileError::corrupt(
				FileType::Dc6,
				format!("{} directions exceed the format limit", header.directions),
			));
		}

		// Each frame needs a pointer and its own block header.
		let total = (header.directions as usize)
			.checked_mul(header.frames_per_direction as usize)
			.ok_or_else(|| FileError::corrupt(FileType::Dc6, "frame count overflows"))?;
		let required = total
			.checked_mul(4 + constants::FRAME_HEADER_SIZE)
			.and_then(|bytes| bytes.checked_add(constants::HEADER_SIZE))
			.ok_or_else(|| FileError::corrupt(FileType::Dc6, "frame count overflows"))?;
		if data.len() < required {
			return Err(FileError::insufficient_data(FileType::Dc6, required, data.len()));
		}

		let mut pointers = Vec::with_capacity(total);
		for _ in 0..total {
			pointers.push(reader.read_u32()? as usize);
		}

		let mut pixel_budget = constants::MAX_DECODED_PIXELS;
		let mut directions = Vec::with_capacity(header.directions as usize);
		for chunk in pointers.chunks(header.frames_per_direction.max(1) as usize) {
			let mut frames = Vec::with_capacity(chunk.len());
			for &pointer in chunk {
				let Some(block) = data.get(pointer..) else {
					return Err(FileError::corrupt(
						FileType::Dc6,
						format!("frame pointer {pointer:#X} past end of file"),
					));
				};
				let (frame, _) = Frame::parse(block, &mut pixel_budget)?;
				frames.push(frame);
			}
			directions.push(frames);
		}
		// A header with zero frames per direction still lists its directions.
		directions.resize_with(header.directions as usize, Vec::new);

		debug!(
			"decoded DC6: {} directions x {} frames",
			header.directions, header.frames_per_direction
		);

		Ok(Self {
			header,
			directions,
		})
	}

	/// Serializes the file, recomputing frame pointers.
	pub fn to_bytes(&self) -> Vec<u8> {
		let total: usize = self.directions.iter().map(Vec::len).sum();
		let mut offsets = Vec::with_capacity(total + 1);
		let mut offset = constants::HEADER_SIZE + total * 4;
		for frame in self.directions.iter().flatten() {
			offsets.push(offset as u32);
			offset += frame.encoded_len();
		}
		offsets.push(offset as u32);

		let mut out = Vec::with_capacity(offset);
		out.extend_from_slice(&self.header.version.to_le_bytes());
		out.extend_from_slice(&self.header.flags.to_le_bytes());
		out.extend_from_slice(&self.header.encoding.to_le_bytes());
		out.extend_from_slice(&self.header.termination);
		out.extend_from_slice(&(self.directions.len() as u32).to_le_bytes());
		out.extend_from_slice(&self.header.frames_per_direction.to_le_bytes());
		for pointer in &offsets[..total] {
			out.extend_from_slice(&pointer.to_le_bytes());
		}
		for (index, frame) in self.directions.iter().flatten().enumerate() {
			frame.write(offsets[index + 1], &mut out);
		}
		out
	}

	/// Writes the file to disk.
	pub fn save(&self, path: impl AsRef<Path>) -> Result<(), FileError> {
		std::fs::write(path, self.to_bytes())?;
		Ok(())
	}

	/// File header.
	#[inline]
	pub fn header(&self) -> &Header {
		&self.header
	}

	/// Number of directions.
	#[inline]
	pub fn direction_count(&self) -> usize {
		self.directions.len()
	}

	/// Frames in each direction.
	#[inline]
	pub fn frames_per_direction(&self) -> usize {
		self.header.frames_per_direction as usize
	}

	/// All directions.
	#[inline]
	pub fn directions(&self) -> &[Vec<Frame>] {
		&self.directions
	}

	/// Returns a frame by direction and index.
	pub fn frame(&self, direction: usize, index: usize) -> Option<&Frame> {
		self.directions.get(direction)?.get(index)
	}

	/// Consumes the file and returns its directions.
	pub fn into_directions(self) -> Vec<Vec<Frame>> {
		self.directions
	}
}

impl fmt::Display for File {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"DC6 File: {} directions, {} frames per direction",
			self.directions.len(),
			self.header.frames_per_direction
		)
	}
}
