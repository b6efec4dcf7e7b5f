//! `.DCC` compressed sprite sheet support.
//!
//! DCC files store each direction as a bit-packed block in which frames share
//! a 4×4 cell grid over the direction's bounding box, and cells that do not
//! change between frames are not stored again. All directions are decoded
//! when the file is parsed.
//!
//! # File Structure
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0x00 | 1 | signature (`0x74`) |
//! | 0x01 | 1 | version |
//! | 0x02 | 1 | direction count |
//! | 0x03 | 4 | frames per direction |
//! | 0x07 | 4 | tag (always 1) |
//! | 0x0B | 4 | total coded size |
//! | 0x0F | 4 × n | byte offset of each direction block |
//!
//! Decoded frames share their direction's bounding box: every frame is
//! `bounds().width × bounds().height` pixels with the draw offset at the
//! box's top-left corner.

use std::fmt;
use std::io::Read;
use std::path::Path;

use log::debug;

use crate::file::reader::ByteReader;
use crate::file::{FileError, FileType};

pub mod direction;

pub use direction::{BIT_WIDTH_TABLE, Direction, DirectionHeader, FrameHeader, Rect};

/// DCC file constants.
pub mod constants {
	/// First byte of every DCC file
	pub const SIGNATURE: u8 = 0x74;

	/// Required value of the header tag field
	pub const TAG: u32 = 1;

	/// Size of the header, excluding direction offsets
	pub const HEADER_SIZE: usize = 15;

	/// Largest frame or direction box side accepted by the decoder
	pub const MAX_DIMENSION: u32 = 0x2000;
}

/// DCC file header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
	/// Signature byte
	pub signature: u8,
	/// Format version
	pub version: u8,
	/// Number of directions
	pub directions: u8,
	/// Frames in each direction
	pub frames_per_direction: u32,
	/// Tag field
	pub tag: u32,
	/// Declared total coded size
	pub total_size_coded: u32,
	/// Byte offsets of the direction blocks
	pub direction_offsets: Vec<u32>,
}

/// A parsed and decoded DCC file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
	header: Header,
	directions: Vec<Direction>,
}

impl File {
	/// Opens a DCC file from disk.
	///
	/// # Errors
	///
	/// Returns an error if the file cannot be read or is malformed.
	pub fn open(path: impl AsRef<Path>) -> Result<Self, FileError> {
		let data = std::fs::read(path)?;
		Self::from_bytes(&data)
	}

	/// Loads a DCC file from any reader.
	pub fn from_reader<R: Read>(reader: &mut R) -> Result<Self, FileError> {
		let mut data = Vec::new();
		reader.read_to_end(&mut data)?;
		Self::from_bytes(&data)
	}

	/// Parses and decodes a DCC file.
	///
	/// # Errors
	///
	/// Returns an error if:
	/// - The signature or tag does not match
	/// - The header or direction offset table is truncated
	/// - Any direction bitstream is malformed
	pub fn from_bytes(data: &[u8]) -> Result<Self, FileError> {
		let mut reader = ByteReader::new(data, FileType::Dcc);
		let signature = reader.read_u8()?;
		if signature != constants::SIGNATURE {
			return Err(FileError::InvalidSignature {
				file_type: FileType::Dcc,
				expected: u32::from(constants::SIGNATURE),
				actual: u32::from(signature),
			});
		}

		let version = reader.read_u8()?;
		let direction_count = reader.read_u8()?;
		let frames_per_direction = reader.read_u32()?;
		let tag = reader.read_u32()?;
		if tag != constants::TAG {
			return Err(FileError::InvalidSignature {
				file_type: FileType::Dcc,
				expected: constants::TAG,
				actual: tag,
			});
		}
		let total_size_coded = reader.read_u32()?;

		let mut direction_offsets = Vec::with_capacity(direction_count as usize);
		for _ in 0..direction_count {
			direction_offsets.push(reader.read_u32()?);
		}

		let mut directions = Vec::with_capacity(direction_offsets.len());
		for &offset in &direction_offsets {
			directions.push(Direction::decode(data, offset as usize, frames_per_direction as usize)?);
		}

		debug!(
			"decoded DCC v{}: {} directions x {} frames",
			version, direction_count, frames_per_direction
		);

		Ok(Self {
			header: Header {
				signature,
				version,
				directions: direction_count,
				frames_per_direction,
				tag,
				total_size_coded,
				direction_offsets,
			},
			directions,
		})
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

	/// Decoded directions.
	#[inline]
	pub fn directions(&self) -> &[Direction] {
		&self.directions
	}

	/// Consumes the file and returns its directions.
	pub fn into_directions(self) -> Vec<Direction> {
		self.directions
	}
}

impl fmt::Display for File {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"DCC File v{}: {} directions, {} frames per direction",
			self.header.version, self.header.directions, self.header.frames_per_direction
		)
	}
}

#[cfg(test)]
mod tests;
