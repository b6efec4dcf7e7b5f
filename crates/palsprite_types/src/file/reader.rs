//! Little-endian byte cursor and LSB-first bit reader shared by the parsers.

use crate::file::{FileError, FileType};

/// Bounds-checked little-endian cursor over a byte slice.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
	data: &'a [u8],
	position: usize,
	file_type: FileType,
}

impl<'a> ByteReader<'a> {
	/// Creates a reader positioned at the start of `data`.
	pub fn new(data: &'a [u8], file_type: FileType) -> Self {
		Self {
			data,
			position: 0,
			file_type,
		}
	}

	/// Current byte offset.
	#[inline]
	pub fn position(&self) -> usize {
		self.position
	}

	/// Moves the cursor to an absolute offset.
	///
	/// # Errors
	///
	/// Returns `InsufficientData` if `offset` lies past the end of the data.
	pub fn seek(&mut self, offset: usize) -> Result<(), FileError> {
		if offset > self.data.len() {
			return Err(FileError::insufficient_data(self.file_type, offset, self.data.len()));
		}
		self.position = offset;
		Ok(())
	}

	/// Reads `len` bytes and advances the cursor.
	///
	/// # Errors
	///
	/// Returns `InsufficientData` if fewer than `len` bytes remain.
	pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], FileError> {
		let end = self.position.checked_add(len).unwrap_or(usize::MAX);
		let Some(bytes) = self.data.get(self.position..end) else {
			return Err(FileError::insufficient_data(self.file_type, end, self.data.len()));
		};
		self.position = end;
		Ok(bytes)
	}

	/// Reads a fixed-size array.
	pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], FileError> {
		let mut out = [0u8; N];
		out.copy_from_slice(self.read_bytes(N)?);
		Ok(out)
	}

	/// Reads one byte.
	pub fn read_u8(&mut self) -> Result<u8, FileError> {
		Ok(self.read_array::<1>()?[0])
	}

	/// Reads a little-endian `u32`.
	pub fn read_u32(&mut self) -> Result<u32, FileError> {
		Ok(u32::from_le_bytes(self.read_array()?))
	}

	/// Reads a little-endian `i32`.
	pub fn read_i32(&mut self) -> Result<i32, FileError> {
		Ok(i32::from_le_bytes(self.read_array()?))
	}
}

/// Reader for bit-packed streams, least significant bit first.
///
/// Cloning a reader is cheap and yields an independent cursor over the same
/// data, which is how the DCC sub-streams are carved out of one direction block.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
	data: &'a [u8],
	bit_position: usize,
	file_type: FileType,
}

impl<'a> BitReader<'a> {
	/// Creates a reader starting at byte `offset`.
	///
	/// # Errors
	///
	/// Returns `InsufficientData` if `offset` lies past the end of the data.
	pub fn at_byte(data: &'a [u8], offset: usize, file_type: FileType) -> Result<Self, FileError> {
		if offset > data.len() {
			return Err(FileError::insufficient_data(file_type, offset, data.len()));
		}
		Ok(Self {
			data,
			bit_position: offset * 8,
			file_type,
		})
	}

	/// Current absolute bit offset.
	#[inline]
	pub fn bit_position(&self) -> usize {
		self.bit_position
	}

	/// Skips `bits` bits.
	///
	/// # Errors
	///
	/// Returns `CorruptData` if the skip runs past the end of the data.
	pub fn skip(&mut self, bits: usize) -> Result<(), FileError> {
		let target = self.bit_position + bits;
		if target > self.data.len() * 8 {
			return Err(self.exhausted());
		}
		self.bit_position = target;
		Ok(())
	}

	/// Reads a single bit.
	pub fn read_bit(&mut self) -> Result<u32, FileError> {
		let Some(byte) = self.data.get(self.bit_position / 8) else {
			return Err(self.exhausted());
		};
		let bit = (byte >> (self.bit_position % 8)) & 1;
		self.bit_position += 1;
		Ok(u32::from(bit))
	}

	/// Reads up to 32 bits as an unsigned value.
	pub fn read_bits(&mut self, count: u32) -> Result<u32, FileError> {
		debug_assert!(count <= 32);
		let mut value = 0u32;
		for i in 0..count {
			value |= self.read_bit()? << i;
		}
		Ok(value)
	}

	/// Reads up to 32 bits as a two's complement signed value.
	pub fn read_signed(&mut self, count: u32) -> Result<i32, FileError> {
		let raw = self.read_bits(count)?;
		if count == 0 || count >= 32 {
			return Ok(raw as i32);
		}
		let shift = 32 - count;
		Ok(((raw << shift) as i32) >> shift)
	}

	fn exhausted(&self) -> FileError {
		FileError::corrupt(
			self.file_type,
			format!("bitstream exhausted at bit {} of {}", self.bit_position, self.data.len() * 8),
		)
	}
}
