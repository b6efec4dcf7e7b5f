//! Base palette support.
//!
//! A base palette holds the 256 colors every sprite index resolves to. The
//! `.dat` form stores them as 256 BGR triplets (768 bytes).

use std::fmt;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::file::{FileError, FileType};

/// RGBA color representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
	/// Red component (0-255)
	pub r: u8,
	/// Green component (0-255)
	pub g: u8,
	/// Blue component (0-255)
	pub b: u8,
	/// Alpha component (0-255)
	pub a: u8,
}

impl Color {
	/// Creates a new RGBA color.
	pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
		Self {
			r,
			g,
			b,
			a,
		}
	}

	/// Creates a new RGB color with full opacity.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self::new(r, g, b, 255)
	}

	/// Creates a new grayscale color.
	pub const fn gray(value: u8) -> Self {
		Self::rgb(value, value, value)
	}

	/// Creates a transparent black color.
	pub const fn transparent() -> Self {
		Self::new(0, 0, 0, 0)
	}

	/// Returns the color as `[r, g, b, a]`.
	#[inline]
	pub const fn to_array(&self) -> [u8; 4] {
		[self.r, self.g, self.b, self.a]
	}
}

impl Default for Color {
	fn default() -> Self {
		Self::transparent()
	}
}

impl fmt::Display for Color {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "RGBA({}, {}, {}, {})", self.r, self.g, self.b, self.a)
	}
}

/// A 256-color base palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
	colors: [Color; 256],
}

impl Palette {
	/// Number of colors in a palette
	pub const PALETTE_SIZE: usize = 256;

	/// Size of a `.dat` palette file (256 × BGR)
	pub const DAT_FILE_SIZE: usize = Self::PALETTE_SIZE * 3;

	/// Creates a palette with every color transparent black.
	pub fn new() -> Self {
		Self {
			colors: [Color::transparent(); 256],
		}
	}

	/// Creates a palette from 256 colors.
	pub fn from_colors(colors: [Color; 256]) -> Self {
		Self {
			colors,
		}
	}

	/// Creates a grayscale palette where each color matches its index.
	pub fn grayscale() -> Self {
		let mut palette = Self::new();
		for (i, color) in palette.colors.iter_mut().enumerate() {
			*color = Color::gray(i as u8);
		}
		palette
	}

	/// Loads a `.dat` palette from disk.
	///
	/// # Errors
	///
	/// Returns an error if the file cannot be read or is shorter than 768 bytes.
	pub fn open_dat(path: impl AsRef<Path>) -> Result<Self, FileError> {
		let data = std::fs::read(path)?;
		Self::from_dat_bytes(&data)
	}

	/// Loads a `.dat` palette (256 BGR triplets) from a byte slice.
	pub fn from_dat_bytes(data: &[u8]) -> Result<Self, FileError> {
		if data.len() < Self::DAT_FILE_SIZE {
			return Err(FileError::insufficient_data(FileType::Dat, Self::DAT_FILE_SIZE, data.len()));
		}
		let mut reader = std::io::Cursor::new(data);
		Self::from_dat_reader(&mut reader)
	}

	/// Loads a `.dat` palette from a reader.
	pub fn from_dat_reader<R: Read>(reader: &mut R) -> Result<Self, FileError> {
		let mut palette = Self::new();
		for color in &mut palette.colors {
			let mut bgr = [0u8; 3];
			reader.read_exact(&mut bgr)?;
			*color = Color::rgb(bgr[2], bgr[1], bgr[0]);
		}
		Ok(palette)
	}

	/// Serializes the palette in `.dat` layout.
	pub fn to_dat_bytes(&self) -> Vec<u8> {
		self.colors.iter().flat_map(|c| [c.b, c.g, c.r]).collect()
	}

	/// Gets a color by index.
	#[inline]
	pub fn get(&self, index: u8) -> Color {
		self.colors[index as usize]
	}

	/// Sets a color by index.
	#[inline]
	pub fn set(&mut self, index: u8, color: Color) {
		self.colors[index as usize] = color;
	}

	/// All 256 colors.
	#[inline]
	pub fn colors(&self) -> &[Color; 256] {
		&self.colors
	}
}

impl Default for Palette {
	fn default() -> Self {
		Self::new()
	}
}
