//! `.PL2` palette transform table support.
//!
//! A PL2 file bundles a base palette with every precomputed remapping the
//! renderer may need: light levels, hue shifts, tone filters, blend tables and
//! text colors. Each transform is a 256-entry table mapping a palette index to
//! another index of the base palette.
//!
//! # File Structure
//!
//! | Section | Transforms | Bytes |
//! |---------|-----------:|------:|
//! | base palette (RGBx) | - | 1024 |
//! | light levels | 32 | 8192 |
//! | inverse colors | 16 | 4096 |
//! | selected unit | 1 | 256 |
//! | alpha blend | 3 × 256 | 196608 |
//! | additive blend | 256 | 65536 |
//! | multiplicative blend | 256 | 65536 |
//! | hue variations | 111 | 28416 |
//! | red, green, blue tones | 3 | 768 |
//! | unknown variations | 14 | 3584 |
//! | max component blend | 256 | 65536 |
//! | darkened color shift | 1 | 256 |
//! | text colors (RGB) | - | 39 |
//! | text color shifts | 13 | 3328 |

use std::path::Path;

use log::debug;

use crate::file::reader::ByteReader;
use crate::file::{Color, FileError, FileType, Palette};

/// A 256-entry index remapping.
pub type Transform = [u8; 256];

/// PL2 file constants.
pub mod constants {
	/// Light level transforms
	pub const LIGHT_LEVELS: usize = 32;
	/// Inverse color transforms
	pub const INVERSE_COLORS: usize = 16;
	/// Alpha blend levels
	pub const ALPHA_BLEND_LEVELS: usize = 3;
	/// Hue variation transforms
	pub const HUE_VARIATIONS: usize = 111;
	/// Unknown variation transforms
	pub const UNKNOWN_VARIATIONS: usize = 14;
	/// Text colors and text color shift transforms
	pub const TEXT_COLORS: usize = 13;
	/// Total file size
	pub const FILE_SIZE: usize = 443_175;
}

/// A parsed PL2 file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
	/// Base palette
	pub base: Palette,
	/// Light level transforms, darkest last
	pub light_levels: Vec<Transform>,
	/// Inverse color transforms
	pub inverse_colors: Vec<Transform>,
	/// Selected unit highlight
	pub selected_unit_shift: Transform,
	/// Alpha blend tables, `[level][foreground]`
	pub alpha_blend: Vec<Vec<Transform>>,
	/// Additive blend table, `[foreground]`
	pub additive_blend: Vec<Transform>,
	/// Multiplicative blend table, `[foreground]`
	pub multiplicative_blend: Vec<Transform>,
	/// Hue variations
	pub hue_variations: Vec<Transform>,
	/// Red tone filter
	pub red_tones: Transform,
	/// Green tone filter
	pub green_tones: Transform,
	/// Blue tone filter
	pub blue_tones: Transform,
	/// Unknown variations
	pub unknown_variations: Vec<Transform>,
	/// Max component blend table
	pub max_component_blend: Vec<Transform>,
	/// Darkened color shift
	pub darkened_color_shift: Transform,
	/// Text colors
	pub text_colors: Vec<Color>,
	/// Text color shifts, one per text color
	pub text_color_shifts: Vec<Transform>,
}

fn read_transforms(reader: &mut ByteReader<'_>, count: usize) -> Result<Vec<Transform>, FileError> {
	(0..count).map(|_| reader.read_array()).collect()
}

fn put(out: &mut Vec<u8>, tables: &[Transform]) {
	for table in tables {
		out.extend_from_slice(table);
	}
}

impl File {
	/// Opens a PL2 file from disk.
	pub fn open(path: impl AsRef<Path>) -> Result<Self, FileError> {
		let data = std::fs::read(path)?;
		Self::from_bytes(&data)
	}

	/// Parses a PL2 file.
	///
	/// # Errors
	///
	/// Returns `InsufficientData` if the data is shorter than 443 175 bytes.
	pub fn from_bytes(data: &[u8]) -> Result<Self, FileError> {
		if data.len() < constants::FILE_SIZE {
			return Err(FileError::insufficient_data(FileType::Pl2, constants::FILE_SIZE, data.len()));
		}

		let mut reader = ByteReader::new(data, FileType::Pl2);
		let mut base = Palette::new();
		for index in 0..=255u8 {
			let rgbx: [u8; 4] = reader.read_array()?;
			base.set(index, Color::rgb(rgbx[0], rgbx[1], rgbx[2]));
		}

		let light_levels = read_transforms(&mut reader, constants::LIGHT_LEVELS)?;
		let inverse_colors = read_transforms(&mut reader, constants::INVERSE_COLORS)?;
		let selected_unit_shift = reader.read_array()?;
		let alpha_blend = (0..constants::ALPHA_BLEND_LEVELS)
			.map(|_| read_transforms(&mut reader, 256))
			.collect::<Result<Vec<_>, _>>()?;
		let additive_blend = read_transforms(&mut reader, 256)?;
		let multiplicative_blend = read_transforms(&mut reader, 256)?;
		let hue_variations = read_transforms(&mut reader, constants::HUE_VARIATIONS)?;
		let red_tones = reader.read_array()?;
		let green_tones = reader.read_array()?;
		let blue_tones = reader.read_array()?;
		let unknown_variations = read_transforms(&mut reader, constants::UNKNOWN_VARIATIONS)?;
		let max_component_blend = read_transforms(&mut reader, 256)?;
		let darkened_color_shift = reader.read_array()?;

		let mut text_colors = Vec::with_capacity(constants::TEXT_COLORS);
		for _ in 0..constants::TEXT_COLORS {
			let rgb: [u8; 3] = reader.read_array()?;
			text_colors.push(Color::rgb(rgb[0], rgb[1], rgb[2]));
		}
		let text_color_shifts = read_transforms(&mut reader, constants::TEXT_COLORS)?;

		debug!("decoded PL2: {} bytes consumed", reader.position());

		Ok(Self {
			base,
			light_levels,
			inverse_colors,
			selected_unit_shift,
			alpha_blend,
			additive_blend,
			multiplicative_blend,
			hue_variations,
			red_tones,
			green_tones,
			blue_tones,
			unknown_variations,
			max_component_blend,
			darkened_color_shift,
			text_colors,
			text_color_shifts,
		})
	}

	/// Creates a file whose transforms are all the identity mapping.
	pub fn identity(base: Palette) -> Self {
		let identity: Transform = std::array::from_fn(|i| i as u8);
		let many = |count: usize| vec![identity; count];
		Self {
			base,
			light_levels: many(constants::LIGHT_LEVELS),
			inverse_colors: many(constants::INVERSE_COLORS),
			selected_unit_shift: identity,
			alpha_blend: vec![many(256); constants::ALPHA_BLEND_LEVELS],
			additive_blend: many(256),
			multiplicative_blend: many(256),
			hue_variations: many(constants::HUE_VARIATIONS),
			red_tones: identity,
			green_tones: identity,
			blue_tones: identity,
			unknown_variations: many(constants::UNKNOWN_VARIATIONS),
			max_component_blend: many(256),
			darkened_color_shift: identity,
			text_colors: vec![Color::rgb(255, 255, 255); constants::TEXT_COLORS],
			text_color_shifts: many(constants::TEXT_COLORS),
		}
	}

	/// Serializes the file in PL2 layout.
	pub fn to_bytes(&self) -> Vec<u8> {
		let mut out = Vec::with_capacity(constants::FILE_SIZE);
		for color in self.base.colors() {
			out.extend_from_slice(&[color.r, color.g, color.b, 0]);
		}
		put(&mut out, &self.light_levels);
		put(&mut out, &self.inverse_colors);
		put(&mut out, std::slice::from_ref(&self.selected_unit_shift));
		for level in &self.alpha_blend {
			put(&mut out, level);
		}
		put(&mut out, &self.additive_blend);
		put(&mut out, &self.multiplicative_blend);
		put(&mut out, &self.hue_variations);
		put(&mut out, &[self.red_tones, self.green_tones, self.blue_tones]);
		put(&mut out, &self.unknown_variations);
		put(&mut out, &self.max_component_blend);
		put(&mut out, std::slice::from_ref(&self.darkened_color_shift));
		for color in &self.text_colors {
			out.extend_from_slice(&[color.r, color.g, color.b]);
		}
		put(&mut out, &self.text_color_shifts);
		out
	}
}
