//! Flat palette lookup tables.
//!
//! A [`PaletteTable`] is the CPU side of a palette texture: row 0 is the base
//! palette, every following row is the base palette remapped through one
//! transform. Rows are 256 RGBA entries (1024 bytes) and entry 0 of every row
//! is transparent.
//!
//! | Group                  | Rows | Source             |
//! |------------------------|------|--------------------|
//! | base                   | 1    | `Pl2File::base`    |
//! | `light_levels`         | 32   | light level shifts |
//! | `inverse_colors`       | 16   | inverse colours    |
//! | `selected_unit`        | 1    | selection tint     |
//! | `hue_variations`       | 111  | hue shifts         |
//! | `red/green/blue_tones` | 3    | tone shifts        |
//! | `unknown_variations`   | 14   |                    |
//! | `max_component_blend`  | 256  |                    |
//! | `darkened_color_shift` | 1    |                    |
//! | `text_color_shifts`    | 13   | text colours       |
//!
//! Rows are addressed by position. The only name resolved at load time is the
//! text colour base, see [`PaletteTable::text_shift_offset`]. Text colour ids
//! are 1-based: colour 1 is the first `text_color_shifts` row.

mod registry;

pub use registry::PaletteRegistry;

use log::debug;
use palsprite_types::file::{Color, Palette, Pl2File, Transform};

/// Bytes in one palette row.
pub const ROW_BYTES: usize = Palette::PALETTE_SIZE * 4;

/// Group names used by [`PaletteTable::from_pl2`].
pub mod groups {
	/// Light level shifts
	pub const LIGHT_LEVELS: &str = "light_levels";
	/// Inverse colours
	pub const INVERSE_COLORS: &str = "inverse_colors";
	/// Selected unit tint
	pub const SELECTED_UNIT: &str = "selected_unit";
	/// Hue shifts
	pub const HUE_VARIATIONS: &str = "hue_variations";
	/// Red tone
	pub const RED_TONES: &str = "red_tones";
	/// Green tone
	pub const GREEN_TONES: &str = "green_tones";
	/// Blue tone
	pub const BLUE_TONES: &str = "blue_tones";
	/// Unnamed variations
	pub const UNKNOWN_VARIATIONS: &str = "unknown_variations";
	/// Max component blend
	pub const MAX_COMPONENT_BLEND: &str = "max_component_blend";
	/// Darkened shift
	pub const DARKENED_COLOR_SHIFT: &str = "darkened_color_shift";
	/// Text colour shifts
	pub const TEXT_COLOR_SHIFTS: &str = "text_color_shifts";
}

/// A named, ordered run of transforms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformGroup {
	/// Group name
	pub name: String,
	/// Transforms in row order
	pub tables: Vec<Transform>,
}

impl TransformGroup {
	/// Creates a group.
	pub fn new(name: impl Into<String>, tables: Vec<Transform>) -> Self {
		Self {
			name: name.into(),
			tables,
		}
	}
}

/// Which palette row a draw uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteRow {
	/// An absolute row, 0 being the base palette
	Shift(usize),
	/// A 1-based text colour id
	Text(usize),
}

impl Default for PaletteRow {
	fn default() -> Self {
		Self::Shift(0)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct GroupRange {
	name: String,
	start: usize,
	len: usize,
}

/// Concatenated RGBA rows of a palette and its transforms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteTable {
	data: Vec<u8>,
	groups: Vec<GroupRange>,
	text_shift_offset: Option<usize>,
}

impl PaletteTable {
	/// Builds a table from a base palette and transform groups, in order.
	///
	/// The first group named [`groups::TEXT_COLOR_SHIFTS`] marks the text
	/// colour rows; the text shift offset is the row just before it.
	pub fn load(base: &Palette, transform_groups: &[TransformGroup]) -> Self {
		let rows = 1 + transform_groups.iter().map(|group| group.tables.len()).sum::<usize>();
		let mut data = Vec::with_capacity(rows * ROW_BYTES);
		push_row(&mut data, base.colors().iter().copied());

		let mut ranges = Vec::with_capacity(transform_groups.len());
		let mut text_shift_offset = None;
		for group in transform_groups {
			let start = data.len() / ROW_BYTES;
			if group.name == groups::TEXT_COLOR_SHIFTS && text_shift_offset.is_none() {
				text_shift_offset = Some(start - 1);
			}
			for table in &group.tables {
				push_row(&mut data, table.iter().map(|&index| base.get(index)));
			}
			ranges.push(GroupRange {
				name: group.name.clone(),
				start,
				len: group.tables.len(),
			});
		}

		debug!("Palette table: {} rows, text shift offset {:?}", data.len() / ROW_BYTES, text_shift_offset);

		Self {
			data,
			groups: ranges,
			text_shift_offset,
		}
	}

	/// A table holding only the base palette.
	pub fn from_palette(base: &Palette) -> Self {
		Self::load(base, &[])
	}

	/// Builds the full table of a PL2 file.
	pub fn from_pl2(pl2: &Pl2File) -> Self {
		let single = |table: &Transform| vec![*table];
		let transform_groups = [
			TransformGroup::new(groups::LIGHT_LEVELS, pl2.light_levels.clone()),
			TransformGroup::new(groups::INVERSE_COLORS, pl2.inverse_colors.clone()),
			TransformGroup::new(groups::SELECTED_UNIT, single(&pl2.selected_unit_shift)),
			TransformGroup::new(groups::HUE_VARIATIONS, pl2.hue_variations.clone()),
			TransformGroup::new(groups::RED_TONES, single(&pl2.red_tones)),
			TransformGroup::new(groups::GREEN_TONES, single(&pl2.green_tones)),
			TransformGroup::new(groups::BLUE_TONES, single(&pl2.blue_tones)),
			TransformGroup::new(groups::UNKNOWN_VARIATIONS, pl2.unknown_variations.clone()),
			TransformGroup::new(groups::MAX_COMPONENT_BLEND, pl2.max_component_blend.clone()),
			TransformGroup::new(groups::DARKENED_COLOR_SHIFT, single(&pl2.darkened_color_shift)),
			TransformGroup::new(groups::TEXT_COLOR_SHIFTS, pl2.text_color_shifts.clone()),
		];
		Self::load(&pl2.base, &transform_groups)
	}

	/// The flat RGBA buffer, `ROW_BYTES * transform_count()` bytes.
	#[inline]
	pub fn as_bytes(&self) -> &[u8] {
		&self.data
	}

	/// Number of rows, base row included.
	#[inline]
	pub fn transform_count(&self) -> usize {
		self.data.len() / ROW_BYTES
	}

	/// Row that text colour ids are added to, if the table has text rows.
	///
	/// Colour `n` is drawn from row `text_shift_offset + n`.
	#[inline]
	pub fn text_shift_offset(&self) -> Option<usize> {
		self.text_shift_offset
	}

	/// First row of a named group.
	pub fn group_offset(&self, name: &str) -> Option<usize> {
		self.groups.iter().find(|group| group.name == name).map(|group| group.start)
	}

	/// Number of rows in a named group.
	pub fn group_len(&self, name: &str) -> Option<usize> {
		self.groups.iter().find(|group| group.name == name).map(|group| group.len)
	}

	/// Group names in row order.
	pub fn group_names(&self) -> impl Iterator<Item = &str> {
		self.groups.iter().map(|group| group.name.as_str())
	}

	/// RGBA bytes of one row.
	pub fn row(&self, row: usize) -> Option<&[u8]> {
		self.data.get(row * ROW_BYTES..(row + 1) * ROW_BYTES)
	}

	/// Colour of `index` in `row`.
	pub fn color(&self, row: usize, index: u8) -> Option<Color> {
		let offset = usize::from(index) * 4;
		self.row(row).map(|bytes| Color::new(bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3]))
	}

	/// Absolute row of a draw, clamped to the last row.
	///
	/// Text rows fall back to the base row when the table has none.
	pub fn resolve_row(&self, row: PaletteRow) -> usize {
		let absolute = match row {
			PaletteRow::Shift(row) => row,
			PaletteRow::Text(color) => self.text_shift_offset.map_or(0, |offset| offset.saturating_add(color)),
		};
		absolute.min(self.transform_count().saturating_sub(1))
	}

	/// Row normalized to `[0, 1]` for a shader uniform.
	pub fn row_uniform(&self, row: PaletteRow) -> f32 {
		let last = self.transform_count().saturating_sub(1);
		if last == 0 {
			return 0.0;
		}
		self.resolve_row(row) as f32 / last as f32
	}
}

fn push_row(data: &mut Vec<u8>, colors: impl Iterator<Item = Color>) {
	let start = data.len();
	for color in colors {
		data.extend_from_slice(&[color.r, color.g, color.b, 255]);
	}
	data[start + 3] = 0;
}

#[cfg(test)]
mod tests {
	use super::*;

	fn reversed() -> Transform {
		let mut table = [0u8; 256];
		for (i, entry) in table.iter_mut().enumerate() {
			*entry = 255 - i as u8;
		}
		table
	}

	#[test]
	fn test_base_only() {
		let table = PaletteTable::from_palette(&Palette::grayscale());
		assert_eq!(table.transform_count(), 1);
		assert_eq!(table.as_bytes().len(), ROW_BYTES);
		assert_eq!(table.as_bytes()[3], 0);
		assert_eq!(table.color(0, 10), Some(Color::new(10, 10, 10, 255)));
		assert_eq!(table.text_shift_offset(), None);
		assert_eq!(table.row_uniform(PaletteRow::Text(4)), 0.0);
	}

	#[test]
	fn test_transform_rows() {
		let base = Palette::grayscale();
		let table = PaletteTable::load(
			&base,
			&[
				TransformGroup::new("reverse", vec![reversed(), reversed()]),
				TransformGroup::new(groups::TEXT_COLOR_SHIFTS, vec![[7; 256]]),
			],
		);
		assert_eq!(table.transform_count(), 4);
		assert_eq!(table.as_bytes().len(), ROW_BYTES * table.transform_count());
		for row in 0..table.transform_count() {
			assert_eq!(table.row(row).unwrap()[3], 0);
		}
		assert_eq!(table.color(1, 10), Some(Color::new(245, 245, 245, 255)));
		assert_eq!(table.color(3, 200), Some(Color::new(7, 7, 7, 255)));
		assert_eq!(table.group_offset("reverse"), Some(1));
		assert_eq!(table.group_len("reverse"), Some(2));
		assert_eq!(table.text_shift_offset(), Some(2));
		assert_eq!(table.resolve_row(PaletteRow::Text(1)), 3);
		assert_eq!(table.row(4), None);
	}

	#[test]
	fn test_resolve_row() {
		let table = PaletteTable::load(
			&Palette::grayscale(),
			&[
				TransformGroup::new("a", vec![[0; 256]; 2]),
				TransformGroup::new(groups::TEXT_COLOR_SHIFTS, vec![[0; 256]; 2]),
			],
		);
		assert_eq!(table.resolve_row(PaletteRow::Shift(2)), 2);
		assert_eq!(table.resolve_row(PaletteRow::Shift(99)), 4);
		assert_eq!(table.resolve_row(PaletteRow::Text(1)), 3);
		assert_eq!(table.resolve_row(PaletteRow::Text(2)), 4);
		assert_eq!(table.resolve_row(PaletteRow::Text(9)), 4);
		assert_eq!(table.row_uniform(PaletteRow::Shift(0)), 0.0);
		assert_eq!(table.row_uniform(PaletteRow::Shift(2)), 0.5);
		assert_eq!(table.row_uniform(PaletteRow::Text(1)), 0.75);
	}

	#[test]
	fn test_from_pl2_layout() {
		let pl2 = Pl2File::identity(Palette::grayscale());
		let table = PaletteTable::from_pl2(&pl2);
		assert_eq!(table.transform_count(), 1 + 32 + 16 + 1 + 111 + 3 + 14 + 256 + 1 + 13);
		assert_eq!(table.group_offset(groups::LIGHT_LEVELS), Some(1));
		assert_eq!(table.group_offset(groups::SELECTED_UNIT), Some(49));
		assert_eq!(table.group_offset(groups::DARKENED_COLOR_SHIFT), Some(434));
		assert_eq!(table.group_offset(groups::TEXT_COLOR_SHIFTS), Some(435));
		assert_eq!(table.text_shift_offset(), Some(434));
		assert_eq!(table.as_bytes()[3], 0);
	}

	#[test]
	fn test_pl2_text_colours_are_one_based() {
		let mut pl2 = Pl2File::identity(Palette::grayscale());
		for (i, shift) in pl2.text_color_shifts.iter_mut().enumerate() {
			*shift = [i as u8 + 100; 256];
		}
		let table = PaletteTable::from_pl2(&pl2);

		assert_eq!(table.resolve_row(PaletteRow::Text(1)), 435);
		assert_eq!(table.resolve_row(PaletteRow::Text(7)), 441);
		assert_eq!(table.resolve_row(PaletteRow::Text(13)), 447);
		assert_eq!(table.resolve_row(PaletteRow::Text(13)), table.transform_count() - 1);
		assert_eq!(table.color(table.resolve_row(PaletteRow::Text(1)), 5), Some(Color::new(100, 100, 100, 255)));
		assert_eq!(table.color(table.resolve_row(PaletteRow::Text(13)), 5), Some(Color::new(112, 112, 112, 255)));
	}
}
