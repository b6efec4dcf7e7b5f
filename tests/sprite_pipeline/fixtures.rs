//! In-process sprite and palette fixtures.

use palsprite_rs::prelude::*;

/// Palette name used by every fixture.
pub const PALETTE: &str = "units";

/// Asset path served by [`loader`].
pub const WALK_PATH: &str = "/data/global/monsters/walk.dc6";

/// A 3-direction DC6: direction `d` has 4 frames of `(8 + f) × 4` pixels,
/// filled with index `d * 10 + f + 1`, offset `(f, -4)`.
pub fn walk_dc6() -> Vec<u8> {
	let directions = (0..3u8)
		.map(|d| {
			(0..4u8)
				.map(|f| {
					let width = 8 + u32::from(f);
					let pixels = vec![d * 10 + f + 1; width as usize * 4];
					file::dc6::Frame::new(width, 4, i32::from(f), -4, pixels).unwrap()
				})
				.collect()
		})
		.collect();
	Dc6File::from_directions(directions).unwrap().to_bytes()
}

/// Base palette where index `i` is `(i, 255 - i, 0)`. The first light level
/// (table row 1) maps every index to 200; all other transforms are identity.
pub fn pl2_bytes() -> Vec<u8> {
	let mut base = Palette::new();
	for i in 0..=255u8 {
		base.set(i, Color::rgb(i, 255 - i, 0));
	}
	let mut pl2 = Pl2File::identity(base);
	pl2.light_levels[0] = [200; 256];
	pl2.to_bytes()
}

/// A loader serving the walk sprite and the palette.
pub fn loader() -> MemoryLoader {
	MemoryLoader::new()
		.with(WALK_PATH, walk_dc6())
		.with("/data/global/palette/units/pal.pl2", pl2_bytes())
		.with("/data/global/ui/broken.dcc", vec![0x74, 0, 1])
}

/// A registry holding [`PALETTE`].
pub fn palettes(loader: &MemoryLoader) -> PaletteRegistry {
	let mut registry = PaletteRegistry::new();
	registry.load_from(loader, PALETTE, "/data/global/palette/units/pal.pl2").unwrap();
	registry
}
