//! Benchmark helper utilities for palsprite-rs
//!
//! Generates synthetic sprite data. Pixels are seeded noise with runs of
//! transparent index 0, so the DC6 encoder produces a realistic mix of skip
//! and literal runs.

use palsprite_types::file::{Dc6File, Palette, Pl2File, dc6};
use palsprite_types::sprite::{Frame, Sequence, SpriteAsset, SpriteFormat};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Seed shared by every generator so runs are comparable.
pub const SEED: u64 = 0x5eed_d6cc;

/// Generates `width * height` palette indices, roughly a third transparent.
pub fn noise_pixels(rng: &mut SmallRng, width: u32, height: u32) -> Vec<u8> {
	let mut pixels = Vec::with_capacity(width as usize * height as usize);
	while pixels.len() < width as usize * height as usize {
		let run = rng.random_range(1..=12usize);
		let index = if rng.random_bool(0.33) { 0 } else { rng.random_range(1..=255u8) };
		pixels.extend(std::iter::repeat_n(index, run));
	}
	pixels.truncate(width as usize * height as usize);
	pixels
}

/// Generates an encoded DC6 file with `directions × frames` noise frames.
pub fn generate_dc6(directions: usize, frames: usize, width: u32, height: u32) -> Vec<u8> {
	let mut rng = SmallRng::seed_from_u64(SEED);
	let directions = (0..directions)
		.map(|_| {
			(0..frames)
				.filter_map(|_| dc6::Frame::new(width, height, 0, 0, noise_pixels(&mut rng, width, height)).ok())
				.collect()
		})
		.collect();
	Dc6File::from_directions(directions).map(|file| file.to_bytes()).unwrap_or_default()
}

/// Generates a single-sequence asset of `frames` noise frames.
pub fn generate_asset(frames: usize, width: u32, height: u32) -> SpriteAsset {
	let mut rng = SmallRng::seed_from_u64(SEED);
	let frames = (0..frames)
		.filter_map(|_| Frame::new(width, height, 0, 0, noise_pixels(&mut rng, width, height)).ok())
		.collect();
	SpriteAsset::new(SpriteFormat::Dc6, vec![Sequence::new(frames)])
}

/// Generates a PL2 file with shuffled transforms.
pub fn generate_pl2() -> Pl2File {
	let mut rng = SmallRng::seed_from_u64(SEED);
	let mut pl2 = Pl2File::identity(Palette::grayscale());
	for table in pl2.hue_variations.iter_mut().chain(pl2.light_levels.iter_mut()) {
		for entry in table.iter_mut() {
			*entry = rng.random();
		}
	}
	pl2
}

/// Common benchmark sizes
pub mod sizes {
	/// Cursor sized frame
	pub const CURSOR: (u32, u32) = (32, 32);
	/// Inventory panel cell
	pub const PANEL_CELL: (u32, u32) = (256, 256);
	/// Full screen background cell
	pub const SCREEN: (u32, u32) = (800, 600);
}

#[cfg(test)]
mod tests {
	use palsprite_types::sprite::SequenceProvider;

	use super::*;

	#[test]
	fn test_generate_dc6_decodes() {
		let data = generate_dc6(2, 3, 16, 8);
		let asset = SpriteAsset::decode(&data, SpriteFormat::Dc6).unwrap();
		assert_eq!(asset.sequence_count(), 2);
		assert_eq!(asset.frame_count(1), 3);
		assert_eq!(asset.frame_width(0, 2, 1), 16);
	}

	#[test]
	fn test_generators_are_deterministic() {
		assert_eq!(generate_dc6(1, 2, 10, 10), generate_dc6(1, 2, 10, 10));
		assert_eq!(generate_asset(2, 4, 4), generate_asset(2, 4, 4));
	}
}
