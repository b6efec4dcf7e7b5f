//! Loading, playback and texture residency.

use palsprite_rs::prelude::*;

use crate::fixtures::{PALETTE, WALK_PATH, loader, palettes};

fn walk_sprite() -> (Sprite, PaletteRegistry) {
	let loader = loader();
	let palettes = palettes(&loader);
	let sprite = Sprite::load(&loader, WALK_PATH, PALETTE, &palettes, &RenderConfig::default()).unwrap();
	(sprite, palettes)
}

#[test]
fn test_loaded_geometry() {
	let (sprite, _) = walk_sprite();
	assert_eq!(sprite.sequence_count(), 3);
	assert_eq!(sprite.frame_count(), 4);
	assert_eq!(sprite.frame_width(1, 0, 1), 8);
	assert_eq!(sprite.frame_width(1, 0, 3), 8 + 9 + 10);
	assert_eq!(sprite.frame_height(2, 0, 2, 2), 8);
	assert_eq!(sprite.asset().format(), SpriteFormat::Dc6);
}

#[test]
fn test_load_errors() {
	let loader = loader();
	let palettes = palettes(&loader);
	let config = RenderConfig::default();

	let err = Sprite::load(&loader, "/data/global/ui/panel.pcx", PALETTE, &palettes, &config).unwrap_err();
	assert!(err.is_unsupported_format());

	let err = Sprite::load(&loader, "/data/global/ui/broken.dcc", PALETTE, &palettes, &config).unwrap_err();
	assert!(err.is_corrupt_data());

	let err = Sprite::load(&loader, WALK_PATH, "act2", &palettes, &config).unwrap_err();
	assert!(matches!(err, SpriteError::PaletteNotFound(_)));
}

#[test]
fn test_play_one_pass_per_second() {
	let (mut sprite, _) = walk_sprite();
	let mut backend = HeadlessBackend::new();
	sprite.play_forward();

	let mut seen = Vec::new();
	for _ in 0..8 {
		sprite.update(0.125, &mut backend);
		seen.push(sprite.current_frame());
	}
	assert_eq!(seen, vec![0, 1, 1, 2, 2, 3, 3, 0]);
	assert_eq!(sprite.played_count(), 1);
	assert_eq!(backend.upload_count(), 4);
}

#[test]
fn test_intro_then_sub_loop() {
	let (mut sprite, _) = walk_sprite();
	let mut backend = HeadlessBackend::new();
	sprite.set_play_length(0.5);
	sprite.set_sub_loop(2, 4).unwrap();
	sprite.play_forward();

	let mut seen = Vec::new();
	for _ in 0..10 {
		sprite.update(0.125, &mut backend);
		seen.push(sprite.current_frame());
	}
	assert_eq!(seen, vec![1, 2, 3, 2, 3, 2, 3, 2, 3, 2]);
}

#[test_log::test]
fn test_sequence_switch_mid_animation() {
	let (mut sprite, _) = walk_sprite();
	let mut backend = HeadlessBackend::new();
	sprite.play_forward();
	for _ in 0..2 {
		sprite.update(0.25, &mut backend);
	}
	let cached = sprite.textures().occupied();
	assert_eq!(cached, 3);

	sprite.set_sequence(2, &mut backend).unwrap();
	assert_eq!(backend.release_count(), cached);
	assert_eq!(sprite.textures().len(), sprite.frame_count());
	assert_eq!(sprite.current_frame(), 0);

	sprite.update(0.25, &mut backend);
	let texture = sprite.textures().get(1).unwrap();
	assert_eq!(backend.texture(texture.handle).unwrap().bytes[0], 22);
}

#[test]
fn test_cell_grid_texture() {
	let (mut sprite, _) = walk_sprite();
	let mut backend = HeadlessBackend::new();
	sprite.set_cell_size(2, 2, &mut backend).unwrap();
	sprite.update(0.0, &mut backend);

	let texture = sprite.textures().get(0).unwrap();
	assert_eq!((texture.width, texture.height), (17, 8));
	let data = backend.texture(texture.handle).unwrap();
	let at = |x: usize, y: usize| data.bytes[y * 17 + x];
	assert_eq!(at(0, 0), 1);
	assert_eq!(at(8, 0), 2);
	assert_eq!(at(0, 4), 3);
	assert_eq!(at(10, 7), 4);
	assert_eq!(at(16, 0), 2);
}
