//! Drawing through the headless and software backends.

use palsprite_rs::palsprite_render::backend::BackendCall;
use palsprite_rs::prelude::*;

use crate::fixtures::{PALETTE, WALK_PATH, loader, palettes};

fn walk_sprite(palettes: &PaletteRegistry) -> Sprite {
	Sprite::load(&loader(), WALK_PATH, PALETTE, palettes, &RenderConfig::default()).unwrap()
}

#[test]
fn test_palette_uploaded_once_across_sprites() {
	let palettes = palettes(&loader());
	let mut backend = HeadlessBackend::new();
	let mut renderer = Renderer::new();
	let mut a = walk_sprite(&palettes);
	let mut b = walk_sprite(&palettes);
	b.set_sequence(1, &mut backend).unwrap();

	let mut ctx = RenderContext::new(&mut backend, &mut renderer, &palettes);
	for _ in 0..3 {
		assert_eq!(a.render((0, 0), &mut ctx).unwrap(), DrawOutcome::Drawn);
		assert_eq!(b.render((40, 0), &mut ctx).unwrap(), DrawOutcome::Drawn);
	}

	let palette_uploads = backend.calls().iter().filter(|call| matches!(call, BackendCall::UploadPalette { .. })).count();
	assert_eq!(palette_uploads, 1);
	assert_eq!(backend.upload_count(), 2);
	assert_eq!(backend.draw_count(), 6);
}

#[test]
fn test_equal_blend_modes_are_coalesced() {
	let palettes = palettes(&loader());
	let mut backend = HeadlessBackend::new();
	let mut renderer = Renderer::new();
	let mut sprite = walk_sprite(&palettes);

	let mut ctx = RenderContext::new(&mut backend, &mut renderer, &palettes);
	for _ in 0..5 {
		sprite.render((0, 0), &mut ctx).unwrap();
	}
	assert_eq!(backend.blend_switch_count(), 0);

	sprite.set_blend_mode(BlendMode::AddColors);
	let mut ctx = RenderContext::new(&mut backend, &mut renderer, &palettes);
	sprite.render((0, 0), &mut ctx).unwrap();
	assert_eq!(backend.blend_switch_count(), 2);
	assert_eq!(renderer.blend_mode(), BlendMode::None);
}

#[test]
fn test_software_pixels_follow_palette_row() {
	let palettes = palettes(&loader());
	let mut backend = SoftwareBackend::new(32, 16);
	let mut renderer = Renderer::new();
	let mut sprite = walk_sprite(&palettes);

	let mut ctx = RenderContext::new(&mut backend, &mut renderer, &palettes);
	sprite.render((0, 4), &mut ctx).unwrap();
	assert_eq!(backend.target().get_pixel(0, 0).0, [1, 254, 0, 255]);
	assert_eq!(backend.target().get_pixel(8, 0).0, [0, 0, 0, 0]);

	sprite.set_palette_shift(1);
	let mut ctx = RenderContext::new(&mut backend, &mut renderer, &palettes);
	sprite.render((0, 12), &mut ctx).unwrap();
	assert_eq!(backend.target().get_pixel(3, 8).0, [200, 55, 0, 255]);
}

#[test]
fn test_software_additive_blend() {
	let palettes = palettes(&loader());
	let mut backend = SoftwareBackend::new(16, 8);
	backend.clear([10, 10, 10, 255]);
	let mut renderer = Renderer::new();
	let mut sprite = walk_sprite(&palettes);
	sprite.set_blend_mode(BlendMode::Additive);

	let mut ctx = RenderContext::new(&mut backend, &mut renderer, &palettes);
	sprite.render((0, 4), &mut ctx).unwrap();
	assert_eq!(backend.target().get_pixel(2, 2).0, [11, 255, 10, 255]);
	assert_eq!(backend.target().get_pixel(12, 2).0, [10, 10, 10, 255]);
	assert_eq!(backend.blend_mode(), BlendMode::None);
}

#[test]
fn test_bottom_origin_and_pointer() {
	let palettes = palettes(&loader());
	let mut backend = HeadlessBackend::new();
	let mut renderer = Renderer::new();
	let mut sprite = walk_sprite(&palettes);
	sprite.set_bottom_origin(true);

	let mut ctx = RenderContext::new(&mut backend, &mut renderer, &palettes);
	sprite.render((100, 200), &mut ctx).unwrap();
	assert!(backend.calls().contains(&BackendCall::DrawQuad {
		handle: sprite.textures().get(0).unwrap().handle,
		x: 100,
		y: 192,
	}));

	let events = sprite.handle_pointer((100, 200), PointerInput::new(104, 202, true));
	assert_eq!(events, vec![PointerEvent::Press, PointerEvent::Hover]);
	let events = sprite.handle_pointer((100, 200), PointerInput::new(104, 202, false));
	assert_eq!(events, vec![PointerEvent::Release]);
}
