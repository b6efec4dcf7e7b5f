//! Draw submission: palette textures, row uniforms and scoped blend modes.

use std::collections::HashMap;

use log::{debug, trace};

use crate::backend::{GpuBackend, TextureHandle};
use crate::blend::{BlendMode, BlendState};
use crate::error::RenderError;
use crate::palette::{PaletteRegistry, PaletteRow};

/// One textured quad to draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawRequest<'a> {
	/// Index texture
	pub texture: TextureHandle,
	/// Left edge
	pub x: i32,
	/// Top edge
	pub y: i32,
	/// Registered palette name
	pub palette: &'a str,
	/// Palette row
	pub row: PaletteRow,
	/// Blend mode for this draw only
	pub blend: BlendMode,
}

/// Backend-side state shared by every draw: uploaded palette textures and the
/// active blend mode.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
	blend: BlendState,
	palette_textures: HashMap<String, TextureHandle>,
}

impl Renderer {
	/// Creates a renderer with no palettes uploaded.
	pub fn new() -> Self {
		Self::default()
	}

	/// Mode the backend is currently in.
	pub fn blend_mode(&self) -> BlendMode {
		self.blend.current()
	}

	/// Blend calls issued so far.
	pub fn blend_switches(&self) -> usize {
		self.blend.switches()
	}

	/// Palette texture uploaded for `name`, if any.
	pub fn palette_texture(&self, name: &str) -> Option<TextureHandle> {
		self.palette_textures.get(name).copied()
	}

	/// Uploads the palette texture of `name` on first use.
	///
	/// # Errors
	///
	/// Returns `PaletteNotFound` if `name` is not registered, or the
	/// backend's allocation error.
	pub fn ensure_palette(
		&mut self,
		backend: &mut dyn GpuBackend,
		palettes: &PaletteRegistry,
		name: &str,
	) -> Result<TextureHandle, RenderError> {
		if let Some(handle) = self.palette_textures.get(name) {
			return Ok(*handle);
		}
		let table = palettes.get(name).ok_or_else(|| RenderError::PaletteNotFound(name.to_owned()))?;
		let handle = backend.upload_palette_texture(table.transform_count(), table.as_bytes())?;
		debug!("Uploaded palette {name} as {handle}");
		self.palette_textures.insert(name.to_owned(), handle);
		Ok(handle)
	}

	/// Draws one quad.
	///
	/// The request's blend mode is active for this draw only; the previous
	/// mode is restored afterwards.
	///
	/// # Errors
	///
	/// Fails if the palette is unknown or cannot be uploaded. Nothing is drawn.
	pub fn draw(
		&mut self,
		backend: &mut dyn GpuBackend,
		palettes: &PaletteRegistry,
		request: &DrawRequest<'_>,
	) -> Result<(), RenderError> {
		let table = palettes
			.get(request.palette)
			.ok_or_else(|| RenderError::PaletteNotFound(request.palette.to_owned()))?;
		let palette = self.ensure_palette(backend, palettes, request.palette)?;

		let row_offset = table.row_uniform(request.row);
		backend.bind_palette_texture(palette, row_offset);

		let previous = self.blend.current();
		self.blend.apply(backend, request.blend);
		backend.draw_quad(request.texture, request.x, request.y);
		self.blend.apply(backend, previous);

		trace!("drew {} at ({}, {}) row {row_offset}", request.texture, request.x, request.y);
		Ok(())
	}

	/// Draws a text glyph tinted with text colour `color`.
	pub fn draw_glyph(
		&mut self,
		backend: &mut dyn GpuBackend,
		palettes: &PaletteRegistry,
		texture: TextureHandle,
		position: (i32, i32),
		palette: &str,
		color: usize,
	) -> Result<(), RenderError> {
		self.draw(
			backend,
			palettes,
			&DrawRequest {
				texture,
				x: position.0,
				y: position.1,
				palette,
				row: PaletteRow::Text(color),
				blend: self.blend.current(),
			},
		)
	}

	/// Releases every palette texture. Returns the number released.
	pub fn release(&mut self, backend: &mut dyn GpuBackend) -> usize {
		let count = self.palette_textures.len();
		for (_, handle) in self.palette_textures.drain() {
			backend.release_texture(handle);
		}
		count
	}
}

/// Everything a sprite needs to draw.
pub struct RenderContext<'a> {
	/// Target backend
	pub backend: &'a mut dyn GpuBackend,
	/// Shared renderer state
	pub renderer: &'a mut Renderer,
	/// Loaded palettes
	pub palettes: &'a PaletteRegistry,
}

impl<'a> RenderContext<'a> {
	/// Bundles the draw collaborators.
	pub fn new(backend: &'a mut dyn GpuBackend, renderer: &'a mut Renderer, palettes: &'a PaletteRegistry) -> Self {
		Self {
			backend,
			renderer,
			palettes,
		}
	}

	/// Draws one quad.
	pub fn draw(&mut self, request: &DrawRequest<'_>) -> Result<(), RenderError> {
		self.renderer.draw(&mut *self.backend, self.palettes, request)
	}
}
