//! GPU backend abstraction.
//!
//! The renderer needs very little from a GPU: single-channel textures holding
//! palette indices, one RGBA lookup texture per palette, a way to select the
//! palette row, blend-mode switches and textured quads. [`GpuBackend`] is that
//! surface. Backends are picked once at startup through [`BackendKind`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::blend::BlendMode;
use crate::config::RenderConfig;
use crate::error::RenderError;

mod headless;
mod software;

pub use headless::{BackendCall, HeadlessBackend, TextureData};
pub use software::SoftwareBackend;

/// Opaque id of a texture owned by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(u32);

impl TextureHandle {
	/// Wraps a raw backend id.
	pub const fn new(id: u32) -> Self {
		Self(id)
	}

	/// Raw backend id.
	#[inline]
	pub const fn id(&self) -> u32 {
		self.0
	}
}

impl fmt::Display for TextureHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// The minimal GPU surface used by the renderer.
pub trait GpuBackend {
	/// Uploads a single-channel texture of palette indices.
	///
	/// # Errors
	///
	/// Returns `TextureAllocation` if the backend is out of texture memory.
	fn upload_texture(&mut self, width: u32, height: u32, pixels: &[u8]) -> Result<TextureHandle, RenderError>;

	/// Uploads a `256 × rows` RGBA palette lookup texture.
	fn upload_palette_texture(&mut self, rows: usize, rgba: &[u8]) -> Result<TextureHandle, RenderError>;

	/// Frees a texture. Unknown handles are ignored.
	fn release_texture(&mut self, handle: TextureHandle);

	/// Binds a palette texture and the normalized row used by following draws.
	fn bind_palette_texture(&mut self, handle: TextureHandle, row_offset: f32);

	/// Switches the blend mode for following draws.
	fn set_blend_mode(&mut self, mode: BlendMode);

	/// Draws an index texture with its top-left corner at `(x, y)`.
	fn draw_quad(&mut self, handle: TextureHandle, x: i32, y: i32);
}

/// Backends available at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
	/// Records calls without drawing
	#[default]
	Headless,
	/// Rasterizes into an in-memory RGBA image
	Software,
}

/// Creates the backend selected by `config`.
pub fn create(config: &RenderConfig) -> Box<dyn GpuBackend> {
	match config.backend {
		BackendKind::Headless => Box::new(HeadlessBackend::new()),
		BackendKind::Software => Box::new(SoftwareBackend::new(config.screen_width, config.screen_height)),
	}
}

/// Sequential handle source shared by the bundled backends.
#[derive(Debug, Clone, Default)]
pub(crate) struct HandleAllocator {
	next: u32,
}

impl HandleAllocator {
	pub(crate) fn allocate(&mut self) -> TextureHandle {
		self.next += 1;
		TextureHandle(self.next)
	}
}
