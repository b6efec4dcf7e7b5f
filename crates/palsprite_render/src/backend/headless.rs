//! Backend that keeps textures in memory and records every call.

use std::collections::HashMap;

use log::trace;

use super::{GpuBackend, HandleAllocator, TextureHandle};
use crate::blend::BlendMode;
use crate::error::RenderError;

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
	/// `upload_texture`
	UploadTexture {
		/// Returned handle
		handle: TextureHandle,
		/// Texture width
		width: u32,
		/// Texture height
		height: u32,
	},
	/// `upload_palette_texture`
	UploadPalette {
		/// Returned handle
		handle: TextureHandle,
		/// Palette rows
		rows: usize,
	},
	/// `release_texture`
	Release(TextureHandle),
	/// `bind_palette_texture`
	BindPalette {
		/// Palette texture
		handle: TextureHandle,
		/// Normalized row
		row_offset: f32,
	},
	/// `set_blend_mode`
	SetBlendMode(BlendMode),
	/// `draw_quad`
	DrawQuad {
		/// Drawn texture
		handle: TextureHandle,
		/// Left edge
		x: i32,
		/// Top edge
		y: i32,
	},
}

/// Contents of an uploaded texture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureData {
	/// Width in texels
	pub width: u32,
	/// Height in texels
	pub height: u32,
	/// Raw bytes as uploaded
	pub bytes: Vec<u8>,
}

/// A backend with no output device.
///
/// Useful for tools and tests: it hands out handles, keeps uploaded data for
/// inspection and logs every call. An optional budget caps the number of live
/// textures to exercise allocation failures.
#[derive(Debug, Clone, Default)]
pub struct HeadlessBackend {
	handles: HandleAllocator,
	textures: HashMap<TextureHandle, TextureData>,
	calls: Vec<BackendCall>,
	texture_budget: Option<usize>,
}

impl HeadlessBackend {
	/// Creates a backend without a texture budget.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a backend that fails uploads once `budget` textures are live.
	pub fn with_texture_budget(budget: usize) -> Self {
		Self {
			texture_budget: Some(budget),
			..Self::default()
		}
	}

	/// Every call since creation or the last [`clear_calls`](Self::clear_calls).
	pub fn calls(&self) -> &[BackendCall] {
		&self.calls
	}

	/// Forgets recorded calls.
	pub fn clear_calls(&mut self) {
		self.calls.clear();
	}

	/// Data of a live texture.
	pub fn texture(&self, handle: TextureHandle) -> Option<&TextureData> {
		self.textures.get(&handle)
	}

	/// Number of live textures, palettes included.
	pub fn live_textures(&self) -> usize {
		self.textures.len()
	}

	/// Number of recorded `release_texture` calls.
	pub fn release_count(&self) -> usize {
		self.count(|call| matches!(call, BackendCall::Release(_)))
	}

	/// Number of recorded `draw_quad` calls.
	pub fn draw_count(&self) -> usize {
		self.count(|call| matches!(call, BackendCall::DrawQuad { .. }))
	}

	/// Number of recorded `set_blend_mode` calls.
	pub fn blend_switch_count(&self) -> usize {
		self.count(|call| matches!(call, BackendCall::SetBlendMode(_)))
	}

	/// Number of recorded `upload_texture` calls.
	pub fn upload_count(&self) -> usize {
		self.count(|call| matches!(call, BackendCall::UploadTexture { .. }))
	}

	fn count(&self, predicate: impl Fn(&BackendCall) -> bool) -> usize {
		self.calls.iter().filter(|call| predicate(call)).count()
	}

	fn allocate(&mut self, width: u32, height: u32, bytes: &[u8]) -> Result<TextureHandle, RenderError> {
		if self.texture_budget.is_some_and(|budget| self.textures.len() >= budget) {
			return Err(RenderError::TextureAllocation {
				width,
				height,
			});
		}
		let handle = self.handles.allocate();
		self.textures.insert(
			handle,
			TextureData {
				width,
				height,
				bytes: bytes.to_vec(),
			},
		);
		Ok(handle)
	}
}

impl GpuBackend for HeadlessBackend {
	fn upload_texture(&mut self, width: u32, height: u32, pixels: &[u8]) -> Result<TextureHandle, RenderError> {
		let handle = self.allocate(width, height, pixels)?;
		trace!("headless: upload {width}x{height} as {handle}");
		self.calls.push(BackendCall::UploadTexture {
			handle,
			width,
			height,
		});
		Ok(handle)
	}

	fn upload_palette_texture(&mut self, rows: usize, rgba: &[u8]) -> Result<TextureHandle, RenderError> {
		let handle = self.allocate(256, rows as u32, rgba)?;
		trace!("headless: upload palette with {rows} rows as {handle}");
		self.calls.push(BackendCall::UploadPalette {
			handle,
			rows,
		});
		Ok(handle)
	}

	fn release_texture(&mut self, handle: TextureHandle) {
		self.textures.remove(&handle);
		self.calls.push(BackendCall::Release(handle));
	}

	fn bind_palette_texture(&mut self, handle: TextureHandle, row_offset: f32) {
		self.calls.push(BackendCall::BindPalette {
			handle,
			row_offset,
		});
	}

	fn set_blend_mode(&mut self, mode: BlendMode) {
		self.calls.push(BackendCall::SetBlendMode(mode));
	}

	fn draw_quad(&mut self, handle: TextureHandle, x: i32, y: i32) {
		self.calls.push(BackendCall::DrawQuad {
			handle,
			x,
			y,
		});
	}
}
