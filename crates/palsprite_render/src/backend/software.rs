//! CPU rasterizer backend.

use std::collections::HashMap;

use image::{Rgba, RgbaImage};
use log::{trace, warn};

use super::{GpuBackend, HandleAllocator, TextureHandle};
use crate::blend::BlendMode;
use crate::error::RenderError;

#[derive(Debug, Clone)]
enum Texture {
	Indexed {
		width: u32,
		height: u32,
		pixels: Vec<u8>,
	},
	Palette {
		rows: usize,
		rgba: Vec<u8>,
	},
}

/// Rasterizes palette-indexed quads into an RGBA image.
///
/// Index textures are resolved through the bound palette row at draw time, the
/// same lookup a palette shader performs. Fully transparent palette entries
/// are discarded before blending.
#[derive(Debug, Clone)]
pub struct SoftwareBackend {
	handles: HandleAllocator,
	textures: HashMap<TextureHandle, Texture>,
	palette: Option<(TextureHandle, f32)>,
	blend_mode: BlendMode,
	target: RgbaImage,
}

impl SoftwareBackend {
	/// Creates a backend drawing into a transparent `width × height` image.
	pub fn new(width: u32, height: u32) -> Self {
		Self {
			handles: HandleAllocator::default(),
			textures: HashMap::new(),
			palette: None,
			blend_mode: BlendMode::None,
			target: RgbaImage::new(width, height),
		}
	}

	/// The render target.
	pub fn target(&self) -> &RgbaImage {
		&self.target
	}

	/// Consumes the backend and returns the render target.
	pub fn into_target(self) -> RgbaImage {
		self.target
	}

	/// Fills the render target with one color.
	pub fn clear(&mut self, color: [u8; 4]) {
		for pixel in self.target.pixels_mut() {
			*pixel = Rgba(color);
		}
	}

	/// Active blend mode.
	pub fn blend_mode(&self) -> BlendMode {
		self.blend_mode
	}

	/// Number of live textures, palettes included.
	pub fn live_textures(&self) -> usize {
		self.textures.len()
	}

	/// Resolves the bound palette row into 256 RGBA entries.
	fn bound_row(&self) -> Option<&[u8]> {
		let (handle, offset) = self.palette?;
		let Some(Texture::Palette {
			rows,
			rgba,
		}) = self.textures.get(&handle)
		else {
			return None;
		};
		let last = rows.saturating_sub(1);
		let row = ((offset.clamp(0.0, 1.0) * last as f32).round() as usize).min(last);
		rgba.get(row * 1024..(row + 1) * 1024)
	}
}

/// Blends `src` over `dst` with the fixed-function equation of `mode`.
pub(crate) fn blend_pixel(mode: BlendMode, src: [u8; 4], dst: [u8; 4]) -> [u8; 4] {
	let a = u32::from(src[3]);
	let inv = 255 - a;
	let mut out = [0u8; 4];
	for c in 0..3 {
		let s = u32::from(src[c]);
		let d = u32::from(dst[c]);
		out[c] = match mode {
			BlendMode::None | BlendMode::Alpha => (s * a + d * inv) / 255,
			BlendMode::Additive => (d + s * a / 255).min(255),
			BlendMode::Multiplied => (s * d / 255 + d * inv / 255).min(255),
			BlendMode::AddColors => (s + d).min(255),
			BlendMode::SubtractColors => s.saturating_sub(d),
		} as u8;
	}
	out[3] = match mode {
		BlendMode::None | BlendMode::Alpha | BlendMode::Multiplied => {
			(a + u32::from(dst[3]) * inv / 255).min(255) as u8
		}
		BlendMode::Additive | BlendMode::AddColors => (a + u32::from(dst[3])).min(255) as u8,
		BlendMode::SubtractColors => a.saturating_sub(u32::from(dst[3])) as u8,
	};
	out
}

impl GpuBackend for SoftwareBackend {
	fn upload_texture(&mut self, width: u32, height: u32, pixels: &[u8]) -> Result<TextureHandle, RenderError> {
		if pixels.len() != width as usize * height as usize {
			return Err(RenderError::TextureAllocation {
				width,
				height,
			});
		}
		let handle = self.handles.allocate();
		self.textures.insert(
			handle,
			Texture::Indexed {
				width,
				height,
				pixels: pixels.to_vec(),
			},
		);
		trace!("software: upload {width}x{height} as {handle}");
		Ok(handle)
	}

	fn upload_palette_texture(&mut self, rows: usize, rgba: &[u8]) -> Result<TextureHandle, RenderError> {
		if rgba.len() != rows * 1024 {
			return Err(RenderError::TextureAllocation {
				width: 256,
				height: rows as u32,
			});
		}
		let handle = self.handles.allocate();
		self.textures.insert(
			handle,
			Texture::Palette {
				rows,
				rgba: rgba.to_vec(),
			},
		);
		Ok(handle)
	}

	fn release_texture(&mut self, handle: TextureHandle) {
		self.textures.remove(&handle);
		if self.palette.is_some_and(|(bound, _)| bound == handle) {
			self.palette = None;
		}
	}

	fn bind_palette_texture(&mut self, handle: TextureHandle, row_offset: f32) {
		self.palette = Some((handle, row_offset));
	}

	fn set_blend_mode(&mut self, mode: BlendMode) {
		self.blend_mode = mode;
	}

	fn draw_quad(&mut self, handle: TextureHandle, x: i32, y: i32) {
		let Some(Texture::Indexed {
			width,
			height,
			pixels,
		}) = self.textures.get(&handle)
		else {
			warn!("software: draw of unknown texture {handle}");
			return;
		};
		let Some(row) = self.bound_row() else {
			warn!("software: draw of {handle} without a bound palette");
			return;
		};

		let (target_w, target_h) = (self.target.width() as i64, self.target.height() as i64);
		let mut writes = Vec::new();
		for ty in 0..*height {
			let py = i64::from(y) + i64::from(ty);
			if py < 0 || py >= target_h {
				continue;
			}
			for tx in 0..*width {
				let px = i64::from(x) + i64::from(tx);
				if px < 0 || px >= target_w {
					continue;
				}
				let index = pixels[(ty * width + tx) as usize] as usize;
				let src = [row[index * 4], row[index * 4 + 1], row[index * 4 + 2], row[index * 4 + 3]];
				if src[3] == 0 {
					continue;
				}
				writes.push((px as u32, py as u32, src));
			}
		}

		let mode = self.blend_mode;
		for (px, py, src) in writes {
			let dst = self.target.get_pixel(px, py).0;
			self.target.put_pixel(px, py, Rgba(blend_pixel(mode, src, dst)));
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn palette_rows() -> Vec<u8> {
		// row 0: index i -> (i, 0, 0); row 1: index i -> (0, i, 0); index 0 transparent
		let mut rgba = vec![0u8; 2 * 1024];
		for i in 0..256 {
			rgba[i * 4..i * 4 + 4].copy_from_slice(&[i as u8, 0, 0, 255]);
			rgba[1024 + i * 4..1024 + i * 4 + 4].copy_from_slice(&[0, i as u8, 0, 255]);
		}
		rgba[3] = 0;
		rgba[1024 + 3] = 0;
		rgba
	}

	#[test]
	fn test_draw_through_palette_row() {
		let mut backend = SoftwareBackend::new(4, 4);
		let palette = backend.upload_palette_texture(2, &palette_rows()).unwrap();
		let texture = backend.upload_texture(2, 1, &[0, 200]).unwrap();

		backend.bind_palette_texture(palette, 0.0);
		backend.draw_quad(texture, 1, 1);
		assert_eq!(backend.target().get_pixel(1, 1).0, [0, 0, 0, 0]);
		assert_eq!(backend.target().get_pixel(2, 1).0, [200, 0, 0, 255]);

		backend.bind_palette_texture(palette, 1.0);
		backend.draw_quad(texture, 2, 2);
		assert_eq!(backend.target().get_pixel(3, 2).0, [0, 200, 0, 255]);
	}

	#[test]
	fn test_clipping() {
		let mut backend = SoftwareBackend::new(2, 2);
		let palette = backend.upload_palette_texture(2, &palette_rows()).unwrap();
		let texture = backend.upload_texture(3, 3, &[9; 9]).unwrap();
		backend.bind_palette_texture(palette, 0.0);
		backend.draw_quad(texture, -2, 1);
		assert_eq!(backend.target().get_pixel(0, 1).0, [9, 0, 0, 255]);
		assert_eq!(backend.target().get_pixel(1, 1).0, [0, 0, 0, 0]);
	}

	#[test]
	fn test_blend_equations() {
		let src = [100, 50, 0, 255];
		let dst = [100, 100, 100, 255];
		assert_eq!(blend_pixel(BlendMode::Alpha, src, dst), [100, 50, 0, 255]);
		assert_eq!(blend_pixel(BlendMode::AddColors, src, dst), [200, 150, 100, 255]);
		assert_eq!(blend_pixel(BlendMode::SubtractColors, src, dst), [0, 0, 0, 0]);
		assert_eq!(blend_pixel(BlendMode::Multiplied, [255, 0, 128, 255], dst), [100, 0, 50, 255]);
		assert_eq!(blend_pixel(BlendMode::Additive, [100, 0, 0, 128], [100, 0, 0, 0]), [150, 0, 0, 128]);
	}

	#[test]
	fn test_mismatched_upload_fails() {
		let mut backend = SoftwareBackend::new(1, 1);
		assert!(backend.upload_texture(2, 2, &[0; 3]).unwrap_err().is_recoverable());
	}
}
