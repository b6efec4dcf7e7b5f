//! Animated, palette-indexed sprites.
//!
//! A [`Sprite`] owns a decoded [`SpriteAsset`], its animation clock and one
//! texture slot per frame of the active sequence. Each tick the host calls
//! [`Sprite::handle_pointer`] (optional), [`Sprite::update`] and then
//! [`Sprite::render`]:
//!
//! ```no_run
//! use palsprite_render::prelude::*;
//! use palsprite_vfs::DirectoryLoader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let loader = DirectoryLoader::new("./assets");
//! let mut palettes = PaletteRegistry::new();
//! palettes.load_from(&loader, "units", "/data/global/palette/units/pal.pl2")?;
//!
//! let config = RenderConfig::default();
//! let mut backend = HeadlessBackend::new();
//! let mut renderer = Renderer::new();
//! let mut sprite = Sprite::load(&loader, "/data/global/ui/cursor.dc6", "units", &palettes, &config)?;
//! sprite.play_forward();
//!
//! sprite.update(1.0 / 60.0, &mut backend);
//! let mut ctx = RenderContext::new(&mut backend, &mut renderer, &palettes);
//! sprite.render((320, 240), &mut ctx)?;
//! # Ok(())
//! # }
//! ```

mod pointer;

pub use pointer::{PointerEvent, PointerInput};

use log::{debug, warn};
use palsprite_types::sprite::{SequenceProvider, SpriteAsset, SpriteFormat};
use palsprite_vfs::AssetLoader;

use crate::animation::{AnimationClock, PlayMode};
use crate::backend::GpuBackend;
use crate::blend::BlendMode;
use crate::compositor::build_frame;
use crate::config::RenderConfig;
use crate::error::{RenderError, SpriteError};
use crate::palette::{PaletteRegistry, PaletteRow};
use crate::renderer::{DrawRequest, RenderContext};
use crate::texture_cache::{Texture, TextureCache};
use pointer::{PointerCallbacks, PointerState, hit_test};

/// Result of [`Sprite::render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawOutcome {
	/// A quad was submitted
	Drawn,
	/// The sprite is invisible
	Hidden,
	/// Nothing to draw: empty frame or texture allocation failed
	Skipped,
}

/// An animated sprite bound to a named palette.
#[derive(Debug)]
pub struct Sprite {
	asset: SpriteAsset,
	palette: String,
	sequence: usize,
	cell_x: usize,
	cell_y: usize,
	clock: AnimationClock,
	textures: TextureCache,
	blend_mode: BlendMode,
	palette_shift: usize,
	bottom_origin: bool,
	visible: bool,
	pointer: PointerState,
	callbacks: PointerCallbacks,
}

impl Sprite {
	/// Creates a sprite with default settings.
	///
	/// # Errors
	///
	/// Returns `PaletteNotFound` if `palette` is not registered.
	pub fn new(asset: SpriteAsset, palette: impl Into<String>, palettes: &PaletteRegistry) -> Result<Self, SpriteError> {
		Self::with_config(asset, palette, palettes, &RenderConfig::default())
	}

	/// Creates a sprite whose playback settings come from `config`.
	///
	/// # Errors
	///
	/// Returns `PaletteNotFound` if `palette` is not registered.
	pub fn with_config(
		asset: SpriteAsset,
		palette: impl Into<String>,
		palettes: &PaletteRegistry,
		config: &RenderConfig,
	) -> Result<Self, SpriteError> {
		let palette = palette.into();
		if !palettes.contains(&palette) {
			return Err(SpriteError::PaletteNotFound(palette));
		}
		let textures = TextureCache::new(asset.frame_count(0));
		debug!(
			"New {} sprite: {} sequences, palette {palette}",
			asset.format(),
			asset.sequence_count()
		);
		Ok(Self {
			asset,
			palette,
			sequence: 0,
			cell_x: 1,
			cell_y: 1,
			clock: AnimationClock::with_defaults(config.default_play_length, config.default_loop),
			textures,
			blend_mode: config.default_blend_mode,
			palette_shift: 0,
			bottom_origin: false,
			visible: true,
			pointer: PointerState::default(),
			callbacks: PointerCallbacks::default(),
		})
	}

	/// Decodes `bytes` and creates a sprite.
	///
	/// # Errors
	///
	/// Fails on malformed bytes or an unknown palette.
	pub fn from_bytes(
		bytes: &[u8],
		format: SpriteFormat,
		palette: impl Into<String>,
		palettes: &PaletteRegistry,
		config: &RenderConfig,
	) -> Result<Self, SpriteError> {
		let asset = SpriteAsset::decode(bytes, format)?;
		Self::with_config(asset, palette, palettes, config)
	}

	/// Loads a `.dc6` or `.dcc` file through `loader`.
	///
	/// # Errors
	///
	/// Returns an unsupported-format error before touching the loader if the
	/// extension is unknown, then any load, decode or palette error.
	pub fn load(
		loader: &dyn AssetLoader,
		path: &str,
		palette: impl Into<String>,
		palettes: &PaletteRegistry,
		config: &RenderConfig,
	) -> Result<Self, SpriteError> {
		let format = SpriteFormat::from_path(path)?;
		let bytes = loader.load(path)?;
		Self::from_bytes(&bytes, format, palette, palettes, config)
	}

	/// The decoded asset.
	#[inline]
	pub fn asset(&self) -> &SpriteAsset {
		&self.asset
	}

	/// Number of sequences.
	#[inline]
	pub fn sequence_count(&self) -> usize {
		self.asset.sequence_count()
	}

	/// Active sequence.
	#[inline]
	pub fn current_sequence(&self) -> usize {
		self.sequence
	}

	/// Switches the active sequence.
	///
	/// Every cached texture is released and the cache is resized to the new
	/// sequence. Playback restarts at frame 0 with a fresh pass count; the
	/// play mode is kept.
	///
	/// # Errors
	///
	/// Returns `InvalidSequence` and changes nothing if `sequence` is out of
	/// range.
	pub fn set_sequence(&mut self, sequence: usize, backend: &mut dyn GpuBackend) -> Result<(), SpriteError> {
		let count = self.asset.sequence_count();
		if sequence >= count {
			return Err(SpriteError::InvalidSequence {
				sequence,
				count,
			});
		}
		let frames = self.asset.frame_count(sequence);
		let released = self.textures.reset(frames, backend);
		debug!("Sequence {} -> {sequence}: released {released} textures", self.sequence);
		self.sequence = sequence;
		self.clock.reset_position();
		if self.cells() > frames {
			warn!("{}x{} cells exceed the {frames} frames of sequence {sequence}", self.cell_x, self.cell_y);
		}
		Ok(())
	}

	/// Raw frames in the active sequence.
	#[inline]
	pub fn frame_count(&self) -> usize {
		self.asset.frame_count(self.sequence)
	}

	/// Logical frames in the active sequence: positions a cell grid can
	/// start at.
	pub fn logical_frame_count(&self) -> usize {
		let frames = self.frame_count();
		let cells = self.cells();
		if frames < cells { 0 } else { frames - cells + 1 }
	}

	/// Current frame.
	#[inline]
	pub fn current_frame(&self) -> usize {
		self.clock.current_frame()
	}

	/// Jumps to `frame`.
	///
	/// # Errors
	///
	/// Returns `InvalidFrame` if the cell grid starting at `frame` runs past
	/// the sequence.
	pub fn set_current_frame(&mut self, frame: usize) -> Result<(), SpriteError> {
		let count = self.frame_count();
		let cells = self.cells();
		if frame.checked_add(cells).is_none_or(|end| end > count) {
			return Err(SpriteError::InvalidFrame {
				frame,
				cells,
				count,
			});
		}
		self.clock.set_current_frame(frame);
		Ok(())
	}

	/// Cell grid as `(columns, rows)`.
	#[inline]
	pub fn cell_size(&self) -> (usize, usize) {
		(self.cell_x, self.cell_y)
	}

	fn cells(&self) -> usize {
		self.cell_x.saturating_mul(self.cell_y)
	}

	/// Sets the cell grid and drops cached textures built with the old one.
	///
	/// The current frame moves to 0 if the new grid would overrun the
	/// sequence from it.
	///
	/// # Errors
	///
	/// Returns `InvalidCellSize` if a side is zero or the grid has more cells
	/// than the sequence has frames.
	pub fn set_cell_size(&mut self, x: usize, y: usize, backend: &mut dyn GpuBackend) -> Result<(), SpriteError> {
		let frames = self.frame_count();
		if x == 0 || y == 0 || x.saturating_mul(y) > frames {
			return Err(SpriteError::InvalidCellSize {
				x,
				y,
			});
		}
		self.cell_x = x;
		self.cell_y = y;
		if self.current_frame().saturating_add(self.cells()) > frames {
			self.clock.set_current_frame(0);
		}
		self.textures.release_all(backend);
		Ok(())
	}

	/// Playback state.
	#[inline]
	pub fn play_mode(&self) -> PlayMode {
		self.clock.play_mode()
	}

	/// Plays forward.
	pub fn play_forward(&mut self) {
		self.clock.play_forward();
	}

	/// Plays backward.
	pub fn play_backward(&mut self) {
		self.clock.play_backward();
	}

	/// Stops advancing.
	pub fn pause(&mut self) {
		self.clock.pause();
	}

	/// Seconds for one pass.
	#[inline]
	pub fn play_length(&self) -> f64 {
		self.clock.play_length()
	}

	/// Sets the seconds for one pass.
	pub fn set_play_length(&mut self, seconds: f64) {
		self.clock.set_play_length(seconds);
	}

	/// Whether playback wraps.
	#[inline]
	pub fn play_loop(&self) -> bool {
		self.clock.play_loop()
	}

	/// Sets whether playback wraps.
	pub fn set_loop(&mut self, play_loop: bool) {
		self.clock.set_loop(play_loop);
	}

	/// Sets the frames looped after the first pass.
	///
	/// # Errors
	///
	/// Returns `InvalidFrame` if the window is empty or runs past the logical
	/// frames.
	pub fn set_sub_loop(&mut self, start: usize, end: usize) -> Result<(), SpriteError> {
		let count = self.logical_frame_count();
		if end > count || !self.clock.set_sub_loop(start, end) {
			return Err(SpriteError::InvalidFrame {
				frame: end,
				cells: self.cells(),
				count,
			});
		}
		Ok(())
	}

	/// Removes the sub-loop.
	pub fn clear_sub_loop(&mut self) {
		self.clock.clear_sub_loop();
	}

	/// Completed passes since the last sequence change.
	#[inline]
	pub fn played_count(&self) -> u32 {
		self.clock.played_count()
	}

	/// Active blend mode.
	#[inline]
	pub fn blend_mode(&self) -> BlendMode {
		self.blend_mode
	}

	/// Sets the blend mode of later draws.
	pub fn set_blend_mode(&mut self, mode: BlendMode) {
		self.blend_mode = mode;
	}

	/// Palette row used for drawing.
	#[inline]
	pub fn palette_shift(&self) -> usize {
		self.palette_shift
	}

	/// Selects the palette row used for drawing.
	pub fn set_palette_shift(&mut self, shift: usize) {
		self.palette_shift = shift;
	}

	/// Palette name.
	#[inline]
	pub fn palette(&self) -> &str {
		&self.palette
	}

	/// Switches to another registered palette.
	///
	/// # Errors
	///
	/// Returns `PaletteNotFound` if `palette` is not registered.
	pub fn set_palette(&mut self, palette: impl Into<String>, palettes: &PaletteRegistry) -> Result<(), SpriteError> {
		let palette = palette.into();
		if !palettes.contains(&palette) {
			return Err(SpriteError::PaletteNotFound(palette));
		}
		self.palette = palette;
		Ok(())
	}

	/// Whether the draw position is the bottom-left corner.
	#[inline]
	pub fn bottom_origin(&self) -> bool {
		self.bottom_origin
	}

	/// Anchors draws at the bottom-left corner instead of the top-left.
	pub fn set_bottom_origin(&mut self, bottom_origin: bool) {
		self.bottom_origin = bottom_origin;
	}

	/// Whether the sprite draws.
	#[inline]
	pub fn visible(&self) -> bool {
		self.visible
	}

	/// Shows or hides the sprite.
	pub fn set_visible(&mut self, visible: bool) {
		self.visible = visible;
	}

	/// Width of `cell_x` frames starting at `frame` of `sequence`.
	pub fn frame_width(&self, sequence: usize, frame: usize, cell_x: usize) -> u32 {
		self.asset.frame_width(sequence, frame, cell_x)
	}

	/// Height of `cell_y` grid rows starting at `frame` of `sequence`.
	pub fn frame_height(&self, sequence: usize, frame: usize, cell_x: usize, cell_y: usize) -> u32 {
		self.asset.frame_height(sequence, frame, cell_x, cell_y)
	}

	/// Size of the current logical frame.
	pub fn current_size(&self) -> (u32, u32) {
		let frame = self.current_frame();
		if frame.saturating_add(self.cells()) > self.frame_count() {
			return (0, 0);
		}
		(
			self.frame_width(self.sequence, frame, self.cell_x),
			self.frame_height(self.sequence, frame, self.cell_x, self.cell_y),
		)
	}

	/// Cached textures.
	#[inline]
	pub fn textures(&self) -> &TextureCache {
		&self.textures
	}

	/// Advances the animation by `elapsed` seconds, building the textures of
	/// the frames shown before and after the advance.
	///
	/// Texture allocation failures are logged and retried on the next call.
	pub fn update(&mut self, elapsed: f64, backend: &mut dyn GpuBackend) {
		self.cache_current(backend);
		let logical = self.logical_frame_count();
		self.clock.tick(elapsed, logical);
		self.cache_current(backend);
	}

	fn ensure_texture(&mut self, backend: &mut dyn GpuBackend) -> Result<Option<Texture>, RenderError> {
		let Self {
			asset,
			sequence,
			cell_x,
			cell_y,
			clock,
			textures,
			..
		} = self;
		let frame = clock.current_frame();
		textures.get_or_build(frame, backend, || build_frame(&*asset, *sequence, frame, *cell_x, *cell_y))
	}

	fn cache_current(&mut self, backend: &mut dyn GpuBackend) {
		if let Err(e) = self.ensure_texture(backend) {
			warn!("Frame {} of sequence {} not cached: {e}", self.current_frame(), self.sequence);
		}
	}

	/// Draws the current frame with its top-left (or bottom-left) corner at
	/// `position` plus the frame offset.
	///
	/// # Errors
	///
	/// Returns non-recoverable draw errors such as an unregistered palette.
	/// Allocation failures yield [`DrawOutcome::Skipped`].
	pub fn render(&mut self, position: (i32, i32), ctx: &mut RenderContext<'_>) -> Result<DrawOutcome, RenderError> {
		if !self.visible {
			return Ok(DrawOutcome::Hidden);
		}
		let texture = match self.ensure_texture(&mut *ctx.backend) {
			Ok(Some(texture)) => texture,
			Ok(None) => return Ok(DrawOutcome::Skipped),
			Err(e) if e.is_recoverable() => {
				warn!("Skipping draw: {e}");
				return Ok(DrawOutcome::Skipped);
			}
			Err(e) => return Err(e),
		};

		let (x, y) = self.draw_position(position);
		let request = DrawRequest {
			texture: texture.handle,
			x,
			y,
			palette: &self.palette,
			row: PaletteRow::Shift(self.palette_shift),
			blend: self.blend_mode,
		};
		match ctx.draw(&request) {
			Ok(()) => Ok(DrawOutcome::Drawn),
			Err(e) if e.is_recoverable() => {
				warn!("Skipping draw: {e}");
				Ok(DrawOutcome::Skipped)
			}
			Err(e) => Err(e),
		}
	}

	/// Screen position of the current frame's texture.
	pub fn draw_position(&self, position: (i32, i32)) -> (i32, i32) {
		let frame = self.current_frame();
		let x = position.0 + self.asset.frame_offset_x(self.sequence, frame);
		let mut y = position.1;
		if self.bottom_origin {
			y -= self.frame_height(self.sequence, frame, self.cell_x, self.cell_y) as i32;
		}
		y += self.asset.frame_offset_y(self.sequence, frame);
		(x, y)
	}

	/// Releases every cached texture. Returns the number released.
	pub fn release(&mut self, backend: &mut dyn GpuBackend) -> usize {
		self.textures.release_all(backend)
	}

	/// Sets the handler for presses on the sprite.
	pub fn on_press(&mut self, callback: impl FnMut() + 'static) {
		self.callbacks.on_press = Some(Box::new(callback));
	}

	/// Sets the handler for releases after a press on the sprite.
	pub fn on_release(&mut self, callback: impl FnMut() + 'static) {
		self.callbacks.on_release = Some(Box::new(callback));
	}

	/// Sets the handler for the cursor entering the sprite.
	pub fn on_hover(&mut self, callback: impl FnMut() + 'static) {
		self.callbacks.on_hover = Some(Box::new(callback));
	}

	/// Sets the handler for the cursor leaving the sprite.
	pub fn on_leave(&mut self, callback: impl FnMut() + 'static) {
		self.callbacks.on_leave = Some(Box::new(callback));
	}

	/// Whether a press on the sprite is held.
	pub fn is_pressed(&self) -> bool {
		self.pointer.is_pressed()
	}

	/// Whether the cursor is over the sprite.
	pub fn is_hovered(&self) -> bool {
		self.pointer.is_hovered()
	}

	/// Hit-tests `input` against the current frame drawn at `position` (frame
	/// offsets not applied), fires the matching callbacks and returns the
	/// transitions.
	pub fn handle_pointer(&mut self, position: (i32, i32), input: PointerInput) -> Vec<PointerEvent> {
		let (width, height) = self.current_size();
		let over = self.visible && hit_test(position, width, height, input.x, input.y);
		let events = self.pointer.update(over, input.button_down);
		for &event in &events {
			self.callbacks.dispatch(event);
		}
		events
	}
}
