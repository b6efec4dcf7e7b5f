//! Error types for palettes, sprites and drawing.

use palsprite_types::file::FileError;
use palsprite_vfs::LoadError;
use thiserror::Error;

use crate::backend::TextureHandle;

/// Errors raised by a GPU backend or the renderer.
#[derive(Debug, Error)]
pub enum RenderError {
	/// The backend could not allocate a texture
	#[error("Texture allocation failed for {width}x{height}")]
	TextureAllocation {
		/// Requested width
		width: u32,
		/// Requested height
		height: u32,
	},

	/// A draw named a palette that was never loaded
	#[error("Palette not found: {0}")]
	PaletteNotFound(String),

	/// A handle that the backend does not know
	#[error("Unknown texture handle {0}")]
	UnknownTexture(TextureHandle),
}

impl RenderError {
	/// Returns `true` for failures a caller may treat as a skipped draw.
	pub fn is_recoverable(&self) -> bool {
		matches!(self, Self::TextureAllocation { .. })
	}
}

/// Errors raised while loading palettes into a registry.
#[derive(Debug, Error)]
pub enum PaletteError {
	/// A palette with this name is already registered
	#[error("Palette already loaded: {0}")]
	AlreadyLoaded(String),

	/// The palette file is malformed or has an unknown extension
	#[error(transparent)]
	File(#[from] FileError),

	/// The palette file could not be loaded
	#[error(transparent)]
	Load(#[from] LoadError),
}

/// Errors raised while constructing or configuring a sprite.
#[derive(Debug, Error)]
pub enum SpriteError {
	/// The sprite bytes could not be decoded, or the format is unsupported
	#[error(transparent)]
	Decode(#[from] FileError),

	/// The sprite file could not be loaded
	#[error(transparent)]
	Load(#[from] LoadError),

	/// The sprite names a palette that was never loaded
	#[error("Palette not found: {0}")]
	PaletteNotFound(String),

	/// Sequence id outside the asset
	#[error("Sequence {sequence} out of range ({count} sequences)")]
	InvalidSequence {
		/// Requested sequence
		sequence: usize,
		/// Available sequences
		count: usize,
	},

	/// Frame (plus its cell grid) outside the current sequence
	#[error("Frame {frame} spanning {cells} cells out of range ({count} frames)")]
	InvalidFrame {
		/// Requested frame
		frame: usize,
		/// Raw frames covered by one logical frame
		cells: usize,
		/// Raw frames in the sequence
		count: usize,
	},

	/// Cell grid with a zero side or too large for the sequence
	#[error("Invalid cell size {x}x{y}")]
	InvalidCellSize {
		/// Columns
		x: usize,
		/// Rows
		y: usize,
	},

	/// Drawing failed
	#[error(transparent)]
	Render(#[from] RenderError),
}

impl SpriteError {
	/// Returns `true` if the sprite file extension is not a supported format.
	pub fn is_unsupported_format(&self) -> bool {
		matches!(self, Self::Decode(FileError::UnsupportedFormat { .. }))
	}

	/// Returns `true` if the sprite bytes are malformed.
	pub fn is_corrupt_data(&self) -> bool {
		matches!(self, Self::Decode(e) if e.is_corrupt_data())
	}
}

/// Error returned when parsing an unknown blend mode name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown blend mode: {0:?}")]
pub struct ParseBlendModeError(pub String);
