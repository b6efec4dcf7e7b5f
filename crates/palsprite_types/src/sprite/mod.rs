//! Format-independent sprite model.
//!
//! Both sprite formats decode into the same [`SpriteAsset`]: an ordered list
//! of sequences (directions), each an ordered list of indexed-color frames.
//! Everything downstream of [`decode`] works against this model through the
//! [`SequenceProvider`] trait and never sees which format a sprite came from.
//!
//! # Example
//!
//! ```no_run
//! use palsprite_types::sprite::{SequenceProvider, SpriteAsset, SpriteFormat};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bytes = std::fs::read("walk.dcc")?;
//! let asset = SpriteAsset::decode(&bytes, SpriteFormat::from_path("walk.dcc")?)?;
//! println!("{} sequences, {} frames in the first", asset.sequence_count(), asset.frame_count(0));
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::file::{Dc6File, DccFile, FileError, FileType};

mod provider;

pub use provider::SequenceProvider;

/// Supported sprite encodings, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpriteFormat {
	/// Flat per-direction frame lists
	Dc6,
	/// Compressed per-direction cell streams
	Dcc,
}

impl SpriteFormat {
	/// Resolves a format from a file extension, case-insensitively.
	///
	/// # Errors
	///
	/// Returns `UnsupportedFormat` for anything but `dc6` and `dcc`.
	pub fn from_extension(extension: &str) -> Result<Self, FileError> {
		let trimmed = extension.trim_start_matches('.');
		if trimmed.eq_ignore_ascii_case("dc6") {
			Ok(Self::Dc6)
		} else if trimmed.eq_ignore_ascii_case("dcc") {
			Ok(Self::Dcc)
		} else {
			Err(FileError::unsupported(extension))
		}
	}

	/// Resolves a format from the extension of `path`.
	pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FileError> {
		let path = path.as_ref();
		let Some(extension) = path.extension().and_then(|e| e.to_str()) else {
			return Err(FileError::unsupported(path.display().to_string()));
		};
		Self::from_extension(extension)
	}

	/// Canonical lowercase extension.
	pub fn extension(&self) -> &'static str {
		match self {
			Self::Dc6 => "dc6",
			Self::Dcc => "dcc",
		}
	}
}

impl From<SpriteFormat> for FileType {
	fn from(format: SpriteFormat) -> Self {
		match format {
			SpriteFormat::Dc6 => FileType::Dc6,
			SpriteFormat::Dcc => FileType::Dcc,
		}
	}
}

impl fmt::Display for SpriteFormat {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.extension())
	}
}

/// A single indexed-color raster with its draw offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
	width: u32,
	height: u32,
	offset_x: i32,
	offset_y: i32,
	pixels: Vec<u8>,
}

impl Frame {
	/// Creates a frame.
	///
	/// # Errors
	///
	/// Returns `CorruptData` if `pixels.len() != width * height`.
	pub fn new(
		width: u32,
		height: u32,
		offset_x: i32,
		offset_y: i32,
		pixels: Vec<u8>,
	) -> Result<Self, FileError> {
		let expected = width as usize * height as usize;
		if pixels.len() != expected {
			return Err(FileError::corrupt(
				FileType::Dc6,
				format!("frame {width}x{height} needs {expected} pixels, got {}", pixels.len()),
			));
		}
		Ok(Self {
			width,
			height,
			offset_x,
			offset_y,
			pixels,
		})
	}

	/// Width in pixels.
	#[inline]
	pub fn width(&self) -> u32 {
		self.width
	}

	/// Height in pixels.
	#[inline]
	pub fn height(&self) -> u32 {
		self.height
	}

	/// Horizontal draw offset.
	#[inline]
	pub fn offset_x(&self) -> i32 {
		self.offset_x
	}

	/// Vertical draw offset.
	#[inline]
	pub fn offset_y(&self) -> i32 {
		self.offset_y
	}

	/// Palette indices, row-major.
	#[inline]
	pub fn pixels(&self) -> &[u8] {
		&self.pixels
	}

	/// One row of palette indices, or an empty slice past the last row.
	#[inline]
	pub fn row(&self, y: u32) -> &[u8] {
		let start = (y as usize) * self.width as usize;
		self.pixels.get(start..start + self.width as usize).unwrap_or(&[])
	}

	/// Palette index at `(x, y)`, 0 outside the frame.
	#[inline]
	pub fn color_index_at(&self, x: u32, y: u32) -> u8 {
		if x >= self.width || y >= self.height {
			return 0;
		}
		self.pixels[y as usize * self.width as usize + x as usize]
	}
}

impl fmt::Display for Frame {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}x{} @ ({}, {})", self.width, self.height, self.offset_x, self.offset_y)
	}
}

/// An ordered animation clip.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sequence {
	frames: Vec<Frame>,
}

impl Sequence {
	/// Creates a sequence from frames in playback order.
	pub fn new(frames: Vec<Frame>) -> Self {
		Self {
			frames,
		}
	}

	/// Frames in playback order.
	#[inline]
	pub fn frames(&self) -> &[Frame] {
		&self.frames
	}

	/// Number of frames.
	#[inline]
	pub fn len(&self) -> usize {
		self.frames.len()
	}

	/// Returns `true` if the sequence has no frames.
	#[inline]
	pub fn is_empty(&self) -> bool {
		self.frames.is_empty()
	}
}

/// Serializable summary of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameInfo {
	/// Sequence id
	pub sequence: usize,
	/// Frame id within the sequence
	pub frame: usize,
	/// Width in pixels
	pub width: u32,
	/// Height in pixels
	pub height: u32,
	/// Horizontal draw offset
	pub offset_x: i32,
	/// Vertical draw offset
	pub offset_y: i32,
}

/// A decoded sprite: sequences in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteAsset {
	format: SpriteFormat,
	sequences: Vec<Sequence>,
}

impl SpriteAsset {
	/// Creates an asset from already decoded sequences.
	pub fn new(format: SpriteFormat, sequences: Vec<Sequence>) -> Self {
		Self {
			format,
			sequences,
		}
	}

	/// Decodes `bytes` in the given format.
	///
	/// # Errors
	///
	/// Returns a corrupt-data error when the bytes do not match the format.
	pub fn decode(bytes: &[u8], format: SpriteFormat) -> Result<Self, FileError> {
		decode(bytes, format)
	}

	/// Reads and decodes a sprite file, choosing the format by extension.
	pub fn open(path: impl AsRef<Path>) -> Result<Self, FileError> {
		let format = SpriteFormat::from_path(&path)?;
		let bytes = std::fs::read(path)?;
		decode(&bytes, format)
	}

	/// Format the asset was decoded from.
	#[inline]
	pub fn format(&self) -> SpriteFormat {
		self.format
	}

	/// All sequences.
	#[inline]
	pub fn sequences(&self) -> &[Sequence] {
		&self.sequences
	}

	/// Summaries of every frame, sequence-major.
	pub fn frame_infos(&self) -> Vec<FrameInfo> {
		self.sequences
			.iter()
			.enumerate()
			.flat_map(|(sequence, seq)| {
				seq.frames().iter().enumerate().map(move |(frame, f)| FrameInfo {
					sequence,
					frame,
					width: f.width(),
					height: f.height(),
					offset_x: f.offset_x(),
					offset_y: f.offset_y(),
				})
			})
			.collect()
	}
}

impl From<Dc6File> for SpriteAsset {
	fn from(file: Dc6File) -> Self {
		let sequences = file
			.into_directions()
			.into_iter()
			.map(|frames| {
				Sequence::new(
					frames
						.into_iter()
						.map(|f| Frame {
							width: f.width,
							height: f.height,
							offset_x: f.offset_x,
							offset_y: f.offset_y,
							pixels: f.into_pixels(),
						})
						.collect(),
				)
			})
			.collect();
		Self::new(SpriteFormat::Dc6, sequences)
	}
}

impl From<DccFile> for SpriteAsset {
	fn from(file: DccFile) -> Self {
		let sequences = file
			.into_directions()
			.into_iter()
			.map(|direction| {
				let bounds = direction.bounds();
				let frames = direction
					.into_frames()
					.into_iter()
					.map(|pixels| Frame {
						width: bounds.width.max(0) as u32,
						height: bounds.height.max(0) as u32,
						offset_x: bounds.left,
						offset_y: bounds.top,
						pixels,
					})
					.collect();
				Sequence::new(frames)
			})
			.collect();
		Self::new(SpriteFormat::Dcc, sequences)
	}
}

/// Decodes a sprite byte buffer.
///
/// # Errors
///
/// Returns a corrupt-data error (see [`FileError::is_corrupt_data`]) when the
/// bytes do not match the layout of `format`.
pub fn decode(bytes: &[u8], format: SpriteFormat) -> Result<SpriteAsset, FileError> {
	let asset: SpriteAsset = match format {
		SpriteFormat::Dc6 => Dc6File::from_bytes(bytes)?.into(),
		SpriteFormat::Dcc => DccFile::from_bytes(bytes)?.into(),
	};
	debug!(
		"decoded {} sprite: {} sequences, {} bytes",
		format,
		asset.sequences.len(),
		bytes.len()
	);
	Ok(asset)
}
