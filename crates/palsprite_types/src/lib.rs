//! Core data types and file format support for `palsprite-rs`.
//!
//! # File Formats
//!
//! - **DC6**: flat sprite sheets, one RLE-coded frame list per direction
//! - **DCC**: compressed sprite sheets sharing a cell grid per direction
//! - **PL2**: base palette plus precomputed index transforms
//! - **DAT**: 256-color base palette
//!
//! Sprite files decode into the format-independent [`sprite::SpriteAsset`],
//! queried through [`sprite::SequenceProvider`].
//!
//! # Examples
//!
//! ```no_run
//! use palsprite_types::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let asset = SpriteAsset::open("button.dc6")?;
//! println!("frame 0 is {} pixels wide", asset.frame_width(0, 0, 1));
//!
//! let palette = Palette::open_dat("pal.dat")?;
//! println!("index 1 is {}", palette.get(1));
//! # Ok(())
//! # }
//! ```

pub mod file;
pub mod sprite;

/// `use palsprite_types::prelude::*;` to import commonly used items.
pub mod prelude;
