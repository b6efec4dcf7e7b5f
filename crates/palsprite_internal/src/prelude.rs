//! Prelude module for `palsprite_internal`.
//!
//! # Examples
//!
//! ```rust
//! use palsprite_internal::prelude::*;
//!
//! let mut palettes = PaletteRegistry::new();
//! palettes.load("base", PaletteTable::from_palette(&Palette::grayscale())).unwrap();
//!
//! let frame = Frame::new(2, 1, 0, 0, vec![1, 2]).unwrap();
//! let asset = SpriteAsset::new(SpriteFormat::Dc6, vec![Sequence::new(vec![frame])]);
//! let sprite = Sprite::new(asset, "base", &palettes).unwrap();
//! assert_eq!(sprite.current_size(), (2, 1));
//! ```

// Re-export everything from palsprite_render::prelude, which includes palsprite_types::prelude
#[doc(inline)]
pub use palsprite_render::prelude::*;

#[doc(inline)]
pub use palsprite_vfs::{AssetLoader, DirectoryLoader, LoadError, MemoryLoader};
