#![allow(clippy::single_component_path_imports)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! `palsprite-rs` decodes palette-indexed sprite files (DC6 and DCC), animates
//! them and draws them through a palette lookup texture.
//!
//! ```no_run
//! use palsprite_rs::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let loader = DirectoryLoader::new("./assets");
//! let mut palettes = PaletteRegistry::new();
//! palettes.load_from(&loader, "act1", "/data/global/palette/act1/pal.pl2")?;
//!
//! let config = RenderConfig::default();
//! let mut sprite = Sprite::load(&loader, "/data/global/ui/loading.dc6", "act1", &palettes, &config)?;
//! sprite.play_forward();
//! # Ok(())
//! # }
//! ```
pub use palsprite_internal::*;

#[cfg(all(feature = "dynamic_linking", not(target_family = "wasm")))]
#[allow(unused_imports)]
use palsprite_dylib;
