//! Palette-indexed sprite rendering for `palsprite-rs`.
//!
//! # Pipeline
//!
//! | Stage            | Type                                   |
//! |------------------|----------------------------------------|
//! | palette rows     | [`palette::PaletteTable`] in a [`palette::PaletteRegistry`] |
//! | frame advance    | [`animation::AnimationClock`]          |
//! | cell compositing | [`compositor::build_frame`]            |
//! | GPU residency    | [`texture_cache::TextureCache`]        |
//! | draw submission  | [`renderer::Renderer`] over a [`backend::GpuBackend`] |
//!
//! [`sprite::Sprite`] ties the stages together for one animated sprite.
//!
//! # Examples
//!
//! ```no_run
//! use palsprite_render::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RenderConfig::load(Some(std::path::Path::new("palsprite.toml")))?;
//! let mut backend = palsprite_render::backend::create(&config);
//!
//! let mut palettes = PaletteRegistry::new();
//! palettes.load_dat_bytes("base", &std::fs::read("pal.dat")?)?;
//!
//! let bytes = std::fs::read("button.dc6")?;
//! let mut sprite = Sprite::from_bytes(&bytes, SpriteFormat::Dc6, "base", &palettes, &config)?;
//! let mut renderer = Renderer::new();
//!
//! sprite.update(0.016, backend.as_mut());
//! let mut ctx = RenderContext::new(backend.as_mut(), &mut renderer, &palettes);
//! sprite.render((10, 10), &mut ctx)?;
//! # Ok(())
//! # }
//! ```

pub mod animation;
pub mod backend;
pub mod blend;
pub mod compositor;
pub mod config;
pub mod error;
pub mod palette;
pub mod renderer;
pub mod sprite;
pub mod texture_cache;

/// `use palsprite_render::prelude::*;` to import commonly used items.
pub mod prelude;

pub use error::{PaletteError, ParseBlendModeError, RenderError, SpriteError};
