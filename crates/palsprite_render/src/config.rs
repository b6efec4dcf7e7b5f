//! Renderer configuration.
//!
//! Values come from an optional TOML file, then `PALSPRITE_*` environment
//! variables, over built-in defaults:
//!
//! ```toml
//! backend = "software"
//! screen_width = 640
//! screen_height = 480
//! default_play_length = 0.5
//! default_loop = true
//! default_blend_mode = "alpha"
//! ```

use std::path::Path;

use log::debug;
use serde::Deserialize;

use crate::backend::BackendKind;
use crate::blend::BlendMode;

/// Default seconds for one pass over a sequence.
pub const DEFAULT_PLAY_LENGTH: f64 = 1.0;

/// Startup settings for backends and new sprites.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
	/// Backend created by [`crate::backend::create`]
	pub backend: BackendKind,
	/// Render target width for backends that own one
	pub screen_width: u32,
	/// Render target height for backends that own one
	pub screen_height: u32,
	/// Play length given to new sprites
	pub default_play_length: f64,
	/// Loop flag given to new sprites
	pub default_loop: bool,
	/// Blend mode given to new sprites
	pub default_blend_mode: BlendMode,
}

impl Default for RenderConfig {
	fn default() -> Self {
		Self {
			backend: BackendKind::Headless,
			screen_width: 800,
			screen_height: 600,
			default_play_length: DEFAULT_PLAY_LENGTH,
			default_loop: true,
			default_blend_mode: BlendMode::None,
		}
	}
}

impl RenderConfig {
	/// Loads the configuration, layering `path` (if it exists) and the
	/// environment over the defaults.
	///
	/// # Errors
	///
	/// Returns an error if the file is malformed or a value has the wrong type.
	pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
		let mut builder = config::Config::builder();
		if let Some(path) = path {
			debug!("Loading render config from {}", path.display());
			builder = builder.add_source(config::File::from(path).required(false));
		}
		builder
			.add_source(config::Environment::with_prefix("PALSPRITE").try_parsing(true))
			.build()?
			.try_deserialize()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let config = RenderConfig::default();
		assert_eq!(config.backend, BackendKind::Headless);
		assert_eq!(config.default_play_length, 1.0);
		assert!(config.default_loop);
		assert_eq!(config.default_blend_mode, BlendMode::None);
	}

	#[test]
	fn test_missing_file_uses_defaults() {
		let path = std::env::temp_dir().join("palsprite_config_missing.toml");
		let config = RenderConfig::load(Some(&path)).unwrap();
		assert_eq!(config.screen_width, 800);
	}

	#[test]
	fn test_load_toml() {
		let path = std::env::temp_dir().join(format!("palsprite_config_{}.toml", std::process::id()));
		std::fs::write(
			&path,
			"backend = \"software\"\nscreen_width = 320\ndefault_play_length = 0.25\ndefault_blend_mode = \"Add\"\n",
		)
		.unwrap();

		let config = RenderConfig::load(Some(&path)).unwrap();
		std::fs::remove_file(&path).unwrap();

		assert_eq!(config.backend, BackendKind::Software);
		assert_eq!(config.screen_width, 320);
		assert_eq!(config.screen_height, 600);
		assert_eq!(config.default_play_length, 0.25);
		assert_eq!(config.default_blend_mode, BlendMode::Additive);
		assert!(config.default_loop);
	}

	#[test]
	fn test_unknown_blend_mode_rejected() {
		let path = std::env::temp_dir().join(format!("palsprite_config_bad_{}.toml", std::process::id()));
		std::fs::write(&path, "default_blend_mode = \"glow\"\n").unwrap();
		let result = RenderConfig::load(Some(&path));
		std::fs::remove_file(&path).unwrap();
		assert!(result.is_err());
	}
}
