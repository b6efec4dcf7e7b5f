//! This module is separated into its own crate to enable simple dynamic linking for `palsprite`, and should not be used directly.

/// `use palsprite::prelude::*;` to import commonly used items.
pub mod prelude;

// Re-export member crates for convenience
pub use palsprite_render;
pub use palsprite_types;
pub use palsprite_vfs;

// Re-export commonly used types at crate root
pub use palsprite_render::{PaletteError, RenderError, SpriteError};
pub use palsprite_types::file::FileError;
pub use palsprite_vfs::{AssetLoader, DirectoryLoader, LoadError, MemoryLoader};
