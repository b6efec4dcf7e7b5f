//! Asset loading for `palsprite-rs`.
//!
//! Resolves logical asset paths such as `/data/global/ui/cursor.dc6` to raw
//! bytes. The rendering crates only ever consume bytes; where those bytes
//! come from is decided by the [`AssetLoader`] handed to them.
//!
//! ```no_run
//! use palsprite_vfs::{AssetLoader, DirectoryLoader};
//!
//! # fn main() -> Result<(), palsprite_vfs::LoadError> {
//! let loader = DirectoryLoader::new("./assets");
//! let bytes = loader.load("/data/global/ui/cursor.dc6")?;
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::debug;
use thiserror::Error;

/// Errors raised while loading an asset.
#[derive(Debug, Error)]
pub enum LoadError {
	/// No asset exists at the logical path
	#[error("Asset not found: {0}")]
	NotFound(String),

	/// IO error
	#[error(transparent)]
	IOError(#[from] std::io::Error),
}

/// Resolves logical paths to byte buffers.
pub trait AssetLoader {
	/// Loads the asset at `path`.
	///
	/// # Errors
	///
	/// Returns `NotFound` if nothing exists at `path`.
	fn load(&self, path: &str) -> Result<Vec<u8>, LoadError>;

	/// Returns `true` if an asset exists at `path`.
	fn exists(&self, path: &str) -> bool {
		self.load(path).is_ok()
	}
}

/// Normalizes a logical path: backslashes become slashes, leading and
/// duplicate separators are dropped, and ASCII letters are lowercased.
pub fn normalize(path: &str) -> String {
	path.replace('\\', "/")
		.split('/')
		.filter(|part| !part.is_empty() && *part != ".")
		.collect::<Vec<_>>()
		.join("/")
		.to_ascii_lowercase()
}

/// Loads assets from a directory tree on disk.
///
/// Logical paths are normalized and joined onto the root. File names on disk
/// are matched exactly after normalization, so the tree is expected to use
/// lowercase names.
#[derive(Debug, Clone)]
pub struct DirectoryLoader {
	root: PathBuf,
}

impl DirectoryLoader {
	/// Creates a loader rooted at `root`.
	pub fn new(root: impl AsRef<Path>) -> Self {
		Self {
			root: root.as_ref().to_path_buf(),
		}
	}

	/// Root directory.
	pub fn root(&self) -> &Path {
		&self.root
	}

	fn resolve(&self, path: &str) -> PathBuf {
		self.root.join(normalize(path))
	}
}

impl AssetLoader for DirectoryLoader {
	fn load(&self, path: &str) -> Result<Vec<u8>, LoadError> {
		let resolved = self.resolve(path);
		match std::fs::read(&resolved) {
			Ok(bytes) => {
				debug!("loaded {} ({} bytes)", resolved.display(), bytes.len());
				Ok(bytes)
			}
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(LoadError::NotFound(path.to_owned())),
			Err(e) => Err(e.into()),
		}
	}

	fn exists(&self, path: &str) -> bool {
		self.resolve(path).is_file()
	}
}

/// In-memory asset table, keyed by normalized path.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
	assets: HashMap<String, Vec<u8>>,
}

impl MemoryLoader {
	/// Creates an empty loader.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds or replaces an asset.
	pub fn insert(&mut self, path: &str, bytes: impl Into<Vec<u8>>) {
		self.assets.insert(normalize(path), bytes.into());
	}

	/// Builder-style [`insert`](Self::insert).
	pub fn with(mut self, path: &str, bytes: impl Into<Vec<u8>>) -> Self {
		self.insert(path, bytes);
		self
	}

	/// Number of stored assets.
	pub fn len(&self) -> usize {
		self.assets.len()
	}

	/// Returns `true` if no assets are stored.
	pub fn is_empty(&self) -> bool {
		self.assets.is_empty()
	}
}

impl AssetLoader for MemoryLoader {
	fn load(&self, path: &str) -> Result<Vec<u8>, LoadError> {
		self.assets.get(&normalize(path)).cloned().ok_or_else(|| LoadError::NotFound(path.to_owned()))
	}

	fn exists(&self, path: &str) -> bool {
		self.assets.contains_key(&normalize(path))
	}
}
