//! Name-keyed palette tables shared by sprites and renderers.

use std::collections::HashMap;
use std::path::Path;

use log::info;
use palsprite_types::file::{FileError, Palette, Pl2File};
use palsprite_vfs::AssetLoader;

use super::PaletteTable;
use crate::error::PaletteError;

/// Loaded palette tables by name.
///
/// A name can be loaded once. The registry is passed by reference to
/// sprites and renderers, so independent registries never see each other.
#[derive(Debug, Clone, Default)]
pub struct PaletteRegistry {
	tables: HashMap<String, PaletteTable>,
}

impl PaletteRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `table` under `name`.
	///
	/// # Errors
	///
	/// Returns `AlreadyLoaded` if `name` is taken; the existing table is kept.
	pub fn load(&mut self, name: impl Into<String>, table: PaletteTable) -> Result<&PaletteTable, PaletteError> {
		let name = name.into();
		if self.tables.contains_key(&name) {
			return Err(PaletteError::AlreadyLoaded(name));
		}
		info!("Loaded palette {name} ({} rows)", table.transform_count());
		Ok(self.tables.entry(name).or_insert(table))
	}

	/// Parses and registers a PL2 file.
	pub fn load_pl2_bytes(&mut self, name: impl Into<String>, bytes: &[u8]) -> Result<&PaletteTable, PaletteError> {
		let pl2 = Pl2File::from_bytes(bytes)?;
		self.load(name, PaletteTable::from_pl2(&pl2))
	}

	/// Parses and registers a base-only DAT palette.
	pub fn load_dat_bytes(&mut self, name: impl Into<String>, bytes: &[u8]) -> Result<&PaletteTable, PaletteError> {
		let palette = Palette::from_dat_bytes(bytes)?;
		self.load(name, PaletteTable::from_palette(&palette))
	}

	/// Loads a `.pl2` or `.dat` palette through `loader`.
	///
	/// # Errors
	///
	/// Returns an error if the asset is missing, malformed, has another
	/// extension, or `name` is taken.
	pub fn load_from(
		&mut self,
		loader: &dyn AssetLoader,
		name: impl Into<String>,
		path: &str,
	) -> Result<&PaletteTable, PaletteError> {
		let extension = Path::new(path).extension().and_then(|e| e.to_str()).unwrap_or_default().to_ascii_lowercase();
		match extension.as_str() {
			"pl2" => {
				let bytes = loader.load(path)?;
				self.load_pl2_bytes(name, &bytes)
			}
			"dat" => {
				let bytes = loader.load(path)?;
				self.load_dat_bytes(name, &bytes)
			}
			_ => Err(FileError::unsupported(path).into()),
		}
	}

	/// Looks up a table.
	pub fn get(&self, name: &str) -> Option<&PaletteTable> {
		self.tables.get(name)
	}

	/// Returns `true` if `name` is registered.
	pub fn contains(&self, name: &str) -> bool {
		self.tables.contains_key(name)
	}

	/// Registered names, sorted.
	pub fn names(&self) -> Vec<&str> {
		let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
		names.sort_unstable();
		names
	}

	/// Number of registered tables.
	pub fn len(&self) -> usize {
		self.tables.len()
	}

	/// Returns `true` if nothing is registered.
	pub fn is_empty(&self) -> bool {
		self.tables.is_empty()
	}
}
