//! Sprite and palette file formats.

mod error;
pub(crate) mod reader;

pub mod dc6;
pub mod dcc;
pub mod palette;
pub mod pl2;

pub use error::{FileError, FileType};
pub use reader::{BitReader, ByteReader};

pub use dc6::File as Dc6File;
pub use dcc::File as DccFile;
pub use palette::{Color, Palette};
pub use pl2::{File as Pl2File, Transform};
