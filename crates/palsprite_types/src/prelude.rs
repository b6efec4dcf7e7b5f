//! Prelude module for `palsprite_types`.
//!
//! ```no_run
//! use palsprite_types::prelude::*;
//!
//! let palette = Palette::grayscale();
//! let format = SpriteFormat::from_extension("dcc");
//! ```

#[doc(inline)]
pub use crate::file::{
	Color, Dc6File, DccFile, FileError, FileType, Palette, Pl2File, Transform,
};

#[doc(inline)]
pub use crate::sprite::{
	Frame, FrameInfo, Sequence, SequenceProvider, SpriteAsset, SpriteFormat, decode,
};

#[doc(inline)]
pub use crate::file;
