//! Prelude module for `palsprite_render`.

#[doc(inline)]
pub use crate::animation::{AnimationClock, PlayMode, SubLoop};

#[doc(inline)]
pub use crate::backend::{BackendKind, GpuBackend, HeadlessBackend, SoftwareBackend, TextureHandle};

#[doc(inline)]
pub use crate::blend::BlendMode;

#[doc(inline)]
pub use crate::compositor::{IndexedBitmap, build_frame};

#[doc(inline)]
pub use crate::config::RenderConfig;

#[doc(inline)]
pub use crate::error::{PaletteError, RenderError, SpriteError};

#[doc(inline)]
pub use crate::palette::{PaletteRegistry, PaletteRow, PaletteTable, TransformGroup};

#[doc(inline)]
pub use crate::renderer::{DrawRequest, RenderContext, Renderer};

#[doc(inline)]
pub use crate::sprite::{DrawOutcome, PointerEvent, PointerInput, Sprite};

#[doc(inline)]
pub use palsprite_types::prelude::*;
