//! Blend modes and coalesced blend-state tracking.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::backend::GpuBackend;
use crate::error::ParseBlendModeError;

/// How a sprite's pixels combine with what is already on the surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BlendMode {
	/// Standard alpha compositing, the backend default
	#[default]
	None,
	/// Alpha compositing requested explicitly
	Alpha,
	/// Source scaled by alpha, added to the destination
	Additive,
	/// Destination multiplied by source
	Multiplied,
	/// Source added to destination, alpha ignored
	AddColors,
	/// Destination subtracted from source, alpha ignored
	SubtractColors,
}

impl BlendMode {
	/// Every mode, in declaration order.
	pub const ALL: [Self; 6] = [
		Self::None,
		Self::Alpha,
		Self::Additive,
		Self::Multiplied,
		Self::AddColors,
		Self::SubtractColors,
	];

	/// Script-facing name; `None` is the empty string.
	pub fn name(&self) -> &'static str {
		match self {
			Self::None => "",
			Self::Alpha => "alpha",
			Self::Additive => "add",
			Self::Multiplied => "multiply",
			Self::AddColors => "addcolors",
			Self::SubtractColors => "subcolors",
		}
	}
}

impl fmt::Display for BlendMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl FromStr for BlendMode {
	type Err = ParseBlendModeError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let lower = s.trim().to_ascii_lowercase();
		Self::ALL.into_iter().find(|mode| mode.name() == lower).ok_or_else(|| ParseBlendModeError(s.to_owned()))
	}
}

impl TryFrom<String> for BlendMode {
	type Error = ParseBlendModeError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		value.parse()
	}
}

impl From<BlendMode> for String {
	fn from(mode: BlendMode) -> Self {
		mode.name().to_owned()
	}
}

/// Tracks the backend's active blend mode so that redundant switches are
/// never issued.
#[derive(Debug, Clone, Default)]
pub struct BlendState {
	current: BlendMode,
	switches: usize,
}

impl BlendState {
	/// Creates a tracker assuming the backend starts in [`BlendMode::None`].
	pub fn new() -> Self {
		Self::default()
	}

	/// Mode the backend is currently in.
	#[inline]
	pub fn current(&self) -> BlendMode {
		self.current
	}

	/// Number of blend calls issued so far.
	#[inline]
	pub fn switches(&self) -> usize {
		self.switches
	}

	/// Switches the backend to `mode` unless it is already active.
	///
	/// Returns `true` if a backend call was issued.
	pub fn apply(&mut self, backend: &mut dyn GpuBackend, mode: BlendMode) -> bool {
		if mode == self.current {
			return false;
		}
		backend.set_blend_mode(mode);
		self.current = mode;
		self.switches += 1;
		true
	}
}
