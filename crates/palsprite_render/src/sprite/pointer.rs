//! Pointer hit-testing and press tracking.

use std::fmt;

/// Cursor state for one update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointerInput {
	/// Cursor x
	pub x: i32,
	/// Cursor y
	pub y: i32,
	/// Primary button held
	pub button_down: bool,
}

impl PointerInput {
	/// Creates an input.
	pub fn new(x: i32, y: i32, button_down: bool) -> Self {
		Self {
			x,
			y,
			button_down,
		}
	}
}

/// Pointer transitions reported by a sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
	/// Button went down over the sprite
	Press,
	/// Button went up after a press on the sprite, while over it
	Release,
	/// Cursor entered the sprite
	Hover,
	/// Cursor left the sprite
	Leave,
}

/// Press and hover state.
///
/// A press only registers if the button went down over the sprite. Holding
/// the button while entering does not arm a press until it is released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PointerState {
	pressed: bool,
	hovered: bool,
	can_press: bool,
}

impl Default for PointerState {
	fn default() -> Self {
		Self {
			pressed: false,
			hovered: false,
			can_press: true,
		}
	}
}

impl PointerState {
	pub(crate) fn is_pressed(&self) -> bool {
		self.pressed
	}

	pub(crate) fn is_hovered(&self) -> bool {
		self.hovered
	}

	/// Feeds one update and returns the transitions, press/release first.
	pub(crate) fn update(&mut self, over: bool, button_down: bool) -> Vec<PointerEvent> {
		let mut events = Vec::new();

		if button_down {
			if !self.pressed {
				if self.can_press && over {
					self.pressed = true;
					events.push(PointerEvent::Press);
				} else {
					self.can_press = false;
				}
			}
		} else {
			if self.pressed {
				self.pressed = false;
				if over {
					events.push(PointerEvent::Release);
				}
			}
			self.can_press = true;
		}

		if over && !self.hovered {
			self.hovered = true;
			events.push(PointerEvent::Hover);
		} else if !over && self.hovered {
			self.hovered = false;
			events.push(PointerEvent::Leave);
		}

		events
	}
}

/// Returns `true` if `(x, y)` is inside the `width × height` rectangle at
/// `origin`.
pub(crate) fn hit_test(origin: (i32, i32), width: u32, height: u32, x: i32, y: i32) -> bool {
	let (left, top) = (i64::from(origin.0), i64::from(origin.1));
	let (x, y) = (i64::from(x), i64::from(y));
	x >= left && y >= top && x < left + i64::from(width) && y < top + i64::from(height)
}

/// Optional handlers for each [`PointerEvent`].
#[derive(Default)]
pub(crate) struct PointerCallbacks {
	pub(crate) on_press: Option<Box<dyn FnMut()>>,
	pub(crate) on_release: Option<Box<dyn FnMut()>>,
	pub(crate) on_hover: Option<Box<dyn FnMut()>>,
	pub(crate) on_leave: Option<Box<dyn FnMut()>>,
}

impl PointerCallbacks {
	pub(crate) fn dispatch(&mut self, event: PointerEvent) {
		let callback = match event {
			PointerEvent::Press => &mut self.on_press,
			PointerEvent::Release => &mut self.on_release,
			PointerEvent::Hover => &mut self.on_hover,
			PointerEvent::Leave => &mut self.on_leave,
		};
		if let Some(callback) = callback {
			callback();
		}
	}
}

impl fmt::Debug for PointerCallbacks {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PointerCallbacks")
			.field("on_press", &self.on_press.is_some())
			.field("on_release", &self.on_release.is_some())
			.field("on_hover", &self.on_hover.is_some())
			.field("on_leave", &self.on_leave.is_some())
			.finish()
	}
}
