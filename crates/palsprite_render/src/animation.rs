//! Time-driven frame advance.
//!
//! [`AnimationClock`] turns elapsed seconds into frame steps. Time not yet
//! worth a whole frame is carried to the next tick, so the clock advances the
//! same way at any host frame rate.
//!
//! Frame bounds are `[0, frame_count)` during the first pass. Once a pass has
//! completed and a sub-loop is set, the bounds become `[start, end)` of the
//! sub-loop, which lets one clock play an intro once and then loop a body.
//!
//! | Direction | Loop  | On crossing the bound          |
//! |-----------|-------|--------------------------------|
//! | Forward   | true  | wrap to lower bound            |
//! | Forward   | false | clamp to `upper - 1` and stop  |
//! | Backward  | true  | wrap to `upper - 1`            |
//! | Backward  | false | clamp to lower bound and stop  |

use std::fmt;

use log::trace;

use crate::config::DEFAULT_PLAY_LENGTH;

/// Playback state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlayMode {
	/// No advance
	#[default]
	Paused,
	/// Frame index increases
	Forward,
	/// Frame index decreases
	Backward,
}

impl fmt::Display for PlayMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Paused => write!(f, "paused"),
			Self::Forward => write!(f, "forward"),
			Self::Backward => write!(f, "backward"),
		}
	}
}

/// Frame window `[start, end)` used after the first full pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubLoop {
	/// First frame of the window
	pub start: usize,
	/// One past the last frame of the window
	pub end: usize,
}

/// Animation state of one sprite.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClock {
	current_frame: usize,
	play_mode: PlayMode,
	play_length: f64,
	play_loop: bool,
	sub_loop: Option<SubLoop>,
	last_frame_time: f64,
	played_count: u32,
}

impl Default for AnimationClock {
	fn default() -> Self {
		Self::new()
	}
}

impl AnimationClock {
	/// A paused, looping clock with a one second play length.
	pub fn new() -> Self {
		Self::with_defaults(DEFAULT_PLAY_LENGTH, true)
	}

	/// A paused clock with the given play length and loop flag.
	pub fn with_defaults(play_length: f64, play_loop: bool) -> Self {
		Self {
			current_frame: 0,
			play_mode: PlayMode::Paused,
			play_length,
			play_loop,
			sub_loop: None,
			last_frame_time: 0.0,
			played_count: 0,
		}
	}

	/// Current frame index.
	#[inline]
	pub fn current_frame(&self) -> usize {
		self.current_frame
	}

	/// Moves to `frame` without touching the time accumulator.
	#[inline]
	pub fn set_current_frame(&mut self, frame: usize) {
		self.current_frame = frame;
	}

	/// Playback state.
	#[inline]
	pub fn play_mode(&self) -> PlayMode {
		self.play_mode
	}

	/// Seconds for one full pass.
	#[inline]
	pub fn play_length(&self) -> f64 {
		self.play_length
	}

	/// Sets the seconds for one full pass.
	#[inline]
	pub fn set_play_length(&mut self, seconds: f64) {
		self.play_length = seconds;
	}

	/// Whether playback wraps.
	#[inline]
	pub fn play_loop(&self) -> bool {
		self.play_loop
	}

	/// Sets whether playback wraps.
	#[inline]
	pub fn set_loop(&mut self, play_loop: bool) {
		self.play_loop = play_loop;
	}

	/// Configured sub-loop.
	#[inline]
	pub fn sub_loop(&self) -> Option<SubLoop> {
		self.sub_loop
	}

	/// Completed passes.
	#[inline]
	pub fn played_count(&self) -> u32 {
		self.played_count
	}

	/// Carried time in seconds.
	#[inline]
	pub fn last_frame_time(&self) -> f64 {
		self.last_frame_time
	}

	/// Plays forward from the current frame, restarting the frame phase.
	pub fn play_forward(&mut self) {
		self.play_mode = PlayMode::Forward;
		self.last_frame_time = 0.0;
	}

	/// Plays backward from the current frame, restarting the frame phase.
	pub fn play_backward(&mut self) {
		self.play_mode = PlayMode::Backward;
		self.last_frame_time = 0.0;
	}

	/// Stops advancing.
	pub fn pause(&mut self) {
		self.play_mode = PlayMode::Paused;
	}

	/// Sets the sub-loop window. Returns `false` and keeps the old window if
	/// `start >= end`.
	pub fn set_sub_loop(&mut self, start: usize, end: usize) -> bool {
		if start >= end {
			return false;
		}
		self.sub_loop = Some(SubLoop {
			start,
			end,
		});
		true
	}

	/// Removes the sub-loop window.
	pub fn clear_sub_loop(&mut self) {
		self.sub_loop = None;
	}

	/// Back to frame 0, first pass, no carried time. Mode is kept.
	pub fn reset_position(&mut self) {
		self.current_frame = 0;
		self.played_count = 0;
		self.last_frame_time = 0.0;
	}

	/// Advances by `elapsed` seconds over a sequence of `frame_count` frames
	/// and returns the number of frame steps taken.
	pub fn tick(&mut self, elapsed: f64, frame_count: usize) -> usize {
		if self.play_mode == PlayMode::Paused || frame_count == 0 {
			return 0;
		}
		let frame_length = self.play_length / frame_count as f64;
		if !(frame_length > 0.0 && frame_length.is_finite()) || !(elapsed > 0.0 && elapsed.is_finite()) {
			return 0;
		}

		self.last_frame_time += elapsed;
		let steps = (self.last_frame_time / frame_length).floor();
		self.last_frame_time = if steps.is_finite() {
			(self.last_frame_time - steps * frame_length).max(0.0)
		} else {
			0.0
		};

		let steps = steps as u64;
		let mut taken = 0u64;
		while taken < steps {
			if self.skip_cycles(steps - taken, frame_count) {
				taken = steps;
				break;
			}
			if !self.advance(frame_count) {
				break;
			}
			taken += 1;
		}
		if taken > 0 {
			trace!("clock: {taken} steps to frame {} (pass {})", self.current_frame, self.played_count);
		}
		usize::try_from(taken).unwrap_or(usize::MAX)
	}

	/// Applies `steps` looping steps at once when the bounds can no longer
	/// change and the current frame is inside them.
	fn skip_cycles(&mut self, steps: u64, frame_count: usize) -> bool {
		if !self.play_loop || (self.sub_loop.is_some() && self.played_count == 0) {
			return false;
		}
		let (lower, upper) = self.bounds(frame_count);
		if !(lower..upper).contains(&self.current_frame) {
			return false;
		}
		let cycle = (upper - lower) as u128;
		// Steps already taken within the current pass.
		let into_pass = match self.play_mode {
			PlayMode::Paused => return false,
			PlayMode::Forward => self.current_frame - lower,
			PlayMode::Backward => upper - 1 - self.current_frame,
		};

		let position = into_pass as u128 + u128::from(steps);
		let passes = position / cycle;
		let into_pass = (position % cycle) as usize;
		self.current_frame = match self.play_mode {
			PlayMode::Backward => upper - 1 - into_pass,
			_ => lower + into_pass,
		};
		self.played_count = self.played_count.saturating_add(u32::try_from(passes).unwrap_or(u32::MAX));
		true
	}

	/// Active bounds for a sequence of `frame_count` frames.
	pub fn bounds(&self, frame_count: usize) -> (usize, usize) {
		match self.sub_loop {
			Some(sub) if self.played_count > 0 => {
				let end = sub.end.min(frame_count);
				(sub.start.min(end.saturating_sub(1)), end)
			}
			_ => (0, frame_count),
		}
	}

	/// One frame step. Returns `false` once non-looping playback has stopped.
	fn advance(&mut self, frame_count: usize) -> bool {
		let (lower, upper) = self.bounds(frame_count);
		if upper == 0 {
			return false;
		}
		if self.current_frame < lower || self.current_frame >= upper {
			self.current_frame = self.current_frame.clamp(lower, upper - 1);
		}

		let forward = match self.play_mode {
			PlayMode::Paused => return false,
			PlayMode::Forward => true,
			PlayMode::Backward => false,
		};
		let terminal = if forward { upper - 1 } else { lower };
		if !self.play_loop && self.played_count > 0 && self.current_frame == terminal {
			return false;
		}

		let crossed = if forward {
			self.current_frame + 1 >= upper
		} else {
			self.current_frame == lower
		};
		if !crossed {
			if forward {
				self.current_frame += 1;
			} else {
				self.current_frame -= 1;
			}
			return true;
		}

		self.played_count += 1;
		let (lower, upper) = self.bounds(frame_count);
		self.current_frame = match (forward, self.play_loop) {
			(true, true) => lower,
			(true, false) => upper - 1,
			(false, true) => upper - 1,
			(false, false) => lower,
		};
		true
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn run(clock: &mut AnimationClock, ticks: &[f64], frame_count: usize) -> Vec<usize> {
		ticks
			.iter()
			.map(|&dt| {
				clock.tick(dt, frame_count);
				clock.current_frame()
			})
			.collect()
	}

	#[test]
	fn test_paused_does_not_advance() {
		let mut clock = AnimationClock::new();
		assert_eq!(clock.tick(10.0, 4), 0);
		assert_eq!(clock.current_frame(), 0);
		assert_eq!(clock.last_frame_time(), 0.0);
	}

	#[test]
	fn test_quarter_second_frames() {
		let mut clock = AnimationClock::new();
		clock.play_forward();
		clock.tick(0.13, 4);
		clock.tick(0.13, 4);
		assert_eq!(clock.current_frame(), 1);
		assert!((clock.last_frame_time() - 0.01).abs() < 1e-9);
	}

	#[test]
	fn test_remainder_carried() {
		let mut clock = AnimationClock::new();
		clock.play_forward();
		let frames = run(&mut clock, &[0.125; 10], 4);
		assert_eq!(frames, vec![0, 1, 1, 2, 2, 3, 3, 0, 0, 1]);
		assert_eq!(clock.played_count(), 1);
	}

	#[test]
	fn test_forward_loop_without_sub_loop() {
		let mut clock = AnimationClock::new();
		clock.play_forward();
		assert_eq!(run(&mut clock, &[0.25; 5], 4), vec![1, 2, 3, 0, 1]);
		assert_eq!(clock.played_count(), 1);
	}

	#[test]
	fn test_forward_once_without_sub_loop() {
		let mut clock = AnimationClock::with_defaults(1.0, false);
		clock.play_forward();
		assert_eq!(run(&mut clock, &[0.25; 6], 4), vec![1, 2, 3, 3, 3, 3]);
		assert_eq!(clock.played_count(), 1);
	}

	#[test]
	fn test_forward_loop_with_sub_loop() {
		let mut clock = AnimationClock::with_defaults(0.75, true);
		assert!(clock.set_sub_loop(2, 4));
		clock.play_forward();
		assert_eq!(run(&mut clock, &[0.125; 10], 6), vec![1, 2, 3, 4, 5, 2, 3, 2, 3, 2]);
		assert_eq!(clock.played_count(), 3);
	}

	#[test]
	fn test_forward_once_with_sub_loop() {
		let mut clock = AnimationClock::with_defaults(0.75, false);
		clock.set_sub_loop(2, 4);
		clock.play_forward();
		assert_eq!(run(&mut clock, &[0.125; 8], 6), vec![1, 2, 3, 4, 5, 3, 3, 3]);
		assert_eq!(clock.played_count(), 1);
	}

	#[test]
	fn test_backward_loop() {
		let mut clock = AnimationClock::new();
		clock.play_backward();
		assert_eq!(run(&mut clock, &[0.25; 5], 4), vec![3, 2, 1, 0, 3]);
		assert_eq!(clock.played_count(), 2);
	}

	#[test]
	fn test_backward_once_converges_to_zero() {
		let mut clock = AnimationClock::with_defaults(1.0, false);
		clock.set_current_frame(3);
		clock.play_backward();
		run(&mut clock, &[0.3; 20], 4);
		assert_eq!(clock.current_frame(), 0);
		assert_eq!(clock.tick(5.0, 4), 0);
		assert_eq!(clock.current_frame(), 0);
	}

	#[test]
	fn test_sub_loop_confinement() {
		let mut clock = AnimationClock::with_defaults(1.0, true);
		clock.set_sub_loop(3, 7);
		clock.play_forward();
		clock.tick(1.0, 10);
		assert!(clock.played_count() > 0);
		for dt in [0.05, 0.37, 0.1, 1.9, 0.01, 3.3, 0.42] {
			clock.tick(dt, 10);
			assert!((3..7).contains(&clock.current_frame()), "frame {}", clock.current_frame());
		}
	}

	#[test]
	fn test_determinism() {
		let ticks = [0.016, 0.033, 0.2, 0.5, 0.016, 1.7, 0.05];
		let mut a = AnimationClock::with_defaults(0.8, true);
		let mut b = a.clone();
		for clock in [&mut a, &mut b] {
			clock.set_sub_loop(1, 3);
			clock.play_forward();
			run(clock, &ticks, 5);
		}
		assert_eq!(a.current_frame(), b.current_frame());
		assert_eq!(a.played_count(), b.played_count());
	}

	#[test]
	fn test_play_forward_restarts_phase() {
		let mut clock = AnimationClock::new();
		clock.play_forward();
		clock.tick(0.2, 4);
		clock.play_forward();
		clock.tick(0.2, 4);
		assert_eq!(clock.current_frame(), 0);
	}

	#[test]
	fn test_long_stall_skips_whole_passes() {
		let mut clock = AnimationClock::new();
		clock.play_forward();
		clock.tick(0.25, 4);
		assert_eq!(clock.tick(1.0e9, 4), 4_000_000_000);
		assert_eq!(clock.current_frame(), 1);
		assert_eq!(clock.played_count(), 1_000_000_000);

		let mut clock = AnimationClock::with_defaults(1.0, true);
		clock.set_sub_loop(3, 7);
		clock.play_backward();
		assert_eq!(clock.tick(1.0e6, 8), 8_000_000);
		assert_eq!(clock.current_frame(), 3);
		assert_eq!(clock.played_count(), 2_000_000);
	}

	#[test]
	fn test_skipped_steps_match_single_steps() {
		let mut fast = AnimationClock::with_defaults(1.25, true);
		fast.set_sub_loop(1, 4);
		fast.play_forward();
		let mut slow = fast.clone();

		fast.tick(8.75, 5);
		let frames: Vec<usize> = (0..35)
			.map(|_| {
				slow.tick(0.25, 5);
				slow.current_frame()
			})
			.collect();
		assert_eq!(&frames[..8], &[1, 2, 3, 4, 1, 2, 3, 1]);
		assert_eq!(fast.current_frame(), 1);
		assert_eq!(fast.played_count(), 11);
		assert_eq!(fast.current_frame(), slow.current_frame());
		assert_eq!(fast.played_count(), slow.played_count());
	}

	#[test]
	fn test_overflowing_elapsed_keeps_clock_usable() {
		let mut clock = AnimationClock::new();
		clock.play_forward();
		clock.tick(f64::MAX, 4);
		assert!((0..4).contains(&clock.current_frame()));
		assert_eq!(clock.last_frame_time(), 0.0);
		assert_eq!(clock.tick(0.25, 4), 1);
	}

	#[test]
	fn test_degenerate_inputs() {
		let mut clock = AnimationClock::with_defaults(0.0, true);
		clock.play_forward();
		assert_eq!(clock.tick(1.0, 4), 0);
		clock.set_play_length(1.0);
		assert_eq!(clock.tick(f64::NAN, 4), 0);
		assert_eq!(clock.tick(-1.0, 4), 0);
		assert_eq!(clock.tick(1.0, 0), 0);
		assert!(!clock.set_sub_loop(3, 3));
	}
}
