//! End-to-end tests for `palsprite-rs`: bytes in, draw calls and pixels out.

mod fixtures;
mod playback;
mod rendering;
