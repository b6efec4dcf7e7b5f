use super::*;

/// LSB-first bit packer used to build direction blocks.
#[derive(Default)]
struct BitWriter {
	bytes: Vec<u8>,
	bits: usize,
}

impl BitWriter {
	fn push(&mut self, value: u32, count: u32) {
		for i in 0..count {
			if self.bits % 8 == 0 {
				self.bytes.push(0);
			}
			if (value >> i) & 1 == 1 {
				let last = self.bytes.len() - 1;
				self.bytes[last] |= 1 << (self.bits % 8);
			}
			self.bits += 1;
		}
	}

	fn push_signed(&mut self, value: i32, count: u32) {
		self.push(value as u32 & ((1u32 << count) - 1), count);
	}
}

struct FrameSpec {
	width: u32,
	height: u32,
	x: i32,
	y: i32,
}

/// Writes the direction header and frame headers, using code 3 (4 bits)
/// for size and offset fields.
fn write_headers(w: &mut BitWriter, flags: u32, frames: &[FrameSpec]) {
	w.push(0, 32);
	w.push(flags, 2);
	w.push(0, 4);
	for _ in 0..4 {
		w.push(3, 4);
	}
	w.push(0, 4);
	w.push(0, 4);
	for frame in frames {
		w.push(frame.width, 4);
		w.push(frame.height, 4);
		w.push_signed(frame.x, 4);
		w.push_signed(frame.y, 4);
		w.push(0, 1);
	}
}

fn write_palette(w: &mut BitWriter, used: &[u8]) {
	for index in 0..=255u8 {
		w.push(u32::from(used.contains(&index)), 1);
	}
}

fn wrap(direction: &[u8], frames_per_direction: u32) -> Vec<u8> {
	let mut out = vec![constants::SIGNATURE, 6, 1];
	out.extend_from_slice(&frames_per_direction.to_le_bytes());
	out.extend_from_slice(&constants::TAG.to_le_bytes());
	out.extend_from_slice(&((constants::HEADER_SIZE + 4 + direction.len()) as u32).to_le_bytes());
	out.extend_from_slice(&((constants::HEADER_SIZE + 4) as u32).to_le_bytes());
	out.extend_from_slice(direction);
	out
}

const SQUARE: FrameSpec = FrameSpec {
	width: 4,
	height: 4,
	x: 0,
	y: 3,
};

/// Writes the single-cell pixel data of `SQUARE`: stored values 2 and 1
/// (palette entries 20 and 10) and a 2-bit index per pixel of `(x + y) % 4`.
fn write_square_pixels(w: &mut BitWriter) {
	w.push(1, 4);
	w.push(1, 4);
	w.push(0, 4);
	for y in 0..4 {
		for x in 0..4 {
			w.push((x + y) % 4, 2);
		}
	}
}

fn expected_square() -> Vec<u8> {
	let values = [20u8, 10, 0, 0];
	let mut out = Vec::new();
	for y in 0..4 {
		for x in 0..4 {
			out.push(values[(x + y) % 4]);
		}
	}
	out
}

#[test]
fn test_single_frame_displacement_coded() {
	let mut w = BitWriter::default();
	write_headers(&mut w, 0, &[SQUARE]);
	w.push(0, 20);
	write_palette(&mut w, &[0, 10, 20]);
	write_square_pixels(&mut w);

	let file = File::from_bytes(&wrap(&w.bytes, 1)).unwrap();
	assert_eq!(file.direction_count(), 1);
	assert_eq!(file.frames_per_direction(), 1);

	let direction = &file.directions()[0];
	assert_eq!(
		direction.bounds(),
		Rect {
			left: 0,
			top: 0,
			width: 4,
			height: 4,
		}
	);
	assert_eq!(direction.palette_entries(), &[0, 10, 20]);
	assert_eq!(direction.frames()[0], expected_square());
}

#[test]
fn test_equal_cell_repeats_previous_frame() {
	let mut w = BitWriter::default();
	write_headers(&mut w, 0x2, &[SQUARE, SQUARE]);
	w.push(1, 20);
	w.push(0, 20);
	write_palette(&mut w, &[0, 10, 20]);
	// equal-cells stream: frame 1's only cell is unchanged
	w.push(1, 1);
	write_square_pixels(&mut w);

	let file = File::from_bytes(&wrap(&w.bytes, 2)).unwrap();
	let frames = file.directions()[0].frames();
	assert_eq!(frames.len(), 2);
	assert_eq!(frames[0], expected_square());
	assert_eq!(frames[1], frames[0]);
}

#[test]
fn test_raw_pixel_codes() {
	let frame = FrameSpec {
		width: 2,
		height: 2,
		x: -1,
		y: 0,
	};
	let mut w = BitWriter::default();
	write_headers(&mut w, 0x1, &[frame]);
	w.push(0, 20);
	w.push(1, 20);
	w.push(24, 20);
	write_palette(&mut w, &[0, 1, 2, 3, 4, 5, 6, 7]);
	w.push(1, 1);
	w.push(5, 8);
	w.push(7, 8);
	w.push(7, 8);
	for index in 0..4 {
		w.push(index, 2);
	}

	let file = File::from_bytes(&wrap(&w.bytes, 1)).unwrap();
	let direction = &file.directions()[0];
	assert_eq!(direction.bounds().left, -1);
	assert_eq!(direction.bounds().top, -1);
	assert_eq!(direction.frames()[0], vec![7, 5, 0, 0]);
}

#[test]
fn test_rejects_bottom_up_frames() {
	let mut w = BitWriter::default();
	w.push(0, 32);
	w.push(0, 2);
	w.push(0, 4);
	for _ in 0..4 {
		w.push(3, 4);
	}
	w.push(0, 8);
	w.push(4, 4);
	w.push(4, 4);
	w.push(0, 4);
	w.push(3, 4);
	w.push(1, 1);

	let err = File::from_bytes(&wrap(&w.bytes, 1)).unwrap_err();
	assert!(err.is_corrupt_data());
}

#[test]
fn test_rejects_bad_header() {
	let mut w = BitWriter::default();
	write_headers(&mut w, 0, &[SQUARE]);
	let mut bytes = wrap(&w.bytes, 1);
	bytes[0] = 0x75;
	assert!(matches!(File::from_bytes(&bytes), Err(FileError::InvalidSignature { .. })));

	let mut bytes = wrap(&w.bytes, 1);
	bytes[7] = 2;
	assert!(matches!(
		File::from_bytes(&bytes),
		Err(FileError::InvalidSignature {
			expected: 1,
			actual: 2,
			..
		})
	));
}

#[test]
fn test_truncated_stream_is_corrupt() {
	let mut w = BitWriter::default();
	write_headers(&mut w, 0, &[SQUARE]);
	w.push(0, 20);
	write_palette(&mut w, &[0, 10, 20]);
	w.push(1, 4);

	let err = File::from_bytes(&wrap(&w.bytes, 1)).unwrap_err();
	assert!(err.is_corrupt_data());
}
