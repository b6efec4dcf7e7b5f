//! Benchmark suite for the sprite pipeline
//!
//! Run with: cargo bench --manifest-path benches/Cargo.toml

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use palsprite_benches::{generate_asset, generate_dc6, generate_pl2, sizes};
use palsprite_render::backend::{GpuBackend, SoftwareBackend};
use palsprite_render::compositor::build_frame;
use palsprite_render::palette::{PaletteRow, PaletteTable};
use palsprite_types::sprite::{SpriteAsset, SpriteFormat};

/// Benchmark DC6 decoding at several frame sizes
fn bench_dc6_decode(c: &mut Criterion) {
	let mut group = c.benchmark_group("dc6_decode");

	for (name, (width, height)) in [("cursor", sizes::CURSOR), ("panel", sizes::PANEL_CELL), ("screen", sizes::SCREEN)] {
		let data = generate_dc6(1, 8, width, height);
		group.throughput(Throughput::Elements(u64::from(width * height) * 8));
		group.bench_with_input(BenchmarkId::new("decode", name), &data, |b, data| {
			b.iter(|| black_box(SpriteAsset::decode(black_box(data), SpriteFormat::Dc6)));
		});
	}

	group.finish();
}

/// Benchmark cell-grid compositing
fn bench_compositing(c: &mut Criterion) {
	let mut group = c.benchmark_group("composite");
	let (width, height) = sizes::PANEL_CELL;
	let asset = generate_asset(12, width, height);

	for (cell_x, cell_y) in [(1, 1), (2, 2), (4, 3)] {
		group.throughput(Throughput::Elements(u64::from(width * height) * (cell_x * cell_y) as u64));
		group.bench_function(BenchmarkId::new("grid", format!("{cell_x}x{cell_y}")), |b| {
			b.iter(|| black_box(build_frame(&asset, 0, 0, cell_x, cell_y)));
		});
	}

	group.finish();
}

/// Benchmark palette table expansion
fn bench_palette_table(c: &mut Criterion) {
	let mut group = c.benchmark_group("palette_table");
	let pl2 = generate_pl2();

	group.bench_function("from_pl2", |b| {
		b.iter(|| black_box(PaletteTable::from_pl2(black_box(&pl2))));
	});

	group.finish();
}

/// Benchmark software rasterization through a palette row
fn bench_software_draw(c: &mut Criterion) {
	let mut group = c.benchmark_group("software_draw");
	let table = PaletteTable::from_pl2(&generate_pl2());
	let (width, height) = sizes::PANEL_CELL;
	let bitmap = build_frame(&generate_asset(1, width, height), 0, 0, 1, 1);

	let mut backend = SoftwareBackend::new(800, 600);
	let (Ok(palette), Ok(texture)) = (
		backend.upload_palette_texture(table.transform_count(), table.as_bytes()),
		backend.upload_texture(bitmap.width(), bitmap.height(), bitmap.pixels()),
	) else {
		eprintln!("Warning: Could not upload benchmark textures");
		return;
	};
	backend.bind_palette_texture(palette, table.row_uniform(PaletteRow::Shift(20)));

	group.throughput(Throughput::Elements(u64::from(width * height)));
	group.bench_function("draw_quad", |b| {
		b.iter(|| backend.draw_quad(black_box(texture), 100, 100));
	});

	group.finish();
}

criterion_group!(benches, bench_dc6_decode, bench_compositing, bench_palette_table, bench_software_draw);

criterion_main!(benches);
