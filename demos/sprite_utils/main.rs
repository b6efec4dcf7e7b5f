//! Sprite CLI utility
//!
//! Inspects DC6/DCC sprite files, exports frames to PNG through the software
//! backend, and prints the frame timeline of a simulated animation.
//!
//! # Usage
//!
//! ```bash
//! # Show sequences and frame geometry
//! cargo run --example sprite_utils -- info data/cursor.dc6
//!
//! # Same, as JSON
//! cargo run --example sprite_utils -- info data/cursor.dc6 --json
//!
//! # Render every frame of sequence 0 with a PL2 palette
//! cargo run --example sprite_utils -- export data/cursor.dc6 -p data/pal.pl2 -o frames/
//!
//! # Print which frame shows at each tick of a 60 fps loop
//! cargo run --example sprite_utils -- animate data/cursor.dc6 --fps 60 --seconds 2
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use palsprite_rs::prelude::*;

#[derive(Parser)]
#[command(name = "sprite_utils")]
#[command(author = "palsprite-rs project")]
#[command(version)]
#[command(about = "Inspect, export and animate DC6/DCC sprites", long_about = None)]
struct Cli {
	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand)]
enum Command {
	/// Show sequences and frame geometry
	Info(InfoArgs),
	/// Render every frame of a sequence to PNG
	Export(ExportArgs),
	/// Simulate playback and print the frame timeline
	Animate(AnimateArgs),
}

#[derive(Args)]
struct InfoArgs {
	/// Sprite file (.dc6 or .dcc)
	#[arg(value_name = "FILE")]
	file: PathBuf,

	/// Print frame metadata as JSON
	#[arg(long, default_value_t = false)]
	json: bool,
}

#[derive(Args)]
struct ExportArgs {
	/// Sprite file (.dc6 or .dcc)
	#[arg(value_name = "FILE")]
	file: PathBuf,

	/// Palette file (.pl2 or .dat); grayscale when omitted
	#[arg(short, long, value_name = "PALETTE")]
	palette: Option<PathBuf>,

	/// Output directory
	#[arg(short, long, value_name = "DIR", default_value = "frames")]
	output: PathBuf,

	/// Sequence to export
	#[arg(short, long, default_value_t = 0)]
	sequence: usize,

	/// Palette row
	#[arg(long, default_value_t = 0)]
	palette_shift: usize,

	/// Blend mode name (alpha, add, multiply, addcolors, subcolors)
	#[arg(long, default_value = "")]
	blend: String,
}

#[derive(Args)]
struct AnimateArgs {
	/// Sprite file (.dc6 or .dcc)
	#[arg(value_name = "FILE")]
	file: PathBuf,

	/// Sequence to play
	#[arg(short, long, default_value_t = 0)]
	sequence: usize,

	/// Ticks per second
	#[arg(long, default_value_t = 25.0)]
	fps: f64,

	/// Simulated seconds
	#[arg(long, default_value_t = 2.0)]
	seconds: f64,

	/// Seconds for one pass over the sequence
	#[arg(long, default_value_t = 1.0)]
	play_length: f64,

	/// Stop at the last frame instead of looping
	#[arg(long, default_value_t = false)]
	once: bool,

	/// Play backward
	#[arg(long, default_value_t = false)]
	backward: bool,

	/// Frames `START END` looped after the first pass
	#[arg(long, num_args = 2, value_names = ["START", "END"])]
	sub_loop: Option<Vec<usize>>,

	/// Render config file layered under PALSPRITE_* variables
	#[arg(long, value_name = "TOML")]
	config: Option<PathBuf>,
}

fn main() -> Result<()> {
	env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

	let cli = Cli::parse();
	match cli.command {
		Command::Info(args) => run_info(args),
		Command::Export(args) => run_export(args),
		Command::Animate(args) => run_animate(args),
	}
}

fn run_info(args: InfoArgs) -> Result<()> {
	let bytes = fs::read(&args.file).with_context(|| format!("Failed to read {}", args.file.display()))?;
	let format = SpriteFormat::from_path(&args.file)?;
	let asset = decode(&bytes, format).with_context(|| format!("Failed to decode {}", args.file.display()))?;

	if args.json {
		println!("{}", serde_json::to_string_pretty(&asset.frame_infos())?);
		return Ok(());
	}

	println!("File:      {}", args.file.display());
	println!("Format:    {}", asset.format());
	println!("Size:      {} bytes", bytes.len());
	println!("Header:    {}", hex::encode(&bytes[..bytes.len().min(16)]));
	println!("Sequences: {}", asset.sequence_count());
	for sequence in 0..asset.sequence_count() {
		println!("  Sequence {sequence}: {} frames", asset.frame_count(sequence));
		for frame in 0..asset.frame_count(sequence) {
			println!(
				"    [{frame:3}] {:4}x{:<4} offset ({:5}, {:5})",
				asset.frame_width(sequence, frame, 1),
				asset.frame_height(sequence, frame, 1, 1),
				asset.frame_offset_x(sequence, frame),
				asset.frame_offset_y(sequence, frame),
			);
		}
	}
	Ok(())
}

fn load_palette(registry: &mut PaletteRegistry, path: Option<&Path>) -> Result<()> {
	let Some(path) = path else {
		registry.load("sprite", PaletteTable::from_palette(&Palette::grayscale()))?;
		return Ok(());
	};
	let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
	let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default().to_ascii_lowercase();
	match extension.as_str() {
		"pl2" => registry.load_pl2_bytes("sprite", &bytes)?,
		"dat" => registry.load_dat_bytes("sprite", &bytes)?,
		_ => bail!("Unsupported palette file: {}", path.display()),
	};
	Ok(())
}

fn run_export(args: ExportArgs) -> Result<()> {
	let blend: BlendMode = args.blend.parse()?;
	let mut palettes = PaletteRegistry::new();
	load_palette(&mut palettes, args.palette.as_deref())?;

	let bytes = fs::read(&args.file).with_context(|| format!("Failed to read {}", args.file.display()))?;
	let format = SpriteFormat::from_path(&args.file)?;
	let mut sprite = Sprite::from_bytes(&bytes, format, "sprite", &palettes, &RenderConfig::default())?;
	sprite.set_blend_mode(blend);
	sprite.set_palette_shift(args.palette_shift);

	let mut headless = HeadlessBackend::new();
	sprite.set_sequence(args.sequence, &mut headless)?;
	fs::create_dir_all(&args.output)?;

	let stem = args.file.file_stem().and_then(|s| s.to_str()).unwrap_or("sprite");
	let mut exported = Vec::new();
	for frame in 0..sprite.frame_count() {
		sprite.set_current_frame(frame)?;
		let (width, height) = sprite.current_size();
		if width == 0 || height == 0 {
			println!("Frame {frame} is empty, skipped");
			continue;
		}

		let mut backend = SoftwareBackend::new(width, height);
		let mut renderer = Renderer::new();
		let (dx, dy) = sprite.draw_position((0, 0));
		let mut ctx = RenderContext::new(&mut backend, &mut renderer, &palettes);
		if sprite.render((-dx, -dy), &mut ctx)? != DrawOutcome::Drawn {
			println!("Frame {frame} not drawn");
			continue;
		}
		sprite.release(&mut backend);

		let path = args.output.join(format!("{stem}_{:02}_{frame:03}.png", args.sequence));
		backend.target().save(&path).with_context(|| format!("Failed to write {}", path.display()))?;
		exported.push(path);
	}

	let infos: Vec<FrameInfo> =
		sprite.asset().frame_infos().into_iter().filter(|info| info.sequence == args.sequence).collect();
	let metadata = args.output.join(format!("{stem}_{:02}.json", args.sequence));
	fs::write(&metadata, serde_json::to_string_pretty(&infos)?)?;

	println!("Exported {} frames to {}", exported.len(), args.output.display());
	Ok(())
}

fn run_animate(args: AnimateArgs) -> Result<()> {
	if args.fps <= 0.0 {
		bail!("--fps must be positive");
	}
	let config = RenderConfig::load(args.config.as_deref())?;

	let mut palettes = PaletteRegistry::new();
	load_palette(&mut palettes, None)?;
	let bytes = fs::read(&args.file).with_context(|| format!("Failed to read {}", args.file.display()))?;
	let format = SpriteFormat::from_path(&args.file)?;
	let mut sprite = Sprite::from_bytes(&bytes, format, "sprite", &palettes, &config)?;

	let mut backend = HeadlessBackend::new();
	sprite.set_sequence(args.sequence, &mut backend)?;
	sprite.set_play_length(args.play_length);
	sprite.set_loop(!args.once);
	if let Some(window) = &args.sub_loop {
		sprite.set_sub_loop(window[0], window[1])?;
	}
	if args.backward {
		sprite.set_current_frame(sprite.logical_frame_count().saturating_sub(1))?;
		sprite.play_backward();
	} else {
		sprite.play_forward();
	}

	let dt = 1.0 / args.fps;
	let ticks = (args.seconds * args.fps).round() as usize;
	let mut timeline = Vec::with_capacity(ticks);
	for _ in 0..ticks {
		sprite.update(dt, &mut backend);
		timeline.push(sprite.current_frame());
	}

	println!("Frames:  {}", sprite.logical_frame_count());
	println!("Ticks:   {ticks} at {:.4}s", dt);
	println!("Passes:  {}", sprite.played_count());
	println!("Uploads: {}", backend.upload_count());
	println!("Timeline: {}", timeline.iter().map(ToString::to_string).collect::<Vec<_>>().join(" "));
	Ok(())
}
