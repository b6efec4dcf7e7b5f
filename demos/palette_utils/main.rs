//! Palette CLI utility
//!
//! Shows the row layout of a PL2 or DAT palette and exports its lookup
//! texture (256 pixels wide, one row per transform) as a PNG.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example palette_utils -- info data/act1/pal.pl2
//! cargo run --example palette_utils -- export data/act1/pal.pl2 -o act1_rows.png
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use image::RgbaImage;
use palsprite_rs::palsprite_render::palette::ROW_BYTES;
use palsprite_rs::prelude::*;

#[derive(Parser)]
#[command(name = "palette_utils")]
#[command(author = "palsprite-rs project")]
#[command(version)]
#[command(about = "Inspect and export PL2/DAT palettes", long_about = None)]
struct Cli {
	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand)]
enum Command {
	/// Show the transform groups and row offsets
	Info {
		/// Palette file (.pl2 or .dat)
		#[arg(value_name = "FILE")]
		file: PathBuf,
	},
	/// Write the palette lookup texture as PNG
	Export {
		/// Palette file (.pl2 or .dat)
		#[arg(value_name = "FILE")]
		file: PathBuf,

		/// Output PNG
		#[arg(short, long, value_name = "PNG", default_value = "palette.png")]
		output: PathBuf,
	},
}

fn main() -> Result<()> {
	env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

	let cli = Cli::parse();
	match cli.command {
		Command::Info {
			file,
		} => run_info(&file),
		Command::Export {
			file,
			output,
		} => run_export(&file, &output),
	}
}

fn load_table(path: &Path) -> Result<PaletteTable> {
	let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
	let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default().to_ascii_lowercase();
	let table = match extension.as_str() {
		"pl2" => PaletteTable::from_pl2(&Pl2File::from_bytes(&bytes)?),
		"dat" => PaletteTable::from_palette(&Palette::from_dat_bytes(&bytes)?),
		_ => bail!("Unsupported palette file: {}", path.display()),
	};
	Ok(table)
}

fn run_info(path: &Path) -> Result<()> {
	let table = load_table(path)?;

	println!("File:        {}", path.display());
	println!("Rows:        {}", table.transform_count());
	println!("Bytes:       {}", table.as_bytes().len());
	match table.text_shift_offset() {
		Some(offset) => println!("Text rows:   colour n at row {offset} + n"),
		None => println!("Text rows:   none"),
	}
	println!("Groups:");
	println!("  {:<24} {:>6} {:>6}", "name", "first", "rows");
	println!("  {:<24} {:>6} {:>6}", "base", 0, 1);
	for name in table.group_names() {
		println!(
			"  {:<24} {:>6} {:>6}",
			name,
			table.group_offset(name).unwrap_or_default(),
			table.group_len(name).unwrap_or_default()
		);
	}

	println!("Base colors (first 16):");
	for index in 0..16u8 {
		if let Some(color) = table.color(0, index) {
			println!("  [{index:3}] {color}");
		}
	}
	Ok(())
}

fn run_export(path: &Path, output: &Path) -> Result<()> {
	let table = load_table(path)?;
	let rows = table.transform_count();
	let Some(image) = RgbaImage::from_raw(256, rows as u32, table.as_bytes().to_vec()) else {
		bail!("Palette buffer is not {} bytes per row", ROW_BYTES);
	};
	image.save(output).with_context(|| format!("Failed to write {}", output.display()))?;
	println!("Wrote {rows} rows to {}", output.display());
	Ok(())
}
