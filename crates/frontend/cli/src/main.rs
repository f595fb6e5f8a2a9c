use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::fs;
use std::path::PathBuf;
use tilerip_core::LinearCodec;

mod config;
mod export;

use config::{Overrides, SheetConfig};

/// Decode tile tables into greyscale PNGs
#[derive(Parser)]
#[command(name = "tilerip")]
struct Args {
    /// Directory of tile-table files
    input: PathBuf,

    /// Directory to write <file name>.png into
    output: PathBuf,

    /// JSON file with format, layout and scale
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: Overrides,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match args.config.as_ref() {
        Some(path) => SheetConfig::load(path)?,
        None => SheetConfig::default(),
    };
    config.apply(&args.overrides)?;
    info!(
        "{}bpp {:?}, stride {}, {} tile(s) of {} row(s) from offset {}",
        config.format.bits_per_pixel(),
        config.format.ordering(),
        config.format.stride_tiles(),
        config.layout.count,
        config.layout.rows_per_tile,
        config.layout.start
    );

    fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;

    let codec = LinearCodec::new(config.format);
    let summary = export::export_dir(&codec, &config, &args.input, &args.output)?;
    info!(
        "Converted {} file(s), skipped {}",
        summary.converted, summary.skipped
    );

    Ok(())
}
