//! Directory walk and PNG output. No codec logic lives here.

use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;
use tilerip_core::{assemble, IndexedFrame, TileCodec};

use crate::config::SheetConfig;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    pub converted: usize,
    pub skipped: usize,
}

/// Map palette indices to grey levels, saturating at white.
pub fn to_grey(frame: &IndexedFrame, scale: u8) -> Vec<u8> {
    frame.pixels.iter().map(|&p| p.saturating_mul(scale)).collect()
}

/// Write a frame as an 8-bit greyscale PNG.
pub fn write_png(path: &Path, frame: &IndexedFrame, scale: u8) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), frame.width, frame.height);
    encoder.set_color(png::ColorType::Grayscale);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder.write_header()?;
    writer.write_image_data(&to_grey(frame, scale))?;
    Ok(())
}

/// Read one tile-table file and assemble its frame.
pub fn load_frame(
    codec: &dyn TileCodec,
    config: &SheetConfig,
    path: &Path,
) -> Result<IndexedFrame> {
    let data = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let frame = assemble(codec, &data, &config.layout)?;
    if frame.pixels.is_empty() {
        anyhow::bail!("no pixels decoded");
    }
    Ok(frame)
}

/// Convert every regular file in `input` to `<output>/<name>.png`.
///
/// Entries that cannot be read or decoded are logged and skipped. Failing to
/// list `input` or to write into `output` aborts the run.
pub fn export_dir(
    codec: &dyn TileCodec,
    config: &SheetConfig,
    input: &Path,
    output: &Path,
) -> Result<ExportSummary> {
    let mut entries = fs::read_dir(input)
        .with_context(|| format!("Failed to read directory {}", input.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    let mut summary = ExportSummary::default();
    for entry in entries {
        let path = entry.path();
        // Follows symlinks; a dangling link is an unreadable entry
        match fs::metadata(&path) {
            Ok(meta) if !meta.is_file() => continue,
            Ok(_) => {}
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                summary.skipped += 1;
                continue;
            }
        }

        let frame = match load_frame(codec, config, &path) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Skipping {}: {:#}", path.display(), e);
                summary.skipped += 1;
                continue;
            }
        };

        let mut name = entry.file_name();
        name.push(".png");
        let target = output.join(name);
        write_png(&target, &frame, config.scale)?;
        debug!(
            "{} -> {} ({}x{})",
            path.display(),
            target.display(),
            frame.width,
            frame.height
        );
        summary.converted += 1;
    }

    Ok(summary)
}
