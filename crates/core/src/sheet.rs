//! Tile sheet assembly.
//!
//! Resource files store their graphics as a run of tiles (or partial-height
//! strips) at regular offsets. [`assemble`] decodes each of them with a
//! [`TileCodec`] and lays the palette indices out in an [`IndexedFrame`].

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::tile::{TileCodec, TileError, TILE_HEIGHT, TILE_WIDTH};

/// A decoded image of palette indices, row-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedFrame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl IndexedFrame {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width * height) as usize],
        }
    }

    /// Palette index at (x, y), or `None` outside the frame.
    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get((y * self.width + x) as usize).copied()
    }
}

/// How decoded tiles are placed in the output frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Placement {
    /// Concatenate the decoded pixels and wrap them every `width` pixels.
    Stream { width: u32 },
    /// Place tile `n` in cell `(n % columns, n / columns)`.
    Grid { columns: u32 },
}

/// Where the tiles of a resource file live and how to arrange them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetLayout {
    /// Byte offset of the first tile.
    pub start: usize,
    /// Distance in bytes between consecutive tiles.
    pub step: usize,
    /// Number of tiles to decode.
    pub count: usize,
    /// Rows decoded per tile, 1 to 8.
    pub rows_per_tile: usize,
    pub placement: Placement,
}

impl Default for SheetLayout {
    /// Battle badge table: 32 four-row strips from 0x84, one per 32-pixel row.
    fn default() -> Self {
        Self {
            start: 132,
            step: 16,
            count: 32,
            rows_per_tile: 4,
            placement: Placement::Stream { width: 32 },
        }
    }
}

impl SheetLayout {
    /// Byte offset of every tile, in decode order.
    pub fn offsets(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.count).map(move |n| self.start.saturating_add(n.saturating_mul(self.step)))
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SheetError {
    #[error("Tile {index} at offset {offset:#x}: {source}")]
    Tile {
        index: usize,
        offset: usize,
        source: TileError,
    },
    #[error("Invalid sheet layout: {0}")]
    Layout(String),
}

/// Decode every tile named by `layout` from `data` into one frame.
pub fn assemble<C>(codec: &C, data: &[u8], layout: &SheetLayout) -> Result<IndexedFrame, SheetError>
where
    C: TileCodec + ?Sized,
{
    let rows = layout.rows_per_tile;
    if rows == 0 || rows > TILE_HEIGHT {
        return Err(SheetError::Layout(format!(
            "rows per tile must be 1..={}, got {}",
            TILE_HEIGHT, rows
        )));
    }

    debug!(
        "Assembling {} tile(s) of {} row(s) from {} bytes, {:?}",
        layout.count,
        rows,
        data.len(),
        layout.placement
    );

    match layout.placement {
        Placement::Stream { width } => assemble_stream(codec, data, layout, width),
        Placement::Grid { columns } => assemble_grid(codec, data, layout, columns),
    }
}

fn decode_strip<C>(
    codec: &C,
    data: &[u8],
    layout: &SheetLayout,
    index: usize,
    offset: usize,
    out: &mut Vec<u8>,
) -> Result<(), SheetError>
where
    C: TileCodec + ?Sized,
{
    trace!("Tile {} at offset {:#x}", index, offset);
    codec
        .decode_into(data, offset, layout.rows_per_tile, out)
        .map_err(|source| SheetError::Tile {
            index,
            offset,
            source,
        })
}

/// Frames are indexed with `u32`, so their pixel count must fit one.
fn frame_limit(what: &str, value: Option<usize>) -> Result<u32, SheetError> {
    value
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| SheetError::Layout(format!("{} exceeds the frame size limit", what)))
}

/// Decode every tile back to back. The buffer grows as tiles decode, so a
/// count larger than the data fails with `BufferTooShort` before any large
/// allocation.
fn decode_all<C>(codec: &C, data: &[u8], layout: &SheetLayout) -> Result<Vec<u8>, SheetError>
where
    C: TileCodec + ?Sized,
{
    let mut pixels = Vec::new();
    for (index, offset) in layout.offsets().enumerate() {
        decode_strip(codec, data, layout, index, offset, &mut pixels)?;
    }
    Ok(pixels)
}

fn assemble_stream<C>(
    codec: &C,
    data: &[u8],
    layout: &SheetLayout,
    width: u32,
) -> Result<IndexedFrame, SheetError>
where
    C: TileCodec + ?Sized,
{
    if width == 0 {
        return Err(SheetError::Layout("stream width must be non-zero".to_string()));
    }
    let total = layout
        .count
        .checked_mul(layout.rows_per_tile * TILE_WIDTH);
    let total = frame_limit("decoded pixel count", total)? as usize;
    if total % width as usize != 0 {
        return Err(SheetError::Layout(format!(
            "{} decoded pixels do not fill rows of {}",
            total, width
        )));
    }

    let pixels = decode_all(codec, data, layout)?;
    let height = (pixels.len() / width as usize) as u32;
    Ok(IndexedFrame {
        width,
        height,
        pixels,
    })
}

fn assemble_grid<C>(
    codec: &C,
    data: &[u8],
    layout: &SheetLayout,
    columns: u32,
) -> Result<IndexedFrame, SheetError>
where
    C: TileCodec + ?Sized,
{
    if columns == 0 {
        return Err(SheetError::Layout("grid needs at least one column".to_string()));
    }

    let columns = columns as usize;
    let rows = layout.rows_per_tile;
    let width = frame_limit("grid width", columns.checked_mul(TILE_WIDTH))?;
    let height = frame_limit(
        "grid height",
        layout.count.div_ceil(columns).checked_mul(rows),
    )?;
    frame_limit(
        "grid pixel count",
        (width as usize).checked_mul(height as usize),
    )?;

    let strips = decode_all(codec, data, layout)?;
    let mut frame = IndexedFrame::new(width, height);
    let width = width as usize;
    for (index, tile) in strips.chunks_exact(rows * TILE_WIDTH).enumerate() {
        let x0 = (index % columns) * TILE_WIDTH;
        let y0 = (index / columns) * rows;
        for (row, line) in tile.chunks_exact(TILE_WIDTH).enumerate() {
            let dst = (y0 + row) * width + x0;
            frame.pixels[dst..dst + TILE_WIDTH].copy_from_slice(line);
        }
    }

    Ok(frame)
}
