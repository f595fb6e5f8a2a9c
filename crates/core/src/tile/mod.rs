//! Tile codecs for palette-indexed 8x8 tile data.
//!
//! A tile is 8x8 pixels, each pixel a palette index packed into
//! `bits_per_pixel` bits. This module provides the [`TileFormat`] description
//! and the [`TileCodec`] trait that moves tiles between their packed byte
//! form and a flat, row-major list of palette indices.
//!
//! # Formats
//!
//! - **Linear (1/2/4/8bpp)**: each row is `bits_per_pixel` bytes, every byte
//!   holds `8 / bits_per_pixel` pixels. Which bit group is the leftmost pixel
//!   depends on the [`PixelOrdering`]. Rows may be separated by stride
//!   padding when the tile sits inside a larger interleaved sheet.

mod format;
mod linear;

pub use format::{PixelOrdering, TileFormat, TILE_HEIGHT, TILE_PIXELS, TILE_WIDTH};
pub use linear::LinearCodec;

/// Failures reported by tile formats and codecs.
///
/// All of these are caller configuration problems; nothing here is
/// transient, so none of them are worth retrying.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TileError {
    #[error("Invalid tile format: {0}")]
    InvalidFormat(String),
    #[error("Buffer too short: required {required} bytes, got {actual}")]
    BufferTooShort { required: usize, actual: usize },
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Trait for moving 8x8 tiles between packed bytes and palette indices.
///
/// Implementors only hold an immutable [`TileFormat`]; every method is a pure
/// function of its arguments apart from the output buffer handed to
/// [`TileCodec::encode`].
pub trait TileCodec {
    /// The format this codec reads and writes.
    fn format(&self) -> &TileFormat;

    /// Decode `rows` rows of the tile starting at byte `offset`, appending
    /// `rows * 8` palette indices to `out`.
    ///
    /// `rows` may be below 8 to read a partial-height strip. On error `out` is
    /// left untouched.
    fn decode_into(
        &self,
        data: &[u8],
        offset: usize,
        rows: usize,
        out: &mut Vec<u8>,
    ) -> Result<(), TileError>;

    /// Encode one full tile from `pixels` into `data` at byte `offset`.
    ///
    /// Requires at least 64 pixels. Only the bytes of the tile's rows are
    /// written; stride padding between rows keeps its previous contents.
    fn encode(&self, pixels: &[u8], data: &mut [u8], offset: usize) -> Result<(), TileError>;

    /// Decode `rows` rows starting at `offset` into a new vector.
    fn decode(&self, data: &[u8], offset: usize, rows: usize) -> Result<Vec<u8>, TileError> {
        let mut out = Vec::with_capacity(rows.min(TILE_HEIGHT) * TILE_WIDTH);
        self.decode_into(data, offset, rows, &mut out)?;
        Ok(out)
    }

    /// Decode a full 8-row tile.
    fn decode_tile(&self, data: &[u8], offset: usize) -> Result<Vec<u8>, TileError> {
        self.decode(data, offset, TILE_HEIGHT)
    }

    /// Encode one tile into a freshly zeroed buffer.
    ///
    /// The buffer is exactly as long as the rows the format walks, which is
    /// `tile_size()` bytes for tightly packed formats.
    fn encode_tile(&self, pixels: &[u8]) -> Result<Vec<u8>, TileError> {
        let mut data = vec![0u8; self.format().encoded_span(TILE_HEIGHT)];
        self.encode(pixels, &mut data, 0)?;
        Ok(data)
    }

    /// Get the size of a single tile in bytes.
    fn tile_size(&self) -> usize {
        self.format().tile_size()
    }
}

/// Get a codec for the specified format.
pub fn codec_for(format: TileFormat) -> Box<dyn TileCodec + Send + Sync> {
    Box::new(LinearCodec::new(format))
}
