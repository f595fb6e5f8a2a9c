//! Linear palette-indexed tile codec.
//!
//! Each row of a tile is `bits_per_pixel` consecutive bytes and each byte
//! packs `8 / bits_per_pixel` pixels side by side. Rows start `row_pitch`
//! bytes apart, so a tile embedded in a wider sheet is read in place.

use super::{TileCodec, TileError, TileFormat, TILE_HEIGHT, TILE_PIXELS, TILE_WIDTH};

/// Linear 1/2/4/8bpp tile codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearCodec {
    format: TileFormat,
}

impl LinearCodec {
    pub fn new(format: TileFormat) -> Self {
        Self { format }
    }
}

impl Default for LinearCodec {
    fn default() -> Self {
        Self::new(TileFormat::default())
    }
}

impl TileCodec for LinearCodec {
    fn format(&self) -> &TileFormat {
        &self.format
    }

    fn decode_into(
        &self,
        data: &[u8],
        offset: usize,
        rows: usize,
        out: &mut Vec<u8>,
    ) -> Result<(), TileError> {
        if rows > TILE_HEIGHT {
            return Err(TileError::InvalidInput(format!(
                "row count {} exceeds tile height {}",
                rows, TILE_HEIGHT
            )));
        }
        let format = &self.format;
        format.check_buffer(data.len(), offset, rows)?;

        let bpp = format.bits_per_pixel() as u32;
        let mask = format.pixel_mask();
        let bytes_per_row = format.bytes_per_row();

        out.reserve(rows * TILE_WIDTH);
        for row in 0..rows {
            let start = offset + row * format.row_pitch();
            for &byte in &data[start..start + bytes_per_row] {
                for index in format.pixel_indices() {
                    out.push((byte >> (bpp * index as u32)) & mask);
                }
            }
        }

        Ok(())
    }

    fn encode(&self, pixels: &[u8], data: &mut [u8], offset: usize) -> Result<(), TileError> {
        if pixels.len() < TILE_PIXELS {
            return Err(TileError::InvalidInput(format!(
                "expected at least {} pixels, got {}",
                TILE_PIXELS,
                pixels.len()
            )));
        }
        let format = &self.format;
        format.check_buffer(data.len(), offset, TILE_HEIGHT)?;

        let bpp = format.bits_per_pixel() as u32;
        let mask = format.pixel_mask();
        let pixels_per_byte = format.pixels_per_byte();

        for row in 0..TILE_HEIGHT {
            let start = offset + row * format.row_pitch();
            for col in 0..format.bytes_per_row() {
                let first = row * TILE_WIDTH + col * pixels_per_byte;
                let mut byte = 0u8;
                // The k-th pixel in output order lands in the k-th group
                // visited by pixel_indices(), mirroring decode.
                for (k, index) in format.pixel_indices().enumerate() {
                    byte |= (pixels[first + k] & mask) << (bpp * index as u32);
                }
                data[start + col] = byte;
            }
        }

        Ok(())
    }
}
