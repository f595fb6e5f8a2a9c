//! Tile format description shared by every codec.

use serde::{Deserialize, Serialize};

use super::TileError;

/// Width of a tile in pixels. Fixed regardless of the encoded byte width.
pub const TILE_WIDTH: usize = 8;

/// Height of a full tile in rows.
pub const TILE_HEIGHT: usize = 8;

/// Pixels in one full tile.
pub const TILE_PIXELS: usize = TILE_WIDTH * TILE_HEIGHT;

/// Which sub-pixel of a packed byte comes first in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PixelOrdering {
    /// The most significant bit group holds the leftmost pixel.
    #[default]
    #[serde(rename = "in")]
    InOrder,
    /// The least significant bit group holds the leftmost pixel.
    #[serde(rename = "reverse")]
    ReverseOrder,
}

/// Immutable description of a linear tile encoding.
///
/// All derived values are computed once in [`TileFormat::new`]. The value is
/// `Copy` and carries no buffers, so one instance can serve any number of
/// concurrent decode/encode calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FormatFields", into = "FormatFields")]
pub struct TileFormat {
    bits_per_pixel: u8,
    ordering: PixelOrdering,
    stride_tiles: i32,
    bytes_per_row: usize,
    pixels_per_byte: usize,
    pixel_mask: u8,
    tile_size: usize,
    color_count: usize,
}

impl TileFormat {
    /// Build a format, validating bit depth and stride.
    ///
    /// `bits_per_pixel` must divide 8 (1, 2, 4 or 8). `stride_tiles` is the
    /// number of extra tile-widths of padding after every encoded row: 0 for
    /// tightly packed tiles, `columns - 1` for tiles embedded in a sheet, and
    /// -1 for a zero row pitch.
    pub fn new(
        bits_per_pixel: u8,
        ordering: PixelOrdering,
        stride_tiles: i32,
    ) -> Result<Self, TileError> {
        if bits_per_pixel == 0 || 8 % bits_per_pixel != 0 {
            return Err(TileError::InvalidFormat(format!(
                "{} bits per pixel does not divide 8",
                bits_per_pixel
            )));
        }
        if stride_tiles < -1 {
            return Err(TileError::InvalidFormat(format!(
                "stride of {} tiles is below -1",
                stride_tiles
            )));
        }

        Ok(Self::derive(bits_per_pixel, ordering, stride_tiles))
    }

    /// Compute the derived fields. Callers must have validated the inputs.
    const fn derive(bits_per_pixel: u8, ordering: PixelOrdering, stride_tiles: i32) -> Self {
        // 8 pixels per row / 8 bits per byte
        let bytes_per_row = bits_per_pixel as usize;

        Self {
            bits_per_pixel,
            ordering,
            stride_tiles,
            bytes_per_row,
            pixels_per_byte: 8 / bits_per_pixel as usize,
            pixel_mask: ((1u16 << bits_per_pixel) - 1) as u8,
            tile_size: bytes_per_row * TILE_HEIGHT,
            color_count: 1 << bits_per_pixel,
        }
    }

    /// Same format with a different pixel ordering.
    pub fn with_ordering(self, ordering: PixelOrdering) -> Self {
        Self { ordering, ..self }
    }

    /// Same format with a different stride. Revalidates the stride.
    pub fn with_stride(self, stride_tiles: i32) -> Result<Self, TileError> {
        Self::new(self.bits_per_pixel, self.ordering, stride_tiles)
    }

    pub fn bits_per_pixel(&self) -> u8 {
        self.bits_per_pixel
    }

    pub fn ordering(&self) -> PixelOrdering {
        self.ordering
    }

    pub fn stride_tiles(&self) -> i32 {
        self.stride_tiles
    }

    /// Encoded bytes per 8-pixel row.
    pub fn bytes_per_row(&self) -> usize {
        self.bytes_per_row
    }

    pub fn pixels_per_byte(&self) -> usize {
        self.pixels_per_byte
    }

    /// Mask selecting one pixel's bit group, e.g. 0b1111 for 4bpp.
    pub fn pixel_mask(&self) -> u8 {
        self.pixel_mask
    }

    /// Encoded size of one full tile, ignoring stride padding.
    pub fn tile_size(&self) -> usize {
        self.tile_size
    }

    /// Number of distinct palette indices a pixel can take.
    pub fn color_count(&self) -> usize {
        self.color_count
    }

    /// Padding bytes inserted after each encoded row. Negative for stride -1.
    pub fn stride_bytes(&self) -> isize {
        self.stride_tiles as isize * self.bytes_per_row as isize
    }

    /// Distance in bytes between the starts of two consecutive rows.
    pub fn row_pitch(&self) -> usize {
        // stride_tiles >= -1 keeps this non-negative
        (self.bytes_per_row as isize + self.stride_bytes()) as usize
    }

    /// Number of bytes touched when walking `rows` rows from a tile's start.
    pub fn encoded_span(&self, rows: usize) -> usize {
        match rows {
            0 => 0,
            n => (n - 1) * self.row_pitch() + self.bytes_per_row,
        }
    }

    /// Bit-group indices of one byte, in output order.
    ///
    /// `InOrder` walks from the highest group down to 0, `ReverseOrder` from 0
    /// up. Index `i` selects bits `bpp * i .. bpp * (i + 1)`.
    pub fn pixel_indices(&self) -> impl Iterator<Item = usize> {
        let count = self.pixels_per_byte;
        let ordering = self.ordering;
        (0..count).map(move |k| match ordering {
            PixelOrdering::InOrder => count - 1 - k,
            PixelOrdering::ReverseOrder => k,
        })
    }

    /// Fail with `BufferTooShort` unless `len` bytes cover `rows` rows at `offset`.
    pub fn check_buffer(&self, len: usize, offset: usize, rows: usize) -> Result<(), TileError> {
        let required = offset.saturating_add(self.encoded_span(rows));
        if len < required {
            return Err(TileError::BufferTooShort {
                required,
                actual: len,
            });
        }
        Ok(())
    }
}

impl Default for TileFormat {
    /// 4bpp linear, in order, tightly packed.
    fn default() -> Self {
        Self::derive(4, PixelOrdering::InOrder, 0)
    }
}

/// Serialized shape of a [`TileFormat`]; derived fields are recomputed.
#[derive(Serialize, Deserialize)]
struct FormatFields {
    bits_per_pixel: u8,
    #[serde(default)]
    ordering: PixelOrdering,
    #[serde(default)]
    stride_tiles: i32,
}

impl TryFrom<FormatFields> for TileFormat {
    type Error = TileError;

    fn try_from(fields: FormatFields) -> Result<Self, Self::Error> {
        Self::new(fields.bits_per_pixel, fields.ordering, fields.stride_tiles)
    }
}

impl From<TileFormat> for FormatFields {
    fn from(format: TileFormat) -> Self {
        Self {
            bits_per_pixel: format.bits_per_pixel,
            ordering: format.ordering,
            stride_tiles: format.stride_tiles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_fields() {
        // (bpp, bytes/row, pixels/byte, mask, tile size, colors)
        let cases = [
            (1u8, 1usize, 8usize, 0x01u8, 8usize, 2usize),
            (2, 2, 4, 0x03, 16, 4),
            (4, 4, 2, 0x0F, 32, 16),
            (8, 8, 1, 0xFF, 64, 256),
        ];

        for (bpp, bytes_per_row, pixels_per_byte, mask, tile_size, colors) in cases {
            let format = TileFormat::new(bpp, PixelOrdering::InOrder, 0).unwrap();
            assert_eq!(format.bytes_per_row(), bytes_per_row, "{}bpp", bpp);
            assert_eq!(format.pixels_per_byte(), pixels_per_byte, "{}bpp", bpp);
            assert_eq!(format.pixel_mask(), mask, "{}bpp", bpp);
            assert_eq!(format.tile_size(), tile_size, "{}bpp", bpp);
            assert_eq!(format.color_count(), colors, "{}bpp", bpp);
        }
    }

    #[test]
    fn test_invalid_bit_depths() {
        for bpp in [0u8, 3, 5, 6, 7, 9, 16] {
            let result = TileFormat::new(bpp, PixelOrdering::InOrder, 0);
            assert!(
                matches!(result, Err(TileError::InvalidFormat(_))),
                "{}bpp should be rejected",
                bpp
            );
        }
    }

    #[test]
    fn test_stride_bounds() {
        assert!(TileFormat::new(4, PixelOrdering::InOrder, -1).is_ok());
        assert!(TileFormat::new(4, PixelOrdering::InOrder, 7).is_ok());
        assert!(matches!(
            TileFormat::new(4, PixelOrdering::InOrder, -2),
            Err(TileError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_row_pitch_and_span() {
        let packed = TileFormat::new(4, PixelOrdering::InOrder, 0).unwrap();
        assert_eq!(packed.stride_bytes(), 0);
        assert_eq!(packed.row_pitch(), 4);
        assert_eq!(packed.encoded_span(8), packed.tile_size());
        assert_eq!(packed.encoded_span(0), 0);

        let sheet = TileFormat::new(4, PixelOrdering::InOrder, 1).unwrap();
        assert_eq!(sheet.stride_bytes(), 4);
        assert_eq!(sheet.row_pitch(), 8);
        // Last row has no trailing padding
        assert_eq!(sheet.encoded_span(8), 7 * 8 + 4);

        let flat = TileFormat::new(2, PixelOrdering::InOrder, -1).unwrap();
        assert_eq!(flat.stride_bytes(), -2);
        assert_eq!(flat.row_pitch(), 0);
        assert_eq!(flat.encoded_span(8), 2);
    }

    #[test]
    fn test_pixel_indices_order() {
        let format = TileFormat::new(2, PixelOrdering::InOrder, 0).unwrap();
        assert_eq!(format.pixel_indices().collect::<Vec<_>>(), vec![3, 2, 1, 0]);

        let format = format.with_ordering(PixelOrdering::ReverseOrder);
        assert_eq!(format.pixel_indices().collect::<Vec<_>>(), vec![0, 1, 2, 3]);

        let format = TileFormat::new(8, PixelOrdering::InOrder, 0).unwrap();
        assert_eq!(format.pixel_indices().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_check_buffer() {
        let format = TileFormat::default();
        assert!(format.check_buffer(32, 0, 8).is_ok());
        assert_eq!(
            format.check_buffer(40, 16, 8),
            Err(TileError::BufferTooShort {
                required: 48,
                actual: 40
            })
        );
        // Huge offsets saturate instead of overflowing
        assert!(format.check_buffer(40, usize::MAX, 8).is_err());
    }

    #[test]
    fn test_default_matches_constructor() {
        assert_eq!(
            TileFormat::default(),
            TileFormat::new(4, PixelOrdering::InOrder, 0).unwrap()
        );
    }

    #[test]
    fn test_default_derived_fields() {
        let format = TileFormat::default();
        assert_eq!(format.bytes_per_row(), 4);
        assert_eq!(format.pixels_per_byte(), 2);
        assert_eq!(format.pixel_mask(), 0x0F);
        assert_eq!(format.tile_size(), 32);
        assert_eq!(format.color_count(), 16);
    }

    #[test]
    fn test_serde_roundtrip_and_validation() {
        let format = TileFormat::new(2, PixelOrdering::ReverseOrder, 3).unwrap();
        let json = serde_json::to_string(&format).expect("serialize");
        let back: TileFormat = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, format);

        let parsed: TileFormat = serde_json::from_str(r#"{"bits_per_pixel": 8}"#).unwrap();
        assert_eq!(parsed.ordering(), PixelOrdering::InOrder);
        assert_eq!(parsed.stride_tiles(), 0);

        let bad = serde_json::from_str::<TileFormat>(r#"{"bits_per_pixel": 3}"#);
        assert!(bad.is_err());
        let bad = serde_json::from_str::<TileFormat>(
            r#"{"bits_per_pixel": 4, "ordering": "reverse", "stride_tiles": -5}"#,
        );
        assert!(bad.is_err());
    }
}
