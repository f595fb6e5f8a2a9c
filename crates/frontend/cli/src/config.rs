use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::Path;
use tilerip_core::{Placement, PixelOrdering, SheetLayout, TileError, TileFormat};

/// Pixel ordering as spelled on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OrderingArg {
    /// Leftmost pixel in the high bits
    In,
    /// Leftmost pixel in the low bits
    Reverse,
}

impl From<OrderingArg> for PixelOrdering {
    fn from(arg: OrderingArg) -> Self {
        match arg {
            OrderingArg::In => PixelOrdering::InOrder,
            OrderingArg::Reverse => PixelOrdering::ReverseOrder,
        }
    }
}

/// Command-line overrides for the config file
#[derive(Debug, Default, clap::Args)]
pub struct Overrides {
    /// Bits per pixel (1, 2, 4 or 8)
    #[arg(long)]
    pub bpp: Option<u8>,

    /// Pixel ordering inside a byte
    #[arg(long, value_enum)]
    pub ordering: Option<OrderingArg>,

    /// Extra tile-widths of padding after each row (-1 for zero pitch)
    #[arg(long, allow_hyphen_values = true)]
    pub stride: Option<i32>,

    /// Byte offset of the first tile
    #[arg(long)]
    pub start: Option<usize>,

    /// Bytes between consecutive tiles
    #[arg(long)]
    pub step: Option<usize>,

    /// Number of tiles per file
    #[arg(long)]
    pub count: Option<usize>,

    /// Rows decoded per tile (1-8)
    #[arg(long)]
    pub rows: Option<usize>,

    /// Concatenate decoded pixels into rows of this width
    #[arg(long, conflicts_with = "columns")]
    pub width: Option<u32>,

    /// Lay tiles out in a grid with this many columns
    #[arg(long)]
    pub columns: Option<u32>,

    /// Grey level step per palette index
    #[arg(long)]
    pub scale: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetConfig {
    #[serde(default = "default_format", deserialize_with = "deserialize_format")]
    pub format: TileFormat,
    #[serde(default)]
    pub layout: SheetLayout,
    #[serde(default = "default_scale")]
    pub scale: u8,
}

fn default_format() -> TileFormat {
    TileFormat::default().with_ordering(PixelOrdering::ReverseOrder)
}

/// Tile format as written in a config file; every field is optional.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FormatEntry {
    bits_per_pixel: Option<u8>,
    ordering: Option<PixelOrdering>,
    stride_tiles: Option<i32>,
}

impl FormatEntry {
    /// Fill gaps from the default badge format and validate.
    fn resolve(self) -> Result<TileFormat, TileError> {
        let base = default_format();
        TileFormat::new(
            self.bits_per_pixel.unwrap_or(base.bits_per_pixel()),
            self.ordering.unwrap_or(base.ordering()),
            self.stride_tiles.unwrap_or(base.stride_tiles()),
        )
    }
}

fn deserialize_format<'de, D>(deserializer: D) -> std::result::Result<TileFormat, D::Error>
where
    D: Deserializer<'de>,
{
    FormatEntry::deserialize(deserializer)?
        .resolve()
        .map_err(serde::de::Error::custom)
}

fn default_scale() -> u8 {
    8
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            layout: SheetLayout::default(),
            scale: default_scale(),
        }
    }
}

impl SheetConfig {
    /// Load a JSON config file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }

    /// Apply command-line overrides, revalidating the tile format.
    pub fn apply(&mut self, overrides: &Overrides) -> Result<()> {
        let format = self.format;
        self.format = TileFormat::new(
            overrides.bpp.unwrap_or(format.bits_per_pixel()),
            overrides
                .ordering
                .map(PixelOrdering::from)
                .unwrap_or(format.ordering()),
            overrides.stride.unwrap_or(format.stride_tiles()),
        )?;

        let layout = &mut self.layout;
        if let Some(start) = overrides.start {
            layout.start = start;
        }
        if let Some(step) = overrides.step {
            layout.step = step;
        }
        if let Some(count) = overrides.count {
            layout.count = count;
        }
        if let Some(rows) = overrides.rows {
            layout.rows_per_tile = rows;
        }
        if let Some(width) = overrides.width {
            layout.placement = Placement::Stream { width };
        }
        if let Some(columns) = overrides.columns {
            layout.placement = Placement::Grid { columns };
        }
        if let Some(scale) = overrides.scale {
            self.scale = scale;
        }
        Ok(())
    }
}
