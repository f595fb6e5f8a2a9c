//! Palette-indexed tile codecs and sheet assembly.
//!
//! [`tile`] moves 8x8 tiles between packed bytes and palette indices;
//! [`sheet`] decodes runs of tiles out of a resource file into one frame.

pub mod sheet;
pub mod tile;

pub use sheet::{assemble, IndexedFrame, Placement, SheetError, SheetLayout};
pub use tile::{codec_for, LinearCodec, PixelOrdering, TileCodec, TileError, TileFormat};
