//! Round-trip tests across every supported linear format.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tilerip_core::{LinearCodec, PixelOrdering, TileCodec, TileFormat};

const ORDERINGS: [PixelOrdering; 2] = [PixelOrdering::InOrder, PixelOrdering::ReverseOrder];

fn all_formats() -> Vec<TileFormat> {
    let mut formats = Vec::new();
    for bpp in [1u8, 2, 4, 8] {
        for ordering in ORDERINGS {
            for stride in [0, 1, 2] {
                formats.push(TileFormat::new(bpp, ordering, stride).unwrap());
            }
        }
    }
    formats
}

#[test]
fn pixels_survive_encode_then_decode() {
    let mut rng = StdRng::seed_from_u64(0x7117);

    for format in all_formats() {
        let codec = LinearCodec::new(format);
        for _ in 0..16 {
            let pixels: Vec<u8> = (0..64)
                .map(|_| rng.gen_range(0..format.color_count()) as u8)
                .collect();

            let encoded = codec.encode_tile(&pixels).unwrap();
            let decoded = codec.decode_tile(&encoded, 0).unwrap();
            assert_eq!(decoded, pixels, "{:?}", format);
        }
    }
}

#[test]
fn bytes_survive_decode_then_encode() {
    let mut rng = StdRng::seed_from_u64(42);

    for bpp in [1u8, 2, 4, 8] {
        for ordering in ORDERINGS {
            let codec = LinearCodec::new(TileFormat::new(bpp, ordering, 0).unwrap());
            for _ in 0..16 {
                let mut data = vec![0u8; codec.tile_size()];
                rng.fill(&mut data[..]);

                let pixels = codec.decode_tile(&data, 0).unwrap();
                assert_eq!(codec.encode_tile(&pixels).unwrap(), data, "{}bpp {:?}", bpp, ordering);
            }
        }
    }
}

#[test]
fn encode_in_place_at_offset_round_trips() {
    let mut rng = StdRng::seed_from_u64(7);

    for format in all_formats() {
        let codec = LinearCodec::new(format);
        let offset = 3;
        let mut data = vec![0u8; offset + format.encoded_span(8) + 5];
        rng.fill(&mut data[..]);
        let before = data.clone();

        let pixels: Vec<u8> = (0..64)
            .map(|_| rng.gen_range(0..format.color_count()) as u8)
            .collect();
        codec.encode(&pixels, &mut data, offset).unwrap();

        assert_eq!(codec.decode_tile(&data, offset).unwrap(), pixels, "{:?}", format);
        assert_eq!(&data[..offset], &before[..offset]);
        let end = offset + format.encoded_span(8);
        assert_eq!(&data[end..], &before[end..]);
    }
}

#[test]
fn sheet_tiles_decode_independently() {
    // A 3-column sheet: tile n of a row sits n * bytes_per_row into each row
    for bpp in [1u8, 2, 4, 8] {
        let format = TileFormat::new(bpp, PixelOrdering::InOrder, 2).unwrap();
        let codec = LinearCodec::new(format);
        let mut sheet = vec![0u8; format.encoded_span(8) + 2 * format.bytes_per_row()];

        let tiles: Vec<Vec<u8>> = (0..3u8)
            .map(|n| vec![(n as usize % format.color_count()) as u8; 64])
            .collect();
        for (n, tile) in tiles.iter().enumerate() {
            codec
                .encode(tile, &mut sheet, n * format.bytes_per_row())
                .unwrap();
        }
        for (n, tile) in tiles.iter().enumerate() {
            let decoded = codec.decode_tile(&sheet, n * format.bytes_per_row()).unwrap();
            assert_eq!(&decoded, tile, "{}bpp tile {}", bpp, n);
        }
    }
}

#[test]
fn codec_is_shared_across_threads() {
    let codec = LinearCodec::new(TileFormat::new(2, PixelOrdering::ReverseOrder, 0).unwrap());

    std::thread::scope(|scope| {
        for seed in 0..4u64 {
            let codec = &codec;
            scope.spawn(move || {
                let mut rng = StdRng::seed_from_u64(seed);
                let pixels: Vec<u8> = (0..64).map(|_| rng.gen_range(0..4)).collect();
                let encoded = codec.encode_tile(&pixels).unwrap();
                assert_eq!(codec.decode_tile(&encoded, 0).unwrap(), pixels);
            });
        }
    });
}
