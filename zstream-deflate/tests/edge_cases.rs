//! Edge case tests for DEFLATE compression and decompression.

use zstream_core::traits::{FlushMode, Status};
use zstream_deflate::{
    DeflateConfig, InflateConfig, Strategy, Stream, StreamIo, deflate, deflate_with, inflate,
    inflate_with,
};

/// Deterministic test data: a small LCG choosing from an alphabet.
fn lcg_data(len: usize, seed: u32, alphabet: u32) -> Vec<u8> {
    let mut state = seed;
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(1103515245).wrapping_add(12345);
            ((state >> 16) % alphabet) as u8
        })
        .collect()
}

fn text_like(len: usize) -> Vec<u8> {
    let pattern = b"The quick brown fox jumps over the lazy dog. ";
    pattern.iter().copied().cycle().take(len).collect()
}

#[test]
fn test_empty_input() {
    for level in [0, 1, 6, 9] {
        let compressed = deflate(b"", level).unwrap();
        let decompressed = inflate(&compressed).unwrap();
        assert!(decompressed.is_empty());
    }
}

#[test]
fn test_empty_input_through_stream() {
    let mut compressed = [0u8; 16];
    let mut stream = Stream::new();
    assert_eq!(stream.deflate_init(6), Status::Ok);
    let mut io = StreamIo::new(&[], &mut compressed);
    assert_eq!(stream.deflate(&mut io, FlushMode::Finish), Status::StreamEnd);
    let len = stream.total_out() as usize;
    assert_eq!(stream.end(), Status::Ok);

    let mut output = [0u8; 16];
    assert_eq!(stream.inflate_init(), Status::Ok);
    let mut io = StreamIo::new(&compressed[..len], &mut output);
    assert_eq!(stream.inflate(&mut io), Status::StreamEnd);
    assert_eq!(stream.total_out(), 0);
    assert_eq!(stream.end(), Status::Ok);
}

#[test]
fn test_stored_block_scenario() {
    let input = b"AAAAAAAAAA";
    let mut compressed = [0u8; 64];
    let mut stream = Stream::new();
    assert_eq!(stream.deflate_init(0), Status::Ok);
    let mut io = StreamIo::new(input, &mut compressed);
    assert_eq!(stream.deflate(&mut io, FlushMode::Finish), Status::StreamEnd);
    let len = stream.total_out() as usize;
    assert_eq!(len, 15);
    stream.end();

    let mut output = [0u8; 64];
    assert_eq!(stream.inflate_init(), Status::Ok);
    let mut io = StreamIo::new(&compressed[..len], &mut output);
    assert_eq!(stream.inflate(&mut io), Status::StreamEnd);
    assert_eq!(stream.total_out(), 10);
    assert_eq!(&output[..10], input);
}

#[test]
fn test_single_byte() {
    let compressed = deflate(b"A", 6).unwrap();
    assert_eq!(inflate(&compressed).unwrap(), b"A");
}

#[test]
fn test_all_zeros() {
    let input = vec![0u8; 1000];
    let compressed = deflate(&input, 6).unwrap();
    assert_eq!(inflate(&compressed).unwrap(), input);
    assert!(compressed.len() < input.len() / 10);
}

#[test]
fn test_all_same_byte() {
    let input = vec![255u8; 5000];
    let compressed = deflate(&input, 6).unwrap();
    assert_eq!(inflate(&compressed).unwrap(), input);
    assert!(compressed.len() < input.len() / 20);
}

#[test]
fn test_max_match_length() {
    let input = vec![42u8; 258 * 10];
    let compressed = deflate(&input, 9).unwrap();
    assert_eq!(inflate(&compressed).unwrap(), input);
}

#[test]
fn test_all_literals() {
    // Every byte value, no repeats: a literal-only block.
    let input: Vec<u8> = (0..=255).collect();
    for level in [1, 6, 9] {
        let compressed = deflate(&input, level).unwrap();
        assert_eq!(inflate(&compressed).unwrap(), input);
    }
}

#[test]
fn test_random_data_all_levels() {
    let input = lcg_data(40_000, 1, 256);
    for level in 0..=9 {
        let compressed = deflate(&input, level).unwrap();
        assert_eq!(inflate(&compressed).unwrap(), input, "level {}", level);
    }
}

#[test]
fn test_alternating_pattern() {
    let input: Vec<u8> = (0..1000).map(|i| if i % 2 == 0 { b'A' } else { b'B' }).collect();
    let compressed = deflate(&input, 6).unwrap();
    assert_eq!(inflate(&compressed).unwrap(), input);
}

#[test]
fn test_large_input() {
    let input = text_like(1024 * 1024);
    let compressed = deflate(&input, 5).unwrap();
    assert_eq!(inflate(&compressed).unwrap(), input);
    assert!(compressed.len() < input.len() / 50);
}

#[test]
fn test_larger_than_stored_block() {
    let input = lcg_data(200_000, 9, 256);
    let config = DeflateConfig::STORE.with_mem_level(9);
    let compressed = deflate_with(&input, config).unwrap();
    assert_eq!(inflate(&compressed).unwrap(), input);
}

#[test]
fn test_every_strategy_and_level() {
    let mut input = text_like(20_000);
    input.extend(lcg_data(5_000, 3, 4));
    input.extend(vec![b'z'; 3_000]);

    for strategy in [
        Strategy::Default,
        Strategy::Filtered,
        Strategy::HuffmanOnly,
        Strategy::Rle,
        Strategy::Fixed,
    ] {
        for level in 0..=9u8 {
            let config = DeflateConfig::DEFAULT
                .with_level(level.into())
                .with_strategy(strategy);
            let compressed = deflate_with(&input, config).unwrap();
            assert_eq!(
                inflate(&compressed).unwrap(),
                input,
                "strategy {:?} level {}",
                strategy,
                level
            );
        }
    }
}

#[test]
fn test_three_window_sizes() {
    let mut input = text_like(10_000);
    input.extend(lcg_data(30_000, 5, 16));
    input.extend(text_like(10_000));

    for window_bits in [9u8, 12, 15] {
        for level in [1u8, 6, 9] {
            let config = DeflateConfig::DEFAULT
                .with_level(level.into())
                .with_window_bits(window_bits);
            let compressed = deflate_with(&input, config).unwrap();
            let decompressed =
                inflate_with(&compressed, InflateConfig::new(window_bits)).unwrap();
            assert_eq!(decompressed, input, "window {} level {}", window_bits, level);
        }
    }
}

#[test]
fn test_window_bits_eight_promoted() {
    let input = text_like(5_000);
    let config = DeflateConfig::DEFAULT.with_window_bits(8);
    let compressed = deflate_with(&input, config).unwrap();
    assert_eq!(inflate_with(&compressed, InflateConfig::new(9)).unwrap(), input);
}

#[test]
fn test_small_mem_level_many_blocks() {
    let input = text_like(50_000);
    let config = DeflateConfig::DEFAULT.with_mem_level(1);
    let compressed = deflate_with(&input, config).unwrap();
    assert_eq!(inflate(&compressed).unwrap(), input);
}

#[test]
fn test_compression_ratio() {
    let input = text_like(10_000);
    let fast = deflate(&input, 1).unwrap();
    let best = deflate(&input, 9).unwrap();
    assert!(best.len() <= fast.len());
    assert!(best.len() < input.len() / 20);
}
