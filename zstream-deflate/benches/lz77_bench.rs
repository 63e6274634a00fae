//! Benchmarks for the LZ77 match finder across levels and strategies.

use zstream_deflate::config::Strategy;
use zstream_deflate::lz77::{Lz77Encoder, Lz77Token};

fn main() {
    let test_cases = vec![
        ("small_random", generate_random(1024)),
        ("medium_random", generate_random(64 * 1024)),
        ("small_repeated", generate_repeated(1024)),
        ("medium_repeated", generate_repeated(64 * 1024)),
        ("small_text", generate_text_like(1024)),
        ("medium_text", generate_text_like(64 * 1024)),
        ("large_text", generate_text_like(256 * 1024)),
    ];

    println!("LZ77 Match Finder Benchmarks");
    println!("============================\n");

    for (name, data) in &test_cases {
        println!("Test: {} ({} bytes)", name, data.len());

        for level in [1, 4, 6, 9] {
            run_case(&format!("Level {}", level), data, level, Strategy::Default);
        }
        run_case("Rle     ", data, 6, Strategy::Rle);
        run_case("Filtered", data, 6, Strategy::Filtered);
        println!();
    }
}

fn run_case(label: &str, data: &[u8], level: u8, strategy: Strategy) {
    let start = std::time::Instant::now();
    let mut encoder = Lz77Encoder::with_params(32768, level, strategy);
    let tokens = encoder.compress(data);
    let elapsed = start.elapsed();

    let covered: usize = tokens.iter().map(Lz77Token::len).sum();
    let matches = tokens
        .iter()
        .filter(|t| matches!(t, Lz77Token::Match { .. }))
        .count();

    let throughput = data.len() as f64 / elapsed.as_secs_f64() / 1024.0 / 1024.0;
    let ratio = (data.len() as f64 / tokens.len() as f64).max(1.0);

    println!(
        "  {}: {:7.2} MB/s, {:6} tokens ({:6} matches), {:5.2}x, {:8} µs",
        label,
        throughput,
        tokens.len(),
        matches,
        ratio,
        elapsed.as_micros()
    );

    assert_eq!(covered, data.len());
}

fn generate_random(size: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(size);
    let mut seed = 12345u32;
    for _ in 0..size {
        seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
        data.push((seed >> 16) as u8);
    }
    data
}

fn generate_repeated(size: usize) -> Vec<u8> {
    let pattern = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    pattern.iter().copied().cycle().take(size).collect()
}

fn generate_text_like(size: usize) -> Vec<u8> {
    let words: [&[u8]; 10] = [
        b"the ", b"stream ", b"window ", b"of ", b"and ", b"block ", b"code ", b"a ", b"bits ",
        b"length ",
    ];
    let mut data = Vec::with_capacity(size);
    let mut seed = 67890u32;
    while data.len() < size {
        seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
        data.extend_from_slice(words[(seed >> 16) as usize % words.len()]);
    }
    data.truncate(size);
    data
}
