//! Resumability tests: decoding and encoding through the session API in
//! chunks of every size must give the same bytes as a single call.

use zstream_core::checksum::{Adler32, ChecksumKind};
use zstream_core::crc::Crc32;
use zstream_core::traits::{FlushMode, Status};
use zstream_deflate::{DeflateConfig, InflateConfig, Stream, StreamIo, deflate, deflate_with};

fn lcg_text(len: usize, seed: u32) -> Vec<u8> {
    let words: [&[u8]; 12] = [
        b"alpha ", b"beta ", b"gamma ", b"delta ", b"window ", b"stream ", b"bits ", b"of ",
        b"the ", b"code ", b"\n", b"0123456789 ",
    ];
    let mut state = seed;
    let mut out = Vec::with_capacity(len);
    while out.len() < len {
        state = state.wrapping_mul(1103515245).wrapping_add(12345);
        out.extend_from_slice(words[(state >> 16) as usize % words.len()]);
        if state % 7 == 0 {
            out.push((state >> 8) as u8);
        }
    }
    out.truncate(len);
    out
}

/// Decode through a [`Stream`], offering at most `in_step` input bytes and
/// `out_step` output bytes per call. Returns the output and the call count.
fn inflate_chunked(
    compressed: &[u8],
    config: InflateConfig,
    in_step: usize,
    out_step: usize,
) -> (Vec<u8>, usize) {
    let mut stream = Stream::new();
    assert_eq!(stream.inflate_init_with(config), Status::Ok);

    let mut output = Vec::new();
    let mut buffer = vec![0u8; out_step];
    let mut pos = 0;
    let mut calls = 0;

    loop {
        let end = (pos + in_step).min(compressed.len());
        let mut io = StreamIo::new(&compressed[pos..end], &mut buffer);
        let status = stream.inflate(&mut io);
        let consumed = end - pos - io.avail_in();
        let produced = out_step - io.avail_out();
        calls += 1;

        pos += consumed;
        output.extend_from_slice(&buffer[..produced]);

        match status {
            Status::StreamEnd => break,
            Status::Ok => {}
            Status::BufError => assert!(pos < compressed.len(), "stalled at end of input"),
            other => panic!("unexpected status {:?}: {:?}", other, stream.msg()),
        }
    }

    assert_eq!(stream.total_in(), pos as u64);
    assert_eq!(stream.total_out(), output.len() as u64);
    assert_eq!(stream.end(), Status::Ok);
    (output, calls)
}

/// Encode through a [`Stream`] in chunks, finishing on the last one.
fn deflate_chunked(
    input: &[u8],
    config: DeflateConfig,
    in_step: usize,
    out_step: usize,
    flush: FlushMode,
) -> Vec<u8> {
    let mut stream = Stream::new();
    assert_eq!(stream.deflate_init_with(config), Status::Ok);

    let mut compressed = Vec::new();
    let mut buffer = vec![0u8; out_step];
    let mut pos = 0;

    loop {
        let end = (pos + in_step).min(input.len());
        let mode = if end == input.len() {
            FlushMode::Finish
        } else {
            flush
        };
        let mut io = StreamIo::new(&input[pos..end], &mut buffer);
        let status = stream.deflate(&mut io, mode);
        pos = end - io.avail_in();
        let produced = out_step - io.avail_out();
        compressed.extend_from_slice(&buffer[..produced]);

        match status {
            Status::StreamEnd => break,
            Status::Ok | Status::BufError => {}
            other => panic!("unexpected status {:?}", other),
        }
    }

    assert_eq!(stream.total_in(), input.len() as u64);
    compressed
}

#[test]
fn test_inflate_any_chunking() {
    let input = lcg_text(20_000, 11);
    for level in [0u8, 1, 6, 9] {
        let compressed = deflate(&input, level).unwrap();
        let (reference, _) =
            inflate_chunked(&compressed, InflateConfig::DEFAULT, compressed.len(), 1 << 16);
        assert_eq!(reference, input);

        for (in_step, out_step) in [(1, 1 << 16), (1 << 16, 1), (1, 1), (3, 5), (64, 7), (7, 1000)] {
            let (output, _) =
                inflate_chunked(&compressed, InflateConfig::DEFAULT, in_step, out_step);
            assert_eq!(
                output, reference,
                "level {} in_step {} out_step {}",
                level, in_step, out_step
            );
        }
    }
}

#[test]
fn test_inflate_chunking_small_window() {
    let input = lcg_text(12_000, 5);
    let config = DeflateConfig::DEFAULT.with_window_bits(9);
    let compressed = deflate_with(&input, config).unwrap();

    for (in_step, out_step) in [(1, 1), (2, 3), (1000, 1), (1, 600)] {
        let (output, _) = inflate_chunked(&compressed, InflateConfig::new(9), in_step, out_step);
        assert_eq!(output, input);
    }
}

#[test]
fn test_buffer_full_cycling_takes_one_call_per_byte() {
    let payload = lcg_text(10_000, 99);
    for level in [0u8, 6] {
        let compressed = deflate(&payload, level).unwrap();
        let (output, calls) =
            inflate_chunked(&compressed, InflateConfig::DEFAULT, compressed.len(), 1);
        assert_eq!(output, payload);
        assert_eq!(calls, 10_000, "level {}", level);
    }
}

#[test]
fn test_deflate_any_chunking() {
    let input = lcg_text(60_000, 21);
    let reference = deflate_with(&input, DeflateConfig::DEFAULT).unwrap();

    for (in_step, out_step) in [(1, 1 << 16), (1 << 16, 1), (13, 17), (4096, 4096)] {
        let compressed = deflate_chunked(
            &input,
            DeflateConfig::DEFAULT,
            in_step,
            out_step,
            FlushMode::NoFlush,
        );
        // Without flushes the block boundaries do not depend on chunking.
        assert_eq!(compressed, reference, "in_step {} out_step {}", in_step, out_step);
    }
}

#[test]
fn test_deflate_with_flushes_round_trips() {
    let input = lcg_text(30_000, 8);
    for flush in [
        FlushMode::PartialFlush,
        FlushMode::SyncFlush,
        FlushMode::FullFlush,
    ] {
        for level in [0u8, 1, 6] {
            let config = DeflateConfig::new(level.into());
            let compressed = deflate_chunked(&input, config, 1000, 333, flush);
            let (output, _) =
                inflate_chunked(&compressed, InflateConfig::DEFAULT, 100, 100);
            assert_eq!(output, input, "flush {:?} level {}", flush, level);
        }
    }
}

#[test]
fn test_sync_flush_output_is_decodable_so_far() {
    let mut stream = Stream::new();
    stream.deflate_init(6);
    let mut compressed = vec![0u8; 4096];
    let mut io = StreamIo::new(b"first part, first part. ", &mut compressed);
    assert_eq!(stream.deflate(&mut io, FlushMode::SyncFlush), Status::Ok);
    let len = stream.total_out() as usize;
    assert_eq!(&compressed[len - 4..len], &[0x00, 0x00, 0xFF, 0xFF]);

    let mut decoder = Stream::new();
    decoder.inflate_init();
    let mut output = [0u8; 64];
    let mut io = StreamIo::new(&compressed[..len], &mut output);
    assert_eq!(decoder.inflate(&mut io), Status::Ok);
    assert_eq!(&output[..decoder.total_out() as usize], b"first part, first part. ");
}

#[test]
fn test_checksum_matches_across_chunking() {
    let input = lcg_text(25_000, 3);

    // CRC-32 of the whole equals the fold over any split.
    let mut crc = Crc32::new();
    for chunk in input.chunks(997) {
        crc.update(chunk);
    }
    assert_eq!(crc.value(), Crc32::compute(&input));

    let mut adler = Adler32::new();
    for chunk in input.chunks(1) {
        adler.update(chunk);
    }
    assert_eq!(adler.value(), Adler32::checksum(&input));

    let compressed = deflate(&input, 6).unwrap();
    for kind in [ChecksumKind::Crc32, ChecksumKind::Adler32] {
        let expected = match kind {
            ChecksumKind::Adler32 => Adler32::checksum(&input),
            _ => Crc32::compute(&input),
        };

        for out_step in [1usize, 13, 4096] {
            let mut stream = Stream::new();
            stream.inflate_init_with(InflateConfig::DEFAULT.with_checksum(kind));
            let mut buffer = vec![0u8; out_step];
            let mut pos = 0;
            loop {
                let mut io = StreamIo::new(&compressed[pos..], &mut buffer);
                let status = stream.inflate(&mut io);
                pos = compressed.len() - io.avail_in();
                if status == Status::StreamEnd {
                    break;
                }
                assert_eq!(status, Status::Ok);
            }
            assert_eq!(stream.checksum(), Some(expected), "{:?} step {}", kind, out_step);
        }

        let mut encoder = Stream::new();
        encoder.deflate_init_with(DeflateConfig::DEFAULT.with_checksum(kind));
        let mut out = vec![0u8; compressed.len() * 2];
        let mut io = StreamIo::new(&input, &mut out);
        assert_eq!(encoder.deflate(&mut io, FlushMode::Finish), Status::StreamEnd);
        assert_eq!(encoder.checksum(), Some(expected));
    }
}

#[test]
fn test_inflate_reset_reuses_stream() {
    let first = deflate(b"first stream", 6).unwrap();
    let second = deflate(b"second stream", 1).unwrap();

    let mut stream = Stream::new();
    stream.inflate_init();
    let mut output = [0u8; 64];
    let mut io = StreamIo::new(&first, &mut output);
    assert_eq!(stream.inflate(&mut io), Status::StreamEnd);

    assert_eq!(stream.inflate_reset(), Status::Ok);
    assert_eq!(stream.total_in(), 0);
    let mut io = StreamIo::new(&second, &mut output);
    assert_eq!(stream.inflate(&mut io), Status::StreamEnd);
    assert_eq!(&output[..stream.total_out() as usize], b"second stream");
}

#[test]
fn test_stream_end_then_more_calls() {
    let compressed = deflate(b"done", 6).unwrap();
    let mut stream = Stream::new();
    stream.inflate_init();
    let mut output = [0u8; 16];
    let mut io = StreamIo::new(&compressed, &mut output);
    assert_eq!(stream.inflate(&mut io), Status::StreamEnd);
    let mut io = StreamIo::new(&[1, 2, 3], &mut output);
    assert_eq!(stream.inflate(&mut io), Status::StreamEnd);
    assert_eq!(io.avail_in(), 3);
}
