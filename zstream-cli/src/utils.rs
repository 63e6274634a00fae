//! Utility functions for the CLI.

use indicatif::{ProgressBar, ProgressStyle};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use zstream_core::traits::{FlushMode, Status};
use zstream_deflate::{Stream, StreamIo};

/// Extension given to compressed files when no output path is named.
pub const DEFLATE_EXTENSION: &str = "deflate";

/// Boxed error used by every command.
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Create a byte-counting progress bar with standard styling.
pub fn create_progress_bar(len: u64, enable: bool) -> ProgressBar {
    if !enable {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓▒░ ");
    pb.set_style(style);
    pb
}

/// Totals reported once a stream has been driven to its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSummary {
    /// Bytes fed to the codec.
    pub total_in: u64,
    /// Bytes the codec produced.
    pub total_out: u64,
    /// Running checksum over the uncompressed side, if one was kept.
    pub checksum: Option<u32>,
    /// Input bytes left over after the end of the compressed stream.
    pub trailing: u64,
}

impl StreamSummary {
    fn from_stream(stream: &Stream, trailing: u64) -> Self {
        Self {
            total_in: stream.total_in(),
            total_out: stream.total_out(),
            checksum: stream.checksum(),
            trailing,
        }
    }
}

/// Compressed size as a percentage of the uncompressed size.
pub fn ratio(compressed: u64, uncompressed: u64) -> f64 {
    if uncompressed == 0 {
        return 100.0;
    }
    compressed as f64 / uncompressed as f64 * 100.0
}

/// Turn a failing status into an error carrying the stream's message.
pub fn status_error(operation: &str, status: Status, stream: &Stream) -> Box<dyn std::error::Error> {
    let detail = stream.msg().unwrap_or("no further detail");
    format!("{} failed with {:?} ({}): {}", operation, status, status.code(), detail).into()
}

/// Default output path: `<input>.deflate` when compressing, the input with
/// that extension stripped (or `.out` appended) when decompressing.
pub fn default_output(input: &Path, compress: bool) -> PathBuf {
    if compress {
        let mut name = input.as_os_str().to_owned();
        name.push(".");
        name.push(DEFLATE_EXTENSION);
        return PathBuf::from(name);
    }

    match input.extension() {
        Some(ext) if ext == DEFLATE_EXTENSION => input.with_extension(""),
        _ => {
            let mut name = input.as_os_str().to_owned();
            name.push(".out");
            PathBuf::from(name)
        }
    }
}

/// Compress everything `reader` yields into `writer`, `chunk_size` bytes of
/// input and output at a time.
pub fn drive_deflate<R: Read, W: Write>(
    stream: &mut Stream,
    reader: &mut R,
    writer: &mut W,
    chunk_size: usize,
    pb: &ProgressBar,
) -> CliResult<StreamSummary> {
    let mut in_buf = vec![0u8; chunk_size];
    let mut out_buf = vec![0u8; chunk_size];

    loop {
        let filled = reader.read(&mut in_buf)?;
        let flush = if filled == 0 {
            FlushMode::Finish
        } else {
            FlushMode::NoFlush
        };

        let mut offset = 0;
        loop {
            let mut io = StreamIo::new(&in_buf[offset..filled], &mut out_buf);
            let status = stream.deflate(&mut io, flush);
            let consumed = filled - offset - io.avail_in();
            let produced = chunk_size - io.avail_out();

            offset += consumed;
            writer.write_all(&out_buf[..produced])?;
            pb.inc(consumed as u64);
            debug!(consumed, produced, ?status, "deflate chunk");

            match status {
                Status::StreamEnd => {
                    writer.flush()?;
                    return Ok(StreamSummary::from_stream(stream, 0));
                }
                Status::Ok | Status::BufError => {}
                other => return Err(status_error("compression", other, stream)),
            }

            if offset == filled && produced < chunk_size && flush != FlushMode::Finish {
                break;
            }
        }
    }
}

/// Decompress everything `reader` yields into `writer`, `chunk_size` bytes
/// of input and output at a time.
pub fn drive_inflate<R: Read, W: Write>(
    stream: &mut Stream,
    reader: &mut R,
    writer: &mut W,
    chunk_size: usize,
    pb: &ProgressBar,
) -> CliResult<StreamSummary> {
    let mut in_buf = vec![0u8; chunk_size];
    let mut out_buf = vec![0u8; chunk_size];

    loop {
        let filled = reader.read(&mut in_buf)?;

        let mut offset = 0;
        loop {
            let mut io = StreamIo::new(&in_buf[offset..filled], &mut out_buf);
            let status = stream.inflate(&mut io);
            let consumed = filled - offset - io.avail_in();
            let produced = chunk_size - io.avail_out();

            offset += consumed;
            writer.write_all(&out_buf[..produced])?;
            pb.inc(consumed as u64);
            debug!(consumed, produced, ?status, "inflate chunk");

            match status {
                Status::StreamEnd => {
                    writer.flush()?;
                    let trailing = (filled - offset) as u64 + drain_remaining(reader)?;
                    if trailing > 0 {
                        warn!(trailing, "ignoring bytes after the end of the stream");
                    }
                    return Ok(StreamSummary::from_stream(stream, trailing));
                }
                Status::Ok | Status::BufError => {}
                other => return Err(status_error("decompression", other, stream)),
            }

            if offset == filled && produced < chunk_size {
                break;
            }
        }

        if filled == 0 {
            return Err(format!(
                "compressed stream is truncated after {} bytes",
                stream.total_in()
            )
            .into());
        }
    }
}

fn drain_remaining<R: Read>(reader: &mut R) -> CliResult<u64> {
    Ok(std::io::copy(reader, &mut std::io::sink())?)
}
