//! Decompress command implementation.

use crate::utils::{CliResult, create_progress_bar, default_output, drive_inflate, status_error};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::info;
use zstream_core::checksum::ChecksumKind;
use zstream_core::traits::Status;
use zstream_deflate::{InflateConfig, Stream};

pub fn cmd_decompress(
    input: &Path,
    output: Option<PathBuf>,
    window_bits: u8,
    checksum: ChecksumKind,
    chunk_size: usize,
    progress: bool,
) -> CliResult<()> {
    let output = output.unwrap_or_else(|| default_output(input, false));

    let mut stream = Stream::new();
    let config = InflateConfig::new(window_bits).with_checksum(checksum);
    let status = stream.inflate_init_with(config);
    if status != Status::Ok {
        return Err(status_error("decompressor setup", status, &stream));
    }

    let file = File::open(input)?;
    let len = file.metadata()?.len();
    let mut reader = BufReader::new(file);
    let mut writer = BufWriter::new(File::create(&output)?);

    info!(input = %input.display(), output = %output.display(), window_bits, "decompressing");

    let pb = create_progress_bar(len, progress);
    let result = drive_inflate(&mut stream, &mut reader, &mut writer, chunk_size, &pb);
    pb.finish_and_clear();
    stream.end();

    let summary = match result {
        Ok(summary) => summary,
        Err(e) => {
            // A partial output file is worse than none.
            drop(writer);
            let _ = std::fs::remove_file(&output);
            return Err(e);
        }
    };

    let checksum = summary
        .checksum
        .map(|c| format!("{:08x}", c))
        .unwrap_or_default();
    info!(
        total_in = summary.total_in,
        total_out = summary.total_out,
        checksum = %checksum,
        "decompressed"
    );
    println!(
        "{} -> {}: {} -> {} bytes",
        input.display(),
        output.display(),
        summary.total_in,
        summary.total_out
    );

    Ok(())
}
