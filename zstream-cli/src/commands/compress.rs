//! Compress command implementation.

use crate::utils::{
    CliResult, create_progress_bar, default_output, drive_deflate, ratio, status_error,
};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::info;
use zstream_core::checksum::ChecksumKind;
use zstream_core::traits::{CompressionLevel, Status};
use zstream_deflate::{DeflateConfig, Stream, Strategy};

/// Compressor settings gathered from the command line.
#[derive(Debug, Clone, Copy)]
pub struct CompressOptions {
    pub level: u8,
    pub window_bits: u8,
    pub mem_level: u8,
    pub strategy: Strategy,
    pub checksum: ChecksumKind,
    pub chunk_size: usize,
    pub progress: bool,
}

impl CompressOptions {
    fn config(&self) -> DeflateConfig {
        DeflateConfig::new(CompressionLevel::new(self.level))
            .with_window_bits(self.window_bits)
            .with_mem_level(self.mem_level)
            .with_strategy(self.strategy)
            .with_checksum(self.checksum)
    }
}

pub fn cmd_compress(
    input: &Path,
    output: Option<PathBuf>,
    options: CompressOptions,
) -> CliResult<()> {
    let output = output.unwrap_or_else(|| default_output(input, true));
    let config = options.config();

    let mut stream = Stream::new();
    let status = stream.deflate_init_with(config);
    if status != Status::Ok {
        return Err(status_error("compressor setup", status, &stream));
    }

    let file = File::open(input)?;
    let len = file.metadata()?.len();
    let mut reader = BufReader::new(file);
    let mut writer = BufWriter::new(File::create(&output)?);

    info!(
        input = %input.display(),
        output = %output.display(),
        level = options.level,
        window_bits = config.effective_window_bits(),
        strategy = ?options.strategy,
        "compressing"
    );

    let pb = create_progress_bar(len, options.progress);
    let summary = drive_deflate(&mut stream, &mut reader, &mut writer, options.chunk_size, &pb)?;
    pb.finish_and_clear();
    stream.end();

    let percent = format!("{:.1}%", ratio(summary.total_out, summary.total_in));
    let checksum = summary
        .checksum
        .map(|c| format!("{:08x}", c))
        .unwrap_or_default();
    info!(
        total_in = summary.total_in,
        total_out = summary.total_out,
        ratio = %percent,
        checksum = %checksum,
        "compressed"
    );
    println!(
        "{} -> {}: {} -> {} bytes ({})",
        input.display(),
        output.display(),
        summary.total_in,
        summary.total_out,
        percent
    );

    Ok(())
}
