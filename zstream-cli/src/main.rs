//! zstream CLI - raw DEFLATE streams from the command line
//!
//! Compresses, decompresses and verifies raw DEFLATE (RFC 1951) files,
//! feeding the codec in bounded chunks through its streaming session API.

mod commands;
mod utils;

use clap::{Parser, Subcommand, ValueEnum};
use commands::{CompressOptions, cmd_compress, cmd_decompress, cmd_test};
use std::path::PathBuf;
use tracing::{Level, error};
use tracing_subscriber::FmtSubscriber;
use zstream_core::checksum::ChecksumKind;
use zstream_deflate::Strategy;

#[derive(Parser)]
#[command(name = "zstream")]
#[command(author, version, about = "Streaming raw DEFLATE compressor")]
#[command(long_about = "
zstream reads and writes raw DEFLATE streams (no zlib or gzip wrapper),
processing input and output in fixed-size chunks.

Examples:
  zstream compress data.txt
  zstream compress -l 9 --window-bits 12 data.txt -o data.deflate
  zstream decompress data.txt.deflate
  zstream test --chunk-size 1 data.txt.deflate
")]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a file to raw DEFLATE
    #[command(alias = "c")]
    Compress {
        /// File to compress
        input: PathBuf,

        /// Output file (defaults to <input>.deflate)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Compression level (0 = store, 9 = best)
        #[arg(short, long, default_value = "6", value_parser = clap::value_parser!(u8).range(0..=9))]
        level: u8,

        /// Base-two logarithm of the window size
        #[arg(short, long, default_value = "15", value_parser = clap::value_parser!(u8).range(8..=15))]
        window_bits: u8,

        /// Memory level; sets how much input forms one block
        #[arg(short, long, default_value = "8", value_parser = clap::value_parser!(u8).range(1..=9))]
        mem_level: u8,

        /// Matching strategy
        #[arg(short, long, value_enum, default_value = "default")]
        strategy: StrategyArg,

        /// Running checksum reported at the end
        #[arg(long, value_enum, default_value = "crc32")]
        checksum: ChecksumArg,

        /// Bytes of input and output handed to the codec per call
        #[arg(long, default_value = "65536")]
        chunk_size: usize,

        /// Show progress bar
        #[arg(short = 'P', long)]
        progress: bool,
    },

    /// Decompress a raw DEFLATE file
    #[command(alias = "d")]
    Decompress {
        /// File to decompress
        input: PathBuf,

        /// Output file (defaults to the input without .deflate)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Base-two logarithm of the window size the stream was written with
        #[arg(short, long, default_value = "15", value_parser = clap::value_parser!(u8).range(8..=15))]
        window_bits: u8,

        /// Running checksum reported at the end
        #[arg(long, value_enum, default_value = "crc32")]
        checksum: ChecksumArg,

        /// Bytes of input and output handed to the codec per call
        #[arg(long, default_value = "65536")]
        chunk_size: usize,

        /// Show progress bar
        #[arg(short = 'P', long)]
        progress: bool,
    },

    /// Verify that a raw DEFLATE file decodes cleanly
    #[command(alias = "t")]
    Test {
        /// File to test
        input: PathBuf,

        /// Base-two logarithm of the window size the stream was written with
        #[arg(short, long, default_value = "15", value_parser = clap::value_parser!(u8).range(8..=15))]
        window_bits: u8,

        /// Running checksum reported at the end
        #[arg(long, value_enum, default_value = "crc32")]
        checksum: ChecksumArg,

        /// Bytes of input and output handed to the codec per call
        #[arg(long, default_value = "65536")]
        chunk_size: usize,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

/// Matching strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    /// Normal matching
    Default,
    /// Drop short matches
    Filtered,
    /// Literals only
    HuffmanOnly,
    /// Distance-one matches only
    Rle,
    /// Fixed Huffman codes only
    Fixed,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Default => Strategy::Default,
            StrategyArg::Filtered => Strategy::Filtered,
            StrategyArg::HuffmanOnly => Strategy::HuffmanOnly,
            StrategyArg::Rle => Strategy::Rle,
            StrategyArg::Fixed => Strategy::Fixed,
        }
    }
}

/// Running checksum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ChecksumArg {
    /// CRC-32
    Crc32,
    /// Adler-32
    Adler32,
    /// No checksum
    None,
}

impl From<ChecksumArg> for ChecksumKind {
    fn from(arg: ChecksumArg) -> Self {
        match arg {
            ChecksumArg::Crc32 => ChecksumKind::Crc32,
            ChecksumArg::Adler32 => ChecksumKind::Adler32,
            ChecksumArg::None => ChecksumKind::None,
        }
    }
}

fn init_logging(log_level: &str) {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: could not install logger: {}", e);
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let result = match cli.command {
        Commands::Compress {
            input,
            output,
            level,
            window_bits,
            mem_level,
            strategy,
            checksum,
            chunk_size,
            progress,
        } => cmd_compress(
            &input,
            output,
            CompressOptions {
                level,
                window_bits,
                mem_level,
                strategy: strategy.into(),
                checksum: checksum.into(),
                chunk_size: chunk_size.max(1),
                progress,
            },
        ),
        Commands::Decompress {
            input,
            output,
            window_bits,
            checksum,
            chunk_size,
            progress,
        } => cmd_decompress(
            &input,
            output,
            window_bits,
            checksum.into(),
            chunk_size.max(1),
            progress,
        ),
        Commands::Test {
            input,
            window_bits,
            checksum,
            chunk_size,
            verbose,
        } => cmd_test(
            &input,
            window_bits,
            checksum.into(),
            chunk_size.max(1),
            verbose,
        ),
    };

    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}
