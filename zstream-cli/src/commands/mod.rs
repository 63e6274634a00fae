//! Command implementations for the zstream CLI.

pub mod compress;
pub mod decompress;

pub use compress::{CompressOptions, cmd_compress};
pub use decompress::cmd_decompress;
pub use test::cmd_test;
