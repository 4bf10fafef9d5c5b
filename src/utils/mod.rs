//! Shared utilities.

pub mod hash;

pub use hash::{compute_checksums, digest_bytes, digest_reader};
