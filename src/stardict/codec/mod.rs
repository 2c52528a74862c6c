//! Codec layer for decompression.
//!
//! # Submodules
//!
//! - [`inflate`][]: Raw deflate decompression of single dictzip chunks
//!
//! Gzip-compressed index files are streamed through `flate2::read::GzDecoder`
//! directly in [`format::index`](crate::stardict::format::index).

pub mod inflate;
