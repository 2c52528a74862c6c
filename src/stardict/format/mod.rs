//! File format parsing layer for StarDict dictionaries.
//!
//! This module provides the mid-level parsing layer that bridges between
//! raw file I/O and the high-level [`StarDict`](crate::stardict::reader::StarDict).
//!
//! # Module Organization
//!
//! - [`ifo`]: Parses the `.ifo` metadata file
//! - [`index`]: Loads and parses the sorted `.idx` word list
//! - [`dictzip`]: Parses the dictzip header and builds the chunk table
//!
//! # Architecture
//!
//! ```text
//! Dictionary files:
//! ┌──────────────────┐
//! │  name.ifo        │ ← ifo::parse()
//! ├──────────────────┤
//! │  name.idx(.gz)   │ ← index::load_index_blob() + index::build_index()
//! ├──────────────────┤
//! │  name.dict.dz    │ ← dictzip::parse()
//! │  (gzip header,   │
//! │   chunk table,   │
//! │   deflate data)  │
//! └──────────────────┘
//! ```

pub mod dictzip;
pub mod ifo;
pub mod index;
