//! Core StarDict reader module
//!
//! A dictionary is a set of files sharing a name:
//!
//! ```text
//! <name>.ifo                   metadata (word count, index size, entry format)
//! <name>.idx | <name>.idx.gz   sorted words with (offset, size) into the body
//! <name>.dict.dz | <name>.dict entry data, dictzip-compressed or plain
//! ```
//!
//! [`StarDict`] ties them together. [`DictZip`] gives random access into a
//! compressed body on its own.

pub mod cache;
pub mod codec;
pub mod container;
pub mod discover;
pub mod format;
pub mod iter;
pub mod markup;
pub mod reader;
pub mod search;
pub mod types;
mod utils;

pub use container::DictZip;
pub use discover::{DictLocation, DictPaths};
pub use reader::{DictBody, StarDict};
pub use types::error::{FormatError, Result, StardictError};
pub use types::models;
