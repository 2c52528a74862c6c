//! `.ifo` metadata file parsing.
//!
//! ```text
//! StarDict's dict ifo file
//! version=2.4.2
//! wordcount=1234
//! idxfilesize=56789
//! bookname=Example Dictionary
//! sametypesequence=m
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{debug, warn};

use crate::stardict::types::error::{IoContext, Result, StardictError};
use crate::stardict::types::models::{DictInfo, EntryFormat};

/// First line of every `.ifo` file.
pub const IFO_SIGNATURE: &str = "StarDict's dict ifo file";

/// Parses the `.ifo` file at `path`.
pub fn parse(path: &Path) -> Result<DictInfo> {
    debug!("Parsing ifo file: {}", path.display());
    let file = File::open(path).at("opening", path)?;
    let mut lines = Vec::new();
    for line in BufReader::new(file).lines() {
        lines.push(line.at("reading", path)?);
    }
    parse_lines(lines.iter().map(String::as_str))
}

/// Parses `.ifo` content already split into lines.
pub fn parse_lines<'a>(mut lines: impl Iterator<Item = &'a str>) -> Result<DictInfo> {
    match lines.next() {
        Some(first) if first.trim_end() == IFO_SIGNATURE => {}
        _ => {
            return Err(StardictError::InvalidMetadata(
                "invalid ifo file signature".to_string(),
            ));
        }
    }

    let mut word_count = None;
    let mut idx_filesize = None;
    let mut entry_format = None;
    let mut info = DictInfo {
        version: None,
        word_count: 0,
        idx_filesize: 0,
        entry_format: EntryFormat::Utf8Text,
        book_name: None,
        author: None,
        email: None,
        website: None,
        description: None,
        date: None,
    };

    for line in lines {
        let line = line.trim_end_matches(['\r', '\n']);
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        match key.trim() {
            "wordcount" => word_count = Some(parse_number(key, value)?),
            "idxfilesize" => idx_filesize = Some(parse_number(key, value)?),
            "sametypesequence" => entry_format = parse_entry_format(value),
            "idxoffsetbits" => {
                if parse_number(key, value)? == 64 {
                    return Err(StardictError::InvalidMetadata(
                        "64-bit index offsets are not supported".to_string(),
                    ));
                }
            }
            "bookname" => info.book_name = non_empty(value),
            "version" => info.version = non_empty(value),
            "author" => info.author = non_empty(value),
            "email" => info.email = non_empty(value),
            "website" => info.website = non_empty(value),
            "description" => info.description = non_empty(value),
            "date" => info.date = non_empty(value),
            _ => {}
        }
    }

    info.word_count = word_count
        .filter(|&n| n != 0)
        .ok_or(StardictError::MissingMetadataKey("wordcount"))?;
    info.idx_filesize = idx_filesize
        .filter(|&n| n != 0)
        .ok_or(StardictError::MissingMetadataKey("idxfilesize"))?;
    info.entry_format = entry_format.ok_or(StardictError::MissingMetadataKey("sametypesequence"))?;

    debug!(
        "ifo: wordcount={}, idxfilesize={}, sametypesequence={}, bookname={:?}",
        info.word_count, info.idx_filesize, info.entry_format, info.book_name
    );
    Ok(info)
}

/// Reads only the `bookname` of an `.ifo` file.
pub fn read_book_name(path: &Path) -> Result<Option<String>> {
    let file = File::open(path).at("opening", path)?;
    let mut book_name = None;
    for line in BufReader::new(file).lines() {
        let line = line.at("reading", path)?;
        if let Some(value) = line.strip_prefix("bookname=") {
            book_name = non_empty(value);
        }
    }
    Ok(book_name)
}

fn parse_number(key: &str, value: &str) -> Result<u32> {
    value.trim().parse().map_err(|e| {
        StardictError::InvalidMetadata(format!("invalid {} '{}': {}", key, value.trim(), e))
    })
}

fn parse_entry_format(value: &str) -> Option<EntryFormat> {
    let value = value.trim();
    let code = *value.as_bytes().first()?;
    if value.len() > 1 {
        warn!(
            "sametypesequence '{}' has several fields, using only '{}'",
            value, code as char
        );
    }
    Some(EntryFormat::from(code))
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
