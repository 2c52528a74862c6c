use std::fs::File;
use std::path::{Path, PathBuf};

use log::{debug, info};

use super::container::DictZip;
use super::discover::DictLocation;
use super::format::{ifo, index};
use super::format::index::WordIndex;
use super::iter::RangeIter;
use super::types::error::{IoContext, Result, StardictError};
use super::types::models::*;
use super::utils;

/// The dictionary body holding entry data.
#[derive(Debug)]
pub enum DictBody {
    /// `<name>.dict.dz`
    Compressed(DictZip),
    /// `<name>.dict`
    Plain { file: File, path: PathBuf, len: u64 },
}

impl DictBody {
    /// Reads `size` bytes at `offset` of the uncompressed body.
    pub fn read(&mut self, offset: u64, size: u32) -> Result<Vec<u8>> {
        match self {
            DictBody::Compressed(dz) => dz.read(offset, size),
            DictBody::Plain { file, path, len } => {
                if offset.checked_add(size as u64).is_none_or(|end| end > *len) {
                    return Err(StardictError::BodyOutOfRange {
                        offset,
                        size,
                        body_len: *len,
                    });
                }
                let mut buf = utils::try_alloc(size as usize)
                    .ok_or(StardictError::Allocation { bytes: size as u64 })?;
                utils::read_exact_at(file, &mut buf, offset).at("reading entry from", path.as_path())?;
                Ok(buf)
            }
        }
    }
}

/// An open StarDict dictionary.
///
/// Holds the parsed `.ifo` metadata, the whole word index, and the dictionary
/// body. Entry reads take `&mut self` because the compressed body caches
/// decompressed chunks.
#[derive(Debug)]
pub struct StarDict {
    dir: PathBuf,
    name: String,
    info: DictInfo,
    index: WordIndex,
    body: Option<DictBody>,
}

impl StarDict {
    /// Opens dictionary `name` in `dir`.
    ///
    /// Reads `<name>.ifo`, loads `<name>.idx.gz` or `<name>.idx`, and opens
    /// `<name>.dict.dz`, falling back to an uncompressed `<name>.dict`. A
    /// dictionary without a body still opens; its entries cannot be read.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The `.ifo` file is missing or invalid
    /// - The index cannot be read or does not hold `wordcount` records
    /// - The `.dict.dz` header is malformed
    pub fn open(dir: impl AsRef<Path>, name: &str) -> Result<Self> {
        let dir = dir.as_ref();
        info!("Opening StarDict dictionary '{}' in {}", name, dir.display());

        let info = ifo::parse(&dir.join(format!("{}.ifo", name)))?;

        let blob = index::load_index_blob(dir, name, info.idx_filesize)?;
        let index = index::build_index(blob, info.word_count)?;

        let body = open_body(dir, name)?;

        info!(
            "Dictionary opened: '{}', {} words, format '{}', body={}",
            info.book_name.as_deref().unwrap_or(name),
            index.len(),
            info.entry_format,
            match &body {
                Some(DictBody::Compressed(_)) => "dict.dz",
                Some(DictBody::Plain { .. }) => "dict",
                None => "none",
            }
        );

        Ok(Self {
            dir: dir.to_path_buf(),
            name: name.to_string(),
            info,
            index,
            body,
        })
    }

    /// Opens a dictionary found by [`DictPaths`](crate::stardict::discover::DictPaths).
    pub fn open_location(location: &DictLocation) -> Result<Self> {
        Self::open(&location.dir, &location.name)
    }

    pub fn info(&self) -> &DictInfo {
        &self.info
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn book_name(&self) -> Option<&str> {
        self.info.book_name.as_deref()
    }

    pub fn entry_format(&self) -> EntryFormat {
        self.info.entry_format
    }

    /// Number of words in the index.
    pub fn word_count(&self) -> usize {
        self.index.len()
    }

    pub fn index(&self) -> &WordIndex {
        &self.index
    }

    pub fn body(&self) -> Option<&DictBody> {
        self.body.as_ref()
    }

    /// Looks up the range of words starting with `prefix`, ignoring ASCII case.
    pub fn lookup(&self, prefix: &str) -> Option<LookupRange> {
        let range = self.index.search_prefix(prefix);
        debug!("Lookup '{}': {:?}", prefix, range);
        range
    }

    /// Word at index position `idx`, or `None` past the end.
    pub fn word(&self, idx: usize) -> Option<&str> {
        self.index.word(idx)
    }

    pub fn record(&self, idx: usize) -> Option<IndexRecord<'_>> {
        self.index.get(idx)
    }

    /// Loads the entry for the word at index position `idx`.
    pub fn entry(&mut self, idx: usize) -> Result<Entry> {
        let record = self.index.get(idx).ok_or(StardictError::EntryOutOfRange {
            index: idx,
            word_count: self.index.len(),
        })?;
        let (offset, size) = (record.data_offset as u64, record.data_size);

        let body = self
            .body
            .as_mut()
            .ok_or_else(|| StardictError::MissingBody(self.dir.join(&self.name)))?;
        let data = body.read(offset, size)?;

        Ok(Entry {
            format: self.info.entry_format,
            data,
        })
    }

    /// Reads raw bytes of the uncompressed body.
    pub fn read_raw(&mut self, offset: u64, size: u32) -> Result<Vec<u8>> {
        match self.body.as_mut() {
            Some(body) => body.read(offset, size),
            None => Err(StardictError::MissingBody(self.dir.join(&self.name))),
        }
    }

    /// Iterates over `(word, entry)` pairs of a lookup result.
    pub fn iter_range(&mut self, range: LookupRange) -> RangeIter<'_> {
        RangeIter::new(self, range)
    }

    /// Closes the dictionary, releasing the body's file handle and caches.
    pub fn close(self) {
        debug!("Closing dictionary '{}'", self.name);
        if let Some(DictBody::Compressed(dz)) = self.body {
            dz.close();
        }
    }
}

fn open_body(dir: &Path, name: &str) -> Result<Option<DictBody>> {
    let dz_path = dir.join(format!("{}.dict.dz", name));
    if dz_path.is_file() {
        return DictZip::open(&dz_path).map(|dz| Some(DictBody::Compressed(dz)));
    }

    let plain_path = dir.join(format!("{}.dict", name));
    if plain_path.is_file() {
        let file = File::open(&plain_path).at("opening", &plain_path)?;
        let len = file.metadata().at("reading metadata of", &plain_path)?.len();
        return Ok(Some(DictBody::Plain {
            file,
            path: plain_path,
            len,
        }));
    }

    debug!("No dictionary body found for '{}' in {}", name, dir.display());
    Ok(None)
}
