//! Dictzip container header parsing.
//!
//! A dictzip file is a gzip file whose header carries a random-access table
//! in its extra field:
//!
//! ```text
//! [0..2]    0x1f 0x8b            gzip magic
//! [2]       0x08                 method (deflate)
//! [3]       flags                FHCRC=0x02, FEXTRA=0x04 (required), FNAME=0x08, FCOMMENT=0x10
//! [4..10]   mtime, xfl, os       ignored
//! [10..12]  extra field length   (LE)
//! [12..14]  'R' 'A'              dictzip sub-field id
//! [14..16]  sub-field length     (LE)
//! [16..18]  version              (LE, expected 1)
//! [18..20]  chunk length         (LE, decompressed bytes per chunk)
//! [20..22]  chunk count N        (LE)
//! [22..]    N x compressed size  (LE u16 each)
//! [...]     NUL-terminated original file name   (FNAME)
//! [...]     NUL-terminated comment              (FCOMMENT)
//! [...]     2 byte header CRC                   (FHCRC)
//! [...]     N concatenated deflate chunks
//! ```

use std::fs::File;
use std::io::Read;
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};
use log::{debug, trace, warn};

use crate::stardict::types::error::{FormatError, IoContext, Result, StardictError};
use crate::stardict::types::models::ChunkMeta;
use crate::stardict::utils;

const GZ_MAGIC: [u8; 2] = [0x1f, 0x8b];
const GZ_METHOD_DEFLATE: u8 = 0x08;

const GZ_FLAG_CRC: u8 = 0x02;
const GZ_FLAG_EXTRA_FIELD: u8 = 0x04;
const GZ_FLAG_NAME: u8 = 0x08;
const GZ_FLAG_COMMENT: u8 = 0x10;

const DICTZIP_MAGIC: [u8; 2] = [b'R', b'A'];
const DICTZIP_VERSION: u16 = 1;

const GZIP_HEADER_SIZE: usize = 10;
/// Gzip header plus the fixed part of the dictzip extra field.
const HEADER_SIZE: usize = GZIP_HEADER_SIZE + 12;
/// Fixed part of the dictzip sub-field (id, length, version, chunk length, count).
const SUBFIELD_FIXED_SIZE: usize = 10;

/// Bytes read up front before the chunk count is known.
pub const HEADER_WINDOW: usize = 4096;
/// Room left after the chunk table for the optional name and comment.
pub const MAX_HEADER_COMMENTS: usize = 1024;

/// Result of parsing a dictzip header.
#[derive(Debug)]
pub struct DictzipHeader {
    pub version: u16,
    /// Decompressed size of every chunk but the last.
    pub chunk_size: u16,
    pub chunks: Vec<ChunkMeta>,
    /// Offset of the first compressed chunk.
    pub data_offset: u64,
}

/// The leading bytes of the file, grown on demand.
struct HeaderWindow<'f> {
    file: &'f mut File,
    bytes: Vec<u8>,
    eof: bool,
}

impl<'f> HeaderWindow<'f> {
    fn new(file: &'f mut File) -> Self {
        Self {
            file,
            bytes: Vec::new(),
            eof: false,
        }
    }

    /// Reads until the window holds `len` bytes or the file ends.
    fn grow_to(&mut self, len: usize) -> std::io::Result<()> {
        if self.eof || self.bytes.len() >= len {
            return Ok(());
        }
        let wanted = (len - self.bytes.len()) as u64;
        let read = self
            .file
            .by_ref()
            .take(wanted)
            .read_to_end(&mut self.bytes)?;
        if (read as u64) < wanted {
            self.eof = true;
        }
        Ok(())
    }

    fn require(&self, len: usize) -> std::result::Result<(), FormatError> {
        if self.bytes.len() < len {
            return Err(FormatError::TruncatedHeader {
                needed: len,
                available: self.bytes.len(),
            });
        }
        Ok(())
    }

    fn u16_at(&self, offset: usize) -> u16 {
        LittleEndian::read_u16(&self.bytes[offset..offset + 2])
    }
}

/// Parses the header of the dictzip file at `path` and builds its chunk table.
///
/// The file is left open and positioned arbitrarily; later reads must be
/// positioned reads.
pub fn parse(file: &mut File, path: &Path) -> Result<DictzipHeader> {
    debug!("Parsing dictzip header of {}", path.display());

    let file_len = file.metadata().at("reading metadata of", path)?.len();
    let mut window = HeaderWindow::new(file);
    window
        .grow_to(HEADER_WINDOW)
        .at("reading header of", path)?;
    window.require(HEADER_SIZE)?;

    let header = &window.bytes;
    if header[0..2] != GZ_MAGIC {
        return Err(FormatError::BadMagic(header[0], header[1]).into());
    }
    if header[2] != GZ_METHOD_DEFLATE {
        return Err(FormatError::UnsupportedMethod(header[2]).into());
    }

    let flags = header[3];
    if flags & GZ_FLAG_EXTRA_FIELD == 0 {
        return Err(FormatError::MissingExtraField.into());
    }

    let extra_len = window.u16_at(10);
    if header[12..14] != DICTZIP_MAGIC {
        return Err(FormatError::BadContainerMagic(header[12] as char, header[13] as char).into());
    }

    let version = window.u16_at(16);
    let chunk_size = window.u16_at(18);
    let chunk_count = window.u16_at(20);
    trace!(
        "Header fields: flags={:#04x}, extra_len={}, version={}, chunk_size={}, chunk_count={}",
        flags, extra_len, version, chunk_size, chunk_count
    );

    if version != DICTZIP_VERSION {
        warn!(
            "Unexpected dictzip version {} in {}, continuing",
            version,
            path.display()
        );
    }
    if chunk_size == 0 {
        return Err(FormatError::ZeroChunkSize.into());
    }
    if SUBFIELD_FIXED_SIZE + 2 * chunk_count as usize > extra_len as usize {
        return Err(FormatError::ChunkTableOverflow {
            chunk_count,
            extra_len,
        }
        .into());
    }

    // The table must be fully buffered, with room for the name and comment after it.
    let table_end = HEADER_SIZE + 2 * chunk_count as usize;
    let extra_end = GZIP_HEADER_SIZE + 2 + extra_len as usize;
    window
        .grow_to(extra_end.max(table_end) + MAX_HEADER_COMMENTS)
        .at("reading chunk table of", path)?;
    window.require(extra_end)?;

    let mut offset = extra_end;
    if flags & GZ_FLAG_NAME != 0 {
        offset = skip_c_string(&window.bytes, offset)?;
    }
    if flags & GZ_FLAG_COMMENT != 0 {
        offset = skip_c_string(&window.bytes, offset)?;
    }
    if flags & GZ_FLAG_CRC != 0 {
        if offset + 2 > window.bytes.len() {
            return Err(FormatError::HeaderOverrun {
                window: window.bytes.len(),
            }
            .into());
        }
        verify_header_crc(&window.bytes[..offset], window.u16_at(offset), path);
        offset += 2;
    }

    let mut chunks = Vec::with_capacity(chunk_count as usize);
    let mut file_offset = offset as u64;
    for i in 0..chunk_count as usize {
        let compressed_size = window.u16_at(HEADER_SIZE + 2 * i);
        chunks.push(ChunkMeta {
            compressed_size,
            file_offset,
        });
        file_offset += compressed_size as u64;
    }

    if file_offset > file_len {
        return Err(FormatError::ChunkDataPastEof {
            end: file_offset,
            file_len,
        }
        .into());
    }

    debug!(
        "Dictzip header parsed: {} chunks of {} bytes, data at offset {}",
        chunks.len(),
        chunk_size,
        offset
    );

    Ok(DictzipHeader {
        version,
        chunk_size,
        chunks,
        data_offset: offset as u64,
    })
}

/// Returns the offset just past the NUL-terminated string starting at `offset`.
fn skip_c_string(bytes: &[u8], offset: usize) -> std::result::Result<usize, StardictError> {
    let rest = bytes.get(offset..).unwrap_or_default();
    match utils::find_nul(rest) {
        Some(len) => Ok(offset + len + 1),
        None => Err(FormatError::HeaderOverrun {
            window: bytes.len(),
        }
        .into()),
    }
}

fn verify_header_crc(header: &[u8], stored: u16, path: &Path) {
    let actual = (crc32fast::hash(header) & 0xffff) as u16;
    if actual != stored {
        warn!(
            "Header CRC mismatch in {}: stored {:#06x}, computed {:#06x}",
            path.display(),
            stored,
            actual
        );
    }
}
