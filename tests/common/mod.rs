//! Builders for dictzip containers and complete StarDict dictionaries.
#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::{Compress, Compression, FlushCompress, Status};

/// Optional gzip header fields written before the chunk data.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeaderExtras<'a> {
    pub name: Option<&'a str>,
    pub comment: Option<&'a str>,
    pub header_crc: bool,
}

/// Deterministic text-like payload of `len` bytes.
pub fn sample_payload(len: usize) -> Vec<u8> {
    const WORDS: &[&str] = &[
        "lorem ", "ipsum ", "dolor ", "sit ", "amet, ", "consectetur ", "adipiscing ",
        "elit. ", "sed ", "do ", "eiusmod ", "tempor\n",
    ];
    let mut out = Vec::with_capacity(len + 16);
    let mut i = 0usize;
    while out.len() < len {
        out.extend_from_slice(WORDS[(i * 7 + i / 3) % WORDS.len()].as_bytes());
        out.extend_from_slice(format!("{} ", i).as_bytes());
        i += 1;
    }
    out.truncate(len);
    out
}

/// Compresses `payload` as one raw deflate stream, fully flushed every `chunk_size` bytes.
pub fn deflate_chunks(payload: &[u8], chunk_size: usize) -> Vec<Vec<u8>> {
    let mut compress = Compress::new(Compression::default(), false);
    let pieces: Vec<&[u8]> = payload.chunks(chunk_size).collect();
    let count = pieces.len();

    pieces
        .iter()
        .enumerate()
        .map(|(i, piece)| {
            let is_last = i + 1 == count;
            let flush = if is_last {
                FlushCompress::Finish
            } else {
                FlushCompress::Full
            };
            let start_in = compress.total_in();
            let mut out = Vec::with_capacity(piece.len() + 64);
            loop {
                if out.capacity() - out.len() < 64 {
                    out.reserve(piece.len() + 64);
                }
                let consumed = (compress.total_in() - start_in) as usize;
                let status = compress
                    .compress_vec(&piece[consumed..], &mut out, flush)
                    .expect("deflate chunk");
                let consumed = (compress.total_in() - start_in) as usize;
                let done = if is_last {
                    status == Status::StreamEnd
                } else {
                    consumed == piece.len() && out.len() < out.capacity()
                };
                if done {
                    break;
                }
            }
            out
        })
        .collect()
}

/// Builds a complete dictzip file for `payload`.
pub fn dictzip_bytes(payload: &[u8], chunk_size: u16, extras: HeaderExtras<'_>) -> Vec<u8> {
    let chunks = deflate_chunks(payload, chunk_size as usize);
    let chunk_count = chunks.len() as u16;

    let mut flags = 0x04u8;
    if extras.header_crc {
        flags |= 0x02;
    }
    if extras.name.is_some() {
        flags |= 0x08;
    }
    if extras.comment.is_some() {
        flags |= 0x10;
    }

    let mut out = vec![0x1f, 0x8b, 0x08, flags, 0, 0, 0, 0, 0, 3];
    let extra_len = 10 + 2 * chunk_count;
    out.extend_from_slice(&extra_len.to_le_bytes());
    out.extend_from_slice(b"RA");
    out.extend_from_slice(&(extra_len - 4).to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&chunk_size.to_le_bytes());
    out.extend_from_slice(&chunk_count.to_le_bytes());
    for chunk in &chunks {
        let size = u16::try_from(chunk.len()).expect("compressed chunk fits in u16");
        out.extend_from_slice(&size.to_le_bytes());
    }

    if let Some(name) = extras.name {
        out.extend_from_slice(name.as_bytes());
        out.push(0);
    }
    if let Some(comment) = extras.comment {
        out.extend_from_slice(comment.as_bytes());
        out.push(0);
    }
    if extras.header_crc {
        let crc = (crc32fast::hash(&out) & 0xffff) as u16;
        out.extend_from_slice(&crc.to_le_bytes());
    }

    for chunk in &chunks {
        out.extend_from_slice(chunk);
    }

    // gzip trailer
    out.extend_from_slice(&crc32fast::hash(payload).to_le_bytes());
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out
}

/// Raw `.idx` contents: NUL-terminated word, then big-endian offset and size.
pub fn index_blob(records: &[(&str, u32, u32)]) -> Vec<u8> {
    let mut blob = Vec::new();
    for (word, offset, size) in records {
        blob.extend_from_slice(word.as_bytes());
        blob.push(0);
        blob.extend_from_slice(&offset.to_be_bytes());
        blob.extend_from_slice(&size.to_be_bytes());
    }
    blob
}

/// How the dictionary body is stored on disk.
#[derive(Debug, Clone, Copy)]
pub enum Body {
    DictZip { chunk_size: u16 },
    Plain,
    Missing,
}

/// A dictionary written into a directory by [`DictFixture::write`].
#[derive(Debug)]
pub struct WrittenDict {
    pub payload: Vec<u8>,
    pub records: Vec<(String, u32, u32)>,
}

/// A StarDict dictionary to write for a test.
#[derive(Debug, Clone)]
pub struct DictFixture<'a> {
    pub name: &'a str,
    pub book_name: Option<&'a str>,
    pub format: char,
    /// `(word, definition)` pairs, already in index order.
    pub entries: &'a [(&'a str, &'a str)],
    pub body: Body,
    pub gzip_index: bool,
}

impl<'a> DictFixture<'a> {
    pub fn new(name: &'a str, entries: &'a [(&'a str, &'a str)]) -> Self {
        Self {
            name,
            book_name: Some("Test Dictionary"),
            format: 'm',
            entries,
            body: Body::DictZip { chunk_size: 64 },
            gzip_index: false,
        }
    }

    /// Writes `.ifo`, `.idx`/`.idx.gz` and the body into `dir`.
    pub fn write(&self, dir: &Path) -> WrittenDict {
        let mut payload = Vec::new();
        let mut records = Vec::new();
        for (word, definition) in self.entries {
            records.push((
                word.to_string(),
                payload.len() as u32,
                definition.len() as u32,
            ));
            payload.extend_from_slice(definition.as_bytes());
        }

        let record_refs: Vec<(&str, u32, u32)> = records
            .iter()
            .map(|(word, offset, size)| (word.as_str(), *offset, *size))
            .collect();
        let blob = index_blob(&record_refs);

        let mut ifo = format!(
            "StarDict's dict ifo file\nversion=2.4.2\nwordcount={}\nidxfilesize={}\n",
            self.entries.len(),
            blob.len()
        );
        if let Some(book_name) = self.book_name {
            ifo.push_str(&format!("bookname={}\n", book_name));
        }
        ifo.push_str(&format!("sametypesequence={}\n", self.format));
        fs::write(dir.join(format!("{}.ifo", self.name)), ifo).expect("write ifo");

        if self.gzip_index {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(&blob).expect("gzip index");
            let gz = encoder.finish().expect("finish gzip");
            fs::write(dir.join(format!("{}.idx.gz", self.name)), gz).expect("write idx.gz");
        } else {
            fs::write(dir.join(format!("{}.idx", self.name)), &blob).expect("write idx");
        }

        match self.body {
            Body::DictZip { chunk_size } => {
                let dz = dictzip_bytes(&payload, chunk_size, HeaderExtras::default());
                fs::write(dir.join(format!("{}.dict.dz", self.name)), dz).expect("write dict.dz");
            }
            Body::Plain => {
                fs::write(dir.join(format!("{}.dict", self.name)), &payload).expect("write dict");
            }
            Body::Missing => {}
        }

        WrittenDict { payload, records }
    }
}
