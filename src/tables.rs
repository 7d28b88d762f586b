//! Decoders for the two sample-table leaves a preview lookup needs.
//!
//! Each decoder first tries the full table layout. When the table is cut
//! short it falls back to the trailing value of the payload, which is where
//! the single entry of a one-sample track lives.

use crate::boxes::{FourCC, Mp4Box};
use crate::known_boxes::KnownBox;
use crate::parser::ParseError;
use byteorder::{BigEndian, ByteOrder, ReadBytesExt};
use std::io::Cursor;
use tracing::debug;

/// Sample Size Box data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StszData {
    pub version: u8,
    pub flags: u32,
    pub sample_size: u32,
    pub sample_count: u32,
    pub sample_sizes: Vec<u32>,
}

impl StszData {
    /// Size of the first sample, if the table describes any.
    pub fn first_sample_size(&self) -> Option<u32> {
        if self.sample_count == 0 {
            None
        } else if self.sample_size != 0 {
            Some(self.sample_size)
        } else {
            self.sample_sizes.first().copied()
        }
    }
}

/// Chunk offsets from either `stco` (widened) or `co64`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Co64Data {
    pub version: u8,
    pub flags: u32,
    pub entry_count: u32,
    pub chunk_offsets: Vec<u64>,
}

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoding {
    Table,
    TrailingBytes,
}

fn version_flags(cur: &mut Cursor<&[u8]>) -> std::io::Result<(u8, u32)> {
    let version = cur.read_u8()?;
    let flags = cur.read_u24::<BigEndian>()?;
    Ok((version, flags))
}

pub fn decode_stsz(payload: &[u8]) -> std::io::Result<StszData> {
    let mut cur = Cursor::new(payload);
    let (version, flags) = version_flags(&mut cur)?;
    let sample_size = cur.read_u32::<BigEndian>()?;
    let sample_count = cur.read_u32::<BigEndian>()?;
    let mut sample_sizes = Vec::new();

    // If sample_size is 0, each sample has its own size
    if sample_size == 0 {
        for _ in 0..sample_count {
            sample_sizes.push(cur.read_u32::<BigEndian>()?);
        }
    }

    Ok(StszData { version, flags, sample_size, sample_count, sample_sizes })
}

/// Decode `co64`, or `stco` when `wide` is false.
pub fn decode_chunk_offsets(payload: &[u8], wide: bool) -> std::io::Result<Co64Data> {
    let mut cur = Cursor::new(payload);
    let (version, flags) = version_flags(&mut cur)?;
    let entry_count = cur.read_u32::<BigEndian>()?;
    let mut chunk_offsets = Vec::new();

    for _ in 0..entry_count {
        let off = if wide {
            cur.read_u64::<BigEndian>()?
        } else {
            cur.read_u32::<BigEndian>()? as u64
        };
        chunk_offsets.push(off);
    }

    Ok(Co64Data { version, flags, entry_count, chunk_offsets })
}

fn short(typ: FourCC, len: usize, need: usize) -> ParseError {
    ParseError::ShortPayload { typ, len, need }
}

/// Resolve the sample size recorded in an `stsz` box.
///
/// `Ok(None)` means the table is well formed but lists no samples.
pub fn resolve_sample_size(b: &Mp4Box) -> Result<Option<(u32, Decoding)>, ParseError> {
    let data = b.data();
    match decode_stsz(data) {
        Ok(t) => Ok(t.first_sample_size().map(|s| (s, Decoding::Table))),
        // version/flags + sample_size + sample_count must be present before
        // the trailing word can be an entry rather than a header field.
        Err(_) if data.len() >= 16 => {
            let size = BigEndian::read_u32(&data[data.len() - 4..]);
            debug!(typ = %b.typ(), len = data.len(), size, "stsz table truncated, using trailing entry");
            Ok(Some((size, Decoding::TrailingBytes)))
        }
        Err(_) => Err(short(b.typ(), data.len(), 16)),
    }
}

/// Resolve the first chunk offset from a `co64` or `stco` box.
pub fn resolve_chunk_offset(b: &Mp4Box) -> Result<Option<(u64, Decoding)>, ParseError> {
    let wide = KnownBox::from(b.typ()) == KnownBox::Co64;
    let width = if wide { 8 } else { 4 };
    let data = b.data();
    match decode_chunk_offsets(data, wide) {
        Ok(t) => Ok(t.chunk_offsets.first().map(|&o| (o, Decoding::Table))),
        Err(_) if data.len() >= 8 + width => {
            let tail = &data[data.len() - width..];
            let off = if wide {
                BigEndian::read_u64(tail)
            } else {
                BigEndian::read_u32(tail) as u64
            };
            debug!(typ = %b.typ(), len = data.len(), off, "chunk offset table truncated, using trailing entry");
            Ok(Some((off, Decoding::TrailingBytes)))
        }
        Err(_) => Err(short(b.typ(), data.len(), 8 + width)),
    }
}
