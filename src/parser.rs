use crate::boxes::{BoxHeader, FourCC, Mp4Box};
use byteorder::{BigEndian, ByteOrder, ReadBytesExt};
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use tracing::trace;

#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid box size {size} for '{typ}' at offset {start} (header is {header_size} bytes)")]
    InvalidSize {
        typ: FourCC,
        start: u64,
        size: u64,
        header_size: u64,
    },
    #[error("'{typ}' box at offset {start} ends at {end}, past its container end {container_end}")]
    Overrun {
        typ: FourCC,
        start: u64,
        end: u64,
        container_end: u64,
    },
    #[error("'{typ}' payload is {len} bytes, need at least {need}")]
    ShortPayload { typ: FourCC, len: usize, need: usize },
}

pub type Result<T> = std::result::Result<T, ParseError>;

/// Read one box header at the current cursor.
///
/// Returns `Ok(None)` when the stream is exhausted exactly at a box boundary.
/// A header that is cut short is an `UnexpectedEof` I/O error.
pub fn read_box_header<R: Read + Seek>(r: &mut R) -> Result<Option<BoxHeader>> {
    let start = r.stream_position()?;
    let mut head = [0u8; 8];
    match fill(r, &mut head)? {
        0 => return Ok(None),
        8 => {}
        n => {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("box header at offset {start} cut short after {n} bytes"),
            )
            .into());
        }
    }

    let size32 = BigEndian::read_u32(&head[0..4]);
    let typ = [head[4], head[5], head[6], head[7]];
    let mut size = size32 as u64;

    if size32 == 1 {
        size = r.read_u64::<BigEndian>()?;
    }

    let mut uuid = None;
    if &typ == b"uuid" {
        let mut u = [0u8; 16];
        r.read_exact(&mut u)?;
        uuid = Some(u);
    }

    let header_size = match (size32 == 1, &typ == b"uuid") {
        (true, true)  => 8 + 8 + 16,
        (true, false) => 8 + 8,
        (false, true) => 8 + 16,
        (false, false)=> 8,
    } as u64;

    if size != 0 && size < header_size {
        return Err(ParseError::InvalidSize { typ: FourCC(typ), start, size, header_size });
    }

    let h = BoxHeader { size, typ: FourCC(typ), uuid, header_size, start };
    trace!(typ = %h.typ, start, size, header_size, uuid = ?h.uuid.map(hex::encode), "box header");
    Ok(Some(h))
}

/// Seek forward by `n` bytes, returning the new position.
pub fn skip<R: Seek>(r: &mut R, n: u64) -> Result<u64> {
    let n = i64::try_from(n).map_err(|_| {
        io::Error::new(io::ErrorKind::InvalidInput, format!("cannot skip {n} bytes"))
    })?;
    Ok(r.seek(SeekFrom::Current(n))?)
}

/// Read exactly `n` bytes from the cursor into a new buffer.
pub fn read_exact<R: Read>(r: &mut R, n: u64) -> Result<Vec<u8>> {
    let len = usize::try_from(n).map_err(|_| {
        io::Error::new(io::ErrorKind::OutOfMemory, format!("cannot buffer {n} bytes"))
    })?;
    let mut v = vec![0u8; len];
    r.read_exact(&mut v)?;
    Ok(v)
}

/// Decode the immediate children of an in-memory container payload.
///
/// Parsing stops without error at the first header or payload that does not
/// fit in what is left of `buf`. A box whose size is smaller than its own
/// header is an error.
pub fn parse_children(buf: &[u8]) -> Result<Vec<Mp4Box>> {
    match parse_children_partial(buf) {
        (kids, None) => Ok(kids),
        (_, Some(e)) => Err(e),
    }
}

/// Like [`parse_children`], but hands back the siblings decoded before a
/// malformed box together with the error that stopped the walk.
pub fn parse_children_partial(buf: &[u8]) -> (Vec<Mp4Box>, Option<ParseError>) {
    let end = buf.len() as u64;
    let mut cur = Cursor::new(buf);
    let mut kids = Vec::new();

    loop {
        let h = match read_box_header(&mut cur) {
            Ok(Some(h)) => h,
            Ok(None) => break,
            Err(ParseError::Io(e)) if e.kind() == io::ErrorKind::UnexpectedEof => {
                trace!(offset = cur.position(), "short header, stopping");
                break;
            }
            Err(e) => return (kids, Some(e)),
        };

        let data_start = h.payload_start();
        let data_len = h.payload_len_within(end);
        if data_len > end - data_start {
            trace!(typ = %h.typ, data_len, available = end - data_start, "short payload, stopping");
            break;
        }

        // Both bounds are within buf.len(), so the casts are lossless.
        let data = buf[data_start as usize..(data_start + data_len) as usize].to_vec();
        cur.set_position(data_start + data_len);
        kids.push(Mp4Box { header: h, payload: data });
    }

    (kids, None)
}

fn fill<R: Read>(r: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut n = 0;
    while n < buf.len() {
        match r.read(&mut buf[n..]) {
            Ok(0) => break,
            Ok(k) => n += k,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(n)
}
