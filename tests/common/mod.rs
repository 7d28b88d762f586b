#![allow(dead_code)]

/// Box with an ordinary 32-bit size field.
pub fn boxed(typ: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut v = Vec::new();
    v.extend_from_slice(&(8 + payload.len() as u32).to_be_bytes());
    v.extend_from_slice(typ);
    v.extend_from_slice(payload);
    v
}

/// Box using the size=1 sentinel and a 64-bit size.
pub fn boxed_large(typ: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut v = Vec::new();
    v.extend_from_slice(&1u32.to_be_bytes());
    v.extend_from_slice(typ);
    v.extend_from_slice(&(16 + payload.len() as u64).to_be_bytes());
    v.extend_from_slice(payload);
    v
}

/// Box whose size field is 0 ("runs to the end").
pub fn boxed_open(typ: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut v = Vec::new();
    v.extend_from_slice(&0u32.to_be_bytes());
    v.extend_from_slice(typ);
    v.extend_from_slice(payload);
    v
}

pub fn uuid_box(uuid: [u8; 16], payload: &[u8]) -> Vec<u8> {
    let mut v = Vec::new();
    v.extend_from_slice(&(24 + payload.len() as u32).to_be_bytes());
    v.extend_from_slice(b"uuid");
    v.extend_from_slice(&uuid);
    v.extend_from_slice(payload);
    v
}

pub fn concat(parts: &[Vec<u8>]) -> Vec<u8> {
    parts.concat()
}

pub fn ftyp() -> Vec<u8> {
    let mut p = Vec::new();
    p.extend_from_slice(b"crx ");
    p.extend_from_slice(&1u32.to_be_bytes());
    p.extend_from_slice(b"crx ");
    p.extend_from_slice(b"isom");
    boxed(b"ftyp", &p)
}

/// FullBox payload: version 0, flags 0, then `body`.
fn full(typ: &[u8; 4], body: &[u8]) -> Vec<u8> {
    let mut p = vec![0u8; 4];
    p.extend_from_slice(body);
    boxed(typ, &p)
}

/// `stsz` listing one sample in the per-sample table.
pub fn stsz_one(size: u32) -> Vec<u8> {
    let mut b = Vec::new();
    b.extend_from_slice(&0u32.to_be_bytes()); // sample_size: per-sample
    b.extend_from_slice(&1u32.to_be_bytes()); // sample_count
    b.extend_from_slice(&size.to_be_bytes());
    full(b"stsz", &b)
}

/// `stsz` with a uniform size and no table.
pub fn stsz_uniform(size: u32, count: u32) -> Vec<u8> {
    let mut b = Vec::new();
    b.extend_from_slice(&size.to_be_bytes());
    b.extend_from_slice(&count.to_be_bytes());
    full(b"stsz", &b)
}

/// `stsz` claiming `count` per-sample entries but carrying only `entries`.
pub fn stsz_raw(count: u32, entries: &[u32]) -> Vec<u8> {
    let mut b = Vec::new();
    b.extend_from_slice(&0u32.to_be_bytes());
    b.extend_from_slice(&count.to_be_bytes());
    for e in entries {
        b.extend_from_slice(&e.to_be_bytes());
    }
    full(b"stsz", &b)
}

pub fn co64(offsets: &[u64]) -> Vec<u8> {
    let mut b = Vec::new();
    b.extend_from_slice(&(offsets.len() as u32).to_be_bytes());
    for o in offsets {
        b.extend_from_slice(&o.to_be_bytes());
    }
    full(b"co64", &b)
}

pub fn stco(offsets: &[u32]) -> Vec<u8> {
    let mut b = Vec::new();
    b.extend_from_slice(&(offsets.len() as u32).to_be_bytes());
    for o in offsets {
        b.extend_from_slice(&o.to_be_bytes());
    }
    full(b"stco", &b)
}

/// Sample-table children that are present in real files but irrelevant to the lookup.
pub fn stbl_filler() -> Vec<Vec<u8>> {
    vec![
        full(b"stsd", &[0, 0, 0, 0]),
        full(b"stts", &[0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 1]),
        full(b"stsc", &[0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 1]),
    ]
}

/// `trak/mdia/minf/stbl` around the given sample-table leaves.
pub fn trak(stbl_children: &[Vec<u8>]) -> Vec<u8> {
    let stbl = boxed(b"stbl", &concat(stbl_children));
    let minf = boxed(b"minf", &concat(&[full(b"vmhd", &[0; 8]), stbl]));
    let mdia = boxed(b"mdia", &concat(&[full(b"mdhd", &[0; 20]), minf]));
    boxed(b"trak", &concat(&[full(b"tkhd", &[0; 80]), mdia]))
}

/// A track pointing at one sample at `offset` of `size` bytes.
pub fn preview_trak(offset: u64, size: u32) -> Vec<u8> {
    let mut kids = stbl_filler();
    kids.push(stsz_one(size));
    kids.push(co64(&[offset]));
    trak(&kids)
}

pub fn moov(traks: &[Vec<u8>]) -> Vec<u8> {
    let mvhd = full(b"mvhd", &[0; 96]);
    let mut parts = vec![mvhd];
    parts.extend_from_slice(traks);
    boxed(b"moov", &concat(&parts))
}

pub const LEAD: usize = 37;
pub const TAIL: usize = 11;

pub struct Fixture {
    pub bytes: Vec<u8>,
    /// Absolute offset of the first mdat payload byte.
    pub mdat_start: u64,
    pub mdat_len: u64,
    /// Absolute offset of the embedded preview.
    pub preview_offset: u64,
    /// The `moov` payload as written.
    pub moov_payload: Vec<u8>,
}

/// `ftyp`, a vendor `uuid` box, `moov` built by `make_moov`, then `mdat`
/// holding `LEAD` filler bytes, the preview, and `TAIL` filler bytes.
///
/// `make_moov` receives the preview's absolute offset and must produce a
/// box whose length does not depend on it.
pub fn cr3_like(preview: &[u8], make_moov: impl Fn(u64) -> Vec<u8>) -> Fixture {
    let head = concat(&[ftyp(), uuid_box([0x85; 16], b"CMT1....")]);
    let probe = make_moov(0);
    let mdat_start = (head.len() + probe.len() + 8) as u64;
    let preview_offset = mdat_start + LEAD as u64;
    let moov = make_moov(preview_offset);
    assert_eq!(moov.len(), probe.len(), "moov length must not depend on the offset");

    let mut mdat_payload = vec![0xAA; LEAD];
    mdat_payload.extend_from_slice(preview);
    mdat_payload.extend_from_slice(&[0xBB; TAIL]);
    let mdat_len = mdat_payload.len() as u64;

    Fixture {
        bytes: concat(&[head, moov.clone(), boxed(b"mdat", &mdat_payload)]),
        mdat_start,
        mdat_len,
        preview_offset,
        moov_payload: moov[8..].to_vec(),
    }
}

/// The common case: one preview track.
pub fn single_preview(preview: &[u8]) -> Fixture {
    let size = preview.len() as u32;
    cr3_like(preview, |off| moov(&[preview_trak(off, size)]))
}

pub fn sample_preview() -> Vec<u8> {
    // SOI, some bytes, EOI: shaped like a JPEG without being decoded.
    let mut v = vec![0xFF, 0xD8, 0xFF, 0xDB];
    v.extend((0u8..=200).map(|b| b.wrapping_mul(7)));
    v.extend_from_slice(&[0xFF, 0xD9]);
    v
}
