use crate::boxes::PayloadRegion;
use crate::error::ExtractError;
use crate::locator::{TrackAssetDescriptor, locate};
use crate::parser::read_exact;
use crate::walker::scan;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::ops::Range;
use std::path::Path;
use tracing::debug;

/// Hard ceilings on what a single extraction may load into memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_metadata_len: u64,
    pub max_preview_len: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_metadata_len: 64 << 20,
            max_preview_len: 256 << 20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExtractOptions {
    /// 0-based index of the `trak` holding the preview.
    pub track: usize,
    pub limits: Limits,
}

/// An extracted preview and where it came from.
#[derive(Debug, Clone)]
pub struct Preview {
    pub descriptor: TrackAssetDescriptor,
    pub payload: PayloadRegion,
    pub bytes: Vec<u8>,
}

/// Map a sample's absolute position onto `region`.
///
/// The sample must start at or after the region start and end at or before
/// the region end; nothing is clamped.
pub fn relative_range(
    region: &PayloadRegion,
    desc: &TrackAssetDescriptor,
) -> Result<Range<u64>, ExtractError> {
    let size = desc.sample_size as u64;
    let out_of_range = || ExtractError::OutOfRange {
        offset: desc.sample_absolute_offset,
        size,
        region_start: region.start,
        region_len: region.len,
    };

    let rel = desc
        .sample_absolute_offset
        .checked_sub(region.start)
        .ok_or_else(out_of_range)?;
    let end = rel
        .checked_add(size)
        .filter(|&end| end <= region.len)
        .ok_or_else(out_of_range)?;
    Ok(rel..end)
}

/// Read the sample described by `desc` out of the payload region of `r`.
pub fn extract<R: Read + Seek>(
    r: &mut R,
    region: &PayloadRegion,
    desc: &TrackAssetDescriptor,
    limits: &Limits,
) -> Result<Vec<u8>, ExtractError> {
    let range = relative_range(region, desc)?;
    let len = range.end - range.start;
    if len > limits.max_preview_len {
        return Err(ExtractError::LimitExceeded {
            what: "preview sample",
            len,
            limit: limits.max_preview_len,
        });
    }

    r.seek(SeekFrom::Start(region.start + range.start))?;
    Ok(read_exact(r, len)?)
}

/// Slice the sample out of a payload region that is already in memory.
pub fn extract_from_slice(
    payload: &[u8],
    region: &PayloadRegion,
    desc: &TrackAssetDescriptor,
) -> Result<Vec<u8>, ExtractError> {
    let range = relative_range(region, desc)?;
    let start = usize::try_from(range.start).ok();
    let end = usize::try_from(range.end).ok();
    start
        .zip(end)
        .and_then(|(s, e)| payload.get(s..e))
        .map(<[u8]>::to_vec)
        .ok_or(ExtractError::ShortSlice {
            region_start: region.start,
            region_len: region.len,
            slice_len: payload.len() as u64,
            needed: range.end,
        })
}

/// Find and read the preview image embedded in an ISOBMFF stream.
///
/// The stream must be positioned at the start of the file. Each call is
/// independent; nothing is cached between calls.
///
/// # Example
/// ```no_run
/// use bmffthumb::{ExtractOptions, extract_preview};
/// use std::fs::File;
///
/// let file = File::open("IMG_0001.CR3")?;
/// let preview = extract_preview(file, &ExtractOptions::default())?;
/// std::fs::write("IMG_0001.jpg", &preview.bytes)?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn extract_preview<R: Read + Seek>(
    mut r: R,
    opts: &ExtractOptions,
) -> Result<Preview, ExtractError> {
    let scanned = scan(&mut r, &opts.limits)?;
    let descriptor = locate(&scanned.metadata, opts.track)?;
    let bytes = extract(&mut r, &scanned.payload, &descriptor, &opts.limits)?;
    debug!(track = opts.track, len = bytes.len(), "extracted preview");
    Ok(Preview {
        descriptor,
        payload: scanned.payload,
        bytes,
    })
}

/// [`extract_preview`] over a file opened for the duration of the call.
pub fn extract_preview_file<P: AsRef<Path>>(
    path: P,
    opts: &ExtractOptions,
) -> Result<Preview, ExtractError> {
    let f = File::open(path.as_ref())?;
    extract_preview(BufReader::new(f), opts)
}
