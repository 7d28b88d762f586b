use crate::boxes::Mp4Box;
use crate::error::{ExtractError, Stage};
use crate::known_boxes::KnownBox;
use crate::parser::parse_children;
use crate::tables::{resolve_chunk_offset, resolve_sample_size};
use serde::Serialize;
use tracing::{debug, trace};

/// Where one track's preview sample lives in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrackAssetDescriptor {
    /// Position among the sibling `trak` boxes, 0-based.
    pub track_index: usize,
    pub sample_size: u32,
    /// Absolute file offset of the sample.
    pub sample_absolute_offset: u64,
}

fn find(kids: &[Mp4Box], want: KnownBox) -> Option<&Mp4Box> {
    kids.iter().find(|b| KnownBox::from(b.typ()) == want)
}

fn enter(parent: &Mp4Box) -> Result<Vec<Mp4Box>, ExtractError> {
    let kids = parse_children(parent.data())?;
    let types: Vec<_> = kids.iter().map(|k| k.typ()).collect();
    trace!(parent = KnownBox::from(parent.typ()).full_name(), children = ?types, "entered box");
    Ok(kids)
}

fn descend(kids: &[Mp4Box], want: KnownBox, stage: Stage) -> Result<Vec<Mp4Box>, ExtractError> {
    let b = find(kids, want).ok_or(ExtractError::NotFound(stage))?;
    enter(b)
}

/// Resolve the preview sample of the `target_track_index`-th `trak` in a
/// `moov` payload.
///
/// Only the selected track is decoded; its siblings are counted but never
/// parsed.
pub fn locate(metadata: &[u8], target_track_index: usize) -> Result<TrackAssetDescriptor, ExtractError> {
    let root = parse_children(metadata)?;
    let tracks: Vec<&Mp4Box> = root
        .iter()
        .filter(|b| KnownBox::from(b.typ()) == KnownBox::Trak)
        .collect();

    let trak = tracks.get(target_track_index).ok_or(ExtractError::NotFound(Stage::Track {
        index: target_track_index,
        available: tracks.len(),
    }))?;

    let trak_kids = enter(trak)?;
    let mdia = descend(&trak_kids, KnownBox::Mdia, Stage::Media)?;
    let minf = descend(&mdia, KnownBox::Minf, Stage::MediaInformation)?;
    let stbl = descend(&minf, KnownBox::Stbl, Stage::SampleTable)?;

    let offsets = find(&stbl, KnownBox::Co64)
        .or_else(|| find(&stbl, KnownBox::Stco))
        .ok_or(ExtractError::NotFound(Stage::ChunkOffset))?;
    let sizes = find(&stbl, KnownBox::Stsz).ok_or(ExtractError::NotFound(Stage::SampleSize))?;

    let (sample_absolute_offset, offset_from) =
        resolve_chunk_offset(offsets)?.ok_or(ExtractError::NotFound(Stage::ChunkOffset))?;
    let (sample_size, size_from) =
        resolve_sample_size(sizes)?.ok_or(ExtractError::NotFound(Stage::SampleSize))?;

    debug!(
        track = target_track_index,
        offset_box = %offsets.typ(),
        sample_absolute_offset,
        ?offset_from,
        sample_size,
        ?size_from,
        "located preview sample"
    );

    Ok(TrackAssetDescriptor {
        track_index: target_track_index,
        sample_size,
        sample_absolute_offset,
    })
}

