use crate::boxes::{BoxHeader, PayloadRegion};
use crate::error::{ExtractError, Stage};
use crate::extract::Limits;
use crate::known_boxes::KnownBox;
use crate::parser::{ParseError, read_box_header, read_exact, skip};
use std::io::{Read, Seek, SeekFrom};
use tracing::{debug, trace};

/// What a root-level scan captured.
#[derive(Debug)]
pub struct ScanResult {
    /// Payload of the first `moov` box.
    pub metadata: Vec<u8>,
    /// Extent of the first `mdat` payload; not read.
    pub payload: PayloadRegion,
}

/// Walk the root boxes of `r` from its current position.
///
/// The first `moov` is buffered and the first `mdat` is recorded by
/// position. The walk returns as soon as both are known, so trailing
/// boxes are never visited. Every other box is skipped by seeking, and
/// must fit inside the stream; only the `mdat` extent is taken as declared.
pub fn scan<R: Read + Seek>(r: &mut R, limits: &Limits) -> Result<ScanResult, ExtractError> {
    let origin = r.stream_position()?;
    let stream_end = r.seek(SeekFrom::End(0))?;
    r.seek(SeekFrom::Start(origin))?;

    let mut metadata: Option<Vec<u8>> = None;
    let mut payload: Option<PayloadRegion> = None;

    while let Some(h) = read_box_header(r)? {
        let data_start = h.payload_start();
        let data_len = h.payload_len_within(stream_end);

        let consumed = match KnownBox::from(h.typ) {
            KnownBox::Moov if metadata.is_none() => {
                within_stream(&h, data_len, stream_end)?;
                if data_len > limits.max_metadata_len {
                    return Err(ExtractError::LimitExceeded {
                        what: "metadata container",
                        len: data_len,
                        limit: limits.max_metadata_len,
                    });
                }
                metadata = Some(read_exact(r, data_len)?);
                debug!(start = h.start, len = data_len, "buffered moov");
                true
            }
            // The declared extent is kept even when the file ends early;
            // `extract` reads only the sample and fails there if it is cut.
            KnownBox::Mdat if payload.is_none() => {
                payload = Some(PayloadRegion { start: data_start, len: data_len });
                debug!(start = data_start, len = data_len, "captured mdat region");
                false
            }
            kb => {
                within_stream(&h, data_len, stream_end)?;
                trace!(typ = %h.typ, name = kb.full_name(), len = data_len, "skipping root box");
                false
            }
        };

        if metadata.is_some() && payload.is_some() {
            break;
        }
        if !consumed {
            // An mdat that runs to (or past) the end leaves nothing to visit.
            if data_start.saturating_add(data_len) >= stream_end {
                break;
            }
            skip(r, data_len)?;
        }
    }

    let payload = payload.ok_or(ExtractError::NotFound(Stage::PayloadRegion))?;
    let metadata = metadata.ok_or(ExtractError::NotFound(Stage::Metadata))?;
    Ok(ScanResult { metadata, payload })
}

fn within_stream(h: &BoxHeader, data_len: u64, stream_end: u64) -> Result<(), ParseError> {
    let end = h.payload_start().checked_add(data_len).unwrap_or(u64::MAX);
    if end > stream_end {
        return Err(ParseError::Overrun {
            typ: h.typ,
            start: h.start,
            end,
            container_end: stream_end,
        });
    }
    Ok(())
}
