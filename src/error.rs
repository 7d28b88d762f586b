use crate::parser::ParseError;
use std::fmt;

/// The lookup stage that came up empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// No `mdat` among the root boxes.
    PayloadRegion,
    /// No `moov` among the root boxes.
    Metadata,
    /// Fewer `trak` boxes than the requested index.
    Track { index: usize, available: usize },
    Media,
    MediaInformation,
    SampleTable,
    ChunkOffset,
    SampleSize,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::PayloadRegion => write!(f, "payload region (mdat)"),
            Stage::Metadata => write!(f, "metadata container (moov)"),
            Stage::Track { index, available } => {
                write!(f, "track {index} ({available} track(s) present)")
            }
            Stage::Media => write!(f, "media box (mdia)"),
            Stage::MediaInformation => write!(f, "media information box (minf)"),
            Stage::SampleTable => write!(f, "sample table (stbl)"),
            Stage::ChunkOffset => write!(f, "chunk offset leaf (co64/stco)"),
            Stage::SampleSize => write!(f, "sample size leaf (stsz)"),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ExtractError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed box: {0}")]
    Malformed(ParseError),
    #[error("not found: {0}")]
    NotFound(Stage),
    #[error(
        "sample at offset {offset} (+{size} bytes) lies outside payload region {region_start}..+{region_len}"
    )]
    OutOfRange {
        offset: u64,
        size: u64,
        region_start: u64,
        region_len: u64,
    },
    /// The sample fits the region, but the in-memory copy of the region is shorter.
    #[error(
        "payload slice holds {slice_len} bytes, sample needs {needed} of region {region_start}..+{region_len}"
    )]
    ShortSlice {
        region_start: u64,
        region_len: u64,
        slice_len: u64,
        needed: u64,
    },
    #[error("{what} is {len} bytes, limit is {limit}")]
    LimitExceeded { what: &'static str, len: u64, limit: u64 },
}

impl From<ParseError> for ExtractError {
    fn from(e: ParseError) -> Self {
        match e {
            ParseError::Io(io) => ExtractError::Io(io),
            other => ExtractError::Malformed(other),
        }
    }
}

impl ExtractError {
    /// Short stable name for reports.
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractError::Io(_) => "io",
            ExtractError::Malformed(_) => "malformed_box",
            ExtractError::NotFound(_) => "not_found",
            ExtractError::OutOfRange { .. } => "out_of_range",
            ExtractError::ShortSlice { .. } => "short_slice",
            ExtractError::LimitExceeded { .. } => "limit_exceeded",
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ScaleError {
    #[error("scale factor must be finite and positive, got {0}")]
    InvalidFactor(f64),
    #[error("scaling {width}x{height} by {factor} leaves an empty image")]
    EmptyOutput { width: u32, height: u32, factor: f64 },
    #[error("image: {0}")]
    Image(#[from] image::ImageError),
}
