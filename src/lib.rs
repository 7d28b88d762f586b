pub mod boxes;
pub mod error;
pub mod extract;
pub mod known_boxes;
pub mod locator;
pub mod parser;
pub mod scale;
pub mod tables;
pub mod walker;

pub use boxes::{BoxHeader, FourCC, Mp4Box, PayloadRegion};
pub use error::{ExtractError, ScaleError, Stage};
pub use extract::{
    ExtractOptions, Limits, Preview, extract, extract_from_slice, extract_preview,
    extract_preview_file, relative_range,
};
pub use locator::{TrackAssetDescriptor, locate};
pub use parser::{ParseError, parse_children, parse_children_partial, read_box_header};
pub use walker::{ScanResult, scan};
