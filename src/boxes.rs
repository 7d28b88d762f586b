use serde::Serialize;
use std::fmt;

#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    pub fn from_str(s: &str) -> Option<Self> {
        let b = s.as_bytes();
        if b.len() == 4 {
            Some(FourCC([b[0], b[1], b[2], b[3]]))
        } else {
            None
        }
    }
    pub fn as_str_lossy(&self) -> String {
        self.0
            .iter()
            .map(|&c| if (32..=126).contains(&c) { c as char } else { '.' })
            .collect()
    }
}
impl fmt::Debug for FourCC { fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.as_str_lossy()) } }
impl fmt::Display for FourCC { fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.as_str_lossy()) } }

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxHeader {
    pub size: u64,          // total size including header, or 0=to parent end
    pub typ: FourCC,        // 4CC or b"uuid"
    pub uuid: Option<[u8; 16]>,
    pub header_size: u64,   // 8, 16, or 24
    pub start: u64,         // offset of header start within the source it was read from
}

impl BoxHeader {
    /// `true` when the size field was 0 and the box runs to the end of its container.
    pub fn extends_to_end(&self) -> bool {
        self.size == 0
    }

    /// Offset of the first payload byte.
    pub fn payload_start(&self) -> u64 {
        self.start + self.header_size
    }

    /// Payload length, or `None` for a box that extends to the end of its container.
    pub fn payload_len(&self) -> Option<u64> {
        if self.extends_to_end() {
            None
        } else {
            Some(self.size.saturating_sub(self.header_size))
        }
    }

    /// Payload length with a size-0 box resolved against `container_end`.
    pub fn payload_len_within(&self, container_end: u64) -> u64 {
        self.payload_len()
            .unwrap_or_else(|| container_end.saturating_sub(self.payload_start()))
    }
}

/// Byte range of a box payload inside the source stream, kept by reference
/// instead of being read into memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PayloadRegion {
    /// Absolute offset of the first payload byte.
    pub start: u64,
    pub len: u64,
}

impl PayloadRegion {
    /// One past the last payload byte, saturating at `u64::MAX` for a
    /// region whose declared length overflows.
    pub fn end(&self) -> u64 {
        self.start.saturating_add(self.len)
    }
}

/// One box read into memory: its header plus the payload bytes.
///
/// Unknown box types are kept as-is; callers match on [`FourCC`] or
/// [`crate::known_boxes::KnownBox`] to find what they need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mp4Box {
    pub header: BoxHeader,
    pub payload: Vec<u8>,
}

impl Mp4Box {
    pub fn typ(&self) -> FourCC {
        self.header.typ
    }

    pub fn data(&self) -> &[u8] {
        &self.payload
    }
}
