//! Minimal flattened device tree reader
//!
//! Only what the overlay scan needs: the string properties of the root node
//! of a compiled overlay (`.dtbo`).
//!
//! # Format
//!
//! ```text
//! header (big-endian u32 x 10)
//!   magic 0xd00dfeed, totalsize, off_dt_struct, off_dt_strings, ...
//! struct block: token stream
//!   BEGIN_NODE name\0 (padded to 4) | END_NODE | PROP len nameoff value | NOP | END
//! strings block: NUL-terminated property names
//! ```

use crate::error::{CamConfigError, Result};

const FDT_MAGIC: u32 = 0xd00d_feed;
const HEADER_LEN: usize = 40;

const FDT_BEGIN_NODE: u32 = 0x1;
const FDT_END_NODE: u32 = 0x2;
const FDT_PROP: u32 = 0x3;
const FDT_NOP: u32 = 0x4;
const FDT_END: u32 = 0x9;

/// Root node properties of an overlay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayInfo {
    /// `overlay-name`
    pub overlay_name: Option<String>,
    /// `jetson-header-name`
    pub header_name: Option<String>,
    /// `compatible`
    pub compatible: Vec<String>,
}

impl OverlayInfo {
    /// Decode a compiled overlay.
    ///
    /// # Errors
    ///
    /// `DeviceTree` for a bad magic, truncated blocks or an unknown token.
    pub fn from_bytes(blob: &[u8]) -> Result<Self> {
        let header = Header::parse(blob)?;
        let strings = blob
            .get(header.strings_offset..)
            .ok_or_else(|| CamConfigError::device_tree("strings block out of range"))?;
        let mut cursor = Cursor::new(blob, header.struct_offset);

        let mut info = Self::default();
        let mut depth = 0usize;
        loop {
            match cursor.read_u32()? {
                FDT_BEGIN_NODE => {
                    cursor.read_cstr()?;
                    cursor.align();
                    depth += 1;
                }
                FDT_END_NODE => {
                    depth = depth.checked_sub(1).ok_or_else(|| {
                        CamConfigError::device_tree("unbalanced END_NODE token")
                    })?;
                }
                FDT_PROP => {
                    let len = cursor.read_u32()? as usize;
                    let name_offset = cursor.read_u32()? as usize;
                    let value = cursor.read_bytes(len)?;
                    cursor.align();
                    if depth == 1 {
                        info.set_property(property_name(strings, name_offset)?, value);
                    }
                }
                FDT_NOP => {}
                FDT_END => break,
                token => {
                    return Err(CamConfigError::device_tree(format!(
                        "unknown token {token:#x} at offset {}",
                        cursor.position - 4
                    )));
                }
            }
        }
        Ok(info)
    }

    fn set_property(&mut self, name: &str, value: &[u8]) {
        match name {
            "overlay-name" => self.overlay_name = string_list(value).into_iter().next(),
            "jetson-header-name" => self.header_name = string_list(value).into_iter().next(),
            "compatible" => self.compatible = string_list(value),
            _ => {}
        }
    }

    /// Whether any of the overlay's compatible strings is in `board`.
    pub fn is_compatible_with<S: AsRef<str>>(&self, board: &[S]) -> bool {
        self.compatible
            .iter()
            .any(|c| board.iter().any(|b| b.as_ref() == c))
    }
}

/// NUL-separated string list, as used by `compatible`.
pub fn string_list(value: &[u8]) -> Vec<String> {
    value
        .split(|b| *b == 0)
        .filter(|s| !s.is_empty())
        .map(|s| String::from_utf8_lossy(s).into_owned())
        .collect()
}

fn property_name(strings: &[u8], offset: usize) -> Result<&str> {
    let tail = strings
        .get(offset..)
        .ok_or_else(|| CamConfigError::device_tree("property name out of range"))?;
    let end = tail
        .iter()
        .position(|b| *b == 0)
        .ok_or_else(|| CamConfigError::device_tree("unterminated property name"))?;
    std::str::from_utf8(&tail[..end])
        .map_err(|_| CamConfigError::device_tree("property name is not UTF-8"))
}

struct Header {
    struct_offset: usize,
    strings_offset: usize,
}

impl Header {
    fn parse(blob: &[u8]) -> Result<Self> {
        if blob.len() < HEADER_LEN {
            return Err(CamConfigError::device_tree("blob shorter than header"));
        }
        let mut cursor = Cursor::new(blob, 0);
        let magic = cursor.read_u32()?;
        if magic != FDT_MAGIC {
            return Err(CamConfigError::device_tree(format!("bad magic {magic:#010x}")));
        }
        let total_size = cursor.read_u32()? as usize;
        if total_size > blob.len() {
            return Err(CamConfigError::device_tree(format!(
                "truncated blob: header says {total_size} bytes, got {}",
                blob.len()
            )));
        }
        let struct_offset = cursor.read_u32()? as usize;
        let strings_offset = cursor.read_u32()? as usize;
        Ok(Self {
            struct_offset,
            strings_offset,
        })
    }
}

struct Cursor<'a> {
    buf: &'a [u8],
    position: usize,
}

impl<'a> Cursor<'a> {
    fn new(buf: &'a [u8], position: usize) -> Self {
        Self { buf, position }
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .position
            .checked_add(len)
            .filter(|end| *end <= self.buf.len())
            .ok_or_else(|| {
                CamConfigError::device_tree(format!("truncated at offset {}", self.position))
            })?;
        let bytes = &self.buf[self.position..end];
        self.position = end;
        Ok(bytes)
    }

    fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_cstr(&mut self) -> Result<&'a [u8]> {
        let tail = self.buf.get(self.position..).unwrap_or_default();
        let len = tail
            .iter()
            .position(|b| *b == 0)
            .ok_or_else(|| CamConfigError::device_tree("unterminated node name"))?;
        let name = self.read_bytes(len)?;
        self.position += 1;
        Ok(name)
    }

    fn align(&mut self) {
        self.position = self.position.next_multiple_of(4);
    }
}
