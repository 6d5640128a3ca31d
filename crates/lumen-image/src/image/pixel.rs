//! Pixel object bindings: program handles for regions of the physical
//! pixel array.
//!
//! The core treats these as pass-through descriptors; the pixel-output
//! driver interprets them. The program-level handle is the table index.

use super::BINDING_SIZE;

/// One pixel object binding.
///
/// Wire format, 8 bytes: region offset (u16 LE), pixel count (u16 LE),
/// 4 reserved bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelObject {
    pub offset: u16,
    pub count: u16,
}

impl PixelObject {
    pub fn from_bytes(bytes: [u8; BINDING_SIZE]) -> Self {
        Self {
            offset: u16::from_le_bytes([bytes[0], bytes[1]]),
            count: u16::from_le_bytes([bytes[2], bytes[3]]),
        }
    }

    pub fn to_bytes(&self) -> [u8; BINDING_SIZE] {
        let mut bytes = [0u8; BINDING_SIZE];
        bytes[0..2].copy_from_slice(&self.offset.to_le_bytes());
        bytes[2..4].copy_from_slice(&self.count.to_le_bytes());
        bytes
    }
}

/// View into the pixel object table.
pub struct PixelsView<'a> {
    bytes: &'a [u8],
    count: usize,
}

impl<'a> PixelsView<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        debug_assert!(bytes.len().is_multiple_of(BINDING_SIZE));
        Self {
            bytes,
            count: bytes.len() / BINDING_SIZE,
        }
    }

    /// Get a pixel object by handle.
    pub fn get(&self, idx: usize) -> PixelObject {
        assert!(idx < self.count, "pixel object index out of bounds");
        let offset = idx * BINDING_SIZE;
        PixelObject::from_bytes(
            self.bytes[offset..offset + BINDING_SIZE]
                .try_into()
                .unwrap(),
        )
    }

    /// Number of pixel objects.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Iterate over all pixel objects.
    pub fn iter(&self) -> impl Iterator<Item = PixelObject> + '_ {
        (0..self.count).map(|i| self.get(i))
    }
}
