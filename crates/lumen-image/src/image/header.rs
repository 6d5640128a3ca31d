//! Program image header (28 bytes).
//!
//! Section order: Header → Code → Data → ReadKeys → WriteKeys → Publish →
//! PixelObjects, followed by the 4-byte CRC32 trailer.

use super::{FILE_MAGIC, HEADER_SIZE, ISA_VERSION, PROGRAM_MAGIC, WORD_SIZE};

/// Image header: first 28 bytes of the image, all fields little-endian.
///
/// Section lengths are byte lengths, not element counts. `init_entry` and
/// `loop_entry` are byte offsets into the code section.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    /// File magic: b"FX  "
    pub file_magic: [u8; 4],
    /// Program magic: b"PROG"
    pub program_magic: [u8; 4],
    /// Instruction-set version; must match the interpreter exactly.
    pub isa_version: u16,
    pub code_length: u16,
    pub data_length: u16,
    pub read_keys_length: u16,
    pub write_keys_length: u16,
    pub publish_length: u16,
    pub pixel_objects_length: u16,
    /// Keeps the entry fields word aligned.
    pub padding: u16,
    pub init_entry: u16,
    pub loop_entry: u16,
}

const _: () = assert!(HEADER_SIZE == 28);

impl Default for Header {
    fn default() -> Self {
        Self {
            file_magic: FILE_MAGIC,
            program_magic: PROGRAM_MAGIC,
            isa_version: ISA_VERSION,
            code_length: 0,
            data_length: 0,
            read_keys_length: 0,
            write_keys_length: 0,
            publish_length: 0,
            pixel_objects_length: 0,
            padding: 0,
            init_entry: 0,
            loop_entry: 0,
        }
    }
}

/// Computed section offsets, derived from the declared lengths.
///
/// Sections are contiguous; each offset is the end of the previous section.
/// `end` is the offset just past the pixel-object table (where the CRC
/// trailer begins in a built image).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SectionOffsets {
    pub code: u32,
    pub data: u32,
    pub read_keys: u32,
    pub write_keys: u32,
    pub publish: u32,
    pub pixel_objects: u32,
    pub end: u32,
}

impl Header {
    /// Decode a header from 28 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        assert!(bytes.len() >= HEADER_SIZE, "header too short");

        Self {
            file_magic: [bytes[0], bytes[1], bytes[2], bytes[3]],
            program_magic: [bytes[4], bytes[5], bytes[6], bytes[7]],
            isa_version: u16::from_le_bytes([bytes[8], bytes[9]]),
            code_length: u16::from_le_bytes([bytes[10], bytes[11]]),
            data_length: u16::from_le_bytes([bytes[12], bytes[13]]),
            read_keys_length: u16::from_le_bytes([bytes[14], bytes[15]]),
            write_keys_length: u16::from_le_bytes([bytes[16], bytes[17]]),
            publish_length: u16::from_le_bytes([bytes[18], bytes[19]]),
            pixel_objects_length: u16::from_le_bytes([bytes[20], bytes[21]]),
            padding: u16::from_le_bytes([bytes[22], bytes[23]]),
            init_entry: u16::from_le_bytes([bytes[24], bytes[25]]),
            loop_entry: u16::from_le_bytes([bytes[26], bytes[27]]),
        }
    }

    /// Encode the header to 28 bytes.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.file_magic);
        bytes[4..8].copy_from_slice(&self.program_magic);
        bytes[8..10].copy_from_slice(&self.isa_version.to_le_bytes());
        bytes[10..12].copy_from_slice(&self.code_length.to_le_bytes());
        bytes[12..14].copy_from_slice(&self.data_length.to_le_bytes());
        bytes[14..16].copy_from_slice(&self.read_keys_length.to_le_bytes());
        bytes[16..18].copy_from_slice(&self.write_keys_length.to_le_bytes());
        bytes[18..20].copy_from_slice(&self.publish_length.to_le_bytes());
        bytes[20..22].copy_from_slice(&self.pixel_objects_length.to_le_bytes());
        bytes[22..24].copy_from_slice(&self.padding.to_le_bytes());
        bytes[24..26].copy_from_slice(&self.init_entry.to_le_bytes());
        bytes[26..28].copy_from_slice(&self.loop_entry.to_le_bytes());
        bytes
    }

    pub fn validate_file_magic(&self) -> bool {
        self.file_magic == FILE_MAGIC
    }

    pub fn validate_program_magic(&self) -> bool {
        self.program_magic == PROGRAM_MAGIC
    }

    pub fn validate_version(&self) -> bool {
        self.isa_version == ISA_VERSION
    }

    /// Number of data-memory words declared by the data section.
    pub fn data_count(&self) -> u16 {
        self.data_length / WORD_SIZE as u16
    }

    /// Compute section offsets from the declared lengths.
    ///
    /// Sections are contiguous, so word alignment of every offset follows
    /// from every length being word aligned (validated at load).
    pub fn compute_offsets(&self) -> SectionOffsets {
        let code = HEADER_SIZE as u32;
        let data = code + self.code_length as u32;
        let read_keys = data + self.data_length as u32;
        let write_keys = read_keys + self.read_keys_length as u32;
        let publish = write_keys + self.write_keys_length as u32;
        let pixel_objects = publish + self.publish_length as u32;
        let end = pixel_objects + self.pixel_objects_length as u32;

        SectionOffsets {
            code,
            data,
            read_keys,
            write_keys,
            publish,
            pixel_objects,
            end,
        }
    }
}
