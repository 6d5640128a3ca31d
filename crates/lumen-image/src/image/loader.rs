//! Validating image loader.
//!
//! [`ProgramImage::load`] runs every gate in order and fails without side
//! effects: a rejected image never produces a partially populated value, so
//! a previously loaded program stays untouched until its replacement has
//! fully validated.

use std::fmt;
use std::io;
use std::path::Path;

use super::header::{Header, SectionOffsets};
use super::keys::{BindingsView, is_restricted};
use super::pixel::PixelsView;
use super::storage::ByteStorage;
use super::{BINDING_SIZE, HEADER_SIZE, ISA_VERSION, MAX_DATA_WORDS, TRAILER_SIZE, WORD_SIZE};

/// Image sections, for per-section error reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Section {
    Header,
    Code,
    Data,
    ReadKeys,
    WriteKeys,
    Publish,
    PixelObjects,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Header => "header",
            Self::Code => "code",
            Self::Data => "data",
            Self::ReadKeys => "read keys",
            Self::WriteKeys => "write keys",
            Self::Publish => "publish",
            Self::PixelObjects => "pixel objects",
        };
        f.write_str(name)
    }
}

/// Image load error.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("bad file magic: expected \"FX  \"")]
    BadFileMagic,
    #[error("bad program magic: expected \"PROG\"")]
    BadProgramMagic,
    #[error("unsupported isa version {found} (interpreter supports {ISA_VERSION})")]
    IsaVersionMismatch { found: u16 },
    #[error("checksum trailer missing")]
    MissingChecksum,
    #[error("checksum mismatch: trailer {expected:#010x}, computed {computed:#010x}")]
    BadChecksum { expected: u32, computed: u32 },
    #[error("{0} section is not word aligned")]
    Misaligned(Section),
    #[error("{0} section extends past the end of the image")]
    Truncated(Section),
    #[error("entry offset {offset:#06x} is outside the code section")]
    EntryOutOfRange { offset: u16 },
    #[error("data segment of {words} words exceeds the {MAX_DATA_WORDS}-word address space")]
    DataTooLarge { words: usize },
    #[error("{section} binding {index} addresses data word {addr}, but data memory has {data_count} words")]
    BindingOutOfRange {
        section: Section,
        index: usize,
        addr: u8,
        data_count: u16,
    },
    #[error("write key {hash:#010x} is restricted")]
    RestrictedKey { hash: u32 },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Load options.
///
/// The CRC check guards against transport corruption; trusted local sources
/// may skip it. Verification is on by default.
#[derive(Clone, Copy, Debug)]
pub struct LoadOptions {
    pub(crate) verify_checksum: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            verify_checksum: true,
        }
    }
}

impl LoadOptions {
    /// Create load options with defaults (checksum verification on).
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the whole-image CRC check.
    pub fn verify_checksum(mut self, verify: bool) -> Self {
        self.verify_checksum = verify;
        self
    }
}

/// A validated program image.
///
/// Owns the word-aligned byte buffer; tables are handed out as borrowed
/// views into it. Immutable once loaded.
#[derive(Clone, Debug)]
pub struct ProgramImage {
    storage: ByteStorage,
    header: Header,
    /// Cached section offsets (computed from the header lengths).
    offsets: SectionOffsets,
}

impl ProgramImage {
    /// Validate and load an image from owned bytes.
    pub fn load(bytes: Vec<u8>, options: LoadOptions) -> Result<Self, ImageError> {
        Self::from_storage(ByteStorage::from_vec(bytes), options)
    }

    /// Validate and load an image from a file path.
    pub fn load_file(path: impl AsRef<Path>, options: LoadOptions) -> Result<Self, ImageError> {
        let storage = ByteStorage::from_file(&path)?;
        Self::from_storage(storage, options)
    }

    fn from_storage(storage: ByteStorage, options: LoadOptions) -> Result<Self, ImageError> {
        let len = storage.len();
        if len < HEADER_SIZE {
            return Err(ImageError::Truncated(Section::Header));
        }

        let header = Header::from_bytes(&storage[..HEADER_SIZE]);

        if !header.validate_file_magic() {
            return Err(ImageError::BadFileMagic);
        }
        if !header.validate_program_magic() {
            return Err(ImageError::BadProgramMagic);
        }
        if !header.validate_version() {
            return Err(ImageError::IsaVersionMismatch {
                found: header.isa_version,
            });
        }

        if options.verify_checksum {
            if len < HEADER_SIZE + TRAILER_SIZE {
                return Err(ImageError::MissingChecksum);
            }
            let trailer = &storage[len - TRAILER_SIZE..];
            let expected = u32::from_le_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
            let computed = crc32fast::hash(&storage[..len - TRAILER_SIZE]);
            if computed != expected {
                return Err(ImageError::BadChecksum { expected, computed });
            }
        }

        // Word alignment of every section length. Binding tables must also
        // hold a whole number of 8-byte records.
        if !(header.code_length as usize).is_multiple_of(WORD_SIZE) {
            return Err(ImageError::Misaligned(Section::Code));
        }
        if !(header.data_length as usize).is_multiple_of(WORD_SIZE) {
            return Err(ImageError::Misaligned(Section::Data));
        }
        if !(header.read_keys_length as usize).is_multiple_of(BINDING_SIZE) {
            return Err(ImageError::Misaligned(Section::ReadKeys));
        }
        if !(header.write_keys_length as usize).is_multiple_of(BINDING_SIZE) {
            return Err(ImageError::Misaligned(Section::WriteKeys));
        }
        if !(header.publish_length as usize).is_multiple_of(BINDING_SIZE) {
            return Err(ImageError::Misaligned(Section::Publish));
        }
        if !(header.pixel_objects_length as usize).is_multiple_of(BINDING_SIZE) {
            return Err(ImageError::Misaligned(Section::PixelObjects));
        }

        // Every section must fit in the supplied buffer (minus the trailer
        // when it is being verified).
        let offsets = header.compute_offsets();
        let available = if options.verify_checksum {
            (len - TRAILER_SIZE) as u32
        } else {
            len as u32
        };
        let section_ends = [
            (Section::Code, offsets.data),
            (Section::Data, offsets.read_keys),
            (Section::ReadKeys, offsets.write_keys),
            (Section::WriteKeys, offsets.publish),
            (Section::Publish, offsets.pixel_objects),
            (Section::PixelObjects, offsets.end),
        ];
        for (section, end) in section_ends {
            if end > available {
                return Err(ImageError::Truncated(section));
            }
        }

        if header.init_entry >= header.code_length {
            return Err(ImageError::EntryOutOfRange {
                offset: header.init_entry,
            });
        }
        if header.loop_entry >= header.code_length {
            return Err(ImageError::EntryOutOfRange {
                offset: header.loop_entry,
            });
        }

        let data_count = header.data_count();
        if data_count as usize > MAX_DATA_WORDS {
            return Err(ImageError::DataTooLarge {
                words: data_count as usize,
            });
        }

        let image = Self {
            storage,
            header,
            offsets,
        };

        // Every static data reference must land inside data memory.
        let tables = [
            (Section::ReadKeys, image.read_keys()),
            (Section::WriteKeys, image.write_keys()),
            (Section::Publish, image.publish()),
        ];
        for (section, view) in tables {
            for (index, binding) in view.iter().enumerate() {
                if binding.addr as u16 >= data_count {
                    return Err(ImageError::BindingOutOfRange {
                        section,
                        index,
                        addr: binding.addr,
                        data_count,
                    });
                }
            }
        }

        // Device-owned configuration may never be bound for writing.
        for binding in image.write_keys().iter() {
            if is_restricted(binding.hash) {
                return Err(ImageError::RestrictedKey {
                    hash: binding.hash,
                });
            }
        }

        Ok(image)
    }

    /// Get the parsed header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Get the computed section offsets.
    pub fn offsets(&self) -> &SectionOffsets {
        &self.offsets
    }

    /// Get the raw image bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.storage
    }

    /// The instruction stream.
    pub fn code(&self) -> &[u8] {
        &self.storage[self.offsets.code as usize..self.offsets.data as usize]
    }

    /// The initial data segment, raw.
    pub fn data_segment(&self) -> &[u8] {
        &self.storage[self.offsets.data as usize..self.offsets.read_keys as usize]
    }

    /// The initial data segment, decoded into words.
    pub fn data_words(&self) -> impl Iterator<Item = i32> + '_ {
        self.data_segment()
            .chunks_exact(WORD_SIZE)
            .map(|chunk| i32::from_le_bytes(chunk.try_into().unwrap()))
    }

    /// Number of data-memory words.
    pub fn data_count(&self) -> u16 {
        self.header.data_count()
    }

    /// View of the read-key table.
    pub fn read_keys(&self) -> BindingsView<'_> {
        BindingsView::new(
            &self.storage[self.offsets.read_keys as usize..self.offsets.write_keys as usize],
        )
    }

    /// View of the write-key table.
    pub fn write_keys(&self) -> BindingsView<'_> {
        BindingsView::new(
            &self.storage[self.offsets.write_keys as usize..self.offsets.publish as usize],
        )
    }

    /// View of the publish table.
    pub fn publish(&self) -> BindingsView<'_> {
        BindingsView::new(
            &self.storage[self.offsets.publish as usize..self.offsets.pixel_objects as usize],
        )
    }

    /// View of the pixel object table.
    pub fn pixel_objects(&self) -> PixelsView<'_> {
        PixelsView::new(
            &self.storage[self.offsets.pixel_objects as usize..self.offsets.end as usize],
        )
    }
}
