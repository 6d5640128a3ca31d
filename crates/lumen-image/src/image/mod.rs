//! Binary program image format.
//!
//! Layout: 28-byte header, then code, data, read keys, write keys, publish
//! bindings, and pixel bindings, contiguous and word aligned, followed by a
//! 4-byte CRC32 trailer over everything before it.

mod builder;
mod dump;
mod header;
mod instructions;
mod keys;
mod loader;
mod pixel;
mod storage;

#[cfg(test)]
mod header_tests;

pub use builder::ImageBuilder;
pub use dump::dump;
pub use header::{Header, SectionOffsets};
pub use instructions::{Channel, CmpOp, DecodeError, Instruction, Opcode};
pub use keys::{BindingsView, KeyBinding, RESTRICTED_WRITE_KEYS, hash_name, is_restricted};
pub use loader::{ImageError, LoadOptions, ProgramImage, Section};
pub use pixel::{PixelObject, PixelsView};
pub use storage::ByteStorage;

/// File magic: identifies any lumen image file.
pub const FILE_MAGIC: [u8; 4] = *b"FX  ";

/// Program magic: identifies the executable program sub-format.
pub const PROGRAM_MAGIC: [u8; 4] = *b"PROG";

/// Supported instruction-set version. Images must match exactly; there is no
/// forward or backward compatibility.
pub const ISA_VERSION: u16 = 1;

/// Size of the fixed image header in bytes.
pub const HEADER_SIZE: usize = 28;

/// Size of a data-memory word in bytes.
pub const WORD_SIZE: usize = 4;

/// Wire size of a key/publish/pixel binding record.
pub const BINDING_SIZE: usize = 8;

/// Size of the CRC32 trailer.
pub const TRAILER_SIZE: usize = 4;

/// Data-memory capacity implied by single-byte addressing.
pub const MAX_DATA_WORDS: usize = 256;
