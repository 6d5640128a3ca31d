//! Program image format for lumen lighting programs.
//!
//! This crate contains:
//! - Image format definitions (header, binding records, section layout)
//! - The instruction set encoding (opcodes and operands)
//! - The validating loader producing a [`ProgramImage`]
//! - An image builder and a human-readable dump for bench-top tooling

pub mod image;

// Re-export commonly used items at crate root
pub use image::{
    BINDING_SIZE, BindingsView, ByteStorage, Channel, CmpOp, DecodeError, FILE_MAGIC,
    HEADER_SIZE, Header, ISA_VERSION, ImageBuilder, ImageError, Instruction, KeyBinding,
    LoadOptions, MAX_DATA_WORDS, Opcode, PROGRAM_MAGIC, PixelObject, PixelsView, ProgramImage,
    RESTRICTED_WRITE_KEYS, Section, SectionOffsets, TRAILER_SIZE, WORD_SIZE, dump, hash_name,
    is_restricted,
};
