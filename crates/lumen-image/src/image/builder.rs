//! Assemble program images from already-encoded parts.
//!
//! The builder is format tooling, not a compiler: it accepts encoded
//! instructions, data words, and binding records, computes the header and
//! CRC trailer, and emits bytes that load cleanly.

use super::header::Header;
use super::instructions::Instruction;
use super::keys::KeyBinding;
use super::pixel::PixelObject;
use super::{BINDING_SIZE, FILE_MAGIC, HEADER_SIZE, ISA_VERSION, PROGRAM_MAGIC, TRAILER_SIZE, WORD_SIZE};

/// Builder for program images.
#[derive(Debug, Default)]
pub struct ImageBuilder {
    isa_version: Option<u16>,
    code: Vec<u8>,
    data: Vec<i32>,
    read_keys: Vec<KeyBinding>,
    write_keys: Vec<KeyBinding>,
    publish: Vec<KeyBinding>,
    pixel_objects: Vec<PixelObject>,
    init_entry: u16,
    loop_entry: u16,
}

impl ImageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the ISA version stamped into the header (default: the
    /// supported version). Useful for producing intentionally stale images.
    pub fn isa_version(&mut self, version: u16) -> &mut Self {
        self.isa_version = Some(version);
        self
    }

    /// Append an encoded instruction to the code section.
    pub fn instruction(&mut self, instr: Instruction) -> &mut Self {
        instr.encode_into(&mut self.code);
        self
    }

    /// Append raw bytes to the code section.
    pub fn raw_code(&mut self, bytes: &[u8]) -> &mut Self {
        self.code.extend_from_slice(bytes);
        self
    }

    /// Current code offset, for entry points and jump targets.
    pub fn code_offset(&self) -> u16 {
        self.code.len() as u16
    }

    /// Append an initial data-memory word.
    pub fn data_word(&mut self, value: i32) -> &mut Self {
        self.data.push(value);
        self
    }

    pub fn read_key(&mut self, hash: u32, addr: u8) -> &mut Self {
        self.read_keys.push(KeyBinding { hash, addr });
        self
    }

    pub fn write_key(&mut self, hash: u32, addr: u8) -> &mut Self {
        self.write_keys.push(KeyBinding { hash, addr });
        self
    }

    pub fn publish_var(&mut self, hash: u32, addr: u8) -> &mut Self {
        self.publish.push(KeyBinding { hash, addr });
        self
    }

    pub fn pixel_object(&mut self, offset: u16, count: u16) -> &mut Self {
        self.pixel_objects.push(PixelObject { offset, count });
        self
    }

    pub fn init_entry(&mut self, offset: u16) -> &mut Self {
        self.init_entry = offset;
        self
    }

    pub fn loop_entry(&mut self, offset: u16) -> &mut Self {
        self.loop_entry = offset;
        self
    }

    /// Emit the image bytes, CRC trailer included.
    ///
    /// Code is zero-padded to a word boundary; pad bytes decode as invalid
    /// opcodes and are unreachable from a well-formed program.
    pub fn build(&self) -> Vec<u8> {
        let mut code = self.code.clone();
        while !code.len().is_multiple_of(WORD_SIZE) {
            code.push(0);
        }
        assert!(code.len() <= u16::MAX as usize, "code section overflows");
        assert!(
            self.data.len() * WORD_SIZE <= u16::MAX as usize,
            "data section overflows"
        );

        let header = Header {
            file_magic: FILE_MAGIC,
            program_magic: PROGRAM_MAGIC,
            isa_version: self.isa_version.unwrap_or(ISA_VERSION),
            code_length: code.len() as u16,
            data_length: (self.data.len() * WORD_SIZE) as u16,
            read_keys_length: (self.read_keys.len() * BINDING_SIZE) as u16,
            write_keys_length: (self.write_keys.len() * BINDING_SIZE) as u16,
            publish_length: (self.publish.len() * BINDING_SIZE) as u16,
            pixel_objects_length: (self.pixel_objects.len() * BINDING_SIZE) as u16,
            padding: 0,
            init_entry: self.init_entry,
            loop_entry: self.loop_entry,
        };

        let total = HEADER_SIZE
            + code.len()
            + self.data.len() * WORD_SIZE
            + (self.read_keys.len() + self.write_keys.len() + self.publish.len()) * BINDING_SIZE
            + self.pixel_objects.len() * BINDING_SIZE
            + TRAILER_SIZE;
        let mut out = Vec::with_capacity(total);

        out.extend_from_slice(&header.to_bytes());
        out.extend_from_slice(&code);
        for word in &self.data {
            out.extend_from_slice(&word.to_le_bytes());
        }
        for binding in &self.read_keys {
            out.extend_from_slice(&binding.to_bytes());
        }
        for binding in &self.write_keys {
            out.extend_from_slice(&binding.to_bytes());
        }
        for binding in &self.publish {
            out.extend_from_slice(&binding.to_bytes());
        }
        for obj in &self.pixel_objects {
            out.extend_from_slice(&obj.to_bytes());
        }

        let crc = crc32fast::hash(&out);
        out.extend_from_slice(&crc.to_le_bytes());
        out
    }
}
