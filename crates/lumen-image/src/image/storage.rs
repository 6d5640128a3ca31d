//! Word-aligned storage for program images.
//!
//! Image sections are laid out on 4-byte boundaries. For that to hold at
//! runtime the buffer itself must start on a 4-byte boundary; standard
//! `Vec<u8>` provides no alignment guarantee for `u8`.

use std::io;
use std::ops::Deref;
use std::path::Path;

/// Alignment for image buffers (matches `WORD_SIZE`).
pub const ALIGN: usize = 4;

/// 4-byte aligned block for image storage.
#[repr(C, align(4))]
#[derive(Clone, Copy)]
struct Block([u8; 4]);

/// Owned, word-aligned byte storage for a program image.
///
/// Uses `Vec<Block>` internally — Vec guarantees element alignment, so the
/// data starts on a word boundary without a custom allocator.
pub struct ByteStorage {
    blocks: Vec<Block>,
    len: usize,
}

impl ByteStorage {
    /// Copy bytes into aligned storage.
    pub fn copy_from_slice(bytes: &[u8]) -> Self {
        if bytes.is_empty() {
            return Self {
                blocks: Vec::new(),
                len: 0,
            };
        }

        let num_blocks = bytes.len().div_ceil(ALIGN);
        let mut blocks = vec![Block([0; 4]); num_blocks];

        for (i, chunk) in bytes.chunks(ALIGN).enumerate() {
            blocks[i].0[..chunk.len()].copy_from_slice(chunk);
        }

        Self {
            blocks,
            len: bytes.len(),
        }
    }

    /// Take ownership of a byte vector, re-homing it into aligned storage.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self::copy_from_slice(&bytes)
    }

    /// Read a file into aligned storage.
    pub fn from_file(path: impl AsRef<Path>) -> io::Result<Self> {
        let bytes = std::fs::read(path)?;
        Ok(Self::copy_from_slice(&bytes))
    }

    /// Number of bytes stored.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// View as byte slice.
    pub fn as_slice(&self) -> &[u8] {
        if self.blocks.is_empty() {
            return &[];
        }
        assert!(
            self.len <= self.blocks.len() * ALIGN,
            "ByteStorage invariant violated: len {} exceeds capacity {}",
            self.len,
            self.blocks.len() * ALIGN
        );
        // SAFETY: Block is repr(C) with only [u8; 4], so the pointer cast is
        // valid. We only expose `len` bytes, all initialized in
        // copy_from_slice.
        unsafe { std::slice::from_raw_parts(self.blocks.as_ptr() as *const u8, self.len) }
    }
}

impl Deref for ByteStorage {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl Clone for ByteStorage {
    fn clone(&self) -> Self {
        Self {
            blocks: self.blocks.clone(),
            len: self.len,
        }
    }
}

impl std::fmt::Debug for ByteStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteStorage")
            .field("len", &self.len)
            .field(
                "aligned",
                &(self.blocks.as_ptr() as usize).is_multiple_of(ALIGN),
            )
            .finish()
    }
}
