//! Key and publish bindings: name-hash links between data memory and the
//! world outside the VM.
//!
//! Read keys feed external values into program slots, write keys expose
//! program slots to the surrounding firmware, publish bindings expose slots
//! for outward telemetry. All three share the same 8-byte wire record.

use super::BINDING_SIZE;

/// One key or publish binding.
///
/// Wire format, 8 bytes: name hash (u32 LE), data address (u8), 3 bytes
/// padding kept for alignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyBinding {
    pub hash: u32,
    pub addr: u8,
}

impl KeyBinding {
    pub fn from_bytes(bytes: [u8; BINDING_SIZE]) -> Self {
        Self {
            hash: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            addr: bytes[4],
        }
    }

    pub fn to_bytes(&self) -> [u8; BINDING_SIZE] {
        let mut bytes = [0u8; BINDING_SIZE];
        bytes[0..4].copy_from_slice(&self.hash.to_le_bytes());
        bytes[4] = self.addr;
        bytes
    }
}

/// View into a binding table section (read keys, write keys, or publish).
pub struct BindingsView<'a> {
    bytes: &'a [u8],
    count: usize,
}

impl<'a> BindingsView<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        debug_assert!(bytes.len().is_multiple_of(BINDING_SIZE));
        Self {
            bytes,
            count: bytes.len() / BINDING_SIZE,
        }
    }

    /// An empty table, for execution contexts without an image.
    pub const fn empty() -> Self {
        Self {
            bytes: &[],
            count: 0,
        }
    }

    /// Get a binding by table index.
    pub fn get(&self, idx: usize) -> KeyBinding {
        assert!(idx < self.count, "binding index out of bounds");
        let offset = idx * BINDING_SIZE;
        KeyBinding::from_bytes(
            self.bytes[offset..offset + BINDING_SIZE]
                .try_into()
                .unwrap(),
        )
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Iterate over all bindings.
    pub fn iter(&self) -> impl Iterator<Item = KeyBinding> + '_ {
        (0..self.count).map(|i| self.get(i))
    }

    /// Find a binding by name hash.
    pub fn find(&self, hash: u32) -> Option<KeyBinding> {
        self.iter().find(|b| b.hash == hash)
    }
}

/// FNV-1a 32-bit hash of a variable name.
///
/// Bindings identify external variables by this hash; the compiler and the
/// device must agree on it.
pub const fn hash_name(name: &str) -> u32 {
    let bytes = name.as_bytes();
    let mut hash: u32 = 0x811C_9DC5;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u32;
        hash = hash.wrapping_mul(0x0100_0193);
        i += 1;
    }
    hash
}

/// Device-owned configuration names a program may never bind as write keys.
pub const RESTRICTED_WRITE_KEYS: [u32; 4] = [
    hash_name("pix_count"),
    hash_name("pix_mode"),
    hash_name("net_addr"),
    hash_name("fw_version"),
];

/// Check whether a name hash is restricted for write binding.
pub fn is_restricted(hash: u32) -> bool {
    RESTRICTED_WRITE_KEYS.contains(&hash)
}
