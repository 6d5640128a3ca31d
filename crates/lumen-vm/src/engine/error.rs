//! Load, key, and runtime fault types.

use lumen_image::{DecodeError, ImageError};

/// Successful completion of one interpreter invocation (explicit halt).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunOutcome {
    /// Instructions executed, halt included.
    pub cycles: u32,
}

/// Runtime faults.
///
/// Each fault aborts the current invocation only; data memory is left
/// exactly as it was when the faulting instruction was reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum VmFault {
    #[error("cycle budget of {0} exhausted")]
    MaxCycles(u32),
    #[error("invalid opcode {0:#04x}")]
    InvalidOpcode(u8),
    #[error("instruction pointer {0:#06x} left the code section")]
    CodeOutOfBounds(u32),
    #[error("data address {0} out of range")]
    InvalidAddress(u8),
    #[error("divide by zero")]
    DivideByZero,
    #[error("assertion failed at {0:#06x}")]
    AssertFailed(u32),
    #[error("trap at {0:#06x}")]
    Trap(u32),
    #[error("key index {0} is not bound")]
    UnboundKey(u8),
    #[error("write through restricted key hash {0:#010x}")]
    RestrictedKey(u32),
    #[error("pixel object {0} is not bound")]
    UnboundPixelObject(u8),
}

impl From<DecodeError> for VmFault {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::InvalidOpcode(byte) => Self::InvalidOpcode(byte),
            DecodeError::Truncated(offset) => Self::CodeOutOfBounds(offset as u32),
            DecodeError::InvalidCmpOp(byte) | DecodeError::InvalidChannel(byte) => {
                Self::InvalidOpcode(byte)
            }
        }
    }
}

/// Errors from [`Program::load`](super::Program::load).
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Image(#[from] ImageError),
    #[error("entropy source unavailable: {0}")]
    Entropy(#[from] getrandom::Error),
}

/// Errors from host-side key resolution (`inject`/`export`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    #[error("no key bound for name hash {0:#010x}")]
    Unbound(u32),
}
