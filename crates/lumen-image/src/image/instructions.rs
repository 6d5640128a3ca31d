//! Instruction encoding for the lumen VM.
//!
//! Variable-length byte-oriented encoding: 1 opcode byte followed by
//! operands. Data addresses are 1 byte, code offsets are u16 LE, immediates
//! are i32 LE. Opcode 0x00 is deliberately invalid so zero-filled or padded
//! code faults instead of executing.

use std::fmt;

/// Instruction opcodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    Halt = 0x01,
    Trap = 0x02,
    Assert = 0x03,
    Mov = 0x04,
    Ldi = 0x05,
    Add = 0x06,
    Sub = 0x07,
    Mul = 0x08,
    Div = 0x09,
    Rem = 0x0A,
    Cmp = 0x0B,
    Jmp = 0x0C,
    Jz = 0x0D,
    Jnz = 0x0E,
    Rand = 0x0F,
    Frame = 0x10,
    KLoad = 0x11,
    KStore = 0x12,
    PStore = 0x13,
    PLoad = 0x14,
}

impl Opcode {
    /// Decode an opcode byte.
    pub fn from_u8(byte: u8) -> Option<Self> {
        Some(match byte {
            0x01 => Self::Halt,
            0x02 => Self::Trap,
            0x03 => Self::Assert,
            0x04 => Self::Mov,
            0x05 => Self::Ldi,
            0x06 => Self::Add,
            0x07 => Self::Sub,
            0x08 => Self::Mul,
            0x09 => Self::Div,
            0x0A => Self::Rem,
            0x0B => Self::Cmp,
            0x0C => Self::Jmp,
            0x0D => Self::Jz,
            0x0E => Self::Jnz,
            0x0F => Self::Rand,
            0x10 => Self::Frame,
            0x11 => Self::KLoad,
            0x12 => Self::KStore,
            0x13 => Self::PStore,
            0x14 => Self::PLoad,
            _ => return None,
        })
    }

    /// Total encoded size in bytes, opcode byte included.
    pub fn size(self) -> usize {
        match self {
            Self::Halt | Self::Trap => 1,
            Self::Assert | Self::Rand | Self::Frame => 2,
            Self::Mov | Self::Jmp | Self::KLoad | Self::KStore => 3,
            Self::Add
            | Self::Sub
            | Self::Mul
            | Self::Div
            | Self::Rem
            | Self::Jz
            | Self::Jnz
            | Self::PStore
            | Self::PLoad => 4,
            Self::Cmp => 5,
            Self::Ldi => 6,
        }
    }
}

/// Comparison operator operand for `cmp`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    pub fn from_byte(byte: u8) -> Option<Self> {
        Some(match byte {
            0 => Self::Eq,
            1 => Self::Ne,
            2 => Self::Lt,
            3 => Self::Le,
            4 => Self::Gt,
            5 => Self::Ge,
            _ => return None,
        })
    }

    pub fn to_byte(self) -> u8 {
        match self {
            Self::Eq => 0,
            Self::Ne => 1,
            Self::Lt => 2,
            Self::Le => 3,
            Self::Gt => 4,
            Self::Ge => 5,
        }
    }

    /// Apply the comparison.
    pub fn eval(self, a: i32, b: i32) -> bool {
        match self {
            Self::Eq => a == b,
            Self::Ne => a != b,
            Self::Lt => a < b,
            Self::Le => a <= b,
            Self::Gt => a > b,
            Self::Ge => a >= b,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Lt => "lt",
            Self::Le => "le",
            Self::Gt => "gt",
            Self::Ge => "ge",
        }
    }
}

/// Pixel channel operand for `pstore`/`pload`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    Hue,
    Sat,
    Val,
}

impl Channel {
    pub fn from_byte(byte: u8) -> Option<Self> {
        Some(match byte {
            0 => Self::Hue,
            1 => Self::Sat,
            2 => Self::Val,
            _ => return None,
        })
    }

    pub fn to_byte(self) -> u8 {
        match self {
            Self::Hue => 0,
            Self::Sat => 1,
            Self::Val => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Hue => "hue",
            Self::Sat => "sat",
            Self::Val => "val",
        }
    }
}

/// Instruction decode error.
///
/// Instruction streams arrive over the network and jump targets cannot be
/// statically verified, so decoding is fallible rather than panicking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid opcode {0:#04x}")]
    InvalidOpcode(u8),
    #[error("truncated instruction at code offset {0:#06x}")]
    Truncated(usize),
    #[error("invalid compare op {0:#04x}")]
    InvalidCmpOp(u8),
    #[error("invalid pixel channel {0:#04x}")]
    InvalidChannel(u8),
}

/// A decoded instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instruction {
    Halt,
    Trap,
    Assert { src: u8 },
    Mov { dst: u8, src: u8 },
    Ldi { dst: u8, value: i32 },
    Add { dst: u8, a: u8, b: u8 },
    Sub { dst: u8, a: u8, b: u8 },
    Mul { dst: u8, a: u8, b: u8 },
    Div { dst: u8, a: u8, b: u8 },
    Rem { dst: u8, a: u8, b: u8 },
    Cmp { op: CmpOp, dst: u8, a: u8, b: u8 },
    Jmp { target: u16 },
    Jz { src: u8, target: u16 },
    Jnz { src: u8, target: u16 },
    Rand { dst: u8 },
    Frame { dst: u8 },
    KLoad { dst: u8, key: u8 },
    KStore { key: u8, src: u8 },
    PStore { chan: Channel, obj: u8, src: u8 },
    PLoad { chan: Channel, dst: u8, obj: u8 },
}

impl Instruction {
    /// Decode the instruction at `offset`, returning it with its encoded
    /// size so the caller can advance.
    pub fn decode(code: &[u8], offset: usize) -> Result<(Self, usize), DecodeError> {
        let op_byte = *code.get(offset).ok_or(DecodeError::Truncated(offset))?;
        let opcode = Opcode::from_u8(op_byte).ok_or(DecodeError::InvalidOpcode(op_byte))?;
        let size = opcode.size();
        let bytes = code
            .get(offset..offset + size)
            .ok_or(DecodeError::Truncated(offset))?;

        let instr = match opcode {
            Opcode::Halt => Self::Halt,
            Opcode::Trap => Self::Trap,
            Opcode::Assert => Self::Assert { src: bytes[1] },
            Opcode::Mov => Self::Mov {
                dst: bytes[1],
                src: bytes[2],
            },
            Opcode::Ldi => Self::Ldi {
                dst: bytes[1],
                value: i32::from_le_bytes([bytes[2], bytes[3], bytes[4], bytes[5]]),
            },
            Opcode::Add => Self::Add {
                dst: bytes[1],
                a: bytes[2],
                b: bytes[3],
            },
            Opcode::Sub => Self::Sub {
                dst: bytes[1],
                a: bytes[2],
                b: bytes[3],
            },
            Opcode::Mul => Self::Mul {
                dst: bytes[1],
                a: bytes[2],
                b: bytes[3],
            },
            Opcode::Div => Self::Div {
                dst: bytes[1],
                a: bytes[2],
                b: bytes[3],
            },
            Opcode::Rem => Self::Rem {
                dst: bytes[1],
                a: bytes[2],
                b: bytes[3],
            },
            Opcode::Cmp => Self::Cmp {
                op: CmpOp::from_byte(bytes[1]).ok_or(DecodeError::InvalidCmpOp(bytes[1]))?,
                dst: bytes[2],
                a: bytes[3],
                b: bytes[4],
            },
            Opcode::Jmp => Self::Jmp {
                target: u16::from_le_bytes([bytes[1], bytes[2]]),
            },
            Opcode::Jz => Self::Jz {
                src: bytes[1],
                target: u16::from_le_bytes([bytes[2], bytes[3]]),
            },
            Opcode::Jnz => Self::Jnz {
                src: bytes[1],
                target: u16::from_le_bytes([bytes[2], bytes[3]]),
            },
            Opcode::Rand => Self::Rand { dst: bytes[1] },
            Opcode::Frame => Self::Frame { dst: bytes[1] },
            Opcode::KLoad => Self::KLoad {
                dst: bytes[1],
                key: bytes[2],
            },
            Opcode::KStore => Self::KStore {
                key: bytes[1],
                src: bytes[2],
            },
            Opcode::PStore => Self::PStore {
                chan: Channel::from_byte(bytes[1]).ok_or(DecodeError::InvalidChannel(bytes[1]))?,
                obj: bytes[2],
                src: bytes[3],
            },
            Opcode::PLoad => Self::PLoad {
                chan: Channel::from_byte(bytes[1]).ok_or(DecodeError::InvalidChannel(bytes[1]))?,
                dst: bytes[2],
                obj: bytes[3],
            },
        };
        Ok((instr, size))
    }

    /// The opcode of this instruction.
    pub fn opcode(&self) -> Opcode {
        match self {
            Self::Halt => Opcode::Halt,
            Self::Trap => Opcode::Trap,
            Self::Assert { .. } => Opcode::Assert,
            Self::Mov { .. } => Opcode::Mov,
            Self::Ldi { .. } => Opcode::Ldi,
            Self::Add { .. } => Opcode::Add,
            Self::Sub { .. } => Opcode::Sub,
            Self::Mul { .. } => Opcode::Mul,
            Self::Div { .. } => Opcode::Div,
            Self::Rem { .. } => Opcode::Rem,
            Self::Cmp { .. } => Opcode::Cmp,
            Self::Jmp { .. } => Opcode::Jmp,
            Self::Jz { .. } => Opcode::Jz,
            Self::Jnz { .. } => Opcode::Jnz,
            Self::Rand { .. } => Opcode::Rand,
            Self::Frame { .. } => Opcode::Frame,
            Self::KLoad { .. } => Opcode::KLoad,
            Self::KStore { .. } => Opcode::KStore,
            Self::PStore { .. } => Opcode::PStore,
            Self::PLoad { .. } => Opcode::PLoad,
        }
    }

    /// Encoded size in bytes.
    pub fn size(&self) -> usize {
        self.opcode().size()
    }

    /// Append the encoded form to `buf`.
    pub fn encode_into(&self, buf: &mut Vec<u8>) {
        buf.push(self.opcode() as u8);
        match *self {
            Self::Halt | Self::Trap => {}
            Self::Assert { src } => buf.push(src),
            Self::Mov { dst, src } => buf.extend_from_slice(&[dst, src]),
            Self::Ldi { dst, value } => {
                buf.push(dst);
                buf.extend_from_slice(&value.to_le_bytes());
            }
            Self::Add { dst, a, b }
            | Self::Sub { dst, a, b }
            | Self::Mul { dst, a, b }
            | Self::Div { dst, a, b }
            | Self::Rem { dst, a, b } => buf.extend_from_slice(&[dst, a, b]),
            Self::Cmp { op, dst, a, b } => {
                buf.push(op.to_byte());
                buf.extend_from_slice(&[dst, a, b]);
            }
            Self::Jmp { target } => buf.extend_from_slice(&target.to_le_bytes()),
            Self::Jz { src, target } | Self::Jnz { src, target } => {
                buf.push(src);
                buf.extend_from_slice(&target.to_le_bytes());
            }
            Self::Rand { dst } | Self::Frame { dst } => buf.push(dst),
            Self::KLoad { dst, key } => buf.extend_from_slice(&[dst, key]),
            Self::KStore { key, src } => buf.extend_from_slice(&[key, src]),
            Self::PStore { chan, obj, src } => {
                buf.push(chan.to_byte());
                buf.extend_from_slice(&[obj, src]);
            }
            Self::PLoad { chan, dst, obj } => {
                buf.push(chan.to_byte());
                buf.extend_from_slice(&[dst, obj]);
            }
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Halt => write!(f, "halt"),
            Self::Trap => write!(f, "trap"),
            Self::Assert { src } => write!(f, "assert d{src}"),
            Self::Mov { dst, src } => write!(f, "mov d{dst}, d{src}"),
            Self::Ldi { dst, value } => write!(f, "ldi d{dst}, #{value}"),
            Self::Add { dst, a, b } => write!(f, "add d{dst}, d{a}, d{b}"),
            Self::Sub { dst, a, b } => write!(f, "sub d{dst}, d{a}, d{b}"),
            Self::Mul { dst, a, b } => write!(f, "mul d{dst}, d{a}, d{b}"),
            Self::Div { dst, a, b } => write!(f, "div d{dst}, d{a}, d{b}"),
            Self::Rem { dst, a, b } => write!(f, "rem d{dst}, d{a}, d{b}"),
            Self::Cmp { op, dst, a, b } => {
                write!(f, "cmp.{} d{dst}, d{a}, d{b}", op.mnemonic())
            }
            Self::Jmp { target } => write!(f, "jmp {target:#06x}"),
            Self::Jz { src, target } => write!(f, "jz d{src}, {target:#06x}"),
            Self::Jnz { src, target } => write!(f, "jnz d{src}, {target:#06x}"),
            Self::Rand { dst } => write!(f, "rand d{dst}"),
            Self::Frame { dst } => write!(f, "frame d{dst}"),
            Self::KLoad { dst, key } => write!(f, "kload d{dst}, k{key}"),
            Self::KStore { key, src } => write!(f, "kstore k{key}, d{src}"),
            Self::PStore { chan, obj, src } => {
                write!(f, "pstore p{obj}.{}, d{src}", chan.name())
            }
            Self::PLoad { chan, dst, obj } => {
                write!(f, "pload d{dst}, p{obj}.{}", chan.name())
            }
        }
    }
}
