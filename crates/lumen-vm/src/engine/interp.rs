//! The fetch-decode-execute core.
//!
//! One instruction per cycle, one cycle budget per invocation. The budget is
//! the primary defense against a runaway program stalling the control loop:
//! there is no preemption, so every invocation must return on its own.

use lumen_image::{BindingsView, Channel, Instruction, KeyBinding, ProgramImage, is_restricted};

use super::error::{RunOutcome, VmFault};
use super::memory::DataMemory;
use super::rng::Rng;
use super::state::{ExecutionState, PixelState};

/// Cycle budget per invocation: one cycle per executed instruction.
pub const MAX_CYCLES: u32 = 32_768;

/// Conventional result slot for `evaluate` fragments.
pub const RETURN_VAL_ADDR: u8 = 0;

/// Execute the instruction stream of `image` starting at byte offset
/// `entry`, against the given execution state.
///
/// Returns on explicit halt, or with the fault that ended the run. Falling
/// off the end of the code section is a fault; well-formed programs always
/// halt explicitly.
pub fn run(
    image: &ProgramImage,
    entry: u16,
    state: &mut ExecutionState,
) -> Result<RunOutcome, VmFault> {
    let frame_number = state.frame_number();
    Interp {
        code: image.code(),
        memory: &mut state.memory,
        pixels: &mut state.pixels,
        read_keys: image.read_keys(),
        write_keys: image.write_keys(),
        rng: &mut state.rng,
        frame_number,
        pc: entry as usize,
        cycles: 0,
    }
    .execute()
}

/// Run a self-contained code fragment against caller-provided data memory
/// and return the value left in the result slot (data word 0).
///
/// Fragments execute with empty key tables, no pixel objects, and a fixed
/// pseudo-random seed; key and pixel instructions fault as unbound. Used for
/// contexts needing one scalar without a live execution state, e.g.
/// default-value computation.
pub fn evaluate(code: &[u8], memory: &mut DataMemory) -> Result<i32, VmFault> {
    let mut rng = Rng::from_seed(0);
    Interp {
        code,
        memory: &mut *memory,
        pixels: &mut [],
        read_keys: BindingsView::empty(),
        write_keys: BindingsView::empty(),
        rng: &mut rng,
        frame_number: 0,
        pc: 0,
        cycles: 0,
    }
    .execute()?;
    memory.load(RETURN_VAL_ADDR)
}

struct Interp<'a> {
    code: &'a [u8],
    memory: &'a mut DataMemory,
    pixels: &'a mut [PixelState],
    read_keys: BindingsView<'a>,
    write_keys: BindingsView<'a>,
    rng: &'a mut Rng,
    frame_number: u32,
    pc: usize,
    cycles: u32,
}

impl Interp<'_> {
    fn execute(mut self) -> Result<RunOutcome, VmFault> {
        loop {
            if self.cycles >= MAX_CYCLES {
                return Err(VmFault::MaxCycles(MAX_CYCLES));
            }
            self.cycles += 1;

            if self.pc >= self.code.len() {
                return Err(VmFault::CodeOutOfBounds(self.pc as u32));
            }
            let at = self.pc;
            let (instr, size) = Instruction::decode(self.code, at)?;
            self.pc = at + size;

            match instr {
                Instruction::Halt => {
                    return Ok(RunOutcome {
                        cycles: self.cycles,
                    });
                }
                Instruction::Trap => return Err(VmFault::Trap(at as u32)),
                Instruction::Assert { src } => {
                    if self.memory.load(src)? == 0 {
                        return Err(VmFault::AssertFailed(at as u32));
                    }
                }
                Instruction::Mov { dst, src } => {
                    let value = self.memory.load(src)?;
                    self.memory.store(dst, value)?;
                }
                Instruction::Ldi { dst, value } => self.memory.store(dst, value)?,
                Instruction::Add { dst, a, b } => self.binary(dst, a, b, i32::wrapping_add)?,
                Instruction::Sub { dst, a, b } => self.binary(dst, a, b, i32::wrapping_sub)?,
                Instruction::Mul { dst, a, b } => self.binary(dst, a, b, i32::wrapping_mul)?,
                Instruction::Div { dst, a, b } => self.divide(dst, a, b, false)?,
                Instruction::Rem { dst, a, b } => self.divide(dst, a, b, true)?,
                Instruction::Cmp { op, dst, a, b } => {
                    let lhs = self.memory.load(a)?;
                    let rhs = self.memory.load(b)?;
                    self.memory.store(dst, op.eval(lhs, rhs) as i32)?;
                }
                Instruction::Jmp { target } => self.pc = target as usize,
                Instruction::Jz { src, target } => {
                    if self.memory.load(src)? == 0 {
                        self.pc = target as usize;
                    }
                }
                Instruction::Jnz { src, target } => {
                    if self.memory.load(src)? != 0 {
                        self.pc = target as usize;
                    }
                }
                Instruction::Rand { dst } => {
                    let value = self.rng.next_i32();
                    self.memory.store(dst, value)?;
                }
                Instruction::Frame { dst } => {
                    self.memory.store(dst, self.frame_number as i32)?;
                }
                Instruction::KLoad { dst, key } => {
                    // Resolved through the table on every access; table
                    // contents are loader-fixed but the address is still
                    // bounds-checked against a corrupted state.
                    let binding = self.resolve(&self.read_keys, key)?;
                    let value = self.memory.load(binding.addr)?;
                    self.memory.store(dst, value)?;
                }
                Instruction::KStore { key, src } => {
                    let binding = self.resolve(&self.write_keys, key)?;
                    if is_restricted(binding.hash) {
                        return Err(VmFault::RestrictedKey(binding.hash));
                    }
                    let value = self.memory.load(src)?;
                    self.memory.store(binding.addr, value)?;
                }
                Instruction::PStore { chan, obj, src } => {
                    let value = self.memory.load(src)?;
                    let pixel = self
                        .pixels
                        .get_mut(obj as usize)
                        .ok_or(VmFault::UnboundPixelObject(obj))?;
                    match chan {
                        Channel::Hue => pixel.hue = value,
                        Channel::Sat => pixel.sat = value,
                        Channel::Val => pixel.val = value,
                    }
                }
                Instruction::PLoad { chan, dst, obj } => {
                    let pixel = self
                        .pixels
                        .get(obj as usize)
                        .copied()
                        .ok_or(VmFault::UnboundPixelObject(obj))?;
                    let value = match chan {
                        Channel::Hue => pixel.hue,
                        Channel::Sat => pixel.sat,
                        Channel::Val => pixel.val,
                    };
                    self.memory.store(dst, value)?;
                }
            }
        }
    }

    fn binary(&mut self, dst: u8, a: u8, b: u8, f: fn(i32, i32) -> i32) -> Result<(), VmFault> {
        let lhs = self.memory.load(a)?;
        let rhs = self.memory.load(b)?;
        self.memory.store(dst, f(lhs, rhs))
    }

    fn divide(&mut self, dst: u8, a: u8, b: u8, rem: bool) -> Result<(), VmFault> {
        let lhs = self.memory.load(a)?;
        let rhs = self.memory.load(b)?;
        if rhs == 0 {
            return Err(VmFault::DivideByZero);
        }
        // wrapping_div: i32::MIN / -1 wraps instead of overflowing.
        let value = if rem {
            lhs.wrapping_rem(rhs)
        } else {
            lhs.wrapping_div(rhs)
        };
        self.memory.store(dst, value)
    }

    fn resolve(&self, table: &BindingsView<'_>, key: u8) -> Result<KeyBinding, VmFault> {
        if (key as usize) < table.len() {
            Ok(table.get(key as usize))
        } else {
            Err(VmFault::UnboundKey(key))
        }
    }
}
