//! Cycle-bounded bytecode engine for lumen lighting programs.
//!
//! The engine executes a validated [`lumen_image::ProgramImage`]: an init
//! phase once after load, then one loop phase per control tick, each bounded
//! by a fixed cycle budget so a misbehaving program can never stall the
//! real-time loop.

pub mod engine;

pub use engine::{
    DataMemory, ExecutionState, KeyError, LoadError, MAX_CYCLES, PixelState, Program,
    ProgramInfo, RETURN_VAL_ADDR, RunOutcome, Status, VmFault, evaluate, run,
};
