//! Runtime engine: data memory, interpreter, and the init/loop scheduler.

mod error;
mod interp;
mod memory;
mod rng;
mod scheduler;
mod state;

#[cfg(test)]
mod engine_tests;

pub use error::{KeyError, LoadError, RunOutcome, VmFault};
pub use interp::{MAX_CYCLES, RETURN_VAL_ADDR, evaluate, run};
pub use memory::DataMemory;
pub use scheduler::{Program, ProgramInfo, Status};
pub use state::{ExecutionState, PixelState};
