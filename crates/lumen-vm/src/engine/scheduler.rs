//! Init/loop orchestration and the firmware-facing program handle.
//!
//! [`Program`] owns the one live image + execution state pair. The
//! surrounding firmware calls [`run_loop`](Program::run_loop) once per
//! fixed-period tick; a replacement program is built completely before the
//! old one is dropped, so the swap is a single value move.

use lumen_image::{LoadOptions, ProgramImage};
use serde::Serialize;

use super::error::{KeyError, LoadError, RunOutcome, VmFault};
use super::interp;
use super::rng::Rng;
use super::state::{ExecutionState, PixelState};

/// Lifecycle position of a loaded program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Validated and resident; init has not run yet.
    Loaded,
    /// Init phase completed.
    Initialized,
    /// Loop phase ticking.
    Running,
    /// The last invocation faulted. The firmware decides whether to keep
    /// the state, re-init, or request a fresh image; nothing here retries.
    Faulted,
}

/// Telemetry snapshot for the status/reporting layer.
#[derive(Clone, Debug, Serialize)]
pub struct ProgramInfo {
    pub status: Status,
    pub frame_number: u32,
    /// Cycles consumed by the most recent successful invocation.
    pub last_cycles: u32,
    pub last_fault: Option<String>,
}

/// One loaded program: the validated image plus its execution state.
#[derive(Debug)]
pub struct Program {
    image: ProgramImage,
    state: ExecutionState,
    status: Status,
    last_cycles: u32,
    last_fault: Option<VmFault>,
}

impl Program {
    /// Validate `bytes` and build a ready-to-init program, drawing a fresh
    /// random seed. Nothing is constructed on any failure path, so a
    /// previously loaded program stays usable until this returns `Ok`.
    pub fn load(bytes: Vec<u8>, options: LoadOptions) -> Result<Self, LoadError> {
        let image = ProgramImage::load(bytes, options)?;
        let rng = Rng::from_entropy()?;
        Ok(Self::assemble(image, rng))
    }

    /// Like [`Program::load`] with a caller-supplied seed. The same image
    /// and seed reproduce the same effect sequence, tick for tick.
    pub fn load_seeded(
        bytes: Vec<u8>,
        options: LoadOptions,
        seed: u64,
    ) -> Result<Self, LoadError> {
        let image = ProgramImage::load(bytes, options)?;
        Ok(Self::assemble(image, Rng::from_seed(seed)))
    }

    fn assemble(image: ProgramImage, rng: Rng) -> Self {
        let state = ExecutionState::new(&image, rng);
        Self {
            image,
            state,
            status: Status::Loaded,
            last_cycles: 0,
            last_fault: None,
        }
    }

    /// Run the init phase. Intended to be called once, before the first
    /// tick; data-memory effects persist into the loop phase.
    pub fn run_init(&mut self) -> Result<RunOutcome, VmFault> {
        let entry = self.image.header().init_entry;
        let result = interp::run(&self.image, entry, &mut self.state);
        self.record(result, Status::Initialized);
        result
    }

    /// Run one loop tick.
    ///
    /// The frame counter and pseudo-random state advance on entry, before
    /// the first instruction executes, so a faulted tick still counts its
    /// frame.
    pub fn run_loop(&mut self) -> Result<RunOutcome, VmFault> {
        self.state.advance_frame();
        let entry = self.image.header().loop_entry;
        let result = interp::run(&self.image, entry, &mut self.state);
        self.record(result, Status::Running);
        result
    }

    fn record(&mut self, result: Result<RunOutcome, VmFault>, on_success: Status) {
        match result {
            Ok(outcome) => {
                self.status = on_success;
                self.last_cycles = outcome.cycles;
                self.last_fault = None;
            }
            Err(fault) => {
                self.status = Status::Faulted;
                self.last_fault = Some(fault);
            }
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn image(&self) -> &ProgramImage {
        &self.image
    }

    pub fn state(&self) -> &ExecutionState {
        &self.state
    }

    pub fn frame_number(&self) -> u32 {
        self.state.frame_number()
    }

    pub fn info(&self) -> ProgramInfo {
        ProgramInfo {
            status: self.status,
            frame_number: self.state.frame_number(),
            last_cycles: self.last_cycles,
            last_fault: self.last_fault.map(|f| f.to_string()),
        }
    }

    /// Read a data-memory word. Out-of-range addresses are caller bugs.
    pub fn get(&self, addr: u8) -> i32 {
        self.state.memory().get(addr)
    }

    /// Batch-read contiguous data-memory words.
    pub fn get_multi(&self, addr: u8, out: &mut [i32]) {
        self.state.memory().get_multi(addr, out);
    }

    /// Write a data-memory word.
    pub fn set(&mut self, addr: u8, value: i32) {
        self.state.memory_mut().set(addr, value);
    }

    /// Feed an external value into the slot bound to `hash` in the read-key
    /// table, ahead of the next tick.
    pub fn inject(&mut self, hash: u32, value: i32) -> Result<(), KeyError> {
        let binding = self
            .image
            .read_keys()
            .find(hash)
            .ok_or(KeyError::Unbound(hash))?;
        self.state.memory_mut().set(binding.addr, value);
        Ok(())
    }

    /// Read back a program-written value through the write-key table.
    pub fn export(&self, hash: u32) -> Result<i32, KeyError> {
        let binding = self
            .image
            .write_keys()
            .find(hash)
            .ok_or(KeyError::Unbound(hash))?;
        Ok(self.state.memory().get(binding.addr))
    }

    /// Snapshot every publish binding as (name hash, value) pairs, for the
    /// telemetry consumer.
    pub fn published(&self) -> Vec<(u32, i32)> {
        self.image
            .publish()
            .iter()
            .map(|binding| (binding.hash, self.state.memory().get(binding.addr)))
            .collect()
    }

    /// Pixel output side table, indexed by pixel-object handle. The pixel
    /// driver consumes this; the core never calls the driver.
    pub fn pixels(&self) -> &[PixelState] {
        self.state.pixels()
    }
}
