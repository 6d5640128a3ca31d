//! Execution state: the mutable runtime context of one loaded program.

use lumen_image::ProgramImage;
use serde::Serialize;

use super::memory::DataMemory;
use super::rng::Rng;

/// Pixel output channels for one bound pixel object.
///
/// Written by pixel instructions, read externally by the pixel driver. The
/// core never calls the driver; it only owns this side table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PixelState {
    pub hue: i32,
    pub sat: i32,
    pub val: i32,
}

/// Mutable runtime context for one loaded program.
///
/// Created whole by a successful load and replaced whole by the next one; a
/// failed load never touches an existing state. Section offsets and counts
/// stay with the [`ProgramImage`], which every run call receives alongside
/// this state.
#[derive(Clone, Debug)]
pub struct ExecutionState {
    pub(crate) memory: DataMemory,
    pub(crate) pixels: Vec<PixelState>,
    pub(crate) rng: Rng,
    frame_number: u32,
    /// Loader-reserved flag byte, kept for forward compatibility.
    byte0: u8,
}

impl ExecutionState {
    pub(crate) fn new(image: &ProgramImage, rng: Rng) -> Self {
        Self {
            memory: DataMemory::new(image.data_words().collect()),
            pixels: vec![PixelState::default(); image.pixel_objects().len()],
            rng,
            frame_number: 0,
            byte0: 0,
        }
    }

    /// Loop invocations since load.
    pub fn frame_number(&self) -> u32 {
        self.frame_number
    }

    /// Current pseudo-random state, advanced by ticks and `rand` draws.
    pub fn rng_state(&self) -> u64 {
        self.rng.state()
    }

    /// Loader-reserved flag byte.
    pub fn byte0(&self) -> u8 {
        self.byte0
    }

    pub fn memory(&self) -> &DataMemory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut DataMemory {
        &mut self.memory
    }

    /// Pixel output side table, indexed by pixel-object handle.
    pub fn pixels(&self) -> &[PixelState] {
        &self.pixels
    }

    /// Advance per-tick state: frame counter and pseudo-random step.
    pub(crate) fn advance_frame(&mut self) {
        self.frame_number = self.frame_number.wrapping_add(1);
        self.rng.step();
    }
}
