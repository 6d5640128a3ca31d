//! CLI command implementations.

pub mod check;
pub mod dump;
pub mod run;

use std::path::Path;

use lumen_image::{LoadOptions, ProgramImage};

/// Load an image file for inspection, exiting with a message on failure.
pub(crate) fn load_image(path: &Path, verify: bool) -> ProgramImage {
    match ProgramImage::load_file(path, LoadOptions::new().verify_checksum(verify)) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}
