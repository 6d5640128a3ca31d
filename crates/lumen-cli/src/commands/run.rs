use lumen_image::LoadOptions;
use lumen_vm::{PixelState, Program, ProgramInfo, Status};
use serde::Serialize;

use crate::cli::RunParams;

#[derive(Serialize)]
struct RunReport {
    info: ProgramInfo,
    published: Vec<PublishedVar>,
    pixels: Vec<PixelState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Vec<i32>>,
}

#[derive(Serialize)]
struct PublishedVar {
    hash: String,
    value: i32,
}

pub fn run(params: RunParams) {
    let bytes = match std::fs::read(&params.image) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    let options = LoadOptions::new().verify_checksum(params.verify);
    let loaded = match params.seed {
        Some(seed) => Program::load_seeded(bytes, options, seed),
        None => Program::load(bytes, options),
    };
    let mut program = match loaded {
        Ok(program) => program,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    if let Err(fault) = program.run_init() {
        eprintln!("init fault: {fault}");
    } else {
        for _ in 0..params.ticks {
            if let Err(fault) = program.run_loop() {
                eprintln!("loop fault at frame {}: {fault}", program.frame_number());
                break;
            }
        }
    }

    let report = RunReport {
        info: program.info(),
        published: program
            .published()
            .into_iter()
            .map(|(hash, value)| PublishedVar {
                hash: format!("{hash:#010x}"),
                value,
            })
            .collect(),
        pixels: program.pixels().to_vec(),
        data: params
            .data
            .then(|| program.state().memory().as_slice().to_vec()),
    };

    let json = if params.compact {
        serde_json::to_string(&report)
    } else {
        serde_json::to_string_pretty(&report)
    };
    println!("{}", json.expect("report serialization failed"));

    if program.status() == Status::Faulted {
        std::process::exit(2);
    }
}
