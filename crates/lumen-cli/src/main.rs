mod cli;
mod commands;

use cli::{CheckParams, DumpParams, RunParams, build_cli};

fn main() {
    let matches = build_cli().get_matches();

    match matches.subcommand() {
        Some(("check", m)) => {
            let params = CheckParams::from_matches(m);
            commands::check::run(params);
        }
        Some(("dump", m)) => {
            let params = DumpParams::from_matches(m);
            commands::dump::run(params);
        }
        Some(("run", m)) => {
            let params = RunParams::from_matches(m);
            commands::run::run(params);
        }
        _ => unreachable!("clap should have caught this"),
    }
}
