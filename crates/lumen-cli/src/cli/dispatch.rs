//! Typed parameter extraction from clap matches.

use std::path::PathBuf;

use clap::ArgMatches;

pub struct CheckParams {
    pub image: PathBuf,
    pub verify: bool,
}

impl CheckParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            image: m.get_one::<PathBuf>("image").expect("required").clone(),
            verify: !m.get_flag("no_verify"),
        }
    }
}

pub struct DumpParams {
    pub image: PathBuf,
    pub verify: bool,
}

impl DumpParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            image: m.get_one::<PathBuf>("image").expect("required").clone(),
            verify: !m.get_flag("no_verify"),
        }
    }
}

pub struct RunParams {
    pub image: PathBuf,
    pub verify: bool,
    pub ticks: u32,
    pub seed: Option<u64>,
    pub data: bool,
    pub compact: bool,
}

impl RunParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            image: m.get_one::<PathBuf>("image").expect("required").clone(),
            verify: !m.get_flag("no_verify"),
            ticks: *m.get_one::<u32>("ticks").expect("defaulted"),
            seed: m.get_one::<u64>("seed").copied(),
            data: m.get_flag("data"),
            compact: m.get_flag("compact"),
        }
    }
}
