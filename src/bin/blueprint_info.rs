//! Print a summary of a blueprint file.
//!
//! Usage: cargo run --bin blueprint_info -- <file.bpz> [--engine <version>]

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::process::ExitCode;

use regionkit::blueprint::{decode, BlueprintInfo};

fn main() -> ExitCode {
    regionkit::core::logging::init();

    let mut path = None;
    let mut engine = env!("CARGO_PKG_VERSION").to_string();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--engine" => {
                if let Some(version) = args.next() {
                    engine = version;
                }
            }
            _ => path = Some(PathBuf::from(arg)),
        }
    }
    let Some(path) = path else {
        eprintln!("Usage: blueprint_info <file.bpz> [--engine <version>]");
        return ExitCode::FAILURE;
    };

    let file = match File::open(&path) {
        Ok(f) => f,
        Err(e) => {
            log::error!("Cannot open {}: {}", path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    match decode(BufReader::new(file), &engine) {
        Ok(blueprint) => {
            println!("{}", path.display());
            print!("{}", BlueprintInfo::new(&blueprint));
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Failed to read {}: {}", path.display(), e);
            ExitCode::FAILURE
        }
    }
}
