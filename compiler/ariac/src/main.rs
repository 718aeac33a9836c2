//! `ariac`: compile an Aria source file to a native executable.

use std::process::ExitCode;

use ariac::options::USAGE;
use ariac::{CompileError, Options};

fn main() -> ExitCode {
    ariac::init_tracing();

    let options = match Options::parse(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("error: {err}");
            eprintln!();
            eprintln!("{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    match ariac::build(&options) {
        Ok(artifacts) => {
            println!("Generated assembly: {}", artifacts.asm.display());
            if let Some(exe) = artifacts.executable {
                println!("Build successful: {}", exe.display());
            }
            ExitCode::SUCCESS
        }
        Err(CompileError::Parse(errors)) => {
            for err in &errors {
                eprintln!("{err}");
            }
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
