//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use yardline_cli::CliError;

fn main() {
    match yardline_cli::run() {
        Ok(()) => {}
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("yardline: {err}");
            std::process::exit(1);
        }
    }
}
