//! Binary entrypoint for the notelock server.
//! Run with: cargo run --bin notelock-server

use std::process::ExitCode;

use notelock::startup;

fn main() -> ExitCode {
    startup::run()
}
