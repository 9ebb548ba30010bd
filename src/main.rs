//! shipline - CLI for declarative build-and-release orchestration
//!
//! ## Commands
//!
//! - `shipline run` - Execute the release pipeline for a trigger
//! - `shipline plan` - Show the expanded plan without executing anything
//! - `shipline completions` - Generate shell completions
//!
//! ## Quick Start
//!
//! ```bash
//! # Dry-run a pull request trigger
//! shipline plan --event pull-request --ref feature/x --commit 0123456789abcdef
//!
//! # Cut a tagged release
//! shipline run --event dispatch --ref master --commit 0123456789abcdef --tag v1.2.3
//!
//! # Generate shell completions
//! shipline completions bash > /etc/bash_completion.d/shipline
//! ```

use std::process::ExitCode;

use shipline::infrastructure::{Config, init_from_config};

fn main() -> ExitCode {
    init_from_config(&Config::default());

    match shipline::cli::run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            if std::env::var("SHIPLINE_VERBOSE").is_ok() {
                eprintln!("{:?}", e);
            }
            ExitCode::FAILURE
        }
    }
}
