use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use log::error;

use prop_expert::{load_program, run_interactive, run_queries};

/// Backward-chaining propositional expert system.
#[derive(Parser)]
#[command(name = "prop-expert", version, about = "Backward-chaining propositional expert system")]
struct Cli {
    /// Path to a rules/facts/query program file.
    file: PathBuf,

    /// Drop into an interactive +X/-X/?X/.../`/q` session after loading.
    #[arg(short, long)]
    interactive: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let program = match load_program(&cli.file) {
        Ok(program) => program,
        Err(e) => {
            error!("{e}");
            eprintln!("{e}");
            return ExitCode::from(e.exit_code() as u8);
        }
    };

    let stdout = std::io::stdout();
    let outcome = if cli.interactive {
        let stdin = std::io::stdin();
        run_interactive(program, stdin.lock(), stdout.lock()).context("interactive session failed")
    } else {
        run_queries(&program, stdout.lock()).context("failed to run queries")
    };

    if let Err(e) = outcome {
        error!("{e:#}");
        eprintln!("{e:#}");
        return ExitCode::from(66);
    }

    ExitCode::SUCCESS
}
