//! rocm-configure CLI - ROCm toolkit detection for build configuration

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use rocm_configure::util::diagnostic::{emit, stderr_supports_color};
use rocm_configure::ConfigureError;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let color = stderr_supports_color(cli.no_color);

    if let Err(e) = run(cli) {
        report_error(&e, color);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("rocm_configure=debug")
    } else {
        EnvFilter::new("rocm_configure=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let global = commands::GlobalArgs {
        verbose: cli.verbose,
        config: cli.config,
    };

    // Execute command
    match cli.command {
        Commands::Configure(args) => commands::configure::execute(args, &global),
        Commands::Show(args) => commands::show::execute(args, &global),
        Commands::Includes(args) => commands::includes::execute(args, &global),
        Commands::Libname(args) => commands::libname::execute(args),
        Commands::Doctor => commands::doctor::execute(&global),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

/// Configuration errors get the full diagnostic; anything else is printed
/// with its context chain.
fn report_error(e: &anyhow::Error, color: bool) {
    match e.downcast_ref::<ConfigureError>() {
        Some(err) => {
            let mut diag = err.to_diagnostic();
            let outer = e.to_string();
            if outer != err.to_string() {
                diag = diag.with_context(outer);
            }
            emit(&diag, color);
        }
        None => eprintln!("error: {:#}", e),
    }
}
