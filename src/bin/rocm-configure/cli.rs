//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// rocm-configure - detect a ROCm toolkit and generate build configuration
#[derive(Parser)]
#[command(name = "rocm-configure")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Extra configuration file, merged over the global and project ones
    #[arg(long, global = true, value_name = "FILE", env = "ROCM_CONFIGURE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate the rocm/ and crosstool/ configuration trees
    Configure(ConfigureArgs),

    /// Show the detected host facts and the selected mode
    Show(ShowArgs),

    /// Print the host compiler's default include directories
    Includes(IncludesArgs),

    /// Print the platform file name of a library
    Libname(LibnameArgs),

    /// Check the host compiler and ROCm installation
    Doctor,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct ConfigureArgs {
    /// Directory to generate into (defaults to `rocm_config` or the
    /// configured `[output] dir`)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct IncludesArgs {
    /// Compiler to query instead of the detected one
    #[arg(long, value_name = "PATH")]
    pub compiler: Option<PathBuf>,
}

#[derive(Args)]
pub struct LibnameArgs {
    /// Logical library name, e.g. `rocblas`
    pub name: String,

    /// Name the static library
    #[arg(long = "static")]
    pub is_static: bool,

    /// Version suffix for shared libraries
    #[arg(long)]
    pub version: Option<String>,

    /// Host OS tag (Linux, FreeBSD, Darwin, Windows); defaults to this host
    #[arg(long)]
    pub os: Option<String>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
