//! # CLI Argument Definitions
//!
//! Subcommands and global flags of the `dtwin` binary, parsed with `clap`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "dtwin")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Inspect the twin model registry and normalize twin documents")]
pub struct Cli {
    /// Configuration file (defaults to `dtwin.toml` in the working directory, if present)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Export one DTDL interface per registered model
    Models {
        /// Write `<TypeName>.json` files here instead of printing
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },
    /// List registered model ids
    List,
    /// Print the canonical wire form of a twin document
    Convert {
        /// Twin document carrying `$metadata.$model`
        file: PathBuf,
    },
    /// Print the upload shape (header plus contents) of a twin document
    Contents {
        /// Twin document carrying `$metadata.$model`
        file: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from(["dtwin", "models", "--out", "schemas", "--verbose"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Models { out: Some(ref dir) } if dir.ends_with("schemas")));
    }
}
