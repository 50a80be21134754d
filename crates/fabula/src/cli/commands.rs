//! CLI command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Fabula - turn a generated story into a storyboard
#[derive(Parser, Debug)]
#[command(name = "fabula")]
#[command(about = "Turn a generated story into a storyboard of scene images", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a story and render its storyboard
    Run {
        /// Directory receiving images and history.json
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Extra configuration file layered over the defaults
        #[arg(long)]
        config: Option<PathBuf>,

        /// Imagine scenes against the full conversation instead of its summary
        #[arg(long)]
        no_consolidation: bool,
    },

    /// Extract structured data from a model reply and print it as JSON
    Extract {
        /// File holding the reply; reads stdin when omitted
        file: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_flags() {
        let cli = Cli::parse_from([
            "fabula",
            "run",
            "--output-dir",
            "out",
            "--no-consolidation",
            "-v",
        ]);

        assert!(cli.verbose);
        match cli.command {
            Commands::Run {
                output_dir,
                config,
                no_consolidation,
            } => {
                assert_eq!(output_dir, Some(PathBuf::from("out")));
                assert!(config.is_none());
                assert!(no_consolidation);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_extract_defaults_to_stdin() {
        let cli = Cli::parse_from(["fabula", "extract"]);
        assert!(matches!(cli.command, Commands::Extract { file: None }));
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
