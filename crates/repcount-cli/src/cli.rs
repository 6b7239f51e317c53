//! Command-Line Interface

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Count exercise repetitions in a video or a landmark recording
#[derive(Parser, Debug)]
#[command(name = "repcount")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Analysis deadline in seconds (overrides REPCOUNT_TIMEOUT_SECS)
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// Print Prometheus metrics to stderr after the run
    #[arg(long, global = true)]
    pub print_metrics: bool,

    /// Pretty-print the JSON output
    #[arg(long, global = true)]
    pub pretty: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decode a video, estimate poses and count repetitions
    Analyze {
        /// Video file
        #[arg(short, long)]
        video: PathBuf,

        /// push-ups, sit-ups, vertical-jump or shuttle-run
        #[arg(short, long)]
        assessment: String,
    },

    /// Count repetitions from recorded landmarks (JSON Lines)
    Replay {
        /// Landmark recording, one frame per line
        #[arg(short, long)]
        landmarks: PathBuf,

        /// push-ups, sit-ups, vertical-jump or shuttle-run
        #[arg(short, long)]
        assessment: String,
    },

    /// Print the JSON Schema of the output document
    Schema,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_replay_with_globals() {
        let cli = Cli::try_parse_from([
            "repcount",
            "replay",
            "--landmarks",
            "frames.jsonl",
            "--assessment",
            "jump",
            "--timeout-secs",
            "5",
        ])
        .unwrap();

        assert_eq!(cli.timeout_secs, Some(5));
        match cli.command {
            Commands::Replay {
                landmarks,
                assessment,
            } => {
                assert_eq!(landmarks, PathBuf::from("frames.jsonl"));
                assert_eq!(assessment, "jump");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
