//! Command line argument parsing using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// intentport - train portable intent classifiers
#[derive(Parser, Debug, Clone)]
#[command(name = "intentport")]
#[command(about = "Train an intent classifier and export portable artifacts")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct IntentportArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl IntentportArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1,
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Train on a dataset and export artifacts
    Train(TrainArgs),

    /// Classify a text with exported artifacts
    Predict(PredictArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct TrainArgs {
    /// Dataset file (JSON)
    #[arg(value_name = "DATASET")]
    pub dataset: PathBuf,

    /// Directory the artifacts are written to
    #[arg(short, long, value_name = "DIR", default_value = "artifacts")]
    pub output_dir: PathBuf,

    /// Training configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG", env = "INTENTPORT_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct PredictArgs {
    /// Directory holding exported artifacts
    #[arg(value_name = "ARTIFACT_DIR")]
    pub artifact_dir: PathBuf,

    /// Text to classify
    #[arg(value_name = "TEXT")]
    pub text: String,
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_train_command() {
        let args = IntentportArgs::try_parse_from([
            "intentport",
            "train",
            "data/intents.json",
            "-o",
            "out",
            "--config",
            "train.json",
        ])
        .unwrap();

        if let Command::Train(train_args) = args.command {
            assert_eq!(train_args.dataset, PathBuf::from("data/intents.json"));
            assert_eq!(train_args.output_dir, PathBuf::from("out"));
            assert_eq!(train_args.config, Some(PathBuf::from("train.json")));
        } else {
            panic!("Expected Train command");
        }
    }

    #[test]
    fn test_predict_command() {
        let args =
            IntentportArgs::try_parse_from(["intentport", "predict", "out", "quero um plano"]).unwrap();

        if let Command::Predict(predict_args) = args.command {
            assert_eq!(predict_args.artifact_dir, PathBuf::from("out"));
            assert_eq!(predict_args.text, "quero um plano");
        } else {
            panic!("Expected Predict command");
        }
    }

    #[test]
    fn test_verbosity_levels() {
        let args = IntentportArgs::try_parse_from(["intentport", "predict", "out", "oi"]).unwrap();
        assert_eq!(args.verbosity(), 1);

        let args = IntentportArgs::try_parse_from(["intentport", "-vv", "predict", "out", "oi"]).unwrap();
        assert_eq!(args.verbosity(), 2);

        let args = IntentportArgs::try_parse_from(["intentport", "predict", "out", "oi", "--quiet"]).unwrap();
        assert_eq!(args.verbosity(), 0);
    }

    #[test]
    fn test_output_format() {
        let args = IntentportArgs::try_parse_from([
            "intentport",
            "--format",
            "json",
            "--pretty",
            "predict",
            "out",
            "oi",
        ])
        .unwrap();
        assert_eq!(args.output_format, OutputFormat::Json);
        assert!(args.pretty);
    }
}
