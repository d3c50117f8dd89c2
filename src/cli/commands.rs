//! Command implementations.

use anyhow::{Context, Result};
use log::info;

use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::TrainingConfig;
use crate::ml::intent_classifier::{IntentClassifier, PortableIntentModel};
use crate::pipeline::Trainer;

/// Execute a CLI command.
pub fn execute_command(args: IntentportArgs) -> Result<()> {
    match &args.command {
        Command::Train(train_args) => train(train_args, &args),
        Command::Predict(predict_args) => predict(predict_args, &args),
    }
}

fn train(args: &TrainArgs, cli_args: &IntentportArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => TrainingConfig::from_file(path)
            .with_context(|| format!("failed to load configuration {}", path.display()))?,
        None => TrainingConfig::default(),
    };
    let trainer = Trainer::new(config)?;

    info!(
        "Training on {} into {}",
        args.dataset.display(),
        args.output_dir.display()
    );
    let report = trainer
        .run(&args.dataset, &args.output_dir)
        .with_context(|| format!("training on {} failed", args.dataset.display()))?;

    output_report(&report, cli_args)
}

fn predict(args: &PredictArgs, cli_args: &IntentportArgs) -> Result<()> {
    let model = PortableIntentModel::load(&args.artifact_dir)
        .with_context(|| format!("failed to load artifacts from {}", args.artifact_dir.display()))?;
    let prediction = model.predict(&args.text)?;

    output_prediction(&prediction, cli_args)
}
