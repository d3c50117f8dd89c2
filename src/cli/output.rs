//! Output formatting for CLI commands.

use anyhow::Result;
use serde::Serialize;

use crate::cli::args::{IntentportArgs, OutputFormat};
use crate::ml::intent_classifier::IntentPrediction;
use crate::pipeline::TrainingReport;

/// Print a training report.
pub fn output_report(report: &TrainingReport, args: &IntentportArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Json => output_json(report, args),
        OutputFormat::Human => {
            print!("{}", format_report(report));
            Ok(())
        }
    }
}

/// Print a prediction.
pub fn output_prediction(prediction: &IntentPrediction, args: &IntentportArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Json => output_json(prediction, args),
        OutputFormat::Human => {
            print!("{}", format_prediction(prediction));
            Ok(())
        }
    }
}

fn output_json<T: Serialize>(result: &T, args: &IntentportArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}

pub fn format_report(report: &TrainingReport) -> String {
    let mut out = String::new();
    out.push_str("Training Report:\n");
    out.push_str("════════════════\n");
    out.push_str(&format!(
        "Examples: {} ({} used)\n",
        report.n_examples, report.n_examples_used
    ));
    out.push_str(&format!("Classes: {}\n", report.n_classes));
    if !report.dropped_classes.is_empty() {
        out.push_str(&format!("Dropped classes: {}\n", report.dropped_classes.join(", ")));
    }
    if let Some(reason) = &report.degenerate {
        out.push_str(&format!("Empty artifacts written: {reason}\n"));
    }

    if let Some(split) = &report.split {
        out.push('\n');
        out.push_str(&format!(
            "Split: {} ({} train / {} test, test fraction {:.2})\n",
            split.strategy, split.n_train, split.n_test, split.plan.test_fraction
        ));
        for adjustment in &split.plan.adjustments {
            out.push_str(&format!("  {adjustment}\n"));
        }
    }

    if !report.evaluations.is_empty() {
        out.push('\n');
        out.push_str("Evaluation:\n");
        out.push_str("───────────\n");
        for evaluation in &report.evaluations {
            out.push_str(&format!(
                "{}: accuracy {:.4} on {} examples{}, {}\n",
                evaluation.model,
                evaluation.accuracy,
                evaluation.n_test,
                if evaluation.evaluated_on_training_set {
                    " (training set)"
                } else {
                    ""
                },
                format_bytes(evaluation.size_bytes as u64)
            ));
        }
    }

    let estimate = &report.network_estimate;
    out.push('\n');
    out.push_str(&format!("Vocabulary: {} features\n", report.vocabulary_size));
    out.push_str(&format!(
        "Entities: {} types, {} values\n",
        report.entity_types, report.entity_values
    ));
    out.push_str(&format!(
        "Embedding network estimate: {} parameters, {} float32, {} quantized\n",
        estimate.total_params,
        format_bytes(estimate.float32_bytes as u64),
        format_bytes(estimate.quantized_bytes as u64)
    ));

    if let Some(export) = &report.export {
        out.push('\n');
        out.push_str(&format!("Artifacts in {}:\n", export.directory.display()));
        for file in &export.files {
            out.push_str(&format!("  {} ({})\n", file.name, format_bytes(file.bytes as u64)));
        }
        out.push_str(&format!("Total: {}\n", format_bytes(export.total_bytes() as u64)));
    }
    out
}

pub fn format_prediction(prediction: &IntentPrediction) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Intent: {}\n",
        prediction.intent.as_deref().unwrap_or("(none)")
    ));
    out.push_str(&format!("Tokens: {}\n", prediction.tokens.join(" ")));
    for score in &prediction.scores {
        out.push_str(&format!("  {:<24} {:>8.4}\n", score.intent, score.score));
    }
    if !prediction.entities.is_empty() {
        out.push_str("Entities:\n");
        for entity in &prediction.entities {
            out.push_str(&format!(
                "  {}: {} ({:?})\n",
                entity.entity_type, entity.value, entity.raw_match
            ));
        }
    }
    out
}

/// Format bytes in human-readable format.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}
