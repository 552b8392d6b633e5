// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Three commands are supported:
//   1. `train`    — trains a DRNN on the copying memory task
//   2. `evaluate` — scores a saved checkpoint
//   3. `sample`   — prints one generated sequence pair
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, EvaluateArgs, SampleArgs, TrainArgs};

use crate::data::generator::CopyTaskGenerator;
use crate::domain::{copy_task::CopyTask, traits::SampleSource};

#[derive(Parser, Debug)]
#[command(
    name = "drnn-copy",
    version,
    about = "Train a Dilated RNN on the copying memory task."
)]
pub struct Cli {
    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)    => run_train(args),
            Commands::Evaluate(args) => run_evaluate(args),
            Commands::Sample(args)   => run_sample(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!(
        "Starting training: T={}, L={}, cell={}, levels={}",
        args.blank_len, args.seq_len, args.cell, args.levels
    );

    let summary = TrainUseCase::new(args.into()).execute()?;

    match summary.best_epoch {
        Some(epoch) => println!(
            "Training complete. Best test loss {:.6} at epoch {}.",
            summary.best_test_loss, epoch
        ),
        None => println!("Training complete."),
    }
    Ok(())
}

fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    use crate::application::evaluate_use_case::EvaluateUseCase;

    let result = EvaluateUseCase::new(args.into()).execute()?;
    let r = result.report;
    println!(
        "Epoch {}: Average loss: {:.6}, Accuracy: {:.4}, Copy accuracy: {:.4} ({} positions)",
        result.epoch, r.loss, r.accuracy, r.copy_accuracy, r.positions
    );
    Ok(())
}

fn run_sample(args: SampleArgs) -> Result<()> {
    let task = CopyTask::new(args.blank_len, args.seq_len, args.layout);
    task.validate()?;

    let sample = CopyTaskGenerator::new(task, args.seed).sample();
    let input: Vec<u32> = sample.input.iter().map(|&x| x as u32).collect();

    println!("prefix: {}", join_digits(sample.prefix()));
    println!("input:  {}", join_digits(&input));
    println!("target: {}", join_digits(&sample.target));
    Ok(())
}

fn join_digits(xs: &[u32]) -> String {
    xs.iter().map(u32::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::train_use_case::TrainConfig;
    use crate::domain::{
        copy_task::MarkerLayout,
        run_options::{BackendKind, CellKind, OptimizerKind},
    };

    #[test]
    fn test_train_defaults_match_config_defaults() {
        let cli = Cli::try_parse_from(["drnn-copy", "train"]).unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        assert_eq!(TrainConfig::from(args), TrainConfig::default());
    }

    #[test]
    fn test_train_flags_parse() {
        let cli = Cli::try_parse_from([
            "drnn-copy", "train",
            "--cell", "lstm",
            "--optimizer", "adam",
            "--layout", "repeated",
            "--backend", "cpu",
            "--clip", "-1",
            "--levels", "4",
        ])
        .unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        let cfg = TrainConfig::from(args);

        assert_eq!(cfg.cell, CellKind::Lstm);
        assert_eq!(cfg.optimizer, OptimizerKind::Adam);
        assert_eq!(cfg.layout, MarkerLayout::Repeated);
        assert_eq!(cfg.backend, BackendKind::NdArray);
        assert_eq!(cfg.clip, -1.0);
        assert!(!cfg.clipping_enabled());
        assert_eq!(cfg.levels, 4);
    }

    #[test]
    fn test_unknown_cell_is_rejected() {
        assert!(Cli::try_parse_from(["drnn-copy", "train", "--cell", "transformer"]).is_err());
    }

    #[test]
    fn test_evaluate_overrides_are_optional() {
        let cli = Cli::try_parse_from(["drnn-copy", "evaluate", "--epoch", "3"]).unwrap();
        let Commands::Evaluate(args) = cli.command else { panic!("expected evaluate") };
        assert_eq!(args.epoch, Some(3));
        assert_eq!(args.seed, None);
        assert_eq!(args.checkpoint_dir, "checkpoints");
        assert!(!args.best);
    }

    #[test]
    fn test_best_conflicts_with_epoch() {
        assert!(Cli::try_parse_from(["drnn-copy", "evaluate", "--best"]).is_ok());
        assert!(Cli::try_parse_from(["drnn-copy", "evaluate", "--best", "--epoch", "2"]).is_err());
    }

    #[test]
    fn test_join_digits() {
        assert_eq!(join_digits(&[0, 4, 9]), "049");
    }
}
