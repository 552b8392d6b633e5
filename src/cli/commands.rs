// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the three subcommands: `train`, `evaluate` and
// `sample`, and all their configurable flags.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for bad values
//   - type conversion (string → usize, f64, CellKind, etc.)
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};

use crate::application::{
    evaluate_use_case::EvaluateOptions,
    train_use_case::TrainConfig,
};
use crate::domain::{
    copy_task::MarkerLayout,
    run_options::{BackendKind, CellKind, OptimizerKind},
};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train a Dilated RNN on the copying memory task
    Train(TrainArgs),

    /// Score a saved checkpoint on a test split
    Evaluate(EvaluateArgs),

    /// Print one generated input/target pair
    Sample(SampleArgs),
}

/// All arguments for the `train` command.
/// Each field becomes a --flag on the command line.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Directory to save checkpoints, config and metrics
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Number of blank steps between the digits and the trigger (T)
    #[arg(long, default_value_t = 1000)]
    pub blank_len: usize,

    /// Number of digits to memorise (L)
    #[arg(long, default_value_t = 10)]
    pub seq_len: usize,

    /// Trigger layout: single or repeated
    #[arg(long, default_value = "single")]
    pub layout: MarkerLayout,

    /// Number of training sequences
    #[arg(long, default_value_t = 10_000)]
    pub n_train: usize,

    /// Number of test sequences
    #[arg(long, default_value_t = 1_000)]
    pub n_test: usize,

    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    /// Number of full passes through the training data
    #[arg(long, default_value_t = 50)]
    pub epochs: usize,

    /// Initial learning rate
    #[arg(long, default_value_t = 5e-4)]
    pub lr: f64,

    /// rmsprop or adam
    #[arg(long, default_value = "rmsprop")]
    pub optimizer: OptimizerKind,

    /// Gradient-norm clip, -1 means no clip
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub clip: f64,

    /// Number of hidden units per layer
    #[arg(long, default_value_t = 10)]
    pub hidden: usize,

    /// Number of dilated layers; layer i has dilation 2^i
    #[arg(long, default_value_t = 8)]
    pub levels: usize,

    /// gru, lstm or rnn
    #[arg(long, default_value = "gru")]
    pub cell: CellKind,

    /// Dropout between dilated layers (0 = no dropout)
    #[arg(long, default_value_t = 0.0)]
    pub dropout: f64,

    /// Report interval in batches
    #[arg(long, default_value_t = 50)]
    pub log_interval: usize,

    #[arg(long, default_value_t = 1111)]
    pub seed: u64,

    /// wgpu or ndarray
    #[arg(long, default_value = "wgpu")]
    pub backend: BackendKind,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            checkpoint_dir: a.checkpoint_dir,
            blank_len:      a.blank_len,
            seq_len:        a.seq_len,
            layout:         a.layout,
            n_train:        a.n_train,
            n_test:         a.n_test,
            batch_size:     a.batch_size,
            epochs:         a.epochs,
            lr:             a.lr,
            optimizer:      a.optimizer,
            clip:           a.clip,
            hidden:         a.hidden,
            levels:         a.levels,
            cell:           a.cell,
            dropout:        a.dropout,
            log_interval:   a.log_interval,
            seed:           a.seed,
            backend:        a.backend,
        }
    }
}

/// All arguments for the `evaluate` command.
/// Unset flags fall back to the values saved with the run.
#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Directory where checkpoints were saved during training
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Epoch to load (defaults to the latest)
    #[arg(long, conflicts_with = "best")]
    pub epoch: Option<usize>,

    /// Load the epoch with the lowest test loss
    #[arg(long)]
    pub best: bool,

    /// Number of test sequences
    #[arg(long)]
    pub n_test: Option<usize>,

    /// Seed for a fresh test set (defaults to the run's own test split)
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long)]
    pub batch_size: Option<usize>,

    /// wgpu or ndarray
    #[arg(long)]
    pub backend: Option<BackendKind>,
}

impl From<EvaluateArgs> for EvaluateOptions {
    fn from(a: EvaluateArgs) -> Self {
        EvaluateOptions {
            checkpoint_dir: a.checkpoint_dir,
            epoch:          a.epoch,
            best:           a.best,
            n_test:         a.n_test,
            seed:           a.seed,
            batch_size:     a.batch_size,
            backend:        a.backend,
        }
    }
}

/// All arguments for the `sample` command
#[derive(Args, Debug)]
pub struct SampleArgs {
    #[arg(long, default_value_t = 20)]
    pub blank_len: usize,

    #[arg(long, default_value_t = 5)]
    pub seq_len: usize,

    #[arg(long, default_value = "single")]
    pub layout: MarkerLayout,

    #[arg(long, default_value_t = 1111)]
    pub seed: u64,
}
