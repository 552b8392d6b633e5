// ============================================================
// Layer 2 — EvaluateUseCase
// ============================================================
// Scores a saved checkpoint on a test split:
//
//   Step 1: Open the checkpoint dir and load its TrainConfig
//   Step 2: Apply command-line overrides
//   Step 3: Regenerate the test split
//   Step 4: Rebuild the model and load the weights
//   Step 5: Run the evaluator
//
// Without a seed override the split is the exact one the run
// was tested on: the generator replays the training draws first.

use anyhow::Result;
use burn::{
    backend::{ndarray::NdArrayDevice, wgpu::WgpuDevice, NdArray, Wgpu},
    prelude::*,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{dataset::CopyDataset, generator::CopyTaskGenerator};
use crate::domain::{run_options::BackendKind, traits::SampleSource};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::{
    evaluator::{evaluate, EvalReport},
    model::{DrnnCopyConfig, DrnnCopyModel},
};

/// Overrides on top of the saved TrainConfig
#[derive(Debug, Clone, Default)]
pub struct EvaluateOptions {
    pub checkpoint_dir: String,
    /// Epoch to load; latest when unset
    pub epoch:      Option<usize>,
    /// Load the epoch with the lowest test loss instead
    pub best:       bool,
    pub n_test:     Option<usize>,
    /// Draw a fresh test set from this seed
    pub seed:       Option<u64>,
    pub batch_size: Option<usize>,
    pub backend:    Option<BackendKind>,
}

#[derive(Debug, Clone, Copy)]
pub struct Evaluation {
    pub epoch:  usize,
    pub report: EvalReport,
}

pub struct EvaluateUseCase {
    options: EvaluateOptions,
}

impl EvaluateUseCase {
    pub fn new(options: EvaluateOptions) -> Self {
        Self { options }
    }

    pub fn execute(&self) -> Result<Evaluation> {
        let opts = &self.options;

        // ── Step 1: Saved run ─────────────────────────────────────────────────
        let ckpt = CheckpointManager::open(&opts.checkpoint_dir)?;
        let mut cfg = ckpt.load_config()?;

        // ── Step 2: Overrides ─────────────────────────────────────────────────
        let epoch = if opts.best { Some(ckpt.best_epoch()?) } else { opts.epoch };
        if let Some(n) = opts.n_test     { cfg.n_test = n; }
        if let Some(b) = opts.batch_size { cfg.batch_size = b; }
        if let Some(k) = opts.backend    { cfg.backend = k; }
        cfg.validate()?;

        // ── Step 3: Test split ────────────────────────────────────────────────
        let dataset = test_split(&cfg, opts.seed);
        tracing::info!(
            "Evaluating on {} sequences of {} steps",
            dataset.sample_count(),
            cfg.task().n_steps()
        );

        // ── Steps 4 + 5: Model and evaluation ─────────────────────────────────
        match cfg.backend {
            BackendKind::Wgpu => {
                evaluate_on::<Wgpu>(&cfg, &ckpt, epoch, dataset, WgpuDevice::default())
            }
            BackendKind::NdArray => {
                evaluate_on::<NdArray>(&cfg, &ckpt, epoch, dataset, NdArrayDevice::default())
            }
        }
    }
}

/// The run's own test split, or a fresh one when `seed` is given.
fn test_split(cfg: &TrainConfig, seed: Option<u64>) -> CopyDataset {
    match seed {
        Some(seed) => {
            let mut generator = CopyTaskGenerator::new(cfg.task(), seed);
            CopyDataset::new(generator.generate(cfg.n_test))
        }
        None => {
            let mut generator = CopyTaskGenerator::new(cfg.task(), cfg.seed);
            for _ in 0..cfg.n_train {
                generator.sample();
            }
            CopyDataset::new(generator.generate(cfg.n_test))
        }
    }
}

fn evaluate_on<B: Backend>(
    cfg:    &TrainConfig,
    ckpt:   &CheckpointManager,
    epoch:  Option<usize>,
    data:   CopyDataset,
    device: B::Device,
) -> Result<Evaluation> {
    let model: DrnnCopyModel<B> = DrnnCopyConfig::from(cfg).init(&device);
    let (model, epoch) = ckpt.load_model(model, &device, epoch)?;

    let report = evaluate(&model, data, cfg.batch_size, cfg.task().copy_window());
    Ok(Evaluation { epoch, report })
}
