// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Validate the configuration         (Layer 2)
//   Step 2: Generate train and test splits     (Layer 4 - data)
//   Step 3: Save config for later evaluation   (Layer 6 - infra)
//   Step 4: Open the metrics log               (Layer 6 - infra)
//   Step 5: Run training on the chosen backend (Layer 5 - ml)
//
// Reference: Burn Book §5 (Training)

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::data::{dataset::CopyDataset, generator::CopyTaskGenerator};
use crate::domain::{
    copy_task::{CopyTask, MarkerLayout},
    run_options::{BackendKind, CellKind, OptimizerKind},
    traits::SampleSource,
};
use crate::infra::{checkpoint::CheckpointManager, metrics::MetricsLogger};
use crate::ml::trainer::{run_training, TrainSummary};

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run.
// Saved next to the checkpoints so `evaluate` can rebuild the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    pub checkpoint_dir: String,
    pub blank_len:      usize,
    pub seq_len:        usize,
    pub layout:         MarkerLayout,
    pub n_train:        usize,
    pub n_test:         usize,
    pub batch_size:     usize,
    pub epochs:         usize,
    pub lr:             f64,
    pub optimizer:      OptimizerKind,
    /// Gradient-norm bound; <= 0 disables clipping
    pub clip:           f64,
    pub hidden:         usize,
    pub levels:         usize,
    pub cell:           CellKind,
    pub dropout:        f64,
    pub log_interval:   usize,
    pub seed:           u64,
    pub backend:        BackendKind,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            checkpoint_dir: "checkpoints".to_string(),
            blank_len:      1000,
            seq_len:        10,
            layout:         MarkerLayout::Single,
            n_train:        10_000,
            n_test:         1_000,
            batch_size:     32,
            epochs:         50,
            lr:             5e-4,
            optimizer:      OptimizerKind::RmsProp,
            clip:           1.0,
            hidden:         10,
            levels:         8,
            cell:           CellKind::Gru,
            dropout:        0.0,
            log_interval:   50,
            seed:           1111,
            backend:        BackendKind::Wgpu,
        }
    }
}

impl TrainConfig {
    pub fn task(&self) -> CopyTask {
        CopyTask::new(self.blank_len, self.seq_len, self.layout)
    }

    pub fn validate(&self) -> Result<()> {
        self.task().validate()?;
        if self.n_train == 0 || self.n_test == 0 {
            bail!("n_train and n_test must both be positive");
        }
        if self.batch_size == 0 {
            bail!("batch_size must be positive");
        }
        if self.epochs == 0 {
            bail!("epochs must be positive");
        }
        if self.hidden == 0 || self.levels == 0 {
            bail!("hidden and levels must both be positive");
        }
        // Layer i dilates by 2^i, which must fit in a usize
        if self.levels >= usize::BITS as usize {
            bail!("levels must be below {}, got {}", usize::BITS, self.levels);
        }
        if self.lr.is_nan() || self.lr <= 0.0 {
            bail!("lr must be positive, got {}", self.lr);
        }
        if !(0.0..1.0).contains(&self.dropout) {
            bail!("dropout must be in [0, 1), got {}", self.dropout);
        }
        if self.log_interval == 0 {
            bail!("log_interval must be positive");
        }
        Ok(())
    }

    pub fn clipping_enabled(&self) -> bool {
        self.clip > 0.0
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<TrainSummary> {
        let cfg = &self.config;

        // ── Step 1: Validate ──────────────────────────────────────────────────
        cfg.validate()?;
        tracing::info!("{:?}", cfg);

        // ── Step 2: Generate data ─────────────────────────────────────────────
        // One generator for both splits: train draws first, test second.
        let task = cfg.task();
        tracing::info!(
            "Preparing data: T={}, L={}, {} steps per sequence",
            task.blank_len, task.seq_len, task.n_steps()
        );
        let mut generator = CopyTaskGenerator::new(task, cfg.seed);
        let train_dataset = CopyDataset::new(generator.generate(cfg.n_train));
        let test_dataset  = CopyDataset::new(generator.generate(cfg.n_test));
        tracing::info!(
            "Generated {} train and {} test sequences",
            train_dataset.sample_count(),
            test_dataset.sample_count()
        );

        // ── Step 3: Save config ───────────────────────────────────────────────
        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir)?;
        ckpt_manager.save_config(cfg)?;

        // ── Step 4: Metrics CSV ───────────────────────────────────────────────
        let metrics = MetricsLogger::new(&cfg.checkpoint_dir)?;
        tracing::info!("Logging epoch metrics to '{}'", metrics.csv_path().display());

        // ── Step 5: Run training loop (Layer 5) ───────────────────────────────
        run_training(cfg, train_dataset, test_dataset, &ckpt_manager, &metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Unique scratch directory under the system temp dir
    fn scratch_dir(name: &str) -> String {
        let dir = std::env::temp_dir()
            .join(format!("drnn-copy-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir.to_string_lossy().into_owned()
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(TrainConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad = [
            TrainConfig { batch_size: 0, ..TrainConfig::default() },
            TrainConfig { lr: 0.0, ..TrainConfig::default() },
            TrainConfig { lr: f64::NAN, ..TrainConfig::default() },
            TrainConfig { dropout: 1.0, ..TrainConfig::default() },
            TrainConfig { blank_len: 0, ..TrainConfig::default() },
            TrainConfig { levels: 0, ..TrainConfig::default() },
            TrainConfig { levels: usize::BITS as usize, ..TrainConfig::default() },
            TrainConfig { levels: 65, ..TrainConfig::default() },
            TrainConfig { n_test: 0, ..TrainConfig::default() },
        ];
        for cfg in bad {
            assert!(cfg.validate().is_err(), "{cfg:?} should be rejected");
        }
    }

    #[test]
    fn test_deepest_stack_still_validates() {
        let cfg = TrainConfig { levels: usize::BITS as usize - 1, ..TrainConfig::default() };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_negative_clip_disables_clipping() {
        assert!(TrainConfig::default().clipping_enabled());
        assert!(!TrainConfig { clip: -1.0, ..TrainConfig::default() }.clipping_enabled());
    }

    #[test]
    fn test_execute_tiny_run_on_cpu() {
        let dir = scratch_dir("train-use-case");
        let cfg = TrainConfig {
            checkpoint_dir: dir.clone(),
            blank_len:      6,
            seq_len:        2,
            n_train:        12,
            n_test:         4,
            batch_size:     4,
            epochs:         2,
            hidden:         4,
            levels:         2,
            log_interval:   2,
            backend:        BackendKind::NdArray,
            ..TrainConfig::default()
        };

        let summary = TrainUseCase::new(cfg).execute().unwrap();

        assert_eq!(summary.epochs.len(), 2);
        assert!(summary.epochs.iter().all(|m| m.train_loss.is_finite() && m.test_loss.is_finite()));
        assert!(std::path::Path::new(&dir).join("train_config.json").exists());
        assert!(std::path::Path::new(&dir).join("metrics.csv").exists());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
