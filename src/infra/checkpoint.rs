// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores model weights using Burn's CompactRecorder.
//
// File layout:
//   checkpoints/
//     model_epoch_1.mpk.gz   ← weights after epoch 1
//     model_epoch_2.mpk.gz   ← weights after epoch 2
//     ...
//     latest_epoch.json      ← number of the last saved epoch
//     best_epoch.json        ← epoch with the lowest test loss
//     train_config.json      ← hyperparameters of the run
//
// The config is needed to rebuild the exact architecture
// (hidden size, levels, cell type) before the weights can be
// loaded into it.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::DrnnCopyModel;

const LATEST_EPOCH_FILE: &str = "latest_epoch.json";
const BEST_EPOCH_FILE:   &str = "best_epoch.json";
const CONFIG_FILE:       &str = "train_config.json";

/// Manages saving and loading of model checkpoints.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create the manager, creating the directory if needed.
    pub fn new(dir: impl Into<String>) -> Result<Self> {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create checkpoint dir '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    /// Open an existing checkpoint directory without creating it.
    pub fn open(dir: impl Into<String>) -> Result<Self> {
        let dir = PathBuf::from(dir.into());
        if !dir.is_dir() {
            anyhow::bail!(
                "Checkpoint dir '{}' does not exist. Have you run 'train' first?",
                dir.display()
            );
        }
        Ok(Self { dir })
    }

    fn model_path(&self, epoch: usize) -> PathBuf {
        // Recorder adds the extension
        self.dir.join(format!("model_epoch_{epoch}"))
    }

    /// Save model weights for `epoch` and move the latest pointer to it.
    pub fn save_model<B: Backend>(&self, model: &DrnnCopyModel<B>, epoch: usize) -> Result<()> {
        let path = self.model_path(epoch);

        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;

        self.write_epoch(LATEST_EPOCH_FILE, epoch)?;
        tracing::debug!("Saved checkpoint: epoch {}", epoch);
        Ok(())
    }

    /// Record `epoch` as the best one seen so far.
    pub fn mark_best(&self, epoch: usize) -> Result<()> {
        self.write_epoch(BEST_EPOCH_FILE, epoch)
    }

    /// Load weights into `model`. `None` loads the latest epoch.
    ///
    /// The model must have the architecture the checkpoint was
    /// saved with, or loading fails.
    pub fn load_model<B: Backend>(
        &self,
        model:  DrnnCopyModel<B>,
        device: &B::Device,
        epoch:  Option<usize>,
    ) -> Result<(DrnnCopyModel<B>, usize)> {
        let epoch = match epoch {
            Some(e) => e,
            None    => self.latest_epoch()?,
        };
        let path = self.model_path(epoch);
        tracing::info!("Loading checkpoint from epoch {}", epoch);

        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!("Cannot load checkpoint '{}'. Have you trained the model first?",
                    path.display())
            })?;

        Ok((model.load_record(record), epoch))
    }

    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join(CONFIG_FILE);
        let json = fs::read_to_string(&path)
            .with_context(|| {
                format!(
                    "Cannot read config from '{}'. \
                     Make sure you have run 'train' before 'evaluate'.",
                    path.display()
                )
            })?;
        serde_json::from_str(&json)
            .with_context(|| format!("Malformed config in '{}'", path.display()))
    }

    pub fn latest_epoch(&self) -> Result<usize> {
        self.read_epoch(LATEST_EPOCH_FILE)
    }

    pub fn best_epoch(&self) -> Result<usize> {
        self.read_epoch(BEST_EPOCH_FILE)
    }

    fn write_epoch(&self, file: &str, epoch: usize) -> Result<()> {
        fs::write(self.dir.join(file), serde_json::to_string(&epoch)?)
            .with_context(|| format!("Failed to write {file}"))
    }

    fn read_epoch(&self, file: &str) -> Result<usize> {
        let s = fs::read_to_string(self.dir.join(file))
            .with_context(|| format!("Cannot find '{file}'. Have you run 'train' first?"))?;
        Ok(serde_json::from_str::<usize>(&s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use crate::domain::{copy_task::N_CLASSES, run_options::CellKind};
    use crate::ml::model::DrnnCopyConfig;

    type TestBackend = NdArray;

    fn scratch_dir(name: &str) -> String {
        let dir = std::env::temp_dir()
            .join(format!("drnn-copy-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir.to_string_lossy().into_owned()
    }

    #[test]
    fn test_config_round_trip() {
        let dir  = scratch_dir("ckpt-config");
        let ckpt = CheckpointManager::new(&dir).unwrap();
        let cfg  = TrainConfig { hidden: 17, cell: CellKind::Rnn, ..TrainConfig::default() };

        ckpt.save_config(&cfg).unwrap();
        assert_eq!(ckpt.load_config().unwrap(), cfg);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_weights_survive_save_and_load() {
        let dir    = scratch_dir("ckpt-weights");
        let ckpt   = CheckpointManager::new(&dir).unwrap();
        let device = Default::default();
        let config = DrnnCopyConfig::new(N_CLASSES, 5, 2, CellKind::Gru);

        let trained: DrnnCopyModel<TestBackend> = config.init(&device);
        ckpt.save_model(&trained, 1).unwrap();
        ckpt.save_model(&trained, 2).unwrap();
        ckpt.mark_best(1).unwrap();

        assert_eq!(ckpt.latest_epoch().unwrap(), 2);
        assert_eq!(ckpt.best_epoch().unwrap(), 1);

        // A fresh init has different weights until the record is loaded
        let fresh: DrnnCopyModel<TestBackend> = config.init(&device);
        let (loaded, epoch) = ckpt.load_model(fresh, &device, None).unwrap();
        assert_eq!(epoch, 2);

        let x = Tensor::<TestBackend, 2>::ones([1, 6], &device);
        let expected: Vec<f32> = trained.forward(x.clone()).into_data().to_vec().unwrap();
        let actual:   Vec<f32> = loaded.forward(x).into_data().to_vec().unwrap();
        // CompactRecorder stores half precision
        for (e, a) in expected.iter().zip(&actual) {
            assert!((e - a).abs() < 1e-3);
        }
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_open_missing_dir_fails() {
        let dir = scratch_dir("ckpt-missing");
        assert!(CheckpointManager::open(&dir).is_err());
    }

    #[test]
    fn test_missing_epoch_file_is_an_error() {
        let dir  = scratch_dir("ckpt-empty");
        let ckpt = CheckpointManager::new(&dir).unwrap();
        assert!(ckpt.latest_epoch().is_err());
        let _ = fs::remove_dir_all(&dir);
    }
}
