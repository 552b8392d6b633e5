// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records training metrics to a CSV file after each epoch.
//
// Metrics recorded per epoch:
//   - epoch:         the epoch number (1, 2, 3, ...)
//   - train_loss:    mean cross-entropy over training batches
//   - train_acc:     per-position accuracy on the training set
//   - test_loss:     mean cross-entropy on the test set
//   - test_acc:      per-position accuracy on the test set
//   - test_copy_acc: accuracy over the last L steps only
//
// Output file: checkpoints/metrics.csv
//
//   epoch,train_loss,train_acc,test_loss,test_acc,test_copy_acc
//   1,0.152301,0.980000,0.140022,0.980392,0.112000
//   ...
//
// How to read the metrics:
//   - test_acc starts near (T+L)/(T+2L) because blanks are easy
//   - test_copy_acc near 1/8 means the model is guessing digits
//   - test_copy_acc rising towards 1.0 means it is remembering
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};
use serde::{Deserialize, Serialize};

const CSV_HEADER: &str = "epoch,train_loss,train_acc,test_loss,test_acc,test_copy_acc";

/// One row of metrics data for a single training epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub epoch:         usize,
    pub train_loss:    f64,
    pub train_acc:     f64,
    pub test_loss:     f64,
    pub test_acc:      f64,
    pub test_copy_acc: f64,
}

impl EpochMetrics {
    /// Returns true if this epoch improved over the previous best test loss
    pub fn is_improvement(&self, best_test_loss: f64) -> bool {
        self.test_loss < best_test_loss
    }

    fn csv_row(&self) -> String {
        format!(
            "{},{:.6},{:.6},{:.6},{:.6},{:.6}",
            self.epoch,
            self.train_loss,
            self.train_acc,
            self.test_loss,
            self.test_acc,
            self.test_copy_acc,
        )
    }
}

/// Logs epoch metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Writes the CSV header if the file doesn't exist yet,
    /// so repeated runs append to the same log.
    pub fn new(dir: impl Into<String>) -> Result<Self> {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir)?;

        let csv_path = dir.join("metrics.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)
                .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
            writeln!(f, "{CSV_HEADER}")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row in the CSV.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        writeln!(f, "{}", m.csv_row())?;

        tracing::debug!(
            "Logged epoch {} metrics: train_loss={:.4}, test_loss={:.4}",
            m.epoch,
            m.train_loss,
            m.test_loss,
        );
        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(epoch: usize, test_loss: f64) -> EpochMetrics {
        EpochMetrics {
            epoch,
            train_loss:    0.5,
            train_acc:     0.9,
            test_loss,
            test_acc:      0.95,
            test_copy_acc: 0.25,
        }
    }

    #[test]
    fn test_is_improvement() {
        let m = metrics(2, 2.3);
        assert!(m.is_improvement(3.0));
        assert!(!m.is_improvement(2.0));
    }

    #[test]
    fn test_header_written_once_rows_appended() {
        let dir = std::env::temp_dir()
            .join(format!("drnn-copy-metrics-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        let dir = dir.to_string_lossy().into_owned();

        let logger = MetricsLogger::new(&dir).unwrap();
        logger.log(&metrics(1, 0.25)).unwrap();

        // Reopening must not write a second header
        let logger = MetricsLogger::new(&dir).unwrap();
        logger.log(&metrics(2, 0.125)).unwrap();

        let content = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines[2], "2,0.500000,0.900000,0.125000,0.950000,0.250000");
        let _ = fs::remove_dir_all(&dir);
    }
}
