// ============================================================
// Layer 5 — Evaluator
// ============================================================
// Inference-mode pass over a split, reporting:
//   - loss:          mean cross-entropy over every position
//   - accuracy:      fraction of positions predicted exactly
//   - copy_accuracy: the same, restricted to the last L steps
//
// Plain accuracy is dominated by the blank positions: a model
// that always predicts BLANK already scores T+L out of T+2L.
// copy_accuracy isolates the part of the task that needs memory.
//
// Loss is weighted by positions per batch so the last, smaller
// batch does not skew the mean.

use std::ops::Range;

use burn::{data::dataloader::DataLoaderBuilder, prelude::*};

use crate::data::{batcher::{CopyBatch, CopyBatcher}, dataset::CopyDataset};
use crate::ml::model::DrnnCopyModel;

// ─── BatchStats ───────────────────────────────────────────────────────────────
/// Prediction counts for one or more batches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub correct:      usize,
    pub total:        usize,
    pub copy_correct: usize,
    pub copy_total:   usize,
}

impl BatchStats {
    /// logits: [batch, steps, classes], targets: [batch, steps].
    /// `copy_window` is the step range holding the recalled digits.
    pub fn from_logits<B: Backend>(
        logits:      Tensor<B, 3>,
        targets:     Tensor<B, 2, Int>,
        copy_window: Range<usize>,
    ) -> Self {
        let [batch, steps, _] = logits.dims();
        let window = copy_window.start.min(steps)..copy_window.end.min(steps);

        // argmax keeps the reduced dim: [batch, steps, 1] → [batch, steps]
        let predicted = logits.argmax(2).reshape([batch, steps]);

        let copy_correct = if window.is_empty() {
            0
        } else {
            count_equal(
                predicted.clone().slice([0..batch, window.clone()]),
                targets.clone().slice([0..batch, window.clone()]),
            )
        };

        Self {
            correct:    count_equal(predicted, targets),
            total:      batch * steps,
            copy_correct,
            copy_total: batch * window.len(),
        }
    }

    pub fn merge(&mut self, other: BatchStats) {
        self.correct      += other.correct;
        self.total        += other.total;
        self.copy_correct += other.copy_correct;
        self.copy_total   += other.copy_total;
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.correct, self.total)
    }

    pub fn copy_accuracy(&self) -> f64 {
        ratio(self.copy_correct, self.copy_total)
    }
}

fn count_equal<B: Backend>(a: Tensor<B, 2, Int>, b: Tensor<B, 2, Int>) -> usize {
    a.equal(b).int().sum().into_scalar().elem::<i64>() as usize
}

fn ratio(num: usize, den: usize) -> f64 {
    if den > 0 { num as f64 / den as f64 } else { 0.0 }
}

// ─── EvalReport ───────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy)]
pub struct EvalReport {
    pub loss:          f64,
    pub accuracy:      f64,
    pub copy_accuracy: f64,
    pub positions:     usize,
}

/// Evaluate over an already-built stream of batches.
pub fn evaluate_batches<B: Backend>(
    model:       &DrnnCopyModel<B>,
    batches:     impl IntoIterator<Item = CopyBatch<B>>,
    copy_window: Range<usize>,
) -> EvalReport {
    let mut weighted_loss = 0.0f64;
    let mut stats         = BatchStats::default();

    for batch in batches {
        let [b, t]   = batch.targets.dims();
        let (loss, logits) = model.forward_loss(batch.inputs, batch.targets.clone());

        weighted_loss += loss.into_scalar().elem::<f64>() * (b * t) as f64;
        stats.merge(BatchStats::from_logits(logits, batch.targets, copy_window.clone()));
    }

    let loss = if stats.total > 0 { weighted_loss / stats.total as f64 } else { f64::NAN };

    EvalReport {
        loss,
        accuracy:      stats.accuracy(),
        copy_accuracy: stats.copy_accuracy(),
        positions:     stats.total,
    }
}

/// Evaluate a whole dataset. `model` should already be in inference
/// mode (the result of `valid()` on a trained model).
pub fn evaluate<B: Backend>(
    model:       &DrnnCopyModel<B>,
    dataset:     CopyDataset,
    batch_size:  usize,
    copy_window: Range<usize>,
) -> EvalReport {
    let loader = DataLoaderBuilder::new(CopyBatcher::<B>::new())
        .batch_size(batch_size)
        .num_workers(1)
        .build(dataset);

    evaluate_batches(model, loader.iter(), copy_window)
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use crate::data::generator::CopyTaskGenerator;
    use crate::domain::{
        copy_task::{CopyTask, MarkerLayout, N_CLASSES},
        run_options::CellKind,
        traits::SampleSource,
    };
    use crate::ml::model::DrnnCopyConfig;

    type TestBackend = NdArray;

    /// Logits with a single hot class per position
    fn one_hot_logits(classes: &[usize], steps: usize) -> Tensor<TestBackend, 3> {
        let batch = classes.len() / steps;
        let mut values = vec![0.0f32; classes.len() * N_CLASSES];
        for (i, &c) in classes.iter().enumerate() {
            values[i * N_CLASSES + c] = 10.0;
        }
        Tensor::<TestBackend, 1>::from_floats(values.as_slice(), &Default::default())
            .reshape([batch, steps, N_CLASSES])
    }

    #[test]
    fn test_stats_split_blank_and_copy_positions() {
        let device  = Default::default();
        // One sample, 5 steps, copy window = last 2
        let targets = Tensor::<TestBackend, 1, Int>::from_ints([0, 0, 0, 4, 7], &device)
            .reshape([1, 5]);
        // Right on blanks, right on step 3, wrong on step 4
        let logits  = one_hot_logits(&[0, 0, 0, 4, 2], 5);

        let stats = BatchStats::from_logits(logits, targets, 3..5);
        assert_eq!(stats, BatchStats { correct: 4, total: 5, copy_correct: 1, copy_total: 2 });
        assert!((stats.accuracy() - 0.8).abs() < 1e-12);
        assert!((stats.copy_accuracy() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_merge_accumulates() {
        let mut a = BatchStats { correct: 1, total: 2, copy_correct: 0, copy_total: 1 };
        a.merge(BatchStats { correct: 3, total: 4, copy_correct: 1, copy_total: 1 });
        assert_eq!(a, BatchStats { correct: 4, total: 6, copy_correct: 1, copy_total: 2 });
    }

    #[test]
    fn test_empty_stats_report_zero_accuracy() {
        let s = BatchStats::default();
        assert_eq!(s.accuracy(), 0.0);
        assert_eq!(s.copy_accuracy(), 0.0);
    }

    #[test]
    fn test_evaluate_counts_every_position() {
        let device = Default::default();
        let task   = CopyTask::new(6, 3, MarkerLayout::Single);
        let data   = CopyTaskGenerator::new(task, 5).generate(10);
        let model  = DrnnCopyConfig::new(N_CLASSES, 6, 2, CellKind::Gru)
            .init::<TestBackend>(&device);

        // batch size 4 leaves a short final batch of 2
        let report = evaluate(&model, CopyDataset::new(data), 4, task.copy_window());

        assert_eq!(report.positions, 10 * task.n_steps());
        assert!(report.loss.is_finite());
        assert!((0.0..=1.0).contains(&report.accuracy));
        assert!((0.0..=1.0).contains(&report.copy_accuracy));
    }

    #[test]
    fn test_loss_does_not_depend_on_batch_size() {
        // 10 samples in batches of 4 leave a short batch of 2; a plain
        // mean of batch losses would overweight it
        let device = Default::default();
        let task   = CopyTask::new(7, 3, MarkerLayout::Single);
        let data   = CopyTaskGenerator::new(task, 21).generate(10);
        let model  = DrnnCopyConfig::new(N_CLASSES, 6, 2, CellKind::Gru)
            .init::<TestBackend>(&device);

        let split = evaluate(&model, CopyDataset::new(data.clone()), 4, task.copy_window());
        let whole = evaluate(&model, CopyDataset::new(data), 10, task.copy_window());

        assert_eq!(split.positions, whole.positions);
        assert!((split.loss - whole.loss).abs() < 1e-5, "{} vs {}", split.loss, whole.loss);
        assert_eq!(split.accuracy, whole.accuracy);
        assert_eq!(split.copy_accuracy, whole.copy_accuracy);
    }

    #[test]
    fn test_window_past_the_end_is_clamped() {
        let device  = Default::default();
        let targets = Tensor::<TestBackend, 1, Int>::from_ints([0, 0, 5], &device)
            .reshape([1, 3]);
        let logits  = one_hot_logits(&[0, 0, 5], 3);

        let stats = BatchStats::from_logits(logits, targets, 2..8);
        assert_eq!(stats.copy_total, 1);
        assert_eq!(stats.copy_correct, 1);
    }

    #[test]
    fn test_evaluate_empty_dataset() {
        let device = Default::default();
        let model  = DrnnCopyConfig::new(N_CLASSES, 4, 1, CellKind::Rnn)
            .init::<TestBackend>(&device);
        let report = evaluate(&model, CopyDataset::new(Vec::new()), 4, 6..9);
        assert!(report.loss.is_nan());
        assert_eq!(report.positions, 0);
    }
}
