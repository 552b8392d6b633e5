// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Full train + test loop using Burn's DataLoader with RMSprop
// (or Adam) and gradient-norm clipping.
//
// Key Burn insight:
//   - Training uses Autodiff<Backend> for gradients
//   - model.valid() returns the model on the inner backend
//   - Test batcher must also use the inner backend
//   - Clipping is configured on the optimizer, so it acts on the
//     gradients of the backward pass right before the update
//
// Reference: Burn Book §5, Tieleman & Hinton (2012) RMSprop

use std::time::Instant;

use anyhow::Result;
use burn::{
    backend::{
        ndarray::NdArrayDevice,
        wgpu::WgpuDevice,
        Autodiff, NdArray, Wgpu,
    },
    data::dataloader::DataLoaderBuilder,
    grad_clipping::GradientClippingConfig,
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer, RmsPropConfig},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::CopyBatcher, dataset::CopyDataset};
use crate::domain::run_options::{BackendKind, OptimizerKind};
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{EpochMetrics, MetricsLogger},
};
use crate::ml::{
    evaluator::{evaluate_batches, BatchStats},
    model::{DrnnCopyConfig, DrnnCopyModel},
};

/// What a finished run reports back to the caller.
#[derive(Debug, Clone)]
pub struct TrainSummary {
    pub epochs:         Vec<EpochMetrics>,
    pub best_epoch:     Option<usize>,
    pub best_test_loss: f64,
}

/// Pick the backend from the config and train on it.
pub fn run_training(
    cfg:          &TrainConfig,
    train:        CopyDataset,
    test:         CopyDataset,
    ckpt_manager: &CheckpointManager,
    metrics:      &MetricsLogger,
) -> Result<TrainSummary> {
    match cfg.backend {
        BackendKind::Wgpu => {
            let device = WgpuDevice::default();
            tracing::info!("Using WGPU device: {:?}", device);
            train_on::<Autodiff<Wgpu>>(cfg, train, test, ckpt_manager, metrics, device)
        }
        BackendKind::NdArray => {
            let device = NdArrayDevice::default();
            tracing::info!("Using NdArray device: {:?}", device);
            train_on::<Autodiff<NdArray>>(cfg, train, test, ckpt_manager, metrics, device)
        }
    }
}

/// Build the model and optimizer on `B`, then run the epoch loop.
pub fn train_on<B: AutodiffBackend>(
    cfg:          &TrainConfig,
    train:        CopyDataset,
    test:         CopyDataset,
    ckpt_manager: &CheckpointManager,
    metrics:      &MetricsLogger,
    device:       B::Device,
) -> Result<TrainSummary> {
    B::seed(cfg.seed);

    // ── Build model ───────────────────────────────────────────────────────────
    let model: DrnnCopyModel<B> = DrnnCopyConfig::from(cfg).init(&device);
    tracing::info!(
        "Model ready: {} {} levels, hidden={}, dilations={:?}",
        cfg.levels, cfg.cell, cfg.hidden, model.drnn.dilations()
    );

    // ── Optimiser ─────────────────────────────────────────────────────────────
    // RMSprop: v = α*v + (1-α)*g²,  θ = θ - lr * g / (√v + ε)
    let clipping = grad_clipping(cfg.clip);
    if cfg.clipping_enabled() {
        tracing::info!("Optimizer: {} with gradient norm clipped at {}", cfg.optimizer, cfg.clip);
    } else {
        tracing::info!("Optimizer: {} without gradient clipping", cfg.optimizer);
    }
    match cfg.optimizer {
        OptimizerKind::RmsProp => {
            let optim = RmsPropConfig::new()
                .with_alpha(0.99)
                .with_epsilon(1e-8)
                .with_grad_clipping(clipping)
                .init::<B, DrnnCopyModel<B>>();
            train_loop(cfg, model, optim, train, test, ckpt_manager, metrics)
        }
        OptimizerKind::Adam => {
            let optim = AdamConfig::new()
                .with_epsilon(1e-8)
                .with_grad_clipping(clipping)
                .init::<B, DrnnCopyModel<B>>();
            train_loop(cfg, model, optim, train, test, ckpt_manager, metrics)
        }
    }
}

/// L2-norm clipping at `clip`; `None` when clipping is disabled.
pub fn grad_clipping(clip: f64) -> Option<GradientClippingConfig> {
    (clip > 0.0).then(|| GradientClippingConfig::Norm(clip as f32))
}

// ─── Progress window ──────────────────────────────────────────────────────────
/// Loss and accuracy over the batches since the last progress line.
#[derive(Debug)]
struct ProgressWindow {
    loss_sum: f64,
    batches:  usize,
    stats:    BatchStats,
    started:  Instant,
}

impl ProgressWindow {
    fn new() -> Self {
        Self { loss_sum: 0.0, batches: 0, stats: BatchStats::default(), started: Instant::now() }
    }

    fn record(&mut self, loss: f64, stats: BatchStats) {
        self.loss_sum += loss;
        self.batches  += 1;
        self.stats.merge(stats);
    }

    fn average_loss(&self) -> f64 {
        if self.batches > 0 { self.loss_sum / self.batches as f64 } else { f64::NAN }
    }

    fn ms_per_batch(&self) -> f64 {
        if self.batches == 0 {
            return 0.0;
        }
        self.started.elapsed().as_secs_f64() * 1000.0 / self.batches as f64
    }
}

fn train_loop<B, O>(
    cfg:          &TrainConfig,
    mut model:    DrnnCopyModel<B>,
    mut optim:    O,
    train:        CopyDataset,
    test:         CopyDataset,
    ckpt_manager: &CheckpointManager,
    metrics:      &MetricsLogger,
) -> Result<TrainSummary>
where
    B: AutodiffBackend,
    O: Optimizer<DrnnCopyModel<B>, B>,
{
    let copy_window   = cfg.task().copy_window();
    let total_batches = cfg.n_train.div_ceil(cfg.batch_size);

    // ── Training data loader (AutodiffBackend) ────────────────────────────────
    let train_loader = DataLoaderBuilder::new(CopyBatcher::<B>::new())
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(1)
        .build(train);

    // ── Test data loader (InnerBackend — no autodiff overhead) ────────────────
    let test_loader = DataLoaderBuilder::new(CopyBatcher::<B::InnerBackend>::new())
        .batch_size(cfg.batch_size)
        .num_workers(1)
        .build(test);

    let mut history        = Vec::with_capacity(cfg.epochs);
    let mut best_epoch     = None;
    let mut best_test_loss = f64::INFINITY;

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=cfg.epochs {
        let mut epoch_loss_sum = 0.0f64;
        let mut epoch_batches  = 0usize;
        let mut epoch_stats    = BatchStats::default();
        let mut window         = ProgressWindow::new();

        for (i, batch) in train_loader.iter().enumerate() {
            let (loss, logits) = model.forward_loss(batch.inputs, batch.targets.clone());

            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
            let stats = BatchStats::from_logits(logits.detach(), batch.targets, copy_window.clone());

            epoch_loss_sum += loss_val;
            epoch_batches  += 1;
            epoch_stats.merge(stats);
            window.record(loss_val, stats);

            // Backward pass, clip, update
            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);

            let batch_idx = i + 1;
            if batch_idx % cfg.log_interval == 0 {
                tracing::info!(
                    "| Epoch {:3} | {:5}/{:5} batches | lr {:2.5} | ms/batch {:5.2} | loss {:5.8} | accuracy {:5.4}",
                    epoch,
                    batch_idx,
                    total_batches,
                    cfg.lr,
                    window.ms_per_batch(),
                    window.average_loss(),
                    window.stats.accuracy(),
                );
                window = ProgressWindow::new();
            }
        }

        let train_loss = if epoch_batches > 0 {
            epoch_loss_sum / epoch_batches as f64
        } else { f64::NAN };

        // ── Test phase ────────────────────────────────────────────────────────
        // model.valid() → DrnnCopyModel<B::InnerBackend>, dropout disabled
        let report = evaluate_batches(&model.valid(), test_loader.iter(), copy_window.clone());

        println!(
            "Test set (epoch {:>3}/{}): Average loss: {:.6}, Accuracy: {:.4}, Copy accuracy: {:.4}",
            epoch, cfg.epochs, report.loss, report.accuracy, report.copy_accuracy,
        );

        let row = EpochMetrics {
            epoch,
            train_loss,
            train_acc:     epoch_stats.accuracy(),
            test_loss:     report.loss,
            test_acc:      report.accuracy,
            test_copy_acc: report.copy_accuracy,
        };
        metrics.log(&row)?;

        ckpt_manager.save_model(&model, epoch)?;
        if row.is_improvement(best_test_loss) {
            best_test_loss = row.test_loss;
            best_epoch     = Some(epoch);
            ckpt_manager.mark_best(epoch)?;
            tracing::info!("New best test loss {:.6} at epoch {}", best_test_loss, epoch);
        }

        history.push(row);
    }

    tracing::info!("Training complete!");
    Ok(TrainSummary { epochs: history, best_epoch, best_test_loss })
}
