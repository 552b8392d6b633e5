// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// This layer contains the Burn modules and the loops that
// drive them. The data layer only touches Burn through its
// Dataset and Batcher traits.
//
// What's in this layer:
//
//   cell.rs      — The recurrent cell behind each layer:
//                  GRU, LSTM or a vanilla tanh RNN
//
//   drnn.rs      — The dilated stack. Layer i folds the
//                  sequence into 2^i interleaved sub-sequences,
//                  runs the cell over them in one batch, and
//                  unfolds the result
//
//   model.rs     — DRNN + linear head producing per-step
//                  class logits, and the cross-entropy loss
//
//   trainer.rs   — The training loop
//                  Forward pass, loss, backward pass, clipped
//                  optimiser step, per-epoch test evaluation
//                  and checkpointing
//
//   evaluator.rs — Inference-mode loss, accuracy and copy
//                  accuracy over a split
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)
//            Chang et al. (2017) Dilated Recurrent Neural Networks

/// Recurrent cell variants
pub mod cell;

/// Dilated recurrent stack
pub mod drnn;

/// DRNN classifier for the copy task
pub mod model;

/// Full training loop with test evaluation and checkpointing
pub mod trainer;

/// Loss and accuracy metrics over a dataset
pub mod evaluator;
