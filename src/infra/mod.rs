// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting persistence that doesn't belong to any one
// business layer:
//
//   checkpoint.rs — Saving and loading model weights with
//                   Burn's CompactRecorder, plus the run's
//                   TrainConfig as JSON so evaluation can
//                   rebuild the model.
//
//   metrics.rs    — Epoch-level loss / accuracy rows in a CSV
//                   file for plotting learning curves.
//
// Reference: Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;
