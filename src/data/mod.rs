// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from random prefixes to tensor batches:
//
//   CopyTaskGenerator  → seeded random copy-task samples
//       │
//       ▼
//   CopyDataset        → implements Burn's Dataset trait
//       │
//       ▼
//   CopyBatcher        → stacks samples into [batch, steps] tensors
//       │
//       ▼
//   DataLoader         → feeds batches to the training loop
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Seeded copy-task sample generation
pub mod generator;

/// Implements Burn's Dataset trait for copy-task samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
