// ============================================================
// Layer 4 — Copy Task Batcher
// ============================================================
// Implements Burn's Batcher trait to stack a Vec<CopySample>
// into two tensors the model can consume in one pass.
//
//   Input:  N samples, each with T + 2L steps
//   Output: inputs  [N, T + 2L]  float (token values)
//           targets [N, T + 2L]  int   (class indices)
//
// Every sample in a split has the same length, so no padding
// is needed here: we flatten row by row and reshape.
//
// Reference: Burn Book §4 (Batcher)

use std::marker::PhantomData;

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::CopySample;

// ─── CopyBatch ────────────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct CopyBatch<B: Backend> {
    /// Per-step scalar inputs — shape: [batch_size, n_steps]
    pub inputs: Tensor<B, 2>,

    /// Per-step class targets — shape: [batch_size, n_steps]
    pub targets: Tensor<B, 2, Int>,
}

// ─── CopyBatcher ──────────────────────────────────────────────────────────────
/// Stateless batcher, typed on the backend it produces tensors for
/// so the DataLoader can infer it.
#[derive(Clone, Debug)]
pub struct CopyBatcher<B: Backend> {
    _backend: PhantomData<B>,
}

impl<B: Backend> CopyBatcher<B> {
    pub fn new() -> Self {
        Self { _backend: PhantomData }
    }
}

impl<B: Backend> Default for CopyBatcher<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> Batcher<B, CopySample, CopyBatch<B>> for CopyBatcher<B> {
    fn batch(&self, items: Vec<CopySample>, device: &B::Device) -> CopyBatch<B> {
        let batch_size = items.len();
        let n_steps    = items.first().map(CopySample::n_steps).unwrap_or(0);

        // ── Flatten row-major: [s1_t1, s1_t2, ..., sN_tT] ─────────────────────
        let input_flat: Vec<f32> = items
            .iter()
            .flat_map(|s| s.input.iter().copied())
            .collect();

        let target_flat: Vec<i32> = items
            .iter()
            .flat_map(|s| s.target.iter().map(|&y| y as i32))
            .collect();

        let inputs = Tensor::<B, 1>::from_floats(input_flat.as_slice(), device)
            .reshape([batch_size, n_steps]);

        let targets = Tensor::<B, 1, Int>::from_ints(target_flat.as_slice(), device)
            .reshape([batch_size, n_steps]);

        CopyBatch { inputs, targets }
    }
}
