// ============================================================
// Layer 5 — Dilated RNN
// ============================================================
// A stack of recurrent layers where layer i only connects
// time steps that are 2^i apart (Chang et al., 2017).
//
// How a dilated layer with rate r runs an ordinary RNN cell:
//
//   1. Zero-pad time so T is a multiple of r
//   2. Fold time into r interleaved sub-sequences
//        j = 0: steps 0, r, 2r, ...
//        j = 1: steps 1, r+1, 2r+1, ...
//      and stack them on the batch axis
//        [B, T, D] → [B, T/r, r, D] → [B, r, T/r, D] → [B·r, T/r, D]
//   3. Run the cell over the short sequences
//   4. Undo the fold and drop the padding
//
// The cell itself never sees the dilation: each sub-sequence
// is an independent batch row, so step t can only reach steps
// t - r, t - 2r, ... through the recurrence.
//
// Reference: Chang et al. (2017) Dilated Recurrent Neural Networks
//            Burn Book §3 (Building Blocks)

use burn::{
    nn::{Dropout, DropoutConfig},
    prelude::*,
};

use crate::domain::run_options::CellKind;
use crate::ml::cell::RecurrentCell;

#[derive(Config, Debug)]
pub struct DilatedRnnConfig {
    pub d_input:    usize,
    pub d_hidden:   usize,
    pub num_layers: usize,
    pub cell:       CellKind,
    #[config(default = 0.0)]
    pub dropout:    f64,
}

impl DilatedRnnConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> DilatedRnn<B> {
        let layers = (0..self.num_layers)
            .map(|i| {
                let d_in = if i == 0 { self.d_input } else { self.d_hidden };
                DilatedLayer {
                    cell: RecurrentCell::new(self.cell, d_in, self.d_hidden, device),
                    rate: 1 << i,
                }
            })
            .collect();
        let dropout = DropoutConfig::new(self.dropout).init();
        DilatedRnn { layers, dropout }
    }
}

// ─── DilatedLayer ─────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct DilatedLayer<B: Backend> {
    pub cell: RecurrentCell<B>,
    pub rate: usize,
}

impl<B: Backend> DilatedLayer<B> {
    /// x: [batch, steps, d_in] → [batch, steps, d_hidden]
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        let [batch, steps, d_in] = x.dims();
        // Past the sequence length every sub-sequence is a single step
        let rate       = self.rate.min(steps.max(1));
        let folded_len = steps.div_ceil(rate);
        let padded_len = folded_len * rate;

        let x = if padded_len > steps {
            let pad = Tensor::zeros([batch, padded_len - steps, d_in], &x.device());
            Tensor::cat(vec![x, pad], 1)
        } else {
            x
        };

        let folded = x
            .reshape([batch, folded_len, rate, d_in])
            .swap_dims(1, 2)
            .reshape([batch * rate, folded_len, d_in]);

        let out = self.cell.forward(folded);
        let d_hidden = out.dims()[2];

        out.reshape([batch, rate, folded_len, d_hidden])
            .swap_dims(1, 2)
            .reshape([batch, padded_len, d_hidden])
            .slice([0..batch, 0..steps, 0..d_hidden])
    }
}

// ─── DilatedRnn ───────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct DilatedRnn<B: Backend> {
    pub layers:  Vec<DilatedLayer<B>>,
    pub dropout: Dropout,
}

impl<B: Backend> DilatedRnn<B> {
    /// x: [batch, steps, d_input] → top layer output [batch, steps, d_hidden]
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        let mut x = x;
        for (i, layer) in self.layers.iter().enumerate() {
            if i > 0 {
                x = self.dropout.forward(x);
            }
            x = layer.forward(x);
        }
        x
    }

    pub fn dilations(&self) -> Vec<usize> {
        self.layers.iter().map(|l| l.rate).collect()
    }
}
