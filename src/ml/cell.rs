use burn::{
    nn::{
        gru::{Gru, GruConfig},
        lstm::{Lstm, LstmConfig},
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::activation::tanh,
};

use crate::domain::run_options::CellKind;

/// Elman cell: h_t = tanh(W_x x_t + b + W_h h_{t-1})
#[derive(Module, Debug)]
pub struct VanillaRnn<B: Backend> {
    pub input_proj:  Linear<B>,
    pub hidden_proj: Linear<B>,
    pub d_hidden:    usize,
}

impl<B: Backend> VanillaRnn<B> {
    pub fn new(d_input: usize, d_hidden: usize, device: &B::Device) -> Self {
        let input_proj  = LinearConfig::new(d_input, d_hidden).init(device);
        let hidden_proj = LinearConfig::new(d_hidden, d_hidden)
            .with_bias(false)
            .init(device);
        Self { input_proj, hidden_proj, d_hidden }
    }

    /// x: [batch, steps, d_input] → [batch, steps, d_hidden]
    pub fn forward(&self, x: Tensor<B, 3>, state: Option<Tensor<B, 2>>) -> Tensor<B, 3> {
        let [batch, steps, _] = x.dims();
        let device = x.device();

        // Input projection does not depend on h, so do all steps at once.
        let projected = self.input_proj.forward(x);

        let mut h = state.unwrap_or_else(|| Tensor::zeros([batch, self.d_hidden], &device));
        let mut outputs = Vec::with_capacity(steps);
        for t in 0..steps {
            let x_t = projected
                .clone()
                .slice([0..batch, t..t + 1, 0..self.d_hidden])
                .reshape([batch, self.d_hidden]);
            h = tanh(x_t + self.hidden_proj.forward(h));
            outputs.push(h.clone().unsqueeze_dim::<3>(1));
        }
        Tensor::cat(outputs, 1)
    }
}

/// One recurrent cell of the configured kind. Exactly one field is set.
#[derive(Module, Debug)]
pub struct RecurrentCell<B: Backend> {
    pub gru:     Option<Gru<B>>,
    pub lstm:    Option<Lstm<B>>,
    pub vanilla: Option<VanillaRnn<B>>,
}

impl<B: Backend> RecurrentCell<B> {
    pub fn new(kind: CellKind, d_input: usize, d_hidden: usize, device: &B::Device) -> Self {
        let mut cell = Self { gru: None, lstm: None, vanilla: None };
        match kind {
            CellKind::Gru  => cell.gru  = Some(GruConfig::new(d_input, d_hidden, true).init(device)),
            CellKind::Lstm => cell.lstm = Some(LstmConfig::new(d_input, d_hidden, true).init(device)),
            CellKind::Rnn  => cell.vanilla = Some(VanillaRnn::new(d_input, d_hidden, device)),
        }
        cell
    }

    /// Run from a zero state. x: [batch, steps, d_input] → [batch, steps, d_hidden]
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        match (&self.gru, &self.lstm, &self.vanilla) {
            (Some(gru), _, _)  => gru.forward(x, None),
            (_, Some(lstm), _) => lstm.forward(x, None).0,
            (_, _, Some(rnn))  => rnn.forward(x, None),
            (None, None, None) => unreachable!("RecurrentCell::new always sets one cell"),
        }
    }
}
