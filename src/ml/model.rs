use burn::{
    nn::{loss::CrossEntropyLossConfig, Initializer, Linear, LinearConfig},
    prelude::*,
};

use crate::application::train_use_case::TrainConfig;
use crate::domain::{copy_task::N_CLASSES, run_options::CellKind};
use crate::ml::drnn::{DilatedRnn, DilatedRnnConfig};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct DrnnCopyConfig {
    pub n_classes: usize,
    pub hidden:    usize,
    pub levels:    usize,
    pub cell:      CellKind,
    #[config(default = 0.0)]
    pub dropout:   f64,
}

impl DrnnCopyConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> DrnnCopyModel<B> {
        // Each step reads a single scalar token value.
        let drnn = DilatedRnnConfig::new(1, self.hidden, self.levels, self.cell)
            .with_dropout(self.dropout)
            .init(device);
        let head = LinearConfig::new(self.hidden, self.n_classes)
            .with_initializer(Initializer::Normal { mean: 0.0, std: 0.01 })
            .init(device);
        DrnnCopyModel { drnn, head }
    }
}

impl From<&TrainConfig> for DrnnCopyConfig {
    fn from(cfg: &TrainConfig) -> Self {
        DrnnCopyConfig::new(N_CLASSES, cfg.hidden, cfg.levels, cfg.cell)
            .with_dropout(cfg.dropout)
    }
}

#[derive(Module, Debug)]
pub struct DrnnCopyModel<B: Backend> {
    pub drnn: DilatedRnn<B>,
    pub head: Linear<B>,
}

impl<B: Backend> DrnnCopyModel<B> {
    /// inputs: [batch, steps] → logits: [batch, steps, n_classes]
    pub fn forward(&self, inputs: Tensor<B, 2>) -> Tensor<B, 3> {
        let x = inputs.unsqueeze_dim::<3>(2);
        self.head.forward(self.drnn.forward(x))
    }

    /// Mean cross-entropy over every (sample, step) position.
    pub fn forward_loss(
        &self,
        inputs:  Tensor<B, 2>,
        targets: Tensor<B, 2, Int>,
    ) -> (Tensor<B, 1>, Tensor<B, 3>) {
        let logits = self.forward(inputs);
        let [batch, steps, classes] = logits.dims();

        let ce = CrossEntropyLossConfig::new().init(&logits.device());
        let loss = ce.forward(
            logits.clone().reshape([batch * steps, classes]),
            targets.reshape([batch * steps]),
        );
        (loss, logits)
    }
}
