use burn::data::dataset::Dataset;

pub use crate::domain::copy_task::CopySample;

/// In-memory split of copy-task samples.
pub struct CopyDataset {
    samples: Vec<CopySample>,
}

impl CopyDataset {
    pub fn new(samples: Vec<CopySample>) -> Self { Self { samples } }

    pub fn sample_count(&self) -> usize { self.samples.len() }
}

impl Dataset<CopySample> for CopyDataset {
    fn get(&self, index: usize) -> Option<CopySample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
