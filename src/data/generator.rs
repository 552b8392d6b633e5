// ============================================================
// Layer 4 — Copy Task Generator
// ============================================================
// Draws random prefixes and lays them out as copy-task samples.
//
// Every generator owns a seeded StdRng, so two generators built
// with the same seed produce identical datasets. The training
// run draws its train split first and its test split second
// from the same generator, which keeps the splits disjoint in
// sequence order while staying reproducible.
//
// Reference: rand crate documentation (SeedableRng, Rng)

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::domain::copy_task::{CopySample, CopyTask, MAX_DIGIT, MIN_DIGIT};
use crate::domain::traits::SampleSource;

pub struct CopyTaskGenerator {
    task: CopyTask,
    rng:  StdRng,
}

impl CopyTaskGenerator {
    pub fn new(task: CopyTask, seed: u64) -> Self {
        Self { task, rng: StdRng::seed_from_u64(seed) }
    }

    fn random_prefix(&mut self) -> Vec<u32> {
        (0..self.task.seq_len)
            .map(|_| self.rng.gen_range(MIN_DIGIT..=MAX_DIGIT))
            .collect()
    }
}

impl SampleSource for CopyTaskGenerator {
    fn sample(&mut self) -> CopySample {
        let prefix = self.random_prefix();
        self.task.make_sample(&prefix)
    }
}
