// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer asks for samples through this trait
// instead of naming the random generator directly, so a fixed
// fixture or a file-backed source can stand in for it.

use crate::domain::copy_task::CopySample;

// ─── SampleSource ─────────────────────────────────────────────────────────────
/// Any component that can produce copy-task samples.
///
/// Implementations:
///   - CopyTaskGenerator → seeded random prefixes
pub trait SampleSource {
    /// Produce the next single sample.
    fn sample(&mut self) -> CopySample;

    /// Produce `n` samples in order.
    fn generate(&mut self, n: usize) -> Vec<CopySample> {
        (0..n).map(|_| self.sample()).collect()
    }
}
