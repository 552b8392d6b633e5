// ============================================================
// Layer 3 — Copy Task Domain Type
// ============================================================
// Describes one instance of the copying-memory benchmark:
//   - L random digits are shown at the start of the sequence
//   - T - 1 blank steps follow
//   - a trigger token tells the model to start recalling
//   - the model must emit the L digits in the final L steps
//
// Example with T=4, L=3, single trigger:
//   input:  3 7 1 0 0 0 9 0 0 0
//   target: 0 0 0 0 0 0 0 3 7 1
//
// Every sequence is T + 2L steps long. The target is blank
// everywhere except the copy window (the last L steps).
//
// Reference: Hochreiter & Schmidhuber (1997) LSTM, copying task
//            Chang et al. (2017) Dilated Recurrent Neural Networks

use std::{fmt, ops::Range, str::FromStr};

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Token emitted everywhere the model has nothing to recall
pub const BLANK: u32 = 0;

/// Cue that marks the end of the blank interval
pub const TRIGGER: u32 = 9;

/// Smallest digit that can appear in the recalled prefix
pub const MIN_DIGIT: u32 = 1;

/// Largest digit in the prefix. Stops below TRIGGER so the cue
/// is never confused with payload.
pub const MAX_DIGIT: u32 = 8;

/// Output classes: BLANK, the digits and TRIGGER (0..=9)
pub const N_CLASSES: usize = 10;

// ─── MarkerLayout ─────────────────────────────────────────────────────────────
/// How the trigger appears in the input sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerLayout {
    /// One trigger followed by L blanks while the model recalls
    #[default]
    Single,
    /// L + 1 consecutive triggers running to the end of the input
    Repeated,
}

impl fmt::Display for MarkerLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkerLayout::Single   => write!(f, "single"),
            MarkerLayout::Repeated => write!(f, "repeated"),
        }
    }
}

impl FromStr for MarkerLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "single"   => Ok(MarkerLayout::Single),
            "repeated" => Ok(MarkerLayout::Repeated),
            other      => Err(format!("unknown marker layout '{other}' (expected single or repeated)")),
        }
    }
}

// ─── CopyTask ─────────────────────────────────────────────────────────────────
/// Shape parameters of the copying-memory benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyTask {
    /// Length of the blank interval (T)
    pub blank_len: usize,

    /// Number of digits to memorise and replay (L)
    pub seq_len: usize,

    /// Placement of the trigger token
    pub layout: MarkerLayout,
}

impl CopyTask {
    pub fn new(blank_len: usize, seq_len: usize, layout: MarkerLayout) -> Self {
        Self { blank_len, seq_len, layout }
    }

    /// Rejects degenerate shapes that leave no room for the trigger
    /// or nothing to recall.
    pub fn validate(&self) -> Result<()> {
        if self.blank_len == 0 {
            bail!("blank_len must be at least 1 (the trigger occupies the last blank slot)");
        }
        if self.seq_len == 0 {
            bail!("seq_len must be at least 1");
        }
        Ok(())
    }

    /// Total sequence length, T + 2L
    pub fn n_steps(&self) -> usize {
        self.blank_len + 2 * self.seq_len
    }

    /// Position of the (first) trigger token in the input
    pub fn trigger_position(&self) -> usize {
        self.seq_len + self.blank_len - 1
    }

    /// Steps whose target holds the recalled digits
    pub fn copy_window(&self) -> Range<usize> {
        let n = self.n_steps();
        n - self.seq_len..n
    }

    /// Lay out one input/target pair around the given prefix digits.
    pub fn encode(&self, prefix: &[u32]) -> (Vec<u32>, Vec<u32>) {
        debug_assert_eq!(prefix.len(), self.seq_len);
        let n = self.n_steps();

        let mut input = Vec::with_capacity(n);
        input.extend_from_slice(prefix);
        input.resize(self.trigger_position(), BLANK);
        match self.layout {
            MarkerLayout::Single => {
                input.push(TRIGGER);
                input.resize(n, BLANK);
            }
            MarkerLayout::Repeated => input.resize(n, TRIGGER),
        }

        let mut target = vec![BLANK; n - self.seq_len];
        target.extend_from_slice(prefix);

        (input, target)
    }

    /// Build a full sample from the prefix digits.
    pub fn make_sample(&self, prefix: &[u32]) -> CopySample {
        let (input, target) = self.encode(prefix);
        CopySample {
            input:   input.into_iter().map(|t| t as f32).collect(),
            target,
            seq_len: self.seq_len,
        }
    }
}

// ─── CopySample ───────────────────────────────────────────────────────────────
/// One input/target pair. The model reads `input` one scalar per
/// step and predicts one class per step; `target` holds those classes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CopySample {
    /// Token values as floats, length T + 2L
    pub input: Vec<f32>,

    /// Class index per step, length T + 2L
    pub target: Vec<u32>,

    /// Number of recalled digits (L)
    pub seq_len: usize,
}

impl CopySample {
    pub fn n_steps(&self) -> usize {
        self.target.len()
    }

    /// The digits the model has to replay
    pub fn prefix(&self) -> &[u32] {
        &self.target[self.target.len() - self.seq_len..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_n_steps() {
        let task = CopyTask::new(1000, 10, MarkerLayout::Single);
        assert_eq!(task.n_steps(), 1020);
        assert_eq!(task.copy_window(), 1010..1020);
    }

    #[test]
    fn test_single_layout_matches_example() {
        let task = CopyTask::new(4, 3, MarkerLayout::Single);
        let (input, target) = task.encode(&[3, 7, 1]);
        assert_eq!(input,  vec![3, 7, 1, 0, 0, 0, 9, 0, 0, 0]);
        assert_eq!(target, vec![0, 0, 0, 0, 0, 0, 0, 3, 7, 1]);
    }

    #[test]
    fn test_repeated_layout_fills_tail_with_triggers() {
        let task = CopyTask::new(4, 3, MarkerLayout::Repeated);
        let (input, target) = task.encode(&[3, 7, 1]);
        assert_eq!(input,  vec![3, 7, 1, 0, 0, 0, 9, 9, 9, 9]);
        assert_eq!(target, vec![0, 0, 0, 0, 0, 0, 0, 3, 7, 1]);
    }

    #[test]
    fn test_minimal_blank_puts_trigger_right_after_prefix() {
        let task = CopyTask::new(1, 2, MarkerLayout::Single);
        let (input, _) = task.encode(&[5, 6]);
        assert_eq!(input, vec![5, 6, 9, 0, 0]);
    }

    #[test]
    fn test_sample_prefix_is_target_tail() {
        let task   = CopyTask::new(5, 4, MarkerLayout::Single);
        let sample = task.make_sample(&[8, 1, 2, 3]);
        assert_eq!(sample.n_steps(), 13);
        assert_eq!(sample.prefix(), &[8, 1, 2, 3]);
        assert_eq!(&sample.input[..4], &[8.0, 1.0, 2.0, 3.0]);
        assert_eq!(sample.input[task.trigger_position()], TRIGGER as f32);
    }

    #[test]
    fn test_validate_rejects_zero_sizes() {
        assert!(CopyTask::new(0, 10, MarkerLayout::Single).validate().is_err());
        assert!(CopyTask::new(10, 0, MarkerLayout::Single).validate().is_err());
        assert!(CopyTask::new(1, 1, MarkerLayout::Single).validate().is_ok());
    }

    #[test]
    fn test_layout_parses_case_insensitively() {
        assert_eq!("Repeated".parse::<MarkerLayout>(), Ok(MarkerLayout::Repeated));
        assert!("double".parse::<MarkerLayout>().is_err());
    }
}
