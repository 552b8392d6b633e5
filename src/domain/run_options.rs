// ============================================================
// Layer 3 — Run Options
// ============================================================
// Plain enums for the choices a training run can make.
// They live in the domain layer so the application config can
// be serialised without pulling in Burn or clap types.
//
// Each enum implements FromStr so clap can parse them straight
// from the command line, and Display so they print the same way.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

// ─── CellKind ─────────────────────────────────────────────────────────────────
/// Recurrent cell used inside every dilated layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    #[default]
    Gru,
    Lstm,
    /// Elman cell with a tanh non-linearity
    Rnn,
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellKind::Gru  => write!(f, "gru"),
            CellKind::Lstm => write!(f, "lstm"),
            CellKind::Rnn  => write!(f, "rnn"),
        }
    }
}

impl FromStr for CellKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gru"  => Ok(CellKind::Gru),
            "lstm" => Ok(CellKind::Lstm),
            "rnn"  => Ok(CellKind::Rnn),
            other  => Err(format!("unknown cell type '{other}' (expected gru, lstm or rnn)")),
        }
    }
}

// ─── OptimizerKind ────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizerKind {
    #[default]
    RmsProp,
    Adam,
}

impl fmt::Display for OptimizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptimizerKind::RmsProp => write!(f, "rmsprop"),
            OptimizerKind::Adam    => write!(f, "adam"),
        }
    }
}

impl FromStr for OptimizerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rmsprop" => Ok(OptimizerKind::RmsProp),
            "adam"    => Ok(OptimizerKind::Adam),
            other     => Err(format!("unknown optimizer '{other}' (expected rmsprop or adam)")),
        }
    }
}

// ─── BackendKind ──────────────────────────────────────────────────────────────
/// Compute backend the tensors live on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// GPU through WebGPU (Vulkan / Metal / DX12)
    #[default]
    Wgpu,
    /// Pure-Rust CPU backend
    NdArray,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Wgpu    => write!(f, "wgpu"),
            BackendKind::NdArray => write!(f, "ndarray"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wgpu" | "gpu"      => Ok(BackendKind::Wgpu),
            "ndarray" | "cpu"   => Ok(BackendKind::NdArray),
            other => Err(format!("unknown backend '{other}' (expected wgpu or ndarray)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_parse_agree() {
        for cell in [CellKind::Gru, CellKind::Lstm, CellKind::Rnn] {
            assert_eq!(cell.to_string().parse::<CellKind>(), Ok(cell));
        }
        for opt in [OptimizerKind::RmsProp, OptimizerKind::Adam] {
            assert_eq!(opt.to_string().parse::<OptimizerKind>(), Ok(opt));
        }
        for backend in [BackendKind::Wgpu, BackendKind::NdArray] {
            assert_eq!(backend.to_string().parse::<BackendKind>(), Ok(backend));
        }
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&OptimizerKind::RmsProp).unwrap();
        assert_eq!(json, "\"rmsprop\"");
        let back: BackendKind = serde_json::from_str("\"ndarray\"").unwrap();
        assert_eq!(back, BackendKind::NdArray);
    }

    #[test]
    fn test_cpu_alias() {
        assert_eq!("cpu".parse::<BackendKind>(), Ok(BackendKind::NdArray));
    }
}
