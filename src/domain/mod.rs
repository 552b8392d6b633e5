// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types that define what the benchmark IS:
// the shape of a copy-task sequence, the token alphabet,
// and the choices a training run can make.
//
// Rules for this layer:
//   - NO Burn framework types
//   - NO file I/O
//   - Only structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// Copy task shape, token constants and sequence layout
pub mod copy_task;

// Cell / optimizer / backend selections
pub mod run_options;

// Abstractions other layers implement
pub mod traits;
