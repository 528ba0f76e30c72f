// ─────────────────────────────────────────────────────────────────────
// L-QLES — Core
// Copyright 2024 Rolls-Royce plc
// License: BSD 3-Clause
// ─────────────────────────────────────────────────────────────────────
//! Laplacian test-system generator.
//!
//! Boundary validation, operator assembly, bandwidth reordering, the
//! case pipeline and persistence of the generated systems.

pub mod assembly;
pub mod boundary;
pub mod case;
pub mod io;
pub mod reorder;

pub use assembly::{assemble, LinearSystem};
pub use case::{run_case, CaseOptions, CaseResult};
pub use reorder::{reorder, ReorderedSystem};
