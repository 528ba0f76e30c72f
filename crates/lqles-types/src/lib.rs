// ─────────────────────────────────────────────────────────────────────
// L-QLES — Types
// Copyright 2024 Rolls-Royce plc
// License: BSD 3-Clause
// ─────────────────────────────────────────────────────────────────────
pub mod axis;
pub mod boundary;
pub mod config;
pub mod error;
