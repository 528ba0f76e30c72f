// ─────────────────────────────────────────────────────────────────────
// L-QLES — Grid
// Copyright 2024 Rolls-Royce plc
// License: BSD 3-Clause
// ─────────────────────────────────────────────────────────────────────
//! Structured 1D/2D/3D node index space.
//!
//! Nodes are flattened row-major with the first axis varying fastest:
//! `m = i + nx·j + nx·ny·k`. Unused axes have extent 1, so every index is
//! carried as a `[usize; 3]` triple regardless of dimensionality.

use lqles_types::error::{LqlesError, LqlesResult};

/// Stencil direction along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Backward,
    Forward,
}

/// Structured grid extents with flatten/unflatten mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    extents: [usize; 3],
    dims: usize,
}

impl Grid {
    /// Create from per-axis node counts (1 to 3 axes, each >= 1).
    pub fn new(extents: &[usize]) -> LqlesResult<Self> {
        if extents.is_empty() || extents.len() > 3 {
            return Err(LqlesError::ConfigError(format!(
                "grid must have 1 to 3 axes, got {}",
                extents.len()
            )));
        }
        if let Some(axis) = extents.iter().position(|&n| n == 0) {
            return Err(LqlesError::ConfigError(format!(
                "grid axis {axis} must have at least one node"
            )));
        }
        let mut padded = [1; 3];
        padded[..extents.len()].copy_from_slice(extents);
        Ok(Grid {
            extents: padded,
            dims: extents.len(),
        })
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    /// Node count along `axis`; 1 for axes beyond `dims`.
    pub fn extent(&self, axis: usize) -> usize {
        self.extents[axis]
    }

    pub fn extents(&self) -> &[usize] {
        &self.extents[..self.dims]
    }

    /// Total number of nodes.
    pub fn len(&self) -> usize {
        self.extents.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn flatten(&self, ijk: [usize; 3]) -> usize {
        let [nx, ny, _] = self.extents;
        ijk[0] + nx * ijk[1] + nx * ny * ijk[2]
    }

    #[inline]
    pub fn unflatten(&self, m: usize) -> [usize; 3] {
        let [nx, ny, _] = self.extents;
        [m % nx, (m / nx) % ny, m / (nx * ny)]
    }

    /// Clamp each coordinate to the last node of its axis.
    #[inline]
    pub fn clamped(&self, ijk: [usize; 3]) -> [usize; 3] {
        [
            ijk[0].min(self.extents[0] - 1),
            ijk[1].min(self.extents[1] - 1),
            ijk[2].min(self.extents[2] - 1),
        ]
    }

    /// Flattened index of the neighbour one step along `axis`.
    ///
    /// Periodic axes wrap (0 ↔ n-1). On a non-periodic axis a step off the
    /// mesh yields `None`.
    pub fn neighbor(&self, ijk: [usize; 3], axis: usize, step: Step, periodic: bool) -> Option<usize> {
        let n = self.extents[axis];
        let i = ijk[axis];
        let moved = match step {
            Step::Backward if i > 0 => i - 1,
            Step::Backward if periodic => n - 1,
            Step::Forward if i + 1 < n => i + 1,
            Step::Forward if periodic => 0,
            _ => return None,
        };
        let mut target = ijk;
        target[axis] = moved;
        Some(self.flatten(target))
    }

    /// All node triples in flattened order.
    pub fn nodes(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        (0..self.len()).map(move |m| self.unflatten(m))
    }
}
