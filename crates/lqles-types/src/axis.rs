// ─────────────────────────────────────────────────────────────────────
// L-QLES — Axis
// Copyright 2024 Rolls-Royce plc
// License: BSD 3-Clause
// ─────────────────────────────────────────────────────────────────────
//! Coordinate axes and the per-axis mesh clustering parameters.

use std::fmt;

use crate::error::{LqlesError, LqlesResult};

/// Coordinate direction. The first axis varies fastest in flattened
/// cell numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where geometric clustering is applied along an axis.
///
/// Config files use the integer codes `1`, `2` and `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterType {
    /// Cells grow away from the low end (code 1).
    Low,
    /// Cells grow away from both ends (code 2).
    Both,
    /// Cells grow away from the high end (code -1).
    High,
}

impl ClusterType {
    pub fn from_code(code: i32) -> LqlesResult<Self> {
        match code {
            1 => Ok(ClusterType::Low),
            2 => Ok(ClusterType::Both),
            -1 => Ok(ClusterType::High),
            other => Err(LqlesError::ConfigError(format!(
                "cluster type must be one of 1, 2, -1, got {other}"
            ))),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            ClusterType::Low => 1,
            ClusterType::Both => 2,
            ClusterType::High => -1,
        }
    }

    /// Number of clustered regions (1 or 2).
    pub fn regions(self) -> usize {
        match self {
            ClusterType::Both => 2,
            ClusterType::Low | ClusterType::High => 1,
        }
    }
}

/// Clustering parameters for one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisSpec {
    /// Axis extent; coordinates run from 0 to `length`.
    pub length: f64,
    /// Total number of nodes, including both ends.
    pub total_nodes: usize,
    /// Number of nodes in each clustered region, counting the pinned end.
    pub cluster_count: usize,
    /// Geometric growth ratio between neighbouring clustered cells.
    pub cluster_ratio: f64,
    pub cluster_type: ClusterType,
}

impl AxisSpec {
    /// Uniformly spaced axis with `total_nodes` points over `[0, length]`.
    pub fn uniform(length: f64, total_nodes: usize) -> Self {
        AxisSpec {
            length,
            total_nodes,
            cluster_count: 1,
            cluster_ratio: 1.0,
            cluster_type: ClusterType::Low,
        }
    }
}
