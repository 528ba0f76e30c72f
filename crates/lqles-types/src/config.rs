// ─────────────────────────────────────────────────────────────────────
// L-QLES — Config
// Copyright 2024 Rolls-Royce plc
// License: BSD 3-Clause
// ─────────────────────────────────────────────────────────────────────
use serde::{Deserialize, Serialize};

use crate::axis::{Axis, AxisSpec, ClusterType};
use crate::error::{LqlesError, LqlesResult};

/// Top-level case definition.
/// Maps 1:1 to the JSON files under `cases/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseConfig {
    pub name: String,
    /// Number of mesh axes used (1, 2 or 3).
    pub dimension: usize,
    /// Uniform source term f.
    pub force: f64,
    /// Keep the singular operator of a Dirichlet-free case instead of
    /// pinning one unknown.
    #[serde(default)]
    pub degenerate: bool,
    /// Apply the bandwidth-reducing reordering.
    #[serde(default)]
    pub reorder: bool,
    pub mesh: MeshAxes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshAxes {
    pub x: MeshConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<MeshConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<MeshConfig>,
}

/// Mesh and boundary parameters for one axis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshConfig {
    pub length: f64,
    /// Clustering ratio (default: 1.0, uniform)
    #[serde(default = "default_cratio")]
    pub cratio: f64,
    pub ntotal: usize,
    /// Nodes per clustered region (default: 1)
    #[serde(default = "default_nclust")]
    pub nclust: usize,
    /// Cluster type code: 1, 2 or -1 (default: 1)
    #[serde(default = "default_cltype")]
    pub cltype: i32,
    /// Boundary tokens at the low and high ends, e.g. `["D", "N"]`.
    pub btype: [String; 2],
    #[serde(default)]
    pub bvalue: [f64; 2],
    /// Node index pinned when the operator is degenerate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degfix: Option<usize>,
}

fn default_cratio() -> f64 {
    1.0
}
fn default_nclust() -> usize {
    1
}
fn default_cltype() -> i32 {
    1
}

impl MeshConfig {
    pub fn axis_spec(&self) -> LqlesResult<AxisSpec> {
        Ok(AxisSpec {
            length: self.length,
            total_nodes: self.ntotal,
            cluster_count: self.nclust,
            cluster_ratio: self.cratio,
            cluster_type: ClusterType::from_code(self.cltype)?,
        })
    }
}

impl CaseConfig {
    /// Load from JSON file.
    pub fn from_file(path: &str) -> LqlesResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(json: &str) -> LqlesResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> LqlesResult<()> {
        if !(1..=3).contains(&self.dimension) {
            return Err(LqlesError::ConfigError(format!(
                "case {}: dimension must be 1, 2 or 3, got {}",
                self.name, self.dimension
            )));
        }
        if !self.force.is_finite() {
            return Err(LqlesError::ConfigError(format!(
                "case {}: force must be finite, got {}",
                self.name, self.force
            )));
        }
        self.axes().map(|_| ())
    }

    /// Mesh configs for the first `dimension` axes, in x, y, z order.
    pub fn axes(&self) -> LqlesResult<Vec<(Axis, &MeshConfig)>> {
        let slots = [Some(&self.mesh.x), self.mesh.y.as_ref(), self.mesh.z.as_ref()];
        Axis::ALL
            .iter()
            .zip(slots)
            .take(self.dimension)
            .map(|(&axis, mesh)| {
                mesh.map(|m| (axis, m)).ok_or_else(|| {
                    LqlesError::ConfigError(format!(
                        "case {}: dimension {} requires a mesh for the {axis} direction",
                        self.name, self.dimension
                    ))
                })
            })
            .collect()
    }
}
