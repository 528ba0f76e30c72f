// ─────────────────────────────────────────────────────────────────────
// L-QLES — Mesh
// Copyright 2024 Rolls-Royce plc
// License: BSD 3-Clause
// ─────────────────────────────────────────────────────────────────────
//! Clustered one-dimensional node distributions.
//!
//! An axis of length L with `n` nodes is split into `fc` geometrically
//! stretched regions of `nc` nodes (fc = 2 for two-sided clustering,
//! otherwise 1) and a uniform core of `nu = n - fc·(nc-1)` nodes. With
//! growth ratio r and rc = r^(nc-1) the smallest spacing d, the core
//! spacing D and the clustered-region length C satisfy
//!
//!   d = L / ((nu-1)·rc + fc·(rc-1)/(r-1)),   D = rc·d,   C = (L - (nu-1)·D) / fc
//!
//! For r = 1 the distribution is uniform with d = D = L/(n-1).

use lqles_types::axis::{AxisSpec, ClusterType};
use lqles_types::error::{LqlesError, LqlesResult};
use ndarray::Array1;

/// Reject parameter sets for which the clustering equations have no
/// meaningful solution.
pub fn validate_axis_spec(spec: &AxisSpec) -> LqlesResult<()> {
    if !spec.length.is_finite() || spec.length <= 0.0 {
        return Err(LqlesError::ConfigError(format!(
            "mesh length must be finite and > 0, got {}",
            spec.length
        )));
    }
    if !spec.cluster_ratio.is_finite() || spec.cluster_ratio <= 0.0 {
        return Err(LqlesError::ConfigError(format!(
            "cluster ratio must be finite and > 0, got {}",
            spec.cluster_ratio
        )));
    }
    if spec.total_nodes < 2 {
        return Err(LqlesError::ConfigError(format!(
            "mesh requires at least 2 nodes, got {}",
            spec.total_nodes
        )));
    }
    if spec.cluster_count < 1 {
        return Err(LqlesError::ConfigError(
            "cluster count must be >= 1".to_string(),
        ));
    }
    // The uniform core keeps at least 2 nodes (one spacing).
    let clustered = spec.cluster_type.regions() * (spec.cluster_count - 1);
    if spec.total_nodes < clustered + 2 {
        return Err(LqlesError::ConfigError(format!(
            "{} nodes cannot hold {} clustered region(s) of {} nodes (cluster type {}) and a uniform core",
            spec.total_nodes,
            spec.cluster_type.regions(),
            spec.cluster_count,
            spec.cluster_type.code()
        )));
    }
    Ok(())
}

/// Generate the node coordinates of one axis, running from 0 to `length`.
pub fn generate_mesh(spec: &AxisSpec) -> LqlesResult<Array1<f64>> {
    validate_axis_spec(spec)?;

    let l = spec.length;
    let r = spec.cluster_ratio;
    let nt = spec.total_nodes;
    let nc = spec.cluster_count;
    let fc = spec.cluster_type.regions();
    let nu = nt - fc * (nc - 1);

    let (d, big_d, c) = if r == 1.0 {
        let d = l / (nt - 1) as f64;
        (d, d, (nc - 1) as f64 * d)
    } else {
        let rc = r.powf((nc - 1) as f64);
        let f1 = (nu - 1) as f64 * rc;
        let f2 = fc as f64 * (rc - 1.0) / (r - 1.0);
        let d = l / (f1 + f2);
        let big_d = rc * d;
        (d, big_d, (l - (nu - 1) as f64 * big_d) / fc as f64)
    };

    let mut x = Array1::zeros(nt);
    for i in 1..nc - 1 {
        x[i] = x[i - 1] + d * r.powf((i - 1) as f64);
    }
    x[nc - 1] = c;
    for i in 0..nu - 1 {
        x[nc + i] = x[nc + i - 1] + big_d;
    }

    let ns = nc + nu - 1;
    if spec.cluster_type == ClusterType::Both {
        for i in 0..nc - 1 {
            x[ns + i] = x[ns + i - 1] + d * r.powf((nc - i - 2) as f64);
        }
    }

    if spec.cluster_type == ClusterType::High {
        let flipped: Array1<f64> = x.iter().rev().map(|&xi| l - xi).collect();
        return Ok(flipped);
    }
    Ok(x)
}
