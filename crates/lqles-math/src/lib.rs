//! Structured grids, clustered meshes and sparse linear algebra for L-QLES.

pub mod grid;
pub mod linalg;
pub mod mesh;
pub mod permutation;
pub mod sparse;
