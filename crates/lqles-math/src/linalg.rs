//! Dense direct solve for demonstration-size systems.
//!
//! The operator is densified and factored with partially pivoted LU. Used
//! to produce a reference solution alongside each generated operator.

use lqles_types::error::{LqlesError, LqlesResult};
use nalgebra::DVector;

use crate::sparse::{CsrMatrix, CsrOps};

/// Pivots below this magnitude are treated as singular.
const PIVOT_TOL: f64 = 1e-14;

/// Solve A x = b.
///
/// Returns `LinAlg` on shape mismatch or a (numerically) singular matrix,
/// which is what a degenerate operator without the pinning fix produces.
pub fn solve_dense(a: &CsrMatrix, b: &[f64]) -> LqlesResult<Vec<f64>> {
    let (n, m) = (a.nrows(), a.ncols());
    if n != m || b.len() != n {
        return Err(LqlesError::LinAlg(format!(
            "cannot solve {n}x{m} system with right-hand side of length {}",
            b.len()
        )));
    }

    let lu = a.to_dense().lu();
    if let Some(k) = lu.u().diagonal().iter().position(|p| p.abs() < PIVOT_TOL) {
        return Err(LqlesError::LinAlg(format!(
            "matrix is singular to working precision at column {k}"
        )));
    }
    let x = lu
        .solve(&DVector::from_column_slice(b))
        .ok_or_else(|| LqlesError::LinAlg("LU solve failed".to_string()))?;
    Ok(x.as_slice().to_vec())
}
