//! Row/column permutations of square systems.
//!
//! A permutation is held both ways: `order[old] = new` and
//! `mapping[new] = old`. The explicit operators are
//! `P[i][mapping[i]] = 1` and `Q = Pᵗ`, so `P·Q = I`, `A' = P·A·Q`,
//! `b' = P·b` and a solution of the permuted system maps back by `x = Q·x'`.

use lqles_types::error::{LqlesError, LqlesResult};
use nalgebra_sparse::CooMatrix;

use crate::sparse::CsrMatrix;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation {
    order: Vec<usize>,
    mapping: Vec<usize>,
}

impl Permutation {
    pub fn identity(n: usize) -> Self {
        Permutation {
            order: (0..n).collect(),
            mapping: (0..n).collect(),
        }
    }

    /// From `order[old] = new`. Fails unless `order` is a bijection on 0..n.
    pub fn from_order(order: Vec<usize>) -> LqlesResult<Self> {
        let mapping = invert(&order)?;
        Ok(Permutation { order, mapping })
    }

    /// From `mapping[new] = old`.
    pub fn from_mapping(mapping: Vec<usize>) -> LqlesResult<Self> {
        let order = invert(&mapping)?;
        Ok(Permutation { order, mapping })
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// New position of each original index.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Original index at each new position.
    pub fn mapping(&self) -> &[usize] {
        &self.mapping
    }

    /// P with `P[i][mapping[i]] = 1`.
    pub fn p_matrix(&self) -> CsrMatrix {
        unit_matrix(&self.mapping)
    }

    /// Q = Pᵗ, i.e. `Q[mapping[i]][i] = 1`.
    pub fn q_matrix(&self) -> CsrMatrix {
        unit_matrix(&self.order)
    }

    /// P·v.
    pub fn apply(&self, v: &[f64]) -> Vec<f64> {
        assert_eq!(v.len(), self.len(), "vector length must match permutation");
        self.mapping.iter().map(|&old| v[old]).collect()
    }

    /// Q·x', recovering original ordering from a permuted vector.
    pub fn restore(&self, permuted: &[f64]) -> Vec<f64> {
        assert_eq!(permuted.len(), self.len(), "vector length must match permutation");
        self.order.iter().map(|&new| permuted[new]).collect()
    }
}

fn invert(perm: &[usize]) -> LqlesResult<Vec<usize>> {
    let n = perm.len();
    let mut inverse = vec![usize::MAX; n];
    for (i, &p) in perm.iter().enumerate() {
        if p >= n || inverse[p] != usize::MAX {
            return Err(LqlesError::LinAlg(format!(
                "index {p} at position {i} breaks a permutation of length {n}"
            )));
        }
        inverse[p] = i;
    }
    Ok(inverse)
}

/// Matrix with a single unit entry per row, row `i` at column `cols[i]`.
fn unit_matrix(cols: &[usize]) -> CsrMatrix {
    let n = cols.len();
    let mut coo = CooMatrix::new(n, n);
    for (i, &j) in cols.iter().enumerate() {
        coo.push(i, j, 1.0);
    }
    CsrMatrix::from(&coo)
}
