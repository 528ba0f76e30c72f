// ─────────────────────────────────────────────────────────────────────
// L-QLES — Sparse
// Copyright 2024 Rolls-Royce plc
// License: BSD 3-Clause
// ─────────────────────────────────────────────────────────────────────
//! Sparse operators on top of `nalgebra_sparse`.
//!
//! Matrices are assembled as COO and converted to CSR, whose layout
//! (`row_offsets`, `col_indices`, `values`, columns sorted and unique per
//! row) is the one `scipy.sparse.csr_matrix` uses. [`CsrOps`] adds the few
//! operations the generator needs on top of the library type.

use lqles_types::error::{LqlesError, LqlesResult};
use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::{CooMatrix, SparseEntry};

use crate::permutation::Permutation;

pub type CsrMatrix = nalgebra_sparse::CsrMatrix<f64>;

/// Build from one `(col, value)` list per row. Duplicate columns within a
/// row are summed; explicit zeros are kept.
pub fn from_rows(ncols: usize, rows: Vec<Vec<(usize, f64)>>) -> LqlesResult<CsrMatrix> {
    let mut coo = CooMatrix::new(rows.len(), ncols);
    for (i, row) in rows.into_iter().enumerate() {
        for (col, value) in row {
            if col >= ncols {
                return Err(LqlesError::LinAlg(format!(
                    "row {i}: column {col} out of bounds for {ncols} columns"
                )));
            }
            coo.push(i, col, value);
        }
    }
    Ok(CsrMatrix::from(&coo))
}

/// Wrap raw CSR arrays, checking the layout.
pub fn from_csr_data(
    nrows: usize,
    ncols: usize,
    row_offsets: Vec<usize>,
    col_indices: Vec<usize>,
    values: Vec<f64>,
) -> LqlesResult<CsrMatrix> {
    CsrMatrix::try_from_csr_data(nrows, ncols, row_offsets, col_indices, values)
        .map_err(|e| LqlesError::LinAlg(format!("invalid CSR data: {e}")))
}

pub trait CsrOps {
    /// y = A·x.
    ///
    /// Panics if `x.len() != ncols`.
    fn mul_vec(&self, x: &[f64]) -> Vec<f64>;

    /// Entry (i, j), zero when not stored.
    fn value_at(&self, i: usize, j: usize) -> f64;

    fn to_dense(&self) -> DMatrix<f64>;

    /// Largest stored magnitude, 0.0 for an empty matrix.
    fn max_abs(&self) -> f64;

    /// Divide every stored entry by `divisor`.
    fn divide(&mut self, divisor: f64);

    /// Copy without explicitly stored zeros.
    fn drop_zeros(&self) -> CsrMatrix;

    fn row_sums(&self) -> Vec<f64>;

    /// Largest |i - j| over nonzero entries.
    fn bandwidth(&self) -> usize;

    fn is_symmetric(&self, tol: f64) -> bool;

    /// P·A·Q for `perm`, applied as an index relabeling in O(nnz): row `i`
    /// of the result is row `mapping[i]`, with column `c` renamed to
    /// `order[c]`.
    fn permuted(&self, perm: &Permutation) -> LqlesResult<CsrMatrix>;
}

impl CsrOps for CsrMatrix {
    fn mul_vec(&self, x: &[f64]) -> Vec<f64> {
        assert_eq!(x.len(), self.ncols(), "vector length must match columns");
        let y = self * &DVector::from_column_slice(x);
        y.as_slice().to_vec()
    }

    fn value_at(&self, i: usize, j: usize) -> f64 {
        match self.get_entry(i, j) {
            Some(SparseEntry::NonZero(v)) => *v,
            _ => 0.0,
        }
    }

    fn to_dense(&self) -> DMatrix<f64> {
        DMatrix::from(self)
    }

    fn max_abs(&self) -> f64 {
        self.values().iter().fold(0.0_f64, |m, v| m.max(v.abs()))
    }

    fn divide(&mut self, divisor: f64) {
        for v in self.values_mut() {
            *v /= divisor;
        }
    }

    fn drop_zeros(&self) -> CsrMatrix {
        self.filter(|_, _, &v| v != 0.0)
    }

    fn row_sums(&self) -> Vec<f64> {
        self.row_iter().map(|row| row.values().iter().sum()).collect()
    }

    fn bandwidth(&self) -> usize {
        self.triplet_iter()
            .filter(|&(_, _, &v)| v != 0.0)
            .map(|(i, j, _)| i.abs_diff(j))
            .max()
            .unwrap_or(0)
    }

    fn is_symmetric(&self, tol: f64) -> bool {
        self.nrows() == self.ncols()
            && self
                .triplet_iter()
                .all(|(i, j, &v)| (v - self.value_at(j, i)).abs() <= tol)
    }

    fn permuted(&self, perm: &Permutation) -> LqlesResult<CsrMatrix> {
        let n = self.nrows();
        if perm.len() != n || n != self.ncols() {
            return Err(LqlesError::LinAlg(format!(
                "permutation of length {} does not fit a {}x{} matrix",
                perm.len(),
                n,
                self.ncols()
            )));
        }
        let order = perm.order();
        let mut row_offsets = Vec::with_capacity(n + 1);
        let mut col_indices = Vec::with_capacity(self.nnz());
        let mut values = Vec::with_capacity(self.nnz());
        row_offsets.push(0);
        let mut entries = Vec::new();
        for &old in perm.mapping() {
            let row = self.row(old);
            entries.clear();
            entries.extend(
                row.col_indices()
                    .iter()
                    .zip(row.values())
                    .map(|(&c, &v)| (order[c], v)),
            );
            entries.sort_unstable_by_key(|&(c, _)| c);
            for &(c, v) in &entries {
                col_indices.push(c);
                values.push(v);
            }
            row_offsets.push(col_indices.len());
        }
        from_csr_data(n, n, row_offsets, col_indices, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::dmatrix;

    fn laplacian_1d(n: usize) -> CsrMatrix {
        let rows = (0..n)
            .map(|i| {
                let mut row = vec![(i, 2.0)];
                if i > 0 {
                    row.push((i - 1, -1.0));
                }
                if i + 1 < n {
                    row.push((i + 1, -1.0));
                }
                row
            })
            .collect();
        from_rows(n, rows).unwrap()
    }

    #[test]
    fn test_layout_matches_scipy() {
        let a = laplacian_1d(3);
        assert_eq!(a.row_offsets(), &[0, 2, 5, 7]);
        assert_eq!(a.col_indices(), &[0, 1, 0, 1, 2, 1, 2]);
        assert_eq!(a.values(), &[2.0, -1.0, -1.0, 2.0, -1.0, -1.0, 2.0]);
        assert_eq!(a.nnz(), 7);
    }

    #[test]
    fn test_duplicates_summed() {
        let a = from_rows(2, vec![vec![(1, 1.5), (1, 2.0)], vec![(0, 1.0)]]).unwrap();
        assert_eq!(a.nnz(), 2);
        assert_eq!(a.value_at(0, 1), 3.5);
        assert_eq!(a.value_at(0, 0), 0.0);
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        assert!(from_rows(2, vec![vec![(2, 1.0)], vec![]]).is_err());
        assert!(from_csr_data(2, 2, vec![0, 1, 3], vec![0, 1], vec![1.0, 1.0]).is_err());
    }

    #[test]
    fn test_mul_vec() {
        let a = laplacian_1d(4);
        let y = a.mul_vec(&[1.0, 1.0, 1.0, 1.0]);
        assert_eq!(y, vec![1.0, 0.0, 0.0, 1.0]);
        assert_eq!(a.row_sums(), y);
    }

    #[test]
    fn test_symmetry() {
        let a = laplacian_1d(4);
        assert!(a.is_symmetric(0.0));

        let b = from_rows(2, vec![vec![(1, 1.0)], vec![]]).unwrap();
        assert!(!b.is_symmetric(1e-12));
    }

    #[test]
    fn test_divide_and_max_abs() {
        let mut a = laplacian_1d(3);
        assert_eq!(a.max_abs(), 2.0);
        a.divide(2.0);
        assert_eq!(a.max_abs(), 1.0);
        assert_eq!(a.value_at(1, 0), -0.5);
    }

    #[test]
    fn test_bandwidth_and_drop_zeros() {
        let a = from_rows(4, vec![vec![(0, 1.0), (3, 0.0)], vec![(1, 1.0)], vec![], vec![(1, 2.0)]])
            .unwrap();
        assert_eq!(a.nnz(), 4);
        assert_eq!(a.bandwidth(), 2);
        assert_eq!(a.drop_zeros().nnz(), 3);
    }

    #[test]
    fn test_permuted_matches_dense_product() {
        let dense = dmatrix![
            4.0, -1.0, 0.0, -2.0;
            -1.0, 4.0, -1.0, 0.0;
            0.0, -3.0, 4.0, -1.0;
            -2.0, 0.0, -1.0, 4.0
        ];
        let a = CsrMatrix::from(&dense).drop_zeros();
        let perm = Permutation::from_mapping(vec![2, 0, 3, 1]).unwrap();
        let expected = &(&perm.p_matrix() * &a) * &perm.q_matrix();
        let relabeled = a.permuted(&perm).unwrap();
        assert_eq!(relabeled.to_dense(), expected.to_dense());
        assert_eq!(relabeled.nnz(), a.nnz());
        assert!(a.permuted(&Permutation::identity(3)).is_err());
    }
}
