//! Nearest-neighbour reordering of assembled systems.
//!
//! Nodes are numbered by a frontier sweep starting at node 0. Each pass
//! visits the frontier in ascending flattened order and numbers every
//! not-yet-visited node of its forward 2×2×2 block (clamped at the far
//! end of each axis, offsets ordered k, j, i with i fastest). The newly
//! numbered nodes form the next frontier.
//!
//! The reordered system is `A' = P·A·Q`, `b' = P·b`; a solution `x'` of
//! it maps back to the original numbering by `x = Q·x'`.

use lqles_math::grid::Grid;
use lqles_math::permutation::Permutation;
use lqles_math::sparse::{CsrMatrix, CsrOps};
use lqles_types::error::{LqlesError, LqlesResult};

use crate::assembly::LinearSystem;

/// Reordered system plus the permutation that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ReorderedSystem {
    pub permutation: Permutation,
    pub system: LinearSystem,
}

impl ReorderedSystem {
    /// Q, the operator mapping permuted solutions back.
    pub fn q(&self) -> CsrMatrix {
        self.permutation.q_matrix()
    }

    /// x = Q·x'.
    pub fn restore(&self, permuted: &[f64]) -> Vec<f64> {
        self.permutation.restore(permuted)
    }
}

/// Forward block of `ijk`, flattened, in k, j, i offset order.
fn forward_block(grid: &Grid, ijk: [usize; 3]) -> impl Iterator<Item = usize> + '_ {
    let span = |axis: usize| grid.extent(axis).min(2);
    (0..span(2)).flat_map(move |dk| {
        (0..span(1)).flat_map(move |dj| {
            (0..span(0)).map(move |di| {
                grid.flatten(grid.clamped([ijk[0] + di, ijk[1] + dj, ijk[2] + dk]))
            })
        })
    })
}

/// Compute the frontier-sweep numbering of `grid`.
pub fn bandwidth_order(grid: &Grid) -> LqlesResult<Permutation> {
    let n = grid.len();
    let mut order = vec![0; n];
    let mut visited = vec![false; n];
    visited[0] = true;
    let mut numbered = 1;
    let mut frontier = vec![0];

    while numbered < n {
        let mut next = Vec::new();
        for &node in &frontier {
            for neighbor in forward_block(grid, grid.unflatten(node)) {
                if !visited[neighbor] {
                    visited[neighbor] = true;
                    order[neighbor] = numbered;
                    numbered += 1;
                    next.push(neighbor);
                }
            }
        }
        if next.is_empty() {
            return Err(LqlesError::LinAlg(format!(
                "reordering stalled after {numbered} of {n} nodes"
            )));
        }
        next.sort_unstable();
        frontier = next;
    }

    Permutation::from_order(order)
}

/// Reorder `system`, assembled on `grid`.
pub fn reorder(system: &LinearSystem, grid: &Grid) -> LqlesResult<ReorderedSystem> {
    if system.len() != grid.len() {
        return Err(LqlesError::LinAlg(format!(
            "system has {} unknowns but the grid has {} nodes",
            system.len(),
            grid.len()
        )));
    }
    let permutation = bandwidth_order(grid)?;
    let a = system.a.permuted(&permutation)?;
    let b = permutation.apply(&system.b);
    log::debug!(
        "reordered {} unknowns: bandwidth {} -> {}",
        system.len(),
        system.a.bandwidth(),
        a.bandwidth()
    );
    Ok(ReorderedSystem {
        permutation,
        system: LinearSystem { a, b },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::assemble;
    use lqles_math::linalg::solve_dense;
    use lqles_types::boundary::{AxisBoundary, BoundaryPair, BoundaryType};
    use ndarray::Array1;

    fn dirichlet(values: [f64; 2]) -> AxisBoundary {
        AxisBoundary::new(
            BoundaryPair::new(BoundaryType::Dirichlet, BoundaryType::Dirichlet),
            values,
        )
    }

    #[test]
    fn test_1d_order_is_identity() {
        let perm = bandwidth_order(&Grid::new(&[6]).unwrap()).unwrap();
        assert_eq!(perm, Permutation::identity(6));
    }

    #[test]
    fn test_2d_order_follows_forward_blocks() {
        let perm = bandwidth_order(&Grid::new(&[3, 3]).unwrap()).unwrap();
        assert_eq!(perm.order(), &[0, 1, 4, 2, 3, 5, 6, 7, 8]);
        assert_eq!(perm.mapping(), &[0, 1, 3, 4, 2, 5, 6, 7, 8]);
    }

    #[test]
    fn test_3d_order_is_bijection() {
        let grid = Grid::new(&[4, 3, 5]).unwrap();
        let perm = bandwidth_order(&grid).unwrap();
        let mut seen = perm.mapping().to_vec();
        seen.sort_unstable();
        assert_eq!(seen, (0..grid.len()).collect::<Vec<_>>());
        assert_eq!(perm.order()[0], 0);
        assert_eq!(&perm.p_matrix() * &perm.q_matrix(), CsrMatrix::identity(grid.len()));
    }

    #[test]
    fn test_single_node_grid() {
        let perm = bandwidth_order(&Grid::new(&[1]).unwrap()).unwrap();
        assert_eq!(perm.len(), 1);
    }

    #[test]
    fn test_reordered_matrix_is_paq() {
        let coords = [Array1::linspace(0.0, 1.0, 3), Array1::linspace(0.0, 2.0, 4)];
        let system = assemble(&coords, &[dirichlet([1.0, 0.0]), dirichlet([0.0, 2.0])], 1.0, false).unwrap();
        let grid = Grid::new(&[3, 4]).unwrap();
        let reordered = reorder(&system, &grid).unwrap();

        let p = reordered.permutation.p_matrix();
        let paq = &(&p * &system.a) * &reordered.q();
        assert_eq!(paq.to_dense(), reordered.system.a.to_dense());
        assert_eq!(p.mul_vec(&system.b), reordered.system.b);
    }

    #[test]
    fn test_2d_round_trip_recovers_solution() {
        let coords = [Array1::linspace(0.0, 1.0, 3), Array1::linspace(0.0, 1.0, 3)];
        let system = assemble(&coords, &[dirichlet([1.0, 2.0]), dirichlet([0.5, 0.0])], -1.0, false).unwrap();
        let grid = Grid::new(&[3, 3]).unwrap();
        let reordered = reorder(&system, &grid).unwrap();

        let x = solve_dense(&system.a, &system.b).unwrap();
        let x_perm = solve_dense(&reordered.system.a, &reordered.system.b).unwrap();
        let restored = reordered.restore(&x_perm);
        for (orig, back) in x.iter().zip(&restored) {
            assert!((orig - back).abs() < 1e-12, "{orig} vs {back}");
        }
        assert_eq!(reordered.q().mul_vec(&x_perm), restored);
    }

    #[test]
    fn test_size_mismatch_rejected() {
        let coords = [Array1::linspace(0.0, 1.0, 4)];
        let system = assemble(&coords, &[dirichlet([0.0, 0.0])], 0.0, false).unwrap();
        assert!(reorder(&system, &Grid::new(&[5]).unwrap()).is_err());
    }
}
