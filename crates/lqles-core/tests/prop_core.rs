//! Property-based tests for lqles-core using proptest.
//!
//! Covers: max-norm scaling, periodic conservation, stencil width,
//! reordering round trips.

use lqles_core::assembly::assemble;
use lqles_core::reorder::{bandwidth_order, reorder};
use lqles_math::grid::Grid;
use lqles_math::linalg::solve_dense;
use lqles_math::mesh::generate_mesh;
use lqles_math::sparse::CsrOps;
use lqles_types::axis::{AxisSpec, ClusterType};
use lqles_types::boundary::{AxisBoundary, BoundaryPair, BoundaryType};
use ndarray::Array1;
use proptest::prelude::*;

/// Valid boundary pair: either both ends periodic or neither.
fn boundary_pair() -> impl Strategy<Value = BoundaryPair> {
    let open = prop_oneof![
        Just(BoundaryType::Dirichlet),
        Just(BoundaryType::Neumann),
        Just(BoundaryType::Symmetry),
    ];
    prop_oneof![
        1 => Just(BoundaryPair::new(BoundaryType::Periodic, BoundaryType::Periodic)),
        3 => (open.clone(), open).prop_map(|(low, high)| BoundaryPair::new(low, high)),
    ]
}

fn axis_boundary(n: usize) -> impl Strategy<Value = AxisBoundary> {
    (boundary_pair(), -2.0f64..2.0, -2.0f64..2.0, 0..n).prop_map(|(pair, lo, hi, row)| {
        AxisBoundary::new(pair, [lo, hi]).with_degeneracy_row(row)
    })
}

fn clustered(n: usize, ratio: f64) -> Array1<f64> {
    generate_mesh(&AxisSpec {
        length: 1.0,
        total_nodes: n,
        cluster_count: (n / 3).max(1),
        cluster_ratio: ratio,
        cluster_type: ClusterType::Low,
    })
    .unwrap()
}

// ── Assembly ─────────────────────────────────────────────────────────

proptest! {
    /// After scaling the largest entry is exactly 1 and no row exceeds
    /// the 2·dim+1 stencil.
    #[test]
    fn max_norm_and_stencil_width(
        nx in 3usize..7,
        ny in 3usize..7,
        ratio in 0.8f64..1.3,
        bx in axis_boundary(3),
        by in axis_boundary(3),
        force in -2.0f64..2.0,
    ) {
        let coords = [clustered(nx, ratio), clustered(ny, ratio)];
        let sys = assemble(&coords, &[bx, by], force, false).unwrap();
        prop_assert_eq!(sys.a.max_abs(), 1.0);
        for i in 0..sys.len() {
            prop_assert!(sys.a.row(i).nnz() <= 5);
        }
        prop_assert!(sys.b.iter().all(|v| v.is_finite()));
    }

    /// Fully periodic uniform operators conserve: every row sums to 0.
    #[test]
    fn periodic_rows_conserve(nx in 3usize..8, ny in 3usize..8, nz in 3usize..5) {
        let periodic = AxisBoundary::new(
            BoundaryPair::new(BoundaryType::Periodic, BoundaryType::Periodic),
            [0.0, 0.0],
        );
        // Integer spacing keeps every entry exact.
        let axis = |n: usize| Array1::linspace(0.0, (n - 1) as f64, n);
        let sys = assemble(
            &[axis(nx), axis(ny), axis(nz)],
            &[periodic; 3],
            1.0,
            true,
        )
        .unwrap();
        for (i, s) in sys.a.row_sums().iter().enumerate() {
            prop_assert!(s.abs() < 1e-15, "row {} sums to {}", i, s);
        }
    }

    /// Any non-periodic Dirichlet pair on an axis keeps the system solvable.
    #[test]
    fn dirichlet_systems_solve(nx in 3usize..6, ny in 3usize..6, by in axis_boundary(3)) {
        let bx = AxisBoundary::new(
            BoundaryPair::new(BoundaryType::Dirichlet, BoundaryType::Neumann),
            [1.0, 0.0],
        );
        let coords = [clustered(nx, 1.1), clustered(ny, 1.0)];
        let sys = assemble(&coords, &[bx, by], 1.0, false).unwrap();
        let x = solve_dense(&sys.a, &sys.b).unwrap();
        prop_assert!(sys.residual_max(&x) < 1e-10);
    }
}

// ── Reordering ───────────────────────────────────────────────────────

proptest! {
    /// The sweep numbers every node exactly once, starting with node 0.
    #[test]
    fn order_is_bijection(nx in 1usize..8, ny in 1usize..8, nz in 1usize..6) {
        let grid = Grid::new(&[nx, ny, nz]).unwrap();
        let perm = bandwidth_order(&grid).unwrap();
        prop_assert_eq!(perm.len(), grid.len());
        prop_assert_eq!(perm.order()[0], 0);
        let mut seen = perm.order().to_vec();
        seen.sort_unstable();
        prop_assert_eq!(seen, (0..grid.len()).collect::<Vec<_>>());
    }

    /// Solving the reordered system and mapping back through Q gives the
    /// solution of the original system. Three y nodes keep flux pairs on
    /// both y ends from mirroring onto each other.
    #[test]
    fn reordered_round_trip(nx in 2usize..5, ny in 3usize..5, by in axis_boundary(3)) {
        let bx = AxisBoundary::new(
            BoundaryPair::new(BoundaryType::Dirichlet, BoundaryType::Dirichlet),
            [0.5, -0.5],
        );
        let coords = [clustered(nx, 1.0), clustered(ny, 1.0)];
        let sys = assemble(&coords, &[bx, by], 1.0, false).unwrap();
        let grid = Grid::new(&[nx, ny]).unwrap();
        let reordered = reorder(&sys, &grid).unwrap();

        let x = solve_dense(&sys.a, &sys.b).unwrap();
        let xr = solve_dense(&reordered.system.a, &reordered.system.b).unwrap();
        for (a, b) in x.iter().zip(reordered.restore(&xr)) {
            prop_assert!((a - b).abs() < 1e-10);
        }
    }
}
