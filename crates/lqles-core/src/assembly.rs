// ─────────────────────────────────────────────────────────────────────
// L-QLES — Assembly
// Copyright 2024 Rolls-Royce plc
// License: BSD 3-Clause
// ─────────────────────────────────────────────────────────────────────
//! Finite-volume Laplacian assembly on structured 1D/2D/3D meshes.
//!
//! Each axis is extended by one ghost spacing at either end equal to the
//! adjacent real spacing, `dx[0] = dx[1]` and `dx[n] = dx[n-1]`, where
//! `dx[i] = x[i] - x[i-1]`. Node `i` owns the half-cell width
//! `w = (dx[i] + dx[i+1]) / 2`; the cell volume is the product of the
//! half-cell widths over all axes.
//!
//! Two and three axes claim rows by the following rules, in priority
//! order. A row set by one rule is never touched by a later one:
//!
//! 1. Dirichlet faces (x, y, z; low end then high end). Diagonal
//!    `2·∏_{b≠a} w_b / h_a + Σ_{b≠a} ∏_{c≠b} w_c · (1/dx_b[i] + 1/dx_b[i+1])`
//!    with `h_a` the spacing next to the face and `w_a = h_a` inside the
//!    cross terms; `b = value·diag`.
//! 2. Neumann and Symmetry faces. Same diagonal, the inward normal
//!    neighbour gets `-diag`; Neumann sets `b = value·diag`, Symmetry
//!    leaves `b = 0`. On z faces the right-hand side is gated by the high
//!    y boundary type instead, see [`Assembler::flux_rhs_gate`].
//! 3. Interior stencil. Periodic axes use wrapped spacings
//!    (`dx[0] = dx[n-1]`, `dx[n] = dx[1]`) and wrapped neighbours.
//!    Off-diagonals are `-∏_{c≠b} w_c / dx_b`, the diagonal is minus
//!    their sum and `b = f·volume`.
//! 4. Degeneracy fix. Without any Dirichlet end the operator has a
//!    one-dimensional null space; unless it is explicitly kept, the
//!    configured node loses its off-diagonals and `b[m] *= A[m][m]`.
//! 5. Max-norm scaling of A and b by `max |A_ij|`.
//!
//! A single axis uses the line operator of [`Assembler::apply_line`]
//! instead of rules 1 to 3; rules 4 and 5 are shared.

use std::collections::BTreeMap;

use lqles_math::grid::{Grid, Step};
use lqles_math::sparse::{from_rows, CsrMatrix, CsrOps};
use lqles_types::axis::Axis;
use lqles_types::boundary::{AxisBoundary, BoundaryType, Side};
use lqles_types::error::{LqlesError, LqlesResult};
use ndarray::Array1;

use crate::boundary::check_pairing;

/// Assembled operator and right-hand side.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearSystem {
    pub a: CsrMatrix,
    pub b: Vec<f64>,
}

impl LinearSystem {
    pub fn len(&self) -> usize {
        self.b.len()
    }

    pub fn is_empty(&self) -> bool {
        self.b.is_empty()
    }

    /// Max-norm of A·x - b.
    pub fn residual_max(&self, x: &[f64]) -> f64 {
        self.a
            .mul_vec(x)
            .iter()
            .zip(&self.b)
            .fold(0.0_f64, |m, (ax, b)| m.max((ax - b).abs()))
    }
}

/// Assembly rule that claimed a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowState {
    Untouched,
    Dirichlet,
    Neumann,
    Interior,
}

/// Spacings of one axis.
#[derive(Debug, Clone)]
struct AxisGeometry {
    axis: Axis,
    /// Ghost-extended spacings, length n + 1.
    ghost: Vec<f64>,
    /// Spacings seen by the interior stencil; wrapped on periodic axes.
    interior: Vec<f64>,
    boundary: AxisBoundary,
}

impl AxisGeometry {
    fn new(axis: Axis, x: &Array1<f64>, boundary: AxisBoundary) -> LqlesResult<Self> {
        let n = x.len();
        if n < 2 {
            return Err(LqlesError::ConfigError(format!(
                "{axis} direction needs at least 2 nodes, got {n}"
            )));
        }
        let mut ghost = vec![0.0; n + 1];
        for i in 1..n {
            ghost[i] = x[i] - x[i - 1];
            if !(ghost[i].is_finite() && ghost[i] > 0.0) {
                return Err(LqlesError::ConfigError(format!(
                    "{axis} coordinates must be finite and strictly increasing (node {i})"
                )));
            }
        }
        ghost[0] = ghost[1];
        ghost[n] = ghost[n - 1];

        let mut interior = ghost.clone();
        if boundary.pair.is_periodic() {
            interior[0] = ghost[n - 1];
            interior[n] = ghost[1];
        }

        Ok(AxisGeometry {
            axis,
            ghost,
            interior,
            boundary,
        })
    }

    fn nodes(&self) -> usize {
        self.ghost.len() - 1
    }

    fn is_periodic(&self) -> bool {
        self.boundary.pair.is_periodic()
    }
}

#[inline]
fn half_width(dx: &[f64], i: usize) -> f64 {
    0.5 * (dx[i] + dx[i + 1])
}

/// Product of all widths except `skip`.
#[inline]
fn product_except(widths: &[f64], skip: usize) -> f64 {
    widths
        .iter()
        .enumerate()
        .filter(|&(c, _)| c != skip)
        .map(|(_, &w)| w)
        .product()
}

struct Assembler {
    grid: Grid,
    axes: Vec<AxisGeometry>,
    rows: Vec<BTreeMap<usize, f64>>,
    b: Vec<f64>,
    state: Vec<RowState>,
}

impl Assembler {
    fn new(axes: Vec<AxisGeometry>) -> LqlesResult<Self> {
        let extents: Vec<usize> = axes.iter().map(AxisGeometry::nodes).collect();
        let grid = Grid::new(&extents)?;
        let n = grid.len();
        Ok(Assembler {
            grid,
            axes,
            rows: vec![BTreeMap::new(); n],
            b: vec![0.0; n],
            state: vec![RowState::Untouched; n],
        })
    }

    fn face_nodes(&self, axis: usize, side: Side) -> Vec<[usize; 3]> {
        let index = match side {
            Side::Low => 0,
            Side::High => self.grid.extent(axis) - 1,
        };
        self.grid.nodes().filter(|ijk| ijk[axis] == index).collect()
    }

    /// Diagonal of a boundary row on a face normal to `normal`.
    fn face_diagonal(&self, ijk: [usize; 3], normal: usize) -> f64 {
        let widths: Vec<f64> = self
            .axes
            .iter()
            .enumerate()
            .map(|(a, g)| {
                if a == normal {
                    g.ghost[ijk[a]]
                } else {
                    half_width(&g.ghost, ijk[a])
                }
            })
            .collect();

        let mut diag = 2.0 * product_except(&widths, normal) / widths[normal];
        for (b, g) in self.axes.iter().enumerate().filter(|&(b, _)| b != normal) {
            let area = product_except(&widths, b);
            diag += area / g.ghost[ijk[b]];
            diag += area / g.ghost[ijk[b] + 1];
        }
        diag
    }

    /// Boundary type deciding whether a Neumann/Symmetry row on `axis`
    /// takes `value·diag` as right-hand side (only `Neumann` does).
    ///
    /// z faces read the high y boundary instead of their own type. This
    /// looks like a slip in the published L-QLES generator; it is kept so
    /// generated systems stay identical until its authors confirm the
    /// intent, and every case where the two readings disagree is logged.
    fn flux_rhs_gate(&self, axis: usize, side: Side) -> BoundaryType {
        let own = self.axes[axis].boundary.pair.side(side);
        if axis != Axis::Z.index() {
            return own;
        }
        let gate = self.axes[Axis::Y.index()].boundary.pair.high;
        let value = self.axes[axis].boundary.value(side);
        if (gate == BoundaryType::Neumann) != (own == BoundaryType::Neumann) && value != 0.0 {
            log::warn!(
                "{side:?} z face ({own:?}, value {value}) takes its right-hand side from the high y boundary ({gate:?})"
            );
        }
        gate
    }

    /// Rules 1 and 2: claim the boundary rows of every face whose type
    /// belongs to `rule`.
    fn apply_faces(&mut self, rule: RowState) {
        for a in 0..self.axes.len() {
            for side in Side::BOTH {
                let boundary = self.axes[a].boundary;
                let bc = boundary.pair.side(side);
                let claims = match rule {
                    RowState::Dirichlet => bc == BoundaryType::Dirichlet,
                    RowState::Neumann => bc.is_flux(),
                    RowState::Untouched | RowState::Interior => false,
                };
                if !claims {
                    continue;
                }
                let rhs = match rule {
                    RowState::Neumann => self.flux_rhs_gate(a, side),
                    _ => bc,
                };
                let inward = match side {
                    Side::Low => Step::Forward,
                    Side::High => Step::Backward,
                };

                for ijk in self.face_nodes(a, side) {
                    let m = self.grid.flatten(ijk);
                    if self.state[m] != RowState::Untouched {
                        continue;
                    }
                    let diag = self.face_diagonal(ijk, a);
                    self.rows[m].insert(m, diag);
                    if rule == RowState::Neumann {
                        if let Some(neighbor) = self.grid.neighbor(ijk, a, inward, false) {
                            self.rows[m].insert(neighbor, -diag);
                        }
                    }
                    self.b[m] = match rhs {
                        BoundaryType::Dirichlet | BoundaryType::Neumann => boundary.value(side) * diag,
                        BoundaryType::Symmetry | BoundaryType::Periodic => 0.0,
                    };
                    self.state[m] = rule;
                }
            }
        }
    }

    /// Rule 3: interior stencil for every row still untouched.
    fn apply_interior(&mut self, force: f64) -> LqlesResult<()> {
        let dims = self.axes.len();
        for m in 0..self.grid.len() {
            if self.state[m] != RowState::Untouched {
                continue;
            }
            let ijk = self.grid.unflatten(m);
            let widths: Vec<f64> = self
                .axes
                .iter()
                .enumerate()
                .map(|(a, g)| half_width(&g.interior, ijk[a]))
                .collect();

            // Written W, E, S, N, D, U; later writes to the same column win.
            let mut neighbors = [[m; 2]; 3];
            for (a, g) in self.axes.iter().enumerate() {
                let area = product_except(&widths, a);
                let steps = [
                    (Step::Backward, g.interior[ijk[a]]),
                    (Step::Forward, g.interior[ijk[a] + 1]),
                ];
                for (slot, (step, spacing)) in steps.into_iter().enumerate() {
                    let neighbor = self
                        .grid
                        .neighbor(ijk, a, step, g.is_periodic())
                        .ok_or_else(|| {
                            LqlesError::PhysicsViolation(format!(
                                "interior stencil at node {ijk:?} crosses the non-periodic {} boundary",
                                g.axis
                            ))
                        })?;
                    self.rows[m].insert(neighbor, -area / spacing);
                    neighbors[a][slot] = neighbor;
                }
            }

            // Summation order: E, W, S, N, D, U.
            let mut order = vec![neighbors[0][1], neighbors[0][0]];
            for pair in neighbors.iter().take(dims).skip(1) {
                order.extend_from_slice(pair);
            }
            let diag = order
                .iter()
                .fold(0.0, |acc, col| acc - self.rows[m].get(col).copied().unwrap_or(0.0));
            self.rows[m].insert(m, diag);

            self.b[m] = widths.iter().fold(force, |acc, w| acc * w);
            self.state[m] = RowState::Interior;
        }
        Ok(())
    }

    /// Rules 1 to 3 for a single axis.
    ///
    /// Interior rows couple to `i ± 1` with `-1/dx` and take `b = f`. A
    /// Dirichlet end copies the diagonal of its inner neighbour, a flux end
    /// additionally mirrors it onto that neighbour. A periodic axis builds
    /// row 0 from the end spacings and copies it, shifted, into row n-1.
    /// End rows take `b = value·diag` unless they are Symmetry ends.
    fn apply_line(&mut self, force: f64) -> LqlesResult<()> {
        let g = &self.axes[0];
        let n = g.nodes();
        let dx = g.ghost.clone();
        let boundary = g.boundary;
        if !boundary.pair.is_periodic() && n < 3 {
            return Err(LqlesError::ConfigError(format!(
                "{} direction needs at least 3 nodes without periodic ends, got {n}",
                g.axis
            )));
        }

        for i in 1..n - 1 {
            let west = -1.0 / dx[i];
            let east = -1.0 / dx[i + 1];
            let row = &mut self.rows[i];
            row.insert(i - 1, west);
            row.insert(i + 1, east);
            row.insert(i, -west - east);
            self.b[i] = force;
            self.state[i] = RowState::Interior;
        }

        let last = n - 1;
        if boundary.pair.is_periodic() {
            // With two nodes both writes land in the same column.
            self.rows[0].insert(1, -1.0 / dx[0]);
            self.rows[0].insert(last, -1.0 / dx[n]);
            let east = self.rows[0][&1];
            let west = self.rows[0][&last];
            let diag = -east - west;
            self.rows[0].insert(0, diag);
            self.rows[last].insert(last, diag);
            self.rows[last].insert(last - 1, west);
            self.rows[last].insert(0, east);
            self.state[0] = RowState::Interior;
            self.state[last] = RowState::Interior;
        } else {
            for (side, m, inner) in [(Side::Low, 0, 1), (Side::High, last, last - 1)] {
                let bc = boundary.pair.side(side);
                let diag = self.rows[inner].get(&inner).copied().unwrap_or(0.0);
                self.rows[m].insert(m, diag);
                self.state[m] = if bc.is_flux() {
                    self.rows[m].insert(inner, -diag);
                    RowState::Neumann
                } else {
                    RowState::Dirichlet
                };
            }
        }

        for (side, m) in [(Side::Low, 0), (Side::High, last)] {
            if boundary.pair.side(side) != BoundaryType::Symmetry {
                let diag = self.rows[m].get(&m).copied().unwrap_or(0.0);
                self.b[m] = boundary.value(side) * diag;
            }
        }
        Ok(())
    }

    fn is_degenerate(&self) -> bool {
        self.axes.iter().all(|g| !g.boundary.pair.has_dirichlet())
    }

    /// Rule 4: pin the configured node.
    fn pin_degenerate_row(&mut self) -> LqlesResult<()> {
        let mut ijk = [0; 3];
        for (a, g) in self.axes.iter().enumerate() {
            let row = g.boundary.degeneracy_row.ok_or_else(|| {
                LqlesError::ConfigError(format!(
                    "operator has no Dirichlet boundary: a degeneracy row is required in the {} direction",
                    g.axis
                ))
            })?;
            if row >= g.nodes() {
                return Err(LqlesError::ConfigError(format!(
                    "degeneracy row {row} out of range for {} nodes in the {} direction",
                    g.nodes(),
                    g.axis
                )));
            }
            ijk[a] = row;
        }
        let m = self.grid.flatten(ijk);
        let diag = self.rows[m].get(&m).copied().unwrap_or(0.0);
        self.rows[m].retain(|&col, _| col == m);
        self.b[m] *= diag;
        log::debug!("pinned degenerate row {m} at node {ijk:?}");
        Ok(())
    }

    /// Rule 5: scale to unit max-norm and compress.
    fn finish(self) -> LqlesResult<LinearSystem> {
        let n = self.grid.len();
        let rows: Vec<Vec<(usize, f64)>> = self
            .rows
            .into_iter()
            .map(|row| row.into_iter().collect())
            .collect();
        let mut a = from_rows(n, rows)?;
        let amax = a.max_abs();
        if !(amax.is_finite() && amax > 0.0) {
            return Err(LqlesError::LinAlg(format!(
                "cannot normalize operator with max |A| = {amax}"
            )));
        }
        a.divide(amax);
        let b = self.b.into_iter().map(|v| v / amax).collect();
        log::debug!(
            "assembled {n} unknowns, nnz = {}, max |A| = {amax:.6e}, symmetric = {}, max |row sum| = {:.3e}",
            a.nnz(),
            a.is_symmetric(1e-12),
            a.row_sums().iter().fold(0.0_f64, |m, s| m.max(s.abs()))
        );
        Ok(LinearSystem { a, b })
    }
}

/// Assemble the normalized Laplacian for 1, 2 or 3 axes.
///
/// `coords[a]` are the node coordinates of axis `a` (x, y, z order) and
/// `boundaries[a]` its boundary description. `force` is the uniform
/// source term. With `keep_degenerate` a Dirichlet-free operator is
/// returned singular instead of pinning one unknown.
pub fn assemble(
    coords: &[Array1<f64>],
    boundaries: &[AxisBoundary],
    force: f64,
    keep_degenerate: bool,
) -> LqlesResult<LinearSystem> {
    if coords.is_empty() || coords.len() > 3 {
        return Err(LqlesError::ConfigError(format!(
            "assembly supports 1 to 3 axes, got {}",
            coords.len()
        )));
    }
    if coords.len() != boundaries.len() {
        return Err(LqlesError::ConfigError(format!(
            "{} coordinate arrays but {} boundary descriptions",
            coords.len(),
            boundaries.len()
        )));
    }
    if !force.is_finite() {
        return Err(LqlesError::ConfigError(format!(
            "source term must be finite, got {force}"
        )));
    }

    let axes = Axis::ALL
        .iter()
        .zip(coords.iter().zip(boundaries))
        .map(|(&axis, (x, bc))| {
            check_pairing(&bc.pair, axis)?;
            AxisGeometry::new(axis, x, *bc)
        })
        .collect::<LqlesResult<Vec<_>>>()?;

    let mut assembler = Assembler::new(axes)?;
    if assembler.axes.len() == 1 {
        assembler.apply_line(force)?;
    } else {
        assembler.apply_faces(RowState::Dirichlet);
        assembler.apply_faces(RowState::Neumann);
        assembler.apply_interior(force)?;
    }
    if !keep_degenerate && assembler.is_degenerate() {
        assembler.pin_degenerate_row()?;
    }
    assembler.finish()
}
