//! Case pipeline: configuration → meshes → operator → (solution, reordering).

use lqles_math::grid::Grid;
use lqles_math::linalg::solve_dense;
use lqles_math::mesh::generate_mesh;
use lqles_types::boundary::AxisBoundary;
use lqles_types::config::CaseConfig;
use lqles_types::error::{LqlesError, LqlesResult};
use ndarray::Array1;

use crate::assembly::{assemble, LinearSystem};
use crate::boundary::validate;
use crate::reorder::{reorder, ReorderedSystem};

/// Pipeline switches that are not part of the case definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaseOptions {
    /// Compute a dense reference solution of the generated system.
    pub solve: bool,
}

impl Default for CaseOptions {
    fn default() -> Self {
        CaseOptions { solve: true }
    }
}

/// Everything produced for one case.
#[derive(Debug, Clone)]
pub struct CaseResult {
    pub name: String,
    pub grid: Grid,
    /// Node coordinates per axis.
    pub coords: Vec<Array1<f64>>,
    /// Operator in natural node order.
    pub system: LinearSystem,
    /// Singular operator kept without the degeneracy fix.
    pub degenerate: bool,
    pub reordered: Option<ReorderedSystem>,
    /// Solution of [`CaseResult::output_system`]; `None` when not requested
    /// or when the system is singular.
    pub solution: Option<Vec<f64>>,
}

impl CaseResult {
    /// File name stem: case name, `_d` for a kept degenerate operator,
    /// `_r` for a reordered one.
    pub fn output_stem(&self) -> String {
        output_stem(&self.name, self.degenerate, self.reordered.is_some())
    }

    /// System handed to the linear solver: the reordered one when present.
    pub fn output_system(&self) -> &LinearSystem {
        self.reordered
            .as_ref()
            .map_or(&self.system, |r| &r.system)
    }

    /// Solution in natural node order.
    pub fn natural_solution(&self) -> Option<Vec<f64>> {
        let x = self.solution.as_ref()?;
        Some(match &self.reordered {
            Some(r) => r.restore(x),
            None => x.clone(),
        })
    }
}

pub fn output_stem(name: &str, degenerate: bool, reordered: bool) -> String {
    let mut stem = name.to_string();
    if degenerate {
        stem.push_str("_d");
    }
    if reordered {
        stem.push_str("_r");
    }
    stem
}

/// Validated boundary descriptions for the axes of `config`.
pub fn boundaries(config: &CaseConfig) -> LqlesResult<Vec<AxisBoundary>> {
    config
        .axes()?
        .into_iter()
        .map(|(axis, mesh)| {
            let pair = validate(&mesh.btype, axis)?;
            let boundary = AxisBoundary::new(pair, mesh.bvalue);
            Ok(match mesh.degfix {
                Some(row) => boundary.with_degeneracy_row(row),
                None => boundary,
            })
        })
        .collect()
}

/// Run one case end to end. All configuration errors surface before any
/// numeric work.
pub fn run_case(config: &CaseConfig, options: &CaseOptions) -> LqlesResult<CaseResult> {
    config.validate()?;
    let bcs = boundaries(config)?;
    let specs = config
        .axes()?
        .into_iter()
        .map(|(_, mesh)| mesh.axis_spec())
        .collect::<LqlesResult<Vec<_>>>()?;
    for spec in &specs {
        lqles_math::mesh::validate_axis_spec(spec)?;
    }

    log::info!(
        "case {}: {}D, nodes {:?}",
        config.name,
        config.dimension,
        specs.iter().map(|s| s.total_nodes).collect::<Vec<_>>()
    );

    let coords = specs
        .iter()
        .map(generate_mesh)
        .collect::<LqlesResult<Vec<_>>>()?;
    let extents: Vec<usize> = coords.iter().map(|x| x.len()).collect();
    let grid = Grid::new(&extents)?;

    let system = assemble(&coords, &bcs, config.force, config.degenerate)?;
    log::info!("case {}: assembled {} unknowns, nnz = {}", config.name, system.len(), system.a.nnz());

    let reordered = if config.reorder {
        Some(reorder(&system, &grid)?)
    } else {
        None
    };

    let mut result = CaseResult {
        name: config.name.clone(),
        grid,
        coords,
        system,
        degenerate: config.degenerate,
        reordered,
        solution: None,
    };

    if options.solve {
        let target = result.output_system();
        let solution = match solve_dense(&target.a, &target.b) {
            Ok(x) => {
                log::info!(
                    "case {}: solved, residual {:.3e}",
                    result.name,
                    target.residual_max(&x)
                );
                Some(x)
            }
            Err(LqlesError::LinAlg(msg)) => {
                log::warn!("case {}: no reference solution ({msg})", result.name);
                None
            }
            Err(e) => return Err(e),
        };
        result.solution = solution;
    }

    Ok(result)
}
