//! Boundary condition vocabulary shared by validation and assembly.

use std::fmt;

/// Boundary condition applied at one end of an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundaryType {
    /// Fixed value (`D`).
    Dirichlet,
    /// Fixed normal gradient (`N`).
    Neumann,
    /// Wrap-around to the opposite end (`R`, "repeating").
    Periodic,
    /// Mirror plane, i.e. zero-gradient Neumann (`S`).
    Symmetry,
}

impl BoundaryType {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "D" => Some(BoundaryType::Dirichlet),
            "N" => Some(BoundaryType::Neumann),
            "R" => Some(BoundaryType::Periodic),
            "S" => Some(BoundaryType::Symmetry),
            _ => None,
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            BoundaryType::Dirichlet => "D",
            BoundaryType::Neumann => "N",
            BoundaryType::Periodic => "R",
            BoundaryType::Symmetry => "S",
        }
    }

    /// Neumann and Symmetry share the zero-flux mirrored stencil.
    pub fn is_flux(self) -> bool {
        matches!(self, BoundaryType::Neumann | BoundaryType::Symmetry)
    }
}

impl fmt::Display for BoundaryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// End of an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Low,
    High,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Low, Side::High];

    pub fn index(self) -> usize {
        match self {
            Side::Low => 0,
            Side::High => 1,
        }
    }
}

/// Boundary types at the low and high ends of one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryPair {
    pub low: BoundaryType,
    pub high: BoundaryType,
}

impl BoundaryPair {
    pub fn new(low: BoundaryType, high: BoundaryType) -> Self {
        BoundaryPair { low, high }
    }

    pub fn side(&self, side: Side) -> BoundaryType {
        match side {
            Side::Low => self.low,
            Side::High => self.high,
        }
    }

    pub fn is_periodic(&self) -> bool {
        self.low == BoundaryType::Periodic && self.high == BoundaryType::Periodic
    }

    pub fn has_dirichlet(&self) -> bool {
        self.low == BoundaryType::Dirichlet || self.high == BoundaryType::Dirichlet
    }
}

/// Complete boundary description for one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisBoundary {
    pub pair: BoundaryPair,
    /// Boundary values at the low and high ends. Ignored for Symmetry
    /// and Periodic ends.
    pub values: [f64; 2],
    /// Node index along this axis pinned by the degeneracy fix.
    pub degeneracy_row: Option<usize>,
}

impl AxisBoundary {
    pub fn new(pair: BoundaryPair, values: [f64; 2]) -> Self {
        AxisBoundary {
            pair,
            values,
            degeneracy_row: None,
        }
    }

    pub fn with_degeneracy_row(mut self, row: usize) -> Self {
        self.degeneracy_row = Some(row);
        self
    }

    pub fn value(&self, side: Side) -> f64 {
        self.values[side.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_roundtrip() {
        for token in ["D", "N", "R", "S"] {
            let bc = BoundaryType::from_token(token).unwrap();
            assert_eq!(bc.token(), token);
        }
        assert!(BoundaryType::from_token("X").is_none());
        assert!(BoundaryType::from_token("d").is_none());
    }

    #[test]
    fn test_pair_queries() {
        let pair = BoundaryPair::new(BoundaryType::Dirichlet, BoundaryType::Neumann);
        assert!(pair.has_dirichlet());
        assert!(!pair.is_periodic());
        assert_eq!(pair.side(Side::High), BoundaryType::Neumann);

        let periodic = BoundaryPair::new(BoundaryType::Periodic, BoundaryType::Periodic);
        assert!(periodic.is_periodic());
        assert!(!periodic.has_dirichlet());
    }
}
