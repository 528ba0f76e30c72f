// ─────────────────────────────────────────────────────────────────────
// L-QLES — Boundary
// Copyright 2024 Rolls-Royce plc
// License: BSD 3-Clause
// ─────────────────────────────────────────────────────────────────────
//! Boundary condition validation.
//!
//! Each axis carries one token per end from {D, N, R, S}. A repeating
//! (periodic) end only makes sense when the opposite end repeats too.

use lqles_types::axis::Axis;
use lqles_types::boundary::{BoundaryPair, BoundaryType};
use lqles_types::error::{LqlesError, LqlesResult};

/// Parse and validate the two boundary tokens of `axis`.
///
/// Surrounding whitespace is ignored. Unknown tokens and a one-sided
/// periodic pairing are rejected.
pub fn validate<S: AsRef<str>>(tokens: &[S; 2], axis: Axis) -> LqlesResult<BoundaryPair> {
    let parse = |token: &str| {
        let token = token.trim();
        BoundaryType::from_token(token).ok_or_else(|| LqlesError::InvalidBoundary {
            axis: axis.to_string(),
            token: token.to_string(),
        })
    };
    let pair = BoundaryPair::new(parse(tokens[0].as_ref())?, parse(tokens[1].as_ref())?);
    check_pairing(&pair, axis)?;
    Ok(pair)
}

/// Fails when exactly one end of the pair is periodic.
pub fn check_pairing(pair: &BoundaryPair, axis: Axis) -> LqlesResult<()> {
    let low_periodic = pair.low == BoundaryType::Periodic;
    let high_periodic = pair.high == BoundaryType::Periodic;
    if low_periodic != high_periodic {
        return Err(LqlesError::MismatchedPeriodic {
            axis: axis.to_string(),
            low: pair.low.to_string(),
            high: pair.high.to_string(),
        });
    }
    Ok(())
}
