//! Property-based tests for lqles-types using proptest.
//!
//! Covers: boundary token vocabulary, cluster type codes, case config
//! validation.

use lqles_types::axis::{Axis, ClusterType};
use lqles_types::boundary::{BoundaryPair, BoundaryType};
use lqles_types::config::CaseConfig;
use proptest::prelude::*;

fn boundary_type() -> impl Strategy<Value = BoundaryType> {
    prop_oneof![
        Just(BoundaryType::Dirichlet),
        Just(BoundaryType::Neumann),
        Just(BoundaryType::Periodic),
        Just(BoundaryType::Symmetry),
    ]
}

// ── Boundary Vocabulary ──────────────────────────────────────────────

proptest! {
    /// Every token other than D, N, R, S is rejected.
    #[test]
    fn unknown_tokens_rejected(token in "[A-Za-z]{1,3}") {
        let known = matches!(token.as_str(), "D" | "N" | "R" | "S");
        prop_assert_eq!(BoundaryType::from_token(&token).is_some(), known);
    }

    /// A pair is periodic exactly when both ends repeat.
    #[test]
    fn periodic_pair_needs_both_ends(low in boundary_type(), high in boundary_type()) {
        let pair = BoundaryPair::new(low, high);
        prop_assert_eq!(
            pair.is_periodic(),
            low == BoundaryType::Periodic && high == BoundaryType::Periodic
        );
        prop_assert_eq!(
            pair.has_dirichlet(),
            low == BoundaryType::Dirichlet || high == BoundaryType::Dirichlet
        );
    }
}

// ── Cluster Codes ────────────────────────────────────────────────────

proptest! {
    /// Only 1, 2 and -1 name a cluster type.
    #[test]
    fn cluster_codes(code in -5i32..6) {
        match ClusterType::from_code(code) {
            Ok(ct) => prop_assert_eq!(ct.code(), code),
            Err(e) => {
                prop_assert!(![1, 2, -1].contains(&code));
                prop_assert!(e.is_config());
            }
        }
    }
}

// ── Case Config ──────────────────────────────────────────────────────

proptest! {
    /// A case validates iff its dimension is 1..=3 and the first
    /// `dimension` axes are present.
    #[test]
    fn dimension_matches_axes(dimension in 0usize..5, present in 1usize..4) {
        let axis = r#"{ "length": 1.0, "ntotal": 4, "btype": ["D", "D"] }"#;
        let mut mesh = format!(r#""x": {axis}"#);
        for name in Axis::ALL.iter().skip(1).take(present - 1) {
            mesh.push_str(&format!(r#", "{name}": {axis}"#));
        }
        let json = format!(
            r#"{{ "name": "p", "dimension": {dimension}, "force": 1.0, "mesh": {{ {mesh} }} }}"#
        );
        let ok = (1..=3).contains(&dimension) && dimension <= present;
        prop_assert_eq!(CaseConfig::from_json_str(&json).is_ok(), ok);
    }
}
