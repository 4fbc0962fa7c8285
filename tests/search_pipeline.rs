//! End-to-end search scenarios.
//!
//! Every test runs the real pipeline: table build, first-phase enumeration,
//! high-precision verification and (where relevant) the worker pool.

use gcf_search::config::SearchConfig;
use gcf_search::lhs::{LhsTable, TableParams};
use gcf_search::model::ConfirmedResult;
use gcf_search::numeric::{Constant, MobiusTransform};
use gcf_search::search::{MatchingEngine, run_search};
use gcf_search::series::{GeneratorKind, Generators};
use tempfile::TempDir;

mod util;

use util::{TestTracing, poly, search_config};

fn four_over_pi() -> ConfirmedResult {
    ConfirmedResult {
        lhs: MobiusTransform::new(0, 4, 1, 0),
        an_coefficients: vec![2, 1],
        bn_coefficients: vec![1, 2, 1],
    }
}

// =============================================================================
// KNOWN IDENTITIES
// =============================================================================

/// 4/pi = 1 + 1²/(3 + 2²/(5 + 3²/(7 + …))) is found with an LHS limit of 4.
#[test]
fn finds_four_over_pi() {
    let config = search_config(Constant::Pi, 4, poly(&[&[2], &[1]]), poly(&[&[1], &[2], &[1]]));
    assert_eq!(run_search(&config).unwrap(), vec![four_over_pi()]);
}

/// The same identity is the only survivor of a slightly wider space.
#[test]
fn four_over_pi_is_unique_in_wider_space() {
    let config = search_config(
        Constant::Pi,
        4,
        poly(&[&[1, 2], &[1]]),
        poly(&[&[1], &[1, 2], &[1]]),
    );
    assert_eq!(run_search(&config).unwrap(), vec![four_over_pi()]);
}

/// Numerator 4 is outside an LHS limit of 3, so nothing is confirmed.
#[test]
fn range_excluding_the_transform_finds_nothing() {
    let config = search_config(
        Constant::Pi,
        3,
        poly(&[&[1, 2], &[1]]),
        poly(&[&[1], &[1, 2], &[1]]),
    );
    assert!(run_search(&config).unwrap().is_empty());
}

/// 1/(e - 2) = 1 + 1/(2 + 2/(3 + 3/(4 + …))).
#[test]
fn finds_inverse_e_minus_two() {
    let config = search_config(Constant::E, 2, poly(&[&[1], &[1]]), poly(&[&[1], &[1]]));
    let results = run_search(&config).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].lhs, MobiusTransform::new(0, 1, 1, -2));
    assert_eq!(results[0].an_coefficients, vec![1, 1]);
    assert_eq!(results[0].bn_coefficients, vec![1, 1]);

    let limit_one = SearchConfig {
        lhs_limit: 1,
        ..config
    };
    assert!(run_search(&limit_one).unwrap().is_empty());
}

/// Both e identities of a 3×3 coefficient grid, in enumeration order; the
/// second only appears through the negated b_n side.
#[test]
fn e_grid_finds_both_identities_in_order() {
    let grid = poly(&[&[0, 1, 2], &[0, 1, 2]]);
    let config = search_config(Constant::E, 2, grid.clone(), grid);
    let results = run_search(&config).unwrap();
    let summary: Vec<_> = results
        .iter()
        .map(|r| (r.lhs, r.an_coefficients.clone(), r.bn_coefficients.clone()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (MobiusTransform::new(0, 1, 1, -2), vec![1, 1], vec![1, 1]),
            (MobiusTransform::new(1, 0, 1, -1), vec![1, 2], vec![-1, -1]),
        ]
    );

    // With limit 1 only e/(e - 1) remains reachable.
    let limit_one = SearchConfig {
        lhs_limit: 1,
        ..config
    };
    let results = run_search(&limit_one).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].lhs, MobiusTransform::new(1, 0, 1, -1));
}

// =============================================================================
// ENGINE PROPERTIES
// =============================================================================

/// No first-phase match ever carries a b_n sequence containing a zero.
#[test]
fn zero_terms_never_reach_a_match() {
    let params = TableParams {
        constant: Constant::E,
        lhs_limit: 2,
        key_digits: 10,
        enum_dps: 50,
    };
    let table = LhsTable::from_params(&params).unwrap();
    let generators = Generators::default();
    let engine = MatchingEngine::new(&table, &generators, 32);

    // b_n = n + c vanishes at n = -c for every c <= 0.
    let poly_b = poly(&[&[1], &[-3, -2, -1, 0, 1, 2]]);
    for poly_a in [poly(&[&[1], &[1]]), poly(&[&[0, 1, 2], &[0, 1, 2]]), poly(&[&[1, 2], &[0, 1, 2, 3]])] {
        for m in engine.find_matches(&poly_a, &poly_b) {
            let (an, bn) = m.sequences(32, &generators).unwrap();
            assert!(!bn.contains(&0), "{m:?} has a zero b_n term");
            assert!(!an.contains(&0), "{m:?} has a zero a_n term");
        }
    }
}

#[test]
fn enumeration_is_idempotent() {
    let table = LhsTable::from_params(&TableParams {
        constant: Constant::Pi,
        lhs_limit: 4,
        key_digits: 10,
        enum_dps: 50,
    })
    .unwrap();
    let generators = Generators::default();
    let engine = MatchingEngine::new(&table, &generators, 32);
    let poly_a = poly(&[&[0, 1, 2], &[-1, 0, 1, 2]]);
    let poly_b = poly(&[&[0, 1], &[0, 1, 2], &[0, 1]]);
    assert_eq!(engine.find_matches(&poly_a, &poly_b), engine.find_matches(&poly_a, &poly_b));
}

// =============================================================================
// WORKER POOL
// =============================================================================

#[test]
fn multi_worker_search_matches_single_worker() {
    let grid = poly(&[&[0, 1, 2], &[0, 1, 2]]);
    let single = search_config(Constant::E, 2, grid.clone(), grid);
    let expected = run_search(&single).unwrap();

    for workers in [2, 3, 5] {
        let config = SearchConfig {
            workers,
            ..single.clone()
        };
        assert_eq!(run_search(&config).unwrap(), expected, "workers = {workers}");
    }
}

#[test]
fn explicit_tiles_over_two_dimensions_still_run() {
    let grid = poly(&[&[0, 1, 2], &[0, 1, 2]]);
    let config = SearchConfig {
        workers: 3,
        tile_sizes: Some(vec![1, 1]),
        ..search_config(Constant::E, 2, grid.clone(), grid)
    };
    // Worker i owns only the diagonal cell (i, i): (1, 1) holds 1/(e - 2).
    let results = run_search(&config).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].lhs, MobiusTransform::new(0, 1, 1, -2));
}

#[test]
fn too_many_tile_dimensions_is_rejected() {
    let config = SearchConfig {
        workers: 2,
        tile_sizes: Some(vec![1, 1, 1]),
        ..search_config(Constant::E, 2, poly(&[&[1], &[1]]), poly(&[&[1], &[1]]))
    };
    let err = run_search(&config).unwrap_err();
    assert_eq!(err.kind(), "misconfigured_partition");
}

// =============================================================================
// SNAPSHOTS, GENERATORS, LOGGING
// =============================================================================

#[test]
fn snapshot_backed_search_matches_in_memory_search() {
    let dir = TempDir::new().unwrap();
    let config = search_config(Constant::Pi, 4, poly(&[&[2], &[1]]), poly(&[&[1], &[2], &[1]]));
    let with_snapshot = SearchConfig {
        snapshot: Some(dir.path().join("pi-4.lhs")),
        workers: 2,
        ..config.clone()
    };
    // First run builds and writes the snapshot, the second reuses it.
    assert_eq!(run_search(&with_snapshot).unwrap(), vec![four_over_pi()]);
    assert!(dir.path().join("pi-4.lhs").exists());
    assert_eq!(run_search(&with_snapshot).unwrap(), run_search(&config).unwrap());
}

/// a_n = 2(n + 1) - 1 written as a shifted polynomial.
#[test]
fn shifted_generator_reaches_the_same_identity() {
    let config = SearchConfig {
        an_generator: GeneratorKind::Shifted { offset: 1 },
        ..search_config(Constant::Pi, 4, poly(&[&[2], &[-1]]), poly(&[&[1], &[2], &[1]]))
    };
    let results = run_search(&config).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].lhs, MobiusTransform::new(0, 4, 1, 0));
    assert_eq!(results[0].an_coefficients, vec![2, -1]);
}

#[test]
fn search_logs_phase_timings() {
    let tracing = TestTracing::new();
    let _guard = tracing.install();
    let config = search_config(Constant::E, 2, poly(&[&[1], &[1]]), poly(&[&[1], &[1]]));
    run_search(&config).unwrap();
    tracing.assert_contains("built LHS table");
    tracing.assert_contains("first enumeration finished");
    tracing.assert_contains("verification finished");
    tracing.assert_contains("search finished");
}
