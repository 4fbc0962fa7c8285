//! Property tests for LHS table construction and persistence.

use gcf_search::lhs::{LhsTable, TableParams};
use gcf_search::numeric::Constant;
use proptest::prelude::*;
use tempfile::TempDir;

fn constant_strategy() -> impl Strategy<Value = Constant> {
    prop_oneof![
        Just(Constant::Pi),
        Just(Constant::E),
        Just(Constant::Phi),
        Just(Constant::Sqrt2),
        Just(Constant::Ln2),
        Just(Constant::Zeta3),
    ]
}

fn params(constant: Constant, lhs_limit: i64, key_digits: u32) -> TableParams {
    TableParams {
        constant,
        lhs_limit,
        key_digits,
        enum_dps: 40,
    }
}

/// Number of `(a, b, c, d)` tuples the build considers.
fn candidate_count(lhs_limit: i64) -> usize {
    let numerators = (lhs_limit + 1) as usize;
    let denominators = (2 * lhs_limit + 1) as usize;
    numerators * numerators * denominators * denominators
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn every_entry_passes_the_filters(
        constant in constant_strategy(),
        lhs_limit in 1i64..=3,
        key_digits in 6u32..=12,
    ) {
        let p = params(constant, lhs_limit, key_digits);
        let table = LhsTable::from_params(&p).unwrap();
        let x = p.constant.approximate(p.enum_dps).unwrap();

        prop_assert!(table.len() <= candidate_count(lhs_limit));
        for (key, t) in table.iter() {
            prop_assert!(t.is_reduced(), "{} is not reduced", t);
            prop_assert!((0..=lhs_limit).contains(&t.a) && (0..=lhs_limit).contains(&t.b));
            prop_assert!((-lhs_limit..=lhs_limit).contains(&t.c) && (-lhs_limit..=lhs_limit).contains(&t.d));
            let value = t.apply(&x);
            prop_assert!(value.is_some(), "{} has a pole at the constant", t);
            let value = value.unwrap();
            prop_assert!(!value.is_zero());
            prop_assert!(!t.is_constant_independent(&value, p.independence_digits()));
            prop_assert_eq!(value.truncated_key(key_digits), Some(key));
        }
    }

    #[test]
    fn key_set_grows_with_the_range(
        constant in constant_strategy(),
        lhs_limit in 1i64..=2,
    ) {
        let small = LhsTable::from_params(&params(constant.clone(), lhs_limit, 10)).unwrap();
        let large = LhsTable::from_params(&params(constant, lhs_limit + 1, 10)).unwrap();
        prop_assert!(small.len() <= large.len());
        for (key, _) in small.iter() {
            prop_assert!(large.contains(key), "key {} lost when the range grew", key);
        }
    }

    #[test]
    fn snapshot_round_trip_preserves_equality(
        constant in constant_strategy(),
        lhs_limit in 1i64..=3,
    ) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("table.lhs");
        let table = LhsTable::from_params(&params(constant, lhs_limit, 10)).unwrap();
        table.save(&path).unwrap();
        let loaded = LhsTable::load(&path).unwrap();
        prop_assert_eq!(&loaded, &table);
        for (key, t) in table.iter() {
            prop_assert_eq!(loaded.lookup(key), Some(t));
        }
    }

    #[test]
    fn build_is_deterministic(
        constant in constant_strategy(),
        lhs_limit in 1i64..=3,
    ) {
        let a = LhsTable::from_params(&params(constant.clone(), lhs_limit, 10)).unwrap();
        let b = LhsTable::from_params(&params(constant, lhs_limit, 10)).unwrap();
        for (key, t) in a.iter() {
            prop_assert_eq!(b.lookup(key), Some(t));
        }
        prop_assert_eq!(a.len(), b.len());
    }
}

#[test]
fn decimal_literal_constant_builds_a_table() {
    let p = TableParams {
        constant: "2.718281828459045235360287471352662497757".parse().unwrap(),
        lhs_limit: 2,
        key_digits: 10,
        enum_dps: 40,
    };
    let from_literal = LhsTable::from_params(&p).unwrap();
    let from_name = LhsTable::from_params(&params(Constant::E, 2, 10)).unwrap();
    assert_eq!(from_literal, from_name);
}
