//! Fuzz target for the command-line value parsers: compact polynomials,
//! generator kinds and constants.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use gcf_search::numeric::Constant;
use gcf_search::series::{CompactPolynomial, GeneratorKind};

#[derive(Arbitrary, Debug)]
struct ParseInput {
    poly: String,
    generator: String,
    constant: String,
}

fuzz_target!(|input: ParseInput| {
    if let Ok(poly) = input.poly.parse::<CompactPolynomial>() {
        // A parsed polynomial always has at least one value per term.
        assert!(poly.check_non_empty().is_ok());
        let _ = poly.negated().assignment_count();
    }
    if let Ok(kind) = input.generator.parse::<GeneratorKind>() {
        assert_eq!(kind.to_string().parse::<GeneratorKind>(), Ok(kind));
    }
    if let Ok(constant) = input.constant.parse::<Constant>() {
        let _ = constant.approximate(20);
    }
});
