//! Human-readable and JSON renderings of a finished search.

use std::fmt::Write as _;

use serde::Serialize;

use crate::config::SearchConfig;
use crate::model::ConfirmedResult;
use crate::series::{CompactPolynomial, GeneratorKind, Generators};

/// Terms shown in the continued-fraction preview.
const PREVIEW_DEPTH: usize = 4;
/// Terms used for the floating-point value preview.
const VALUE_TERMS: usize = 200;

/// Everything a consumer needs to rebuild and re-evaluate the identities.
#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub constant: String,
    pub lhs_limit: i64,
    pub poly_a: CompactPolynomial,
    pub poly_b: CompactPolynomial,
    pub an_generator: GeneratorKind,
    pub bn_generator: GeneratorKind,
    pub results: Vec<ConfirmedResult>,
}

impl SearchReport {
    /// `None` when the config has no polynomials (it was never searchable).
    pub fn new(config: &SearchConfig, results: Vec<ConfirmedResult>) -> Option<Self> {
        Some(Self {
            constant: config.constant.to_string(),
            lhs_limit: config.lhs_limit,
            poly_a: config.poly_a.clone()?,
            poly_b: config.poly_b.clone()?,
            an_generator: config.an_generator,
            bn_generator: config.bn_generator,
            results,
        })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn render_text(&self) -> String {
        let generators = Generators::new(self.an_generator, self.bn_generator);
        let mut out = String::new();
        let _ = writeln!(
            out,
            "constant {} | lhs limit {} | poly_a {} | poly_b {}",
            self.constant, self.lhs_limit, self.poly_a, self.poly_b
        );
        if self.results.is_empty() {
            out.push_str("no identity found\n");
            return out;
        }
        for result in &self.results {
            let value = result
                .evaluate(VALUE_TERMS, &generators)
                .map_or_else(|| "undefined".to_string(), |v| format!("{:.15}", v.to_f64()));
            let _ = writeln!(
                out,
                "{} [x = {}] = {}  a_n {:?}  b_n {:?}  ≈ {}",
                result.lhs,
                self.constant,
                cf_preview(result, &generators),
                result.an_coefficients,
                result.bn_coefficients,
                value
            );
        }
        let _ = writeln!(out, "{} identities", self.results.len());
        out
    }
}

/// `a0 + b0/(a1 + b1/(a2 + …))` with the first few terms spelled out.
pub fn cf_preview(result: &ConfirmedResult, generators: &Generators) -> String {
    let Some((an, bn)) = result.sequences(PREVIEW_DEPTH, generators) else {
        return "…".to_string();
    };
    let mut text = String::new();
    for (i, a) in an.iter().enumerate() {
        if i > 0 {
            let _ = write!(text, "{}/(", bn[i - 1]);
        }
        let _ = write!(text, "{a} + ");
    }
    text.push('…');
    text.push_str(&")".repeat(an.len().saturating_sub(1)));
    text
}
