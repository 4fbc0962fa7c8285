//! Search configuration.
//!
//! Every knob of a run lives in [`SearchConfig`]. It can be loaded from a
//! TOML file and is then overridden field by field by CLI flags.
//!
//! # Example Configuration
//!
//! ```toml
//! constant = "e"
//! lhs_limit = 2
//! poly_a = [[1], [1]]
//! poly_b = [[1], [1]]
//! workers = 4
//! tile_sizes = [1]
//! snapshot = "/tmp/e-limit2.lhs"
//! bn_generator = "shifted:1"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::lhs::MAX_KEY_DIGITS;
use crate::numeric::Constant;
use crate::series::{CompactPolynomial, GeneratorKind};

/// Upper bound on `enum_dps` and `verify_dps`.
pub const MAX_DPS: u32 = 100_000;

/// Errors that can occur when loading or validating a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Could not determine cache directory")]
    NoCacheDir,

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Full configuration of a search run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Constant the LHS transforms are applied to.
    pub constant: Constant,
    /// `a, b ∈ [0, lhs_limit]`, `c, d ∈ [-lhs_limit, lhs_limit]`.
    pub lhs_limit: i64,
    /// Compact polynomial for the `a_n` side.
    pub poly_a: Option<CompactPolynomial>,
    /// Compact polynomial for the `b_n` side (searched with and without sign flip).
    pub poly_b: Option<CompactPolynomial>,
    /// Key granularity; keys keep `-log10(threshold)` decimal digits.
    pub threshold: f64,
    /// Digits of the constant used while building the table and enumerating.
    pub enum_dps: u32,
    /// Digits of the constant used during verification.
    pub verify_dps: u32,
    /// Significant digits that must agree for a match to be confirmed.
    pub confirm_digits: u32,
    /// Sequence length during the first-phase enumeration.
    pub enum_terms: usize,
    /// Sequence length during verification.
    pub verify_terms: usize,
    /// Number of workers in the pool.
    pub workers: usize,
    /// Tile size per leading `poly_a` dimension; defaults to an even split
    /// of the first dimension.
    pub tile_sizes: Option<Vec<usize>>,
    pub an_generator: GeneratorKind,
    pub bn_generator: GeneratorKind,
    /// Persisted LHS table; built and written here when missing.
    pub snapshot: Option<PathBuf>,
    /// Show a progress bar for worker 0 when stderr is a terminal.
    pub progress: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            constant: Constant::Pi,
            lhs_limit: 5,
            poly_a: None,
            poly_b: None,
            threshold: 1e-10,
            enum_dps: 50,
            verify_dps: 2000,
            confirm_digits: 100,
            enum_terms: 32,
            verify_terms: 1000,
            workers: 1,
            tile_sizes: None,
            an_generator: GeneratorKind::Horner,
            bn_generator: GeneratorKind::Horner,
            snapshot: None,
            progress: true,
        }
    }
}

impl SearchConfig {
    /// Load a configuration file. Unlike optional user config, a path given
    /// explicitly must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Digits kept in a table key, `round(-log10(threshold))`.
    pub fn key_digits(&self) -> u32 {
        (-self.threshold.log10()).round() as u32
    }

    /// Tolerance digits for the constant-independence check during
    /// verification.
    pub fn verify_independence_digits(&self) -> u32 {
        (self.verify_dps / 20).max(1)
    }

    /// Both polynomials, or a validation error naming the missing one.
    pub fn polynomials(&self) -> Result<(&CompactPolynomial, &CompactPolynomial), ConfigError> {
        let poly_a = self
            .poly_a
            .as_ref()
            .ok_or_else(|| ConfigError::Validation("poly_a is required for a search".into()))?;
        let poly_b = self
            .poly_b
            .as_ref()
            .ok_or_else(|| ConfigError::Validation("poly_b is required for a search".into()))?;
        Ok((poly_a, poly_b))
    }

    /// Validate everything except the presence of the polynomials, which
    /// only a search needs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |msg: String| Err(ConfigError::Validation(msg));

        if self.lhs_limit < 1 {
            return fail(format!("lhs_limit must be >= 1, got {}", self.lhs_limit));
        }
        if !(self.threshold > 0.0 && self.threshold < 1.0) {
            return fail(format!("threshold must be in (0, 1), got {}", self.threshold));
        }
        if self.key_digits() > MAX_KEY_DIGITS {
            return fail(format!(
                "threshold {} keeps {} key digits; at most {MAX_KEY_DIGITS} fit in a table key",
                self.threshold,
                self.key_digits()
            ));
        }
        for (name, dps) in [("enum_dps", self.enum_dps), ("verify_dps", self.verify_dps)] {
            if dps > MAX_DPS {
                return fail(format!("{name} must be <= {MAX_DPS}, got {dps}"));
            }
        }
        if self.enum_dps <= self.key_digits() {
            return fail(format!(
                "enum_dps ({}) must exceed the key digits ({})",
                self.enum_dps,
                self.key_digits()
            ));
        }
        if self.confirm_digits == 0 || self.confirm_digits > self.verify_dps {
            return fail(format!(
                "confirm_digits must be in 1..={} (verify_dps), got {}",
                self.verify_dps, self.confirm_digits
            ));
        }
        if self.enum_terms < 2 {
            return fail(format!("enum_terms must be >= 2, got {}", self.enum_terms));
        }
        if self.verify_terms < self.enum_terms {
            return fail(format!(
                "verify_terms ({}) must be >= enum_terms ({})",
                self.verify_terms, self.enum_terms
            ));
        }
        if self.workers == 0 {
            return fail("workers must be > 0".into());
        }
        for (name, poly) in [("poly_a", &self.poly_a), ("poly_b", &self.poly_b)] {
            if let Some(poly) = poly {
                poly.check_non_empty()
                    .map_err(|e| ConfigError::Validation(format!("{name}: {e}")))?;
            }
        }
        Ok(())
    }
}

/// Directory for LHS table snapshots.
///
/// Uses XDG conventions:
/// - Primary: `$XDG_CACHE_HOME/gcf-search/tables`
/// - Fallback: platform cache dir (e.g. `~/.cache/gcf-search/tables` on Linux)
pub fn default_snapshot_dir() -> Result<PathBuf, ConfigError> {
    if let Ok(xdg_cache) = std::env::var("XDG_CACHE_HOME") {
        return Ok(PathBuf::from(xdg_cache).join("gcf-search").join("tables"));
    }

    dirs::cache_dir()
        .map(|p| p.join("gcf-search").join("tables"))
        .ok_or(ConfigError::NoCacheDir)
}
