//! Splitting the `a_n` coefficient space into per-worker tiles.
//!
//! Tile sizes are given per leading `poly_a` term. Worker `i` keeps
//! `[i·tile, (i+1)·tile)` of each tiled term and the last worker takes the
//! remainder through the end of the term. Untiled terms are shared in full.

use tracing::warn;

use crate::error::SearchError;
use crate::series::CompactPolynomial;

/// Even split of the first term: `len / workers` values per worker.
pub fn default_tile_sizes(poly_a: &CompactPolynomial, workers: usize) -> Vec<usize> {
    let first = poly_a.terms().first().map_or(0, Vec::len);
    vec![first / workers.max(1)]
}

/// The slice of `poly_a` owned by worker `index` of `workers`.
///
/// Slices past the end of a term are empty; such a worker enumerates
/// nothing.
pub fn partition(
    poly_a: &CompactPolynomial,
    tile_sizes: &[usize],
    workers: usize,
    index: usize,
) -> CompactPolynomial {
    let mut sliced = poly_a.clone();
    for (dim, (&tile, term)) in tile_sizes.iter().zip(poly_a.terms()).enumerate() {
        let start = index.saturating_mul(tile).min(term.len());
        let end = if index + 1 >= workers {
            term.len()
        } else {
            (index + 1).saturating_mul(tile).min(term.len())
        };
        sliced = sliced.with_term(dim, term[start..end.max(start)].to_vec());
    }
    sliced
}

/// Total assignments enumerated across all workers. Equal to
/// `poly_a.assignment_count()` exactly when the tiles neither overlap nor
/// leave gaps.
pub fn coverage(poly_a: &CompactPolynomial, tile_sizes: &[usize], workers: usize) -> u64 {
    (0..workers)
        .map(|i| partition(poly_a, tile_sizes, workers, i).assignment_count())
        .fold(0u64, u64::saturating_add)
}

/// Reject partitions that cannot be applied; warn about ones that cover the
/// space unevenly.
pub fn validate_partition(
    poly_a: &CompactPolynomial,
    tile_sizes: &[usize],
    workers: usize,
) -> Result<(), SearchError> {
    if workers == 0 {
        return Err(SearchError::MisconfiguredPartition("worker count must be > 0".into()));
    }
    if tile_sizes.len() > poly_a.terms().len() {
        return Err(SearchError::MisconfiguredPartition(format!(
            "{} tile sizes given but poly_a has {} terms",
            tile_sizes.len(),
            poly_a.terms().len()
        )));
    }
    let covered = coverage(poly_a, tile_sizes, workers);
    let full = poly_a.assignment_count();
    if covered != full {
        warn!(
            covered,
            full,
            workers,
            ?tile_sizes,
            "tiles do not cover the a_n space exactly once"
        );
    }
    Ok(())
}
