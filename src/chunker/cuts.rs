use crate::float_types::Real;

/// Parse a comma-separated list of cut coordinates.
///
/// Tokens are trimmed; empty, unparsable and non-finite tokens are dropped.
/// The result is sorted ascending with exact duplicates removed, so
/// `"5, 5, abc, 5.0"` becomes `[5.0]`. An empty result is for the caller to refuse.
pub fn parse_cut_coordinates(input: &str) -> Vec<Real> {
    normalize_cuts(
        input
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .filter_map(|token| token.parse::<Real>().ok()),
    )
}

/// Drop non-finite values, sort ascending and remove exact duplicates.
pub fn normalize_cuts(cuts: impl IntoIterator<Item = Real>) -> Vec<Real> {
    let mut cuts: Vec<Real> = cuts.into_iter().filter(|value| value.is_finite()).collect();
    cuts.sort_by(Real::total_cmp);
    // -0.0 and 0.0 count as one cut
    cuts.dedup_by(|a, b| a == b);
    cuts
}
