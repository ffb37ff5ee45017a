/// Precomputed percentile values for a dataset.
///
/// Percentiles use linear interpolation between the two nearest ranks, and
/// non-finite values are ignored.
///
/// # Examples
///
/// ```
/// use metstat_stats::percentiles::Percentiles;
///
/// let values = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
/// let percentiles = Percentiles::new(&values, &[25.0, 50.0, 75.0]);
///
/// assert_eq!(percentiles.get(50.0), Some(5.5));
/// assert_eq!(percentiles.get(25.0), Some(3.25));
/// ```
#[derive(Debug, Clone)]
pub struct Percentiles {
    /// (percentile, value) pairs in the order they were requested.
    values: Vec<(f64, f64)>,
}

impl Percentiles {
    /// Computes percentiles from sorted finite values.
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order.
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64], percentile_points: &[f64]) -> Self {
        assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );

        let values = percentile_points
            .iter()
            .map(|&p| (p, compute_percentile(sorted_values, p)))
            .collect();
        Self { values }
    }

    /// Computes percentiles from unsorted values, skipping non-finite ones.
    #[must_use]
    pub fn new(values: &[f64], percentile_points: &[f64]) -> Self {
        let mut sorted = values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .collect::<Vec<_>>();
        sorted.sort_by(f64::total_cmp);
        Self::from_sorted(&sorted, percentile_points)
    }

    /// Gets the value at a precomputed percentile.
    ///
    /// ```
    /// use metstat_stats::percentiles::Percentiles;
    ///
    /// let percentiles = Percentiles::new(&[1.0, 2.0, 3.0], &[50.0]);
    /// assert_eq!(percentiles.get(50.0), Some(2.0));
    /// assert_eq!(percentiles.get(25.0), None);
    /// ```
    #[must_use]
    pub fn get(&self, percentile: f64) -> Option<f64> {
        self.values
            .iter()
            .find(|(p, _)| (*p - percentile).abs() < 1e-9)
            .map(|(_, value)| *value)
    }

    /// Returns all percentile-value pairs as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[(f64, f64)] {
        &self.values
    }
}

/// Computes a single linearly interpolated percentile from sorted data.
///
/// For `n` values the percentile `p` sits at fractional rank
/// `p / 100 * (n - 1)`; the result interpolates between the neighbouring
/// ranks. Returns `NaN` for empty input.
///
/// ```
/// use metstat_stats::percentiles::compute_percentile;
///
/// let values = [1.0, 2.0, 3.0, 4.0, 5.0];
/// assert_eq!(compute_percentile(&values, 50.0), 3.0);
/// assert_eq!(compute_percentile(&values, 25.0), 2.0);
/// assert_eq!(compute_percentile(&values, 62.5), 3.5);
/// assert_eq!(compute_percentile(&values, 100.0), 5.0);
/// ```
#[expect(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]
#[must_use]
pub fn compute_percentile(sorted_values: &[f64], percentile: f64) -> f64 {
    let Some(&last) = sorted_values.last() else {
        return f64::NAN;
    };
    let rank = (percentile.clamp(0.0, 100.0) / 100.0) * (sorted_values.len() - 1) as f64;
    let lower = rank.floor() as usize;
    if lower + 1 >= sorted_values.len() {
        return last;
    }
    let fraction = rank - rank.floor();
    let low = sorted_values[lower];
    let high = sorted_values[lower + 1];
    low + (high - low) * fraction
}
