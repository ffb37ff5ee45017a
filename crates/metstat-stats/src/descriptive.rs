/// Descriptive statistics over the finite values of a dataset.
///
/// Non-finite values (`NaN`, `±inf`) are dropped before anything is computed,
/// so `count` may be smaller than the length of the input.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptiveStats {
    /// Number of finite values.
    pub count: usize,
    /// The minimum finite value.
    pub min: f64,
    /// The maximum finite value.
    pub max: f64,
    /// The arithmetic mean.
    pub mean: f64,
    /// The median; the mean of the two middle values for even counts.
    pub median: f64,
    /// The population variance (divides by `count`).
    pub variance: f64,
    /// The population standard deviation.
    pub std_dev: f64,
}

impl DescriptiveStats {
    /// Computes descriptive statistics from unsorted values.
    ///
    /// # Returns
    ///
    /// * `Some(DescriptiveStats)` - if at least one value is finite
    /// * `None` - otherwise
    ///
    /// # Examples
    ///
    /// ```
    /// # use metstat_stats::descriptive::DescriptiveStats;
    /// let values = [5.0, 2.0, 4.0, 1.0, 3.0, f64::INFINITY];
    /// let stats = DescriptiveStats::new(values).unwrap();
    /// assert_eq!(stats.min, 1.0);
    /// assert_eq!(stats.max, 5.0);
    /// assert_eq!(stats.median, 3.0);
    /// assert_eq!(stats.variance, 2.0);
    /// ```
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut values = values
            .into_iter()
            .filter(|v| v.is_finite())
            .collect::<Vec<_>>();
        values.sort_by(f64::total_cmp);
        Self::from_sorted(&values)
    }

    /// Computes descriptive statistics from pre-sorted finite values.
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order or contains
    /// a non-finite value.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64]) -> Option<Self> {
        assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );
        assert!(
            sorted_values.iter().all(|v| v.is_finite()),
            "values must be finite"
        );

        let min = *sorted_values.first()?;
        let max = *sorted_values.last()?;
        let count = sorted_values.len();
        let n = count as f64;
        let mean = sorted_values.iter().sum::<f64>() / n;
        let median = if count % 2 == 1 {
            sorted_values[count / 2]
        } else {
            f64::midpoint(sorted_values[count / 2 - 1], sorted_values[count / 2])
        };
        let variance = sorted_values
            .iter()
            .map(|v| (v - mean).powi(2))
            .sum::<f64>()
            / n;

        Some(Self {
            count,
            min,
            max,
            mean,
            median,
            variance,
            std_dev: variance.sqrt(),
        })
    }

    /// Returns the sample (Bessel-corrected) standard deviation.
    ///
    /// `None` when fewer than two finite values were available.
    ///
    /// ```
    /// # use metstat_stats::descriptive::DescriptiveStats;
    /// let stats = DescriptiveStats::new([1.0, 2.0, 3.0, 4.0]).unwrap();
    /// assert!((stats.sample_std_dev().unwrap() - 1.290_994_448_735_805_6).abs() < 1e-12);
    /// assert_eq!(DescriptiveStats::new([1.0]).unwrap().sample_std_dev(), None);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn sample_std_dev(&self) -> Option<f64> {
        if self.count < 2 {
            return None;
        }
        let n = self.count as f64;
        Some((self.variance * n / (n - 1.0)).sqrt())
    }
}

/// Mean of the finite values, `NaN` when there are none.
#[must_use]
pub fn finite_mean(values: &[f64]) -> f64 {
    DescriptiveStats::new(values.iter().copied()).map_or(f64::NAN, |s| s.mean)
}

/// Median of the finite values, `NaN` when there are none.
#[must_use]
pub fn finite_median(values: &[f64]) -> f64 {
    DescriptiveStats::new(values.iter().copied()).map_or(f64::NAN, |s| s.median)
}
