use metstat_stats::descriptive::DescriptiveStats;

use crate::Error;

use super::ConfidenceInterval;

/// Student-t style multiplier used by the EMC interval for `n` samples.
///
/// `None` for `n == 0`.
///
/// ```
/// use metstat_engine::ci::analytic::t_multiplier;
///
/// assert_eq!(t_multiplier(0), None);
/// assert_eq!(t_multiplier(19), Some(2.228));
/// assert_eq!(t_multiplier(20), Some(2.042));
/// assert_eq!(t_multiplier(40), Some(2.000));
/// assert_eq!(t_multiplier(80), Some(1.960));
/// ```
#[must_use]
pub fn t_multiplier(n: usize) -> Option<f64> {
    match n {
        0 => None,
        1..20 => Some(2.228),
        20..40 => Some(2.042),
        40..80 => Some(2.000),
        _ => Some(1.960),
    }
}

/// EMC analytic interval for the mean of `model_b − model_a`.
///
/// Only pairs where both values are finite count. With `n` such pairs the
/// half-width is `t_multiplier(n) · σ / √(n − 1)` where `σ` is the
/// population standard deviation of the differences. Fewer than two pairs
/// leave the interval undefined.
#[expect(clippy::cast_precision_loss)]
pub fn emc_analytic(model_b: &[f64], model_a: &[f64]) -> Result<ConfidenceInterval, Error> {
    if model_b.len() != model_a.len() {
        return Err(Error::LengthMismatch {
            left: model_b.len(),
            right: model_a.len(),
        });
    }
    let differences = model_b
        .iter()
        .zip(model_a)
        .map(|(b, a)| b - a)
        .filter(|difference| difference.is_finite());
    let Some(stats) = DescriptiveStats::new(differences) else {
        return Ok(ConfidenceInterval::insufficient());
    };
    let n = stats.count;
    let Some(multiplier) = t_multiplier(n).filter(|_| n > 1) else {
        return Ok(ConfidenceInterval::insufficient());
    };
    let half_width = multiplier * stats.std_dev / ((n - 1) as f64).sqrt();
    Ok(ConfidenceInterval::symmetric(half_width))
}
