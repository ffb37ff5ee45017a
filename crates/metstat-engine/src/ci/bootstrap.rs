//! Percentile bootstrap intervals around one model's statistic.
//!
//! Two resampling schemes are supported:
//!
//! - **Matched pairs** rebuild the individual forecast/observation pairs a
//!   sample summarises and resample those. Contingency counts are redrawn
//!   from the pooled cell frequencies (multinomial); scalar partial sums are
//!   expanded into bivariate-normal pairs with the same first and second
//!   moments.
//! - **Forecasts** resample whole samples (rows) with replacement.
//!
//! Replicates are drawn in batches whose index buffer stays below
//! [`MAX_BATCH_BYTES`].

use std::str::FromStr;

use metstat_stats::percentiles::Percentiles;
use rand::Rng;
use rand_distr::{Binomial, StandardNormal};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    schema::{
        Ctc, LineType, Sal1l2, Sample, SampleVisitor, SchemaRecord, Sl1l2, SufficientStatistics,
        mean_record,
    },
    statistic::{Statistic, calculator::scalar_formula, formula::Formula},
};

use super::ConfidenceInterval;

/// Upper bound of the index buffer of one resampling batch, in bytes.
pub const MAX_BATCH_BYTES: f64 = 32e6;

/// Resampling scheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, derive_more::Display)]
#[derive(Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum BootstrapMethod {
    #[display("MATCHED_PAIRS")]
    MatchedPairs,
    #[default]
    #[display("FORECASTS")]
    Forecasts,
}

impl BootstrapMethod {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            BootstrapMethod::MatchedPairs => "MATCHED_PAIRS",
            BootstrapMethod::Forecasts => "FORECASTS",
        }
    }
}

impl FromStr for BootstrapMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [BootstrapMethod::MatchedPairs, BootstrapMethod::Forecasts]
            .into_iter()
            .find(|method| method.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownBootstrapMethod { name: s.to_owned() })
    }
}

impl TryFrom<String> for BootstrapMethod {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BootstrapMethod> for &'static str {
    fn from(method: BootstrapMethod) -> Self {
        method.name()
    }
}

/// Bootstrap settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BootstrapConfig {
    pub method: BootstrapMethod,
    /// Number of replicates.
    pub nrepl: usize,
    /// Confidence level in `(0, 1)`.
    pub level: f64,
    /// Samples below which no interval is computed. Matched pairs count
    /// individual pairs (`ΣTOTAL`); forecasts count rows.
    pub min_samples: usize,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            method: BootstrapMethod::default(),
            nrepl: 5000,
            level: 0.95,
            min_samples: 0,
        }
    }
}

/// Result of a bootstrap run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BootstrapOutcome {
    /// Statistic on the full sample; `NaN` when skipped.
    pub estimate: f64,
    /// Percentiles of `replicate − estimate`.
    pub interval: ConfidenceInterval,
}

impl BootstrapOutcome {
    fn insufficient() -> Self {
        Self {
            estimate: f64::NAN,
            interval: ConfidenceInterval::insufficient(),
        }
    }
}

/// Number of replicates per batch for a pool of `sample_count` elements.
///
/// ```
/// use metstat_engine::ci::bootstrap::batch_size;
///
/// assert_eq!(batch_size(1_000), 4_000);
/// assert_eq!(batch_size(3_000_000), 1);
/// assert_eq!(batch_size(5_000_000), 0);
/// ```
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
#[must_use]
pub fn batch_size(sample_count: usize) -> usize {
    if sample_count == 0 {
        return 0;
    }
    (MAX_BATCH_BYTES / 8.0 / sample_count as f64).floor() as usize
}

/// Bootstrap interval for `statistic` of one model.
pub fn bootstrap_ci<Rn>(
    stats: &SufficientStatistics,
    statistic: Statistic,
    config: &BootstrapConfig,
    rng: &mut Rn,
) -> Result<BootstrapOutcome, Error>
where
    Rn: Rng + ?Sized,
{
    if config.nrepl == 0 {
        return Err(Error::InvalidParameter {
            name: "nrepl",
            reason: "at least one replicate is required",
        });
    }
    if !(config.level > 0.0 && config.level < 1.0) {
        return Err(Error::InvalidParameter {
            name: "level",
            reason: "confidence level must lie strictly between 0 and 1",
        });
    }
    if statistic.is_composite() {
        return Err(Error::CompositeStatistic { statistic });
    }
    match config.method {
        BootstrapMethod::MatchedPairs => matched_pairs(stats, statistic, config, rng),
        BootstrapMethod::Forecasts => stats.accept(Forecasts {
            statistic,
            config,
            rng,
        }),
    }
}

fn matched_pairs<Rn>(
    stats: &SufficientStatistics,
    statistic: Statistic,
    config: &BootstrapConfig,
    rng: &mut Rn,
) -> Result<BootstrapOutcome, Error>
where
    Rn: Rng + ?Sized,
{
    let line_type = stats
        .line_type()
        .ok_or(Error::EmptySufficientStatistics)?;
    let unsupported = Error::UnsupportedBootstrap {
        method: BootstrapMethod::MatchedPairs,
        line_type,
    };
    let pairs = stats
        .totals()
        .into_iter()
        .filter(|total| total.is_finite())
        .sum::<f64>();
    #[expect(clippy::cast_precision_loss)]
    let min_samples = config.min_samples as f64;
    if pairs < min_samples {
        tracing::warn!(
            pairs,
            min_samples = config.min_samples,
            "sample too small for matched-pairs bootstrapping"
        );
        return Ok(BootstrapOutcome::insufficient());
    }

    match stats {
        SufficientStatistics::Ctc(rows)
        | SufficientStatistics::NbrCtc(rows)
        | SufficientStatistics::Mctc(rows) => {
            let formula = scalar_formula::<Ctc>(line_type, statistic)?;
            Ok(contingency_replicates(rows, formula, config, rng))
        }
        SufficientStatistics::Sl1l2(rows) => {
            let formula = scalar_formula::<Sl1l2>(line_type, statistic)?;
            Ok(paired_replicates(rows, formula, config, rng))
        }
        SufficientStatistics::Sal1l2(rows) => {
            let formula = scalar_formula::<Sal1l2>(line_type, statistic)?;
            Ok(paired_replicates(rows, formula, config, rng))
        }
        _ => Err(unsupported),
    }
}

/// Redraws the pooled contingency table `nrepl` times.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn contingency_replicates<Rn>(
    rows: &[Ctc],
    formula: Formula<Ctc>,
    config: &BootstrapConfig,
    rng: &mut Rn,
) -> BootstrapOutcome
where
    Rn: Rng + ?Sized,
{
    let mut pooled = Ctc::default();
    for row in rows.iter().filter(|row| row.is_finite()) {
        pooled.accumulate(row);
    }
    let estimate = formula(&pooled);
    let cells = [pooled.fy_oy, pooled.fy_on, pooled.fn_oy, pooled.fn_on];
    let cell_sum = cells.iter().sum::<f64>();
    let draws = pooled.total.max(0.0).round() as u64;

    let replicates = (0..config.nrepl)
        .map(|_| {
            if cell_sum <= 0.0 {
                return f64::NAN;
            }
            let [fy_oy, fy_on, fn_oy, fn_on] =
                multinomial(draws, cells.map(|cell| cell / cell_sum), rng).map(|c| c as f64);
            formula(&Ctc {
                total: draws as f64,
                fy_oy,
                fy_on,
                fn_oy,
                fn_on,
            })
        })
        .collect::<Vec<_>>();
    percentile_outcome(estimate, &replicates, config.level)
}

/// Multinomial draw built from conditional binomials.
fn multinomial<Rn, const K: usize>(draws: u64, probabilities: [f64; K], rng: &mut Rn) -> [u64; K]
where
    Rn: Rng + ?Sized,
{
    let mut counts = [0; K];
    let mut remaining = draws;
    let mut mass = 1.0;
    for (i, p) in probabilities.into_iter().enumerate() {
        if remaining == 0 {
            break;
        }
        if i + 1 == K {
            counts[i] = remaining;
            break;
        }
        let conditional = if mass > 0.0 {
            (p / mass).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let count = Binomial::new(remaining, conditional).map_or(0, |binomial| rng.sample(binomial));
        counts[i] = count;
        remaining -= count;
        mass -= p;
    }
    counts
}

/// Partial-sum records that can be expanded into forecast/observation pairs.
pub trait PairedMoments: Sample {
    /// `(mean_f, mean_o, var_f, var_o, covariance)` of the summarised pairs.
    fn moments(&self) -> (f64, f64, f64, f64, f64);

    /// The record summarising a single pair.
    fn from_pair(forecast: f64, observation: f64) -> Self;
}

impl PairedMoments for Sl1l2 {
    fn moments(&self) -> (f64, f64, f64, f64, f64) {
        (
            self.fbar,
            self.obar,
            self.ffbar - self.fbar * self.fbar,
            self.oobar - self.obar * self.obar,
            self.fobar - self.fbar * self.obar,
        )
    }

    fn from_pair(forecast: f64, observation: f64) -> Self {
        Self {
            total: 1.0,
            fbar: forecast,
            obar: observation,
            fobar: forecast * observation,
            ffbar: forecast * forecast,
            oobar: observation * observation,
            mae: (forecast - observation).abs(),
        }
    }
}

impl PairedMoments for Sal1l2 {
    fn moments(&self) -> (f64, f64, f64, f64, f64) {
        (
            self.fabar,
            self.oabar,
            self.ffabar - self.fabar * self.fabar,
            self.ooabar - self.oabar * self.oabar,
            self.foabar - self.fabar * self.oabar,
        )
    }

    fn from_pair(forecast: f64, observation: f64) -> Self {
        Self {
            total: 1.0,
            fabar: forecast,
            oabar: observation,
            foabar: forecast * observation,
            ffabar: forecast * forecast,
            ooabar: observation * observation,
            mae: (forecast - observation).abs(),
        }
    }
}

/// Draws `TOTAL` bivariate-normal pairs per row with the row's moments.
///
/// Negative variances from round-off are clamped to zero and the covariance
/// is limited to what the variances allow.
#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn simulate_pairs<R, Rn>(rows: &[R], rng: &mut Rn) -> Vec<(f64, f64)>
where
    R: PairedMoments,
    Rn: Rng + ?Sized,
{
    let mut pairs = vec![];
    for row in rows.iter().filter(|row| row.is_finite()) {
        let count = row.total().max(0.0).round() as usize;
        let (mean_f, mean_o, var_f, var_o, covar) = row.moments();
        let std_f = var_f.max(0.0).sqrt();
        let var_o = var_o.max(0.0);
        // lower Cholesky factor [[std_f, 0], [loading, residual]]
        let (loading, residual) = if std_f > 0.0 {
            let loading = covar / std_f;
            (loading, (var_o - loading * loading).max(0.0).sqrt())
        } else {
            (0.0, var_o.sqrt())
        };
        pairs.reserve(count);
        for _ in 0..count {
            let z1: f64 = rng.sample(StandardNormal);
            let z2: f64 = rng.sample(StandardNormal);
            pairs.push((
                mean_f + std_f * z1,
                mean_o + loading * z1 + residual * z2,
            ));
        }
    }
    pairs
}

fn paired_replicates<R, Rn>(
    rows: &[R],
    formula: Formula<R>,
    config: &BootstrapConfig,
    rng: &mut Rn,
) -> BootstrapOutcome
where
    R: PairedMoments,
    Rn: Rng + ?Sized,
{
    let pairs = simulate_pairs(rows, rng);
    let to_record = |&(f, o): &(f64, f64)| R::from_pair(f, o);
    let all = pairs.iter().map(to_record).collect::<Vec<_>>();
    let estimate = formula(&mean_record(&all));
    let replicates = resample_means(&pairs, to_record, config.nrepl, batch_size(pairs.len()), rng)
        .iter()
        .map(formula)
        .collect::<Vec<_>>();
    percentile_outcome(estimate, &replicates, config.level)
}

struct Forecasts<'a, Rn: ?Sized> {
    statistic: Statistic,
    config: &'a BootstrapConfig,
    rng: &'a mut Rn,
}

impl<Rn> SampleVisitor for Forecasts<'_, Rn>
where
    Rn: Rng + ?Sized,
{
    type Output = Result<BootstrapOutcome, Error>;

    fn visit<R: Sample>(self, line_type: LineType, rows: &[R]) -> Self::Output {
        let formula = scalar_formula::<R>(line_type, self.statistic)?;
        let usable = rows.iter().filter(|row| row.is_finite()).count();
        if usable < self.config.min_samples {
            tracing::warn!(
                rows = usable,
                min_samples = self.config.min_samples,
                "sample too small for forecast bootstrapping"
            );
            return Ok(BootstrapOutcome::insufficient());
        }
        let estimate = formula(&mean_record(rows));
        let replicates = resample_means(
            rows,
            |row| *row,
            self.config.nrepl,
            batch_size(rows.len()),
            self.rng,
        )
        .iter()
        .map(formula)
        .collect::<Vec<_>>();
        Ok(percentile_outcome(estimate, &replicates, self.config.level))
    }

    fn visit_empty(self, _total: &[f64]) -> Self::Output {
        Err(Error::EmptySufficientStatistics)
    }
}

/// Field-wise means of `nrepl` resamples of `pool`, drawn `batch` replicates
/// at a time.
///
/// Indices are drawn replicate by replicate, so the batch size changes only
/// the memory profile, never the result.
fn resample_means<T, R, F, Rn>(
    pool: &[T],
    to_record: F,
    nrepl: usize,
    batch: usize,
    rng: &mut Rn,
) -> Vec<R>
where
    R: SchemaRecord,
    F: Fn(&T) -> R,
    Rn: Rng + ?Sized,
{
    let n = pool.len();
    if n == 0 {
        return vec![R::undefined(); nrepl];
    }
    let batch = batch.clamp(1, nrepl);
    tracing::debug!(pool = n, nrepl, batch, "bootstrap batch plan");

    let replicate_mean = |indices: &[usize]| {
        let mut sum = R::default();
        let mut count = 0_usize;
        for record in indices.iter().map(|&i| to_record(&pool[i])) {
            if record.is_finite() {
                sum.accumulate(&record);
                count += 1;
            }
        }
        if count == 0 {
            return R::undefined();
        }
        #[expect(clippy::cast_precision_loss)]
        let weight = 1.0 / count as f64;
        sum.scaled(weight)
    };

    let mut replicates = Vec::with_capacity(nrepl);
    let mut indices = Vec::with_capacity(batch * n);
    let mut done = 0;
    while done < nrepl {
        let size = batch.min(nrepl - done);
        indices.clear();
        indices.extend((0..size * n).map(|_| rng.random_range(0..n)));
        replicates.extend(indices.chunks_exact(n).map(replicate_mean));
        done += size;
    }
    replicates
}

fn percentile_outcome(estimate: f64, replicates: &[f64], level: f64) -> BootstrapOutcome {
    let lower_percentile = 100.0 * (1.0 - level) / 2.0;
    let upper_percentile = 100.0 - lower_percentile;
    let deltas = replicates
        .iter()
        .map(|replicate| replicate - estimate)
        .collect::<Vec<_>>();
    let percentiles = Percentiles::new(&deltas, &[lower_percentile, upper_percentile]);
    let bound = |p| percentiles.get(p).unwrap_or(f64::NAN);
    BootstrapOutcome {
        estimate,
        interval: ConfidenceInterval::new(bound(lower_percentile), bound(upper_percentile)),
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;

    use super::*;
    use crate::schema::{Ecnt, Vl1l2};

    fn config(method: BootstrapMethod, nrepl: usize) -> BootstrapConfig {
        BootstrapConfig {
            method,
            nrepl,
            ..BootstrapConfig::default()
        }
    }

    fn ecnt_rows() -> SufficientStatistics {
        SufficientStatistics::Ecnt(
            (1..=40)
                .map(|i| Ecnt::from_values(&[10.0, f64::from(i), 0.0, 0.0, 0.0, 0.0, 0.0]))
                .collect(),
        )
    }

    fn ctc_rows() -> SufficientStatistics {
        SufficientStatistics::Ctc(vec![
            Ctc::from_values(&[100.0, 30.0, 10.0, 20.0, 40.0]),
            Ctc::from_values(&[100.0, 25.0, 15.0, 10.0, 50.0]),
        ])
    }

    #[test]
    fn test_method_names() {
        assert_eq!(
            "matched_pairs".parse::<BootstrapMethod>(),
            Ok(BootstrapMethod::MatchedPairs)
        );
        assert!(matches!(
            "pairs".parse::<BootstrapMethod>(),
            Err(Error::UnknownBootstrapMethod { .. })
        ));
    }

    #[test]
    fn test_batching_does_not_change_replicates() {
        let pool = (0..25).map(f64::from).collect::<Vec<_>>();
        let to_record = |&x: &f64| Ecnt::from_values(&[1.0, x, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let mut one_at_a_time = Pcg64::seed_from_u64(11);
        let mut batched = Pcg64::seed_from_u64(11);
        let a = resample_means(&pool, to_record, 37, 1, &mut one_at_a_time);
        let b = resample_means(&pool, to_record, 37, 8, &mut batched);
        assert_eq!(a.len(), 37);
        assert_eq!(a, b);
    }

    #[test]
    fn test_seeded_bootstrap_is_deterministic() {
        let stats = ecnt_rows();
        let run = |seed| {
            let mut rng = Pcg64::seed_from_u64(seed);
            bootstrap_ci(
                &stats,
                Statistic::Crps,
                &config(BootstrapMethod::Forecasts, 200),
                &mut rng,
            )
            .unwrap()
        };
        assert_eq!(run(5), run(5));
    }

    #[test]
    fn test_replicate_count_changes_bounds_little() {
        let stats = ecnt_rows();
        let mut rng = Pcg64::seed_from_u64(2024);
        let few = bootstrap_ci(
            &stats,
            Statistic::Crps,
            &config(BootstrapMethod::Forecasts, 100),
            &mut rng,
        )
        .unwrap();
        let many = bootstrap_ci(
            &stats,
            Statistic::Crps,
            &config(BootstrapMethod::Forecasts, 10_000),
            &mut rng,
        )
        .unwrap();
        assert!((few.estimate - 20.5).abs() < 1e-9);
        assert!((many.estimate - 20.5).abs() < 1e-9);
        // standard error of the mean is about 1.8, so the bounds sit near ±3.6
        assert!((many.interval.lower + 3.6).abs() < 0.75, "{many:?}");
        assert!((many.interval.upper - 3.6).abs() < 0.75, "{many:?}");
        assert!((few.interval.lower - many.interval.lower).abs() < 1.5);
        assert!((few.interval.upper - many.interval.upper).abs() < 1.5);
    }

    #[test]
    fn test_matched_pairs_contingency() {
        let stats = ctc_rows();
        let mut rng = Pcg64::seed_from_u64(9);
        let outcome = bootstrap_ci(
            &stats,
            Statistic::Pod,
            &config(BootstrapMethod::MatchedPairs, 1000),
            &mut rng,
        )
        .unwrap();
        // pooled pod 55 / 85
        assert!((outcome.estimate - 55.0 / 85.0).abs() < 1e-12);
        assert!(outcome.interval.lower < 0.0 && outcome.interval.upper > 0.0);
        assert!(outcome.interval.upper - outcome.interval.lower < 0.3);
    }

    #[test]
    fn test_matched_pairs_skips_small_samples() {
        let stats = ctc_rows();
        let mut rng = Pcg64::seed_from_u64(9);
        let config = BootstrapConfig {
            method: BootstrapMethod::MatchedPairs,
            min_samples: 201,
            ..BootstrapConfig::default()
        };
        let outcome = bootstrap_ci(&stats, Statistic::Pod, &config, &mut rng).unwrap();
        assert!(outcome.interval.status.is_insufficient_samples());
        assert!(outcome.estimate.is_nan());
    }

    #[test]
    fn test_forecasts_count_only_finite_rows() {
        let mut rows = (1..=4)
            .map(|i| Ecnt::from_values(&[10.0, f64::from(i), 0.0, 0.0, 0.0, 0.0, 0.0]))
            .collect::<Vec<_>>();
        rows.push(Ecnt::from_values(&[10.0, f64::NAN, 0.0, 0.0, 0.0, 0.0, 0.0]));
        let stats = SufficientStatistics::Ecnt(rows);
        let config = BootstrapConfig {
            min_samples: 5,
            ..config(BootstrapMethod::Forecasts, 100)
        };
        let mut rng = Pcg64::seed_from_u64(4);
        let outcome = bootstrap_ci(&stats, Statistic::Crps, &config, &mut rng).unwrap();
        assert!(outcome.interval.status.is_insufficient_samples());

        let config = BootstrapConfig {
            min_samples: 4,
            ..config
        };
        let outcome = bootstrap_ci(&stats, Statistic::Crps, &config, &mut rng).unwrap();
        assert!(outcome.interval.status.is_computed());
        assert!((outcome.estimate - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_matched_pairs_partial_sums() {
        // mean error 1, both variances 4, covariance 3
        let row = Sl1l2::from_values(&[400.0, 3.0, 2.0, 9.0, 13.0, 8.0, 1.5]);
        let stats = SufficientStatistics::Sl1l2(vec![row, row]);
        let mut rng = Pcg64::seed_from_u64(77);
        let outcome = bootstrap_ci(
            &stats,
            Statistic::Me,
            &config(BootstrapMethod::MatchedPairs, 500),
            &mut rng,
        )
        .unwrap();
        assert!((outcome.estimate - 1.0).abs() < 0.2, "{outcome:?}");
        assert!(outcome.interval.lower < 0.0 && outcome.interval.upper > 0.0);
        assert!(outcome.interval.upper < 0.3);
    }

    #[test]
    fn test_simulated_pairs_follow_moments() {
        let row = Sl1l2::from_values(&[20_000.0, 3.0, 2.0, 9.0, 13.0, 8.0, 1.5]);
        let mut rng = Pcg64::seed_from_u64(1);
        let pairs = simulate_pairs(&[row], &mut rng);
        assert_eq!(pairs.len(), 20_000);
        let records = pairs
            .iter()
            .map(|&(f, o)| Sl1l2::from_pair(f, o))
            .collect::<Vec<_>>();
        let mean = mean_record(&records);
        assert!((mean.fbar - 3.0).abs() < 0.1);
        assert!((mean.obar - 2.0).abs() < 0.1);
        assert!((mean.fobar - 9.0).abs() < 0.3);
    }

    #[test]
    fn test_unsupported_matched_pairs_schema() {
        let stats = SufficientStatistics::Vl1l2(vec![Vl1l2::default()]);
        let mut rng = Pcg64::seed_from_u64(0);
        assert_eq!(
            bootstrap_ci(
                &stats,
                Statistic::Rmse,
                &config(BootstrapMethod::MatchedPairs, 10),
                &mut rng
            ),
            Err(Error::UnsupportedBootstrap {
                method: BootstrapMethod::MatchedPairs,
                line_type: LineType::Vl1l2
            })
        );
    }

    #[test]
    fn test_invalid_parameters() {
        let stats = ecnt_rows();
        let mut rng = Pcg64::seed_from_u64(0);
        let bad_level = BootstrapConfig {
            level: 1.0,
            ..BootstrapConfig::default()
        };
        assert!(matches!(
            bootstrap_ci(&stats, Statistic::Crps, &bad_level, &mut rng),
            Err(Error::InvalidParameter { name: "level", .. })
        ));
        assert!(matches!(
            bootstrap_ci(&stats, Statistic::Crps, &config(BootstrapMethod::Forecasts, 0), &mut rng),
            Err(Error::InvalidParameter { name: "nrepl", .. })
        ));
    }

    #[test]
    fn test_multinomial_counts_sum_to_draws() {
        let mut rng = Pcg64::seed_from_u64(3);
        for _ in 0..50 {
            let counts = multinomial(1000, [0.1, 0.2, 0.3, 0.4], &mut rng);
            assert_eq!(counts.iter().sum::<u64>(), 1000);
        }
        assert_eq!(multinomial(10, [0.0, 0.0, 1.0, 0.0], &mut rng), [0, 0, 10, 0]);
    }
}
