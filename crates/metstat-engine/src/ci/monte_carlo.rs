use metstat_stats::descriptive::DescriptiveStats;
use rand::Rng;

use crate::{
    Error,
    average::{AverageMethod, average_rows},
    schema::{LineType, Sample, SampleVisitor, SufficientStatistics},
    statistic::{Statistic, calculator::scalar_formula},
};

use super::ConfidenceInterval;

/// Default number of permutation trials.
pub const DEFAULT_TRIALS: usize = 10_000;

/// Two-sided 95% normal quantile.
const Z_95: f64 = 1.96;

/// Permutation interval for `avg(model_b) − avg(model_a)`.
///
/// Each trial draws one fair coin per sample; heads swaps the two models'
/// rows for that sample (all columns together). Both pseudo-groups are
/// re-averaged with `method` (after the schema policy of
/// [`AverageMethod::for_line_type`]) and the half-width is `1.96` times the
/// sample standard deviation of the trial differences.
pub fn emc_monte_carlo<Rn>(
    model_a: &SufficientStatistics,
    model_b: &SufficientStatistics,
    statistic: Statistic,
    method: AverageMethod,
    trials: usize,
    rng: &mut Rn,
) -> Result<ConfidenceInterval, Error>
where
    Rn: Rng + ?Sized,
{
    struct Permutation<'a, Rn: ?Sized> {
        model_b: &'a SufficientStatistics,
        statistic: Statistic,
        method: AverageMethod,
        trials: usize,
        rng: &'a mut Rn,
    }

    impl<Rn> SampleVisitor for Permutation<'_, Rn>
    where
        Rn: Rng + ?Sized,
    {
        type Output = Result<ConfidenceInterval, Error>;

        fn visit<R: Sample>(mut self, line_type: LineType, rows_a: &[R]) -> Self::Output {
            let rows_b = R::rows_of(self.model_b).ok_or_else(|| Error::SchemaMismatch {
                left: line_type.to_string(),
                right: self.model_b.schema_name(),
            })?;
            if rows_a.len() != rows_b.len() {
                return Err(Error::LengthMismatch {
                    left: rows_a.len(),
                    right: rows_b.len(),
                });
            }
            let formula = scalar_formula::<R>(line_type, self.statistic)?;
            let method = self.method.for_line_type(Some(line_type));

            let mut pseudo_a = rows_a.to_vec();
            let mut pseudo_b = rows_b.to_vec();
            let mut differences = Vec::with_capacity(self.trials);
            for _ in 0..self.trials {
                for (i, (a, b)) in rows_a.iter().zip(rows_b).enumerate() {
                    if self.rng.random_bool(0.5) {
                        pseudo_a[i] = *b;
                        pseudo_b[i] = *a;
                    } else {
                        pseudo_a[i] = *a;
                        pseudo_b[i] = *b;
                    }
                }
                differences.push(
                    average_rows(method, &pseudo_b, formula)
                        - average_rows(method, &pseudo_a, formula),
                );
            }

            let spread = DescriptiveStats::new(differences)
                .as_ref()
                .and_then(DescriptiveStats::sample_std_dev);
            Ok(spread.map_or_else(ConfidenceInterval::insufficient, |std_dev| {
                ConfidenceInterval::symmetric(Z_95 * std_dev)
            }))
        }

        fn visit_empty(self, _total: &[f64]) -> Self::Output {
            Err(Error::EmptySufficientStatistics)
        }
    }

    if trials < 2 {
        return Err(Error::InvalidParameter {
            name: "trials",
            reason: "at least two permutation trials are required",
        });
    }
    if model_a.line_type() != model_b.line_type() {
        return Err(Error::SchemaMismatch {
            left: model_a.schema_name(),
            right: model_b.schema_name(),
        });
    }
    model_a.accept(Permutation {
        model_b,
        statistic,
        method,
        trials,
        rng,
    })
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;

    use super::*;
    use crate::schema::{Ctc, Ecnt, SchemaRecord, Sl1l2};

    fn ecnt_series(crps: &[f64]) -> SufficientStatistics {
        SufficientStatistics::Ecnt(
            crps.iter()
                .map(|&crps| Ecnt::from_values(&[10.0, crps, 0.0, 0.0, 0.0, 0.0, 0.0]))
                .collect(),
        )
    }

    #[test]
    fn test_interval_is_centred_and_finite() {
        let a = ecnt_series(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        let b = ecnt_series(&[2.0, 2.5, 3.5, 4.0, 6.5, 6.0, 9.0, 8.5]);
        let mut rng = Pcg64::seed_from_u64(42);
        let ci = emc_monte_carlo(&a, &b, Statistic::Crps, AverageMethod::Mean, 2000, &mut rng)
            .unwrap();
        assert!(ci.status.is_computed());
        assert!(ci.upper > 0.0);
        assert_eq!(ci.lower, -ci.upper);
        // the largest possible swing is the mean absolute difference
        assert!(ci.upper < 1.96 * 0.75);
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let a = ecnt_series(&[1.0, 2.0, 3.0, 4.0]);
        let b = ecnt_series(&[1.5, 1.0, 3.5, 5.0]);
        let run = |seed| {
            let mut rng = Pcg64::seed_from_u64(seed);
            emc_monte_carlo(&a, &b, Statistic::Crps, AverageMethod::Median, 500, &mut rng)
                .unwrap()
        };
        assert_eq!(run(3), run(3));
    }

    #[test]
    fn test_schema_and_length_mismatch() {
        let mut rng = Pcg64::seed_from_u64(0);
        let ctc = SufficientStatistics::Ctc(vec![Ctc::default()]);
        let sl1l2 = SufficientStatistics::Sl1l2(vec![Sl1l2::default()]);
        assert_eq!(
            emc_monte_carlo(&ctc, &sl1l2, Statistic::Pod, AverageMethod::Mean, 10, &mut rng),
            Err(Error::SchemaMismatch {
                left: "CTC".to_owned(),
                right: "SL1L2".to_owned()
            })
        );
        let mctc = SufficientStatistics::Mctc(vec![Ctc::default()]);
        assert_eq!(
            emc_monte_carlo(&ctc, &mctc, Statistic::Pod, AverageMethod::Mean, 10, &mut rng),
            Err(Error::SchemaMismatch {
                left: "CTC".to_owned(),
                right: "MCTC".to_owned()
            })
        );
        let a = ecnt_series(&[1.0, 2.0]);
        let b = ecnt_series(&[1.0]);
        assert_eq!(
            emc_monte_carlo(&a, &b, Statistic::Crps, AverageMethod::Mean, 10, &mut rng),
            Err(Error::LengthMismatch { left: 2, right: 1 })
        );
    }

    #[test]
    fn test_requires_two_trials() {
        let a = ecnt_series(&[1.0, 2.0]);
        let mut rng = Pcg64::seed_from_u64(0);
        assert!(matches!(
            emc_monte_carlo(&a, &a, Statistic::Crps, AverageMethod::Mean, 1, &mut rng),
            Err(Error::InvalidParameter { name: "trials", .. })
        ));
    }
}
