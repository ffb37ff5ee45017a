use arrayvec::ArrayVec;
use serde::Serialize;

use crate::{
    Error,
    schema::{LineType, Sample, SampleVisitor, SufficientStatistics},
};

use super::{Statistic, formula::Formula};

/// One labelled component of a derived statistic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatComponent {
    pub statistic: Statistic,
    pub values: Vec<f64>,
}

/// A statistic evaluated for every sample of one model group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedStatisticSeries {
    pub statistic: Statistic,
    pub display_name: &'static str,
    /// One component for scalar statistics, two for composites.
    pub components: ArrayVec<StatComponent, 2>,
}

impl DerivedStatisticSeries {
    /// The values of a scalar statistic (the first component).
    #[must_use]
    pub fn values(&self) -> &[f64] {
        self.components
            .first()
            .map_or(&[][..], |component| component.values.as_slice())
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Looks up the formulas of every component of `statistic` for record type `R`.
pub fn component_formulas<R: Sample>(
    line_type: LineType,
    statistic: Statistic,
) -> Result<ArrayVec<(Statistic, Formula<R>), 2>, Error> {
    statistic
        .components()
        .into_iter()
        .map(|component| {
            R::formula(component)
                .map(|formula| (component, formula))
                .ok_or_else(|| Error::UnsupportedStatistic {
                    statistic,
                    schema: line_type.to_string(),
                })
        })
        .collect()
}

/// Looks up the formula of a scalar statistic for record type `R`.
pub fn scalar_formula<R: Sample>(
    line_type: LineType,
    statistic: Statistic,
) -> Result<Formula<R>, Error> {
    if statistic.is_composite() {
        return Err(Error::CompositeStatistic { statistic });
    }
    let formulas = component_formulas::<R>(line_type, statistic)?;
    Ok(formulas[0].1)
}

/// Derives `statistic` for every sample.
///
/// The degenerate `TOTAL`-only case passes `TOTAL` through for every
/// component and logs a warning.
pub fn calculate(
    stats: &SufficientStatistics,
    statistic: Statistic,
) -> Result<DerivedStatisticSeries, Error> {
    struct Calculator(Statistic);
    impl SampleVisitor for Calculator {
        type Output = Result<ArrayVec<StatComponent, 2>, Error>;

        fn visit<R: Sample>(self, line_type: LineType, rows: &[R]) -> Self::Output {
            Ok(component_formulas::<R>(line_type, self.0)?
                .into_iter()
                .map(|(statistic, formula)| StatComponent {
                    statistic,
                    values: rows.iter().map(formula).collect(),
                })
                .collect())
        }

        fn visit_empty(self, total: &[f64]) -> Self::Output {
            tracing::warn!(
                statistic = %self.0,
                "empty sufficient statistics, passing TOTAL through"
            );
            Ok(self
                .0
                .components()
                .into_iter()
                .map(|statistic| StatComponent {
                    statistic,
                    values: total.to_vec(),
                })
                .collect())
        }
    }

    let components = stats.accept(Calculator(statistic))?;
    Ok(DerivedStatisticSeries {
        statistic,
        display_name: statistic.display_name(),
        components,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Ctc, SchemaRecord, Sl1l2};

    fn sl1l2_scenario() -> SufficientStatistics {
        SufficientStatistics::Sl1l2(vec![
            Sl1l2::from_values(&[100.0, 2.0, 1.0, 4.0, 7.0, 4.0, 1.5]),
            Sl1l2::from_values(&[100.0, 3.0, 2.0, 8.0, 12.0, 7.0, 1.5]),
        ])
    }

    #[test]
    fn test_sl1l2_mean_error_and_rmse() {
        let stats = sl1l2_scenario();
        let me = calculate(&stats, Statistic::Me).unwrap();
        assert_eq!(me.values(), &[1.0, 1.0]);
        assert_eq!(me.display_name, "Mean Error (i.e., Bias)");
        let rmse = calculate(&stats, Statistic::Rmse).unwrap();
        for value in rmse.values() {
            assert!((value - 3.0_f64.sqrt()).abs() < 1e-12);
        }
    }

    #[test]
    fn test_single_sl1l2_row() {
        let stats = SufficientStatistics::Sl1l2(vec![Sl1l2::from_values(&[
            10.0, 5.0, 4.0, 21.0, 27.0, 18.0, 1.0,
        ])]);
        assert_eq!(calculate(&stats, Statistic::Me).unwrap().values(), &[1.0]);
        let rmse = calculate(&stats, Statistic::Rmse).unwrap();
        assert!((rmse.values()[0] - 3.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_calculation_is_idempotent() {
        let stats = sl1l2_scenario();
        assert_eq!(
            calculate(&stats, Statistic::Pcor),
            calculate(&stats, Statistic::Pcor)
        );
    }

    #[test]
    fn test_bcrmse_is_non_negative_or_nan() {
        let stats = sl1l2_scenario();
        let bcrmse = calculate(&stats, Statistic::Bcrmse).unwrap();
        assert!(bcrmse.values().iter().all(|v| v.is_nan() || *v >= 0.0));
    }

    #[test]
    fn test_composite_has_two_components() {
        let stats = sl1l2_scenario();
        let series = calculate(&stats, Statistic::FbarObar).unwrap();
        assert_eq!(series.components.len(), 2);
        assert_eq!(series.components[0].statistic, Statistic::Fbar);
        assert_eq!(series.components[0].values, vec![2.0, 3.0]);
        assert_eq!(series.components[1].values, vec![1.0, 2.0]);
    }

    #[test]
    fn test_unsupported_statistic_names_schema() {
        let stats = SufficientStatistics::Ctc(vec![Ctc::default()]);
        let err = calculate(&stats, Statistic::Rmse).unwrap_err();
        assert_eq!(
            err,
            Error::UnsupportedStatistic {
                statistic: Statistic::Rmse,
                schema: "CTC".to_owned()
            }
        );
        assert_eq!(err.to_string(), "statistic rmse is not defined for CTC");
    }

    #[test]
    fn test_empty_passes_total_through() {
        let stats = SufficientStatistics::Empty {
            total: vec![10.0, 20.0],
        };
        let series = calculate(&stats, Statistic::OrateFrate).unwrap();
        assert_eq!(series.components.len(), 2);
        assert_eq!(series.components[1].values, vec![10.0, 20.0]);
    }

    #[test]
    fn test_scalar_formula_rejects_composites() {
        assert!(matches!(
            scalar_formula::<Sl1l2>(LineType::Sl1l2, Statistic::FbarObar),
            Err(Error::CompositeStatistic {
                statistic: Statistic::FbarObar
            })
        ));
        assert!(scalar_formula::<Sl1l2>(LineType::Sl1l2, Statistic::Rmse).is_ok());
    }
}
