//! Reduction of per-sample values to one value per model group.

use std::str::FromStr;

use arrayvec::ArrayVec;
use metstat_stats::descriptive::{finite_mean, finite_median};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    schema::{LineType, Sample, SampleVisitor, SufficientStatistics, mean_record},
    statistic::{
        Statistic,
        calculator::{calculate, component_formulas},
        formula::Formula,
    },
};

/// How samples are combined into one value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, derive_more::Display)]
#[derive(Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum AverageMethod {
    /// Mean of the derived series.
    #[default]
    #[display("MEAN")]
    Mean,
    /// Median of the derived series.
    #[display("MEDIAN")]
    Median,
    /// Formula applied to the mean of the sufficient statistics.
    #[display("AGGREGATION")]
    Aggregation,
}

impl AverageMethod {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            AverageMethod::Mean => "MEAN",
            AverageMethod::Median => "MEDIAN",
            AverageMethod::Aggregation => "AGGREGATION",
        }
    }

    /// The method actually used for a schema.
    ///
    /// Partial-sum and count schemas are always aggregated. Other schemas
    /// carry precomputed statistics that cannot be summed, so aggregation
    /// falls back to the mean for them.
    ///
    /// ```
    /// use metstat_engine::{average::AverageMethod, schema::LineType};
    ///
    /// let median = AverageMethod::Median;
    /// assert_eq!(median.for_line_type(Some(LineType::Ctc)), AverageMethod::Aggregation);
    /// assert_eq!(median.for_line_type(Some(LineType::Ecnt)), AverageMethod::Median);
    /// assert_eq!(
    ///     AverageMethod::Aggregation.for_line_type(Some(LineType::Pstd)),
    ///     AverageMethod::Mean
    /// );
    /// ```
    #[must_use]
    pub fn for_line_type(self, line_type: Option<LineType>) -> Self {
        match (self, line_type) {
            (_, Some(line_type)) if line_type.is_summable() => AverageMethod::Aggregation,
            (AverageMethod::Aggregation, _) => AverageMethod::Mean,
            (method, _) => method,
        }
    }

    /// Reduces a derived series with the mean or the median, ignoring
    /// non-finite entries.
    pub fn reduce(self, values: &[f64]) -> Result<f64, Error> {
        match self {
            AverageMethod::Mean => Ok(finite_mean(values)),
            AverageMethod::Median => Ok(finite_median(values)),
            AverageMethod::Aggregation => Err(Error::AggregationWithoutSufficientStatistics),
        }
    }
}

impl FromStr for AverageMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            AverageMethod::Mean,
            AverageMethod::Median,
            AverageMethod::Aggregation,
        ]
        .into_iter()
        .find(|method| method.name().eq_ignore_ascii_case(s.trim()))
        .ok_or_else(|| Error::UnknownAverageMethod { name: s.to_owned() })
    }
}

impl TryFrom<String> for AverageMethod {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AverageMethod> for &'static str {
    fn from(method: AverageMethod) -> Self {
        method.name()
    }
}

/// Averages one formula over `rows` with an already resolved method.
#[must_use]
pub fn average_rows<R: Sample>(method: AverageMethod, rows: &[R], formula: Formula<R>) -> f64 {
    match method {
        AverageMethod::Aggregation => formula(&mean_record(rows)),
        AverageMethod::Mean => finite_mean(&rows.iter().map(formula).collect::<Vec<_>>()),
        AverageMethod::Median => finite_median(&rows.iter().map(formula).collect::<Vec<_>>()),
    }
}

/// Averages `statistic` over every sample of one model group.
///
/// The requested method passes through [`AverageMethod::for_line_type`]
/// first. Composite statistics yield one value per component.
pub fn average(
    stats: &SufficientStatistics,
    statistic: Statistic,
    method: AverageMethod,
) -> Result<ArrayVec<f64, 2>, Error> {
    struct Aggregator(Statistic);
    impl SampleVisitor for Aggregator {
        type Output = Result<ArrayVec<f64, 2>, Error>;

        fn visit<R: Sample>(self, line_type: LineType, rows: &[R]) -> Self::Output {
            let mean = mean_record(rows);
            Ok(component_formulas::<R>(line_type, self.0)?
                .into_iter()
                .map(|(_, formula)| formula(&mean))
                .collect())
        }

        fn visit_empty(self, total: &[f64]) -> Self::Output {
            let mean = finite_mean(total);
            Ok(self.0.components().into_iter().map(|_| mean).collect())
        }
    }

    let effective = method.for_line_type(stats.line_type());
    if effective != method {
        tracing::debug!(
            requested = %method,
            %effective,
            schema = %stats.schema_name(),
            "averaging method overridden by schema"
        );
    }
    match effective {
        AverageMethod::Aggregation => stats.accept(Aggregator(statistic)),
        method => calculate(stats, statistic)?
            .components
            .iter()
            .map(|component| method.reduce(&component.values))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        schema::{Ctc, Ecnt, SchemaRecord, Sl1l2},
        statistic::formula::FormulaTable,
    };

    #[test]
    fn test_names_parse_case_insensitively() {
        assert_eq!("mean".parse::<AverageMethod>(), Ok(AverageMethod::Mean));
        assert_eq!("Median".parse::<AverageMethod>(), Ok(AverageMethod::Median));
        assert_eq!("AGGREGATION".parse::<AverageMethod>(), Ok(AverageMethod::Aggregation));
        assert_eq!(
            "mode".parse::<AverageMethod>(),
            Err(Error::UnknownAverageMethod {
                name: "mode".to_owned()
            })
        );
    }

    #[test]
    fn test_reduce_ignores_nan() {
        let values = [1.0, f64::NAN, 5.0, 3.0];
        assert_eq!(AverageMethod::Mean.reduce(&values), Ok(3.0));
        assert_eq!(AverageMethod::Median.reduce(&values), Ok(3.0));
        assert!(AverageMethod::Mean.reduce(&[f64::NAN]).unwrap().is_nan());
        assert_eq!(
            AverageMethod::Aggregation.reduce(&values),
            Err(Error::AggregationWithoutSufficientStatistics)
        );
    }

    #[test]
    fn test_single_sample_aggregation_equals_formula() {
        let record = Sl1l2::from_values(&[50.0, 2.5, 1.0, 4.0, 9.0, 2.0, 1.7]);
        let stats = SufficientStatistics::Sl1l2(vec![record]);
        for statistic in [Statistic::Me, Statistic::Rmse, Statistic::Pcor, Statistic::Msess] {
            let direct = Sl1l2::formula(statistic).unwrap()(&record);
            let averaged = average(&stats, statistic, AverageMethod::Aggregation).unwrap();
            assert_eq!(averaged[0].to_bits(), direct.to_bits(), "{statistic}");
        }
    }

    #[test]
    fn test_contingency_counts_are_always_aggregated() {
        let stats = SufficientStatistics::Ctc(vec![
            Ctc::from_values(&[10.0, 5.0, 0.0, 5.0, 0.0]),
            Ctc::from_values(&[10.0, 1.0, 1.0, 0.0, 8.0]),
        ]);
        // per-sample pod is 0.5 and 1.0, pooled pod is 6 / 11
        let pod = average(&stats, Statistic::Pod, AverageMethod::Mean).unwrap();
        assert!((pod[0] - 6.0 / 11.0).abs() < 1e-12);
    }

    #[test]
    fn test_aggregation_skips_non_finite_rows() {
        let stats = SufficientStatistics::Ctc(vec![
            Ctc::from_values(&[10.0, 5.0, 0.0, 5.0, 0.0]),
            Ctc::undefined(),
        ]);
        let pod = average(&stats, Statistic::Pod, AverageMethod::Aggregation).unwrap();
        assert_eq!(pod[0], 0.5);
    }

    #[test]
    fn test_precomputed_statistics_use_requested_method() {
        let stats = SufficientStatistics::Ecnt(vec![
            Ecnt::from_values(&[10.0, 1.0, 0.0, 2.0, 1.0, 0.0, 1.0]),
            Ecnt::from_values(&[10.0, 2.0, 0.0, 2.0, 1.0, 0.0, 1.0]),
            Ecnt::from_values(&[10.0, 9.0, 0.0, 2.0, 1.0, 0.0, 1.0]),
        ]);
        let mean = average(&stats, Statistic::Crps, AverageMethod::Aggregation).unwrap();
        assert_eq!(mean[0], 4.0);
        let median = average(&stats, Statistic::Crps, AverageMethod::Median).unwrap();
        assert_eq!(median[0], 2.0);
    }

    #[test]
    fn test_composite_averages_each_component() {
        let stats = SufficientStatistics::Sl1l2(vec![
            Sl1l2::from_values(&[1.0, 2.0, 1.0, 0.0, 0.0, 0.0, 0.0]),
            Sl1l2::from_values(&[1.0, 4.0, 3.0, 0.0, 0.0, 0.0, 0.0]),
        ]);
        let fbar_obar = average(&stats, Statistic::FbarObar, AverageMethod::Mean).unwrap();
        assert_eq!(fbar_obar.as_slice(), &[3.0, 2.0]);
    }
}
