use crate::{ci::bootstrap::BootstrapMethod, schema::LineType, statistic::Statistic};

/// Failures raised by the verification engine.
///
/// Every variant is fatal for the computation that raised it. Recoverable
/// conditions (too few samples for a confidence interval, a failed sample
/// equalization) are reported through status fields instead.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum Error {
    #[display("record {row} does not share the column set of the first record")]
    InconsistentColumns { row: usize },
    #[display("required column {column} is missing")]
    MissingColumn { column: String },
    #[display("column {column} holds a non-numeric value in row {row}")]
    NonNumericValue { column: String, row: usize },
    #[display("could not recognize line type from columns [{columns}]")]
    UnrecognizedLineType { columns: String },
    #[display("columns do not match the signature of line type {line_type}")]
    LineTypeHintMismatch { line_type: LineType },
    #[display("{name} is not a valid line type")]
    UnknownLineType { name: String },
    #[display("{name} is not a valid statistic")]
    UnknownStatistic { name: String },
    #[display("statistic {statistic} is not defined for {schema}")]
    UnsupportedStatistic { statistic: Statistic, schema: String },
    #[display("statistic {statistic} has several components and cannot be reduced to one interval")]
    CompositeStatistic { statistic: Statistic },
    #[display("invalid averaging method {name}, use MEAN, MEDIAN or AGGREGATION")]
    UnknownAverageMethod { name: String },
    #[display("averaging method AGGREGATION needs sufficient statistics, not a derived series")]
    AggregationWithoutSufficientStatistics,
    #[display("invalid confidence interval method {name}, use EMC or EMC_MONTE_CARLO")]
    UnknownCiMethod { name: String },
    #[display("invalid bootstrap method {name}, use MATCHED_PAIRS or FORECASTS")]
    UnknownBootstrapMethod { name: String },
    #[display("{line_type} is not currently a valid option for bootstrapping {method}")]
    UnsupportedBootstrap {
        method: BootstrapMethod,
        line_type: LineType,
    },
    #[display("cannot convert column units for line type {line_type}")]
    ConversionUnsupported { line_type: LineType },
    #[display("no event category available for multi-category row {row}")]
    MissingEventCategory { row: usize },
    #[display("event category {category} is out of range for {n_cat} categories in row {row}")]
    InvalidEventCategory {
        row: usize,
        category: f64,
        n_cat: f64,
    },
    #[display("sample series lengths differ ({left} vs {right})")]
    LengthMismatch { left: usize, right: usize },
    #[display("cannot compare {left} samples against {right} samples")]
    SchemaMismatch { left: String, right: String },
    #[display("table carries no sufficient statistics beyond TOTAL")]
    EmptySufficientStatistics,
    #[display("invalid parameter {name}: {reason}")]
    InvalidParameter {
        name: &'static str,
        reason: &'static str,
    },
}
