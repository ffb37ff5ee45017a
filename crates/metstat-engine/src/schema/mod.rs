//! Line-type schemas: identification from column sets and extraction of
//! sufficient statistics.
//!
//! MET writes one line type per `.stat` row, and each line type carries a
//! different set of columns. [`resolve`] maps a column set to the line type it
//! belongs to by testing fixed signatures in priority order, and
//! [`SufficientStatistics::extract`] reads the matching columns into
//! per-schema records.

use std::{collections::HashSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    Error,
    convert::Convert,
    statistic::formula::FormulaTable,
    table::VerificationTable,
};

pub use self::records::{
    Ctc, Ecnt, Nbrcnt, Pstd, Sal1l2, SchemaRecord, Sl1l2, Val1l2, Vcnt, Vl1l2, mean_record,
};

pub mod multi_category;
pub mod records;

/// MET line types understood by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
#[derive(Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum LineType {
    #[display("SL1L2")]
    Sl1l2,
    #[display("SAL1L2")]
    Sal1l2,
    #[display("VL1L2")]
    Vl1l2,
    #[display("VAL1L2")]
    Val1l2,
    #[display("VCNT")]
    Vcnt,
    #[display("CTC")]
    Ctc,
    #[display("NBRCTC")]
    NbrCtc,
    #[display("MCTC")]
    Mctc,
    #[display("NBRCNT")]
    Nbrcnt,
    #[display("ECNT")]
    Ecnt,
    #[display("PSTD")]
    Pstd,
}

/// Identification signatures in priority order; the first match wins.
///
/// `NBRCTC` is absent: it carries exactly the `CTC` columns and can only be
/// selected through an explicit hint.
const SIGNATURES: [(LineType, &[&str]); 10] = [
    (LineType::Sl1l2, &["FBAR", "OBAR", "MAE"]),
    (LineType::Sal1l2, &["FABAR", "OABAR", "MAE"]),
    (LineType::Vl1l2, &["UFBAR", "VFBAR"]),
    (LineType::Val1l2, &["UFABAR", "VFABAR"]),
    (LineType::Vcnt, &["VDIFF_SPEED", "VDIFF_DIR"]),
    (LineType::Ctc, &["FY_OY", "FN_ON"]),
    (LineType::Mctc, &["N_CAT", "F0_O0"]),
    (
        LineType::Nbrcnt,
        &["FBS", "FSS", "AFSS", "UFSS", "F_RATE", "O_RATE"],
    ),
    (
        LineType::Ecnt,
        &["CRPS", "CRPSS", "RMSE", "SPREAD", "ME", "MAE"],
    ),
    (LineType::Pstd, &["ROC_AUC", "BRIER", "BSS", "BSS_SMPL"]),
];

impl LineType {
    pub const ALL: [LineType; 11] = [
        LineType::Sl1l2,
        LineType::Sal1l2,
        LineType::Vl1l2,
        LineType::Val1l2,
        LineType::Vcnt,
        LineType::Ctc,
        LineType::NbrCtc,
        LineType::Mctc,
        LineType::Nbrcnt,
        LineType::Ecnt,
        LineType::Pstd,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            LineType::Sl1l2 => "SL1L2",
            LineType::Sal1l2 => "SAL1L2",
            LineType::Vl1l2 => "VL1L2",
            LineType::Val1l2 => "VAL1L2",
            LineType::Vcnt => "VCNT",
            LineType::Ctc => "CTC",
            LineType::NbrCtc => "NBRCTC",
            LineType::Mctc => "MCTC",
            LineType::Nbrcnt => "NBRCNT",
            LineType::Ecnt => "ECNT",
            LineType::Pstd => "PSTD",
        }
    }

    /// Columns whose presence identifies this line type.
    #[must_use]
    pub fn signature(self) -> &'static [&'static str] {
        let lookup = match self {
            LineType::NbrCtc => LineType::Ctc,
            other => other,
        };
        SIGNATURES
            .iter()
            .find(|(line_type, _)| *line_type == lookup)
            .map_or(&[][..], |(_, signature)| *signature)
    }

    /// Sufficient-statistic columns this line type contributes.
    ///
    /// For `MCTC` only the fixed columns are listed; the `F{i}_O{j}` cells
    /// depend on `N_CAT`.
    #[must_use]
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            LineType::Sl1l2 => Sl1l2::COLUMNS,
            LineType::Sal1l2 => Sal1l2::COLUMNS,
            LineType::Vl1l2 => Vl1l2::COLUMNS,
            LineType::Val1l2 => Val1l2::COLUMNS,
            LineType::Vcnt => Vcnt::COLUMNS,
            LineType::Ctc | LineType::NbrCtc => Ctc::COLUMNS,
            LineType::Mctc => &["TOTAL", multi_category::N_CAT],
            LineType::Nbrcnt => Nbrcnt::COLUMNS,
            LineType::Ecnt => Ecnt::COLUMNS,
            LineType::Pstd => Pstd::COLUMNS,
        }
    }

    /// `true` for partial-sum and count schemas, whose samples can be summed.
    #[must_use]
    pub fn is_summable(self) -> bool {
        matches!(
            self,
            LineType::Sl1l2
                | LineType::Sal1l2
                | LineType::Vl1l2
                | LineType::Val1l2
                | LineType::Ctc
                | LineType::NbrCtc
                | LineType::Mctc
        )
    }
}

impl FromStr for LineType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LineType::ALL
            .into_iter()
            .find(|line_type| line_type.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownLineType { name: s.to_owned() })
    }
}

impl TryFrom<String> for LineType {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LineType> for &'static str {
    fn from(line_type: LineType) -> Self {
        line_type.name()
    }
}

/// Outcome of schema identification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The table carries `TOTAL` and no sufficient-statistic column.
    Empty,
    LineType(LineType),
}

impl Resolution {
    #[must_use]
    pub fn line_type(self) -> Option<LineType> {
        match self {
            Resolution::Empty => None,
            Resolution::LineType(line_type) => Some(line_type),
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Empty => f.write_str("empty"),
            Resolution::LineType(line_type) => line_type.fmt(f),
        }
    }
}

/// Identifies the schema of a column set.
///
/// Pure and independent of column order.
///
/// ```
/// use metstat_engine::schema::{LineType, Resolution, resolve};
///
/// let columns = ["MODEL", "TOTAL", "FY_OY", "FY_ON", "FN_OY", "FN_ON"];
/// assert_eq!(resolve(columns).unwrap(), Resolution::LineType(LineType::Ctc));
/// assert_eq!(resolve(["MODEL", "TOTAL"]).unwrap(), Resolution::Empty);
/// assert!(resolve(["MODEL"]).is_err());
/// ```
pub fn resolve<I, S>(columns: I) -> Result<Resolution, Error>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let columns = columns
        .into_iter()
        .map(|column| column.as_ref().to_owned())
        .collect::<HashSet<_>>();
    resolve_set(&columns)
}

/// Identifies the schema of a column set, honouring a caller-supplied line type.
///
/// The hint must match its signature; it is the only way to select `NBRCTC`.
pub fn resolve_with_hint<I, S>(columns: I, hint: Option<LineType>) -> Result<Resolution, Error>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let columns = columns
        .into_iter()
        .map(|column| column.as_ref().to_owned())
        .collect::<HashSet<_>>();
    let Some(line_type) = hint else {
        return resolve_set(&columns);
    };
    if line_type
        .signature()
        .iter()
        .all(|column| columns.contains(*column))
    {
        Ok(Resolution::LineType(line_type))
    } else {
        Err(Error::LineTypeHintMismatch { line_type })
    }
}

fn resolve_set(columns: &HashSet<String>) -> Result<Resolution, Error> {
    if let Some((line_type, _)) = SIGNATURES.iter().find(|(_, signature)| {
        signature
            .iter()
            .all(|column| columns.contains(*column))
    }) {
        return Ok(Resolution::LineType(*line_type));
    }

    let carries_statistics = columns
        .iter()
        .any(|column| column != "TOTAL" && is_statistic_column(column));
    if columns.contains("TOTAL") && !carries_statistics {
        return Ok(Resolution::Empty);
    }

    let mut names = columns.iter().map(String::as_str).collect::<Vec<_>>();
    names.sort_unstable();
    Err(Error::UnrecognizedLineType {
        columns: names.join(", "),
    })
}

fn is_statistic_column(column: &str) -> bool {
    LineType::ALL
        .iter()
        .any(|line_type| line_type.columns().contains(&column))
        || is_cell_column(column)
}

fn is_cell_column(column: &str) -> bool {
    column
        .strip_prefix('F')
        .and_then(|rest| rest.split_once("_O"))
        .is_some_and(|(f, o)| {
            !f.is_empty()
                && !o.is_empty()
                && f.bytes().all(|b| b.is_ascii_digit())
                && o.bytes().all(|b| b.is_ascii_digit())
        })
}

/// Options controlling extraction.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExtractOptions {
    /// Explicit line type, validated against the table columns.
    pub line_type: Option<LineType>,
    /// Event category for multi-category rows without an `EVENT_CAT` column.
    pub event_category: Option<usize>,
}

/// Per-sample sufficient statistics of one schema, aligned by row index.
#[derive(Debug, Clone, PartialEq)]
pub enum SufficientStatistics {
    /// Degenerate table: only the sample counts are known.
    Empty { total: Vec<f64> },
    Sl1l2(Vec<Sl1l2>),
    Sal1l2(Vec<Sal1l2>),
    Vl1l2(Vec<Vl1l2>),
    Val1l2(Vec<Val1l2>),
    Vcnt(Vec<Vcnt>),
    Ctc(Vec<Ctc>),
    NbrCtc(Vec<Ctc>),
    /// Multi-category rows folded to 2×2 tables for the event category.
    Mctc(Vec<Ctc>),
    Nbrcnt(Vec<Nbrcnt>),
    Ecnt(Vec<Ecnt>),
    Pstd(Vec<Pstd>),
}

impl SufficientStatistics {
    /// Resolves the schema of `table` and extracts its sufficient statistics.
    pub fn from_table(table: &VerificationTable, options: &ExtractOptions) -> Result<Self, Error> {
        let resolution = resolve_with_hint(table.columns(), options.line_type)?;
        tracing::debug!(%resolution, rows = table.len(), "resolved schema");
        Self::extract(table, resolution, options)
    }

    /// Extracts the sufficient statistics of an already resolved table.
    pub fn extract(
        table: &VerificationTable,
        resolution: Resolution,
        options: &ExtractOptions,
    ) -> Result<Self, Error> {
        let Resolution::LineType(line_type) = resolution else {
            return Ok(Self::Empty {
                total: table.numeric_column("TOTAL")?,
            });
        };
        let stats = match line_type {
            LineType::Sl1l2 => Self::Sl1l2(read_rows(table)?),
            LineType::Sal1l2 => Self::Sal1l2(read_rows(table)?),
            LineType::Vl1l2 => Self::Vl1l2(read_rows(table)?),
            LineType::Val1l2 => Self::Val1l2(read_rows(table)?),
            LineType::Vcnt => Self::Vcnt(read_rows(table)?),
            LineType::Ctc => Self::Ctc(read_rows(table)?),
            LineType::NbrCtc => Self::NbrCtc(read_rows(table)?),
            LineType::Mctc => {
                Self::Mctc(multi_category::fold_table(table, options.event_category)?)
            }
            LineType::Nbrcnt => Self::Nbrcnt(read_rows(table)?),
            LineType::Ecnt => Self::Ecnt(read_rows(table)?),
            LineType::Pstd => Self::Pstd(read_rows(table)?),
        };
        Ok(stats)
    }

    /// Dispatches to `visitor` with the concrete record type of this schema.
    pub fn accept<V>(&self, visitor: V) -> V::Output
    where
        V: SampleVisitor,
    {
        match self {
            Self::Empty { total } => visitor.visit_empty(total),
            Self::Sl1l2(rows) => visitor.visit(LineType::Sl1l2, rows),
            Self::Sal1l2(rows) => visitor.visit(LineType::Sal1l2, rows),
            Self::Vl1l2(rows) => visitor.visit(LineType::Vl1l2, rows),
            Self::Val1l2(rows) => visitor.visit(LineType::Val1l2, rows),
            Self::Vcnt(rows) => visitor.visit(LineType::Vcnt, rows),
            Self::Ctc(rows) => visitor.visit(LineType::Ctc, rows),
            Self::NbrCtc(rows) => visitor.visit(LineType::NbrCtc, rows),
            Self::Mctc(rows) => visitor.visit(LineType::Mctc, rows),
            Self::Nbrcnt(rows) => visitor.visit(LineType::Nbrcnt, rows),
            Self::Ecnt(rows) => visitor.visit(LineType::Ecnt, rows),
            Self::Pstd(rows) => visitor.visit(LineType::Pstd, rows),
        }
    }

    /// The schema, or `None` for the degenerate case.
    #[must_use]
    pub fn line_type(&self) -> Option<LineType> {
        struct LineTypeOf;
        impl SampleVisitor for LineTypeOf {
            type Output = Option<LineType>;
            fn visit<R: Sample>(self, line_type: LineType, _rows: &[R]) -> Self::Output {
                Some(line_type)
            }
            fn visit_empty(self, _total: &[f64]) -> Self::Output {
                None
            }
        }
        self.accept(LineTypeOf)
    }

    /// Schema name for messages; `empty` for the degenerate case.
    #[must_use]
    pub fn schema_name(&self) -> String {
        self.line_type()
            .map_or_else(|| "empty".to_owned(), |line_type| line_type.to_string())
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.totals().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The `TOTAL` of every sample.
    #[must_use]
    pub fn totals(&self) -> Vec<f64> {
        struct Totals;
        impl SampleVisitor for Totals {
            type Output = Vec<f64>;
            fn visit<R: Sample>(self, _line_type: LineType, rows: &[R]) -> Self::Output {
                rows.iter().map(SchemaRecord::total).collect()
            }
            fn visit_empty(self, total: &[f64]) -> Self::Output {
                total.to_vec()
            }
        }
        self.accept(Totals)
    }

    /// Returns a copy where every sample with `keep[i] == false` is undefined.
    ///
    /// Samples beyond the end of `keep` are kept.
    #[must_use]
    pub fn masked(&self, keep: &[bool]) -> Self {
        struct Mask<'a>(&'a [bool]);
        impl SampleVisitor for Mask<'_> {
            type Output = SufficientStatistics;
            fn visit<R: Sample>(self, line_type: LineType, rows: &[R]) -> Self::Output {
                let rows = rows
                    .iter()
                    .enumerate()
                    .map(|(i, row)| {
                        if self.0.get(i).copied().unwrap_or(true) {
                            *row
                        } else {
                            R::undefined()
                        }
                    })
                    .collect();
                R::wrap(line_type, rows)
            }
            fn visit_empty(self, total: &[f64]) -> Self::Output {
                let total = total
                    .iter()
                    .enumerate()
                    .map(|(i, t)| {
                        if self.0.get(i).copied().unwrap_or(true) {
                            *t
                        } else {
                            f64::NAN
                        }
                    })
                    .collect();
                SufficientStatistics::Empty { total }
            }
        }
        self.accept(Mask(keep))
    }
}

fn read_rows<R: SchemaRecord>(table: &VerificationTable) -> Result<Vec<R>, Error> {
    let columns = R::COLUMNS
        .iter()
        .map(|column| table.numeric_column(column))
        .collect::<Result<Vec<_>, _>>()?;
    let mut values = Vec::with_capacity(columns.len());
    Ok((0..table.len())
        .map(|row| {
            values.clear();
            values.extend(columns.iter().map(|column| column[row]));
            R::from_values(&values)
        })
        .collect())
}

/// Maps between a record type and the [`SufficientStatistics`] variants
/// holding it.
pub trait SchemaVariant: Sized {
    fn wrap(line_type: LineType, rows: Vec<Self>) -> SufficientStatistics;
    fn rows_of(stats: &SufficientStatistics) -> Option<&[Self]>;
}

macro_rules! single_variant {
    ($($record:ident),+ $(,)?) => {
        $(
            impl SchemaVariant for $record {
                fn wrap(_line_type: LineType, rows: Vec<Self>) -> SufficientStatistics {
                    SufficientStatistics::$record(rows)
                }

                fn rows_of(stats: &SufficientStatistics) -> Option<&[Self]> {
                    match stats {
                        SufficientStatistics::$record(rows) => Some(rows),
                        _ => None,
                    }
                }
            }
        )+
    };
}

single_variant!(Sl1l2, Sal1l2, Vl1l2, Val1l2, Vcnt, Nbrcnt, Ecnt, Pstd);

impl SchemaVariant for Ctc {
    fn wrap(line_type: LineType, rows: Vec<Self>) -> SufficientStatistics {
        match line_type {
            LineType::NbrCtc => SufficientStatistics::NbrCtc(rows),
            LineType::Mctc => SufficientStatistics::Mctc(rows),
            _ => SufficientStatistics::Ctc(rows),
        }
    }

    fn rows_of(stats: &SufficientStatistics) -> Option<&[Self]> {
        match stats {
            SufficientStatistics::Ctc(rows)
            | SufficientStatistics::NbrCtc(rows)
            | SufficientStatistics::Mctc(rows) => Some(rows),
            _ => None,
        }
    }
}

/// Everything the engine needs from a record type.
pub trait Sample: SchemaRecord + SchemaVariant + FormulaTable + Convert {}

impl<T> Sample for T where T: SchemaRecord + SchemaVariant + FormulaTable + Convert {}

/// Single-point dispatch over [`SufficientStatistics`].
///
/// Every engine component that works on any schema implements this once
/// instead of matching on the eleven variants itself.
pub trait SampleVisitor {
    type Output;

    fn visit<R: Sample>(self, line_type: LineType, rows: &[R]) -> Self::Output;

    fn visit_empty(self, total: &[f64]) -> Self::Output;
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::table::{Value, tests::record};

    const SL1L2_COLUMNS: [&str; 7] = ["TOTAL", "FBAR", "OBAR", "FOBAR", "FFBAR", "OOBAR", "MAE"];

    #[test]
    fn test_priority_order() {
        let mut columns = SL1L2_COLUMNS.to_vec();
        columns.extend(["UFBAR", "VFBAR"]);
        assert_eq!(
            resolve(&columns).unwrap(),
            Resolution::LineType(LineType::Sl1l2)
        );
        assert_eq!(
            resolve(["TOTAL", "FBAR", "OBAR", "VDIFF_SPEED", "VDIFF_DIR"]).unwrap(),
            Resolution::LineType(LineType::Vcnt)
        );
        assert_eq!(
            resolve(Ecnt::COLUMNS).unwrap(),
            Resolution::LineType(LineType::Ecnt)
        );
    }

    #[test]
    fn test_every_signature_resolves_to_itself() {
        for (line_type, signature) in SIGNATURES {
            let mut columns = signature.to_vec();
            columns.push("TOTAL");
            assert_eq!(
                resolve(&columns).unwrap(),
                Resolution::LineType(line_type),
                "{line_type}"
            );
        }
    }

    #[test]
    fn test_total_only_is_empty() {
        assert_eq!(
            resolve(["TOTAL", "MODEL", "FCST_LEAD"]).unwrap(),
            Resolution::Empty
        );
    }

    #[test]
    fn test_unrecognized_columns_fail() {
        let err = resolve(["TOTAL", "FBAR"]).unwrap_err();
        assert_eq!(
            err,
            Error::UnrecognizedLineType {
                columns: "FBAR, TOTAL".to_owned()
            }
        );
    }

    #[test]
    fn test_hint_selects_neighborhood_contingency() {
        let columns = Ctc::COLUMNS;
        assert_eq!(
            resolve(columns).unwrap(),
            Resolution::LineType(LineType::Ctc)
        );
        assert_eq!(
            resolve_with_hint(columns, Some(LineType::NbrCtc)).unwrap(),
            Resolution::LineType(LineType::NbrCtc)
        );
        assert_eq!(
            resolve_with_hint(columns, Some(LineType::Sl1l2)),
            Err(Error::LineTypeHintMismatch {
                line_type: LineType::Sl1l2
            })
        );
    }

    #[test]
    fn test_line_type_names_parse_case_insensitively() {
        for line_type in LineType::ALL {
            assert_eq!(line_type.name().to_lowercase().parse::<LineType>(), Ok(line_type));
        }
        assert!(matches!(
            "CNT".parse::<LineType>(),
            Err(Error::UnknownLineType { .. })
        ));
    }

    #[test]
    fn test_extract_reads_named_columns() {
        let table = VerificationTable::new(vec![
            record([
                ("MODEL", "gfs".into()),
                ("TOTAL", 10.0.into()),
                ("FY_OY", 3.0.into()),
                ("FY_ON", 1.0.into()),
                ("FN_OY", 2.0.into()),
                ("FN_ON", 4.0.into()),
            ]),
            record([
                ("MODEL", "gfs".into()),
                ("TOTAL", 5.0.into()),
                ("FY_OY", Value::Missing),
                ("FY_ON", 1.0.into()),
                ("FN_OY", 1.0.into()),
                ("FN_ON", 2.0.into()),
            ]),
        ])
        .unwrap();
        let stats = SufficientStatistics::from_table(&table, &ExtractOptions::default()).unwrap();
        let SufficientStatistics::Ctc(rows) = &stats else {
            panic!("expected CTC, got {stats:?}");
        };
        assert_eq!(rows[0].fn_oy, 2.0);
        assert!(rows[1].fy_oy.is_nan());
        assert_eq!(stats.totals(), vec![10.0, 5.0]);
        assert_eq!(stats.line_type(), Some(LineType::Ctc));
    }

    #[test]
    fn test_extract_empty_passes_total() {
        let table = VerificationTable::new(vec![record([("TOTAL", 7.0.into())])]).unwrap();
        let stats = SufficientStatistics::from_table(&table, &ExtractOptions::default()).unwrap();
        assert_eq!(stats, SufficientStatistics::Empty { total: vec![7.0] });
        assert_eq!(stats.schema_name(), "empty");
    }

    #[test]
    fn test_masked_undefines_dropped_samples() {
        let stats = SufficientStatistics::Ctc(vec![
            Ctc::from_values(&[4.0, 1.0, 1.0, 1.0, 1.0]),
            Ctc::from_values(&[8.0, 2.0, 2.0, 2.0, 2.0]),
        ]);
        let masked = stats.masked(&[true, false]);
        let SufficientStatistics::Ctc(rows) = masked else {
            panic!("variant changed");
        };
        assert!(rows[0].is_finite());
        assert!(!rows[1].is_finite());
    }

    proptest! {
        #[test]
        fn resolution_ignores_column_order(
            columns in prop::sample::subsequence(
                vec![
                    "TOTAL", "FBAR", "OBAR", "MAE", "UFBAR", "VFBAR", "FY_OY", "FN_ON",
                    "CRPS", "CRPSS", "RMSE", "SPREAD", "ME", "MODEL",
                ],
                0..=14,
            ).prop_shuffle()
        ) {
            let mut reversed = columns.clone();
            reversed.reverse();
            prop_assert_eq!(resolve(&columns), resolve(&reversed));
            prop_assert_eq!(resolve(&columns), resolve(&columns));
        }
    }
}
