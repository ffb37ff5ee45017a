//! Folding of N×N multi-category contingency tables (`MCTC`) into 2×2 tables.

use crate::{Error, schema::records::Ctc, table::VerificationTable};

/// Column holding the number of categories of a multi-category row.
pub const N_CAT: &str = "N_CAT";
/// Optional column holding the event category of each row.
pub const EVENT_CAT: &str = "EVENT_CAT";

/// Name of the cell column for forecast category `f` and observed category `o`.
#[must_use]
pub fn cell_column(f: usize, o: usize) -> String {
    format!("F{f}_O{o}")
}

/// Folds one N×N table into a 2×2 table for the event category `event`.
///
/// `cell(f, o)` returns the count for forecast category `f` and observed
/// category `o`.
///
/// ```
/// use metstat_engine::schema::multi_category::fold;
///
/// // rows: forecast category, columns: observed category
/// let cells = [[5.0, 1.0, 0.0], [2.0, 7.0, 1.0], [0.0, 3.0, 6.0]];
/// let ctc = fold(3, 25.0, 1, |f, o| cells[f][o]);
/// assert_eq!(ctc.fy_oy, 7.0);
/// assert_eq!(ctc.fy_on, 3.0);
/// assert_eq!(ctc.fn_oy, 4.0);
/// assert_eq!(ctc.fn_on, 11.0);
/// ```
pub fn fold<F>(n_cat: usize, total: f64, event: usize, cell: F) -> Ctc
where
    F: Fn(usize, usize) -> f64,
{
    let hits = cell(event, event);
    let false_alarms = (0..n_cat)
        .filter(|&o| o != event)
        .map(|o| cell(event, o))
        .sum::<f64>();
    let misses = (0..n_cat)
        .filter(|&f| f != event)
        .map(|f| cell(f, event))
        .sum::<f64>();
    Ctc {
        total,
        fy_oy: hits,
        fy_on: false_alarms,
        fn_oy: misses,
        fn_on: total - hits - false_alarms - misses,
    }
}

/// Folds every row of a multi-category table.
///
/// The event category comes from the [`EVENT_CAT`] column when present and
/// from `event_category` otherwise.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn fold_table(
    table: &VerificationTable,
    event_category: Option<usize>,
) -> Result<Vec<Ctc>, Error> {
    let n_cats = table.numeric_column(N_CAT)?;
    let totals = table.numeric_column("TOTAL")?;
    let events = if table.has_column(EVENT_CAT) {
        Some(table.numeric_column(EVENT_CAT)?)
    } else {
        None
    };

    let mut folded = Vec::with_capacity(table.len());
    for (row, record) in table.rows().iter().enumerate() {
        let n_cat = n_cats[row];
        let event = match (&events, event_category) {
            (Some(events), _) => events[row],
            (None, Some(event)) => event as f64,
            (None, None) => return Err(Error::MissingEventCategory { row }),
        };
        if !n_cat.is_finite() || n_cat < 2.0 || !event.is_finite() || event < 0.0 || event >= n_cat
        {
            return Err(Error::InvalidEventCategory {
                row,
                category: event,
                n_cat,
            });
        }
        let n_cat = n_cat as usize;
        let event = event as usize;

        let mut cells = vec![f64::NAN; n_cat * n_cat];
        for f in 0..n_cat {
            for o in 0..n_cat {
                let column = cell_column(f, o);
                let value = record.get(&column).ok_or(Error::MissingColumn { column })?;
                cells[f * n_cat + o] = value.as_f64().ok_or_else(|| Error::NonNumericValue {
                    column: cell_column(f, o),
                    row,
                })?;
            }
        }
        folded.push(fold(n_cat, totals[row], event, |f, o| cells[f * n_cat + o]));
    }
    Ok(folded)
}

/// Finds the event category of a threshold inside a threshold list.
///
/// `thresholds` is the comma-separated list of category boundaries recorded
/// with the table and `event_threshold` the threshold of interest; comparison
/// operators on either side are ignored. When the table has one more category
/// than the list has boundaries, the index is shifted by one so that it refers
/// to the category above the boundary.
///
/// ```
/// use metstat_engine::schema::multi_category::event_category_for_threshold;
///
/// assert_eq!(event_category_for_threshold("0.1,1,5", ">=1", 4), Some(2));
/// assert_eq!(event_category_for_threshold("0.1,1,5", ">=1", 3), Some(1));
/// assert_eq!(event_category_for_threshold("0.1,1,5", ">=2", 4), None);
/// ```
#[must_use]
pub fn event_category_for_threshold(
    thresholds: &str,
    event_threshold: &str,
    n_cat: usize,
) -> Option<usize> {
    let target = strip_operator(event_threshold);
    let boundaries = thresholds.split(',').map(strip_operator).collect::<Vec<_>>();
    let index = boundaries
        .iter()
        .position(|boundary| same_threshold(boundary, target))?;
    if n_cat == boundaries.len() {
        Some(index)
    } else {
        Some(index + 1)
    }
}

fn strip_operator(threshold: &str) -> &str {
    let threshold = threshold.trim();
    for operator in [">=", "<=", "==", "!=", ">", "<", "ge", "le", "eq", "ne", "gt", "lt"] {
        if let Some(rest) = threshold.strip_prefix(operator) {
            return rest.trim();
        }
    }
    threshold
}

fn same_threshold(a: &str, b: &str) -> bool {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
