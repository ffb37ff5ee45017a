//! Event equalization across models.
//!
//! Models are only comparable on the samples they all verified. For every
//! value of the independent variable the equalizer keeps the rows whose
//! matching tuple (lead, valid time, threshold, level, ...) occurs for every
//! model that has rows at that value, with one row per model and tuple.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{Error, table::VerificationTable};

/// Columns that identify one verification event, in key order. Columns a
/// table lacks are left out of the key.
pub const MATCH_COLUMNS: [&str; 6] = [
    "LEAD_HOURS",
    "VALID",
    "INIT",
    "FCST_THRESH_SYMBOL",
    "FCST_THRESH_VALUE",
    "OBS_LEV",
];

/// Columns that split a combined table into comparison groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GroupKeys {
    /// Column naming the model (forecast system) of a row.
    pub model: String,
    /// Column holding the independent variable, e.g. the lead time.
    pub independent: String,
}

impl Default for GroupKeys {
    fn default() -> Self {
        Self {
            model: "MODEL".to_owned(),
            independent: "FCST_LEAD".to_owned(),
        }
    }
}

/// Result of [`equalize_samples`].
#[derive(Debug, Clone, PartialEq)]
pub struct Equalized {
    pub table: VerificationTable,
    /// `false` when the table was returned unchanged.
    pub equalized: bool,
}

impl Equalized {
    fn unchanged(table: &VerificationTable) -> Self {
        Self {
            table: table.clone(),
            equalized: false,
        }
    }
}

/// The match columns present in `table`.
#[must_use]
pub fn match_columns(table: &VerificationTable) -> Vec<&'static str> {
    MATCH_COLUMNS
        .into_iter()
        .filter(|column| table.has_column(column))
        .collect()
}

/// Restricts `table` to the events shared by the models at each
/// independent-variable value.
///
/// A model without rows at some value does not empty that value for the
/// others. Rows keep their original order. A missing model or independent column is
/// an error; a table without any match column cannot be equalized and comes
/// back unchanged with `equalized == false`.
pub fn equalize_samples(table: &VerificationTable, keys: &GroupKeys) -> Result<Equalized, Error> {
    let models = single_keys(table, &keys.model)?;
    let independents = single_keys(table, &keys.independent)?;
    let match_columns = match_columns(table);
    if match_columns.is_empty() {
        tracing::warn!(
            expected = ?MATCH_COLUMNS,
            "no matching columns present, samples not equalized"
        );
        return Ok(Equalized::unchanged(table));
    }
    let events = table.key_tuples(&match_columns)?;

    let mut by_independent: Vec<(&String, Vec<usize>)> = vec![];
    let mut slot: HashMap<&String, usize> = HashMap::new();
    for (row, value) in independents.iter().enumerate() {
        let index = *slot.entry(value).or_insert_with(|| {
            by_independent.push((value, vec![]));
            by_independent.len() - 1
        });
        by_independent[index].1.push(row);
    }

    let mut keep = vec![];
    let mut model_count = 0;
    for (value, rows) in &by_independent {
        let mut events_of: HashMap<&String, HashSet<&Vec<String>>> = HashMap::new();
        for &row in rows {
            events_of.entry(&models[row]).or_default().insert(&events[row]);
        }
        model_count = model_count.max(events_of.len());
        let common = events_of
            .into_values()
            .reduce(|common, events| common.intersection(&events).copied().collect())
            .unwrap_or_default();

        let mut seen = HashSet::new();
        let mut sizes: HashMap<&String, usize> = HashMap::new();
        for &row in rows {
            if common.contains(&events[row]) && seen.insert((&events[row], &models[row])) {
                keep.push(row);
                *sizes.entry(&models[row]).or_default() += 1;
            }
        }
        if sizes.values().collect::<BTreeSet<_>>().len() > 1 {
            tracing::warn!(
                independent = %value,
                "model groups differ in size after matching, samples not equalized"
            );
            return Ok(Equalized::unchanged(table));
        }
    }
    keep.sort_unstable();

    let equalized = table.select(&keep);
    if equalized.is_empty() {
        tracing::info!(rows = table.len(), "no events are shared by all models");
    } else {
        tracing::info!(
            rows = table.len(),
            kept = equalized.len(),
            models = model_count,
            "samples equalized"
        );
    }
    Ok(Equalized {
        table: equalized,
        equalized: true,
    })
}

fn single_keys(table: &VerificationTable, column: &str) -> Result<Vec<String>, Error> {
    Ok(table
        .key_tuples(&[column])?
        .into_iter()
        .map(|mut key| key.swap_remove(0))
        .collect())
}

/// Samples that are finite in every series.
///
/// All series must have the same length.
///
/// ```
/// use metstat_engine::equalize::common_valid_mask;
///
/// let a = [1.0, f64::NAN, 3.0];
/// let b = [1.0, 2.0, f64::INFINITY];
/// assert_eq!(common_valid_mask(&[&a, &b]).unwrap(), [true, false, false]);
/// ```
pub fn common_valid_mask(series: &[&[f64]]) -> Result<Vec<bool>, Error> {
    let Some(first) = series.first() else {
        return Ok(vec![]);
    };
    if let Some(other) = series.iter().find(|values| values.len() != first.len()) {
        return Err(Error::LengthMismatch {
            left: first.len(),
            right: other.len(),
        });
    }
    Ok((0..first.len())
        .map(|i| series.iter().all(|values| values[i].is_finite()))
        .collect())
}
