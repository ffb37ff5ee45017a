//! Row-oriented verification tables.
//!
//! A [`VerificationTable`] is what the I/O layer hands to the engine: the rows
//! of one or more MET `.stat` files, already split into named columns. Every
//! row carries the same column set.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::Error;

/// A single cell of a verification record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
    /// Missing value (`NA` in MET output, `null` in JSON).
    Missing,
}

impl Value {
    /// Interprets the cell as a number.
    ///
    /// Missing cells and the MET `NA` marker read as `NaN`; text that is not a
    /// number yields `None`.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(value) => Some(*value),
            Value::Missing => Some(f64::NAN),
            Value::Text(text) if text.eq_ignore_ascii_case("NA") => Some(f64::NAN),
            Value::Text(text) => text.trim().parse().ok(),
        }
    }

    /// Canonical text used when the cell takes part in a grouping or matching key.
    #[must_use]
    pub fn key(&self) -> String {
        match self {
            Value::Number(value) => value.to_string(),
            Value::Text(text) => text.clone(),
            Value::Missing => "NA".to_owned(),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

/// One verification record: column name to cell.
pub type Record = BTreeMap<String, Value>;

/// An ordered set of verification records sharing one column set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Record>", into = "Vec<Record>")]
pub struct VerificationTable {
    columns: BTreeSet<String>,
    rows: Vec<Record>,
}

impl VerificationTable {
    /// Builds a table, taking the column set from the first record.
    pub fn new(rows: Vec<Record>) -> Result<Self, Error> {
        let columns = rows
            .first()
            .map(|row| row.keys().cloned().collect())
            .unwrap_or_default();
        Self::with_columns(columns, rows)
    }

    /// Builds a table with an explicit column set, which also allows empty tables
    /// that still know their columns.
    pub fn with_columns(columns: BTreeSet<String>, rows: Vec<Record>) -> Result<Self, Error> {
        for (row, record) in rows.iter().enumerate() {
            if record.len() != columns.len() || !record.keys().all(|key| columns.contains(key)) {
                return Err(Error::InconsistentColumns { row });
            }
        }
        Ok(Self { columns, rows })
    }

    #[must_use]
    pub fn columns(&self) -> &BTreeSet<String> {
        &self.columns
    }

    #[must_use]
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains(column)
    }

    #[must_use]
    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Reads one column as numbers.
    pub fn numeric_column(&self, column: &str) -> Result<Vec<f64>, Error> {
        self.require(column)?;
        self.rows
            .iter()
            .enumerate()
            .map(|(row, record)| {
                record[column].as_f64().ok_or_else(|| Error::NonNumericValue {
                    column: column.to_owned(),
                    row,
                })
            })
            .collect()
    }

    /// Reads the key tuple of `columns` for every row.
    pub fn key_tuples(&self, columns: &[&str]) -> Result<Vec<Vec<String>>, Error> {
        for column in columns {
            self.require(column)?;
        }
        Ok(self
            .rows
            .iter()
            .map(|record| columns.iter().map(|c| record[*c].key()).collect())
            .collect())
    }

    /// Splits the table by the key tuple of `columns`.
    ///
    /// Groups are returned in order of first appearance, and rows keep their
    /// relative order inside each group.
    pub fn group_by(&self, columns: &[&str]) -> Result<Vec<(Vec<String>, Self)>, Error> {
        let keys = self.key_tuples(columns)?;
        let mut order: Vec<Vec<String>> = vec![];
        let mut members: HashMap<Vec<String>, Vec<usize>> = HashMap::new();
        for (index, key) in keys.into_iter().enumerate() {
            members
                .entry(key)
                .or_insert_with_key(|key| {
                    order.push(key.clone());
                    vec![]
                })
                .push(index);
        }
        Ok(order
            .into_iter()
            .map(|key| {
                let table = self.select(&members[&key]);
                (key, table)
            })
            .collect())
    }

    /// Returns a table with the rows at `indices`, in that order.
    #[must_use]
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }

    /// Returns a copy ordered by the key tuple of `columns` (stable).
    pub fn sorted_by(&self, columns: &[&str]) -> Result<Self, Error> {
        let keys = self.key_tuples(columns)?;
        let mut indices = (0..self.rows.len()).collect::<Vec<_>>();
        indices.sort_by(|&a, &b| keys[a].cmp(&keys[b]));
        Ok(self.select(&indices))
    }

    fn require(&self, column: &str) -> Result<(), Error> {
        if self.has_column(column) {
            Ok(())
        } else {
            Err(Error::MissingColumn {
                column: column.to_owned(),
            })
        }
    }
}

impl TryFrom<Vec<Record>> for VerificationTable {
    type Error = Error;

    fn try_from(rows: Vec<Record>) -> Result<Self, Self::Error> {
        Self::new(rows)
    }
}

impl From<VerificationTable> for Vec<Record> {
    fn from(table: VerificationTable) -> Self {
        table.rows
    }
}
