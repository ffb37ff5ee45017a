//! Verification statistics for MET-style forecast evaluation.
//!
//! The engine takes tables of sufficient statistics (partial sums, contingency
//! counts, ensemble and probabilistic summaries), recognises their line type,
//! derives verification statistics from them, and compares models with
//! confidence intervals.
//!
//! # Modules
//!
//! - [`table`]: Row-oriented input tables
//! - [`schema`]: Line-type identification and sufficient-statistic records
//! - [`convert`]: Affine unit conversion of sufficient statistics
//! - [`statistic`]: Statistic catalog, formulas and derived series
//! - [`average`]: Reduction of a model group to one value
//! - [`ci`]: Difference intervals between models and bootstrap intervals
//! - [`equalize`]: Event equalization across models
//! - [`config`]: Run configuration
//! - [`pipeline`]: End-to-end model comparison
//!
//! # Example
//!
//! ```
//! use metstat_engine::{
//!     schema::{ExtractOptions, SufficientStatistics},
//!     statistic::{Statistic, calculator::calculate},
//!     table::{Record, Value, VerificationTable},
//! };
//!
//! let row = |values: [f64; 7]| {
//!     ["TOTAL", "FBAR", "OBAR", "FOBAR", "FFBAR", "OOBAR", "MAE"]
//!         .into_iter()
//!         .zip(values)
//!         .map(|(column, value)| (column.to_owned(), Value::from(value)))
//!         .collect::<Record>()
//! };
//! let table = VerificationTable::new(vec![
//!     row([100.0, 2.0, 1.0, 4.0, 7.0, 4.0, 1.5]),
//!     row([100.0, 3.0, 2.0, 8.0, 12.0, 7.0, 1.5]),
//! ])
//! .unwrap();
//!
//! let stats = SufficientStatistics::from_table(&table, &ExtractOptions::default()).unwrap();
//! let me = calculate(&stats, Statistic::Me).unwrap();
//! assert_eq!(me.values(), [1.0, 1.0]);
//! ```

pub use self::error::Error;

pub mod average;
pub mod ci;
pub mod config;
pub mod convert;
pub mod equalize;
mod error;
pub mod pipeline;
pub mod schema;
pub mod statistic;
pub mod table;
