//! Numeric reductions shared by the verification engine.
//!
//! Verification series routinely contain undefined samples (a skill score with
//! a zero denominator, a model that did not report a cycle). Every reduction in
//! this crate skips non-finite values instead of letting a single `NaN`
//! poison the result.
//!
//! # Modules
//!
//! - [`descriptive`]: Count, mean, median, variance and standard deviation
//! - [`percentiles`]: Linearly interpolated percentiles
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use metstat_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, f64::NAN, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.count, 5);
//! assert_eq!(stats.mean, 3.0);
//! ```
//!
//! ## Computing percentiles
//!
//! ```
//! use metstat_stats::percentiles::Percentiles;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let percentiles = Percentiles::new(&values, &[2.5, 50.0, 97.5]);
//! assert_eq!(percentiles.get(50.0), Some(3.0));
//! ```

pub mod descriptive;
pub mod percentiles;
