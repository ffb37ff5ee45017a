//! Confidence intervals for verification statistics.
//!
//! Three strategies are available:
//!
//! - [`analytic`]: the EMC analytic interval for the mean difference between
//!   two models' derived series
//! - [`monte_carlo`]: a permutation test that swaps the two models' samples
//!   at random and re-averages
//! - [`bootstrap`]: a percentile bootstrap around one model's statistic,
//!   either over matched forecast/observation pairs or over forecast samples
//!
//! The first two describe the difference between two models and are centred
//! on zero; the bootstrap describes the spread of one model's statistic
//! around its point estimate.

use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    average::AverageMethod,
    schema::SufficientStatistics,
    statistic::{Statistic, calculator::calculate},
};

pub mod analytic;
pub mod bootstrap;
pub mod monte_carlo;

/// Outcome of an interval computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant, Serialize)]
#[serde(into = "u8")]
pub enum CiStatus {
    /// Bounds were computed.
    Computed,
    /// Too few samples; both bounds are `NaN`.
    InsufficientSamples,
}

impl From<CiStatus> for u8 {
    fn from(status: CiStatus) -> Self {
        match status {
            CiStatus::Computed => 0,
            CiStatus::InsufficientSamples => 1,
        }
    }
}

/// A confidence interval.
///
/// Difference intervals are relative to zero; bootstrap intervals are
/// relative to the point estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
    pub status: CiStatus,
}

impl ConfidenceInterval {
    #[must_use]
    pub fn new(lower: f64, upper: f64) -> Self {
        Self {
            lower,
            upper,
            status: CiStatus::Computed,
        }
    }

    /// Interval `[-half_width, +half_width]`.
    #[must_use]
    pub fn symmetric(half_width: f64) -> Self {
        Self::new(-half_width, half_width)
    }

    /// Interval skipped for lack of samples.
    #[must_use]
    pub fn insufficient() -> Self {
        Self {
            lower: f64::NAN,
            upper: f64::NAN,
            status: CiStatus::InsufficientSamples,
        }
    }

    /// `true` when the interval excludes zero.
    #[must_use]
    pub fn excludes_zero(&self) -> bool {
        self.status.is_computed() && (self.lower > 0.0 || self.upper < 0.0)
    }
}

/// Strategy for the difference interval between two models.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, derive_more::Display)]
#[derive(Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum CiMethod {
    #[default]
    #[display("EMC")]
    Emc,
    #[display("EMC_MONTE_CARLO")]
    EmcMonteCarlo,
}

impl CiMethod {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            CiMethod::Emc => "EMC",
            CiMethod::EmcMonteCarlo => "EMC_MONTE_CARLO",
        }
    }
}

impl FromStr for CiMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [CiMethod::Emc, CiMethod::EmcMonteCarlo]
            .into_iter()
            .find(|method| method.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownCiMethod { name: s.to_owned() })
    }
}

impl TryFrom<String> for CiMethod {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CiMethod> for &'static str {
    fn from(method: CiMethod) -> Self {
        method.name()
    }
}

/// Settings shared by the difference-interval strategies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifferenceSettings {
    pub method: CiMethod,
    pub statistic: Statistic,
    pub average_method: AverageMethod,
    /// Permutation trials for [`CiMethod::EmcMonteCarlo`].
    pub trials: usize,
}

/// Interval for `model − reference` of `statistic`.
pub fn difference_interval<R>(
    reference: &SufficientStatistics,
    model: &SufficientStatistics,
    settings: &DifferenceSettings,
    rng: &mut R,
) -> Result<ConfidenceInterval, Error>
where
    R: Rng + ?Sized,
{
    if settings.statistic.is_composite() {
        return Err(Error::CompositeStatistic {
            statistic: settings.statistic,
        });
    }
    match settings.method {
        CiMethod::Emc => {
            let reference = calculate(reference, settings.statistic)?;
            let model = calculate(model, settings.statistic)?;
            analytic::emc_analytic(model.values(), reference.values())
        }
        CiMethod::EmcMonteCarlo => monte_carlo::emc_monte_carlo(
            reference,
            model,
            settings.statistic,
            settings.average_method,
            settings.trials,
            rng,
        ),
    }
}
