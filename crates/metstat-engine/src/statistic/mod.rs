//! Verification statistics and their derivation from sufficient statistics.
//!
//! - [`Statistic`]: the catalog of statistic names, aliases and display names
//! - [`formula`]: the `(schema, statistic)` formula tables
//! - [`calculator`]: per-sample derived statistic series

use std::str::FromStr;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::Error;

pub mod calculator;
pub mod formula;

/// A verification statistic, addressed by its lower-case name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Statistic {
    #[default]
    Me,
    Rmse,
    Bcrmse,
    Msess,
    Rsd,
    RmseMd,
    RmsePv,
    Pcor,
    Acc,
    Mae,
    Fbar,
    Obar,
    FbarObar,
    FbarSpeed,
    ObarSpeed,
    FbarObarSpeed,
    FbarDir,
    ObarDir,
    FbarObarDir,
    SpeedErr,
    DirErr,
    Rmsve,
    VdiffSpeed,
    VdiffDir,
    Orate,
    Baser,
    Frate,
    OrateFrate,
    BaserFrate,
    Accuracy,
    Fbias,
    Pod,
    Hrate,
    Pofd,
    Farate,
    Podn,
    Faratio,
    Sratio,
    Csi,
    Ts,
    Gss,
    Ets,
    Hk,
    Tss,
    Pss,
    Hss,
    Fbs,
    Fss,
    Afss,
    Ufss,
    Crps,
    Crpss,
    Spread,
    Bs,
    Bss,
    BssSmpl,
    RocArea,
}

impl Statistic {
    pub const ALL: [Statistic; 57] = [
        Statistic::Me,
        Statistic::Rmse,
        Statistic::Bcrmse,
        Statistic::Msess,
        Statistic::Rsd,
        Statistic::RmseMd,
        Statistic::RmsePv,
        Statistic::Pcor,
        Statistic::Acc,
        Statistic::Mae,
        Statistic::Fbar,
        Statistic::Obar,
        Statistic::FbarObar,
        Statistic::FbarSpeed,
        Statistic::ObarSpeed,
        Statistic::FbarObarSpeed,
        Statistic::FbarDir,
        Statistic::ObarDir,
        Statistic::FbarObarDir,
        Statistic::SpeedErr,
        Statistic::DirErr,
        Statistic::Rmsve,
        Statistic::VdiffSpeed,
        Statistic::VdiffDir,
        Statistic::Orate,
        Statistic::Baser,
        Statistic::Frate,
        Statistic::OrateFrate,
        Statistic::BaserFrate,
        Statistic::Accuracy,
        Statistic::Fbias,
        Statistic::Pod,
        Statistic::Hrate,
        Statistic::Pofd,
        Statistic::Farate,
        Statistic::Podn,
        Statistic::Faratio,
        Statistic::Sratio,
        Statistic::Csi,
        Statistic::Ts,
        Statistic::Gss,
        Statistic::Ets,
        Statistic::Hk,
        Statistic::Tss,
        Statistic::Pss,
        Statistic::Hss,
        Statistic::Fbs,
        Statistic::Fss,
        Statistic::Afss,
        Statistic::Ufss,
        Statistic::Crps,
        Statistic::Crpss,
        Statistic::Spread,
        Statistic::Bs,
        Statistic::Bss,
        Statistic::BssSmpl,
        Statistic::RocArea,
    ];

    /// The lower-case name used in configuration and on the command line.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.describe().0
    }

    /// Human-readable name used for labelling.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        self.describe().1
    }

    fn describe(self) -> (&'static str, &'static str) {
        match self {
            Statistic::Me => ("me", "Mean Error (i.e., Bias)"),
            Statistic::Rmse => ("rmse", "Root Mean Square Error"),
            Statistic::Bcrmse => ("bcrmse", "Bias-Corrected Root Mean Square Error"),
            Statistic::Msess => ("msess", "Mean Squared Error Skill Score"),
            Statistic::Rsd => ("rsd", "Ratio of the Standard Deviation"),
            Statistic::RmseMd => ("rmse_md", "Root Mean Square Error from Mean Error"),
            Statistic::RmsePv => ("rmse_pv", "Root Mean Square Error from Pattern Variation"),
            Statistic::Pcor => ("pcor", "Pattern Correlation"),
            Statistic::Acc => ("acc", "Anomaly Correlation Coefficient"),
            Statistic::Mae => ("mae", "Mean Absolute Error"),
            Statistic::Fbar => ("fbar", "Forecast Averages"),
            Statistic::Obar => ("obar", "Observation Averages"),
            Statistic::FbarObar => ("fbar_obar", "Average Forecast and Observation"),
            Statistic::FbarSpeed => ("fbar_speed", "Mean Forecast Wind Speed"),
            Statistic::ObarSpeed => ("obar_speed", "Mean Observed Wind Speed"),
            Statistic::FbarObarSpeed => ("fbar_obar_speed", "Average Wind Speed"),
            Statistic::FbarDir => ("fbar_dir", "Mean Forecast Wind Direction"),
            Statistic::ObarDir => ("obar_dir", "Mean Observed Wind Direction"),
            Statistic::FbarObarDir => ("fbar_obar_dir", "Average Wind Direction"),
            Statistic::SpeedErr => ("speed_err", "Difference in Average Wind Speed"),
            Statistic::DirErr => ("dir_err", "Difference in Average Wind Direction"),
            Statistic::Rmsve => ("rmsve", "Root Mean Square Difference Vector Error"),
            Statistic::VdiffSpeed => ("vdiff_speed", "Difference Vector Speed"),
            Statistic::VdiffDir => ("vdiff_dir", "Difference Vector Direction"),
            Statistic::Orate => ("orate", "Observation Rate"),
            Statistic::Baser => ("baser", "Base Rate"),
            Statistic::Frate => ("frate", "Forecast Rate"),
            Statistic::OrateFrate => ("orate_frate", "Observation and Forecast Rates"),
            Statistic::BaserFrate => ("baser_frate", "Base Rate and Forecast Rate"),
            Statistic::Accuracy => ("accuracy", "Accuracy"),
            Statistic::Fbias => ("fbias", "Frequency Bias"),
            Statistic::Pod => ("pod", "Probability of Detection"),
            Statistic::Hrate => ("hrate", "Hit Rate"),
            Statistic::Pofd => ("pofd", "Probability of False Detection"),
            Statistic::Farate => ("farate", "False Alarm Rate"),
            Statistic::Podn => ("podn", "Probability of Detection of the Non-Event"),
            Statistic::Faratio => ("faratio", "False Alarm Ratio"),
            Statistic::Sratio => ("sratio", "Success Ratio"),
            Statistic::Csi => ("csi", "Critical Success Index"),
            Statistic::Ts => ("ts", "Threat Score"),
            Statistic::Gss => ("gss", "Gilbert Skill Score"),
            Statistic::Ets => ("ets", "Equitable Threat Score"),
            Statistic::Hk => ("hk", "Hanssen-Kuipers Discriminant"),
            Statistic::Tss => ("tss", "True Skill Score"),
            Statistic::Pss => ("pss", "Peirce Skill Score"),
            Statistic::Hss => ("hss", "Heidke Skill Score"),
            Statistic::Fbs => ("fbs", "Fractions Brier Score"),
            Statistic::Fss => ("fss", "Fractions Skill Score"),
            Statistic::Afss => ("afss", "Asymptotic Fractions Skill Score"),
            Statistic::Ufss => ("ufss", "Uniform Fractions Skill Score"),
            Statistic::Crps => ("crps", "Continuous Ranked Probability Score"),
            Statistic::Crpss => ("crpss", "Continuous Ranked Probability Skill Score"),
            Statistic::Spread => ("spread", "Ensemble Spread"),
            Statistic::Bs => ("bs", "Brier Score"),
            Statistic::Bss => ("bss", "Brier Skill Score"),
            Statistic::BssSmpl => ("bss_smpl", "Brier Skill Score (Sample Climatology)"),
            Statistic::RocArea => ("roc_area", "Area Under the ROC Curve"),
        }
    }

    /// Maps aliases onto the statistic whose formula they share.
    ///
    /// ```
    /// use metstat_engine::statistic::Statistic;
    ///
    /// assert_eq!(Statistic::Ets.canonical(), Statistic::Gss);
    /// assert_eq!(Statistic::Pss.canonical(), Statistic::Hk);
    /// assert_eq!(Statistic::Rmse.canonical(), Statistic::Rmse);
    /// ```
    #[must_use]
    pub fn canonical(self) -> Self {
        match self {
            Statistic::Ts => Statistic::Csi,
            Statistic::Hrate => Statistic::Pod,
            Statistic::Farate => Statistic::Pofd,
            Statistic::Ets => Statistic::Gss,
            Statistic::Tss | Statistic::Pss => Statistic::Hk,
            Statistic::Baser => Statistic::Orate,
            Statistic::BaserFrate => Statistic::OrateFrate,
            other => other,
        }
    }

    /// The scalar statistics a composite statistic is made of.
    ///
    /// Scalar statistics return themselves as their only component.
    #[must_use]
    pub fn components(self) -> ArrayVec<Statistic, 2> {
        let mut components = ArrayVec::new();
        match self.canonical() {
            Statistic::FbarObar => components.extend([Statistic::Fbar, Statistic::Obar]),
            Statistic::FbarObarSpeed => {
                components.extend([Statistic::FbarSpeed, Statistic::ObarSpeed]);
            }
            Statistic::FbarObarDir => components.extend([Statistic::FbarDir, Statistic::ObarDir]),
            Statistic::OrateFrate => components.extend([Statistic::Orate, Statistic::Frate]),
            scalar => components.push(scalar),
        }
        components
    }

    /// `true` when the statistic yields more than one value per sample.
    #[must_use]
    pub fn is_composite(self) -> bool {
        self.components().len() > 1
    }
}

impl std::fmt::Display for Statistic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Statistic {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Statistic::ALL
            .into_iter()
            .find(|statistic| statistic.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownStatistic { name: s.to_owned() })
    }
}

impl TryFrom<String> for Statistic {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Statistic> for &'static str {
    fn from(statistic: Statistic) -> Self {
        statistic.name()
    }
}
