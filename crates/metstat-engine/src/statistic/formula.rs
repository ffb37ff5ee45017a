//! Closed-form statistic formulas, one table per schema.
//!
//! Every formula maps one sample's record to one value. The same tables serve
//! per-sample series, aggregated records and resampled replicates. Division by
//! zero yields `NaN`.

use crate::schema::{Ctc, Ecnt, Nbrcnt, Pstd, Sal1l2, Sl1l2, Val1l2, Vcnt, Vl1l2};

use super::Statistic;

/// A formula over one sample record.
pub type Formula<R> = fn(&R) -> f64;

/// The `(statistic → formula)` table of a schema.
pub trait FormulaTable: Sized + 'static {
    /// Supported statistics, keyed by canonical statistic.
    const FORMULAS: &'static [(Statistic, Formula<Self>)];

    /// Looks up the formula of a scalar statistic, following aliases.
    #[must_use]
    fn formula(statistic: Statistic) -> Option<Formula<Self>> {
        let statistic = statistic.canonical();
        Self::FORMULAS
            .iter()
            .find(|(s, _)| *s == statistic)
            .map(|(_, formula)| *formula)
    }
}

/// `numerator / denominator`, `NaN` when the denominator is zero.
#[must_use]
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        f64::NAN
    } else {
        numerator / denominator
    }
}

/// Second moments shared by the scalar and vector partial-sum schemas.
#[derive(Debug, Clone, Copy)]
struct Moments {
    var_f: f64,
    var_o: f64,
    covar: f64,
    mse: f64,
}

impl Moments {
    fn bcrmse(self) -> f64 {
        (self.var_f + self.var_o - 2.0 * self.covar).sqrt()
    }

    fn msess(self) -> f64 {
        1.0 - ratio(self.mse, self.var_o)
    }

    fn rsd(self) -> f64 {
        ratio(self.var_f.sqrt(), self.var_o.sqrt())
    }

    fn pcor(self) -> f64 {
        ratio(self.covar, (self.var_f * self.var_o).sqrt())
    }

    fn rmse_pv(self) -> f64 {
        let spread = (self.var_f * self.var_o).sqrt();
        (self.var_f + self.var_o - 2.0 * spread * self.pcor()).sqrt()
    }
}

mod scalar {
    use super::{Moments, Sl1l2};

    pub(super) fn moments(r: &Sl1l2) -> Moments {
        Moments {
            var_f: r.ffbar - r.fbar * r.fbar,
            var_o: r.oobar - r.obar * r.obar,
            covar: r.fobar - r.fbar * r.obar,
            mse: r.ffbar + r.oobar - 2.0 * r.fobar,
        }
    }

    pub(super) fn me(r: &Sl1l2) -> f64 {
        r.fbar - r.obar
    }

    pub(super) fn rmse(r: &Sl1l2) -> f64 {
        moments(r).mse.sqrt()
    }

    pub(super) fn bcrmse(r: &Sl1l2) -> f64 {
        moments(r).bcrmse()
    }

    pub(super) fn msess(r: &Sl1l2) -> f64 {
        moments(r).msess()
    }

    pub(super) fn rsd(r: &Sl1l2) -> f64 {
        moments(r).rsd()
    }

    pub(super) fn rmse_md(r: &Sl1l2) -> f64 {
        (r.fbar - r.obar).abs()
    }

    pub(super) fn rmse_pv(r: &Sl1l2) -> f64 {
        moments(r).rmse_pv()
    }

    pub(super) fn pcor(r: &Sl1l2) -> f64 {
        moments(r).pcor()
    }
}

impl FormulaTable for Sl1l2 {
    const FORMULAS: &'static [(Statistic, Formula<Self>)] = &[
        (Statistic::Me, scalar::me),
        (Statistic::Rmse, scalar::rmse),
        (Statistic::Bcrmse, scalar::bcrmse),
        (Statistic::Msess, scalar::msess),
        (Statistic::Rsd, scalar::rsd),
        (Statistic::RmseMd, scalar::rmse_md),
        (Statistic::RmsePv, scalar::rmse_pv),
        (Statistic::Pcor, scalar::pcor),
        (Statistic::Fbar, |r| r.fbar),
        (Statistic::Obar, |r| r.obar),
        (Statistic::Mae, |r| r.mae),
    ];
}

impl FormulaTable for Sal1l2 {
    const FORMULAS: &'static [(Statistic, Formula<Self>)] = &[(Statistic::Acc, |r| {
        let covar = r.foabar - r.fabar * r.oabar;
        let var_f = r.ffabar - r.fabar * r.fabar;
        let var_o = r.ooabar - r.oabar * r.oabar;
        ratio(covar, (var_f * var_o).sqrt())
    })];
}

mod vector {
    use super::{Moments, Vl1l2};

    pub(super) fn moments(r: &Vl1l2) -> Moments {
        Moments {
            var_f: r.uvffbar - r.ufbar * r.ufbar - r.vfbar * r.vfbar,
            var_o: r.uvoobar - r.uobar * r.uobar - r.vobar * r.vobar,
            covar: r.uvfobar - r.ufbar * r.uobar - r.vfbar * r.vobar,
            mse: r.uvffbar + r.uvoobar - 2.0 * r.uvfobar,
        }
    }

    pub(super) fn me(r: &Vl1l2) -> f64 {
        r.uvffbar.sqrt() - r.uvoobar.sqrt()
    }

    pub(super) fn rmse(r: &Vl1l2) -> f64 {
        moments(r).mse.sqrt()
    }

    pub(super) fn bcrmse(r: &Vl1l2) -> f64 {
        moments(r).bcrmse()
    }

    pub(super) fn msess(r: &Vl1l2) -> f64 {
        moments(r).msess()
    }

    pub(super) fn rsd(r: &Vl1l2) -> f64 {
        moments(r).rsd()
    }

    pub(super) fn rmse_md(r: &Vl1l2) -> f64 {
        (r.ufbar - r.uobar).hypot(r.vfbar - r.vobar)
    }

    pub(super) fn rmse_pv(r: &Vl1l2) -> f64 {
        moments(r).rmse_pv()
    }

    pub(super) fn pcor(r: &Vl1l2) -> f64 {
        moments(r).pcor()
    }
}

impl FormulaTable for Vl1l2 {
    const FORMULAS: &'static [(Statistic, Formula<Self>)] = &[
        (Statistic::Me, vector::me),
        (Statistic::Rmse, vector::rmse),
        (Statistic::Bcrmse, vector::bcrmse),
        (Statistic::Msess, vector::msess),
        (Statistic::Rsd, vector::rsd),
        (Statistic::RmseMd, vector::rmse_md),
        (Statistic::RmsePv, vector::rmse_pv),
        (Statistic::Pcor, vector::pcor),
        (Statistic::Fbar, |r| r.uvffbar.sqrt()),
        (Statistic::Obar, |r| r.uvoobar.sqrt()),
    ];
}

impl FormulaTable for Val1l2 {
    const FORMULAS: &'static [(Statistic, Formula<Self>)] = &[(Statistic::Acc, |r| {
        ratio(r.uvfoabar, (r.uvffabar * r.uvooabar).sqrt())
    })];
}

impl FormulaTable for Vcnt {
    const FORMULAS: &'static [(Statistic, Formula<Self>)] = &[
        (Statistic::Me, |r| r.fbar - r.obar),
        (Statistic::Fbar, |r| r.fbar),
        (Statistic::Obar, |r| r.obar),
        (Statistic::Rsd, |r| ratio(r.fstdev, r.ostdev)),
        (Statistic::SpeedErr, |r| r.speed_err),
        (Statistic::DirErr, |r| r.dir_err),
        (Statistic::Rmsve, |r| r.rmsve),
        (Statistic::VdiffSpeed, |r| r.vdiff_speed),
        (Statistic::VdiffDir, |r| r.vdiff_dir),
        (Statistic::FbarSpeed, |r| r.fbar_speed),
        (Statistic::ObarSpeed, |r| r.obar_speed),
        (Statistic::FbarDir, |r| r.fdir),
        (Statistic::ObarDir, |r| r.odir),
    ];
}

/// Contingency table scores. `a` hits, `b` false alarms, `c` misses and
/// `d` correct negatives.
///
/// The sample size is the sum of the four cells, not `TOTAL`: a row whose
/// `TOTAL` disagrees with its cells is scored on the cells alone.
mod contingency {
    use super::{Ctc, ratio};

    fn cells(r: &Ctc) -> (f64, f64, f64, f64) {
        (r.fy_oy, r.fy_on, r.fn_oy, r.fn_on)
    }

    /// Cell sum; `TOTAL` is ignored.
    fn n(r: &Ctc) -> f64 {
        r.fy_oy + r.fy_on + r.fn_oy + r.fn_on
    }

    pub(super) fn fbias(r: &Ctc) -> f64 {
        let (a, b, c, _) = cells(r);
        ratio(a + b, a + c)
    }

    pub(super) fn orate(r: &Ctc) -> f64 {
        let (a, _, c, _) = cells(r);
        ratio(a + c, n(r))
    }

    pub(super) fn frate(r: &Ctc) -> f64 {
        let (a, b, _, _) = cells(r);
        ratio(a + b, n(r))
    }

    pub(super) fn accuracy(r: &Ctc) -> f64 {
        let (a, _, _, d) = cells(r);
        ratio(a + d, n(r))
    }

    pub(super) fn pod(r: &Ctc) -> f64 {
        let (a, _, c, _) = cells(r);
        ratio(a, a + c)
    }

    pub(super) fn pofd(r: &Ctc) -> f64 {
        let (_, b, _, d) = cells(r);
        ratio(b, b + d)
    }

    pub(super) fn podn(r: &Ctc) -> f64 {
        let (_, b, _, d) = cells(r);
        ratio(d, b + d)
    }

    pub(super) fn faratio(r: &Ctc) -> f64 {
        let (a, b, _, _) = cells(r);
        ratio(b, a + b)
    }

    pub(super) fn sratio(r: &Ctc) -> f64 {
        1.0 - faratio(r)
    }

    pub(super) fn csi(r: &Ctc) -> f64 {
        let (a, b, c, _) = cells(r);
        ratio(a, a + b + c)
    }

    pub(super) fn gss(r: &Ctc) -> f64 {
        let (a, b, c, _) = cells(r);
        let chance = ratio((a + b) * (a + c), n(r));
        ratio(a - chance, a + b + c - chance)
    }

    pub(super) fn hk(r: &Ctc) -> f64 {
        let (a, b, c, d) = cells(r);
        ratio(a * d - b * c, (a + c) * (b + d))
    }

    pub(super) fn hss(r: &Ctc) -> f64 {
        let (a, b, c, d) = cells(r);
        let total = n(r);
        let chance = ratio((a + b) * (a + c) + (c + d) * (b + d), total);
        ratio(a + d - chance, total - chance)
    }
}

impl FormulaTable for Ctc {
    const FORMULAS: &'static [(Statistic, Formula<Self>)] = &[
        (Statistic::Me, contingency::fbias),
        (Statistic::Fbias, contingency::fbias),
        (Statistic::Orate, contingency::orate),
        (Statistic::Frate, contingency::frate),
        (Statistic::Accuracy, contingency::accuracy),
        (Statistic::Pod, contingency::pod),
        (Statistic::Pofd, contingency::pofd),
        (Statistic::Podn, contingency::podn),
        (Statistic::Faratio, contingency::faratio),
        (Statistic::Sratio, contingency::sratio),
        (Statistic::Csi, contingency::csi),
        (Statistic::Gss, contingency::gss),
        (Statistic::Hk, contingency::hk),
        (Statistic::Hss, contingency::hss),
    ];
}

impl FormulaTable for Nbrcnt {
    const FORMULAS: &'static [(Statistic, Formula<Self>)] = &[
        (Statistic::Fbs, |r| r.fbs),
        (Statistic::Fss, |r| r.fss),
        (Statistic::Afss, |r| r.afss),
        (Statistic::Ufss, |r| r.ufss),
        (Statistic::Frate, |r| r.f_rate),
        (Statistic::Orate, |r| r.o_rate),
    ];
}

impl FormulaTable for Ecnt {
    const FORMULAS: &'static [(Statistic, Formula<Self>)] = &[
        (Statistic::Crps, |r| r.crps),
        (Statistic::Crpss, |r| r.crpss),
        (Statistic::Rmse, |r| r.rmse),
        (Statistic::Spread, |r| r.spread),
        (Statistic::Me, |r| r.me),
        (Statistic::Mae, |r| r.mae),
    ];
}

impl FormulaTable for Pstd {
    const FORMULAS: &'static [(Statistic, Formula<Self>)] = &[
        (Statistic::Bs, |r| r.brier),
        (Statistic::Bss, |r| r.bss),
        (Statistic::BssSmpl, |r| r.bss_smpl),
        (Statistic::RocArea, |r| r.roc_auc),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaRecord;

    fn ctc(a: f64, b: f64, c: f64, d: f64) -> Ctc {
        Ctc {
            total: a + b + c + d,
            fy_oy: a,
            fy_on: b,
            fn_oy: c,
            fn_on: d,
        }
    }

    fn eval<R: FormulaTable>(record: &R, statistic: Statistic) -> f64 {
        R::formula(statistic).unwrap()(record)
    }

    #[test]
    fn test_contingency_size_is_cell_sum() {
        let record = Ctc {
            total: 1000.0,
            ..ctc(10.0, 5.0, 10.0, 75.0)
        };
        assert_eq!(eval(&record, Statistic::Orate), 0.2);
        assert_eq!(eval(&record, Statistic::Accuracy), 0.85);
    }

    #[test]
    fn test_scalar_partial_sums() {
        // forecasts 1, 3 against observations 0, 4
        let record = Sl1l2 {
            total: 2.0,
            fbar: 2.0,
            obar: 2.0,
            fobar: 6.0,
            ffbar: 5.0,
            oobar: 8.0,
            mae: 1.0,
        };
        assert_eq!(eval(&record, Statistic::Me), 0.0);
        assert_eq!(eval(&record, Statistic::Rmse), 1.0);
        assert_eq!(eval(&record, Statistic::Bcrmse), 1.0);
        assert_eq!(eval(&record, Statistic::Pcor), 1.0);
        assert_eq!(eval(&record, Statistic::Rsd), 0.5);
        assert_eq!(eval(&record, Statistic::RmsePv), 1.0);
        assert_eq!(eval(&record, Statistic::Msess), 0.75);
        assert_eq!(eval(&record, Statistic::RmseMd), 0.0);
    }

    #[test]
    fn test_msess_with_constant_observations_is_nan() {
        let record = Sl1l2::from_values(&[2.0, 1.0, 5.0, 5.0, 1.0, 25.0, 4.0]);
        assert!(eval(&record, Statistic::Msess).is_nan());
    }

    #[test]
    fn test_accuracy_decomposition() {
        let record = ctc(12.0, 3.0, 5.0, 80.0);
        let n = 100.0;
        let hits_share = record.fy_oy / n;
        let correct_negative_share = record.fn_on / n;
        assert!(
            (eval(&record, Statistic::Accuracy) - (hits_share + correct_negative_share)).abs()
                < 1e-12
        );
    }

    #[test]
    fn test_contingency_scores() {
        let record = ctc(50.0, 20.0, 10.0, 20.0);
        assert!((eval(&record, Statistic::Fbias) - 70.0 / 60.0).abs() < 1e-12);
        assert!((eval(&record, Statistic::Csi) - 50.0 / 80.0).abs() < 1e-12);
        assert_eq!(eval(&record, Statistic::Ts), eval(&record, Statistic::Csi));
        assert_eq!(eval(&record, Statistic::Hrate), eval(&record, Statistic::Pod));
        assert!((eval(&record, Statistic::Pofd) - 0.5).abs() < 1e-12);
        // chance hits 70 * 60 / 100 = 42
        assert!((eval(&record, Statistic::Ets) - 8.0 / 38.0).abs() < 1e-12);
        assert!((eval(&record, Statistic::Hk) - (1000.0 - 200.0) / (60.0 * 40.0)).abs() < 1e-12);
        // expected correct by chance (4200 + 1200) / 100 = 54
        assert!((eval(&record, Statistic::Hss) - 16.0 / 46.0).abs() < 1e-12);
        assert_eq!(eval(&record, Statistic::Me), eval(&record, Statistic::Fbias));
    }

    #[test]
    fn test_zero_denominators_yield_nan() {
        let record = ctc(0.0, 0.0, 0.0, 10.0);
        assert!(eval(&record, Statistic::Pod).is_nan());
        assert!(eval(&record, Statistic::Fbias).is_nan());
        assert!(eval(&record, Statistic::Csi).is_nan());
        assert_eq!(eval(&record, Statistic::Pofd), 0.0);
    }

    #[test]
    fn test_vector_partial_sums() {
        let record = Vl1l2 {
            total: 1.0,
            ufbar: 3.0,
            vfbar: 4.0,
            uobar: 0.0,
            vobar: 0.0,
            uvfobar: 0.0,
            uvffbar: 25.0,
            uvoobar: 0.0,
        };
        assert_eq!(eval(&record, Statistic::Fbar), 5.0);
        assert_eq!(eval(&record, Statistic::Me), 5.0);
        assert_eq!(eval(&record, Statistic::RmseMd), 5.0);
        assert_eq!(eval(&record, Statistic::Rmse), 5.0);
    }

    #[test]
    fn test_unsupported_pairs_have_no_formula() {
        assert!(Sal1l2::formula(Statistic::Rmse).is_none());
        assert!(Ctc::formula(Statistic::Rmse).is_none());
        assert!(Pstd::formula(Statistic::Me).is_none());
        assert!(Sl1l2::formula(Statistic::FbarObar).is_none());
    }
}
