//! Per-schema sufficient-statistic records.
//!
//! Each MET line type gets one plain record type whose fields are exactly the
//! columns that line type contributes. Records are `Copy` values; conversion
//! and resampling always build new ones.

/// Common behaviour of every sufficient-statistic record.
pub trait SchemaRecord: Copy + Default + std::fmt::Debug + 'static {
    /// Column names in field order. `TOTAL` is always first.
    const COLUMNS: &'static [&'static str];

    /// Builds a record from values in [`Self::COLUMNS`] order; missing
    /// trailing values read as `NaN`.
    fn from_values(values: &[f64]) -> Self;

    /// Values in [`Self::COLUMNS`] order.
    fn to_values(&self) -> Vec<f64>;

    /// The sample count of the record.
    fn total(&self) -> f64;

    /// `true` when every field is finite.
    fn is_finite(&self) -> bool;

    /// Adds `other` field by field.
    fn accumulate(&mut self, other: &Self);

    /// Multiplies every field by `factor`.
    #[must_use]
    fn scaled(&self, factor: f64) -> Self;

    /// Record with every field set to `NaN`.
    #[must_use]
    fn undefined() -> Self;
}

/// Field-wise mean over the finite records of `rows`.
///
/// Rows with any non-finite field are skipped; the result is all `NaN` when no
/// row is finite.
#[expect(clippy::cast_precision_loss)]
pub fn mean_record<'a, R, I>(rows: I) -> R
where
    R: SchemaRecord,
    I: IntoIterator<Item = &'a R>,
{
    let mut sum = R::default();
    let mut count = 0_usize;
    for row in rows.into_iter().filter(|row| row.is_finite()) {
        sum.accumulate(row);
        count += 1;
    }
    if count == 0 {
        R::undefined()
    } else {
        sum.scaled(1.0 / count as f64)
    }
}

macro_rules! schema_record {
    (
        $(#[$meta:meta])*
        $name:ident { $($field:ident => $column:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq)]
        pub struct $name {
            $(pub $field: f64,)+
        }

        impl SchemaRecord for $name {
            const COLUMNS: &'static [&'static str] = &[$($column),+];

            fn from_values(values: &[f64]) -> Self {
                let mut values = values.iter().copied();
                Self {
                    $($field: values.next().unwrap_or(f64::NAN),)+
                }
            }

            fn to_values(&self) -> Vec<f64> {
                vec![$(self.$field),+]
            }

            fn total(&self) -> f64 {
                self.total
            }

            fn is_finite(&self) -> bool {
                $(self.$field.is_finite())&&+
            }

            fn accumulate(&mut self, other: &Self) {
                $(self.$field += other.$field;)+
            }

            fn scaled(&self, factor: f64) -> Self {
                Self {
                    $($field: self.$field * factor,)+
                }
            }

            fn undefined() -> Self {
                Self {
                    $($field: f64::NAN,)+
                }
            }
        }
    };
}

schema_record! {
    /// Scalar partial sums (`SL1L2`).
    Sl1l2 {
        total => "TOTAL",
        fbar => "FBAR",
        obar => "OBAR",
        fobar => "FOBAR",
        ffbar => "FFBAR",
        oobar => "OOBAR",
        mae => "MAE",
    }
}

schema_record! {
    /// Scalar anomaly partial sums (`SAL1L2`).
    Sal1l2 {
        total => "TOTAL",
        fabar => "FABAR",
        oabar => "OABAR",
        foabar => "FOABAR",
        ffabar => "FFABAR",
        ooabar => "OOABAR",
        mae => "MAE",
    }
}

schema_record! {
    /// Vector partial sums (`VL1L2`).
    Vl1l2 {
        total => "TOTAL",
        ufbar => "UFBAR",
        vfbar => "VFBAR",
        uobar => "UOBAR",
        vobar => "VOBAR",
        uvfobar => "UVFOBAR",
        uvffbar => "UVFFBAR",
        uvoobar => "UVOOBAR",
    }
}

schema_record! {
    /// Vector anomaly partial sums (`VAL1L2`).
    Val1l2 {
        total => "TOTAL",
        ufabar => "UFABAR",
        vfabar => "VFABAR",
        uoabar => "UOABAR",
        voabar => "VOABAR",
        uvfoabar => "UVFOABAR",
        uvffabar => "UVFFABAR",
        uvooabar => "UVOOABAR",
    }
}

schema_record! {
    /// Vector continuous statistics (`VCNT`).
    Vcnt {
        total => "TOTAL",
        fbar => "FBAR",
        obar => "OBAR",
        fs_rms => "FS_RMS",
        os_rms => "OS_RMS",
        msve => "MSVE",
        rmsve => "RMSVE",
        fstdev => "FSTDEV",
        ostdev => "OSTDEV",
        fdir => "FDIR",
        odir => "ODIR",
        fbar_speed => "FBAR_SPEED",
        obar_speed => "OBAR_SPEED",
        vdiff_speed => "VDIFF_SPEED",
        vdiff_dir => "VDIFF_DIR",
        speed_err => "SPEED_ERR",
        dir_err => "DIR_ERR",
    }
}

schema_record! {
    /// 2×2 contingency table counts (`CTC`, `NBRCTC`, and folded `MCTC`).
    Ctc {
        total => "TOTAL",
        fy_oy => "FY_OY",
        fy_on => "FY_ON",
        fn_oy => "FN_OY",
        fn_on => "FN_ON",
    }
}

schema_record! {
    /// Neighborhood continuous scores (`NBRCNT`).
    Nbrcnt {
        total => "TOTAL",
        fbs => "FBS",
        fss => "FSS",
        afss => "AFSS",
        ufss => "UFSS",
        f_rate => "F_RATE",
        o_rate => "O_RATE",
    }
}

schema_record! {
    /// Ensemble continuous statistics (`ECNT`).
    Ecnt {
        total => "TOTAL",
        crps => "CRPS",
        crpss => "CRPSS",
        rmse => "RMSE",
        spread => "SPREAD",
        me => "ME",
        mae => "MAE",
    }
}

schema_record! {
    /// Probabilistic statistics (`PSTD`).
    Pstd {
        total => "TOTAL",
        roc_auc => "ROC_AUC",
        brier => "BRIER",
        bss => "BSS",
        bss_smpl => "BSS_SMPL",
    }
}
