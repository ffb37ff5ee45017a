//! Affine unit conversion of sufficient statistics.
//!
//! A conversion `y = coefficient * x + constant` is applied to the underlying
//! forecast and observation values. Partial sums are not values but moments of
//! values, so the conversion is propagated analytically through the
//! quadratic and cross terms.

use serde::{Deserialize, Serialize};

use crate::{
    Error,
    schema::{
        Ctc, Ecnt, LineType, Nbrcnt, Pstd, Sal1l2, Sample, SampleVisitor, Sl1l2,
        SufficientStatistics, Val1l2, Vcnt, Vl1l2,
    },
};

/// Affine conversion `y = coefficient * x + constant`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitConversion {
    pub coefficient: f64,
    pub constant: f64,
}

impl UnitConversion {
    pub const IDENTITY: Self = Self {
        coefficient: 1.0,
        constant: 0.0,
    };

    #[must_use]
    pub fn new(coefficient: f64, constant: f64) -> Self {
        Self {
            coefficient,
            constant,
        }
    }

    /// Kelvin to degrees Celsius.
    pub const KELVIN_TO_CELSIUS: Self = Self {
        coefficient: 1.0,
        constant: -273.15,
    };

    /// Kelvin to degrees Fahrenheit.
    pub const KELVIN_TO_FAHRENHEIT: Self = Self {
        coefficient: 9.0 / 5.0,
        constant: -459.67,
    };

    /// Meters per second to knots.
    pub const MPS_TO_KNOTS: Self = Self {
        coefficient: 1.943_844_492_440_6,
        constant: 0.0,
    };
}

/// Conversion of one sample record.
pub trait Convert: Sized {
    /// Returns the converted record, or `None` when the schema cannot be
    /// converted.
    fn convert(&self, conversion: &UnitConversion) -> Option<Self>;
}

impl Convert for Sl1l2 {
    fn convert(&self, conversion: &UnitConversion) -> Option<Self> {
        let UnitConversion {
            coefficient: c,
            constant: k,
        } = *conversion;
        Some(Self {
            total: self.total,
            fbar: c * self.fbar + k,
            obar: c * self.obar + k,
            fobar: c * c * self.fobar + c * k * (self.fbar + self.obar) + k * k,
            ffbar: c * c * self.ffbar + 2.0 * c * k * self.fbar + k * k,
            oobar: c * c * self.oobar + 2.0 * c * k * self.obar + k * k,
            mae: c.abs() * self.mae,
        })
    }
}

impl Convert for Sal1l2 {
    fn convert(&self, conversion: &UnitConversion) -> Option<Self> {
        let c = conversion.coefficient;
        Some(Self {
            total: self.total,
            fabar: c * self.fabar,
            oabar: c * self.oabar,
            foabar: c * c * self.foabar,
            ffabar: c * c * self.ffabar,
            ooabar: c * c * self.ooabar,
            mae: c.abs() * self.mae,
        })
    }
}

impl Convert for Vl1l2 {
    fn convert(&self, conversion: &UnitConversion) -> Option<Self> {
        let UnitConversion {
            coefficient: c,
            constant: k,
        } = *conversion;
        Some(Self {
            total: self.total,
            ufbar: c * self.ufbar + k,
            vfbar: c * self.vfbar + k,
            uobar: c * self.uobar + k,
            vobar: c * self.vobar + k,
            uvfobar: c * c * self.uvfobar
                + c * k * (self.ufbar + self.uobar + self.vfbar + self.vobar)
                + 2.0 * k * k,
            uvffbar: c * c * self.uvffbar + 2.0 * c * k * (self.ufbar + self.vfbar) + 2.0 * k * k,
            uvoobar: c * c * self.uvoobar + 2.0 * c * k * (self.uobar + self.vobar) + 2.0 * k * k,
        })
    }
}

impl Convert for Val1l2 {
    fn convert(&self, conversion: &UnitConversion) -> Option<Self> {
        let c = conversion.coefficient;
        Some(Self {
            total: self.total,
            ufabar: c * self.ufabar,
            vfabar: c * self.vfabar,
            uoabar: c * self.uoabar,
            voabar: c * self.voabar,
            uvfoabar: c * c * self.uvfoabar,
            uvffabar: c * c * self.uvffabar,
            uvooabar: c * c * self.uvooabar,
        })
    }
}

impl Convert for Ecnt {
    fn convert(&self, conversion: &UnitConversion) -> Option<Self> {
        let c = conversion.coefficient;
        Some(Self {
            total: self.total,
            crps: c.abs() * self.crps,
            crpss: self.crpss,
            rmse: c.abs() * self.rmse,
            spread: c.abs() * self.spread,
            me: c * self.me,
            mae: c.abs() * self.mae,
        })
    }
}

impl Convert for Vcnt {
    fn convert(&self, _conversion: &UnitConversion) -> Option<Self> {
        None
    }
}

macro_rules! dimensionless {
    ($($record:ident),+) => {
        $(
            impl Convert for $record {
                fn convert(&self, _conversion: &UnitConversion) -> Option<Self> {
                    Some(*self)
                }
            }
        )+
    };
}

dimensionless!(Ctc, Nbrcnt, Pstd);

impl SufficientStatistics {
    /// Applies an optional unit conversion.
    ///
    /// `None` returns an unchanged copy. Schemas that cannot be converted are
    /// an error.
    pub fn convert(&self, conversion: Option<&UnitConversion>) -> Result<Self, Error> {
        struct Converter<'a>(&'a UnitConversion);
        impl SampleVisitor for Converter<'_> {
            type Output = Result<SufficientStatistics, Error>;
            fn visit<R: Sample>(self, line_type: LineType, rows: &[R]) -> Self::Output {
                let rows = rows
                    .iter()
                    .map(|row| row.convert(self.0))
                    .collect::<Option<Vec<_>>>()
                    .ok_or(Error::ConversionUnsupported { line_type })?;
                Ok(R::wrap(line_type, rows))
            }
            fn visit_empty(self, total: &[f64]) -> Self::Output {
                Ok(SufficientStatistics::Empty {
                    total: total.to_vec(),
                })
            }
        }

        let Some(conversion) = conversion else {
            return Ok(self.clone());
        };
        if let Some(line_type @ LineType::Vcnt) = self.line_type() {
            return Err(Error::ConversionUnsupported { line_type });
        }
        self.accept(Converter(conversion))
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::schema::SchemaRecord;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9 * b.abs().max(1.0), "{a} != {b}");
    }

    /// Partial sums of the given forecast/observation pairs.
    fn sl1l2_of(pairs: &[(f64, f64)]) -> Sl1l2 {
        let n = pairs.len() as f64;
        let mean = |f: &dyn Fn(f64, f64) -> f64| pairs.iter().map(|&(a, b)| f(a, b)).sum::<f64>() / n;
        Sl1l2 {
            total: n,
            fbar: mean(&|f, _| f),
            obar: mean(&|_, o| o),
            fobar: mean(&|f, o| f * o),
            ffbar: mean(&|f, _| f * f),
            oobar: mean(&|_, o| o * o),
            mae: mean(&|f, o| (f - o).abs()),
        }
    }

    #[test]
    fn test_sl1l2_matches_converted_values() {
        let pairs = [(280.0, 281.5), (275.5, 274.0), (290.25, 289.0)];
        let conversion = UnitConversion::KELVIN_TO_FAHRENHEIT;
        let apply = |x: f64| conversion.coefficient * x + conversion.constant;
        let converted_pairs = pairs.map(|(f, o)| (apply(f), apply(o)));

        let converted = sl1l2_of(&pairs).convert(&conversion).unwrap();
        let expected = sl1l2_of(&converted_pairs);
        for (a, b) in converted.to_values().into_iter().zip(expected.to_values()) {
            assert_close(a, b);
        }
    }

    #[test]
    fn test_vl1l2_matches_converted_components() {
        let winds = [((1.0, 2.0), (1.5, 1.0)), ((-3.0, 4.0), (-2.0, 5.0))];
        let conversion = UnitConversion::new(2.0, 1.0);
        let apply = |x: f64| 2.0 * x + 1.0;
        let partial_sums = |winds: &[((f64, f64), (f64, f64))]| {
            let n = winds.len() as f64;
            let mean = |g: &dyn Fn((f64, f64), (f64, f64)) -> f64| {
                winds.iter().map(|&(f, o)| g(f, o)).sum::<f64>() / n
            };
            Vl1l2 {
                total: n,
                ufbar: mean(&|f, _| f.0),
                vfbar: mean(&|f, _| f.1),
                uobar: mean(&|_, o| o.0),
                vobar: mean(&|_, o| o.1),
                uvfobar: mean(&|f, o| f.0 * o.0 + f.1 * o.1),
                uvffbar: mean(&|f, _| f.0 * f.0 + f.1 * f.1),
                uvoobar: mean(&|_, o| o.0 * o.0 + o.1 * o.1),
            }
        };
        let converted_winds =
            winds.map(|(f, o)| ((apply(f.0), apply(f.1)), (apply(o.0), apply(o.1))));

        let converted = partial_sums(&winds).convert(&conversion).unwrap();
        let expected = partial_sums(&converted_winds);
        for (a, b) in converted.to_values().into_iter().zip(expected.to_values()) {
            assert_close(a, b);
        }
    }

    #[test]
    fn test_dimensionless_schemas_pass_through() {
        let stats = SufficientStatistics::Ctc(vec![Ctc::from_values(&[10.0, 1.0, 2.0, 3.0, 4.0])]);
        let converted = stats
            .convert(Some(&UnitConversion::KELVIN_TO_CELSIUS))
            .unwrap();
        assert_eq!(converted, stats);
    }

    #[test]
    fn test_vcnt_is_rejected() {
        let stats = SufficientStatistics::Vcnt(vec![Vcnt::default()]);
        assert_eq!(
            stats.convert(Some(&UnitConversion::MPS_TO_KNOTS)),
            Err(Error::ConversionUnsupported {
                line_type: LineType::Vcnt
            })
        );
        assert_eq!(stats.convert(None).unwrap(), stats);
    }

    #[test]
    fn test_ecnt_scales_errors_only() {
        let ecnt = Ecnt::from_values(&[10.0, 2.0, 0.5, 3.0, 1.0, -1.0, 2.5]);
        let converted = ecnt.convert(&UnitConversion::new(-2.0, 100.0)).unwrap();
        assert_eq!(converted.crps, 4.0);
        assert_eq!(converted.crpss, 0.5);
        assert_eq!(converted.me, 2.0);
        assert_eq!(converted.mae, 5.0);
    }

    proptest! {
        #[test]
        fn identity_conversion_is_exact(
            values in prop::collection::vec(-1.0e6..1.0e6_f64, 8)
        ) {
            let sl1l2 = Sl1l2::from_values(&values);
            prop_assert_eq!(sl1l2.convert(&UnitConversion::IDENTITY), Some(sl1l2));
            let vl1l2 = Vl1l2::from_values(&values);
            prop_assert_eq!(vl1l2.convert(&UnitConversion::IDENTITY), Some(vl1l2));
            let sal1l2 = Sal1l2::from_values(&values);
            prop_assert_eq!(sal1l2.convert(&UnitConversion::IDENTITY), Some(sal1l2));
        }
    }
}
