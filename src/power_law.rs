//! Power-law price model: `price(days) = A * days^exponent`, with `days`
//! counted from the genesis date. `A` is always derived from one reference
//! (price, days) pair, so changing the exponent means recalibrating.

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    error::{ModelError, ModelResult},
    history::SeriesPoint,
};

/// Whole days from `origin` to `date`; negative before the origin.
pub fn days_since_origin(origin: NaiveDate, date: NaiveDate) -> i64 {
    (date - origin).num_days()
}

/// Days from `origin` to July 1st of `year`.
pub fn days_to_midyear(origin: NaiveDate, year: i32) -> ModelResult<i64> {
    let mid = NaiveDate::from_ymd_opt(year, 7, 1).ok_or(ModelError::InvalidParameter {
        name: "year",
        value: year as f64,
        reason: "not a representable calendar year",
    })?;
    Ok(days_since_origin(origin, mid))
}

/// `A = price / days^exponent`.
pub fn calibrate(reference_price: f64, reference_days: f64, exponent: f64) -> ModelResult<f64> {
    if !(reference_days.is_finite() && reference_days > 0.0) {
        return Err(ModelError::NonPositiveElapsedDays { days: reference_days });
    }
    if !(reference_price.is_finite() && reference_price > 0.0) {
        return Err(ModelError::InvalidParameter {
            name: "reference_price",
            value: reference_price,
            reason: "must be positive",
        });
    }
    check_exponent(exponent)?;

    // ln A = ln P - e ln d keeps the intermediate within range for large d^e.
    let coefficient = (reference_price.ln() - exponent * reference_days.ln()).exp();
    if !(coefficient.is_finite() && coefficient > 0.0) {
        return Err(ModelError::NonFiniteResult { days: reference_days, exponent });
    }
    Ok(coefficient)
}

/// `price = A * days^exponent`.
pub fn evaluate(coefficient: f64, days: f64, exponent: f64) -> ModelResult<f64> {
    if !(days.is_finite() && days > 0.0) {
        return Err(ModelError::NonPositiveElapsedDays { days });
    }
    check_exponent(exponent)?;

    let price = (coefficient.ln() + exponent * days.ln()).exp();
    if !price.is_finite() {
        return Err(ModelError::NonFiniteResult { days, exponent });
    }
    Ok(price)
}

fn check_exponent(exponent: f64) -> ModelResult<()> {
    if exponent.is_finite() && exponent > 0.0 {
        Ok(())
    } else {
        Err(ModelError::InvalidParameter {
            name: "exponent",
            value: exponent,
            reason: "must be a positive real",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PowerLawModel {
    coefficient: f64,
    exponent: f64,
}

impl PowerLawModel {
    /// Pins the curve to `(reference_days, reference_price)`.
    pub fn calibrated(
        reference_price: f64,
        reference_days: f64,
        exponent: f64,
    ) -> ModelResult<Self> {
        let coefficient = calibrate(reference_price, reference_days, exponent)?;
        Ok(Self { coefficient, exponent })
    }

    pub fn coefficient(&self) -> f64 {
        self.coefficient
    }

    pub fn exponent(&self) -> f64 {
        self.exponent
    }

    pub fn price_at(&self, days: f64) -> ModelResult<f64> {
        evaluate(self.coefficient, days, self.exponent)
    }

    /// Curve points every `step_days` from `from_days` through
    /// `from_days + horizon_days`, x expressed as a fractional year.
    pub fn curve(
        &self,
        from_days: i64,
        horizon_days: i64,
        step_days: i64,
        days_per_year: f64,
    ) -> ModelResult<Vec<SeriesPoint>> {
        if step_days <= 0 {
            return Err(ModelError::InvalidParameter {
                name: "step_days",
                value: step_days as f64,
                reason: "must be positive",
            });
        }
        let mut points = Vec::with_capacity((horizon_days.max(0) / step_days + 1) as usize);
        let mut offset = 0;
        while offset <= horizon_days {
            let day = from_days + offset;
            points.push(SeriesPoint {
                x: 2009.0 + day as f64 / days_per_year,
                y: self.price_at(day as f64)?,
            });
            offset += step_days;
        }
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genesis() -> NaiveDate {
        NaiveDate::from_ymd_opt(2009, 1, 3).unwrap()
    }

    fn rel_close(a: f64, b: f64) -> bool {
        ((a - b) / b).abs() < 1e-12
    }

    #[test]
    fn round_trip_reproduces_reference_price() {
        let a = calibrate(97_304.0, 6117.0, 5.6).unwrap();
        assert!(rel_close(a, 97_304.0 / 6117f64.powf(5.6)));
        assert!(rel_close(evaluate(a, 6117.0, 5.6).unwrap(), 97_304.0));

        for &(p, d, e) in &[(1.0, 1.0, 4.0), (123_000.0, 10_000.0, 7.0), (0.05, 550.0, 4.3)] {
            let a = calibrate(p, d, e).unwrap();
            assert!(rel_close(evaluate(a, d, e).unwrap(), p), "p={p} d={d} e={e}");
        }
    }

    #[test]
    fn rejects_non_positive_days() {
        assert_eq!(
            calibrate(97_304.0, 0.0, 5.6),
            Err(ModelError::NonPositiveElapsedDays { days: 0.0 })
        );
        assert!(matches!(
            calibrate(97_304.0, -3.0, 5.6),
            Err(ModelError::NonPositiveElapsedDays { .. })
        ));
        assert!(evaluate(1e-17, 0.0, 5.6).is_err());
        assert!(calibrate(97_304.0, f64::NAN, 5.6).is_err());
    }

    #[test]
    fn large_days_and_exponent_stay_finite() {
        let a = calibrate(97_304.0, 6022.0, 7.0).unwrap();
        let p = evaluate(a, 20_000.0, 7.0).unwrap();
        assert!(p.is_finite() && p > 97_304.0);
    }

    #[test]
    fn elapsed_days() {
        let g = genesis();
        assert_eq!(days_since_origin(g, g), 0);
        assert_eq!(days_since_origin(g, NaiveDate::from_ymd_opt(2009, 1, 1).unwrap()), -2);
        assert_eq!(days_to_midyear(g, 2025).unwrap(), 6022);
        assert_eq!(days_to_midyear(g, 2026).unwrap(), 6387);
    }

    #[test]
    fn curve_starts_at_reference_and_rises() {
        let m = PowerLawModel::calibrated(97_304.0, 6117.0, 5.6).unwrap();
        let pts = m.curve(6117, 5 * 365, 30, 365.25).unwrap();
        assert_eq!(pts.len(), 5 * 365 / 30 + 1);
        assert!(rel_close(pts[0].y, 97_304.0));
        assert!(pts.windows(2).all(|w| w[1].x > w[0].x && w[1].y > w[0].y));
        assert!(m.curve(6117, 100, 0, 365.25).is_err());
    }
}
