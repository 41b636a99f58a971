use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One observation of a dense price series (timestamp in ms since epoch).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct PricePoint {
    pub timestamp_ms: i64,
    pub price: f64,
}

/// A chart-ready point: `x` is a fractional year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub x: f64,
    pub y: f64,
}

/// `year + (day_of_year - 1) / days_per_year`
pub fn fractional_year(date: NaiveDate, days_per_year: f64) -> f64 {
    date.year() as f64 + (date.ordinal0() as f64) / days_per_year
}

/// Keeps every `stride`-th point (starting with the first) and reprojects
/// its timestamp onto a UTC fractional year. Order is preserved; points with
/// an unrepresentable timestamp are dropped rather than guessed.
pub fn sample(series: &[PricePoint], stride: usize, days_per_year: f64) -> Vec<SeriesPoint> {
    series
        .iter()
        .step_by(stride.max(1))
        .filter_map(|p| {
            let date = DateTime::<Utc>::from_timestamp_millis(p.timestamp_ms)?.date_naive();
            Some(SeriesPoint { x: fractional_year(date, days_per_year), y: p.price })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY_MS: i64 = 86_400_000;
    // 2018-01-01T00:00:00Z
    const START_MS: i64 = 1_514_764_800_000;

    fn daily(n: usize) -> Vec<PricePoint> {
        (0..n)
            .map(|i| PricePoint {
                timestamp_ms: START_MS + i as i64 * DAY_MS,
                price: 10_000.0 + i as f64,
            })
            .collect()
    }

    #[test]
    fn takes_every_seventh_point() {
        let out = sample(&daily(15), 7, 365.25);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].y, 10_000.0);
        assert_eq!(out[1].y, 10_007.0);
        assert_eq!(out[2].y, 10_014.0);
        assert_eq!(out[0].x, 2018.0);
        assert!((out[1].x - (2018.0 + 7.0 / 365.25)).abs() < 1e-12);
    }

    #[test]
    fn keeps_order_across_year_end() {
        let out = sample(&daily(800), 7, 365.25);
        assert!(out.windows(2).all(|w| w[1].x > w[0].x));
        assert_eq!(out.first().map(|p| p.x), Some(2018.0));
    }

    #[test]
    fn empty_in_empty_out() {
        assert!(sample(&[], 7, 365.25).is_empty());
    }

    #[test]
    fn zero_stride_keeps_everything() {
        assert_eq!(sample(&daily(5), 0, 365.25).len(), 5);
    }
}
