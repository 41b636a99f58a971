use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// A height range `[start_height, end_height)` with a constant block reward.
/// `end_height = None` means the epoch is still running.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HalvingEpoch {
    pub start_height: i64,
    pub end_height: Option<i64>,
    pub reward_per_block: f64,
}

impl HalvingEpoch {
    /// Number of blocks of `[start, current)` that fall inside this epoch.
    pub fn overlap(&self, start: i64, current: i64) -> i64 {
        let hi = match self.end_height {
            Some(end) => end.min(current),
            None => current,
        };
        let lo = self.start_height.max(start);
        hi.saturating_sub(lo).max(0)
    }
}

/// The three epochs since the 2018 start height (12.5 / 6.25 / 3.125 BTC).
pub fn default_epochs() -> Vec<HalvingEpoch> {
    vec![
        HalvingEpoch { start_height: 499_500, end_height: Some(630_000), reward_per_block: 12.5 },
        HalvingEpoch { start_height: 630_000, end_height: Some(840_000), reward_per_block: 6.25 },
        HalvingEpoch { start_height: 840_000, end_height: None, reward_per_block: 3.125 },
    ]
}

#[derive(Debug, Clone, PartialEq)]
pub struct HalvingSchedule {
    epochs: Vec<HalvingEpoch>,
}

impl HalvingSchedule {
    /// Epochs must be contiguous, ordered, and the reward must drop at
    /// every boundary. Only the last epoch may be open-ended.
    pub fn new(epochs: Vec<HalvingEpoch>) -> ModelResult<Self> {
        if epochs.is_empty() {
            return Err(ModelError::InvalidSchedule("no epochs"));
        }
        for pair in epochs.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            let Some(end) = a.end_height else {
                return Err(ModelError::InvalidSchedule("open-ended epoch before the last"));
            };
            if end != b.start_height {
                return Err(ModelError::InvalidSchedule("epochs are not contiguous"));
            }
            if b.reward_per_block >= a.reward_per_block {
                return Err(ModelError::InvalidSchedule("reward does not decrease at boundary"));
            }
        }
        for e in &epochs {
            if e.end_height.is_some_and(|end| end <= e.start_height) {
                return Err(ModelError::InvalidSchedule("empty or inverted epoch"));
            }
            if !(e.reward_per_block.is_finite() && e.reward_per_block > 0.0) {
                return Err(ModelError::InvalidSchedule("reward must be positive"));
            }
        }
        Ok(Self { epochs })
    }

    /// Total coins emitted by blocks in `[start_height, current_height)`.
    /// Inverted or out-of-range inputs contribute zero.
    pub fn emitted_coins(&self, start_height: i64, current_height: i64) -> f64 {
        self.epochs
            .iter()
            .map(|e| e.overlap(start_height, current_height) as f64 * e.reward_per_block)
            .sum()
    }

    /// Block reward in effect at `height`, or `None` below the first epoch.
    pub fn reward_at(&self, height: i64) -> Option<f64> {
        self.epochs
            .iter()
            .find(|e| height >= e.start_height && e.end_height.is_none_or(|end| height < end))
            .map(|e| e.reward_per_block)
    }
}

impl Default for HalvingSchedule {
    fn default() -> Self {
        Self { epochs: default_epochs() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: i64 = 499_500;

    #[test]
    fn epoch_totals_match_known_heights() {
        let s = HalvingSchedule::default();
        assert_eq!(s.emitted_coins(START, 630_000), 1_631_250.0);
        assert_eq!(s.emitted_coins(START, 840_000), 2_943_750.0);
        assert_eq!(s.emitted_coins(START, 900_000), 3_131_250.0);
    }

    #[test]
    fn inverted_range_is_zero() {
        let s = HalvingSchedule::default();
        assert_eq!(s.emitted_coins(START, START - 1), 0.0);
        assert_eq!(s.emitted_coins(START, 0), 0.0);
        assert_eq!(s.emitted_coins(START, -5), 0.0);
        assert_eq!(s.emitted_coins(900_000, 700_000), 0.0);
    }

    #[test]
    fn extreme_heights_do_not_overflow() {
        let s = HalvingSchedule::default();
        assert_eq!(s.emitted_coins(START, i64::MIN), 0.0);
        assert_eq!(s.emitted_coins(i64::MAX, i64::MIN), 0.0);
        let all = s.emitted_coins(i64::MIN, i64::MAX);
        assert!(all.is_finite() && all > 0.0);
    }

    #[test]
    fn continuous_across_boundaries_and_slope_halves() {
        let s = HalvingSchedule::default();
        for b in [630_000_i64, 840_000] {
            let before = s.emitted_coins(START, b - 1);
            let at = s.emitted_coins(START, b);
            let after = s.emitted_coins(START, b + 1);
            let slope_in = at - before;
            let slope_out = after - at;
            assert_eq!(slope_out * 2.0, slope_in, "reward should halve at {b}");
        }
    }

    #[test]
    fn start_inside_later_epoch() {
        let s = HalvingSchedule::default();
        assert_eq!(s.emitted_coins(800_000, 850_000), 40_000.0 * 6.25 + 10_000.0 * 3.125);
    }

    #[test]
    fn reward_at_uses_half_open_ranges() {
        let s = HalvingSchedule::default();
        assert_eq!(s.reward_at(629_999), Some(12.5));
        assert_eq!(s.reward_at(630_000), Some(6.25));
        assert_eq!(s.reward_at(840_000), Some(3.125));
        assert_eq!(s.reward_at(1), None);
    }

    #[test]
    fn rejects_non_halving_schedule() {
        let mut epochs = default_epochs();
        epochs[1].reward_per_block = 12.5;
        assert!(HalvingSchedule::new(epochs).is_err());

        let mut gap = default_epochs();
        gap[1].start_height = 631_000;
        assert!(HalvingSchedule::new(gap).is_err());

        assert!(HalvingSchedule::new(default_epochs()).is_ok());
    }
}
