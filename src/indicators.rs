//! Moving-average indicators derived from candle closes.
//!
//! Every function here is pure: the same candles always produce the same
//! series, and nothing is cached between calls.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::models::candle::Candle;

/// Decimal places kept on every indicator value.
const INDICATOR_DP: u32 = 2;

/// A series aligned 1:1 with the candles it was computed from.
///
/// `None` marks positions without enough history for the window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSeries {
    pub window: usize,
    pub values: Vec<Option<Decimal>>,
}

impl IndicatorSeries {
    /// Legend name, e.g. `MA5`.
    pub fn name(&self) -> String {
        format!("MA{}", self.window)
    }

    /// Value at `index`, or `None` for a sentinel or out-of-range index.
    pub fn value_at(&self, index: usize) -> Option<Decimal> {
        self.values.get(index).copied().flatten()
    }
}

/// Simple moving average of `close` over `window` candles.
///
/// Index `i < window - 1` is `None`; index `i >= window - 1` is the mean
/// of closes `[i - window + 1, i]` rounded half away from zero to two
/// decimal places. A zero window yields an all-`None` series.
pub fn moving_average(candles: &[Candle], window: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(candles.len());
    if window == 0 {
        values.resize(candles.len(), None);
        return IndicatorSeries { window, values };
    }

    let divisor = Decimal::from(window as u64);
    let mut sum = Decimal::ZERO;
    for (i, candle) in candles.iter().enumerate() {
        sum += candle.close;
        if i >= window {
            sum -= candles[i - window].close;
        }
        if i + 1 < window {
            values.push(None);
        } else {
            let mean = (sum / divisor)
                .round_dp_with_strategy(INDICATOR_DP, RoundingStrategy::MidpointAwayFromZero);
            values.push(Some(mean));
        }
    }

    IndicatorSeries { window, values }
}

/// Computes one independent series per window, in the given order.
pub fn moving_averages(candles: &[Candle], windows: &[usize]) -> Vec<IndicatorSeries> {
    windows
        .iter()
        .map(|&window| moving_average(candles, window))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn candles(closes: &[Decimal]) -> Vec<Candle> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                timestamp: format!("2024-01-{:02}T00:00:00", i + 1),
                open: close,
                high: close,
                low: close,
                close,
                volume: dec!(100),
            })
            .collect()
    }

    #[test]
    fn window_of_three_matches_hand_computed_means() {
        let series = moving_average(
            &candles(&[dec!(10), dec!(12), dec!(11), dec!(14), dec!(13)]),
            3,
        );

        assert_eq!(
            series.values,
            vec![None, None, Some(dec!(11.00)), Some(dec!(12.33)), Some(dec!(12.67))]
        );
        assert_eq!(series.name(), "MA3");
    }

    #[test]
    fn short_history_is_all_sentinel() {
        let input = candles(&[dec!(1), dec!(2), dec!(3), dec!(4)]);
        for window in 5..=30 {
            let series = moving_average(&input, window);
            assert_eq!(series.values.len(), input.len());
            assert!(series.values.iter().all(Option::is_none), "window {window}");
        }
    }

    #[test]
    fn output_length_always_equals_input_length() {
        for n in 0..40 {
            let input = candles(&vec![dec!(7.5); n]);
            for window in [0, 1, 5, 10, 20, 30] {
                assert_eq!(moving_average(&input, window).values.len(), n);
            }
        }
    }

    #[test]
    fn window_of_one_echoes_closes() {
        let input = candles(&[dec!(3.14), dec!(2.72), dec!(1.41)]);
        let series = moving_average(&input, 1);
        assert_eq!(
            series.values,
            vec![Some(dec!(3.14)), Some(dec!(2.72)), Some(dec!(1.41))]
        );
    }

    #[test]
    fn recomputation_is_deterministic() {
        let input = candles(&[
            dec!(10.01),
            dec!(10.37),
            dec!(9.88),
            dec!(10.52),
            dec!(11.03),
            dec!(10.94),
            dec!(11.40),
        ]);
        let first = moving_averages(&input, &[2, 3, 5]);
        let second = moving_averages(&input, &[2, 3, 5]);
        assert_eq!(first, second);
    }

    #[test]
    fn running_sum_matches_direct_mean() {
        let closes: Vec<Decimal> = (1..=25).map(|i| Decimal::from(i * i % 17)).collect();
        let input = candles(&closes);
        let window = 4;
        let series = moving_average(&input, window);

        for i in (window - 1)..closes.len() {
            let direct: Decimal = closes[i + 1 - window..=i].iter().sum::<Decimal>()
                / Decimal::from(window as u64);
            assert_eq!(
                series.values[i],
                Some(direct.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
            );
        }
    }

    #[test]
    fn windows_are_independent() {
        let input = candles(&[dec!(1), dec!(2), dec!(3), dec!(4), dec!(5)]);
        let all = moving_averages(&input, &[5, 2]);
        assert_eq!(all[0].window, 5);
        assert_eq!(all[0].values[4], Some(dec!(3)));
        assert_eq!(all[1].window, 2);
        assert_eq!(all[1].values[1], Some(dec!(1.5)));
        assert_eq!(all[1], moving_average(&input, 2));
    }
}
