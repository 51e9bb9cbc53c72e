//! True range and Wilder smoothing, the building blocks of the super trend.
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|).
//! Wilder smoothing is an EMA with alpha = 1/period, seeded with the mean of
//! the first `period` consecutive valid values.

use crate::domain::Bar;

/// Compute the True Range series from bars.
/// TR[0] = high[0] - low[0] (no previous close).
pub fn true_range(bars: &[Bar]) -> Vec<f64> {
    let n = bars.len();
    let mut tr = vec![f64::NAN; n];

    if n == 0 {
        return tr;
    }

    tr[0] = bars[0].high - bars[0].low;

    for i in 1..n {
        let h = bars[i].high;
        let l = bars[i].low;
        let pc = bars[i - 1].close;
        tr[i] = if h.is_nan() || l.is_nan() || pc.is_nan() {
            f64::NAN
        } else {
            (h - l).max((h - pc).abs()).max((l - pc).abs())
        };
    }

    tr
}

/// Apply Wilder smoothing to a series. A NaN input breaks the chain; the
/// smoother re-seeds once `period` consecutive valid values are seen again.
pub fn wilder_smooth(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 {
        return result;
    }

    let p = period as f64;
    let mut prev: Option<f64> = None;
    let mut seed_sum = 0.0;
    let mut seed_count = 0;

    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            prev = None;
            seed_sum = 0.0;
            seed_count = 0;
            continue;
        }
        match prev {
            Some(last) => {
                let next = (last * (p - 1.0) + v) / p;
                result[i] = next;
                prev = Some(next);
            }
            None => {
                seed_sum += v;
                seed_count += 1;
                if seed_count == period {
                    let seed = seed_sum / p;
                    result[i] = seed;
                    prev = Some(seed);
                }
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_ohlc_bars, DEFAULT_EPSILON};

    #[test]
    fn true_range_uses_previous_close() {
        let bars = make_ohlc_bars(&[
            (10.0, 11.0, 9.0, 10.0),
            (12.0, 13.0, 12.0, 12.5),
            (12.0, 12.5, 8.0, 9.0),
        ]);
        let tr = true_range(&bars);
        assert_approx(tr[0], 2.0, DEFAULT_EPSILON);
        // gap up: |13 - 10| = 3
        assert_approx(tr[1], 3.0, DEFAULT_EPSILON);
        // |8 - 12.5| = 4.5
        assert_approx(tr[2], 4.5, DEFAULT_EPSILON);
    }

    #[test]
    fn wilder_seed_and_recursion() {
        let out = wilder_smooth(&[2.0, 4.0, 6.0, 8.0], 3);
        assert!(out[0].is_nan());
        assert!(out[1].is_nan());
        assert_approx(out[2], 4.0, DEFAULT_EPSILON);
        // (4 * 2 + 8) / 3
        assert_approx(out[3], 16.0 / 3.0, DEFAULT_EPSILON);
    }

    #[test]
    fn wilder_reseeds_after_gap() {
        let out = wilder_smooth(&[1.0, 1.0, f64::NAN, 3.0, 5.0], 2);
        assert_approx(out[1], 1.0, DEFAULT_EPSILON);
        assert!(out[2].is_nan());
        assert!(out[3].is_nan());
        assert_approx(out[4], 4.0, DEFAULT_EPSILON);
    }

    #[test]
    fn empty_input() {
        assert!(true_range(&[]).is_empty());
        assert!(wilder_smooth(&[], 5).is_empty());
    }
}
