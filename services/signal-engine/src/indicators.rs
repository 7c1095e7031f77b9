//! Rolling-window primitives
//!
//! Every function maps an input column to an output column of the same
//! length. `None` marks an undefined value: a window that is not yet full,
//! or a window that contains an undefined input. Results that come out
//! non-finite are reported as `None` as well.

/// Keep finite values only.
fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Apply `f` to every full window of `window` defined values ending at each
/// index.
fn rolling<F>(values: &[Option<f64>], window: usize, f: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> f64,
{
    let mut out = vec![None; values.len()];
    if window == 0 {
        return out;
    }

    let mut buf = Vec::with_capacity(window);
    for end in (window - 1)..values.len() {
        buf.clear();
        buf.extend(values[end + 1 - window..=end].iter().flatten().copied());
        if buf.len() == window {
            out[end] = finite(f(&buf));
        }
    }
    out
}

/// Trailing arithmetic mean.
pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, |w| w.iter().sum::<f64>() / w.len() as f64)
}

/// Trailing sample standard deviation (n − 1 denominator).
pub fn rolling_std(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    if window < 2 {
        return vec![None; values.len()];
    }
    rolling(values, window, |w| {
        let n = w.len() as f64;
        let mean = w.iter().sum::<f64>() / n;
        let ss: f64 = w.iter().map(|x| (x - mean) * (x - mean)).sum();
        (ss / (n - 1.0)).sqrt()
    })
}

/// Trailing maximum.
pub fn rolling_max(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, |w| w.iter().copied().fold(f64::NEG_INFINITY, f64::max))
}

/// Trailing minimum.
pub fn rolling_min(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, |w| w.iter().copied().fold(f64::INFINITY, f64::min))
}

/// Shift a column forward by `periods`, so index `i` sees `i - periods`.
pub fn shift(values: &[Option<f64>], periods: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    for i in periods..values.len() {
        out[i] = values[i - periods];
    }
    out
}

/// First difference: `p[i] - p[i-1]`.
pub fn diff(prices: &[f64]) -> Vec<Option<f64>> {
    let mut out = vec![None; prices.len()];
    for i in 1..prices.len() {
        out[i] = finite(prices[i] - prices[i - 1]);
    }
    out
}

/// Simple return: `p[i] / p[i-1] - 1`.
pub fn pct_change(prices: &[f64]) -> Vec<Option<f64>> {
    let mut out = vec![None; prices.len()];
    for i in 1..prices.len() {
        out[i] = finite(prices[i] / prices[i - 1] - 1.0);
    }
    out
}

/// RSI from simple (not Wilder-smoothed) rolling means of gains and losses.
///
/// `rs = avg_gain / avg_loss` is evaluated in plain IEEE arithmetic: with no
/// losses in the window the ratio is infinite and the RSI lands on exactly
/// 100; a window with neither gains nor losses gives 0/0 and the RSI is
/// undefined.
pub fn simple_rsi(prices: &[f64], window: usize) -> Vec<Option<f64>> {
    let delta = diff(prices);
    let gains: Vec<Option<f64>> = delta.iter().map(|d| d.map(|d| d.max(0.0))).collect();
    let losses: Vec<Option<f64>> = delta.iter().map(|d| d.map(|d| (-d).max(0.0))).collect();

    let avg_gain = rolling_mean(&gains, window);
    let avg_loss = rolling_mean(&losses, window);

    avg_gain
        .iter()
        .zip(avg_loss.iter())
        .map(|(g, l)| match (g, l) {
            (Some(g), Some(l)) => {
                let rs = g / l;
                let rsi = 100.0 - 100.0 / (1.0 + rs);
                // 0/0 propagates as NaN and is filtered here.
                finite(rsi)
            }
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defined(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    fn approx(a: Option<f64>, b: f64) -> bool {
        a.map(|a| (a - b).abs() < 1e-9).unwrap_or(false)
    }

    #[test]
    fn test_rolling_mean_warmup() {
        let out = rolling_mean(&defined(&[1.0, 2.0, 3.0, 4.0]), 3);
        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        assert!(approx(out[2], 2.0));
        assert!(approx(out[3], 3.0));
    }

    #[test]
    fn test_rolling_window_with_hole_is_undefined() {
        let values = vec![Some(1.0), None, Some(3.0), Some(4.0), Some(5.0)];
        let out = rolling_mean(&values, 3);
        assert_eq!(out[2], None);
        assert_eq!(out[3], None);
        assert!(approx(out[4], 4.0));
    }

    #[test]
    fn test_rolling_std_is_sample_std() {
        let out = rolling_std(&defined(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]), 8);
        // population std is 2.0; sample std is sqrt(32/7)
        assert!(approx(out[7], (32.0f64 / 7.0).sqrt()));
        assert!(rolling_std(&defined(&[1.0, 2.0]), 1).iter().all(Option::is_none));
    }

    #[test]
    fn test_rolling_extremes_and_shift() {
        let values = defined(&[3.0, 1.0, 4.0, 1.0, 5.0]);
        let high = shift(&rolling_max(&values, 2), 1);
        let low = shift(&rolling_min(&values, 2), 1);
        assert_eq!(high[..2], [None, None]);
        assert!(approx(high[2], 3.0));
        assert!(approx(high[4], 4.0));
        assert!(approx(low[4], 1.0));
    }

    #[test]
    fn test_pct_change_and_diff() {
        let prices = [100.0, 110.0, 99.0];
        let ret = pct_change(&prices);
        assert_eq!(ret[0], None);
        assert!(approx(ret[1], 0.1));
        assert!(approx(ret[2], -0.1));

        let d = diff(&prices);
        assert!(approx(d[2], -11.0));
    }

    #[test]
    fn test_pct_change_from_zero_is_undefined() {
        let ret = pct_change(&[0.0, 1.0]);
        assert_eq!(ret[1], None);
    }

    #[test]
    fn test_rsi_saturates_without_losses() {
        let prices: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let rsi = simple_rsi(&prices, 14);
        assert!(rsi[..14].iter().all(Option::is_none));
        assert_eq!(rsi[14], Some(100.0));
        assert_eq!(rsi[19], Some(100.0));
    }

    #[test]
    fn test_rsi_zero_without_gains() {
        let prices: Vec<f64> = (0..16).map(|i| 100.0 - i as f64).collect();
        let rsi = simple_rsi(&prices, 14);
        assert_eq!(rsi[15], Some(0.0));
    }

    #[test]
    fn test_rsi_flat_window_is_undefined() {
        let prices = vec![50.0; 20];
        assert!(simple_rsi(&prices, 14).iter().all(Option::is_none));
    }

    #[test]
    fn test_rsi_uses_simple_means() {
        // Alternating +2 / -1 moves: over 14 deltas, 7 gains of 2 and 7 losses of 1.
        let mut prices = vec![100.0];
        for i in 0..14 {
            let last = *prices.last().unwrap();
            prices.push(if i % 2 == 0 { last + 2.0 } else { last - 1.0 });
        }
        let rsi = simple_rsi(&prices, 14);
        // avg_gain = 1.0, avg_loss = 0.5, rs = 2
        assert!(approx(rsi[14], 100.0 - 100.0 / 3.0));
    }
}
