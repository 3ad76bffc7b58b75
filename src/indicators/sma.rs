// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================
//
// SMA_t = mean(close_{t-n+1} ..= close_t)
//
// The series is computed with a running sum: the newest close is added and
// the close leaving the window is subtracted, so the whole series costs O(N).
// Indices with fewer than `period` trailing closes carry `None`.
// =============================================================================

/// Compute the SMA series, aligned index-for-index with `closes`.
///
/// `result[i]` is `None` for `i < period - 1` and for every index when
/// `period == 0`.
pub fn calculate_sma(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; closes.len()];
    if period == 0 {
        return result;
    }

    let mut sum = 0.0;
    for (i, &close) in closes.iter().enumerate() {
        sum += close;
        if i >= period {
            sum -= closes[i - period];
        }
        if i + 1 >= period {
            result[i] = Some(sum / period as f64);
        }
    }
    result
}

/// Return the SMA value at the last index, or `None` when there are fewer
/// than `period` closes.
pub fn current_sma(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period {
        return None;
    }
    let window = &closes[closes.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_undefined_before_window_fills() {
        let closes = vec![1.0, 2.0, 3.0, 4.0];
        let sma = calculate_sma(&closes, 3);
        assert_eq!(sma.len(), 4);
        assert!(sma[0].is_none());
        assert!(sma[1].is_none());
        assert!((sma[2].unwrap() - 2.0).abs() < 1e-12);
        assert!((sma[3].unwrap() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn sma_matches_window_mean_everywhere() {
        let closes: Vec<f64> = (0..300)
            .map(|i| 100.0 + (i as f64 * 0.37).sin() * 12.0 + i as f64 * 0.05)
            .collect();
        for &n in &[1usize, 5, 20, 50, 200] {
            let sma = calculate_sma(&closes, n);
            for i in 0..closes.len() {
                if i + 1 < n {
                    assert!(sma[i].is_none());
                } else {
                    let window = &closes[i + 1 - n..=i];
                    let mean = window.iter().sum::<f64>() / n as f64;
                    assert!((sma[i].unwrap() - mean).abs() < 1e-8, "n={n} i={i}");
                }
            }
        }
    }

    #[test]
    fn sma_period_zero_is_all_none() {
        assert!(calculate_sma(&[1.0, 2.0], 0).iter().all(Option::is_none));
        assert!(current_sma(&[1.0, 2.0], 0).is_none());
    }

    #[test]
    fn current_sma_agrees_with_series() {
        let closes: Vec<f64> = (1..=60).map(|x| x as f64).collect();
        assert_eq!(current_sma(&closes, 20), *calculate_sma(&closes, 20).last().unwrap());
        assert!(current_sma(&closes, 61).is_none());
    }
}
