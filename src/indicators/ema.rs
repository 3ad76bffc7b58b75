// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula:
//   multiplier = 2 / (period + 1)
//   EMA_0      = close_0
//   EMA_t      = close_t * multiplier + EMA_{t-1} * (1 - multiplier)
//
// Unlike the SMA, the series is seeded with the very first close and is
// therefore defined for every input point.
// =============================================================================

/// Compute the EMA series for the given `closes` slice and look-back `period`.
///
/// The output has the same length as `closes`. A `period` of zero is treated
/// as one (multiplier 1.0, i.e. the series tracks the closes exactly).
pub fn calculate_ema(closes: &[f64], period: usize) -> Vec<f64> {
    let multiplier = 2.0 / (period.max(1) + 1) as f64;

    let mut result = Vec::with_capacity(closes.len());
    let mut prev: Option<f64> = None;
    for &close in closes {
        let ema = match prev {
            None => close,
            Some(p) => close * multiplier + p * (1.0 - multiplier),
        };
        result.push(ema);
        prev = Some(ema);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_empty_input() {
        assert!(calculate_ema(&[], 5).is_empty());
    }

    #[test]
    fn ema_seeded_with_first_close() {
        let closes = vec![10.0, 11.0, 12.0];
        let ema = calculate_ema(&closes, 20);
        assert_eq!(ema.len(), closes.len());
        assert_eq!(ema[0], 10.0);
    }

    #[test]
    fn ema_known_values() {
        let closes: Vec<f64> = (1..=10).map(|x| x as f64).collect();
        let ema = calculate_ema(&closes, 5);

        let k = 2.0 / 6.0;
        let mut expected = closes[0];
        assert!((ema[0] - expected).abs() < 1e-12);
        for i in 1..closes.len() {
            expected = closes[i] * k + expected * (1.0 - k);
            assert!((ema[i] - expected).abs() < 1e-10, "index {i}: got {}, expected {expected}", ema[i]);
        }
    }

    #[test]
    fn ema_flat_series_stays_flat() {
        let ema = calculate_ema(&[100.0; 50], 20);
        assert!(ema.iter().all(|v| (v - 100.0).abs() < 1e-12));
    }

    #[test]
    fn ema_period_zero_tracks_closes() {
        let closes = vec![1.0, 5.0, 2.0];
        assert_eq!(calculate_ema(&closes, 0), closes);
    }
}
