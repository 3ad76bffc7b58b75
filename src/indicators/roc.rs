// =============================================================================
// Rate of Change (ROC) — Momentum Indicator
// =============================================================================
//
// ROC measures the percentage change in price over a look-back period:
//   ROC = (close / close_n - 1) * 100
//
// Positive ROC indicates upward momentum; negative indicates downward.

/// Return the most recent ROC value.
///
/// `None` when fewer than `period + 1` closes exist.
pub fn current_roc(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() <= period {
        return None;
    }
    let last = closes.len() - 1;
    ratio_change(closes[last], closes[last - period])
}

fn ratio_change(latest: f64, reference: f64) -> Option<f64> {
    if reference == 0.0 {
        return None;
    }
    let roc = (latest / reference - 1.0) * 100.0;
    roc.is_finite().then_some(roc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roc_basic() {
        let closes: Vec<f64> = (1..=15).map(|x| x as f64).collect();
        // From 1 to 15: ROC = (15/1 - 1) * 100 = 1400%
        assert!((current_roc(&closes, 14).unwrap() - 1400.0).abs() < 1e-10);
    }

    #[test]
    fn roc_insufficient_data() {
        let closes = vec![1.0, 2.0, 3.0];
        assert!(current_roc(&closes, 3).is_none());
        assert!(current_roc(&closes, 2).is_some());
    }

    #[test]
    fn current_roc_five_day() {
        let closes = vec![100.0, 1.0, 1.0, 1.0, 1.0, 110.0];
        assert!((current_roc(&closes, 5).unwrap() - 10.0).abs() < 1e-10);
    }

    #[test]
    fn zero_reference_is_undefined() {
        assert!(current_roc(&[0.0, 5.0], 1).is_none());
    }
}
