// =============================================================================
// Linear Regression — trailing-window OLS slope and one-step projection
// =============================================================================
//
// Values are regressed against their position index 0..n-1:
//
//   slope = (n*Σxy - Σx*Σy) / (n*Σxx - (Σx)^2)
//
// The denominator is the (scaled) index variance; it is zero only when n < 2.

/// Ordinary least-squares fit of `values` against their index.
/// Returns `(slope, intercept)`, or `None` for fewer than two points.
fn fit(values: &[f64]) -> Option<(f64, f64)> {
    let n = values.len();
    if n < 2 {
        return None;
    }

    let (mut sx, mut sy, mut sxx, mut sxy) = (0.0, 0.0, 0.0, 0.0);
    for (i, &y) in values.iter().enumerate() {
        let x = i as f64;
        sx += x;
        sy += y;
        sxx += x * x;
        sxy += x * y;
    }

    let nf = n as f64;
    let denom = nf * sxx - sx * sx;
    if denom == 0.0 {
        return None;
    }
    let slope = (nf * sxy - sx * sy) / denom;
    let intercept = (sy - slope * sx) / nf;
    if !slope.is_finite() || !intercept.is_finite() {
        return None;
    }
    Some((slope, intercept))
}

/// Slope of the trailing `period` closes.
///
/// `None` when fewer than `period` closes exist or `period < 2`.
pub fn trailing_slope(closes: &[f64], period: usize) -> Option<f64> {
    if period < 2 || closes.len() < period {
        return None;
    }
    fit(&closes[closes.len() - period..]).map(|(slope, _)| slope)
}

/// Naive next-bar forecast: fit a line through the last `min(60, len)` closes
/// and evaluate it one step past the window. Needs at least 5 closes.
pub fn next_close_forecast(closes: &[f64]) -> Option<f64> {
    let n = closes.len().min(60);
    if n < 5 {
        return None;
    }
    let (slope, intercept) = fit(&closes[closes.len() - n..])?;
    Some(intercept + slope * n as f64)
}
