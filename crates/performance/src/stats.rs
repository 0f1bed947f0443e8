//! Small statistics helpers shared by the tracker and the estimator

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Arithmetic mean; 0.0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation; 0.0 with fewer than two values
pub fn stdev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

/// Mean pnl over its standard deviation; 0.0 when the stdev is zero or
/// undefined rather than an error.
pub fn sharpe_like(pnls: &[f64]) -> f64 {
    let sd = stdev(pnls);
    if sd == 0.0 {
        return 0.0;
    }
    mean(pnls) / sd
}

/// Peak-to-trough decline of the cumulative pnl curve, >= 0
pub fn max_drawdown(pnls: &[Decimal]) -> Decimal {
    let mut cumulative = Decimal::ZERO;
    let mut peak = Decimal::ZERO;
    let mut worst = Decimal::ZERO;

    for pnl in pnls {
        cumulative += pnl;
        if cumulative > peak {
            peak = cumulative;
        }
        let drawdown = peak - cumulative;
        if drawdown > worst {
            worst = drawdown;
        }
    }
    worst
}

/// Pearson correlation; None when either side is degenerate
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let mx = mean(xs);
    let my = mean(ys);

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mx;
        let dy = y - my;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

/// Lossy pnl conversion for statistical use only; monetary math stays
/// in Decimal.
pub fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}
