use ndarray::ArrayView1;
use statrs::distribution::{ContinuousCDF, StudentsT};
use statrs::function::beta::ln_beta;

use crate::error::{PicError, Result};
use crate::matrix::center;

/// Spread, in units of `EPSILON * |mean|`, that is still rounding noise.
const CONSTANT_ULPS: f64 = 64.0;
/// Variance floor for columns centered near zero.
const CONSTANT_ABS_VAR: f64 = 1e-24;
/// Below this the CDF tail loses precision; switch to the log-space series.
const TAIL_SWITCH_P: f64 = 1e-280;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimpleOls {
    pub intercept: f64,
    pub slope: f64,
    pub se: f64,
    pub t: f64,
    pub df: f64,
    pub pval: f64,
    /// Computed in log space, so it keeps ordering where `pval` underflows.
    pub neg_log10_p: f64,
}

/// `-log10 p` for a representable p; p is floored at the smallest normal f64.
pub fn neg_log10(pval: f64) -> f64 {
    if pval.is_nan() {
        return f64::NAN;
    }
    -pval.max(f64::MIN_POSITIVE).log10()
}

pub fn is_constant(x: ArrayView1<'_, f64>) -> bool {
    if x.len() < 2 {
        return true;
    }
    let (mean, ss) = center(x);
    let var = ss / x.len() as f64;
    let rounding = (CONSTANT_ULPS * f64::EPSILON * mean.abs()).powi(2);
    !var.is_finite() || var <= rounding.max(CONSTANT_ABS_VAR)
}

/// Two-sided `-log10 p` of a Student-t statistic with `df` degrees of freedom.
///
/// Uses `2·sf(|t|)` while that is representable. Past [`TAIL_SWITCH_P`] it
/// evaluates `ln I_x(df/2, 1/2)`, `x = df / (df + t²)`, through the
/// hypergeometric series `x^a / B(a, b) · Σ (1-b)_n xⁿ / (n! (a+n))`.
/// Only an infinite `t` maps to infinity.
pub fn neg_log10_t_pvalue(t: f64, df: f64, dist: &StudentsT) -> f64 {
    if t.is_nan() {
        return f64::NAN;
    }
    let t = t.abs();
    if t.is_infinite() {
        return f64::INFINITY;
    }
    let pval = (2.0 * dist.sf(t)).min(1.0);
    if pval >= TAIL_SWITCH_P {
        return neg_log10(pval);
    }

    let a = df / 2.0;
    let b = 0.5;
    // ln(1 + t²/df) without overflowing t².
    let ln_ratio = if t > 1e100 {
        2.0 * t.ln() - df.ln()
    } else {
        (t * t / df).ln_1p()
    };
    let ln_x = -ln_ratio;
    let x = ln_x.exp();

    let mut coef = 1.0;
    let mut sum = 1.0 / a;
    for n in 0..1000 {
        let n = n as f64;
        coef *= (1.0 - b + n) / (n + 1.0) * x;
        let term = coef / (a + n + 1.0);
        sum += term;
        if term <= sum * 1e-17 {
            break;
        }
    }
    let ln_p = a * ln_x + sum.ln() - ln_beta(a, b);
    -ln_p / std::f64::consts::LN_10
}

/// Ordinary least squares of `y` on `x` with an intercept, t-test on the slope.
pub fn simple_ols(x: ArrayView1<'_, f64>, y: ArrayView1<'_, f64>) -> Result<SimpleOls> {
    let n = x.len();
    if n != y.len() {
        return Err(PicError::InvalidParameter(format!(
            "regression inputs differ in length ({n} vs {})",
            y.len()
        )));
    }
    if n < 3 {
        return Err(PicError::InvalidParameter(format!(
            "regression needs at least 3 observations, got {n}"
        )));
    }
    if is_constant(x) {
        return Err(PicError::DegenerateInput("predictor has zero variance".into()));
    }

    let (x_mean, sxx) = center(x);
    let (y_mean, syy) = center(y);
    let sxy: f64 = x
        .iter()
        .zip(y.iter())
        .map(|(a, b)| (a - x_mean) * (b - y_mean))
        .sum();

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;
    let df = (n - 2) as f64;
    let rss = (syy - slope * sxy).max(0.0);
    let se = (rss / df / sxx).sqrt();

    let t = if se > 0.0 {
        slope / se
    } else if slope == 0.0 {
        0.0
    } else {
        slope.signum() * f64::INFINITY
    };
    let dist = StudentsT::new(0.0, 1.0, df)?;
    let pval = if t.is_finite() {
        (2.0 * dist.sf(t.abs())).min(1.0)
    } else {
        0.0
    };
    let neg_log10_p = neg_log10_t_pvalue(t, df, &dist);

    Ok(SimpleOls {
        intercept,
        slope,
        se,
        t,
        df,
        pval,
        neg_log10_p,
    })
}

/// Pearson correlation, `None` when either input is constant.
pub fn pearson(x: ArrayView1<'_, f64>, y: ArrayView1<'_, f64>) -> Option<f64> {
    if x.len() != y.len() || is_constant(x) || is_constant(y) {
        return None;
    }
    let (x_mean, sxx) = center(x);
    let (y_mean, syy) = center(y);
    let sxy: f64 = x
        .iter()
        .zip(y.iter())
        .map(|(a, b)| (a - x_mean) * (b - y_mean))
        .sum();
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

pub fn r_squared(x: ArrayView1<'_, f64>, y: ArrayView1<'_, f64>) -> f64 {
    pearson(x, y).map(|r| r * r).unwrap_or(f64::NAN)
}
