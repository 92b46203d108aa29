//! Display formatting policy for numeric telemetry values.
//!
//! Every numeric value that reaches the operator panel goes through one
//! [`NumericPolicy`]. The decoder never hands raw floats to the wire: a value
//! is either formatted under the active policy or, if it does not parse as a
//! number at all, passed through verbatim.

/// How numeric telemetry values are rendered for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericPolicy {
    /// Fixed number of digits after the decimal point (e.g. `1.23456` → `1.2`).
    FixedDecimals(usize),
    /// Round to N significant figures (e.g. `0.01234` → `0.012` at N=2).
    SigFigs(usize),
}

impl Default for NumericPolicy {
    /// Matches the four-decimal rendering the original panel used.
    fn default() -> Self {
        NumericPolicy::FixedDecimals(4)
    }
}

impl NumericPolicy {
    /// Format a value under this policy.
    pub fn format(&self, value: f64) -> String {
        match *self {
            NumericPolicy::FixedDecimals(places) => format!("{value:.places$}"),
            NumericPolicy::SigFigs(figs) => format_sig_figs(value, figs.max(1)),
        }
    }

    /// Format a raw token: numeric tokens go through the policy, anything
    /// else (units, status words, garbage) is returned unchanged.
    pub fn format_token(&self, token: &str) -> String {
        match token.trim().parse::<f64>() {
            Ok(v) => self.format(v),
            Err(_) => token.to_string(),
        }
    }
}

/// Round to `figs` significant figures and render without scientific notation.
fn format_sig_figs(value: f64, figs: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    if value == 0.0 {
        return format!("{:.*}", figs.saturating_sub(1), 0.0);
    }
    let exponent = value.abs().log10().floor() as i32;
    let shift = figs as i32 - 1 - exponent;
    let scale = 10f64.powi(shift);
    let rounded = (value * scale).round() / scale;
    // Rounding can cross a decade (0.999 → 1.0); the decimal count has to
    // follow the rounded value, not the input.
    let exponent = rounded.abs().log10().floor() as i32;
    let decimals = (figs as i32 - 1 - exponent).max(0) as usize;
    format!("{rounded:.decimals$}")
}
