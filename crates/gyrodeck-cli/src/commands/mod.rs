pub mod procs;
pub mod serve;
pub mod snapshot;

use gyrodeck_core::NumericPolicy;

/// Resolve the display policy from CLI flags. `--sig-figs` wins when given.
pub fn make_policy(decimals: usize, sig_figs: Option<usize>) -> NumericPolicy {
    match sig_figs {
        Some(figs) => NumericPolicy::SigFigs(figs),
        None => NumericPolicy::FixedDecimals(decimals),
    }
}
