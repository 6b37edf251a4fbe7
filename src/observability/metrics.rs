//! Load counters.
//!
//! # Metrics
//! - `options_loader_loads_total` (counter): completed loads by `outcome`
//!   (`ok` or the error kind)
//! - `options_loader_ignored_keys_total` (counter): skipped keys by `kind`
//!   (`unknown` or `obsolete`)

use metrics::counter;

pub const LOADS_TOTAL: &str = "options_loader_loads_total";
pub const IGNORED_KEYS_TOTAL: &str = "options_loader_ignored_keys_total";

/// Count one finished load.
pub fn record_load(outcome: &'static str) {
    counter!(LOADS_TOTAL, "outcome" => outcome).increment(1);
}

/// Count one key skipped instead of applied.
pub fn record_ignored_key(kind: &'static str) {
    counter!(IGNORED_KEYS_TOTAL, "kind" => kind).increment(1);
}
