//! Periodicity estimation: dominant gaps per identifier and the diagnostic hyper-period.

mod gap;
mod hyper;
mod stats;

pub use gap::{estimate_period, gaps, to_ticks};
pub use hyper::{compute_hyper_period, gcd, lcm, HyperPeriod};
pub use stats::{mean_std, profile, timestamps_by_identifier, write_profile_csv, IdentifierPeriodicity};
