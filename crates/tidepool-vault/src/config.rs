// crates/tidepool-vault/src/config.rs
//
// Default vault parameters.
//
// The owner can overwrite the start date, freeze time, and caps after
// creation; the whitelist sub-phase limits and window are fixed at creation.

use tidepool_core::token::{tokens, Units};

/// Default lock applied to each deposit: 86,400 seconds (1 day).
pub const DEFAULT_FREEZE_TIME: u64 = 86_400;

/// Lifetime cap on raw general deposits per account: 100,000 tokens.
pub const DEFAULT_USER_LIMIT: Units = tokens(100_000);

/// Global cap on raw deposits held by the vault, whitelist included:
/// 7,000,000 tokens.
pub const DEFAULT_MAX_POOL_TOTAL: Units = tokens(7_000_000);

/// Cap on raw whitelist deposits per member: 25,000 tokens.
pub const WHITELIST_USER_LIMIT: Units = tokens(25_000);

/// Aggregate allocation reserved for the whitelist phase: 700,000 tokens.
/// Whatever goes unused rolls back into general headroom when the phase
/// is closed.
pub const WHITELIST_ALLOCATION: Units = tokens(700_000);

/// Length of the whitelist window, measured from vault creation: 1 day.
pub const WHITELIST_DURATION: u64 = 86_400;

#[cfg(test)]
mod tests {
    use super::*;
    use tidepool_core::token::UNITS_PER_TOKEN;

    #[test]
    fn test_whitelist_fits_inside_global_cap() {
        assert!(WHITELIST_ALLOCATION < DEFAULT_MAX_POOL_TOTAL);
        assert!(WHITELIST_USER_LIMIT < WHITELIST_ALLOCATION);
    }

    #[test]
    fn test_defaults_in_units() {
        assert_eq!(DEFAULT_USER_LIMIT, 100_000 * UNITS_PER_TOKEN);
        assert_eq!(DEFAULT_MAX_POOL_TOTAL, 7_000_000 * UNITS_PER_TOKEN);
    }
}
