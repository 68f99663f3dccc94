// crates/tidepool-core/src/token.rs
//
// Token unit convention for Tidepool.
//
// All accounting is done in integer base units to avoid floating-point
// precision issues. 1 token = 10^9 base units. Amounts are u128 so that
// the proportional-share products (amount * total_shares) computed by the
// vault never overflow at the configured caps.

/// Type alias for base units — the smallest denomination of any asset
/// tracked by a [`crate::ledger::TokenLedger`].
pub type Units = u128;

/// Number of base units in one whole token. 1 token = 10^9 units.
pub const UNITS_PER_TOKEN: Units = 1_000_000_000;

/// Convert a whole-token amount into base units.
///
/// # Example
/// ```
/// use tidepool_core::token::{tokens, UNITS_PER_TOKEN};
/// assert_eq!(tokens(3), 3 * UNITS_PER_TOKEN);
/// ```
pub const fn tokens(amount: u64) -> Units {
    amount as Units * UNITS_PER_TOKEN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units_per_token() {
        assert_eq!(UNITS_PER_TOKEN, 1_000_000_000);
    }

    #[test]
    fn test_tokens_helper() {
        assert_eq!(tokens(0), 0);
        assert_eq!(tokens(1), UNITS_PER_TOKEN);
        assert_eq!(tokens(7_000_000), 7_000_000 * UNITS_PER_TOKEN);
    }

    #[test]
    fn test_share_product_headroom() {
        // The largest product the vault ever forms is amount * total_shares,
        // both bounded by the global cap. It must fit in u128.
        let cap = tokens(7_000_000);
        let product = cap.checked_mul(cap);
        assert!(product.is_some());
    }
}
