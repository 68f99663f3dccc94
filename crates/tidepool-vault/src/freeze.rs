// crates/tidepool-vault/src/freeze.rs
//
// Per-account freeze tracking.
//
// Each deposit locks the beneficiary's entire post-mint share balance until
// `now + freeze_time`. The vault keeps a single record per account: a new
// deposit resets the unlock clock for everything the account holds, not just
// the increment. Once the unlock time passes the whole amount is spendable.

use serde::{Deserialize, Serialize};

use tidepool_core::token::Units;

/// The frozen portion of one account's share balance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrozenBalance {
    /// Share units under the lock.
    pub amount: Units,
    /// Unix time at which the lock expires.
    pub unlock_at: u64,
}

impl FrozenBalance {
    /// Quantity still frozen at `now`: the full amount before `unlock_at`,
    /// zero from then on.
    pub fn frozen_at(&self, now: u64) -> Units {
        if now < self.unlock_at {
            self.amount
        } else {
            0
        }
    }

    /// Whether the lock has expired at `now`.
    pub fn is_expired(&self, now: u64) -> bool {
        now >= self.unlock_at
    }
}
