// crates/tidepool-vault/src/whitelist.rs
//
// Whitelist pre-sale phase.
//
// A dedicated slice of the global cap (the allocation) is reserved for a set
// of owner-designated accounts during a fixed window after vault creation.
// Each member has its own sub-cap, independent of the general per-user limit.
// When the owner closes the phase, the unused part of the allocation is
// recorded as `unfilled` and the reservation is released, so capacity left
// vacant by whitelist members returns to the general pool.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use tidepool_core::account::Address;
use tidepool_core::error::VaultError;
use tidepool_core::token::Units;

use crate::config::{WHITELIST_ALLOCATION, WHITELIST_USER_LIMIT};

/// Bookkeeping for the whitelist pre-sale phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhitelistPhase {
    /// Accounts eligible for whitelist entry.
    members: HashSet<Address>,
    /// Raw units each member has deposited through the whitelist.
    entered: HashMap<Address, Units>,
    /// Cap on raw whitelist deposits per member.
    user_limit: Units,
    /// Aggregate allocation dedicated to the phase.
    allocation: Units,
    /// Raw units accepted across all members.
    accepted: Units,
    /// Unix time after which the phase can be closed and entries stop.
    end_time: u64,
    /// Set once the owner has closed the phase.
    ended: bool,
    /// Allocation left vacant at close time.
    unfilled: Units,
}

impl WhitelistPhase {
    /// Create a phase with the default limits, ending at `end_time`.
    pub fn new(end_time: u64) -> Self {
        Self::with_limits(end_time, WHITELIST_USER_LIMIT, WHITELIST_ALLOCATION)
    }

    /// Create a phase with explicit limits.
    pub fn with_limits(end_time: u64, user_limit: Units, allocation: Units) -> Self {
        Self {
            members: HashSet::new(),
            entered: HashMap::new(),
            user_limit,
            allocation,
            accepted: 0,
            end_time,
            ended: false,
            unfilled: 0,
        }
    }

    /// Add accounts to the member set. Already-present accounts are kept.
    pub fn add_members(&mut self, accounts: &[Address]) {
        self.members.extend(accounts.iter().copied());
    }

    pub fn is_member(&self, account: &Address) -> bool {
        self.members.contains(account)
    }

    /// Raw units `account` has deposited through the whitelist.
    pub fn entered_of(&self, account: &Address) -> Units {
        self.entered.get(account).copied().unwrap_or(0)
    }

    /// Raw units accepted across all members.
    pub fn accepted(&self) -> Units {
        self.accepted
    }

    pub fn end_time(&self) -> u64 {
        self.end_time
    }

    pub fn ended(&self) -> bool {
        self.ended
    }

    /// Allocation left vacant when the phase was closed. Zero until then.
    pub fn unfilled(&self) -> Units {
        self.unfilled
    }

    /// Portion of the global cap still held back for the whitelist.
    /// Zero once the phase is closed.
    pub fn reserved(&self) -> Units {
        if self.ended {
            0
        } else {
            self.allocation - self.accepted
        }
    }

    /// Validate a whitelist entry of `amount` by `account` at `now`.
    ///
    /// # Errors
    /// - `WhitelistEnded` once the window has elapsed or the phase is closed.
    /// - `NotWhitelisted` for non-members.
    /// - `UserLimitExceeded` if the member's sub-cap would be exceeded.
    /// - `TotalLimitExceeded` if the aggregate allocation would be exceeded.
    pub fn check_entry(
        &self,
        account: &Address,
        amount: Units,
        now: u64,
    ) -> Result<(), VaultError> {
        if self.ended || now >= self.end_time {
            return Err(VaultError::WhitelistEnded);
        }
        if !self.is_member(account) {
            return Err(VaultError::NotWhitelisted);
        }
        if self.entered_of(account) + amount > self.user_limit {
            return Err(VaultError::UserLimitExceeded);
        }
        if self.accepted + amount > self.allocation {
            return Err(VaultError::TotalLimitExceeded);
        }
        Ok(())
    }

    /// Record an accepted entry. Call only after `check_entry` passed.
    pub fn record_entry(&mut self, account: Address, amount: Units) {
        *self.entered.entry(account).or_insert(0) += amount;
        self.accepted += amount;
    }

    /// Close the phase, recording the vacant allocation and releasing the
    /// reservation. Returns the unfilled amount.
    ///
    /// # Errors
    /// - `WhitelistEnded` if already closed.
    /// - `WhitelistNotEnded` before `end_time`.
    pub fn close(&mut self, now: u64) -> Result<Units, VaultError> {
        if self.ended {
            return Err(VaultError::WhitelistEnded);
        }
        if now < self.end_time {
            return Err(VaultError::WhitelistNotEnded);
        }
        self.unfilled = self.allocation - self.accepted;
        self.ended = true;
        Ok(self.unfilled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidepool_core::token::tokens;

    fn addr(n: u8) -> Address {
        Address([n; 20])
    }

    fn phase() -> WhitelistPhase {
        let mut phase = WhitelistPhase::new(1_000);
        phase.add_members(&[addr(1), addr(2)]);
        phase
    }

    #[test]
    fn test_membership() {
        let phase = phase();
        assert!(phase.is_member(&addr(1)));
        assert!(!phase.is_member(&addr(3)));
    }

    #[test]
    fn test_non_member_rejected() {
        let phase = phase();
        assert_eq!(
            phase.check_entry(&addr(3), tokens(1), 0),
            Err(VaultError::NotWhitelisted)
        );
    }

    #[test]
    fn test_entry_after_window_rejected() {
        let phase = phase();
        assert_eq!(
            phase.check_entry(&addr(1), tokens(1), 1_000),
            Err(VaultError::WhitelistEnded)
        );
    }

    #[test]
    fn test_user_limit_boundary() {
        let mut phase = phase();
        phase.check_entry(&addr(1), tokens(15_000), 0).unwrap();
        phase.record_entry(addr(1), tokens(15_000));
        // One unit over the 25,000-token sub-cap rejects
        assert_eq!(
            phase.check_entry(&addr(1), tokens(10_000) + 1, 0),
            Err(VaultError::UserLimitExceeded)
        );
        // Exactly at the sub-cap passes
        phase.check_entry(&addr(1), tokens(10_000), 0).unwrap();
    }

    #[test]
    fn test_allocation_boundary() {
        let mut phase = WhitelistPhase::with_limits(1_000, tokens(100), tokens(150));
        phase.add_members(&[addr(1), addr(2)]);
        phase.record_entry(addr(1), tokens(100));
        assert_eq!(
            phase.check_entry(&addr(2), tokens(51), 0),
            Err(VaultError::TotalLimitExceeded)
        );
        phase.check_entry(&addr(2), tokens(50), 0).unwrap();
    }

    #[test]
    fn test_reserved_tracks_accepted() {
        let mut phase = phase();
        assert_eq!(phase.reserved(), tokens(700_000));
        phase.record_entry(addr(1), tokens(25_000));
        assert_eq!(phase.reserved(), tokens(675_000));
    }

    #[test]
    fn test_close_before_deadline_rejected() {
        let mut phase = phase();
        assert_eq!(phase.close(999), Err(VaultError::WhitelistNotEnded));
        assert!(!phase.ended());
    }

    #[test]
    fn test_close_reconciles_unfilled() {
        let mut phase = phase();
        phase.record_entry(addr(1), tokens(25_000));
        phase.record_entry(addr(2), tokens(20_000));
        let unfilled = phase.close(1_000).unwrap();
        assert_eq!(unfilled, tokens(655_000));
        assert_eq!(phase.unfilled(), tokens(655_000));
        assert_eq!(phase.reserved(), 0);
        assert!(phase.ended());
    }

    #[test]
    fn test_close_twice_rejected() {
        let mut phase = phase();
        phase.close(1_000).unwrap();
        assert_eq!(phase.close(1_001), Err(VaultError::WhitelistEnded));
    }

    #[test]
    fn test_entry_after_close_rejected() {
        let mut phase = phase();
        phase.close(1_000).unwrap();
        assert_eq!(
            phase.check_entry(&addr(1), tokens(1), 1_001),
            Err(VaultError::WhitelistEnded)
        );
    }
}
