// crates/tidepool-core/src/ledger.rs
//
// In-memory fungible-asset ledger with ERC20 transfer/approval semantics.
//
// The vault consumes one of these as the underlying asset it custodies, and
// `sweep_tokens` operates on arbitrary foreign ledgers. Each ledger carries
// its own address so the protected asset can be told apart from strays.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::account::Address;
use crate::error::VaultError;
use crate::token::Units;

/// A fungible-asset ledger: per-account balances plus spender allowances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenLedger {
    /// Address identifying this asset.
    address: Address,
    /// Total units in circulation.
    total_supply: Units,
    /// Account balances in base units.
    balances: HashMap<Address, Units>,
    /// allowances[owner][spender] = units the spender may pull from owner.
    allowances: HashMap<Address, HashMap<Address, Units>>,
}

impl TokenLedger {
    /// Create an empty ledger for the asset at `address`.
    pub fn new(address: Address) -> Self {
        Self {
            address,
            total_supply: 0,
            balances: HashMap::new(),
            allowances: HashMap::new(),
        }
    }

    /// Address identifying this asset.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Total units in circulation.
    pub fn total_supply(&self) -> Units {
        self.total_supply
    }

    /// Balance of `account`, zero if it has never held this asset.
    pub fn balance_of(&self, account: &Address) -> Units {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Mint `amount` units to `to`.
    pub fn mint(&mut self, to: Address, amount: Units) {
        let balance = self.balances.entry(to).or_insert(0);
        *balance = balance.saturating_add(amount);
        self.total_supply = self.total_supply.saturating_add(amount);
    }

    /// Move `amount` units from `from` to `to`.
    ///
    /// # Errors
    /// Returns `VaultError::TransferExceedsBalance` if `from` holds less
    /// than `amount`.
    pub fn transfer(&mut self, from: Address, to: Address, amount: Units) -> Result<(), VaultError> {
        let from_balance = self.balance_of(&from);
        if amount > from_balance {
            return Err(VaultError::TransferExceedsBalance);
        }
        if from == to {
            return Ok(());
        }
        self.balances.insert(from, from_balance - amount);
        let to_balance = self.balances.entry(to).or_insert(0);
        *to_balance += amount;
        Ok(())
    }

    /// Set the allowance of `spender` over `owner`'s balance to `amount`.
    pub fn approve(&mut self, owner: Address, spender: Address, amount: Units) {
        self.allowances
            .entry(owner)
            .or_default()
            .insert(spender, amount);
    }

    /// Remaining allowance of `spender` over `owner`'s balance.
    pub fn allowance(&self, owner: &Address, spender: &Address) -> Units {
        self.allowances
            .get(owner)
            .and_then(|per_spender| per_spender.get(spender))
            .copied()
            .unwrap_or(0)
    }

    /// Pull `amount` units from `from` to `to` on behalf of `spender`,
    /// consuming allowance.
    ///
    /// # Errors
    /// Returns `VaultError::InsufficientAllowance` if the spender's allowance
    /// is below `amount`, or `VaultError::TransferExceedsBalance` if `from`
    /// holds less than `amount`. Allowance is only consumed on success.
    pub fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: Units,
    ) -> Result<(), VaultError> {
        let allowed = self.allowance(&from, &spender);
        if amount > allowed {
            return Err(VaultError::InsufficientAllowance);
        }
        self.transfer(from, to, amount)?;
        self.allowances
            .entry(from)
            .or_default()
            .insert(spender, allowed - amount);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::tokens;

    fn addr(n: u8) -> Address {
        Address([n; 20])
    }

    #[test]
    fn test_mint_and_supply() {
        let mut ledger = TokenLedger::new(addr(0xaa));
        ledger.mint(addr(1), tokens(100));
        ledger.mint(addr(2), tokens(50));
        assert_eq!(ledger.balance_of(&addr(1)), tokens(100));
        assert_eq!(ledger.balance_of(&addr(2)), tokens(50));
        assert_eq!(ledger.total_supply(), tokens(150));
    }

    #[test]
    fn test_transfer() {
        let mut ledger = TokenLedger::new(addr(0xaa));
        ledger.mint(addr(1), tokens(10));
        ledger.transfer(addr(1), addr(2), tokens(4)).unwrap();
        assert_eq!(ledger.balance_of(&addr(1)), tokens(6));
        assert_eq!(ledger.balance_of(&addr(2)), tokens(4));
    }

    #[test]
    fn test_transfer_insufficient_balance() {
        let mut ledger = TokenLedger::new(addr(0xaa));
        ledger.mint(addr(1), tokens(1));
        let result = ledger.transfer(addr(1), addr(2), tokens(2));
        assert_eq!(result, Err(VaultError::TransferExceedsBalance));
        // Balances unchanged on failure
        assert_eq!(ledger.balance_of(&addr(1)), tokens(1));
        assert_eq!(ledger.balance_of(&addr(2)), 0);
    }

    #[test]
    fn test_self_transfer_is_noop() {
        let mut ledger = TokenLedger::new(addr(0xaa));
        ledger.mint(addr(1), tokens(5));
        ledger.transfer(addr(1), addr(1), tokens(5)).unwrap();
        assert_eq!(ledger.balance_of(&addr(1)), tokens(5));
    }

    #[test]
    fn test_approve_and_allowance() {
        let mut ledger = TokenLedger::new(addr(0xaa));
        assert_eq!(ledger.allowance(&addr(1), &addr(9)), 0);
        ledger.approve(addr(1), addr(9), tokens(3));
        assert_eq!(ledger.allowance(&addr(1), &addr(9)), tokens(3));
        // Re-approving overwrites
        ledger.approve(addr(1), addr(9), tokens(1));
        assert_eq!(ledger.allowance(&addr(1), &addr(9)), tokens(1));
    }

    #[test]
    fn test_transfer_from_consumes_allowance() {
        let mut ledger = TokenLedger::new(addr(0xaa));
        ledger.mint(addr(1), tokens(10));
        ledger.approve(addr(1), addr(9), tokens(7));
        ledger
            .transfer_from(addr(9), addr(1), addr(2), tokens(4))
            .unwrap();
        assert_eq!(ledger.balance_of(&addr(2)), tokens(4));
        assert_eq!(ledger.allowance(&addr(1), &addr(9)), tokens(3));
    }

    #[test]
    fn test_transfer_from_insufficient_allowance() {
        let mut ledger = TokenLedger::new(addr(0xaa));
        ledger.mint(addr(1), tokens(10));
        ledger.approve(addr(1), addr(9), tokens(2));
        let result = ledger.transfer_from(addr(9), addr(1), addr(2), tokens(4));
        assert_eq!(result, Err(VaultError::InsufficientAllowance));
        assert_eq!(ledger.allowance(&addr(1), &addr(9)), tokens(2));
    }

    #[test]
    fn test_transfer_from_insufficient_balance_keeps_allowance() {
        let mut ledger = TokenLedger::new(addr(0xaa));
        ledger.mint(addr(1), tokens(1));
        ledger.approve(addr(1), addr(9), tokens(10));
        let result = ledger.transfer_from(addr(9), addr(1), addr(2), tokens(4));
        assert_eq!(result, Err(VaultError::TransferExceedsBalance));
        assert_eq!(ledger.allowance(&addr(1), &addr(9)), tokens(10));
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut ledger = TokenLedger::new(addr(0xaa));
        ledger.mint(addr(1), tokens(10));
        ledger.approve(addr(1), addr(9), tokens(7));
        let json = serde_json::to_string(&ledger).unwrap();
        let back: TokenLedger = serde_json::from_str(&json).unwrap();
        assert_eq!(back.address(), ledger.address());
        assert_eq!(back.balance_of(&addr(1)), tokens(10));
        assert_eq!(back.allowance(&addr(1), &addr(9)), tokens(7));
    }
}
