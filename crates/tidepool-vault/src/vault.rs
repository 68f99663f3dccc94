// crates/tidepool-vault/src/vault.rs
//
// The staking vault: a share-accounting ledger over one underlying asset.
//
// Shares are minted 1:1 for the first depositor and proportionally to the
// custody balance afterwards (integer division, rounds down in the pool's
// favor). The custody balance is always read from the asset ledger, so
// tokens donated to the vault address raise the exchange rate for existing
// holders. Withdrawal pays `shares * pool / total_shares`, again rounded
// down.
//
// Every state-changing operation takes the asset ledger and an
// ExecutionContext and either fully applies or rejects with a VaultError
// leaving no partial writes: all checks run before the first mutation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use tidepool_core::account::Address;
use tidepool_core::context::ExecutionContext;
use tidepool_core::error::VaultError;
use tidepool_core::ledger::TokenLedger;
use tidepool_core::token::Units;

use crate::config::{
    DEFAULT_FREEZE_TIME, DEFAULT_MAX_POOL_TOTAL, DEFAULT_USER_LIMIT, WHITELIST_DURATION,
};
use crate::freeze::FrozenBalance;
use crate::whitelist::WhitelistPhase;

/// Share-based staking vault over a single underlying asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakingVault {
    /// The vault's own custody account on asset ledgers.
    address: Address,
    /// Current owner; sole caller of admin operations.
    owner: Address,
    /// Address of the staked asset. Protected from `sweep_tokens`.
    underlying: Address,
    /// Unix time before which no deposits are accepted.
    start_date: u64,
    /// Lock duration in seconds applied to each deposit.
    freeze_time: u64,
    /// Lifetime cap on raw general deposits per account.
    user_limit: Units,
    /// Global cap on raw deposits, whitelist allocation included.
    max_pool_total: Units,
    /// Sum of all minted shares.
    total_shares: Units,
    /// Share balances per account (frozen + free).
    shares: HashMap<Address, Units>,
    /// Freeze records per account.
    frozen: HashMap<Address, FrozenBalance>,
    /// Lifetime raw general deposits per account.
    entered: HashMap<Address, Units>,
    /// Outstanding raw deposits vault-wide. Grows with every entry and
    /// shrinks by the payout when shares are burned.
    total_entered: Units,
    /// Whitelist pre-sale bookkeeping.
    whitelist: WhitelistPhase,
}

impl StakingVault {
    /// Create a vault custodying the asset at `underlying`.
    ///
    /// `address` is the vault's own account on asset ledgers and `created_at`
    /// anchors the defaults: deposits open immediately and the whitelist
    /// window runs for `WHITELIST_DURATION` seconds from creation.
    pub fn new(address: Address, owner: Address, underlying: Address, created_at: u64) -> Self {
        Self {
            address,
            owner,
            underlying,
            start_date: created_at,
            freeze_time: DEFAULT_FREEZE_TIME,
            user_limit: DEFAULT_USER_LIMIT,
            max_pool_total: DEFAULT_MAX_POOL_TOTAL,
            total_shares: 0,
            shares: HashMap::new(),
            frozen: HashMap::new(),
            entered: HashMap::new(),
            total_entered: 0,
            whitelist: WhitelistPhase::new(created_at + WHITELIST_DURATION),
        }
    }

    // -----------------------------------------------------------------------
    // Deposits
    // -----------------------------------------------------------------------

    /// Stake `amount` of the underlying asset for the caller.
    pub fn enter(
        &mut self,
        ledger: &mut TokenLedger,
        ctx: &ExecutionContext,
        amount: Units,
    ) -> Result<Units, VaultError> {
        self.enter_to(ledger, ctx, amount, ctx.caller)
    }

    /// Stake `amount` of the underlying asset, minting the shares to `to`.
    ///
    /// The caller pays (balance and allowance are theirs); the per-account
    /// cap, the minted shares, and the freeze all land on the beneficiary.
    ///
    /// Returns the number of shares minted.
    ///
    /// # Errors
    /// - `ZeroAmount` if `amount` is zero.
    /// - `NotStarted` before the start date.
    /// - `UserLimitExceeded` if the beneficiary's lifetime cap would be hit.
    /// - `TotalLimitExceeded` if the global cap (minus the open whitelist
    ///   reservation) would be hit.
    /// - `InsufficientAllowance` / `TransferExceedsBalance` from the asset
    ///   ledger.
    pub fn enter_to(
        &mut self,
        ledger: &mut TokenLedger,
        ctx: &ExecutionContext,
        amount: Units,
        to: Address,
    ) -> Result<Units, VaultError> {
        if amount == 0 {
            return Err(VaultError::ZeroAmount);
        }
        if ctx.now < self.start_date {
            return Err(VaultError::NotStarted);
        }
        let entered = self.entered_of(&to);
        if entered + amount > self.user_limit {
            return Err(VaultError::UserLimitExceeded);
        }
        let headroom = self.max_pool_total.saturating_sub(self.whitelist.reserved());
        if self.total_entered + amount > headroom {
            return Err(VaultError::TotalLimitExceeded);
        }

        let minted = self.pull_and_mint(ledger, ctx, amount, to)?;
        self.entered.insert(to, entered + amount);
        self.total_entered += amount;
        debug!(beneficiary = %to, amount, minted, "general deposit accepted");
        Ok(minted)
    }

    /// Stake `amount` through the caller's whitelist allocation.
    ///
    /// Draws on the whitelist per-member sub-cap and aggregate allocation
    /// instead of the general caps; usable alongside `enter` by the same
    /// account. Returns the number of shares minted.
    ///
    /// # Errors
    /// - `ZeroAmount`, `NotStarted` as for `enter_to`.
    /// - `WhitelistEnded` once the window elapsed or the phase was closed.
    /// - `NotWhitelisted` for non-members.
    /// - `UserLimitExceeded` / `TotalLimitExceeded` against the whitelist
    ///   sub-cap and allocation.
    pub fn enter_whitelist(
        &mut self,
        ledger: &mut TokenLedger,
        ctx: &ExecutionContext,
        amount: Units,
    ) -> Result<Units, VaultError> {
        if amount == 0 {
            return Err(VaultError::ZeroAmount);
        }
        if ctx.now < self.start_date {
            return Err(VaultError::NotStarted);
        }
        self.whitelist.check_entry(&ctx.caller, amount, ctx.now)?;

        let minted = self.pull_and_mint(ledger, ctx, amount, ctx.caller)?;
        self.whitelist.record_entry(ctx.caller, amount);
        self.total_entered += amount;
        debug!(member = %ctx.caller, amount, minted, "whitelist deposit accepted");
        Ok(minted)
    }

    /// Shared tail of every deposit: check the caller's funds, compute the
    /// mint at the pre-transfer exchange rate, pull the asset into custody,
    /// mint to the beneficiary, and reset the beneficiary's freeze clock
    /// over their entire balance.
    fn pull_and_mint(
        &mut self,
        ledger: &mut TokenLedger,
        ctx: &ExecutionContext,
        amount: Units,
        to: Address,
    ) -> Result<Units, VaultError> {
        if ledger.allowance(&ctx.caller, &self.address) < amount {
            return Err(VaultError::InsufficientAllowance);
        }
        if ledger.balance_of(&ctx.caller) < amount {
            return Err(VaultError::TransferExceedsBalance);
        }

        let pool = ledger.balance_of(&self.address);
        let minted = if self.total_shares == 0 || pool == 0 {
            amount
        } else {
            amount * self.total_shares / pool
        };

        ledger.transfer_from(ctx.caller, ctx.caller, self.address, amount)?;

        let balance = self.shares.entry(to).or_insert(0);
        *balance += minted;
        self.total_shares += minted;
        self.frozen.insert(
            to,
            FrozenBalance {
                amount: *balance,
                unlock_at: ctx.now + self.freeze_time,
            },
        );
        Ok(minted)
    }

    // -----------------------------------------------------------------------
    // Withdrawal and share transfer
    // -----------------------------------------------------------------------

    /// Burn `share_amount` of the caller's unfrozen shares and pay out the
    /// proportional slice of the custody balance. Returns the payout.
    ///
    /// # Errors
    /// - `ZeroAmount` if `share_amount` is zero.
    /// - `BurnExceedsBalance` if the caller's unfrozen balance is smaller
    ///   than `share_amount` (frozen shares are not spendable).
    pub fn leave(
        &mut self,
        ledger: &mut TokenLedger,
        ctx: &ExecutionContext,
        share_amount: Units,
    ) -> Result<Units, VaultError> {
        if share_amount == 0 {
            return Err(VaultError::ZeroAmount);
        }
        let balance = self.balance_of(&ctx.caller);
        let free = balance - self.freezing_balance_of(&ctx.caller, ctx.now);
        if share_amount > free {
            return Err(VaultError::BurnExceedsBalance);
        }

        let pool = ledger.balance_of(&self.address);
        let payout = share_amount * pool / self.total_shares;

        ledger.transfer(self.address, ctx.caller, payout)?;
        self.shares.insert(ctx.caller, balance - share_amount);
        self.total_shares -= share_amount;
        self.total_entered = self.total_entered.saturating_sub(payout);
        self.prune_frozen(&ctx.caller, ctx.now);
        debug!(account = %ctx.caller, share_amount, payout, "shares burned");
        Ok(payout)
    }

    /// Move `share_amount` shares from the caller to `to`.
    ///
    /// Shares received this way carry no freeze. Frozen shares cannot be
    /// moved even though they count toward the nominal balance.
    ///
    /// # Errors
    /// `TransferExceedsBalance` if the caller's unfrozen balance is smaller
    /// than `share_amount`.
    pub fn transfer(
        &mut self,
        ctx: &ExecutionContext,
        to: Address,
        share_amount: Units,
    ) -> Result<(), VaultError> {
        let balance = self.balance_of(&ctx.caller);
        let free = balance - self.freezing_balance_of(&ctx.caller, ctx.now);
        if share_amount > free {
            return Err(VaultError::TransferExceedsBalance);
        }
        if ctx.caller == to {
            return Ok(());
        }
        self.shares.insert(ctx.caller, balance - share_amount);
        *self.shares.entry(to).or_insert(0) += share_amount;
        self.prune_frozen(&ctx.caller, ctx.now);
        debug!(from = %ctx.caller, to = %to, share_amount, "shares transferred");
        Ok(())
    }

    /// Drop the freeze record once it has expired.
    fn prune_frozen(&mut self, account: &Address, now: u64) {
        if let Some(frozen) = self.frozen.get(account) {
            if frozen.is_expired(now) {
                self.frozen.remove(account);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    /// Total shares owned by `account`, frozen included.
    pub fn balance_of(&self, account: &Address) -> Units {
        self.shares.get(account).copied().unwrap_or(0)
    }

    /// Shares of `account` still inside their freeze window at `now`.
    pub fn freezing_balance_of(&self, account: &Address, now: u64) -> Units {
        self.frozen
            .get(account)
            .map(|frozen| frozen.frozen_at(now))
            .unwrap_or(0)
    }

    /// Spendable shares of `account` at `now`: balance minus frozen.
    pub fn actual_balance_of(&self, account: &Address, now: u64) -> Units {
        self.balance_of(account) - self.freezing_balance_of(account, now)
    }

    /// Underlying payout `share_amount` shares would fetch at the current
    /// exchange rate. Zero while no shares are outstanding.
    pub fn can_receive(&self, ledger: &TokenLedger, share_amount: Units) -> Units {
        if self.total_shares == 0 {
            return 0;
        }
        share_amount * ledger.balance_of(&self.address) / self.total_shares
    }

    pub fn total_shares(&self) -> Units {
        self.total_shares
    }

    /// Outstanding raw deposits counted against the global cap.
    pub fn total_entered(&self) -> Units {
        self.total_entered
    }

    /// Lifetime raw general deposits of `account`.
    pub fn entered_of(&self, account: &Address) -> Units {
        self.entered.get(account).copied().unwrap_or(0)
    }

    pub fn max_pool_total(&self) -> Units {
        self.max_pool_total
    }

    /// Whitelist allocation left vacant when the phase was closed.
    pub fn unfilled_amount(&self) -> Units {
        self.whitelist.unfilled()
    }

    pub fn is_whitelisted(&self, account: &Address) -> bool {
        self.whitelist.is_member(account)
    }

    pub fn whitelist_end_time(&self) -> u64 {
        self.whitelist.end_time()
    }

    pub fn start_date(&self) -> u64 {
        self.start_date
    }

    pub fn freeze_time(&self) -> u64 {
        self.freeze_time
    }

    pub fn user_limit(&self) -> Units {
        self.user_limit
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    /// The vault's custody account on asset ledgers.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Address of the staked asset.
    pub fn underlying(&self) -> Address {
        self.underlying
    }

    // -----------------------------------------------------------------------
    // Admin operations (owner-only)
    // -----------------------------------------------------------------------

    fn require_owner(&self, ctx: &ExecutionContext) -> Result<(), VaultError> {
        if ctx.caller != self.owner {
            return Err(VaultError::NotOwner);
        }
        Ok(())
    }

    /// Overwrite the start date.
    pub fn set_start_date(&mut self, ctx: &ExecutionContext, start_date: u64) -> Result<(), VaultError> {
        self.require_owner(ctx)?;
        self.start_date = start_date;
        Ok(())
    }

    /// Overwrite the freeze duration applied to future deposits.
    pub fn set_freeze_time(&mut self, ctx: &ExecutionContext, freeze_time: u64) -> Result<(), VaultError> {
        self.require_owner(ctx)?;
        self.freeze_time = freeze_time;
        Ok(())
    }

    /// Overwrite the per-account lifetime deposit cap.
    pub fn set_user_limit(&mut self, ctx: &ExecutionContext, user_limit: Units) -> Result<(), VaultError> {
        self.require_owner(ctx)?;
        self.user_limit = user_limit;
        Ok(())
    }

    /// Overwrite the global deposit cap.
    pub fn set_max_pool_total(&mut self, ctx: &ExecutionContext, max_pool_total: Units) -> Result<(), VaultError> {
        self.require_owner(ctx)?;
        self.max_pool_total = max_pool_total;
        Ok(())
    }

    /// Add accounts to the whitelist. Callable repeatedly; existing members
    /// are kept.
    pub fn set_whitelist(&mut self, ctx: &ExecutionContext, accounts: &[Address]) -> Result<(), VaultError> {
        self.require_owner(ctx)?;
        self.whitelist.add_members(accounts);
        Ok(())
    }

    /// Close the whitelist phase once its window has elapsed, rolling the
    /// vacant allocation back into general headroom. Returns the unfilled
    /// amount.
    ///
    /// # Errors
    /// - `NotOwner` for non-owners.
    /// - `WhitelistNotEnded` before the window's deadline.
    /// - `WhitelistEnded` if already closed.
    pub fn end_whitelist(&mut self, ctx: &ExecutionContext) -> Result<Units, VaultError> {
        self.require_owner(ctx)?;
        let unfilled = self.whitelist.close(ctx.now)?;
        info!(unfilled, accepted = self.whitelist.accepted(), "whitelist closed");
        Ok(unfilled)
    }

    /// Transfer the vault's entire custody balance of a foreign asset to the
    /// owner. Returns the amount swept.
    ///
    /// # Errors
    /// - `NotOwner` for non-owners.
    /// - `SweepProtectedToken` if `token` is the staked asset.
    pub fn sweep_tokens(&self, ctx: &ExecutionContext, token: &mut TokenLedger) -> Result<Units, VaultError> {
        self.require_owner(ctx)?;
        if token.address() == self.underlying {
            return Err(VaultError::SweepProtectedToken);
        }
        let amount = token.balance_of(&self.address);
        token.transfer(self.address, self.owner, amount)?;
        info!(token = %token.address(), amount, "foreign tokens swept");
        Ok(amount)
    }

    /// Hand ownership to `new_owner`, immediately and irrevocably.
    pub fn transfer_ownership(&mut self, ctx: &ExecutionContext, new_owner: Address) -> Result<(), VaultError> {
        self.require_owner(ctx)?;
        info!(from = %self.owner, to = %new_owner, "ownership transferred");
        self.owner = new_owner;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Snapshots
    // -----------------------------------------------------------------------

    /// Serialize the full vault state to JSON.
    pub fn to_json(&self) -> Result<String, VaultError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Restore a vault from a JSON snapshot.
    pub fn from_json(data: &str) -> Result<Self, VaultError> {
        Ok(serde_json::from_str(data)?)
    }
}
