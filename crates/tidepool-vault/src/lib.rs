// crates/tidepool-vault/src/lib.rs
//
// tidepool-vault: share-based staking vault ledger.
//
// Deposits of the underlying asset mint pool shares proportional to the
// vault's custody balance, so externally donated rewards accrue to existing
// holders. Deposits are gated by a start date, a per-account lifetime cap,
// a global cap, and a whitelist pre-sale phase; every deposit re-freezes the
// beneficiary's share balance for the configured freeze window.
//
// All accounting is in integer base units (see tidepool-core). Operations
// are all-or-nothing: every check runs before any state is mutated.

pub mod config;
pub mod freeze;
pub mod vault;
pub mod whitelist;

// Re-export key types for ergonomic access from downstream crates.
pub use config::{
    DEFAULT_FREEZE_TIME, DEFAULT_MAX_POOL_TOTAL, DEFAULT_USER_LIMIT, WHITELIST_ALLOCATION,
    WHITELIST_DURATION, WHITELIST_USER_LIMIT,
};
pub use freeze::FrozenBalance;
pub use vault::StakingVault;
pub use whitelist::WhitelistPhase;
