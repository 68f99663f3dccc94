// crates/tidepool-core/src/error.rs

use thiserror::Error;

/// Workspace-wide error type for Tidepool.
///
/// Every failed operation rejects as a whole with one of these reasons and
/// leaves no partial state change behind. The messages are the diagnostic
/// reason strings surfaced to callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VaultError {
    /// Deposit attempted before the configured start date.
    #[error("hasnt started yet")]
    NotStarted,

    /// A per-account deposit cap would be exceeded.
    #[error("more than limit per user")]
    UserLimitExceeded,

    /// An aggregate deposit cap would be exceeded.
    #[error("more than total limit")]
    TotalLimitExceeded,

    /// Whitelist entry attempted by a non-member.
    #[error("you are not in whitelist")]
    NotWhitelisted,

    /// Whitelist entry attempted after the phase closed.
    #[error("whitelist ended")]
    WhitelistEnded,

    /// Whitelist close attempted before its deadline.
    #[error("whitelist not ended")]
    WhitelistNotEnded,

    /// The depositor has not approved enough of the asset to the vault.
    #[error("allowance insufficient")]
    InsufficientAllowance,

    /// An asset or share transfer exceeds the spendable balance.
    /// Frozen shares count toward the nominal balance but are not spendable.
    #[error("transfer amount exceeds balance")]
    TransferExceedsBalance,

    /// A share burn exceeds the caller's spendable balance.
    #[error("burn amount exceeds balance")]
    BurnExceedsBalance,

    /// Deposit or withdrawal of a zero amount.
    #[error("amount must be positive")]
    ZeroAmount,

    /// Admin operation attempted by an account other than the owner.
    #[error("caller is not the owner")]
    NotOwner,

    /// Sweep attempted on the staked (protected) asset.
    #[error("cant sweep staked token")]
    SweepProtectedToken,

    /// Snapshot serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for VaultError {
    fn from(e: serde_json::Error) -> Self {
        VaultError::Serialization(e.to_string())
    }
}
