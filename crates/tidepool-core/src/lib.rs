// crates/tidepool-core/src/lib.rs
//
// tidepool-core: Core types for the Tidepool staking vault.
//
// This is the leaf crate the vault crate depends on. It defines account
// addresses, the integer token-unit convention, the workspace-wide error
// type, the execution context every operation receives, and the in-memory
// fungible-asset ledger that plays the role of the underlying token.

pub mod account;
pub mod context;
pub mod error;
pub mod ledger;
pub mod token;

// Re-export key types for ergonomic access from downstream crates.
pub use account::Address;
pub use context::ExecutionContext;
pub use error::VaultError;
pub use ledger::TokenLedger;
pub use token::{tokens, Units, UNITS_PER_TOKEN};
