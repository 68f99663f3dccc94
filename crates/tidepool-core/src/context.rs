// crates/tidepool-core/src/context.rs

use serde::{Deserialize, Serialize};

use crate::account::Address;

/// Execution context for a single vault operation.
///
/// The vault holds no ambient state about who is calling or what time it is:
/// every operation receives the caller identity and the current time (unix
/// seconds) explicitly. The host is responsible for serializing operations —
/// each call is a single atomic state transition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ExecutionContext {
    /// The account invoking the operation.
    pub caller: Address,
    /// Current time in unix seconds.
    pub now: u64,
}

impl ExecutionContext {
    /// Create a context for `caller` at time `now`.
    pub fn new(caller: Address, now: u64) -> Self {
        Self { caller, now }
    }
}
