//! VM and validation error taxonomy.

/// Errors raised by [`crate::message::Message::new`] and
/// [`crate::message::ChainEnvironment::new`] validating structural
/// preconditions (canonical address length, uint256 range, depth ≥ 0) on
/// raw, not-yet-typed input.
///
/// These are programming errors at the crate boundary. They are never
/// caught by the interpreter loop — only `VMError` is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("expected exactly {expected} bytes, got {actual}")]
    WrongLength { expected: usize, actual: usize },
    #[error("expected a non-negative integer, got {0}")]
    NotNonNegative(i64),
}

/// Errors recoverable at a frame boundary: caught by the interpreter
/// loop, recorded on the frame, and resolved by `apply_message` reverting
/// the storage snapshot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VMError {
    #[error("out of gas")]
    OutOfGas,
    #[error("insufficient stack items")]
    InsufficientStack,
    #[error("stack limit reached")]
    FullStack,
    #[error("stack depth limit reached")]
    StackDepthLimit,
    #[error("invalid opcode 0x{0:x}")]
    InvalidOpcode(u8),
    #[error("invalid jump destination")]
    InvalidJumpDestination,
    #[error("insufficient funds")]
    InsufficientFunds,
}
