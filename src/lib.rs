//! Core of a deterministic, stack-based bytecode interpreter derived
//! from the EVM: the fetch-decode-dispatch loop, per-frame computation
//! state, the recursive message-call model with snapshot/revert, and
//! gas accounting around every opcode.
//!
//! Opcode logic, the persistent world-state store, transaction-level
//! surrounding logic, and block context assembly beyond
//! [`message::ChainEnvironment`] are external collaborators, consumed
//! here only through the [`host::Storage`] and [`host::OpcodeTable`]
//! traits. This crate does not implement either.

pub mod code;
pub mod constants;
pub mod errors;
pub mod frame;
pub mod gas;
pub mod host;
pub mod interpreter;
pub mod memory;
pub mod message;
pub mod opcodes;
pub mod stack;
pub mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod testutil;

pub use code::CodeStream;
pub use errors::{ValidationError, VMError};
pub use frame::{Frame, LogEntry};
pub use gas::GasMeter;
pub use host::{Evm, Host, OpcodeFn, OpcodeTable, SnapshotId, Storage};
pub use interpreter::{apply_message, execute_vm};
pub use memory::Memory;
pub use message::{ChainEnvironment, Message};
pub use stack::Stack;
pub use state::State;
