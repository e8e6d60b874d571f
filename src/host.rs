//! The `EVM` host façade, the `Host` trait opcode logic dispatches
//! through, and the `Storage`/`OpcodeTable` external-collaborator
//! traits. None of the three traits are implemented by this crate for
//! production use — a real trie-backed store and a real opcode logic
//! library live outside this core, per the Non-goals. A fixture
//! implementation lives behind the `test-utils` feature for exercising
//! the interpreter end to end.

use ethereum_types::{H160, U256};

use crate::errors::VMError;
use crate::frame::Frame;
use crate::message::{ChainEnvironment, Message};

/// Opaque token representing a point-in-time view of the persistent
/// store, usable to roll back all mutations made since it was taken.
pub type SnapshotId = u64;

/// The persistent world-state capability the interpreter needs: account
/// balances, code, storage slots, and transactional snapshot/revert.
pub trait Storage {
    fn get_balance(&self, address: H160) -> U256;
    fn set_balance(&mut self, address: H160, value: U256);

    fn get_code(&self, address: H160) -> Vec<u8>;
    fn delete_code(&mut self, address: H160);

    fn get_storage(&self, address: H160, key: U256) -> U256;
    fn set_storage(&mut self, address: H160, key: U256, value: U256);
    fn delete_storage(&mut self, address: H160);

    fn snapshot(&mut self) -> SnapshotId;
    fn revert(&mut self, id: SnapshotId);
}

/// A single opcode's base logic. Returning `Err` must be a
/// [`VMError`]; any other failure is a programming bug, not part of
/// this contract.
pub type OpcodeFn = fn(&mut dyn Host, &mut Frame) -> Result<(), VMError>;

/// Maps opcode bytes to logic and to their base gas cost. The table is
/// expected to be dense over all 256 byte values, with undefined bytes
/// routed by the embedder to an invalid-opcode sentinel.
pub trait OpcodeTable {
    fn opcode_fn(&self, opcode: u8) -> OpcodeFn;
    fn opcode_gas_cost(&self, opcode: u8) -> u64;
}

/// Everything opcode logic and [`Frame`] need from the top-level host:
/// storage access, the opcode table, and the ability to recurse into a
/// child message call. Expressed as a trait object (`&mut dyn Host`)
/// rather than a generic so that `OpcodeFn` can be a plain function
/// pointer instead of requiring per-backend monomorphization.
pub trait Host {
    fn get_balance(&self, address: H160) -> U256;
    fn set_balance(&mut self, address: H160, value: U256);
    fn get_code(&self, address: H160) -> Vec<u8>;
    fn delete_code(&mut self, address: H160);
    fn get_storage(&self, address: H160, key: U256) -> U256;
    fn set_storage(&mut self, address: H160, key: U256, value: U256);
    fn delete_storage(&mut self, address: H160);

    fn snapshot(&mut self) -> SnapshotId;
    fn revert(&mut self, id: SnapshotId);

    fn chain_environment(&self) -> ChainEnvironment;
    fn base_opcode_fn(&self, opcode: u8) -> OpcodeFn;
    fn opcode_gas_cost(&self, opcode: u8) -> u64;

    /// Runs `message` as a fresh top-level-or-nested call and returns
    /// its completed frame. Implemented in terms of
    /// [`crate::interpreter::apply_message`].
    fn apply_message(&mut self, message: Message) -> Frame;
}

/// Top-level façade holding the storage handle and chain context. Owns
/// nothing about any particular call tree — frames borrow it only for
/// the duration of a call.
pub struct Evm<S, T> {
    pub storage: S,
    pub chain_environment: ChainEnvironment,
    pub opcode_table: T,
}

impl<S: Storage, T: OpcodeTable> Evm<S, T> {
    pub fn new(storage: S, chain_environment: ChainEnvironment, opcode_table: T) -> Self {
        Self {
            storage,
            chain_environment,
            opcode_table,
        }
    }
}

impl<S: Storage, T: OpcodeTable> Host for Evm<S, T> {
    fn get_balance(&self, address: H160) -> U256 {
        self.storage.get_balance(address)
    }

    fn set_balance(&mut self, address: H160, value: U256) {
        self.storage.set_balance(address, value)
    }

    fn get_code(&self, address: H160) -> Vec<u8> {
        self.storage.get_code(address)
    }

    fn delete_code(&mut self, address: H160) {
        self.storage.delete_code(address)
    }

    fn get_storage(&self, address: H160, key: U256) -> U256 {
        self.storage.get_storage(address, key)
    }

    fn set_storage(&mut self, address: H160, key: U256, value: U256) {
        self.storage.set_storage(address, key, value)
    }

    fn delete_storage(&mut self, address: H160) {
        self.storage.delete_storage(address)
    }

    fn snapshot(&mut self) -> SnapshotId {
        self.storage.snapshot()
    }

    fn revert(&mut self, id: SnapshotId) {
        self.storage.revert(id)
    }

    fn chain_environment(&self) -> ChainEnvironment {
        self.chain_environment
    }

    fn base_opcode_fn(&self, opcode: u8) -> OpcodeFn {
        self.opcode_table.opcode_fn(opcode)
    }

    fn opcode_gas_cost(&self, opcode: u8) -> u64 {
        self.opcode_table.opcode_gas_cost(opcode)
    }

    fn apply_message(&mut self, message: Message) -> Frame {
        crate::interpreter::apply_message(self, message)
    }
}
