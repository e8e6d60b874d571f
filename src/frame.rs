//! The execution environment: one invocation's complete computation
//! state, created per message and discarded at return.

use std::collections::HashMap;

use ethereum_types::H160;

use crate::errors::VMError;
use crate::host::{Host, OpcodeFn};
use crate::message::{ChainEnvironment, Message};
use crate::state::State;

/// One emitted log entry: `(account, topics, data)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub account: H160,
    pub topics: Vec<ethereum_types::H256>,
    pub data: Vec<u8>,
}

/// A frame exclusively owns its [`State`] (memory, stack, code cursor,
/// gas meter); it borrows the host and chain environment only for the
/// duration of a call. Sub-frames are owned by their parent in creation
/// order, so the execution tree can be walked after the fact; children
/// hold no back-pointer to their parent.
pub struct Frame {
    pub chain_environment: ChainEnvironment,
    pub message: Message,
    pub state: State,

    pub sub_environments: Vec<Frame>,
    pub logs: Vec<LogEntry>,
    pub accounts_to_delete: HashMap<H160, H160>,
    pub output: Vec<u8>,
    pub error: Option<VMError>,
}

impl Frame {
    /// Loads the callee's code from storage and builds a fresh [`State`]
    /// with `start_gas = message.gas`.
    pub fn new(host: &dyn Host, message: Message) -> Self {
        let code = host.get_code(message.account);
        let state = State::new(code, message.gas);
        Self {
            chain_environment: host.chain_environment(),
            message,
            state,
            sub_environments: Vec::new(),
            logs: Vec::new(),
            accounts_to_delete: HashMap::new(),
            output: Vec::new(),
            error: None,
        }
    }

    /// Runs `message` as a child call through the host, appends the
    /// resulting sub-frame to this frame's execution tree, and returns a
    /// reference to it.
    pub fn apply_message(&mut self, host: &mut dyn Host, message: Message) -> &Frame {
        let sub_environment = host.apply_message(message);
        self.sub_environments.push(sub_environment);
        self.sub_environments
            .last()
            .expect("just pushed a sub-environment")
    }

    /// Builds a child message inheriting `gas_price` and `origin` from
    /// this frame, sent by this frame's own account, one depth deeper.
    pub fn create_message(&self, gas: u64, to: H160, value: ethereum_types::U256, data: Vec<u8>) -> Message {
        Message::from_parts(
            gas,
            self.message.gas_price,
            self.message.origin,
            to,
            self.message.account,
            value,
            data,
            self.message.depth + 1,
        )
    }

    /// Resolves the gas-metered dispatch function for `opcode`. The
    /// opcode table is trusted to be dense (256 entries, undefined bytes
    /// routed to an invalid-opcode sentinel by the embedder) — this is
    /// the one gate through which every opcode's gas cost is charged
    /// before its logic ever runs.
    pub fn get_opcode_fn(
        &self,
        host: &dyn Host,
        opcode: u8,
    ) -> Box<dyn Fn(&mut dyn Host, &mut Frame) -> Result<(), VMError>> {
        let base_fn: OpcodeFn = host.base_opcode_fn(opcode);
        let gas_cost = host.opcode_gas_cost(opcode);

        Box::new(move |host, frame| {
            crate::gas::GasMeter::wrap_opcode_fn(frame, host, opcode, gas_cost, base_fn)
        })
    }

    /// Records `self.message.account` for deletion in favor of
    /// `beneficiary`. An account being registered twice within one frame
    /// is an invariant violation in the opcode logic calling this, not a
    /// recoverable VM error.
    pub fn register_account_for_deletion(&mut self, beneficiary: H160) {
        let account = self.message.account;
        let previous = self.accounts_to_delete.insert(account, beneficiary);
        assert!(
            previous.is_none(),
            "account registered for deletion twice within one frame"
        );
    }

    pub fn add_log_entry(&mut self, account: H160, topics: Vec<ethereum_types::H256>, data: Vec<u8>) {
        self.logs.push(LogEntry { account, topics, data });
    }

    /// The scoped commit/abort discipline. Called once by the
    /// interpreter loop at scope exit. On success, pending account
    /// deletions are applied (balance moved to beneficiary, storage and
    /// code deleted); on error they are left unapplied and abandoned by
    /// the caller.
    pub(crate) fn finish(&mut self, host: &mut dyn Host) {
        if self.error.is_some() {
            return;
        }

        for (account, beneficiary) in self.accounts_to_delete.drain() {
            let balance = host.get_balance(account);
            host.set_balance(account, ethereum_types::U256::zero());

            let beneficiary_balance = host.get_balance(beneficiary);
            host.set_balance(beneficiary, beneficiary_balance + balance);

            host.delete_storage(account);
            host.delete_code(account);
        }
    }
}
