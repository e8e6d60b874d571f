//! Monotonic gas ledger with consume/return/refund channels.
//!
//! `gas_used` is the sum of `deductions` *and* `returns` — returned gas
//! increases recorded consumption rather than crediting it back. This
//! looks backwards but matches the source this crate is derived from
//! exactly and is preserved as an invariant (see the design notes on
//! potentially-buggy-but-preserved behavior).

use crate::errors::VMError;
use crate::frame::Frame;
use crate::host::{Host, OpcodeFn};
use tracing::{debug, trace};

#[derive(Debug, Clone, Default)]
pub struct GasMeter {
    start_gas: u64,
    deductions: Vec<u64>,
    returns: Vec<u64>,
    refunds: Vec<u64>,
}

impl GasMeter {
    pub fn new(start_gas: u64) -> Self {
        Self {
            start_gas,
            deductions: Vec::new(),
            returns: Vec::new(),
            refunds: Vec::new(),
        }
    }

    pub fn gas_used(&self) -> u64 {
        self.deductions.iter().sum::<u64>() + self.returns.iter().sum::<u64>()
    }

    pub fn gas_refunded(&self) -> u64 {
        self.refunds.iter().sum()
    }

    pub fn gas_remaining(&self) -> i128 {
        i128::from(self.start_gas) - i128::from(self.gas_used())
    }

    pub fn is_out_of_gas(&self) -> bool {
        self.gas_remaining() < 0
    }

    /// Appends `amount` to the deduction ledger. Fails immediately if the
    /// meter was already out of gas before this call; otherwise the
    /// deduction is recorded even if it drives the meter negative — the
    /// caller (typically [`GasMeter::wrap_opcode_fn`]) must check
    /// [`GasMeter::is_out_of_gas`] afterward.
    pub fn consume_gas(&mut self, amount: u64) -> Result<(), VMError> {
        if self.is_out_of_gas() {
            return Err(VMError::OutOfGas);
        }

        let before = self.gas_remaining();
        self.deductions.push(amount);
        trace!(before, amount, after = self.gas_remaining(), "gas consumed");
        Ok(())
    }

    pub fn return_gas(&mut self, amount: u64) {
        let before = self.gas_remaining();
        self.returns.push(amount);
        debug!(before, amount, after = self.gas_remaining(), "gas returned");
    }

    pub fn refund_gas(&mut self, amount: u64) {
        let before = self.gas_refunded();
        self.refunds.push(amount);
        debug!(before, amount, after = self.gas_refunded(), "gas refunded");
    }

    /// Wraps an opcode's logic so that every dispatch consumes
    /// `gas_cost` first and fails `OutOfGas` before the logic ever runs
    /// if that consumption exhausts the meter. This is the one chokepoint
    /// every opcode dispatch passes through — [`crate::frame::Frame::get_opcode_fn`]
    /// calls this directly rather than re-implementing the consume/check/
    /// invoke sequence itself.
    ///
    /// Takes `frame` and `opcode_fn` together, rather than closing over
    /// `frame` in a captured closure, because `opcode_fn` itself needs
    /// `&mut Frame` — the same frame whose gas meter this method is
    /// metering — and a closure capturing `frame` while `&mut
    /// frame.state.gas_meter` is also borrowed would alias the same data
    /// twice.
    pub fn wrap_opcode_fn(
        frame: &mut Frame,
        host: &mut dyn Host,
        opcode: u8,
        gas_cost: u64,
        opcode_fn: OpcodeFn,
    ) -> Result<(), VMError> {
        let _ = opcode;
        frame.state.gas_meter.consume_gas(gas_cost)?;
        if frame.state.gas_meter.is_out_of_gas() {
            return Err(VMError::OutOfGas);
        }
        opcode_fn(host, frame)
    }
}
