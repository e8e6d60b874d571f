//! Per-frame computation state: memory, stack, code cursor, and gas
//! meter, plus the single chokepoint that prices memory growth in gas.

use tracing::trace;

use crate::code::CodeStream;
use crate::errors::VMError;
use crate::gas::GasMeter;
use crate::memory::{ceil32, Memory};
use crate::stack::Stack;

/// Quadratic-ish memory expansion pricing, the same shape used by every
/// EVM implementation in this lineage: a linear term plus a quadratic
/// term over the word count.
pub fn memory_gas_cost(size_in_bytes: usize) -> u64 {
    let words = (size_in_bytes / 32) as u64;
    let linear = words.saturating_mul(3);
    let quadratic = words.saturating_mul(words) / 512;
    linear.saturating_add(quadratic)
}

#[derive(Debug, Clone)]
pub struct State {
    pub memory: Memory,
    pub stack: Stack,
    pub code: CodeStream,
    pub gas_meter: GasMeter,
}

impl State {
    pub fn new(code: Vec<u8>, start_gas: u64) -> Self {
        Self {
            memory: Memory::new(),
            stack: Stack::new(),
            code: CodeStream::new(code),
            gas_meter: GasMeter::new(start_gas),
        }
    }

    /// Grows memory to cover `[start, start + size)`, pricing only the
    /// *additional* words beyond what was already paid for. No bytes are
    /// appended if pricing the growth exhausts the gas meter.
    pub fn extend_memory(&mut self, start: usize, size: usize) -> Result<(), VMError> {
        if size == 0 {
            return Ok(());
        }

        let before_size = ceil32(self.memory.length());
        let after_size = ceil32(start.saturating_add(size));

        let before_cost = memory_gas_cost(before_size);
        let after_cost = memory_gas_cost(after_size);

        trace!(before_size, after_size, before_cost, after_cost, "memory extension priced");

        if after_cost > before_cost {
            self.gas_meter.consume_gas(after_cost - before_cost)?;
        }

        if self.gas_meter.is_out_of_gas() {
            return Err(VMError::OutOfGas);
        }

        self.memory.extend(start, size);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extend_memory_is_idempotent_in_bytes_not_gas() {
        let mut state = State::new(vec![], 1_000_000);
        state.extend_memory(0, 32).unwrap();
        let len_after_first = state.memory.length();
        let used_after_first = state.gas_meter.gas_used();

        state.extend_memory(0, 32).unwrap();
        assert_eq!(state.memory.length(), len_after_first);
        assert_eq!(state.gas_meter.gas_used(), used_after_first);
    }

    #[test]
    fn extend_memory_fails_out_of_gas_without_appending_bytes() {
        let mut state = State::new(vec![], 1);
        let before_len = state.memory.length();
        let result = state.extend_memory(0, 32);
        assert_eq!(result, Err(VMError::OutOfGas));
        assert_eq!(state.memory.length(), before_len);
    }
}
