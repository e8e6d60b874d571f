//! Immutable value objects describing an invocation and its block-scoped
//! chain context. Construction is the only mutation point — every field
//! is validated once, up front.

use ethereum_types::{H160, U256};

use crate::errors::ValidationError;

/// An immutable descriptor of one message-call invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub gas: u64,
    pub gas_price: U256,
    pub origin: H160,
    pub account: H160,
    pub sender: H160,
    pub value: U256,
    pub data: Vec<u8>,
    pub depth: usize,
}

impl Message {
    /// Validating constructor for the system boundary: addresses and
    /// integers arrive as raw bytes (the shape they'd have coming off a
    /// transaction or an RPC payload, before anything has checked them)
    /// and are rejected if they don't fit a canonical address or a
    /// uint256. `depth` is taken as `i64` because "depth ≥ 0" is only a
    /// checkable invariant for a representation that can actually go
    /// negative.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        gas: u64,
        gas_price: &[u8],
        origin: &[u8],
        account: &[u8],
        sender: &[u8],
        value: &[u8],
        data: Vec<u8>,
        depth: i64,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            gas,
            gas_price: parse_uint256(gas_price)?,
            origin: parse_address(origin)?,
            account: parse_address(account)?,
            sender: parse_address(sender)?,
            value: parse_uint256(value)?,
            data,
            depth: parse_depth(depth)?,
        })
    }

    /// Builds a `Message` from fields that are already typed and already
    /// known-valid — used internally by
    /// [`crate::frame::Frame::create_message`], which copies `origin` and
    /// `sender` straight out of a parent frame's own validated `Message`.
    /// Re-running byte-level validation on values that can only ever
    /// have come from a successful [`Message::new`] would be pure
    /// overhead, not a safety check.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        gas: u64,
        gas_price: U256,
        origin: H160,
        account: H160,
        sender: H160,
        value: U256,
        data: Vec<u8>,
        depth: usize,
    ) -> Self {
        Self {
            gas,
            gas_price,
            origin,
            account,
            sender,
            value,
            data,
            depth,
        }
    }
}

/// Immutable block-scoped context shared by every frame in a call tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainEnvironment {
    pub block_number: U256,
    pub gas_limit: u64,
    pub timestamp: u64,
}

impl ChainEnvironment {
    /// Validating constructor: `block_number` arrives as raw big-endian
    /// bytes and must fit a uint256 before becoming a typed `U256`.
    pub fn new(block_number: &[u8], gas_limit: u64, timestamp: u64) -> Result<Self, ValidationError> {
        Ok(Self {
            block_number: parse_uint256(block_number)?,
            gas_limit,
            timestamp,
        })
    }

    /// Builds a `ChainEnvironment` from an already-typed `block_number`.
    pub fn from_parts(block_number: U256, gas_limit: u64, timestamp: u64) -> Self {
        Self {
            block_number,
            gas_limit,
            timestamp,
        }
    }
}

fn parse_address(bytes: &[u8]) -> Result<H160, ValidationError> {
    if bytes.len() != 20 {
        return Err(ValidationError::WrongLength {
            expected: 20,
            actual: bytes.len(),
        });
    }
    Ok(H160::from_slice(bytes))
}

fn parse_uint256(bytes: &[u8]) -> Result<U256, ValidationError> {
    if bytes.len() > 32 {
        return Err(ValidationError::WrongLength {
            expected: 32,
            actual: bytes.len(),
        });
    }
    Ok(U256::from_big_endian(bytes))
}

fn parse_depth(depth: i64) -> Result<usize, ValidationError> {
    usize::try_from(depth).map_err(|_| ValidationError::NotNonNegative(depth))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_accepts_canonical_fields() {
        let address = [0x11u8; 20];
        let message = Message::new(1_000, &[0x02], &address, &address, &address, &[0x05], vec![1, 2, 3], 0)
            .expect("canonical fields should validate");
        assert_eq!(message.origin, H160::from_slice(&address));
        assert_eq!(message.gas_price, U256::from(2));
        assert_eq!(message.value, U256::from(5));
        assert_eq!(message.depth, 0);
    }

    #[test]
    fn new_rejects_address_with_wrong_length() {
        let short_address = [0x11u8; 19];
        let full_address = [0x11u8; 20];
        let result = Message::new(1_000, &[], &full_address, &short_address, &full_address, &[], vec![], 0);
        assert_eq!(
            result,
            Err(ValidationError::WrongLength {
                expected: 20,
                actual: 19
            })
        );
    }

    #[test]
    fn new_rejects_oversized_integer() {
        let address = [0x11u8; 20];
        let oversized = [0xffu8; 33];
        let result = Message::new(1_000, &oversized, &address, &address, &address, &[], vec![], 0);
        assert_eq!(
            result,
            Err(ValidationError::WrongLength {
                expected: 32,
                actual: 33
            })
        );
    }

    #[test]
    fn new_rejects_negative_depth() {
        let address = [0x11u8; 20];
        let result = Message::new(1_000, &[], &address, &address, &address, &[], vec![], -1);
        assert_eq!(result, Err(ValidationError::NotNonNegative(-1)));
    }

    #[test]
    fn chain_environment_new_rejects_oversized_block_number() {
        let result = ChainEnvironment::new(&[0xffu8; 33], 30_000_000, 0);
        assert_eq!(
            result,
            Err(ValidationError::WrongLength {
                expected: 32,
                actual: 33
            })
        );
    }
}
