//! End-to-end scenarios driving `apply_message` against the in-memory
//! `Storage` and fixture `OpcodeTable`, the same way as the six literal
//! byte-sequence scenarios this crate's core spec calls out.

use ethereum_types::U256;
use micro_evm::testutil::{memory_host_with_code, ACCOUNT_A, ACCOUNT_B};
use micro_evm::{Host, Message, Storage, ValidationError, VMError};

fn call(gas: u64, code: Vec<u8>) -> micro_evm::Frame {
    let mut evm = memory_host_with_code(code);
    let message = Message::from_parts(
        gas,
        U256::zero(),
        ACCOUNT_B,
        ACCOUNT_A,
        ACCOUNT_B,
        U256::zero(),
        vec![],
        0,
    );
    evm.apply_message(message)
}

#[test]
fn stop_terminates_with_empty_output_and_no_error() {
    let frame = call(1_000, vec![0x00]);
    assert!(frame.error.is_none());
    assert!(frame.output.is_empty());
}

#[test]
fn push_add_stop_leaves_sum_on_stack() {
    // PUSH1 0x01, PUSH1 0x02, ADD, STOP
    let frame = call(1_000, vec![0x60, 0x01, 0x60, 0x02, 0x01, 0x00]);
    assert!(frame.error.is_none());
    assert_eq!(frame.state.stack.length(), 1);
}

#[test]
fn push1_with_missing_immediate_reads_implicit_zero_then_stops() {
    // PUSH1 with no trailing byte: reads one byte past end as 0x00,
    // pushes it, then the next fetch yields STOP.
    let mut frame = call(1_000, vec![0x60]);
    assert!(frame.error.is_none());
    assert_eq!(frame.state.stack.pop().unwrap(), vec![0x00]);
}

#[test]
fn jump_to_non_jumpdest_fails_invalid_jump_destination() {
    // PUSH1 0x05, JUMP — byte at offset 5 is past the code and not a
    // JUMPDEST.
    let frame = call(1_000, vec![0x60, 0x05, 0x56]);
    assert_eq!(frame.error, Some(VMError::InvalidJumpDestination));
}

#[test]
fn out_of_gas_during_push_leaves_no_observable_stack_change() {
    // start_gas = 2, PUSH1 costs 3 in the fixture table: the very first
    // PUSH1 drives gas_remaining negative and OutOfGas fires.
    let frame = call(2, vec![0x60, 0x01, 0x60, 0x02, 0x01]);
    assert_eq!(frame.error, Some(VMError::OutOfGas));
}

#[test]
fn jump_into_a_push_immediate_is_rejected() {
    // PUSH2 0x5b 0x5b (positions 0..3), PUSH1 0x02 (positions 3..5),
    // JUMP. Position 2 holds a byte that looks like JUMPDEST but lies
    // inside the PUSH2's own immediate region, so it is not a valid
    // jump target even though the raw byte matches.
    let code = vec![0x61, 0x5b, 0x5b, 0x60, 0x02, 0x56];
    let frame = call(1_000, code);
    assert_eq!(frame.error, Some(VMError::InvalidJumpDestination));
}

#[test]
fn jump_to_valid_jumpdest_succeeds() {
    // PUSH1 0x04, JUMP, (pad), JUMPDEST, STOP
    let code = vec![0x60, 0x04, 0x56, 0x00, 0x5b, 0x00];
    let frame = call(1_000, code);
    assert!(frame.error.is_none());
}

#[test]
fn nested_call_at_depth_limit_fails_before_any_opcode_runs() {
    let mut evm = memory_host_with_code(vec![0x60, 0x01, 0x00]);
    let message = Message::from_parts(
        1_000,
        U256::zero(),
        ACCOUNT_B,
        ACCOUNT_A,
        ACCOUNT_B,
        U256::zero(),
        vec![],
        1024,
    );
    let frame = evm.apply_message(message);
    assert_eq!(frame.error, Some(VMError::StackDepthLimit));
    assert_eq!(frame.state.stack.length(), 0);
}

#[test]
fn insufficient_funds_reverts_before_any_opcode_runs() {
    let mut evm = memory_host_with_code(vec![0x00]);
    let message = Message::from_parts(
        1_000,
        U256::zero(),
        ACCOUNT_B,
        ACCOUNT_A,
        ACCOUNT_B,
        U256::from(100),
        vec![],
        0,
    );
    let frame = evm.apply_message(message);
    assert_eq!(frame.error, Some(VMError::InsufficientFunds));
}

#[test]
fn value_transfer_moves_balance_on_success() {
    let mut evm = memory_host_with_code(vec![0x00]);
    evm.storage.set_balance(ACCOUNT_B, U256::from(100));

    let message = Message::from_parts(
        1_000,
        U256::zero(),
        ACCOUNT_B,
        ACCOUNT_A,
        ACCOUNT_B,
        U256::from(40),
        vec![],
        0,
    );
    let frame = evm.apply_message(message);
    assert!(frame.error.is_none());
    assert_eq!(evm.storage.get_balance(ACCOUNT_A), U256::from(40));
    assert_eq!(evm.storage.get_balance(ACCOUNT_B), U256::from(60));
}

#[test]
fn failed_call_reverts_storage_including_value_transfer() {
    let mut evm = memory_host_with_code(vec![0x60, 0xff, 0x56]); // PUSH1 0xff, JUMP -> invalid
    evm.storage.set_balance(ACCOUNT_B, U256::from(100));

    let message = Message::from_parts(
        1_000,
        U256::zero(),
        ACCOUNT_B,
        ACCOUNT_A,
        ACCOUNT_B,
        U256::from(40),
        vec![],
        0,
    );
    let frame = evm.apply_message(message);
    assert!(frame.error.is_some());
    assert_eq!(evm.storage.get_balance(ACCOUNT_A), U256::zero());
    assert_eq!(evm.storage.get_balance(ACCOUNT_B), U256::from(100));
}

#[test]
fn suicide_registers_account_for_deletion_and_commits_on_clean_exit() {
    // PUSH20 <beneficiary>, SUICIDE
    let mut code = vec![0x73]; // PUSH20
    code.extend_from_slice(&ACCOUNT_B.0);
    code.push(0xff); // SUICIDE

    let frame = call(1_000, code);
    assert!(frame.error.is_none());
    assert!(frame.accounts_to_delete.is_empty(), "finish() drains the map on commit");
}

#[test]
fn hex_encoded_bytecode_runs_the_same_as_its_literal_byte_vector() {
    // "60016002 0100" == PUSH1 0x01, PUSH1 0x02, ADD, STOP, the same
    // sequence as push_add_stop_leaves_sum_on_stack above, but arriving
    // the way bytecode actually shows up off the wire: a hex string.
    let code = hex::decode("60016002010000").expect("valid hex");
    let frame = call(1_000, code);
    assert!(frame.error.is_none());
    assert_eq!(frame.state.stack.length(), 1);
}

#[test]
fn message_new_accepts_raw_address_and_value_bytes_off_the_wire() {
    let account = hex::decode("1111111111111111111111111111111111111111").expect("valid hex");
    let sender = hex::decode("2222222222222222222222222222222222222222").expect("valid hex");
    let value = hex::decode("28").expect("valid hex"); // 40

    let message = Message::new(1_000, &[], &sender, &account, &sender, &value, vec![], 0)
        .expect("canonical wire fields should validate");

    let mut evm = memory_host_with_code(vec![0x00]);
    evm.storage.set_balance(ACCOUNT_B, U256::from(100));
    let frame = evm.apply_message(message);
    assert!(frame.error.is_none());
    assert_eq!(evm.storage.get_balance(ACCOUNT_A), U256::from(40));
}

#[test]
fn message_new_rejects_truncated_account_address_off_the_wire() {
    let short_account = hex::decode("111111111111111111111111111111111111").expect("valid hex");
    let sender = hex::decode("2222222222222222222222222222222222222222").expect("valid hex");

    let result = Message::new(1_000, &[], &sender, &short_account, &sender, &[], vec![], 0);
    assert_eq!(
        result,
        Err(ValidationError::WrongLength {
            expected: 20,
            actual: 18
        })
    );
}
