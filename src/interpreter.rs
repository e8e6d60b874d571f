//! The fetch-decode-dispatch loop and message application: the two
//! functions that tie every other component together.

use tracing::debug;

use crate::constants::STACK_DEPTH_LIMIT;
use crate::errors::VMError;
use crate::frame::Frame;
use crate::host::Host;
use crate::message::Message;
use crate::opcodes;

/// Applies `message` against `host`: snapshots storage, checks the call
/// depth limit, transfers value, builds a frame, executes it, and
/// reverts storage to the snapshot if the frame ended in error.
///
/// Always returns a completed [`Frame`] — failures (depth limit,
/// insufficient funds, any `VMError` raised mid-execution) are recorded
/// on `frame.error` rather than propagated as a `Result`, so a caller
/// spawning a child call can inspect the failure without the success
/// path needing to unwind through it.
pub fn apply_message(host: &mut dyn Host, message: Message) -> Frame {
    let snapshot = host.snapshot();
    let mut frame = Frame::new(host, message);

    if frame.message.depth >= STACK_DEPTH_LIMIT {
        frame.error = Some(VMError::StackDepthLimit);
        host.revert(snapshot);
        return frame;
    }

    if !frame.message.value.is_zero() {
        let sender_balance = host.get_balance(frame.message.sender);
        if sender_balance < frame.message.value {
            frame.error = Some(VMError::InsufficientFunds);
            host.revert(snapshot);
            return frame;
        }

        host.set_balance(frame.message.sender, sender_balance - frame.message.value);
        let recipient_balance = host.get_balance(frame.message.account);
        host.set_balance(frame.message.account, recipient_balance + frame.message.value);
    }

    execute_vm(host, &mut frame);

    if frame.error.is_some() {
        host.revert(snapshot);
    }

    frame
}

/// Runs the fetch-decode-dispatch loop for `frame` against `host` until
/// a terminal opcode, an out-of-range fetch (`STOP`), or a `VMError`
/// ends it. Commits or abandons the frame's pending account deletions
/// via [`Frame::finish`] on the way out, regardless of which of those
/// three stopped the loop.
pub fn execute_vm(host: &mut dyn Host, frame: &mut Frame) {
    debug!(
        gas = frame.message.gas,
        sender = ?frame.message.sender,
        account = ?frame.message.account,
        value = ?frame.message.value,
        "executing frame"
    );

    loop {
        let opcode = frame.state.code.next();
        debug!(opcode, mnemonic = opcodes::mnemonic(opcode), pc = frame.state.code.pc(), "dispatching opcode");

        let dispatch = frame.get_opcode_fn(host, opcode);

        match dispatch(host, frame) {
            Ok(()) => {}
            Err(err) => {
                frame.error = Some(err);
                break;
            }
        }

        if opcodes::is_break_opcode(opcode) {
            break;
        }
    }

    frame.finish(host);
}
