//! Instruction implementations
//!
//! Handlers run after the dispatcher has charged the instruction's gas and
//! checked its stack arity, so every pop of a declared input succeeds.
//! They report how execution continues through [`Control`].

use crate::context::{CallKind, Message};
use crate::error::{VmError, VmResult};
use crate::host::Host;
use crate::interpreter::Interpreter;
use crate::opcode::Opcode;
use crate::result::StatusCode;
use bytes::Bytes;
use minivm_primitives::Word;
use sha3::{Digest, Keccak256};

/// What the dispatcher does after a handler returns
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    /// Advance past the opcode and its immediates
    Continue,
    /// Continue at a validated jump destination
    Jump(usize),
    /// Stop with a final status and output
    Halt {
        /// Final status
        status: StatusCode,
        /// Output data
        output: Bytes,
    },
}

/// A memory region as `(offset, len)`; `None` when the length is zero
type Region = Option<(usize, usize)>;

/// Resolve a region from stack operands. Empty regions are valid whatever
/// their offset.
fn region(offset: &Word, len: &Word) -> VmResult<Region> {
    if len.is_zero() {
        return Ok(None);
    }
    let len = len.to_usize().ok_or(VmError::MemoryBoundsExceeded)?;
    Ok(Some((memory_offset(offset)?, len)))
}

fn memory_offset(offset: &Word) -> VmResult<usize> {
    offset.to_usize().ok_or(VmError::MemoryBoundsExceeded)
}

/// Charge growth over all `regions` together with `extra` in one deduction.
/// Nothing is modified unless the whole amount can be paid.
fn charge_memory(interp: &mut Interpreter, regions: &[Region], extra: u64) -> VmResult<()> {
    let current = interp.memory.size();
    let mut end = current;
    for &(offset, len) in regions.iter().flatten() {
        if let Some(grown) = interp.memory.growth(offset, len)? {
            end = end.max(grown);
        }
    }
    let cost = interp
        .config
        .memory_cost
        .expansion_cost(current, end)
        .saturating_add(extra);
    interp.gas.charge(cost)
}

fn expand_memory(interp: &mut Interpreter, regions: &[Region]) -> VmResult<()> {
    for &(offset, len) in regions.iter().flatten() {
        interp.memory.expand(offset, len)?;
    }
    Ok(())
}

/// Copy the top `N` operands, top first, without popping them
fn peek_operands<const N: usize>(interp: &Interpreter) -> VmResult<[Word; N]> {
    let mut operands = [Word::ZERO; N];
    for (depth, operand) in operands.iter_mut().enumerate() {
        *operand = *interp.stack.peek(depth)?;
    }
    Ok(operands)
}

fn drop_operands(interp: &mut Interpreter, n: usize) -> VmResult<()> {
    for _ in 0..n {
        interp.stack.pop()?;
    }
    Ok(())
}

fn read_region(interp: &Interpreter, region: Region) -> VmResult<Vec<u8>> {
    match region {
        Some((offset, len)) => interp.memory.read(offset, len),
        None => Ok(Vec::new()),
    }
}

fn binary_op(interp: &mut Interpreter, op: impl FnOnce(Word, Word) -> Word) -> VmResult<Control> {
    let a = interp.stack.pop()?;
    let b = interp.stack.pop()?;
    interp.stack.push(op(a, b))?;
    Ok(Control::Continue)
}

fn unary_op(interp: &mut Interpreter, op: impl FnOnce(Word) -> Word) -> VmResult<Control> {
    let a = interp.stack.pop()?;
    interp.stack.push(op(a))?;
    Ok(Control::Continue)
}

fn push_word(interp: &mut Interpreter, value: Word) -> VmResult<Control> {
    interp.stack.push(value)?;
    Ok(Control::Continue)
}

// Control flow

pub(crate) fn stop(_: &mut Interpreter, _: &mut dyn Host) -> VmResult<Control> {
    Ok(Control::Halt {
        status: StatusCode::Success,
        output: Bytes::new(),
    })
}

pub(crate) fn jump(interp: &mut Interpreter, _: &mut dyn Host) -> VmResult<Control> {
    let dest = interp.stack.pop()?;
    interp.jump_target(&dest).map(Control::Jump)
}

pub(crate) fn jumpi(interp: &mut Interpreter, _: &mut dyn Host) -> VmResult<Control> {
    let dest = interp.stack.pop()?;
    let condition = interp.stack.pop()?;
    if condition.is_zero() {
        return Ok(Control::Continue);
    }
    interp.jump_target(&dest).map(Control::Jump)
}

pub(crate) fn jumpdest(_: &mut Interpreter, _: &mut dyn Host) -> VmResult<Control> {
    Ok(Control::Continue)
}

pub(crate) fn pc(interp: &mut Interpreter, _: &mut dyn Host) -> VmResult<Control> {
    let pc = interp.pc as u64;
    push_word(interp, Word::from_u64(pc))
}

pub(crate) fn gas(interp: &mut Interpreter, _: &mut dyn Host) -> VmResult<Control> {
    let remaining = interp.gas.remaining().max(0) as u64;
    push_word(interp, Word::from_u64(remaining))
}

fn halt_with_memory(interp: &mut Interpreter, status: StatusCode) -> VmResult<Control> {
    let [offset, len] = peek_operands(interp)?;
    let region = region(&offset, &len)?;
    charge_memory(interp, &[region], 0)?;
    drop_operands(interp, 2)?;
    expand_memory(interp, &[region])?;
    let output = Bytes::from(read_region(interp, region)?);
    Ok(Control::Halt { status, output })
}

pub(crate) fn ret(interp: &mut Interpreter, _: &mut dyn Host) -> VmResult<Control> {
    halt_with_memory(interp, StatusCode::Success)
}

pub(crate) fn revert(interp: &mut Interpreter, _: &mut dyn Host) -> VmResult<Control> {
    halt_with_memory(interp, StatusCode::Revert)
}

// Arithmetic, comparison, bitwise

pub(crate) fn add(interp: &mut Interpreter, _: &mut dyn Host) -> VmResult<Control> {
    binary_op(interp, |a, b| a.wrapping_add(&b))
}

pub(crate) fn mul(interp: &mut Interpreter, _: &mut dyn Host) -> VmResult<Control> {
    binary_op(interp, |a, b| a.wrapping_mul(&b))
}

pub(crate) fn sub(interp: &mut Interpreter, _: &mut dyn Host) -> VmResult<Control> {
    binary_op(interp, |a, b| a.wrapping_sub(&b))
}

pub(crate) fn div(interp: &mut Interpreter, _: &mut dyn Host) -> VmResult<Control> {
    binary_op(interp, |a, b| a.div_or_zero(&b))
}

pub(crate) fn rem(interp: &mut Interpreter, _: &mut dyn Host) -> VmResult<Control> {
    binary_op(interp, |a, b| a.rem_or_zero(&b))
}

pub(crate) fn lt(interp: &mut Interpreter, _: &mut dyn Host) -> VmResult<Control> {
    binary_op(interp, |a, b| Word::from(a < b))
}

pub(crate) fn gt(interp: &mut Interpreter, _: &mut dyn Host) -> VmResult<Control> {
    binary_op(interp, |a, b| Word::from(a > b))
}

pub(crate) fn eq(interp: &mut Interpreter, _: &mut dyn Host) -> VmResult<Control> {
    binary_op(interp, |a, b| Word::from(a == b))
}

pub(crate) fn iszero(interp: &mut Interpreter, _: &mut dyn Host) -> VmResult<Control> {
    unary_op(interp, |a| Word::from(a.is_zero()))
}

pub(crate) fn and(interp: &mut Interpreter, _: &mut dyn Host) -> VmResult<Control> {
    binary_op(interp, |a, b| a & b)
}

pub(crate) fn or(interp: &mut Interpreter, _: &mut dyn Host) -> VmResult<Control> {
    binary_op(interp, |a, b| a | b)
}

pub(crate) fn xor(interp: &mut Interpreter, _: &mut dyn Host) -> VmResult<Control> {
    binary_op(interp, |a, b| a ^ b)
}

pub(crate) fn not(interp: &mut Interpreter, _: &mut dyn Host) -> VmResult<Control> {
    unary_op(interp, |a| !a)
}

pub(crate) fn keccak256(interp: &mut Interpreter, _: &mut dyn Host) -> VmResult<Control> {
    let [offset, len] = peek_operands(interp)?;
    let region = region(&offset, &len)?;
    let hashed = region.map_or(0, |(_, len)| len);
    let extra = interp.config.gas_schedule.keccak_cost(hashed);
    charge_memory(interp, &[region], extra)?;
    drop_operands(interp, 2)?;
    expand_memory(interp, &[region])?;
    let data = read_region(interp, region)?;

    let hash: [u8; 32] = Keccak256::digest(&data).into();
    push_word(interp, Word::from_bytes(hash))
}

// Environment

pub(crate) fn address(interp: &mut Interpreter, _: &mut dyn Host) -> VmResult<Control> {
    let destination = interp.message.destination;
    push_word(interp, Word::from(destination))
}

pub(crate) fn caller(interp: &mut Interpreter, _: &mut dyn Host) -> VmResult<Control> {
    let sender = interp.message.sender;
    push_word(interp, Word::from(sender))
}

pub(crate) fn callvalue(interp: &mut Interpreter, _: &mut dyn Host) -> VmResult<Control> {
    let value = interp.message.value;
    push_word(interp, value)
}

pub(crate) fn calldataload(interp: &mut Interpreter, _: &mut dyn Host) -> VmResult<Control> {
    let offset = interp.stack.pop()?;
    let input = &interp.message.input;
    let mut bytes = [0u8; 32];
    if let Some(start) = offset.to_usize().filter(|&o| o < input.len()) {
        let end = start.saturating_add(Word::LEN).min(input.len());
        bytes[..end - start].copy_from_slice(&input[start..end]);
    }
    push_word(interp, Word::from_bytes(bytes))
}

pub(crate) fn calldatasize(interp: &mut Interpreter, _: &mut dyn Host) -> VmResult<Control> {
    let size = interp.message.input.len() as u64;
    push_word(interp, Word::from_u64(size))
}

pub(crate) fn origin(interp: &mut Interpreter, host: &mut dyn Host) -> VmResult<Control> {
    push_word(interp, Word::from(host.get_tx_context().origin))
}

pub(crate) fn timestamp(interp: &mut Interpreter, host: &mut dyn Host) -> VmResult<Control> {
    push_word(interp, Word::from_u64(host.get_tx_context().block_timestamp))
}

pub(crate) fn number(interp: &mut Interpreter, host: &mut dyn Host) -> VmResult<Control> {
    push_word(interp, Word::from_u64(host.get_tx_context().block_number))
}

pub(crate) fn chainid(interp: &mut Interpreter, host: &mut dyn Host) -> VmResult<Control> {
    push_word(interp, host.get_tx_context().chain_id)
}

// Stack

pub(crate) fn pop(interp: &mut Interpreter, _: &mut dyn Host) -> VmResult<Control> {
    interp.stack.pop()?;
    Ok(Control::Continue)
}

pub(crate) fn push0(interp: &mut Interpreter, _: &mut dyn Host) -> VmResult<Control> {
    push_word(interp, Word::ZERO)
}

/// PUSH1..PUSH32. Immediates cut off by the end of code read as zero bytes
/// on the right.
pub(crate) fn push(interp: &mut Interpreter, _: &mut dyn Host) -> VmResult<Control> {
    let n = interp.current.immediate_size();
    let start = (interp.pc + 1).min(interp.code.len());
    let end = (start + n).min(interp.code.len());
    let available = &interp.code[start..end];

    let mut bytes = [0u8; 32];
    let first = Word::LEN - n;
    bytes[first..first + available.len()].copy_from_slice(available);
    push_word(interp, Word::from_bytes(bytes))
}

pub(crate) fn dup(interp: &mut Interpreter, _: &mut dyn Host) -> VmResult<Control> {
    let n = (interp.current.get() - Opcode::DUP1.get()) as usize + 1;
    interp.stack.dup(n)?;
    Ok(Control::Continue)
}

pub(crate) fn swap(interp: &mut Interpreter, _: &mut dyn Host) -> VmResult<Control> {
    let n = (interp.current.get() - Opcode::SWAP1.get()) as usize + 1;
    interp.stack.swap(n)?;
    Ok(Control::Continue)
}

// Memory

pub(crate) fn mload(interp: &mut Interpreter, _: &mut dyn Host) -> VmResult<Control> {
    let [offset] = peek_operands(interp)?;
    let offset = memory_offset(&offset)?;
    let region = Some((offset, Word::LEN));
    charge_memory(interp, &[region], 0)?;
    drop_operands(interp, 1)?;
    expand_memory(interp, &[region])?;
    let value = interp.memory.read_word(offset)?;
    push_word(interp, value)
}

pub(crate) fn mstore(interp: &mut Interpreter, _: &mut dyn Host) -> VmResult<Control> {
    let [offset, value] = peek_operands(interp)?;
    let offset = memory_offset(&offset)?;
    let region = Some((offset, Word::LEN));
    charge_memory(interp, &[region], 0)?;
    drop_operands(interp, 2)?;
    interp.memory.write_word(offset, &value)?;
    Ok(Control::Continue)
}

pub(crate) fn mstore8(interp: &mut Interpreter, _: &mut dyn Host) -> VmResult<Control> {
    let [offset, value] = peek_operands(interp)?;
    let offset = memory_offset(&offset)?;
    let region = Some((offset, 1));
    charge_memory(interp, &[region], 0)?;
    drop_operands(interp, 2)?;
    interp.memory.write_byte(offset, value.byte(31))?;
    Ok(Control::Continue)
}

pub(crate) fn msize(interp: &mut Interpreter, _: &mut dyn Host) -> VmResult<Control> {
    let size = interp.memory.size() as u64;
    push_word(interp, Word::from_u64(size))
}

// Storage

pub(crate) fn sload(interp: &mut Interpreter, host: &mut dyn Host) -> VmResult<Control> {
    let key = interp.stack.pop()?;
    let value = host.get_storage(&interp.message.destination, &key);
    push_word(interp, value)
}

pub(crate) fn sstore(interp: &mut Interpreter, host: &mut dyn Host) -> VmResult<Control> {
    if interp.message.is_static() {
        return Err(VmError::StaticModeViolation);
    }
    let key = interp.stack.pop()?;
    let value = interp.stack.pop()?;
    host.set_storage(&interp.message.destination, key, value);
    Ok(Control::Continue)
}

// Calls

/// CALL: gas, target, value, input offset/length, output offset/length.
///
/// Pushes 1 if the nested execution succeeded and 0 otherwise, including
/// when the depth limit refuses the call.
pub(crate) fn call(interp: &mut Interpreter, host: &mut dyn Host) -> VmResult<Control> {
    let [gas, target, value, in_offset, in_len, out_offset, out_len] = peek_operands(interp)?;
    let input_region = region(&in_offset, &in_len)?;
    let output_region = region(&out_offset, &out_len)?;

    if interp.message.is_static() && !value.is_zero() {
        return Err(VmError::StaticModeViolation);
    }

    let regions = [input_region, output_region];
    charge_memory(interp, &regions, 0)?;
    drop_operands(interp, 7)?;
    expand_memory(interp, &regions)?;

    if interp.message.depth >= interp.config.max_call_depth {
        if interp.config.logs_boundaries() {
            tracing::debug!(depth = interp.message.depth, "call depth limit reached");
        }
        return push_word(interp, Word::ZERO);
    }

    let destination = target.to_address();
    let message = Message {
        kind: CallKind::Call,
        flags: interp.message.flags,
        depth: interp.message.depth + 1,
        gas: gas.saturating_to_i64(),
        destination,
        sender: interp.message.destination,
        value,
        input: Bytes::from(read_region(interp, input_region)?),
        code_address: destination,
    };

    let result = host.call(&message);

    if let Some((offset, len)) = output_region {
        let copied = len.min(result.output().len());
        interp.memory.write(offset, &result.output()[..copied])?;
    }
    push_word(interp, Word::from(result.is_success()))
}
