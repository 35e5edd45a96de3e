//! Opcodes and the instruction table
//!
//! Dispatch goes through [`INSTRUCTIONS`], one optional entry per byte. An
//! entry carries everything the dispatcher needs: stack arity, immediate
//! bytes, tiered gas, the revision that introduced it and the handler.
//! Adding an instruction means adding one entry in [`build_table`].

use crate::error::VmResult;
use crate::gas::cost;
use crate::host::Host;
use crate::instructions::{self as ins, Control};
use crate::interpreter::Interpreter;
use crate::revision::Revision;
use std::fmt;

/// Instruction implementation
pub type Handler = fn(&mut Interpreter, &mut dyn Host) -> VmResult<Control>;

/// Single-byte opcode
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Opcode(u8);

#[allow(missing_docs)]
impl Opcode {
    pub const STOP: Opcode = Opcode(0x00);
    pub const ADD: Opcode = Opcode(0x01);
    pub const MUL: Opcode = Opcode(0x02);
    pub const SUB: Opcode = Opcode(0x03);
    pub const DIV: Opcode = Opcode(0x04);
    pub const MOD: Opcode = Opcode(0x06);
    pub const LT: Opcode = Opcode(0x10);
    pub const GT: Opcode = Opcode(0x11);
    pub const EQ: Opcode = Opcode(0x14);
    pub const ISZERO: Opcode = Opcode(0x15);
    pub const AND: Opcode = Opcode(0x16);
    pub const OR: Opcode = Opcode(0x17);
    pub const XOR: Opcode = Opcode(0x18);
    pub const NOT: Opcode = Opcode(0x19);
    pub const KECCAK256: Opcode = Opcode(0x20);
    pub const ADDRESS: Opcode = Opcode(0x30);
    pub const ORIGIN: Opcode = Opcode(0x32);
    pub const CALLER: Opcode = Opcode(0x33);
    pub const CALLVALUE: Opcode = Opcode(0x34);
    pub const CALLDATALOAD: Opcode = Opcode(0x35);
    pub const CALLDATASIZE: Opcode = Opcode(0x36);
    pub const TIMESTAMP: Opcode = Opcode(0x42);
    pub const NUMBER: Opcode = Opcode(0x43);
    pub const CHAINID: Opcode = Opcode(0x46);
    pub const POP: Opcode = Opcode(0x50);
    pub const MLOAD: Opcode = Opcode(0x51);
    pub const MSTORE: Opcode = Opcode(0x52);
    pub const MSTORE8: Opcode = Opcode(0x53);
    pub const SLOAD: Opcode = Opcode(0x54);
    pub const SSTORE: Opcode = Opcode(0x55);
    pub const JUMP: Opcode = Opcode(0x56);
    pub const JUMPI: Opcode = Opcode(0x57);
    pub const PC: Opcode = Opcode(0x58);
    pub const MSIZE: Opcode = Opcode(0x59);
    pub const GAS: Opcode = Opcode(0x5A);
    pub const JUMPDEST: Opcode = Opcode(0x5B);
    pub const PUSH0: Opcode = Opcode(0x5F);
    pub const PUSH1: Opcode = Opcode(0x60);
    pub const PUSH32: Opcode = Opcode(0x7F);
    pub const DUP1: Opcode = Opcode(0x80);
    pub const DUP16: Opcode = Opcode(0x8F);
    pub const SWAP1: Opcode = Opcode(0x90);
    pub const SWAP16: Opcode = Opcode(0x9F);
    pub const CALL: Opcode = Opcode(0xF1);
    pub const RETURN: Opcode = Opcode(0xF3);
    pub const REVERT: Opcode = Opcode(0xFD);
}

impl Opcode {
    /// Wrap a raw byte
    pub const fn new(byte: u8) -> Self {
        Opcode(byte)
    }

    /// Raw byte
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Table index
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// Table entry, if any revision defines this opcode
    pub fn info(self) -> Option<&'static Instruction> {
        INSTRUCTIONS[self.as_usize()].as_ref()
    }

    /// Table entry if defined under `revision`
    pub fn info_at(self, revision: Revision) -> Option<&'static Instruction> {
        self.info().filter(|i| revision.is_enabled(i.since))
    }

    /// Mnemonic, or `UNDEFINED`
    pub fn name(self) -> &'static str {
        self.info().map_or("UNDEFINED", |i| i.name)
    }

    /// Immediate bytes following the opcode in code
    pub fn immediate_size(self) -> usize {
        self.info().map_or(0, |i| i.immediate as usize)
    }
}

impl fmt::Debug for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0x{:02x})", self.name(), self.0)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<u8> for Opcode {
    fn from(byte: u8) -> Self {
        Opcode(byte)
    }
}

/// Instruction table entry
#[derive(Clone, Copy)]
pub struct Instruction {
    /// Mnemonic
    pub name: &'static str,
    /// Opcode byte
    pub opcode: Opcode,
    /// Stack items consumed
    pub inputs: u8,
    /// Stack items produced
    pub outputs: u8,
    /// Immediate operand bytes in code
    pub immediate: u8,
    /// Cost under [`crate::GasSchedule::Tiered`]
    pub base_gas: u64,
    /// Revision that introduced the instruction
    pub since: Revision,
    /// Implementation
    pub handler: Handler,
}

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instruction")
            .field("name", &self.name)
            .field("opcode", &self.opcode.0)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .field("immediate", &self.immediate)
            .field("base_gas", &self.base_gas)
            .field("since", &self.since)
            .finish()
    }
}

/// The instruction table, indexed by opcode byte
pub static INSTRUCTIONS: [Option<Instruction>; 256] = build_table();

const PUSH_NAMES: [&str; 32] = [
    "PUSH1", "PUSH2", "PUSH3", "PUSH4", "PUSH5", "PUSH6", "PUSH7", "PUSH8", "PUSH9", "PUSH10",
    "PUSH11", "PUSH12", "PUSH13", "PUSH14", "PUSH15", "PUSH16", "PUSH17", "PUSH18", "PUSH19",
    "PUSH20", "PUSH21", "PUSH22", "PUSH23", "PUSH24", "PUSH25", "PUSH26", "PUSH27", "PUSH28",
    "PUSH29", "PUSH30", "PUSH31", "PUSH32",
];

const DUP_NAMES: [&str; 16] = [
    "DUP1", "DUP2", "DUP3", "DUP4", "DUP5", "DUP6", "DUP7", "DUP8", "DUP9", "DUP10", "DUP11",
    "DUP12", "DUP13", "DUP14", "DUP15", "DUP16",
];

const SWAP_NAMES: [&str; 16] = [
    "SWAP1", "SWAP2", "SWAP3", "SWAP4", "SWAP5", "SWAP6", "SWAP7", "SWAP8", "SWAP9", "SWAP10",
    "SWAP11", "SWAP12", "SWAP13", "SWAP14", "SWAP15", "SWAP16",
];

const fn entry(
    name: &'static str,
    byte: u8,
    inputs: u8,
    outputs: u8,
    base_gas: u64,
    since: Revision,
    handler: Handler,
) -> Option<Instruction> {
    Some(Instruction {
        name,
        opcode: Opcode(byte),
        inputs,
        outputs,
        immediate: 0,
        base_gas,
        since,
        handler,
    })
}

const fn build_table() -> [Option<Instruction>; 256] {
    use Revision::{Byzantium, Frontier, Istanbul, Shanghai};

    let mut t: [Option<Instruction>; 256] = [None; 256];

    t[0x00] = entry("STOP", 0x00, 0, 0, cost::ZERO, Frontier, ins::stop);
    t[0x01] = entry("ADD", 0x01, 2, 1, cost::VERYLOW, Frontier, ins::add);
    t[0x02] = entry("MUL", 0x02, 2, 1, cost::LOW, Frontier, ins::mul);
    t[0x03] = entry("SUB", 0x03, 2, 1, cost::VERYLOW, Frontier, ins::sub);
    t[0x04] = entry("DIV", 0x04, 2, 1, cost::LOW, Frontier, ins::div);
    t[0x06] = entry("MOD", 0x06, 2, 1, cost::LOW, Frontier, ins::rem);

    t[0x10] = entry("LT", 0x10, 2, 1, cost::VERYLOW, Frontier, ins::lt);
    t[0x11] = entry("GT", 0x11, 2, 1, cost::VERYLOW, Frontier, ins::gt);
    t[0x14] = entry("EQ", 0x14, 2, 1, cost::VERYLOW, Frontier, ins::eq);
    t[0x15] = entry("ISZERO", 0x15, 1, 1, cost::VERYLOW, Frontier, ins::iszero);
    t[0x16] = entry("AND", 0x16, 2, 1, cost::VERYLOW, Frontier, ins::and);
    t[0x17] = entry("OR", 0x17, 2, 1, cost::VERYLOW, Frontier, ins::or);
    t[0x18] = entry("XOR", 0x18, 2, 1, cost::VERYLOW, Frontier, ins::xor);
    t[0x19] = entry("NOT", 0x19, 1, 1, cost::VERYLOW, Frontier, ins::not);

    t[0x20] = entry("KECCAK256", 0x20, 2, 1, cost::KECCAK256, Frontier, ins::keccak256);

    t[0x30] = entry("ADDRESS", 0x30, 0, 1, cost::BASE, Frontier, ins::address);
    t[0x32] = entry("ORIGIN", 0x32, 0, 1, cost::BASE, Frontier, ins::origin);
    t[0x33] = entry("CALLER", 0x33, 0, 1, cost::BASE, Frontier, ins::caller);
    t[0x34] = entry("CALLVALUE", 0x34, 0, 1, cost::BASE, Frontier, ins::callvalue);
    t[0x35] = entry("CALLDATALOAD", 0x35, 1, 1, cost::VERYLOW, Frontier, ins::calldataload);
    t[0x36] = entry("CALLDATASIZE", 0x36, 0, 1, cost::BASE, Frontier, ins::calldatasize);

    t[0x42] = entry("TIMESTAMP", 0x42, 0, 1, cost::BASE, Frontier, ins::timestamp);
    t[0x43] = entry("NUMBER", 0x43, 0, 1, cost::BASE, Frontier, ins::number);
    t[0x46] = entry("CHAINID", 0x46, 0, 1, cost::BASE, Istanbul, ins::chainid);

    t[0x50] = entry("POP", 0x50, 1, 0, cost::BASE, Frontier, ins::pop);
    t[0x51] = entry("MLOAD", 0x51, 1, 1, cost::VERYLOW, Frontier, ins::mload);
    t[0x52] = entry("MSTORE", 0x52, 2, 0, cost::VERYLOW, Frontier, ins::mstore);
    t[0x53] = entry("MSTORE8", 0x53, 2, 0, cost::VERYLOW, Frontier, ins::mstore8);
    t[0x54] = entry("SLOAD", 0x54, 1, 1, cost::SLOAD, Frontier, ins::sload);
    t[0x55] = entry("SSTORE", 0x55, 2, 0, cost::SSTORE, Frontier, ins::sstore);
    t[0x56] = entry("JUMP", 0x56, 1, 0, cost::MID, Frontier, ins::jump);
    t[0x57] = entry("JUMPI", 0x57, 2, 0, cost::HIGH, Frontier, ins::jumpi);
    t[0x58] = entry("PC", 0x58, 0, 1, cost::BASE, Frontier, ins::pc);
    t[0x59] = entry("MSIZE", 0x59, 0, 1, cost::BASE, Frontier, ins::msize);
    t[0x5A] = entry("GAS", 0x5A, 0, 1, cost::BASE, Frontier, ins::gas);
    t[0x5B] = entry("JUMPDEST", 0x5B, 0, 0, cost::JUMPDEST, Frontier, ins::jumpdest);
    t[0x5F] = entry("PUSH0", 0x5F, 0, 1, cost::BASE, Shanghai, ins::push0);

    let mut n = 0;
    while n < 32 {
        let byte = Opcode::PUSH1.0 + n as u8;
        t[byte as usize] = Some(Instruction {
            name: PUSH_NAMES[n],
            opcode: Opcode(byte),
            inputs: 0,
            outputs: 1,
            immediate: n as u8 + 1,
            base_gas: cost::VERYLOW,
            since: Frontier,
            handler: ins::push,
        });
        n += 1;
    }

    let mut n = 0;
    while n < 16 {
        let depth = n as u8 + 1;
        let dup = Opcode::DUP1.0 + n as u8;
        t[dup as usize] =
            entry(DUP_NAMES[n], dup, depth, depth + 1, cost::VERYLOW, Frontier, ins::dup);
        let swap = Opcode::SWAP1.0 + n as u8;
        t[swap as usize] =
            entry(SWAP_NAMES[n], swap, depth + 1, depth + 1, cost::VERYLOW, Frontier, ins::swap);
        n += 1;
    }

    t[0xF1] = entry("CALL", 0xF1, 7, 1, cost::CALL, Frontier, ins::call);
    t[0xF3] = entry("RETURN", 0xF3, 2, 0, cost::ZERO, Frontier, ins::ret);
    t[0xFD] = entry("REVERT", 0xFD, 2, 0, cost::ZERO, Byzantium, ins::revert);

    t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_match_their_index() {
        for (index, slot) in INSTRUCTIONS.iter().enumerate() {
            if let Some(instruction) = slot {
                assert_eq!(instruction.opcode.as_usize(), index, "{}", instruction.name);
            }
        }
    }

    #[test]
    fn test_core_entries() {
        let add = Opcode::ADD.info().unwrap();
        assert_eq!((add.name, add.inputs, add.outputs, add.immediate), ("ADD", 2, 1, 0));

        let call = Opcode::CALL.info().unwrap();
        assert_eq!((call.inputs, call.outputs), (7, 1));

        let push1 = Opcode::PUSH1.info().unwrap();
        assert_eq!(push1.immediate, 1);
        assert_eq!(Opcode::PUSH32.immediate_size(), 32);
        assert_eq!(Opcode::PUSH32.name(), "PUSH32");
    }

    #[test]
    fn test_dup_swap_arity() {
        let dup16 = Opcode::DUP16.info().unwrap();
        assert_eq!((dup16.name, dup16.inputs, dup16.outputs), ("DUP16", 16, 17));
        let swap16 = Opcode::SWAP16.info().unwrap();
        assert_eq!((swap16.name, swap16.inputs, swap16.outputs), ("SWAP16", 17, 17));
        let dup1 = Opcode::DUP1.info().unwrap();
        assert_eq!((dup1.inputs, dup1.outputs), (1, 2));
    }

    #[test]
    fn test_revision_gating() {
        assert!(Opcode::REVERT.info_at(Revision::Frontier).is_none());
        assert!(Opcode::REVERT.info_at(Revision::SpuriousDragon).is_none());
        assert!(Opcode::REVERT.info_at(Revision::Byzantium).is_some());
        assert!(Opcode::PUSH0.info_at(Revision::London).is_none());
        assert!(Opcode::PUSH0.info_at(Revision::Shanghai).is_some());
        assert!(Opcode::STOP.info_at(Revision::Frontier).is_some());
    }

    #[test]
    fn test_undefined_opcodes() {
        for byte in [0x05u8, 0x0c, 0x21, 0xef, 0xfe, 0xff] {
            assert!(Opcode::new(byte).info().is_none());
            assert_eq!(Opcode::new(byte).name(), "UNDEFINED");
        }
    }

    #[test]
    fn test_debug_format() {
        assert_eq!(format!("{:?}", Opcode::MSTORE), "MSTORE(0x52)");
        assert_eq!(Opcode::from(0x01).to_string(), "ADD");
    }
}
