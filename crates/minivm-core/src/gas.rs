//! Gas metering and cost policies
//!
//! The meter is charged before an instruction runs, so an instruction that
//! cannot pay never touches the stack, memory or host. Which costs apply is a
//! policy: [`GasSchedule`] prices instructions, [`MemoryCost`] prices memory
//! growth.

use crate::error::{VmError, VmResult};
use crate::opcode::Instruction;
use serde::{Deserialize, Serialize};

/// Per-instruction cost tiers used by [`GasSchedule::Tiered`]
pub mod cost {
    /// Zero gas
    pub const ZERO: u64 = 0;
    /// Base gas
    pub const BASE: u64 = 2;
    /// Very low gas
    pub const VERYLOW: u64 = 3;
    /// Low gas
    pub const LOW: u64 = 5;
    /// Mid gas
    pub const MID: u64 = 8;
    /// High gas
    pub const HIGH: u64 = 10;
    /// JUMPDEST gas
    pub const JUMPDEST: u64 = 1;
    /// KECCAK256 base gas
    pub const KECCAK256: u64 = 30;
    /// KECCAK256 gas per hashed word
    pub const KECCAK256_WORD: u64 = 6;
    /// SLOAD gas
    pub const SLOAD: u64 = 100;
    /// SSTORE gas
    pub const SSTORE: u64 = 5000;
    /// CALL gas, excluding whatever is forwarded
    pub const CALL: u64 = 700;
    /// Linear memory gas per word
    pub const MEMORY: u64 = 3;
}

/// How instructions are priced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum GasSchedule {
    /// Every instruction costs the same, including undefined ones
    Uniform {
        /// Cost of one instruction
        per_instruction: u64,
    },
    /// Each instruction costs its table tier; undefined opcodes are free
    Tiered,
}

impl GasSchedule {
    /// Cost charged before executing `instruction` (`None` if undefined)
    pub fn instruction_cost(&self, instruction: Option<&Instruction>) -> u64 {
        match self {
            GasSchedule::Uniform { per_instruction } => *per_instruction,
            GasSchedule::Tiered => instruction.map_or(0, |i| i.base_gas),
        }
    }

    /// Extra cost for hashing `len` bytes
    pub fn keccak_cost(&self, len: usize) -> u64 {
        match self {
            GasSchedule::Uniform { .. } => 0,
            GasSchedule::Tiered => cost::KECCAK256_WORD.saturating_mul(words(len)),
        }
    }
}

impl Default for GasSchedule {
    fn default() -> Self {
        GasSchedule::Uniform { per_instruction: 1 }
    }
}

/// How memory growth is priced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum MemoryCost {
    /// Growth is not charged
    #[default]
    Free,
    /// A fixed price per newly touched 32-byte word
    Linear {
        /// Gas per word
        per_word: u64,
    },
    /// `3 * words + words^2 / 512`, charged on the difference
    Quadratic,
}

impl MemoryCost {
    /// Cost of growing memory from `current` to `new` bytes
    pub fn expansion_cost(&self, current: usize, new: usize) -> u64 {
        if new <= current {
            return 0;
        }
        let (old_words, new_words) = (words(current), words(new));
        match self {
            MemoryCost::Free => 0,
            MemoryCost::Linear { per_word } => per_word.saturating_mul(new_words - old_words),
            MemoryCost::Quadratic => {
                quadratic_word_cost(new_words).saturating_sub(quadratic_word_cost(old_words))
            }
        }
    }
}

fn words(bytes: usize) -> u64 {
    bytes.div_ceil(32) as u64
}

fn quadratic_word_cost(words: u64) -> u64 {
    cost::MEMORY
        .saturating_mul(words)
        .saturating_add(words.saturating_mul(words) / 512)
}

/// Remaining gas budget of one execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasMeter {
    limit: i64,
    remaining: i64,
}

impl GasMeter {
    /// Start with `limit` gas
    pub fn new(limit: i64) -> Self {
        Self {
            limit,
            remaining: limit,
        }
    }

    /// Gas still available
    pub fn remaining(&self) -> i64 {
        self.remaining
    }

    /// Gas spent so far
    pub fn spent(&self) -> i64 {
        self.limit - self.remaining
    }

    /// Deduct `amount`, or fail with OutOfGas leaving the meter unchanged
    pub fn charge(&mut self, amount: u64) -> VmResult<()> {
        let amount = i64::try_from(amount).map_err(|_| VmError::OutOfGas)?;
        if amount > self.remaining {
            return Err(VmError::OutOfGas);
        }
        self.remaining -= amount;
        Ok(())
    }
}
