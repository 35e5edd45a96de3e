//! Execution-time configuration

use crate::gas::{GasSchedule, MemoryCost};
use crate::memory::DEFAULT_MEMORY_LIMIT;
use serde::{Deserialize, Deserializer, Serialize};

/// Default nested-call depth limit
pub const DEFAULT_CALL_DEPTH_LIMIT: i32 = 1024;

/// Configuration an execution runs with
///
/// Copied into every interpreter when execution starts and never changed
/// while it runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VmConfig {
    /// Log verbosity in [-1, 9]: above 0 logs execution boundaries,
    /// 2 and up traces every instruction
    #[serde(deserialize_with = "verbosity_in_range")]
    pub verbosity: i8,
    /// Instruction pricing
    pub gas_schedule: GasSchedule,
    /// Memory growth pricing
    pub memory_cost: MemoryCost,
    /// Largest addressable memory size in bytes
    pub max_memory_size: usize,
    /// Depth at which nested calls are refused
    pub max_call_depth: i32,
}

impl VmConfig {
    /// Lowest accepted verbosity
    pub const MIN_VERBOSITY: i8 = -1;
    /// Highest accepted verbosity
    pub const MAX_VERBOSITY: i8 = 9;

    /// `verbosity` clamped into [`Self::MIN_VERBOSITY`, `Self::MAX_VERBOSITY`]
    pub fn clamped(mut self) -> Self {
        self.verbosity = self.verbosity.clamp(Self::MIN_VERBOSITY, Self::MAX_VERBOSITY);
        self
    }

    /// Logs execution start and end
    pub fn logs_boundaries(&self) -> bool {
        self.verbosity > 0
    }

    /// Logs every instruction
    pub fn traces_instructions(&self) -> bool {
        self.verbosity >= 2
    }
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            verbosity: 0,
            gas_schedule: GasSchedule::default(),
            memory_cost: MemoryCost::default(),
            max_memory_size: DEFAULT_MEMORY_LIMIT,
            max_call_depth: DEFAULT_CALL_DEPTH_LIMIT,
        }
    }
}

fn verbosity_in_range<'de, D>(deserializer: D) -> Result<i8, D::Error>
where
    D: Deserializer<'de>,
{
    let verbosity = i8::deserialize(deserializer)?;
    if (VmConfig::MIN_VERBOSITY..=VmConfig::MAX_VERBOSITY).contains(&verbosity) {
        Ok(verbosity)
    } else {
        Err(serde::de::Error::custom(format!(
            "verbosity {} outside [{}, {}]",
            verbosity,
            VmConfig::MIN_VERBOSITY,
            VmConfig::MAX_VERBOSITY
        )))
    }
}
