//! Execution outcome

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Terminal status of an execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCode {
    /// Halted normally (STOP, RETURN or end of code)
    Success,
    /// Halted by REVERT; output and remaining gas are still meaningful
    Revert,
    /// Generic failure, mostly reported by hosts for nested calls
    Failure,
    /// Gas budget exhausted
    OutOfGas,
    /// Undefined or not-yet-enabled opcode
    UndefinedInstruction,
    /// Jump to something other than a JUMPDEST
    BadJumpDestination,
    /// Stack limit exceeded
    StackOverflow,
    /// Not enough stack items
    StackUnderflow,
    /// Memory offset/length out of range
    MemoryBoundsExceeded,
    /// State modification in a static call
    StaticModeViolation,
    /// Nested call refused because the depth limit was reached
    CallDepthExceeded,
    /// Host or interpreter bug
    InternalError,
}

impl StatusCode {
    /// True only for [`StatusCode::Success`]
    pub fn is_success(self) -> bool {
        self == StatusCode::Success
    }

    /// Whether the caller gets the unused gas back
    pub fn keeps_gas(self) -> bool {
        matches!(self, StatusCode::Success | StatusCode::Revert)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatusCode::Success => "success",
            StatusCode::Revert => "revert",
            StatusCode::Failure => "failure",
            StatusCode::OutOfGas => "out of gas",
            StatusCode::UndefinedInstruction => "undefined instruction",
            StatusCode::BadJumpDestination => "bad jump destination",
            StatusCode::StackOverflow => "stack overflow",
            StatusCode::StackUnderflow => "stack underflow",
            StatusCode::MemoryBoundsExceeded => "memory bounds exceeded",
            StatusCode::StaticModeViolation => "static mode violation",
            StatusCode::CallDepthExceeded => "call depth exceeded",
            StatusCode::InternalError => "internal error",
        };
        f.write_str(name)
    }
}

/// Outcome of one execution
///
/// The output buffer has a single owner. It is released when the result is
/// dropped, or moved out once through [`ExecutionResult::into_output`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    status: StatusCode,
    gas_left: i64,
    output: Bytes,
}

impl ExecutionResult {
    /// Build a result. Statuses other than Success/Revert forfeit all gas.
    pub fn new(status: StatusCode, gas_left: i64, output: Bytes) -> Self {
        let gas_left = if status.keeps_gas() { gas_left.max(0) } else { 0 };
        Self {
            status,
            gas_left,
            output,
        }
    }

    /// Successful result
    pub fn success(gas_left: i64, output: impl Into<Bytes>) -> Self {
        Self::new(StatusCode::Success, gas_left, output.into())
    }

    /// Reverted result
    pub fn revert(gas_left: i64, output: impl Into<Bytes>) -> Self {
        Self::new(StatusCode::Revert, gas_left, output.into())
    }

    /// Failed result with no output and no gas left
    pub fn failure(status: StatusCode) -> Self {
        Self::new(status, 0, Bytes::new())
    }

    /// Status code
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Remaining gas, never negative
    pub fn gas_left(&self) -> i64 {
        self.gas_left
    }

    /// Borrow the output bytes
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Take ownership of the output buffer, consuming the result
    pub fn into_output(self) -> Bytes {
        self.output
    }

    /// True when the status is Success
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}
