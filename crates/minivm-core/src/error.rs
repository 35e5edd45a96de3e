//! Interpreter error types

use crate::result::StatusCode;
use thiserror::Error;

/// Execution faults raised by a single instruction
///
/// These never escape [`crate::Interpreter::run`]; they end the dispatch loop
/// and surface as the [`StatusCode`] of the result.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VmError {
    /// Gas budget exhausted
    #[error("out of gas")]
    OutOfGas,

    /// Opcode missing from the table or not yet enabled by the revision
    #[error("undefined instruction: 0x{0:02x}")]
    UndefinedInstruction(u8),

    /// Pop or peek below the bottom of the stack
    #[error("stack underflow")]
    StackUnderflow,

    /// Push beyond the stack limit
    #[error("stack overflow (max {})", crate::stack::STACK_LIMIT)]
    StackOverflow,

    /// Memory offset/length overflowed or exceeded the configured limit
    #[error("memory access out of bounds")]
    MemoryBoundsExceeded,

    /// Jump target is not a JUMPDEST
    #[error("invalid jump destination: {0}")]
    BadJumpDestination(usize),

    /// State modification attempted inside a static call
    #[error("state modification in static context")]
    StaticModeViolation,
}

/// Rejected runtime option
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SetOptionError {
    /// No option with this name
    #[error("unknown option: {0}")]
    InvalidName(String),

    /// Value missing, unparsable or out of range
    #[error("invalid value for option {name}: {value:?}")]
    InvalidValue {
        /// Option name
        name: String,
        /// Rejected value, if one was given
        value: Option<String>,
    },
}

/// Result type for instruction handlers
pub type VmResult<T> = Result<T, VmError>;

impl VmError {
    /// Status code reported to the caller for this fault
    pub fn status(&self) -> StatusCode {
        match self {
            VmError::OutOfGas => StatusCode::OutOfGas,
            VmError::UndefinedInstruction(_) => StatusCode::UndefinedInstruction,
            VmError::StackUnderflow => StatusCode::StackUnderflow,
            VmError::StackOverflow => StatusCode::StackOverflow,
            VmError::MemoryBoundsExceeded => StatusCode::MemoryBoundsExceeded,
            VmError::BadJumpDestination(_) => StatusCode::BadJumpDestination,
            VmError::StaticModeViolation => StatusCode::StaticModeViolation,
        }
    }
}

impl From<VmError> for StatusCode {
    fn from(err: VmError) -> Self {
        err.status()
    }
}
