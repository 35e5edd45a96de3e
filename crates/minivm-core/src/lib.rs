//! # minivm-core
//!
//! A small stack-based bytecode interpreter.
//!
//! This crate provides:
//! - [`Vm`]: the configured machine and its `execute` entry point
//! - [`Interpreter`]: the fetch/charge/dispatch loop for one message
//! - [`Host`]: the trait through which execution reaches storage, the
//!   transaction context and nested calls
//! - Stack, memory and gas metering primitives
//!
//! Instructions are described by [`INSTRUCTIONS`], a 256-entry table of
//! arity, immediates, cost, introducing [`Revision`] and handler.
//!
//! ```ignore
//! let vm = Vm::new();
//! let message = Message::call(sender, contract, 100_000);
//! let result = vm.execute(&mut host, Revision::LATEST, &message, &code);
//! assert!(result.is_success());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod context;
mod error;
mod gas;
mod host;
mod instructions;
mod interpreter;
mod memory;
mod opcode;
mod result;
mod revision;
mod stack;
mod vm;

pub use config::{VmConfig, DEFAULT_CALL_DEPTH_LIMIT};
pub use context::{CallKind, Message, MessageFlags, TxContext};
pub use error::{SetOptionError, VmError, VmResult};
pub use gas::{cost, GasMeter, GasSchedule, MemoryCost};
pub use host::{Host, StorageStatus};
pub use instructions::Control;
pub use interpreter::{Interpreter, State};
pub use memory::{Memory, DEFAULT_MEMORY_LIMIT};
pub use opcode::{Handler, Instruction, Opcode, INSTRUCTIONS};
pub use result::{ExecutionResult, StatusCode};
pub use revision::Revision;
pub use stack::{Stack, STACK_LIMIT};
pub use vm::{Capabilities, Vm};

pub use minivm_primitives::{Address, Word};
