//! Bytecode interpreter
//!
//! One [`Interpreter`] executes one message. Each step fetches the opcode at
//! `pc`, charges its gas, looks it up in the instruction table for the active
//! revision, checks stack arity and runs the handler. The first fault ends
//! execution with the matching status code.

use crate::config::VmConfig;
use crate::context::Message;
use crate::error::{VmError, VmResult};
use crate::gas::GasMeter;
use crate::host::Host;
use crate::instructions::Control;
use crate::memory::Memory;
use crate::opcode::Opcode;
use crate::result::{ExecutionResult, StatusCode};
use crate::revision::Revision;
use crate::stack::Stack;
use bytes::Bytes;
use minivm_primitives::Word;
use tracing::{debug, trace};

/// Execution state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    /// More instructions to run
    Running,
    /// Finished with a final result
    Halted(ExecutionResult),
}

/// Interpreter for a single message
#[derive(Debug)]
pub struct Interpreter {
    pub(crate) config: VmConfig,
    pub(crate) revision: Revision,
    pub(crate) message: Message,
    pub(crate) code: Bytes,
    jump_dests: Vec<bool>,
    pub(crate) pc: usize,
    pub(crate) current: Opcode,
    pub(crate) stack: Stack,
    pub(crate) memory: Memory,
    pub(crate) gas: GasMeter,
    state: State,
}

impl Interpreter {
    /// Prepare to execute `code` for `message`
    pub fn new(config: VmConfig, revision: Revision, message: &Message, code: &[u8]) -> Self {
        let memory = Memory::with_limit(config.max_memory_size);
        Self {
            jump_dests: analyze_jump_dests(code),
            code: Bytes::copy_from_slice(code),
            revision,
            message: message.clone(),
            pc: 0,
            current: Opcode::STOP,
            stack: Stack::new(),
            memory,
            gas: GasMeter::new(message.gas),
            state: State::Running,
            config,
        }
    }

    /// Execute until halted
    pub fn run(mut self, host: &mut dyn Host) -> ExecutionResult {
        let logs = self.config.logs_boundaries();
        if logs {
            debug!(
                revision = %self.revision,
                depth = self.message.depth,
                gas = self.message.gas,
                code_len = self.code.len(),
                "execution started"
            );
        }

        loop {
            if let State::Halted(result) = self.step(host) {
                if logs {
                    debug!(
                        status = %result.status(),
                        gas_left = result.gas_left(),
                        output_len = result.output().len(),
                        "execution finished"
                    );
                }
                return result.clone();
            }
        }
    }

    /// Execute one instruction; no-op once halted
    pub fn step(&mut self, host: &mut dyn Host) -> &State {
        if self.state == State::Running {
            if let Err(err) = self.dispatch(host) {
                if self.config.logs_boundaries() {
                    debug!(pc = self.pc, opcode = ?self.current, error = %err, "execution failed");
                }
                self.halt(err.status(), Bytes::new());
            }
        }
        &self.state
    }

    fn dispatch(&mut self, host: &mut dyn Host) -> VmResult<()> {
        // Running off the end of code is an implicit STOP
        let Some(&byte) = self.code.get(self.pc) else {
            self.halt(StatusCode::Success, Bytes::new());
            return Ok(());
        };
        self.current = Opcode::new(byte);

        let instruction = self.current.info_at(self.revision);
        let cost = self.config.gas_schedule.instruction_cost(instruction);
        self.gas.charge(cost)?;
        let instruction = instruction.ok_or(VmError::UndefinedInstruction(byte))?;

        if self.config.traces_instructions() {
            trace!(
                pc = self.pc,
                op = instruction.name,
                gas = self.gas.remaining(),
                stack = self.stack.len(),
                "step"
            );
        }

        self.stack
            .require(instruction.inputs as usize, instruction.outputs as usize)?;

        match (instruction.handler)(self, host)? {
            Control::Continue => self.pc += 1 + instruction.immediate as usize,
            Control::Jump(dest) => self.pc = dest,
            Control::Halt { status, output } => self.halt(status, output),
        }
        Ok(())
    }

    fn halt(&mut self, status: StatusCode, output: Bytes) {
        let result = ExecutionResult::new(status, self.gas.remaining(), output);
        self.state = State::Halted(result);
    }

    /// Validate a jump target operand
    pub(crate) fn jump_target(&self, dest: &Word) -> VmResult<usize> {
        let dest = dest.to_usize().unwrap_or(usize::MAX);
        if self.jump_dests.get(dest).copied().unwrap_or(false) {
            Ok(dest)
        } else {
            Err(VmError::BadJumpDestination(dest))
        }
    }

    /// Program counter
    pub fn pc(&self) -> usize {
        self.pc
    }

    /// Operand stack
    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    /// Execution memory
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Gas still available
    pub fn gas_left(&self) -> i64 {
        self.gas.remaining()
    }

    /// Current state
    pub fn state(&self) -> &State {
        &self.state
    }
}

/// Mark JUMPDEST positions that are opcodes rather than PUSH immediates
fn analyze_jump_dests(code: &[u8]) -> Vec<bool> {
    let mut dests = vec![false; code.len()];
    let mut i = 0;
    while i < code.len() {
        let op = Opcode::new(code[i]);
        if op == Opcode::JUMPDEST {
            dests[i] = true;
        }
        if (Opcode::PUSH1..=Opcode::PUSH32).contains(&op) {
            i += op.immediate_size();
        }
        i += 1;
    }
    dests
}
