//! Per-thread scheduling state: program counter, call stack, and the
//! deferred pending-transition slots (spec §3 Thread, §4.2, §9 Deferred
//! thread transitions).

use crate::error::BytecodeError;

pub const COUNT: usize = 64;
pub const MAX_CALL_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Execution {
    Active(u16),
    Inactive,
}

/// One of the 64 cooperative VM threads.
#[derive(Clone)]
pub struct Thread {
    call_stack: Vec<u16>,
    pub execution: Execution,
    pub paused: bool,
    pub pending_execution: Option<Execution>,
    pub pending_paused: Option<bool>,
}

impl Thread {
    /// Thread 0 starts active at pc=0; every other thread starts inactive
    /// (spec §3 Thread).
    pub fn initial(id: usize) -> Self {
        Self {
            call_stack: Vec::new(),
            execution: if id == 0 {
                Execution::Active(0)
            } else {
                Execution::Inactive
            },
            paused: false,
            pending_execution: None,
            pending_paused: None,
        }
    }

    pub fn push_return(&mut self, pc: u16) -> Result<(), BytecodeError> {
        if self.call_stack.len() >= MAX_CALL_DEPTH {
            return Err(BytecodeError::StackOverflow);
        }
        self.call_stack.push(pc);
        Ok(())
    }

    pub fn pop_return(&mut self) -> Result<u16, BytecodeError> {
        self.call_stack.pop().ok_or(BytecodeError::StackUnderflow)
    }

    /// Resets to the game-part-switch state: empty call stack, not paused,
    /// no pending transitions, and the given execution state (active at
    /// pc=0 for thread 0, inactive for every other thread).
    pub fn reset(&mut self, execution: Execution) {
        self.call_stack.clear();
        self.execution = execution;
        self.paused = false;
        self.pending_execution = None;
        self.pending_paused = None;
    }

    /// Applies and clears this thread's pending transitions (spec §4.2
    /// end-of-tic step, §9).
    pub fn apply_pending(&mut self) {
        if let Some(execution) = self.pending_execution.take() {
            self.execution = execution;
        }
        if let Some(paused) = self.pending_paused.take() {
            self.paused = paused;
        }
    }
}

/// The thread control operation issued by opcode 12 (spec §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadOp {
    Resume,
    Pause,
    Deactivate,
}

impl ThreadOp {
    pub fn from_byte(op: u8) -> Result<Self, BytecodeError> {
        match op {
            0 => Ok(ThreadOp::Resume),
            1 => Ok(ThreadOp::Pause),
            2 => Ok(ThreadOp::Deactivate),
            other => Err(BytecodeError::InvalidThreadOperation(other)),
        }
    }
}
