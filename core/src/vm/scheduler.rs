//! Runs every active, non-paused thread to its yield point in ascending
//! id order, then applies deferred transitions and any scheduled
//! game-part switch (spec §4.2 Tic execution order, §5 Concurrency model).
//! The teacher's `Component::tick` / `BusMasterComponent::tick_with_bus`
//! duality becomes "run one thread to its yield point" / "apply deferred
//! transitions" here.

use log::{trace, warn};

use crate::error::{BytecodeError, EngineError};
use crate::host::{Host, InputState};
use crate::vm::cursor::Cursor;
use crate::vm::machine::{apply_resource_action, Machine, MachineState};
use crate::vm::opcodes::{self, Flow};
use crate::vm::thread::{self, Execution, ThreadOp};

/// Per-thread per-tic instruction cap (spec §5 Cancellation & timeouts).
pub const INSTRUCTION_BUDGET: u32 = 10_000;

#[derive(Default)]
pub struct Scheduler;

impl Scheduler {
    pub fn new() -> Self {
        Self
    }

    pub fn run_tic(
        &mut self,
        machine: &mut Machine,
        host: &mut dyn Host,
        input: InputState,
    ) -> Result<(), EngineError> {
        machine.state.latch_input(input);

        for tid in 0..thread::COUNT {
            let active = matches!(machine.state.threads()[tid].execution, Execution::Active(_))
                && !machine.state.threads()[tid].paused;
            if !active {
                continue;
            }
            run_thread(machine, host, tid)?;
        }

        for tid in 0..thread::COUNT {
            machine.state.thread_mut(tid).apply_pending();
        }

        if let Some(action) = machine.state.take_pending_resource_action() {
            apply_resource_action(machine, host, action)?;
        }

        Ok(())
    }
}

/// Executes one thread's instructions from its current pc until it
/// yields, kills itself, or exhausts its instruction budget.
fn run_thread(machine: &mut Machine, host: &mut dyn Host, tid: usize) -> Result<(), EngineError> {
    let start_pc = match machine.state.threads()[tid].execution {
        Execution::Active(pc) => pc,
        Execution::Inactive => return Ok(()),
    };

    let mut cursor = Cursor::at(&machine.program, start_pc);
    let mut budget = 0u32;

    loop {
        budget += 1;
        if budget > INSTRUCTION_BUDGET {
            warn!("thread {tid} exceeded its instruction budget");
            return Err(BytecodeError::InstructionBudgetExceeded.into());
        }

        let opcode = cursor.read_u8().map_err(EngineError::from)?;
        trace!("thread {tid} pc={:#06x} opcode={opcode:#04x}", cursor.pc().wrapping_sub(1));

        // `cursor` borrows `machine.program`, `resources` borrows
        // `machine.resources`, and `dispatch` takes `&mut machine.state` —
        // three disjoint fields of the same `Machine`, so all three
        // borrows coexist here under NLL.
        let flow = dispatch(opcode, &mut cursor, &mut machine.state, &machine.resources, host, tid)?;
        match flow {
            Flow::Continue => continue,
            Flow::Yield => {
                machine.state.thread_mut(tid).execution = Execution::Active(cursor.pc());
                return Ok(());
            }
            Flow::Kill => {
                machine.state.thread_mut(tid).execution = Execution::Inactive;
                return Ok(());
            }
        }
    }
}

/// The opcode dispatch table (spec §4.2). `Call`/`Return`/`Jump` touch the
/// thread's call stack and pc directly; everything else goes through
/// `MachineState`'s `Peripherals` implementation. Takes `MachineState`
/// rather than the outer `Machine` so the caller can hold a live cursor
/// into `machine.program` at the same time.
fn dispatch(
    opcode: u8,
    cursor: &mut Cursor<'_>,
    state: &mut MachineState,
    resources: &crate::res::directory::LoadedResources,
    host: &mut dyn Host,
    tid: usize,
) -> Result<Flow, EngineError> {
    if opcode & 0x80 != 0 {
        return opcodes::op_draw_polygon_compact(opcode, cursor, state);
    }

    match opcode {
        0 => Ok(opcodes::op_set_register(cursor, state)?),
        1 => Ok(opcodes::op_copy_register(cursor, state)?),
        2 => Ok(opcodes::op_add_to_register(cursor, state)?),
        3 => Ok(opcodes::op_add_const_to_register(cursor, state)?),
        4 => {
            let target = opcodes::op_call(cursor)?;
            state.thread_mut(tid).push_return(cursor.pc())?;
            cursor.jump(target)?;
            Ok(Flow::Continue)
        }
        5 => {
            let target = state.thread_mut(tid).pop_return()?;
            cursor.jump(target)?;
            Ok(Flow::Continue)
        }
        6 => Ok(Flow::Yield),
        7 => {
            let target = opcodes::op_jump(cursor)?;
            cursor.jump(target)?;
            Ok(Flow::Continue)
        }
        8 => Ok(opcodes::op_activate_thread(cursor, state)?),
        9 => {
            if let Some(target) = opcodes::op_jump_if_not_zero(cursor, state)? {
                cursor.jump(target)?;
            }
            Ok(Flow::Continue)
        }
        10 => {
            if let Some(target) = opcodes::op_conditional_jump(cursor, state)? {
                cursor.jump(target)?;
            }
            Ok(Flow::Continue)
        }
        11 => Ok(opcodes::op_select_palette(cursor, state)?),
        12 => Ok(opcodes::op_control_threads(cursor, state)?),
        13 => Ok(opcodes::op_select_video_buffer(cursor, state)?),
        14 => Ok(opcodes::op_fill_video_buffer(cursor, state)?),
        15 => Ok(opcodes::op_copy_video_buffer(cursor, state)?),
        16 => opcodes::op_render_video_buffer(cursor, state, host),
        17 => Ok(opcodes::op_kill_thread()),
        18 => opcodes::op_draw_string(cursor, state),
        19 => Ok(opcodes::op_sub_from_register(cursor, state)?),
        20 => Ok(opcodes::op_and_register(cursor, state)?),
        21 => Ok(opcodes::op_or_register(cursor, state)?),
        22 => Ok(opcodes::op_shift_left(cursor, state)?),
        23 => Ok(opcodes::op_shift_right(cursor, state)?),
        24 => opcodes::op_play_sound(cursor, state, host, resources),
        25 => opcodes::op_control_resources(cursor, state),
        26 => opcodes::op_control_music(cursor, state, host, resources),
        other => Err(BytecodeError::InvalidOpcode(other).into()),
    }
}

/// Exposed for the `game`/`frontend` crates that need to issue a
/// `ControlThreads` equivalent outside normal bytecode dispatch (e.g. a
/// debug pause-all). Not used by the scheduler itself.
pub fn resume_all(machine: &mut Machine) -> Result<(), BytecodeError> {
    use crate::vm::ops_capability::Peripherals;
    machine
        .state
        .thread_control(0, (thread::COUNT - 1) as u8, ThreadOp::Resume)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::InputState;
    use crate::res::descriptor::Descriptor;
    use crate::error::ResourceError;

    struct NullHost;
    impl Host for NullHost {
        fn poll_input(&mut self) -> InputState {
            InputState::default()
        }
        fn present_surface(&mut self, _buffer_rgba: &[u8; 320 * 200 * 4], _delay_ms: u32) {}
        fn load_bank(&mut self, _bank_number: u8) -> Result<Vec<u8>, ResourceError> {
            Ok(Vec::new())
        }
        fn load_resource_descriptors(&mut self) -> Result<Vec<Descriptor>, ResourceError> {
            Ok(Vec::new())
        }
        fn play_sound(&mut self, _sample: &[u8], _channel: u8, _volume: u8, _frequency_hz: u32) {}
        fn stop_channel(&mut self, _channel: u8) {}
        fn play_music(&mut self, _sample: &[u8], _delay_ms: u32, _offset: u8) {}
        fn stop_music(&mut self) {}
        fn set_music_delay(&mut self, _delay_ms: u32) {}
    }

    #[test]
    fn a_program_that_only_yields_leaves_thread_zero_active_at_the_next_instruction() {
        let mut machine = Machine::new();
        machine.program = vec![6, 0]; // Yield, then an unreachable byte
        let mut host = NullHost;
        let mut scheduler = Scheduler::new();
        scheduler.run_tic(&mut machine, &mut host, InputState::default()).unwrap();
        assert_eq!(machine.state.threads()[0].execution, Execution::Active(1));
    }

    #[test]
    fn kill_thread_deactivates_thread_zero() {
        let mut machine = Machine::new();
        machine.program = vec![17]; // KillThread
        let mut host = NullHost;
        let mut scheduler = Scheduler::new();
        scheduler.run_tic(&mut machine, &mut host, InputState::default()).unwrap();
        assert_eq!(machine.state.threads()[0].execution, Execution::Inactive);
    }

    #[test]
    fn unknown_opcode_is_a_bytecode_error() {
        let mut machine = Machine::new();
        // 27 has no high bit set (so it isn't a compact polygon draw) and
        // isn't one of the 0..=26 dedicated opcodes.
        machine.program = vec![27];
        let mut host = NullHost;
        let mut scheduler = Scheduler::new();
        let err = scheduler.run_tic(&mut machine, &mut host, InputState::default()).unwrap_err();
        assert_eq!(err, EngineError::Bytecode(BytecodeError::InvalidOpcode(27)));
    }

    #[test]
    fn set_register_then_yield_runs_two_instructions_in_one_tic() {
        let mut machine = Machine::new();
        // SetRegister(reg=1, value=42), Yield
        machine.program = vec![0, 1, 0, 42, 6];
        let mut host = NullHost;
        let mut scheduler = Scheduler::new();
        scheduler.run_tic(&mut machine, &mut host, InputState::default()).unwrap();
        use crate::vm::ops_capability::Peripherals;
        assert_eq!(machine.state.reg(1), 42);
        assert_eq!(machine.state.threads()[0].execution, Execution::Active(5));
    }

    #[test]
    fn jump_if_not_zero_loops_until_a_budget_or_counter_runs_out() {
        let mut machine = Machine::new();
        // SetRegister(reg=2, 3), loop: JumpIfNotZero(reg=2, addr=4) at pc=4, then Yield at pc=9
        machine.program = vec![
            0, 2, 0, 3, // pc0..3: SetRegister r2 = 3
            9, 2, 0, 4, // pc4..7: JumpIfNotZero r2 -> pc4 (decrements each pass)
            6, // pc8: Yield
        ];
        let mut host = NullHost;
        let mut scheduler = Scheduler::new();
        scheduler.run_tic(&mut machine, &mut host, InputState::default()).unwrap();
        use crate::vm::ops_capability::Peripherals;
        // r2 decremented to 0 after 3 iterations, then falls through to Yield at pc8.
        assert_eq!(machine.state.reg(2), 0);
        assert_eq!(machine.state.threads()[0].execution, Execution::Active(9));
    }
}
