//! Headless tic-driving loop: resolves a starting game part, then calls
//! `Scheduler::run_tic` until the host signals exit or a tic budget runs
//! out. Mirrors the teacher's own machine test harnesses
//! (`machines/tests/joust_test.rs` and friends), which drive a fixed
//! number of `Component::tick` calls against a machine rather than a live
//! windowed event loop; `frontend` is where a real event loop lives.

use log::info;

use ootw_core::error::EngineError;
use ootw_core::host::Host;
use ootw_core::res::game_part::GamePart;
use ootw_core::vm::{Machine, Scheduler};

/// Builds a fresh `Machine`, loads the resource directory from `host`,
/// switches into `part`, then runs tics until the host reports
/// `InputState::exited` or `max_tics` tics have run (`None` runs until the
/// host asks to exit). `refresh_hz` (`timing::PAL_HZ` or `timing::NTSC_HZ`)
/// governs how `RenderVideoBuffer`'s delay operand is converted to
/// milliseconds.
pub fn run(
    host: &mut dyn Host,
    part: &GamePart,
    refresh_hz: u32,
    max_tics: Option<u64>,
) -> Result<u64, EngineError> {
    let mut machine = Machine::new();
    machine.state.set_refresh_rate(refresh_hz);
    machine.load_descriptors(host)?;
    machine.switch_game_part(host, part)?;

    let mut scheduler = Scheduler::new();
    let mut tic = 0u64;
    loop {
        if max_tics.is_some_and(|limit| tic >= limit) {
            info!("run: tic budget {tic} exhausted");
            return Ok(tic);
        }

        let input = host.poll_input();
        if input.exited {
            info!("run: host requested exit after {tic} tics");
            return Ok(tic);
        }

        scheduler.run_tic(&mut machine, host, input)?;
        tic += 1;
    }
}
