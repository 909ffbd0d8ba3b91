//! Interpreter core for an "Another World"-style game engine: RLE
//! decompression, a cooperative bytecode VM, a software rasterizer, and
//! the resource directory that ties loaded game data to both. The host
//! (windowing, input, file I/O, audio mixing) is an external collaborator
//! through the `host::Host` trait; see the `game` and `frontend` crates
//! for concrete wiring.

pub mod audio;
pub mod error;
pub mod gfx;
pub mod host;
pub mod res;
pub mod rle;
pub mod timing;
pub mod vm;

/// Commonly used types, re-exported for crates consuming `ootw_core`.
pub mod prelude {
    pub use crate::error::EngineError;
    pub use crate::gfx::{Buffers, DrawTarget};
    pub use crate::host::{Host, InputState};
    pub use crate::res::game_part::{self, GamePart};
    pub use crate::vm::{Machine, Scheduler};
}
