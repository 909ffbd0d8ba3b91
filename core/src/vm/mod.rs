//! Bytecode virtual machine: cursor, registers, threads, opcode handlers,
//! the scheduler, the machine these run against, and the capability trait
//! that decouples the two for testing (spec §4.2).

pub mod cursor;
pub mod machine;
pub mod opcodes;
pub mod ops_capability;
pub mod registers;
pub mod scheduler;
pub mod thread;

pub use cursor::Cursor;
pub use machine::{Machine, MachineState};
pub use ops_capability::{Peripherals, PolygonSource};
pub use scheduler::Scheduler;
pub use thread::{Execution, Thread, ThreadOp};
