//! Error kinds for each subsystem, and the top-level error the scheduler
//! propagates to the host.
//!
//! Mirrors the teacher's hand-rolled `RomLoadError`: plain enums with manual
//! `Display`/`Error` impls rather than a derive-macro crate, so `?` keeps
//! working across subsystem boundaries via `From`.

use std::fmt;

/// Errors from the RLE decompressor (spec §4.1, §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecompressionError {
    SourceExhausted,
    DestinationExhausted,
    CopyOutOfRange,
    ChecksumFailed,
    UncompressedSizeMismatch { expected: u32, actual: u32 },
}

impl fmt::Display for DecompressionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceExhausted => write!(f, "RLE source exhausted before decode completed"),
            Self::DestinationExhausted => write!(f, "RLE destination exhausted before decode completed"),
            Self::CopyOutOfRange => write!(f, "RLE back-reference offset out of range"),
            Self::ChecksumFailed => write!(f, "RLE checksum mismatch"),
            Self::UncompressedSizeMismatch { expected, actual } => write!(
                f,
                "RLE destination size {actual} does not match expected unpacked size {expected}"
            ),
        }
    }
}

impl std::error::Error for DecompressionError {}

/// Errors from bytecode execution (spec §4.2, §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BytecodeError {
    EndOfProgram,
    InvalidAddress(u16),
    InvalidThreadID(u8),
    InvalidThreadRange { start: u8, end: u8 },
    InvalidOpcode(u8),
    InvalidThreadOperation(u8),
    StackUnderflow,
    StackOverflow,
    InstructionBudgetExceeded,
}

impl fmt::Display for BytecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EndOfProgram => write!(f, "read past the end of the bytecode program"),
            Self::InvalidAddress(a) => write!(f, "jump/call to invalid address {a:#06x}"),
            Self::InvalidThreadID(t) => write!(f, "invalid thread id {t}"),
            Self::InvalidThreadRange { start, end } => {
                write!(f, "invalid thread range {start}..{end} (end < start)")
            }
            Self::InvalidOpcode(op) => write!(f, "unknown opcode {op:#04x}"),
            Self::InvalidThreadOperation(op) => write!(f, "invalid thread control operation {op}"),
            Self::StackUnderflow => write!(f, "call stack underflow on return"),
            Self::StackOverflow => write!(f, "call stack overflow (depth > 64)"),
            Self::InstructionBudgetExceeded => {
                write!(f, "thread exceeded its per-tic instruction budget")
            }
        }
    }
}

impl std::error::Error for BytecodeError {}

/// Errors from the rasterizer (spec §4.3, §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderError {
    InvalidCharacter(u8),
    PaletteNotSelected,
    InvalidColorID(u8),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCharacter(c) => write!(f, "no glyph for character byte {c:#04x}"),
            Self::PaletteNotSelected => write!(f, "present requested before any palette was selected"),
            Self::InvalidColorID(c) => write!(f, "invalid color id {c:#04x}"),
        }
    }
}

impl std::error::Error for RenderError {}

/// Errors from the resource directory (spec §4.4, §7).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    UnknownResource(u16),
    BankIO(String),
    InvalidDescriptor(String),
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownResource(id) => write!(f, "unknown resource id {id:#06x}"),
            Self::BankIO(msg) => write!(f, "bank I/O error: {msg}"),
            Self::InvalidDescriptor(msg) => write!(f, "invalid resource descriptor: {msg}"),
        }
    }
}

impl std::error::Error for ResourceError {}

/// Errors from the audio control surface (spec §4 table, §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioError {
    InvalidChannel(u8),
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidChannel(c) => write!(f, "invalid audio channel {c}"),
        }
    }
}

impl std::error::Error for AudioError {}

/// Top-level error the scheduler returns from `run_tic`, composing every
/// subsystem's error kind so the host sees one propagation path (spec §7).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    Decompression(DecompressionError),
    Bytecode(BytecodeError),
    Render(RenderError),
    Resource(ResourceError),
    Audio(AudioError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decompression(e) => write!(f, "{e}"),
            Self::Bytecode(e) => write!(f, "{e}"),
            Self::Render(e) => write!(f, "{e}"),
            Self::Resource(e) => write!(f, "{e}"),
            Self::Audio(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<DecompressionError> for EngineError {
    fn from(e: DecompressionError) -> Self {
        Self::Decompression(e)
    }
}

impl From<BytecodeError> for EngineError {
    fn from(e: BytecodeError) -> Self {
        Self::Bytecode(e)
    }
}

impl From<RenderError> for EngineError {
    fn from(e: RenderError) -> Self {
        Self::Render(e)
    }
}

impl From<ResourceError> for EngineError {
    fn from(e: ResourceError) -> Self {
        Self::Resource(e)
    }
}

impl From<AudioError> for EngineError {
    fn from(e: AudioError) -> Self {
        Self::Audio(e)
    }
}
