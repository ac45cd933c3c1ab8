//! Error types for the core interpreter and its embedder binary.

use thiserror::Error;

/// Runtime conditions that end the current invocation without poisoning the VM.
///
/// Every variant here is a trap in the sense of §7: execution of the current
/// top-level call stops, but memory and tables remain valid for the next call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrapKind {
    #[error("call to an import with no bound host function")]
    UnresolvedImport,

    #[error("integer divide by zero")]
    DivideByZero,

    #[error("signed overflow: i32::MIN / -1")]
    SignedOverflow,

    #[error("memory access out of bounds")]
    MemoryOutOfBounds,

    #[error("local variable index out of bounds")]
    LocalIndexOutOfBounds,

    #[error("branch depth exceeds the current function's block stack")]
    BranchDepth,

    #[error("unknown opcode: 0x{0:02x}")]
    UnknownOpcode(u8),

    #[error("program counter past end of function body")]
    PcOutOfBounds,

    #[error("operand stack underflow")]
    OperandStackUnderflow,

    #[error("operand stack overflow")]
    OperandStackOverflow,

    #[error("call stack overflow")]
    CallStackOverflow,

    #[error("block stack overflow")]
    BlockStackOverflow,
}

/// The error type for this crate's public API.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Malformed module bytes, discovered while walking sections.
    #[error("decode error: {0}")]
    Decode(String),

    /// A runtime trap (see [`TrapKind`]).
    #[error(transparent)]
    Trap(#[from] TrapKind),

    /// I/O failure loading a module from disk.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Embedder/CLI-level error (bad arguments, missing export, ...).
    #[error("{0}")]
    Cli(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    pub fn cli(message: impl Into<String>) -> Self {
        Self::Cli(message.into())
    }
}

impl From<&str> for CoreError {
    fn from(message: &str) -> Self {
        CoreError::Cli(message.to_string())
    }
}

impl From<String> for CoreError {
    fn from(message: String) -> Self {
        CoreError::Cli(message)
    }
}
