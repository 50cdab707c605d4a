use thiserror::Error;

use crate::memory::TypeAddr;

pub type Result<T> = std::result::Result<T, VmError>;

/// Everything that can stop the interpreter.
///
/// Apart from `RomTooLarge`, which is only raised while loading, every
/// variant halts a running machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VmError {
    #[error("invalid opcode {0:04X}")]
    UnrecognizedInstruction(u16),
    #[error("address {0:#05X} out of range")]
    AddressOutOfRange(TypeAddr),
    #[error("pixel ({x}, {y}) out of range")]
    PixelOutOfRange { x: usize, y: usize },
    #[error("stack overflow")]
    StackOverflow,
    #[error("stack underflow")]
    StackUnderflow,
    #[error("rom is {size} bytes, at most {max} fit in memory")]
    RomTooLarge { size: usize, max: usize },
}
