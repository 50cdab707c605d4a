// 16 8-bit data registers named V0 to VF
// I -> address register (12 bits)
//
// Stack of return addresses, 16 deep
//
// Delay timer & Sound timer: count down once per tick until 0
// (a tick is a frame, or 1/60 s of wall time)
//
// Display res: 64 width, 32 height
//
// 35 opcodes, each are 2 bytes (big-endian)
//      NNN: address
//      NN: 8-bit constant
//      N: 4-bit constant
//      X and Y: 4-bit register identifier

pub mod config;
pub mod decode;
pub mod display;
pub mod emulator;
pub mod error;
pub mod keyboard;
pub mod memory;
pub mod registers;
pub mod timer;

pub use config::{Config, SpriteEdge, TimerMode};
pub use decode::OpCodes;
pub use emulator::{Emulator, Frame, Renderer, Status};
pub use error::{Result, VmError};
