pub use chip8::{Chip8, Cycle, Progress};
pub use constants::CLOCK_HZ;
pub use error::{Fault, LoadError};
pub use keymap::keymap;

mod chip8;
pub mod constants;
mod error;
pub mod instruction;
mod keymap;
pub mod opcode;
mod operations;
pub mod state;
