use thiserror::Error;

/// Reasons a ROM could not be loaded. Memory is untouched when these are returned.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("ROM is too large ({size} bytes), max size is {max} bytes")]
    RomTooLarge { size: usize, max: usize },

    #[error("unable to read ROM")]
    RomRead(#[from] std::io::Error),
}

/// Fatal runtime faults. Once one is raised the machine halts.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Fault {
    #[error("memory access out of bounds at address {address:#06X} by opcode {opcode:04X}")]
    MemoryFault { address: usize, opcode: u16 },

    #[error("stack overflow: call at {pc:#05X} exceeds 16 nested subroutines")]
    StackOverflow { pc: u16 },

    #[error("stack underflow: return at {pc:#05X} with an empty call stack")]
    StackUnderflow { pc: u16 },
}
