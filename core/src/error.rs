use thiserror::Error;

use crate::opcode::Opcode;

pub type Result<T> = std::result::Result<T, Chip8Error>;

/// Everything that can go wrong while loading or running a program.
#[derive(Debug, Error)]
pub enum Chip8Error {
    #[error("program image is {size} bytes but at most {max} bytes fit in memory")]
    ImageTooLarge { size: usize, max: usize },

    #[error("call at {pc:#06X} would nest deeper than the stack allows")]
    StackOverflow { pc: u16 },

    #[error("return at {pc:#06X} with an empty call stack")]
    StackUnderflow { pc: u16 },

    #[error("unknown instruction {opcode} at {pc:#06X}")]
    UnknownInstruction { opcode: Opcode, pc: u16 },

    #[error("unable to read program image: {0}")]
    Io(#[from] std::io::Error),
}
