pub use chip8::{Chip8, StepOutcome};
pub use error::{Chip8Error, Result};
pub use instruction::{Advance, Instruction};
pub use opcode::Opcode;
pub use state::{FrameBuffer, Keypad, Mode, State};
pub use timer::TimerClock;

mod chip8;
pub mod constants;
mod error;
mod instruction;
mod opcode;
mod operations;
pub mod state;
mod timer;
