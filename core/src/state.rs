use crate::constants::{
    ADDRESS_MASK, DISPLAY_HEIGHT, DISPLAY_WIDTH, FONTSET, FONT_START, MAX_PROGRAM_SIZE,
    MEMORY_SIZE, PROGRAM_START, STACK_DEPTH,
};
use crate::error::{Chip8Error, Result};
use crate::opcode::Opcode;

/// The FrameBuffer is indexed as [y][x] and every cell is either 0 or 1
pub type FrameBuffer = [[u8; DISPLAY_WIDTH]; DISPLAY_HEIGHT];

/// What the CPU is doing between two steps
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Executing instructions normally
    Running,
    /// Halted on `Fx0A` until a key goes down; the key is written to `register`
    AwaitingKey { register: u8 },
    /// A key resolved the wait; the next step moves past the `Fx0A`
    KeyLatched,
}

/// Pressed status of the 16 hexadecimal keys
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Keypad([bool; 16]);

impl Keypad {
    /// Only the low nibble of `key` selects a key
    pub fn is_pressed(&self, key: u8) -> bool {
        self.0[usize::from(key & 0xF)]
    }

    pub fn set(&mut self, key: u8, pressed: bool) {
        self.0[usize::from(key & 0xF)] = pressed;
    }

    pub fn pressed(&self) -> impl Iterator<Item = u8> + '_ {
        (0..16u8).filter(move |&key| self.is_pressed(key))
    }
}

/// A snapshot of the Chip-8 internal state
///
/// ## CPU
/// Registers
/// - (v) 16 primary 8-bit registers (V0..VF)
///     - the first 15 (V0..VE) are general purpose registers
///     - the 16th (VF) doubles as the carry, borrow, shift and collision flag
/// - (i) a 16-bit memory address register, masked to 12 bits on use
///
/// Counter
/// - (pc) a 16-bit program counter
///
/// Stack
/// - (stack) 16 return addresses
/// - (sp) how many of them are in use
///
/// Timers
/// - 2 8-bit timers (delay & sound), counted down at 60Hz by the host
///
/// ## Memory
/// - 4096 bytes of addressable memory
///     - 0x000..0x200 is reserved for the interpreter, the font lives at 0x050
///     - programs are loaded at 0x200
/// - 64x32 frame buffer, redrawn by the host whenever `draw_flag` is set
///
/// ## Input
/// - pressed status of keys 0..F
/// - `mode` tracks whether execution is halted waiting for a key
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct State {
    pub v: [u8; 16],
    pub i: u16,
    pub pc: u16,
    pub sp: u8,
    pub stack: [u16; STACK_DEPTH],
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub memory: [u8; MEMORY_SIZE],
    pub frame_buffer: FrameBuffer,
    pub draw_flag: bool,
    pub keys: Keypad,
    pub mode: Mode,
}

impl State {
    pub fn new() -> Self {
        let mut memory = [0; MEMORY_SIZE];
        let font = usize::from(FONT_START);
        memory[font..font + FONTSET.len()].copy_from_slice(&FONTSET);

        State {
            v: [0; 16],
            i: 0,
            pc: PROGRAM_START,
            sp: 0,
            stack: [0; STACK_DEPTH],
            delay_timer: 0,
            sound_timer: 0,
            memory,
            frame_buffer: [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
            draw_flag: false,
            keys: Keypad::default(),
            mode: Mode::Running,
        }
    }

    /// Returns to the power-on state, discarding memory beyond the font
    pub fn reset(&mut self) {
        *self = State::new();
    }

    /// Copies a program image to `PROGRAM_START`.
    ///
    /// Returns the number of 2-byte instruction slots the image holds.
    pub fn load_program(&mut self, image: &[u8]) -> Result<usize> {
        if image.len() > MAX_PROGRAM_SIZE {
            return Err(Chip8Error::ImageTooLarge {
                size: image.len(),
                max: MAX_PROGRAM_SIZE,
            });
        }
        let start = usize::from(PROGRAM_START);
        self.memory[start..start + image.len()].copy_from_slice(image);
        Ok(image.len() / 2)
    }

    /// Reads a byte, wrapping the address into memory
    pub fn read(&self, addr: u16) -> u8 {
        self.memory[usize::from(addr & ADDRESS_MASK)]
    }

    /// Writes a byte, wrapping the address into memory
    pub fn write(&mut self, addr: u16, value: u8) {
        self.memory[usize::from(addr & ADDRESS_MASK)] = value;
    }

    /// The instruction word currently pointed at by the pc
    pub fn fetch(&self) -> Opcode {
        Opcode::from_bytes(self.read(self.pc), self.read(self.pc.wrapping_add(1)))
    }

    /// Pushes a return address, failing if all 16 slots are taken
    pub fn push(&mut self, addr: u16) -> Result<()> {
        let sp = usize::from(self.sp);
        if sp >= STACK_DEPTH {
            return Err(Chip8Error::StackOverflow { pc: self.pc });
        }
        self.stack[sp] = addr;
        self.sp += 1;
        Ok(())
    }

    /// Pops the most recent return address, failing if there is none
    pub fn pop(&mut self) -> Result<u16> {
        if self.sp == 0 {
            return Err(Chip8Error::StackUnderflow { pc: self.pc });
        }
        self.sp -= 1;
        Ok(self.stack[usize::from(self.sp)])
    }

    /// The return addresses currently on the stack, oldest first
    pub fn call_stack(&self) -> &[u16] {
        &self.stack[..usize::from(self.sp)]
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}
