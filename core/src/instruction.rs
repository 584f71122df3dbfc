use rand::Rng;

use crate::error::Result;
use crate::opcode::Opcode;
use crate::operations::*;
use crate::state::State;

/// How the program counter moves once an instruction has executed
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Advance {
    /// pc += 2
    Next,
    /// pc += 4
    Skip,
    /// pc = addr
    Jump(u16),
    /// pc stays put
    Hold,
}

impl Advance {
    /// `Skip` when `condition` holds, otherwise `Next`
    pub fn skip_if(condition: bool) -> Self {
        if condition {
            Advance::Skip
        } else {
            Advance::Next
        }
    }

    pub fn apply(self, pc: u16) -> u16 {
        match self {
            Advance::Next => pc.wrapping_add(0x2),
            Advance::Skip => pc.wrapping_add(0x4),
            Advance::Jump(addr) => addr,
            Advance::Hold => pc,
        }
    }
}

/// A decoded instruction along with its operands.
///
/// `x` and `y` name registers, `kk` is a byte literal, `n` a nibble literal and
/// `addr` a 12-bit address.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0
    Clear,
    /// 00EE
    Return,
    /// 1nnn
    Jump { addr: u16 },
    /// 2nnn
    Call { addr: u16 },
    /// 3xkk
    SkipEqByte { x: u8, kk: u8 },
    /// 4xkk
    SkipNeByte { x: u8, kk: u8 },
    /// 5xy0
    SkipEqReg { x: u8, y: u8 },
    /// 6xkk
    LoadByte { x: u8, kk: u8 },
    /// 7xkk
    AddByte { x: u8, kk: u8 },
    /// 8xy0
    Move { x: u8, y: u8 },
    /// 8xy1
    Or { x: u8, y: u8 },
    /// 8xy2
    And { x: u8, y: u8 },
    /// 8xy3
    Xor { x: u8, y: u8 },
    /// 8xy4
    AddReg { x: u8, y: u8 },
    /// 8xy5
    Sub { x: u8, y: u8 },
    /// 8xy6
    ShiftRight { x: u8, y: u8 },
    /// 8xy7
    SubN { x: u8, y: u8 },
    /// 8xyE
    ShiftLeft { x: u8, y: u8 },
    /// 9xy0
    SkipNeReg { x: u8, y: u8 },
    /// Annn
    LoadIndex { addr: u16 },
    /// Bnnn
    JumpOffset { addr: u16 },
    /// Cxkk
    Random { x: u8, kk: u8 },
    /// Dxyn
    Draw { x: u8, y: u8, n: u8 },
    /// Ex9E
    SkipKeyPressed { x: u8 },
    /// ExA1
    SkipKeyReleased { x: u8 },
    /// Fx07
    LoadDelay { x: u8 },
    /// Fx0A
    WaitKey { x: u8 },
    /// Fx15
    SetDelay { x: u8 },
    /// Fx18
    SetSound { x: u8 },
    /// Fx1E
    AddIndex { x: u8 },
    /// Fx29
    LoadGlyph { x: u8 },
    /// Fx33
    StoreBcd { x: u8 },
    /// Fx55
    StoreRegisters { x: u8 },
    /// Fx65
    LoadRegisters { x: u8 },
}

impl Instruction {
    /// Selects the Instruction for a given Opcode, if there is one
    pub fn decode(op: Opcode) -> Option<Self> {
        use Instruction::*;

        let (x, y, n, kk, addr) = (op.x(), op.y(), op.n(), op.kk(), op.nnn());
        let instruction = match op.nibbles() {
            (0x0, 0x0, 0xE, 0x0) => Clear,
            (0x0, 0x0, 0xE, 0xE) => Return,
            (0x1, ..) => Jump { addr },
            (0x2, ..) => Call { addr },
            (0x3, ..) => SkipEqByte { x, kk },
            (0x4, ..) => SkipNeByte { x, kk },
            (0x5, .., 0x0) => SkipEqReg { x, y },
            (0x6, ..) => LoadByte { x, kk },
            (0x7, ..) => AddByte { x, kk },
            (0x8, .., 0x0) => Move { x, y },
            (0x8, .., 0x1) => Or { x, y },
            (0x8, .., 0x2) => And { x, y },
            (0x8, .., 0x3) => Xor { x, y },
            (0x8, .., 0x4) => AddReg { x, y },
            (0x8, .., 0x5) => Sub { x, y },
            (0x8, .., 0x6) => ShiftRight { x, y },
            (0x8, .., 0x7) => SubN { x, y },
            (0x8, .., 0xE) => ShiftLeft { x, y },
            (0x9, .., 0x0) => SkipNeReg { x, y },
            (0xA, ..) => LoadIndex { addr },
            (0xB, ..) => JumpOffset { addr },
            (0xC, ..) => Random { x, kk },
            (0xD, ..) => Draw { x, y, n },
            (0xE, _, 0x9, 0xE) => SkipKeyPressed { x },
            (0xE, _, 0xA, 0x1) => SkipKeyReleased { x },
            (0xF, _, 0x0, 0x7) => LoadDelay { x },
            (0xF, _, 0x0, 0xA) => WaitKey { x },
            (0xF, _, 0x1, 0x5) => SetDelay { x },
            (0xF, _, 0x1, 0x8) => SetSound { x },
            (0xF, _, 0x1, 0xE) => AddIndex { x },
            (0xF, _, 0x2, 0x9) => LoadGlyph { x },
            (0xF, _, 0x3, 0x3) => StoreBcd { x },
            (0xF, _, 0x5, 0x5) => StoreRegisters { x },
            (0xF, _, 0x6, 0x5) => LoadRegisters { x },
            _ => return None,
        };
        Some(instruction)
    }

    /// Applies the instruction to `state`.
    ///
    /// Returns the resulting state, with its pc untouched, and how the pc should move.
    /// `state` itself is never modified, so a failed call or return leaves it intact.
    pub fn execute<R: Rng + ?Sized>(self, state: &State, rng: &mut R) -> Result<(State, Advance)> {
        use Instruction::*;

        let transition = match self {
            Clear => clear(state),
            Return => ret(state)?,
            Jump { addr } => jump(state, addr),
            Call { addr } => call(state, addr)?,
            SkipEqByte { x, kk } => skip_eq_byte(state, x, kk),
            SkipNeByte { x, kk } => skip_ne_byte(state, x, kk),
            SkipEqReg { x, y } => skip_eq_reg(state, x, y),
            LoadByte { x, kk } => load_byte(state, x, kk),
            AddByte { x, kk } => add_byte(state, x, kk),
            Move { x, y } => mv(state, x, y),
            Or { x, y } => or(state, x, y),
            And { x, y } => and(state, x, y),
            Xor { x, y } => xor(state, x, y),
            AddReg { x, y } => add_reg(state, x, y),
            Sub { x, y } => sub(state, x, y),
            ShiftRight { x, .. } => shr(state, x),
            SubN { x, y } => subn(state, x, y),
            ShiftLeft { x, .. } => shl(state, x),
            SkipNeReg { x, y } => skip_ne_reg(state, x, y),
            LoadIndex { addr } => load_index(state, addr),
            JumpOffset { addr } => jump_offset(state, addr),
            Random { x, kk } => random(state, x, kk, rng.gen()),
            Draw { x, y, n } => draw(state, x, y, n),
            SkipKeyPressed { x } => skip_pressed(state, x),
            SkipKeyReleased { x } => skip_released(state, x),
            LoadDelay { x } => load_delay(state, x),
            WaitKey { x } => wait_key(state, x),
            SetDelay { x } => set_delay(state, x),
            SetSound { x } => set_sound(state, x),
            AddIndex { x } => add_index(state, x),
            LoadGlyph { x } => load_glyph(state, x),
            StoreBcd { x } => store_bcd(state, x),
            StoreRegisters { x } => store_registers(state, x),
            LoadRegisters { x } => load_registers(state, x),
        };
        Ok(transition)
    }
}
