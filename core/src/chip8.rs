use std::io::Read;
use std::time::Duration;

use log::{debug, info, trace, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::constants::PROGRAM_START;
use crate::error::{Chip8Error, Result};
use crate::instruction::{Advance, Instruction};
use crate::opcode::Opcode;
use crate::state::{FrameBuffer, Mode, State};
use crate::timer::TimerClock;

/// What a single call to `Chip8::step` did
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The instruction ran and the pc moved on (or held, for `Fx0A`)
    Executed(Instruction),
    /// The word at the pc isn't an instruction; it was reported and skipped
    Unrecognized(Opcode),
    /// Nothing happened because the machine is waiting for a key
    AwaitingKey { register: u8 },
    /// A latched key finished an `Fx0A`; the pc moved past it
    KeyResolved,
}

/// # Chip-8
/// Chip-8 is a virtual machine and corresponding interpreted language.
///
/// Tracks:
///  - current `state`
///  - the loaded program image, so the machine can be reset
///  - a random number generator for `Cxkk`
///  - a `TimerClock` converting wall-clock time into timer ticks
///
/// Supplies interfaces for:
/// - loading roms
/// - pressing and releasing keys
/// - advancing the CPU one instruction or one frame at a time
/// - advancing its timers
/// - taking the frame buffer for rendering by some display
/// - telling an audio device whether the tone should sound
pub struct Chip8 {
    state: State,
    rom: Vec<u8>,
    slots: usize,
    rng: StdRng,
    clock: TimerClock,
}

impl Chip8 {
    pub fn new() -> Self {
        Chip8::with_rng(StdRng::from_entropy())
    }

    /// A machine whose `Cxkk` results are reproducible
    pub fn with_seed(seed: u64) -> Self {
        Chip8::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Chip8 {
            state: State::new(),
            rom: Vec::new(),
            slots: 0,
            rng,
            clock: TimerClock::default(),
        }
    }

    /// Load a rom from a source file
    ///
    /// # Arguments
    /// * `reader` a file reader that contains a ROM
    pub fn load_rom(&mut self, reader: &mut dyn Read) -> Result<usize> {
        let mut image = Vec::new();
        reader.read_to_end(&mut image)?;
        self.load_program(&image)
    }

    /// Load a program image into a freshly reset machine
    ///
    /// Returns the number of instruction slots in the image.
    pub fn load_program(&mut self, image: &[u8]) -> Result<usize> {
        let mut state = State::new();
        let slots = state.load_program(image)?;
        info!(
            "loaded {} byte program ({} instruction slots) at {:#05X}",
            image.len(),
            slots,
            PROGRAM_START
        );
        self.state = state;
        self.rom = image.to_vec();
        self.slots = slots;
        self.clock.reset();
        Ok(slots)
    }

    /// Return to the power-on state with the current program loaded again
    pub fn reset(&mut self) {
        self.state.reset();
        let start = usize::from(PROGRAM_START);
        self.state.memory[start..start + self.rom.len()].copy_from_slice(&self.rom);
        self.clock.reset();
        debug!("machine reset");
    }

    /// Number of 2-byte instruction slots in the loaded image
    pub fn program_slots(&self) -> usize {
        self.slots
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// Set the pressed status of key
    /// - resolves a pending `Fx0A` by writing the key into its register
    ///
    /// # Arguments
    /// * `key` the 8-bit representation of the key that was pressed
    pub fn key_press(&mut self, key: u8) {
        if key > 0xF {
            warn!("ignoring press of unknown key {:#04X}", key);
            return;
        }
        self.state.keys.set(key, true);
        if let Mode::AwaitingKey { register } = self.state.mode {
            debug!("key {:X} resolves wait on V{:X}", key, register);
            self.state.v[usize::from(register)] = key;
            self.state.mode = Mode::KeyLatched;
        }
    }

    /// Unset the pressed status of key
    ///
    /// # Arguments
    /// * `key` the 8-bit representation of the key that was released
    pub fn key_release(&mut self, key: u8) {
        if key > 0xF {
            warn!("ignoring release of unknown key {:#04X}", key);
            return;
        }
        self.state.keys.set(key, false);
    }

    pub fn is_awaiting_key(&self) -> bool {
        matches!(self.state.mode, Mode::AwaitingKey { .. })
    }

    /// Advances the CPU by a single instruction
    /// - does nothing while awaiting a keypress
    /// - finishes an `Fx0A` once a key was latched
    /// - otherwise fetches, decodes and executes the next opcode
    ///
    /// A failed call or return leaves the state exactly as it was.
    pub fn step(&mut self) -> Result<StepOutcome> {
        match self.state.mode {
            Mode::AwaitingKey { register } => return Ok(StepOutcome::AwaitingKey { register }),
            Mode::KeyLatched => {
                self.state.pc = Advance::Next.apply(self.state.pc);
                self.state.mode = Mode::Running;
                return Ok(StepOutcome::KeyResolved);
            }
            Mode::Running => {}
        }

        let pc = self.state.pc;
        let op = self.state.fetch();
        let instruction = match Instruction::decode(op) {
            Some(instruction) => instruction,
            None => {
                warn!("{}; skipping it", Chip8Error::UnknownInstruction { opcode: op, pc });
                self.state.pc = Advance::Next.apply(pc);
                return Ok(StepOutcome::Unrecognized(op));
            }
        };
        trace!(
            "{:04X}: {} {:?} v{:02X?} i{:04X}",
            pc,
            op,
            instruction,
            self.state.v,
            self.state.i
        );

        let (next, advance) = instruction.execute(&self.state, &mut self.rng)?;
        self.state = State {
            pc: advance.apply(pc),
            ..next
        };
        if let Mode::AwaitingKey { register } = self.state.mode {
            debug!("waiting for a key for V{:X}", register);
        }
        Ok(StepOutcome::Executed(instruction))
    }

    /// Runs up to `cycles` instructions, stopping early once a key is awaited
    pub fn run_frame(&mut self, cycles: usize) -> Result<()> {
        for _ in 0..cycles {
            if let StepOutcome::AwaitingKey { .. } = self.step()? {
                break;
            }
        }
        Ok(())
    }

    /// Decrements both timers once, stopping at 0
    pub fn tick_timers(&mut self) {
        self.state.delay_timer = self.state.delay_timer.saturating_sub(1);
        self.state.sound_timer = self.state.sound_timer.saturating_sub(1);
    }

    /// Handles the timers for `elapsed` wall-clock time
    /// - one tick per 1/60s, independent of how many instructions ran
    ///
    /// Returns the number of ticks applied.
    pub fn advance_timers(&mut self, elapsed: Duration) -> u32 {
        let ticks = self.clock.advance(elapsed);
        for _ in 0..ticks {
            self.tick_timers();
        }
        ticks
    }

    pub fn delay_timer(&self) -> u8 {
        self.state.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.state.sound_timer
    }

    /// Whether the tone should be playing right now
    pub fn tone_active(&self) -> bool {
        self.state.sound_timer > 0
    }

    /// Returns a copy of the FrameBuffer if it changed since the last call
    pub fn take_frame(&mut self) -> Option<FrameBuffer> {
        if self.state.draw_flag {
            self.state.draw_flag = false;
            Some(self.state.frame_buffer)
        } else {
            None
        }
    }

    /// The current FrameBuffer, whether or not it changed
    pub fn frame(&self) -> &FrameBuffer {
        &self.state.frame_buffer
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_program(program: &[u8]) -> Chip8 {
        let mut chip8 = Chip8::with_seed(0);
        chip8.load_program(program).unwrap();
        chip8
    }

    #[test]
    fn test_cycles_while_no_register_needs_key() {
        // insert a cls opcode so there is something to execute
        let mut chip8 = with_program(&[0x00, 0xE0]);
        let starting_pc = chip8.state.pc;
        let outcome = chip8.step().unwrap();
        assert_eq!(outcome, StepOutcome::Executed(Instruction::Clear));
        assert_eq!(chip8.state.pc, starting_pc + 0x2);
    }

    #[test]
    fn test_captures_key_presses() {
        let mut chip8 = Chip8::with_seed(0);
        chip8.state.mode = Mode::AwaitingKey { register: 0x1 };
        chip8.key_press(0xE);
        assert_eq!(chip8.state.mode, Mode::KeyLatched);
        assert_eq!(chip8.state.v[0x1], 0xE);
        assert!(chip8.state.keys.is_pressed(0xE));
    }

    #[test]
    fn test_doesnt_cycle_while_register_needs_key() {
        let mut chip8 = with_program(&[0x00, 0xE0]);
        let starting_pc = chip8.state.pc;
        chip8.state.mode = Mode::AwaitingKey { register: 0x1 };
        for _ in 0..10 {
            assert_eq!(
                chip8.step().unwrap(),
                StepOutcome::AwaitingKey { register: 0x1 }
            );
        }
        assert_eq!(chip8.state.pc, starting_pc);
    }

    #[test]
    fn test_key_release_clears_key() {
        let mut chip8 = Chip8::with_seed(0);
        chip8.key_press(0x3);
        chip8.key_release(0x3);
        assert!(!chip8.state.keys.is_pressed(0x3));
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let mut chip8 = Chip8::with_seed(0);
        chip8.state.mode = Mode::AwaitingKey { register: 0x1 };
        chip8.key_press(0x10);
        assert!(chip8.is_awaiting_key());
        assert_eq!(chip8.state.v[0x1], 0x0);
    }

    #[test]
    fn test_unknown_instruction_is_skipped() {
        let mut chip8 = with_program(&[0x01, 0x23, 0x00, 0xE0]);
        assert_eq!(
            chip8.step().unwrap(),
            StepOutcome::Unrecognized(Opcode(0x0123))
        );
        assert_eq!(chip8.state.pc, 0x202);
        assert_eq!(
            chip8.step().unwrap(),
            StepOutcome::Executed(Instruction::Clear)
        );
    }

    #[test]
    fn test_return_on_empty_stack_keeps_state() {
        let mut chip8 = with_program(&[0x00, 0xEE]);
        let before = chip8.state;
        assert!(matches!(
            chip8.step(),
            Err(Chip8Error::StackUnderflow { pc: 0x200 })
        ));
        assert_eq!(chip8.state, before);
    }

    #[test]
    fn test_run_frame_stops_on_key_wait() {
        // LD V0, 1; LD V1, K; LD V2, 2
        let mut chip8 = with_program(&[0x60, 0x01, 0xF1, 0x0A, 0x62, 0x02]);
        chip8.run_frame(12).unwrap();
        assert_eq!(chip8.state.v[0x0], 0x1);
        assert_eq!(chip8.state.v[0x2], 0x0);
        assert_eq!(chip8.state.pc, 0x202);
        assert!(chip8.is_awaiting_key());
    }

    #[test]
    fn test_tick_timers_saturates() {
        let mut chip8 = Chip8::with_seed(0);
        chip8.state.delay_timer = 1;
        chip8.state.sound_timer = 2;
        chip8.tick_timers();
        assert_eq!((chip8.delay_timer(), chip8.sound_timer()), (0, 1));
        chip8.tick_timers();
        assert_eq!((chip8.delay_timer(), chip8.sound_timer()), (0, 0));
        assert!(!chip8.tone_active());
    }

    #[test]
    fn test_advance_timers_follows_wall_clock() {
        let mut chip8 = Chip8::with_seed(0);
        chip8.state.delay_timer = 10;
        assert_eq!(chip8.advance_timers(Duration::from_millis(50)), 3);
        assert_eq!(chip8.delay_timer(), 7);
    }

    #[test]
    fn test_take_frame_clears_draw_flag() {
        let mut chip8 = with_program(&[0x00, 0xE0]);
        assert_eq!(chip8.take_frame(), None);
        chip8.step().unwrap();
        assert!(chip8.take_frame().is_some());
        assert_eq!(chip8.take_frame(), None);
    }

    #[test]
    fn test_reset_reloads_program() {
        let mut chip8 = with_program(&[0x60, 0x42]);
        chip8.step().unwrap();
        chip8.reset();
        assert_eq!(chip8.state.v[0x0], 0x0);
        assert_eq!(chip8.state.pc, 0x200);
        assert_eq!(chip8.state.memory[0x200..0x202], [0x60, 0x42]);
        assert_eq!(chip8.program_slots(), 1);
    }

    #[test]
    fn test_load_rom_from_reader() {
        let mut chip8 = Chip8::with_seed(0);
        let mut rom: &[u8] = &[0x12, 0x00, 0x00];
        assert_eq!(chip8.load_rom(&mut rom).unwrap(), 1);
        assert_eq!(chip8.state.memory[0x200..0x203], [0x12, 0x00, 0x00]);
    }

    #[test]
    fn test_same_seed_same_random_bytes() {
        // RND V0, FF
        let mut a = with_program(&[0xC0, 0xFF]);
        let mut b = with_program(&[0xC0, 0xFF]);
        a.step().unwrap();
        b.step().unwrap();
        assert_eq!(a.state.v[0x0], b.state.v[0x0]);
    }
}
