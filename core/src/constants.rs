use std::time::Duration;

/// Bytes of addressable memory.
pub const MEMORY_SIZE: usize = 4096;

/// Mask that folds any 16-bit address back into memory.
pub const ADDRESS_MASK: u16 = 0x0FFF;

/// Where program images are loaded and where execution starts.
pub const PROGRAM_START: u16 = 0x200;

/// Largest image that fits between `PROGRAM_START` and the end of memory.
pub const MAX_PROGRAM_SIZE: usize = MEMORY_SIZE - PROGRAM_START as usize;

/// Depth of the subroutine call stack.
pub const STACK_DEPTH: usize = 16;

pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;

/// Timers count down at 60Hz no matter how fast instructions run.
pub const TIMER_HZ: u32 = 60;

/// Wall-clock time between two timer decrements.
pub const TIMER_PERIOD: Duration = Duration::from_nanos(1_000_000_000 / TIMER_HZ as u64);

/// Instructions executed for every rendered frame by default.
pub const CYCLES_PER_FRAME: usize = 12;

/// Host frames per second.
pub const FRAME_RATE: u32 = 60;

/// Start of the hexadecimal font inside the reserved interpreter area.
pub const FONT_START: u16 = 0x050;

/// Every font glyph is 5 rows tall.
pub const FONT_GLYPH_SIZE: u16 = 5;

/// # Font
/// Sprites for the hexadecimal digits 0..F, one byte per row.
///
/// Only the high nibble of each byte is drawn, e.g. the glyph for `0`:
/// ```text
/// 0xF0  ****
/// 0x90  *  *
/// 0x90  *  *
/// 0x90  *  *
/// 0xF0  ****
/// ```
#[rustfmt::skip]
pub const FONTSET: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
