use crate::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH, FONT_GLYPH_SIZE, FONT_START};
use crate::error::Result;
use crate::instruction::Advance;
use crate::state::{Mode, State};

/// The register a nibble operand names
fn reg(n: u8) -> usize {
    usize::from(n & 0xF)
}

/// clear
pub fn clear(state: &State) -> (State, Advance) {
    let next = State {
        frame_buffer: [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
        draw_flag: true,
        ..*state
    };
    (next, Advance::Next)
}

/// PC = STACK.pop()
pub fn ret(state: &State) -> Result<(State, Advance)> {
    let mut next = *state;
    let addr = next.pop()?;
    Ok((next, Advance::Jump(addr)))
}

/// PC = addr
pub fn jump(state: &State, addr: u16) -> (State, Advance) {
    (*state, Advance::Jump(addr))
}

/// STACK.push(PC + 2); PC = addr
pub fn call(state: &State, addr: u16) -> Result<(State, Advance)> {
    let mut next = *state;
    next.push(Advance::Next.apply(state.pc))?;
    Ok((next, Advance::Jump(addr)))
}

/// if Vx == kk then pc += 2
pub fn skip_eq_byte(state: &State, x: u8, kk: u8) -> (State, Advance) {
    (*state, Advance::skip_if(state.v[reg(x)] == kk))
}

/// if Vx != kk then pc += 2
pub fn skip_ne_byte(state: &State, x: u8, kk: u8) -> (State, Advance) {
    (*state, Advance::skip_if(state.v[reg(x)] != kk))
}

/// if Vx == Vy then pc += 2
pub fn skip_eq_reg(state: &State, x: u8, y: u8) -> (State, Advance) {
    (*state, Advance::skip_if(state.v[reg(x)] == state.v[reg(y)]))
}

/// Vx = kk
pub fn load_byte(state: &State, x: u8, kk: u8) -> (State, Advance) {
    let mut v = state.v;
    v[reg(x)] = kk;
    (State { v, ..*state }, Advance::Next)
}

/// Vx += kk
/// Overflow wraps and VF is left alone
pub fn add_byte(state: &State, x: u8, kk: u8) -> (State, Advance) {
    let mut v = state.v;
    v[reg(x)] = v[reg(x)].wrapping_add(kk);
    (State { v, ..*state }, Advance::Next)
}

/// Vx = Vy
pub fn mv(state: &State, x: u8, y: u8) -> (State, Advance) {
    let mut v = state.v;
    v[reg(x)] = v[reg(y)];
    (State { v, ..*state }, Advance::Next)
}

/// Vx |= Vy
pub fn or(state: &State, x: u8, y: u8) -> (State, Advance) {
    let mut v = state.v;
    v[reg(x)] |= v[reg(y)];
    (State { v, ..*state }, Advance::Next)
}

/// Vx &= Vy
pub fn and(state: &State, x: u8, y: u8) -> (State, Advance) {
    let mut v = state.v;
    v[reg(x)] &= v[reg(y)];
    (State { v, ..*state }, Advance::Next)
}

/// Vx ^= Vy
pub fn xor(state: &State, x: u8, y: u8) -> (State, Advance) {
    let mut v = state.v;
    v[reg(x)] ^= v[reg(y)];
    (State { v, ..*state }, Advance::Next)
}

/// Vx += Vy; VF = carry
pub fn add_reg(state: &State, x: u8, y: u8) -> (State, Advance) {
    let sum = u16::from(state.v[reg(x)]) + u16::from(state.v[reg(y)]);
    let mut v = state.v;
    v[0xF] = (sum > 0xFF) as u8;
    v[reg(x)] = (sum & 0xFF) as u8;
    (State { v, ..*state }, Advance::Next)
}

/// Vx -= Vy; VF = Vx > Vy
pub fn sub(state: &State, x: u8, y: u8) -> (State, Advance) {
    let (vx, vy) = (state.v[reg(x)], state.v[reg(y)]);
    let mut v = state.v;
    v[0xF] = (vx > vy) as u8;
    v[reg(x)] = vx.wrapping_sub(vy);
    (State { v, ..*state }, Advance::Next)
}

/// Vx >>= 1; VF = the bit shifted out
pub fn shr(state: &State, x: u8) -> (State, Advance) {
    let vx = state.v[reg(x)];
    let mut v = state.v;
    v[0xF] = vx & 0x1;
    v[reg(x)] = vx >> 1;
    (State { v, ..*state }, Advance::Next)
}

/// Vx = Vy - Vx; VF = Vy > Vx
pub fn subn(state: &State, x: u8, y: u8) -> (State, Advance) {
    let (vx, vy) = (state.v[reg(x)], state.v[reg(y)]);
    let mut v = state.v;
    v[0xF] = (vy > vx) as u8;
    v[reg(x)] = vy.wrapping_sub(vx);
    (State { v, ..*state }, Advance::Next)
}

/// Vx <<= 1; VF = the bit shifted out
pub fn shl(state: &State, x: u8) -> (State, Advance) {
    let vx = state.v[reg(x)];
    let mut v = state.v;
    v[0xF] = (vx & 0x80) >> 7;
    v[reg(x)] = vx << 1;
    (State { v, ..*state }, Advance::Next)
}

/// if Vx != Vy then pc += 2
pub fn skip_ne_reg(state: &State, x: u8, y: u8) -> (State, Advance) {
    (*state, Advance::skip_if(state.v[reg(x)] != state.v[reg(y)]))
}

/// I = addr
pub fn load_index(state: &State, addr: u16) -> (State, Advance) {
    (State { i: addr, ..*state }, Advance::Next)
}

/// PC = V0 + addr
pub fn jump_offset(state: &State, addr: u16) -> (State, Advance) {
    (*state, Advance::Jump(addr + u16::from(state.v[0x0])))
}

/// Vx = random_byte & kk
pub fn random(state: &State, x: u8, kk: u8, random_byte: u8) -> (State, Advance) {
    let mut v = state.v;
    v[reg(x)] = random_byte & kk;
    (State { v, ..*state }, Advance::Next)
}

/// draw_sprite(x=Vx y=Vy size=n)
/// XORs a sprite from memory I..I+n at position x, y on the FrameBuffer with wrapping.
/// Sets VF if any lit pixel is erased
pub fn draw(state: &State, x: u8, y: u8, n: u8) -> (State, Advance) {
    let mut v = state.v;
    let mut frame_buffer = state.frame_buffer;
    let origin_x = usize::from(state.v[reg(x)]);
    let origin_y = usize::from(state.v[reg(y)]);

    v[0xF] = 0x0;

    for row in 0..n {
        let sprite = state.read(state.i.wrapping_add(u16::from(row)));
        let py = (origin_y + usize::from(row)) % DISPLAY_HEIGHT;
        for col in 0..8 {
            if sprite & (0x80 >> col) == 0 {
                continue;
            }
            let px = (origin_x + col) % DISPLAY_WIDTH;
            let pixel = &mut frame_buffer[py][px];
            if *pixel == 1 {
                v[0xF] = 0x1;
            }
            *pixel ^= 1;
        }
    }

    let next = State {
        v,
        frame_buffer,
        draw_flag: true,
        ..*state
    };
    (next, Advance::Next)
}

/// if Vx.pressed then pc += 2
pub fn skip_pressed(state: &State, x: u8) -> (State, Advance) {
    (*state, Advance::skip_if(state.keys.is_pressed(state.v[reg(x)])))
}

/// if !Vx.pressed then pc += 2
pub fn skip_released(state: &State, x: u8) -> (State, Advance) {
    (*state, Advance::skip_if(!state.keys.is_pressed(state.v[reg(x)])))
}

/// Vx = DT
pub fn load_delay(state: &State, x: u8) -> (State, Advance) {
    let mut v = state.v;
    v[reg(x)] = state.delay_timer;
    (State { v, ..*state }, Advance::Next)
}

/// await keypress for Vx
/// The pc holds on this instruction until the host delivers a key
pub fn wait_key(state: &State, x: u8) -> (State, Advance) {
    let next = State {
        mode: Mode::AwaitingKey { register: x & 0xF },
        ..*state
    };
    (next, Advance::Hold)
}

/// DT = Vx
pub fn set_delay(state: &State, x: u8) -> (State, Advance) {
    let next = State {
        delay_timer: state.v[reg(x)],
        ..*state
    };
    (next, Advance::Next)
}

/// ST = Vx
pub fn set_sound(state: &State, x: u8) -> (State, Advance) {
    let next = State {
        sound_timer: state.v[reg(x)],
        ..*state
    };
    (next, Advance::Next)
}

/// I += Vx
pub fn add_index(state: &State, x: u8) -> (State, Advance) {
    let next = State {
        i: state.i.wrapping_add(u16::from(state.v[reg(x)])),
        ..*state
    };
    (next, Advance::Next)
}

/// I = FONT_START + Vx * 5
/// Points I at the font glyph for Vx
pub fn load_glyph(state: &State, x: u8) -> (State, Advance) {
    let next = State {
        i: FONT_START + u16::from(state.v[reg(x)]) * FONT_GLYPH_SIZE,
        ..*state
    };
    (next, Advance::Next)
}

/// mem[I..I+3] = bcd(Vx)
pub fn store_bcd(state: &State, x: u8) -> (State, Advance) {
    let vx = state.v[reg(x)];
    let mut next = *state;
    for (offset, digit) in [vx / 100, vx / 10 % 10, vx % 10].iter().enumerate() {
        next.write(state.i.wrapping_add(offset as u16), *digit);
    }
    (next, Advance::Next)
}

/// mem[I..=I+x] = V0..=Vx
pub fn store_registers(state: &State, x: u8) -> (State, Advance) {
    let mut next = *state;
    for r in 0..=reg(x) {
        next.write(state.i.wrapping_add(r as u16), state.v[r]);
    }
    (next, Advance::Next)
}

/// V0..=Vx = mem[I..=I+x]
pub fn load_registers(state: &State, x: u8) -> (State, Advance) {
    let mut v = state.v;
    for (r, value) in v.iter_mut().enumerate().take(reg(x) + 1) {
        *value = state.read(state.i.wrapping_add(r as u16));
    }
    (State { v, ..*state }, Advance::Next)
}
