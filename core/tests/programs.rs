use std::time::Duration;

use chip8_core::constants::{PROGRAM_START, STACK_DEPTH, TIMER_PERIOD};
use chip8_core::{Chip8, Chip8Error, Instruction, StepOutcome};

/// Lays instruction words out at absolute addresses, starting the image at 0x200
fn assemble(words: &[(u16, u16)]) -> Vec<u8> {
    let end = words.iter().map(|&(addr, _)| addr + 2).max().unwrap_or(PROGRAM_START);
    let mut image = vec![0; usize::from(end - PROGRAM_START)];
    for &(addr, word) in words {
        let offset = usize::from(addr - PROGRAM_START);
        image[offset..offset + 2].copy_from_slice(&word.to_be_bytes());
    }
    image
}

fn machine(words: &[(u16, u16)]) -> Chip8 {
    let mut chip8 = Chip8::with_seed(7);
    chip8.load_program(&assemble(words)).unwrap();
    chip8
}

/// Subroutine `k` lives at 0x300 + 4k
fn subroutine(k: u16) -> u16 {
    0x300 + 4 * k
}

/// `0x200` calls subroutine 1, each subroutine calls the next until `depth` calls are
/// nested; every subroutine then returns. `0x202` spins forever.
fn nested_calls(depth: u16) -> Vec<(u16, u16)> {
    let mut words = vec![(0x200, 0x2000 | subroutine(1)), (0x202, 0x1202)];
    for k in 1..depth {
        let call = if k + 1 < depth {
            0x2000 | subroutine(k + 1)
        } else {
            0x00EE
        };
        words.push((subroutine(k), call));
        words.push((subroutine(k) + 2, 0x00EE));
    }
    words
}

#[test]
fn call_return_round_trips_at_every_depth() {
    for depth in 1..=STACK_DEPTH as u16 {
        let mut chip8 = machine(&nested_calls(depth + 1));
        for _ in 0..depth {
            chip8.step().unwrap();
        }
        assert_eq!(chip8.state().sp as u16, depth);
        for _ in 0..depth {
            chip8.step().unwrap();
        }
        assert_eq!(chip8.state().pc, 0x202, "depth {}", depth);
        assert_eq!(chip8.state().sp, 0);
    }
}

#[test]
fn seventeenth_call_overflows_without_touching_the_stack() {
    let mut chip8 = machine(&nested_calls(STACK_DEPTH as u16 + 2));
    for _ in 0..STACK_DEPTH {
        chip8.step().unwrap();
    }
    let stack: Vec<u16> = chip8.state().call_stack().to_vec();
    assert_eq!(stack.len(), STACK_DEPTH);
    assert_eq!(stack[0], 0x202);
    assert_eq!(stack[1], subroutine(1) + 2);

    let pc = chip8.state().pc;
    match chip8.step() {
        Err(Chip8Error::StackOverflow { pc: at }) => assert_eq!(at, pc),
        other => panic!("expected StackOverflow, got {:?}", other),
    }
    assert_eq!(chip8.state().call_stack(), &stack[..]);
    assert_eq!(chip8.state().pc, pc);
}

#[test]
fn key_wait_holds_until_key_down() {
    // LD V3, K; LD V4, 1
    let mut chip8 = machine(&[(0x200, 0xF30A), (0x202, 0x6401)]);
    assert_eq!(
        chip8.step().unwrap(),
        StepOutcome::Executed(Instruction::WaitKey { x: 0x3 })
    );
    for _ in 0..100 {
        assert_eq!(
            chip8.step().unwrap(),
            StepOutcome::AwaitingKey { register: 0x3 }
        );
        assert_eq!(chip8.state().pc, 0x200);
    }

    // a key going up doesn't count
    chip8.key_release(0x5);
    assert!(chip8.is_awaiting_key());

    chip8.key_press(0xA);
    assert_eq!(chip8.state().v[0x3], 0xA);
    assert_eq!(chip8.step().unwrap(), StepOutcome::KeyResolved);
    assert_eq!(chip8.state().pc, 0x202);
    assert_eq!(chip8.state().v[0x4], 0x0);

    chip8.step().unwrap();
    assert_eq!(chip8.state().v[0x4], 0x1);
    assert_eq!(chip8.state().pc, 0x204);
}

#[test]
fn delay_timer_follows_wall_clock_not_steps() {
    // LD V0, FF; LD DT, V0; JP 0x204
    let mut chip8 = machine(&[(0x200, 0x60FF), (0x202, 0xF015), (0x204, 0x1204)]);
    chip8.run_frame(2).unwrap();
    assert_eq!(chip8.delay_timer(), 0xFF);

    let step = Duration::from_millis(5);
    let mut elapsed = Duration::from_secs(0);
    for i in 0..1000u32 {
        // vary the instruction count between clock readings
        chip8.run_frame((i % 7) as usize * 12).unwrap();
        chip8.advance_timers(step);
        elapsed += step;

        let ticks = elapsed.as_nanos() / TIMER_PERIOD.as_nanos();
        let expected = 255u128.saturating_sub(ticks) as u8;
        assert_eq!(chip8.delay_timer(), expected, "after {:?}", elapsed);
    }
    assert_eq!(chip8.delay_timer(), 0);
}

#[test]
fn sound_timer_drives_the_tone() {
    // LD V0, 2; LD ST, V0; JP 0x204
    let mut chip8 = machine(&[(0x200, 0x6002), (0x202, 0xF018), (0x204, 0x1204)]);
    assert!(!chip8.tone_active());
    chip8.run_frame(2).unwrap();
    assert!(chip8.tone_active());
    chip8.advance_timers(TIMER_PERIOD);
    assert!(chip8.tone_active());
    chip8.advance_timers(TIMER_PERIOD);
    assert!(!chip8.tone_active());
}

#[test]
fn font_glyph_draws_through_the_whole_pipeline() {
    // LD V0, 0xA; LD F, V0; DRW V1, V1, 5
    let mut chip8 = machine(&[(0x200, 0x600A), (0x202, 0xF029), (0x204, 0xD115)]);
    chip8.run_frame(3).unwrap();
    let frame = chip8.take_frame().expect("a draw happened");
    // glyph A: F0 90 F0 90 90
    assert_eq!(frame[0][0..4], [1, 1, 1, 1]);
    assert_eq!(frame[1][0..4], [1, 0, 0, 1]);
    assert_eq!(frame[2][0..4], [1, 1, 1, 1]);
    assert_eq!(frame[4][0..4], [1, 0, 0, 1]);
    assert_eq!(chip8.take_frame(), None);
}

#[test]
fn block_store_and_load_round_trip() {
    // V0..V3 = 1..4; I = 0x400; LD [I], V3; clear V0..V3; LD V3, [I]
    let mut chip8 = machine(&[
        (0x200, 0x6001),
        (0x202, 0x6102),
        (0x204, 0x6203),
        (0x206, 0x6304),
        (0x208, 0xA400),
        (0x20A, 0xF355),
        (0x20C, 0x6000),
        (0x20E, 0x6100),
        (0x210, 0x6200),
        (0x212, 0x6300),
        (0x214, 0xF365),
    ]);
    chip8.run_frame(11).unwrap();
    assert_eq!(chip8.state().memory[0x400..0x404], [1, 2, 3, 4]);
    assert_eq!(chip8.state().v[0x0..0x4], [1, 2, 3, 4]);
}

#[test]
fn oversized_image_is_rejected() {
    let mut chip8 = Chip8::with_seed(0);
    let image = vec![0u8; 4096 - 0x200 + 2];
    assert!(matches!(
        chip8.load_program(&image),
        Err(Chip8Error::ImageTooLarge { size: 3586, max: 3584 })
    ));
}

#[test]
fn unknown_words_never_stall_the_machine() {
    let mut chip8 = machine(&[(0x200, 0x0000), (0x202, 0xFFFF), (0x204, 0x6A07)]);
    assert!(matches!(chip8.step().unwrap(), StepOutcome::Unrecognized(_)));
    assert!(matches!(chip8.step().unwrap(), StepOutcome::Unrecognized(_)));
    chip8.step().unwrap();
    assert_eq!(chip8.state().v[0xA], 0x07);
}
