use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use sdl2::event::Event;
use sdl2::keyboard::Keycode;

use chip8_core::constants::FRAME_RATE;
use chip8_core::Chip8;
use chip8_display::Display;

use crate::audio::{Buzzer, Mute, Tone};
use crate::keymap::keymap;

/// Host options for a single run
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub rom: PathBuf,
    pub cycles_per_frame: usize,
    pub scale: u32,
    pub seed: Option<u64>,
    pub mute: bool,
}

fn open_tone(sdl: &sdl2::Sdl, mute: bool) -> Box<dyn Tone> {
    if mute {
        return Box::new(Mute);
    }
    match Buzzer::new(sdl) {
        Ok(buzzer) => Box::new(buzzer),
        Err(e) => {
            warn!("no audio device, continuing without sound: {}", e);
            Box::new(Mute)
        }
    }
}

/// Runs the program image named by `config` until the window is closed.
///
/// Space fast-forwards while held, Backspace restarts the program and Escape quits.
pub fn run(config: &Config) -> Result<()> {
    let mut chip8 = match config.seed {
        Some(seed) => Chip8::with_seed(seed),
        None => Chip8::new(),
    };

    // Load ROM
    let file = File::open(&config.rom)
        .with_context(|| format!("unable to open {}", config.rom.display()))?;
    let mut reader = BufReader::new(file);
    chip8
        .load_rom(&mut reader)
        .with_context(|| format!("unable to load {}", config.rom.display()))?;

    // Get SDL2 context
    let sdl = sdl2::init().map_err(anyhow::Error::msg)?;
    let mut display = Display::new(&sdl, config.scale).context("unable to open display")?;
    let mut tone = open_tone(&sdl, config.mute);
    let mut events = sdl.event_pump().map_err(anyhow::Error::msg)?;
    display.render(chip8.frame())?;

    // Set initial timing
    let frame_time = Duration::from_secs(1) / FRAME_RATE;
    let mut last_tick = Instant::now();
    info!(
        "running {} at {} instructions per frame",
        config.rom.display(),
        config.cycles_per_frame
    );

    // Whether or not the frame rate should be respected
    let mut fast_forward = false;

    'event: loop {
        let frame_start = Instant::now();

        // Handle input
        for event in events.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => break 'event,
                Event::KeyDown {
                    keycode: Some(key),
                    repeat: false,
                    ..
                } => match (key, keymap(key)) {
                    (_, Some(kc)) => chip8.key_press(kc),
                    (Keycode::Space, _) => fast_forward = true,
                    (Keycode::Backspace, _) => {
                        debug!("restarting program");
                        chip8.reset();
                    }
                    _ => continue,
                },
                Event::KeyUp {
                    keycode: Some(key), ..
                } => match (key, keymap(key)) {
                    (_, Some(kc)) => chip8.key_release(kc),
                    (Keycode::Space, _) => fast_forward = false,
                    _ => continue,
                },
                _ => continue,
            };
        }

        // Update state
        if let Err(e) = chip8.run_frame(config.cycles_per_frame) {
            error!("machine halted at {:03X}: {}", chip8.state().pc, e);
            return Err(e.into());
        }
        let now = Instant::now();
        chip8.advance_timers(now - last_tick);
        last_tick = now;
        tone.set_playing(chip8.tone_active());

        // If a draw happened, hand the frame to the renderer
        if let Some(frame) = chip8.take_frame() {
            display.render(&frame)?;
        }

        // Handle timing
        let elapsed = frame_start.elapsed();
        if !fast_forward && frame_time > elapsed {
            std::thread::sleep(frame_time - elapsed);
        }
    }

    tone.stop();
    Ok(())
}
