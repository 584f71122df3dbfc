use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use chip8_core::constants::CYCLES_PER_FRAME;

mod audio;
mod keymap;
mod run;

use run::{run, Config};

/// Runs a Chip-8 program image
#[derive(Parser, Debug)]
#[command(name = "chip8", version, about)]
struct Args {
    /// Program image to load at 0x200
    rom: PathBuf,

    /// Instructions executed per 60 Hz frame
    #[arg(long, default_value_t = CYCLES_PER_FRAME)]
    cycles_per_frame: usize,

    /// Window size multiplier
    #[arg(long, default_value_t = 10)]
    scale: u32,

    /// Seed for the RND instruction, for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Disable the sound timer tone
    #[arg(long)]
    mute: bool,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Config {
            rom: args.rom,
            cycles_per_frame: args.cycles_per_frame,
            scale: args.scale,
            seed: args.seed,
            mute: args.mute,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    run(&args.into())
}
