use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use chipvm::{Config, Emulator, SpriteEdge, TimerMode};
use clap::{Parser, ValueEnum};

use window::WindowRenderer;

mod window;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TimerArg {
    /// one tick per frame
    Frame,
    /// 60 ticks per second
    Wall,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EdgeArg {
    Clip,
    Wrap,
    Reject,
}

#[derive(Parser, Debug)]
#[command(version, about = "CHIP-8 interpreter", long_about = None)]
struct Args {
    /// Path to the ROM file to run
    rom: PathBuf,

    #[arg(long, value_enum, default_value_t = TimerArg::Frame, help = "Timer pacing")]
    timer: TimerArg,

    #[arg(long, value_enum, default_value_t = EdgeArg::Clip, help = "Sprite pixels off the screen")]
    sprite_edge: EdgeArg,

    #[arg(long, default_value_t = 1, help = "Instructions per rendered frame")]
    cycles_per_frame: u32,

    #[arg(long, default_value_t = 16, help = "Window scale: 1, 2, 4, 8, 16 or 32")]
    scale: u32,

    #[arg(long, help = "Seed for the random number generator")]
    seed: Option<u64>,
}

impl From<&Args> for Config {
    fn from(args: &Args) -> Self {
        Config {
            timer: match args.timer {
                TimerArg::Frame => TimerMode::FrameLocked,
                TimerArg::Wall => TimerMode::WallClock,
            },
            sprite_edge: match args.sprite_edge {
                EdgeArg::Clip => SpriteEdge::Clip,
                EdgeArg::Wrap => SpriteEdge::Wrap,
                EdgeArg::Reject => SpriteEdge::Reject,
            },
            cycles_per_frame: args.cycles_per_frame.max(1),
            seed: args.seed,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let program = fs::read(&args.rom)
        .with_context(|| format!("could not read rom {}", args.rom.display()))?;
    let mut emu = Emulator::new(Config::from(&args));
    emu.load_rom(&program)
        .with_context(|| format!("could not load rom {}", args.rom.display()))?;

    let mut renderer = WindowRenderer::new(args.scale)?;
    while renderer.is_open() {
        renderer.poll_keys(&mut emu);
        emu.run_frame(&mut renderer)?;
    }
    Ok(())
}
