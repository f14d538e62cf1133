use std::io;
use std::path::PathBuf;

use anyhow::Result;
use chip8_vm::CLOCK_HZ;
use clap::Parser;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;

mod keymap;
mod run;

/// Runs a Chip-8 ROM in an SDL2 window.
///
/// Keys 1234/QWER/ASDF/ZXCV form the keypad. Hold space to ignore the clock speed.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Config {
    /// Path to the ROM image to run
    pub rom: PathBuf,

    /// CPU cycles per second; the timers tick once per cycle
    #[arg(long, default_value_t = CLOCK_HZ)]
    pub clock_hz: u32,

    /// Size of a Chip-8 pixel on screen
    #[arg(long, default_value_t = 10)]
    pub scale: u32,

    /// Most verbose level of log to print (off, error, warn, info, debug, trace)
    #[arg(long, default_value_t = LevelFilter::INFO)]
    pub log_level: LevelFilter,
}

fn main() -> Result<()> {
    let config = Config::parse();

    let stderr_format = tracing_subscriber::fmt::layer().with_writer(io::stderr);
    tracing_subscriber::registry()
        .with(config.log_level)
        .with(stderr_format)
        .init();

    run::run(&config)
}
