use std::fs::File;
use std::io::BufReader;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use sdl2::event::Event;
use sdl2::keyboard::Keycode;

use chip8_vm::{Chip8, Progress};
use display::Display;

use crate::keymap::keymap;
use crate::Config;

pub fn run(config: &Config) -> Result<()> {
    let mut chip8: Chip8 = Chip8::new();

    // Load ROM before opening a window so a bad path fails fast
    let file = File::open(&config.rom)
        .with_context(|| format!("unable to open {}", config.rom.display()))?;
    let mut reader = BufReader::new(file);
    chip8
        .load_rom(&mut reader)
        .with_context(|| format!("unable to load {}", config.rom.display()))?;

    // Get SDL2 context
    let sdl: sdl2::Sdl = sdl2::init().map_err(anyhow::Error::msg)?;
    let mut display: Display = Display::new(&sdl, config.scale)?;
    let mut events = sdl.event_pump().map_err(anyhow::Error::msg)?;

    // Set initial timing
    let cycle_time = Duration::from_secs(1) / config.clock_hz.max(1);
    let mut last_cycle: Instant = Instant::now();

    // Whether or not the clock speed should be respected
    let mut fast_forward: bool = false;
    let mut awaiting_key: bool = false;

    'event: loop {
        // Handle input
        for event in events.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => break 'event,
                Event::KeyDown {
                    keycode: Some(key), ..
                } => match (key, keymap(key)) {
                    (_, Some(kc)) => chip8.key_press(kc),
                    (Keycode::Space, _) => fast_forward = true,
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
        let cycle = chip8.step()?;
        if cycle.draw {
            display.render(chip8.frame())?;
        }
        if cycle.beep {
            tracing::info!("beep");
        }
        match cycle.progress {
            Progress::AwaitingKey(x) if !awaiting_key => {
                tracing::debug!("waiting for a key press to store in V{:X}", x);
                awaiting_key = true;
            }
            Progress::Advanced => awaiting_key = false,
            _ => {}
        }

        // Handle timing
        let current_time = Instant::now();
        let elapsed_cycle_time = current_time - last_cycle;
        if !fast_forward && cycle_time > elapsed_cycle_time {
            std::thread::sleep(cycle_time - elapsed_cycle_time);
        }
        last_cycle = Instant::now();
    }

    Ok(())
}
