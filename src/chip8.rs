use std::io::Read;

use crate::constants::{MAX_ROM_SIZE, PROGRAM_START};
use crate::error::{Fault, LoadError};
use crate::instruction::{Execution, Instruction};
use crate::opcode::Opcode;
use crate::state::{FrameBuffer, State};

/// Whether a cycle moved the program forward
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Progress {
    /// The instruction at pc completed
    Advanced,
    /// Fx0A found no pressed key and will be re-executed next cycle; holds x
    AwaitingKey(u8),
}

/// Everything a host needs to know about one completed cycle
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Cycle {
    /// The frame buffer changed and should be presented
    pub draw: bool,
    pub progress: Progress,
    /// The sound timer just ran out
    pub beep: bool,
    /// The opcode that was skipped because it isn't a known instruction
    pub unknown: Option<u16>,
}

/// # Chip-8
/// Chip-8 is a virtual machine and corresponding interpreted language.
///
/// Tracks:
///  - current `state`
///  - the fault that halted the machine, if any
///
/// Supplies interfaces for:
/// - loading roms
/// - pressing and releasing keys
/// - stepping the CPU and its timers one cycle at a time
/// - inspecting its frame buffer for rendering by some display
///
/// Pacing is left to the host; `step` never sleeps or blocks.
pub struct Chip8 {
    state: State,
    fault: Option<Fault>,
}

impl Chip8 {
    pub fn new() -> Self {
        Chip8 {
            state: State::new(),
            fault: None,
        }
    }

    /// Restores the power-on state and clears any fault
    pub fn reset(&mut self) {
        self.state = State::new();
        self.fault = None;
    }

    /// Load a rom from a reader
    ///
    /// At most one byte more than fits is read so oversized sources are rejected without being
    /// consumed entirely. Memory is only written once the whole ROM has been read.
    ///
    /// # Arguments
    /// * `reader` a source of ROM bytes, e.g. a file
    pub fn load_rom(&mut self, reader: &mut dyn Read) -> Result<usize, LoadError> {
        let mut rom = Vec::with_capacity(MAX_ROM_SIZE);
        reader.take(MAX_ROM_SIZE as u64 + 1).read_to_end(&mut rom)?;
        self.load_bytes(&rom)
    }

    /// Copy a rom image into memory at the program start
    ///
    /// # Arguments
    /// * `rom` the raw ROM image
    pub fn load_bytes(&mut self, rom: &[u8]) -> Result<usize, LoadError> {
        if rom.len() > MAX_ROM_SIZE {
            return Err(LoadError::RomTooLarge {
                size: rom.len(),
                max: MAX_ROM_SIZE,
            });
        }

        let start = PROGRAM_START as usize;
        self.state.memory[start..start + rom.len()].copy_from_slice(rom);
        self.state.pc = PROGRAM_START;
        tracing::info!("loaded {} byte ROM at {:#05X}", rom.len(), PROGRAM_START);
        Ok(rom.len())
    }

    /// The current state, for inspection by hosts
    pub fn state(&self) -> &State {
        &self.state
    }

    /// The frame buffer as of the last completed cycle
    pub fn frame(&self) -> &FrameBuffer {
        &self.state.frame_buffer
    }

    /// The fault that halted the machine, if any
    pub fn fault(&self) -> Option<&Fault> {
        self.fault.as_ref()
    }

    /// Set the pressed status of key
    ///
    /// # Arguments
    /// * `key` the 8-bit representation of the key that was pressed
    pub fn key_press(&mut self, key: u8) {
        self.set_key(key, true);
    }

    /// Unset the pressed status of key
    ///
    /// # Arguments
    /// * `key` the 8-bit representation of the key that was released
    pub fn key_release(&mut self, key: u8) {
        self.set_key(key, false);
    }

    /// Set the status of key; keys outside 0x0..=0xF are ignored
    pub fn set_key(&mut self, key: u8, pressed: bool) {
        match self.state.keys.get_mut(key as usize) {
            Some(slot) => *slot = pressed,
            None => tracing::debug!("ignoring key {:#X} outside the keypad", key),
        }
    }

    /// Runs a single cycle: one instruction followed by one timer tick.
    ///
    /// Returns whether the frame buffer needs presenting (clearing the draw flag), whether the
    /// program progressed, and any diagnostics raised along the way. A fault halts the machine;
    /// every later call returns the same fault until `reset`.
    pub fn step(&mut self) -> Result<Cycle, Fault> {
        if let Some(fault) = &self.fault {
            return Err(fault.clone());
        }

        let (progress, unknown) = match self.advance_cpu() {
            Ok(outcome) => outcome,
            Err(fault) => {
                tracing::error!("halting: {}", fault);
                self.fault = Some(fault.clone());
                return Err(fault);
            }
        };
        let beep = self.advance_timers();

        let draw = self.state.draw_flag;
        self.state.draw_flag = false;

        Ok(Cycle {
            draw,
            progress,
            beep,
            unknown,
        })
    }

    /// Fetches, decodes and executes the opcode at pc
    fn advance_cpu(&mut self) -> Result<(Progress, Option<u16>), Fault> {
        let op = Opcode::fetch(&self.state)?;
        let instruction = Instruction::decode(op);
        tracing::trace!(pc = self.state.pc, opcode = %op, "{}", instruction);

        let unknown = match instruction {
            Instruction::Unknown(op) => {
                tracing::warn!(
                    family = op.family(),
                    "unknown opcode {} at {:#05X}",
                    op,
                    self.state.pc
                );
                Some(op.0)
            }
            _ => None,
        };

        match instruction.execute(op, &self.state)? {
            Execution::Next(state) => {
                self.state = state;
                Ok((Progress::Advanced, unknown))
            }
            Execution::AwaitingKey(x) => Ok((Progress::AwaitingKey(x), unknown)),
        }
    }

    /// Decrements both timers if they are running.
    ///
    /// Returns true when the sound timer runs out on this tick.
    fn advance_timers(&mut self) -> bool {
        if self.state.delay_timer > 0 {
            self.state.delay_timer -= 1;
        }

        let beep = self.state.sound_timer == 1;
        if self.state.sound_timer > 0 {
            self.state.sound_timer -= 1;
        }
        if beep {
            tracing::debug!("beep");
        }
        beep
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
    use std::io;

    /// A reader whose source has gone away
    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::UnexpectedEof, "disk on fire"))
        }
    }

    #[test]
    fn test_cycles_advance_pc() {
        let mut chip8 = Chip8::new();
        let starting_pc = chip8.state.pc;
        // insert a cls opcode so we don't execute empty memory
        chip8.state.memory[0x200..0x202].copy_from_slice(&[0x00, 0xE0]);
        chip8.step().unwrap();
        assert_eq!(chip8.state.pc, starting_pc + 0x2);
    }

    #[test]
    fn test_step_reports_and_clears_draw_flag() {
        let mut chip8 = Chip8::new();
        chip8.load_bytes(&[0x00, 0xE0, 0x60, 0x01]).unwrap();
        assert!(chip8.step().unwrap().draw);
        assert!(!chip8.state.draw_flag);
        assert!(!chip8.step().unwrap().draw);
    }

    #[test]
    fn test_doesnt_advance_while_awaiting_key() {
        let mut chip8 = Chip8::new();
        chip8.load_bytes(&[0xF1, 0x0A]).unwrap();
        for _ in 0..3 {
            let cycle = chip8.step().unwrap();
            assert_eq!(cycle.progress, Progress::AwaitingKey(0x1));
            assert_eq!(chip8.state.pc, 0x200);
        }
        chip8.key_press(0xE);
        assert_eq!(chip8.step().unwrap().progress, Progress::Advanced);
        assert_eq!(chip8.state.pc, 0x202);
        assert_eq!(chip8.state.v[0x1], 0xE);
    }

    #[test]
    fn test_timers_run_while_awaiting_key() {
        let mut chip8 = Chip8::new();
        chip8.load_bytes(&[0xF0, 0x0A]).unwrap();
        chip8.state.delay_timer = 2;
        chip8.step().unwrap();
        chip8.step().unwrap();
        chip8.step().unwrap();
        assert_eq!(chip8.state.delay_timer, 0);
    }

    #[test]
    fn test_key_press_and_release() {
        let mut chip8 = Chip8::new();
        chip8.key_press(0x3);
        assert!(chip8.state.keys[0x3]);
        chip8.key_release(0x3);
        assert!(!chip8.state.keys[0x3]);
        chip8.key_press(0x10);
        assert_eq!(chip8.state.keys, [false; 16]);
    }

    #[test]
    fn test_timers_floor_at_zero() {
        let mut chip8 = Chip8::new();
        assert!(!chip8.advance_timers());
        assert_eq!(chip8.state.delay_timer, 0);
        assert_eq!(chip8.state.sound_timer, 0);
    }

    #[test]
    fn test_beeps_once_when_sound_runs_out() {
        let mut chip8 = Chip8::new();
        chip8.state.delay_timer = 2;
        chip8.state.sound_timer = 2;
        assert!(!chip8.advance_timers());
        assert_eq!(chip8.state.delay_timer, 1);
        assert!(chip8.advance_timers());
        assert_eq!(chip8.state.sound_timer, 0);
        assert!(!chip8.advance_timers());
    }

    #[test]
    fn test_reports_unknown_opcode_and_continues() {
        let mut chip8 = Chip8::new();
        chip8.load_bytes(&[0xE1, 0x23, 0x61, 0x07]).unwrap();
        let cycle = chip8.step().unwrap();
        assert_eq!(cycle.unknown, Some(0xE123));
        assert_eq!(cycle.progress, Progress::Advanced);
        assert_eq!(chip8.step().unwrap().unknown, None);
        assert_eq!(chip8.state.v[0x1], 0x7);
    }

    #[test]
    fn test_fault_halts() {
        let mut chip8 = Chip8::new();
        // RET with an empty stack
        chip8.load_bytes(&[0x00, 0xEE]).unwrap();
        let fault = Fault::StackUnderflow { pc: 0x200 };
        assert_eq!(chip8.step(), Err(fault.clone()));
        assert_eq!(chip8.step(), Err(fault.clone()));
        assert_eq!(chip8.fault(), Some(&fault));
        assert_eq!(chip8.state.pc, 0x200);

        chip8.reset();
        assert_eq!(chip8.fault(), None);
    }

    #[test]
    fn test_load_rom_from_reader() {
        let mut chip8 = Chip8::new();
        let rom = [0x12, 0x34, 0x56];
        assert_eq!(chip8.load_rom(&mut &rom[..]).unwrap(), 3);
        assert_eq!(chip8.state.memory[0x200..0x203], rom);
    }

    #[test]
    fn test_load_rom_rejects_oversized_reader() {
        let mut chip8 = Chip8::new();
        let rom = vec![0xAA; MAX_ROM_SIZE + 100];
        match chip8.load_rom(&mut &rom[..]) {
            Err(LoadError::RomTooLarge { size, max }) => {
                assert_eq!(size, MAX_ROM_SIZE + 1);
                assert_eq!(max, MAX_ROM_SIZE);
            }
            other => panic!("unexpected result {:?}", other),
        }
        assert!(chip8.state.memory[0x200..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_load_rom_read_failure() {
        let mut chip8 = Chip8::new();
        assert!(matches!(
            chip8.load_rom(&mut Broken),
            Err(LoadError::RomRead(_))
        ));
        assert_eq!(chip8.state, State::new());
    }
}
