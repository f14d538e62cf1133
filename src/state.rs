use std::fmt;
use std::ops::Range;

use crate::constants::{
    DISPLAY_HEIGHT, DISPLAY_WIDTH, KEY_COUNT, MEMORY_SIZE, PROGRAM_START, SPRITE_SHEET, STACK_SIZE,
};
use crate::error::Fault;

/// A snapshot of the Chip8 internal state
///
/// ## CPU
/// Registers
/// - (v) 16 primary 8-bit registers (V0..VF)
///     - the first 15 (V0..VE) are general purpose registers
///     - the 16th (VF) is the carry, borrow and collision flag
/// - (i) a 16-bit memory address register
///
/// Counter
/// - (pc) a 16-bit program counter
///
/// Pointer
/// - (sp) the number of return addresses currently on the stack (0..=16)
///
/// Timers
/// - 2 8-bit timers (delay & sound), both decremented once per cycle until they reach 0
///
/// ## Memory
/// - 16 entry stack of return addresses
/// - 4096 bytes of addressable memory
///     - 0x000..0x050 holds the sprite sheet
///     - 0x200..0x1000 holds the loaded ROM
/// - 64x32 frame buffer, one byte (0 or 1) per pixel
///
/// ## Input
/// - pressed status of keys 0..F, written by the host between cycles
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct State {
    pub v: [u8; 16],
    pub i: u16,
    pub pc: u16,
    pub sp: u8,
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub stack: [u16; STACK_SIZE],
    pub memory: [u8; MEMORY_SIZE],
    pub frame_buffer: FrameBuffer,
    pub draw_flag: bool,
    pub keys: [bool; KEY_COUNT],
}

impl State {
    pub fn new() -> Self {
        // 0x000 - 0x050 is reserved for the sprite sheet
        let mut memory = [0; MEMORY_SIZE];
        memory[0..SPRITE_SHEET.len()].copy_from_slice(&SPRITE_SHEET);

        State {
            v: [0; 16],
            i: 0,
            pc: PROGRAM_START,
            sp: 0,
            delay_timer: 0,
            sound_timer: 0,
            stack: [0; STACK_SIZE],
            memory,
            frame_buffer: [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
            draw_flag: false,
            keys: [false; KEY_COUNT],
        }
    }

    /// Bounds-checks `len` bytes of memory starting at `start`.
    ///
    /// Returns the range as slice indices, or a `MemoryFault` naming the first address that
    /// falls outside of memory.
    ///
    /// # Arguments
    /// * `start` the first address of the span
    /// * `len` the number of bytes in the span
    /// * `opcode` the instruction performing the access, reported with the fault
    pub fn span(&self, start: usize, len: usize, opcode: u16) -> Result<Range<usize>, Fault> {
        let end = start + len;
        if end > MEMORY_SIZE {
            Err(Fault::MemoryFault {
                address: start.max(MEMORY_SIZE),
                opcode,
            })
        } else {
            Ok(start..end)
        }
    }

    /// Whether `key` is currently held; indices outside the keypad read as released.
    pub fn is_pressed(&self, key: u8) -> bool {
        self.keys.get(key as usize).copied().unwrap_or(false)
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("v", &format_args!("{:02X?}", self.v))
            .field("i", &format_args!("{:#05X}", self.i))
            .field("pc", &format_args!("{:#05X}", self.pc))
            .field("sp", &self.sp)
            .field("stack", &format_args!("{:03X?}", &self.stack[..self.sp as usize]))
            .field("delay_timer", &self.delay_timer)
            .field("sound_timer", &self.sound_timer)
            .field("draw_flag", &self.draw_flag)
            .finish()
    }
}

/// The FrameBuffer is indexed as [y][x]
pub type FrameBuffer = [[u8; DISPLAY_WIDTH]; DISPLAY_HEIGHT];
