use rand::Rng;

use crate::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH, SPRITE_SIZE, STACK_SIZE};
use crate::error::Fault;
use crate::opcode::Opcode;
use crate::state::State;

/// clear
pub fn clr(state: &State) -> State {
    State {
        pc: state.pc + 0x2,
        frame_buffer: [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
        draw_flag: true,
        ..*state
    }
}

/// PC = STACK.pop()
pub fn rts(state: &State) -> Result<State, Fault> {
    if state.sp == 0 {
        return Err(Fault::StackUnderflow { pc: state.pc });
    }
    let sp = state.sp - 0x1;
    Ok(State {
        pc: state.stack[sp as usize] + 0x2,
        sp,
        ..*state
    })
}

/// PC = addr
pub fn jump(state: &State, addr: u16) -> State {
    State { pc: addr, ..*state }
}

/// STACK.push(PC); PC = addr
pub fn call(state: &State, addr: u16) -> Result<State, Fault> {
    if state.sp as usize >= STACK_SIZE {
        return Err(Fault::StackOverflow { pc: state.pc });
    }
    let mut stack = state.stack;
    stack[state.sp as usize] = state.pc;
    Ok(State {
        pc: addr,
        sp: state.sp + 0x1,
        stack,
        ..*state
    })
}

/// if condition then pc += 2
/// Shared by every skip instruction; the instruction itself is always stepped over.
pub fn skip_if(state: &State, condition: bool) -> State {
    let pc = if condition {
        state.pc + 0x4
    } else {
        state.pc + 0x2
    };
    State { pc, ..*state }
}

/// Vx = kk
pub fn load(state: &State, x: u8, kk: u8) -> State {
    let mut v = state.v;
    v[x as usize] = kk;
    State {
        pc: state.pc + 0x2,
        v,
        ..*state
    }
}

/// Vx += kk
/// Add kk to Vx; allow for overflow but implicitly drop it. VF is untouched.
pub fn add(state: &State, x: u8, kk: u8) -> State {
    let mut v = state.v;
    v[x as usize] = v[x as usize].wrapping_add(kk);
    State {
        pc: state.pc + 0x2,
        v,
        ..*state
    }
}

/// Vx = Vy
pub fn mv(state: &State, x: u8, y: u8) -> State {
    let mut v = state.v;
    v[x as usize] = v[y as usize];
    State {
        pc: state.pc + 0x2,
        v,
        ..*state
    }
}

/// Vx |= Vy
pub fn or(state: &State, x: u8, y: u8) -> State {
    let mut v = state.v;
    v[x as usize] |= v[y as usize];
    State {
        pc: state.pc + 0x2,
        v,
        ..*state
    }
}

/// Vx &= Vy
pub fn and(state: &State, x: u8, y: u8) -> State {
    let mut v = state.v;
    v[x as usize] &= v[y as usize];
    State {
        pc: state.pc + 0x2,
        v,
        ..*state
    }
}

/// Vx ^= Vy
pub fn xor(state: &State, x: u8, y: u8) -> State {
    let mut v = state.v;
    v[x as usize] ^= v[y as usize];
    State {
        pc: state.pc + 0x2,
        v,
        ..*state
    }
}

// The flag-setting ALU operations below compute everything from the original register values
// and write VF last, so VF holds the flag even when it is also the destination.

/// Vx += Vy; VF = carry
pub fn addr(state: &State, x: u8, y: u8) -> State {
    let sum = u16::from(state.v[x as usize]) + u16::from(state.v[y as usize]);
    let mut v = state.v;
    v[x as usize] = sum as u8;
    v[0xF] = u8::from(sum > 0xFF);
    State {
        pc: state.pc + 0x2,
        v,
        ..*state
    }
}

/// Vx -= Vy; VF = !borrow
pub fn sub(state: &State, x: u8, y: u8) -> State {
    let (vx, vy) = (state.v[x as usize], state.v[y as usize]);
    let mut v = state.v;
    v[x as usize] = vx.wrapping_sub(vy);
    v[0xF] = u8::from(vx >= vy);
    State {
        pc: state.pc + 0x2,
        v,
        ..*state
    }
}

/// Vx >>= 1; VF = shifted out bit
pub fn shr(state: &State, x: u8) -> State {
    let vx = state.v[x as usize];
    let mut v = state.v;
    v[x as usize] = vx >> 1;
    v[0xF] = vx & 0x1;
    State {
        pc: state.pc + 0x2,
        v,
        ..*state
    }
}

/// Vx = Vy - Vx; VF = !borrow
pub fn subn(state: &State, x: u8, y: u8) -> State {
    let (vx, vy) = (state.v[x as usize], state.v[y as usize]);
    let mut v = state.v;
    v[x as usize] = vy.wrapping_sub(vx);
    v[0xF] = u8::from(vy >= vx);
    State {
        pc: state.pc + 0x2,
        v,
        ..*state
    }
}

/// Vx <<= 1; VF = shifted out bit
pub fn shl(state: &State, x: u8) -> State {
    let vx = state.v[x as usize];
    let mut v = state.v;
    v[x as usize] = vx << 1;
    v[0xF] = (vx & 0x80) >> 7;
    State {
        pc: state.pc + 0x2,
        v,
        ..*state
    }
}

/// I = addr
pub fn loadi(state: &State, addr: u16) -> State {
    State {
        pc: state.pc + 0x2,
        i: addr,
        ..*state
    }
}

/// PC = V0 + addr
pub fn jumpi(state: &State, addr: u16) -> State {
    State {
        pc: u16::from(state.v[0x0]) + addr,
        ..*state
    }
}

/// Vx = rand_byte & kk
/// The random byte is never 0.
pub fn rand(state: &State, x: u8, kk: u8) -> State {
    let rand_byte: u8 = rand::thread_rng().gen_range(1..=255);
    let mut v = state.v;
    v[x as usize] = rand_byte & kk;
    State {
        pc: state.pc + 0x2,
        v,
        ..*state
    }
}

/// draw_sprite(x=Vx y=Vy size=n)
/// XORs a sprite from memory I..I+n at position Vx, Vy on the FrameBuffer with wrapping.
/// Sets VF if any pixels are erased.
pub fn draw(op: Opcode, state: &State, x: u8, y: u8, n: u8) -> Result<State, Fault> {
    let sprite = &state.memory[state.span(state.i as usize, n as usize, op.0)?];
    let mut v = state.v;
    let mut frame_buffer = state.frame_buffer;

    // Reset the carry flag (used for collision detection)
    v[0xF] = 0x0;

    for (row, byte) in sprite.iter().enumerate() {
        let py = (state.v[y as usize] as usize + row) % DISPLAY_HEIGHT;
        for bit in 0..8 {
            let px = (state.v[x as usize] as usize + bit) % DISPLAY_WIDTH;
            let pixel = (byte >> (7 - bit)) & 0x1;
            v[0xF] |= pixel & frame_buffer[py][px];
            frame_buffer[py][px] ^= pixel;
        }
    }

    Ok(State {
        pc: state.pc + 0x2,
        draw_flag: true,
        v,
        frame_buffer,
        ..*state
    })
}

/// Vx = DT
pub fn moved(state: &State, x: u8) -> State {
    let mut v = state.v;
    v[x as usize] = state.delay_timer;
    State {
        pc: state.pc + 0x2,
        v,
        ..*state
    }
}

/// Vx = first pressed key
/// Returns None while no key is pressed so the instruction can be retried next cycle.
pub fn keyd(state: &State, x: u8) -> Option<State> {
    let key = state.keys.iter().position(|&pressed| pressed)?;
    let mut v = state.v;
    v[x as usize] = key as u8;
    Some(State {
        pc: state.pc + 0x2,
        v,
        ..*state
    })
}

/// DT = Vx
pub fn loadd(state: &State, x: u8) -> State {
    State {
        pc: state.pc + 0x2,
        delay_timer: state.v[x as usize],
        ..*state
    }
}

/// ST = Vx
pub fn loads(state: &State, x: u8) -> State {
    State {
        pc: state.pc + 0x2,
        sound_timer: state.v[x as usize],
        ..*state
    }
}

/// I += Vx
/// VF is untouched.
pub fn addi(state: &State, x: u8) -> State {
    State {
        pc: state.pc + 0x2,
        i: state.i.wrapping_add(u16::from(state.v[x as usize])),
        ..*state
    }
}

/// I = Vx * 5
/// Set I to the memory address of the sprite for Vx
/// See constants::SPRITE_SHEET for more details
pub fn ldspr(state: &State, x: u8) -> State {
    State {
        pc: state.pc + 0x2,
        i: u16::from(state.v[x as usize]) * SPRITE_SIZE,
        ..*state
    }
}

/// mem[I..I+3] = bcd(Vx)
/// Store BCD repr of Vx in memory starting at address I
pub fn bcd(op: Opcode, state: &State, x: u8) -> Result<State, Fault> {
    let vx = state.v[x as usize];
    let mut memory = state.memory;
    memory[state.span(state.i as usize, 3, op.0)?].copy_from_slice(&[vx / 100, vx / 10 % 10, vx % 10]);
    Ok(State {
        pc: state.pc + 0x2,
        memory,
        ..*state
    })
}

/// mem[I..=I+x] = V0..=Vx
/// I is left unchanged.
pub fn stor(op: Opcode, state: &State, x: u8) -> Result<State, Fault> {
    let count = x as usize + 1;
    let mut memory = state.memory;
    memory[state.span(state.i as usize, count, op.0)?].copy_from_slice(&state.v[..count]);
    Ok(State {
        pc: state.pc + 0x2,
        memory,
        ..*state
    })
}

/// V0..=Vx = mem[I..=I+x]
/// I is left unchanged.
pub fn read(op: Opcode, state: &State, x: u8) -> Result<State, Fault> {
    let count = x as usize + 1;
    let mut v = state.v;
    v[..count].copy_from_slice(&state.memory[state.span(state.i as usize, count, op.0)?]);
    Ok(State {
        pc: state.pc + 0x2,
        v,
        ..*state
    })
}
