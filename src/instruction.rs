use std::fmt;

use crate::error::Fault;
use crate::opcode::Opcode;
use crate::operations::*;
use crate::state::State;

/// A decoded Chip-8 instruction with its operands.
///
/// `x` and `y` name registers, `kk` is an 8-bit immediate, `addr` a 12-bit address and `n`
/// the height of a sprite.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0
    Clear,
    /// 00EE
    Return,
    /// 1nnn
    Jump { addr: u16 },
    /// 2nnn
    Call { addr: u16 },
    /// 3xkk
    SkipEqualImmediate { x: u8, kk: u8 },
    /// 4xkk
    SkipNotEqualImmediate { x: u8, kk: u8 },
    /// 5xy0
    SkipEqualRegister { x: u8, y: u8 },
    /// 6xkk
    LoadImmediate { x: u8, kk: u8 },
    /// 7xkk
    AddImmediate { x: u8, kk: u8 },
    /// 8xy0
    Move { x: u8, y: u8 },
    /// 8xy1
    Or { x: u8, y: u8 },
    /// 8xy2
    And { x: u8, y: u8 },
    /// 8xy3
    Xor { x: u8, y: u8 },
    /// 8xy4
    AddRegister { x: u8, y: u8 },
    /// 8xy5
    Sub { x: u8, y: u8 },
    /// 8xy6
    ShiftRight { x: u8 },
    /// 8xy7
    SubN { x: u8, y: u8 },
    /// 8xyE
    ShiftLeft { x: u8 },
    /// 9xy0
    SkipNotEqualRegister { x: u8, y: u8 },
    /// Annn
    LoadIndex { addr: u16 },
    /// Bnnn
    JumpOffset { addr: u16 },
    /// Cxkk
    Random { x: u8, kk: u8 },
    /// Dxyn
    Draw { x: u8, y: u8, n: u8 },
    /// Ex9E
    SkipPressed { x: u8 },
    /// ExA1
    SkipNotPressed { x: u8 },
    /// Fx07
    LoadDelay { x: u8 },
    /// Fx0A
    WaitKey { x: u8 },
    /// Fx15
    SetDelay { x: u8 },
    /// Fx18
    SetSound { x: u8 },
    /// Fx1E
    AddIndex { x: u8 },
    /// Fx29
    LoadSprite { x: u8 },
    /// Fx33
    StoreBcd { x: u8 },
    /// Fx55
    StoreRegisters { x: u8 },
    /// Fx65
    LoadRegisters { x: u8 },
    /// Anything else; executed as a no-op
    Unknown(Opcode),
}

/// The result of executing a single instruction
#[derive(Debug, PartialEq, Eq)]
pub enum Execution {
    /// The instruction completed and produced the next state
    Next(State),
    /// Fx0A found no pressed key; the state is unchanged and the instruction must be retried
    AwaitingKey(u8),
}

impl Instruction {
    /// Selects the correct Instruction for a given Opcode
    pub fn decode(op: Opcode) -> Self {
        use Instruction::*;

        let (x, y, kk, addr) = (op.x(), op.y(), op.kk(), op.addr());
        match op.nibbles() {
            (0x0, 0x0, 0xE, 0x0) => Clear,
            (0x0, 0x0, 0xE, 0xE) => Return,
            (0x1, ..) => Jump { addr },
            (0x2, ..) => Call { addr },
            (0x3, ..) => SkipEqualImmediate { x, kk },
            (0x4, ..) => SkipNotEqualImmediate { x, kk },
            (0x5, .., 0x0) => SkipEqualRegister { x, y },
            (0x6, ..) => LoadImmediate { x, kk },
            (0x7, ..) => AddImmediate { x, kk },
            (0x8, .., 0x0) => Move { x, y },
            (0x8, .., 0x1) => Or { x, y },
            (0x8, .., 0x2) => And { x, y },
            (0x8, .., 0x3) => Xor { x, y },
            (0x8, .., 0x4) => AddRegister { x, y },
            (0x8, .., 0x5) => Sub { x, y },
            (0x8, .., 0x6) => ShiftRight { x },
            (0x8, .., 0x7) => SubN { x, y },
            (0x8, .., 0xE) => ShiftLeft { x },
            (0x9, .., 0x0) => SkipNotEqualRegister { x, y },
            (0xA, ..) => LoadIndex { addr },
            (0xB, ..) => JumpOffset { addr },
            (0xC, ..) => Random { x, kk },
            (0xD, _, _, n) => Draw { x, y, n },
            (0xE, _, 0x9, 0xE) => SkipPressed { x },
            (0xE, _, 0xA, 0x1) => SkipNotPressed { x },
            (0xF, _, 0x0, 0x7) => LoadDelay { x },
            (0xF, _, 0x0, 0xA) => WaitKey { x },
            (0xF, _, 0x1, 0x5) => SetDelay { x },
            (0xF, _, 0x1, 0x8) => SetSound { x },
            (0xF, _, 0x1, 0xE) => AddIndex { x },
            (0xF, _, 0x2, 0x9) => LoadSprite { x },
            (0xF, _, 0x3, 0x3) => StoreBcd { x },
            (0xF, _, 0x5, 0x5) => StoreRegisters { x },
            (0xF, _, 0x6, 0x5) => LoadRegisters { x },
            _ => Unknown(op),
        }
    }

    /// Executes the instruction against `state`, which is left untouched.
    ///
    /// `op` is the raw opcode the instruction was decoded from and is only used to report faults.
    pub fn execute(self, op: Opcode, state: &State) -> Result<Execution, Fault> {
        use Instruction::*;

        let next = match self {
            Clear => clr(state),
            Return => rts(state)?,
            Jump { addr } => jump(state, addr),
            Call { addr } => call(state, addr)?,
            SkipEqualImmediate { x, kk } => skip_if(state, state.v[x as usize] == kk),
            SkipNotEqualImmediate { x, kk } => skip_if(state, state.v[x as usize] != kk),
            SkipEqualRegister { x, y } => skip_if(state, state.v[x as usize] == state.v[y as usize]),
            LoadImmediate { x, kk } => load(state, x, kk),
            AddImmediate { x, kk } => add(state, x, kk),
            Move { x, y } => mv(state, x, y),
            Or { x, y } => or(state, x, y),
            And { x, y } => and(state, x, y),
            Xor { x, y } => xor(state, x, y),
            AddRegister { x, y } => addr(state, x, y),
            Sub { x, y } => sub(state, x, y),
            ShiftRight { x } => shr(state, x),
            SubN { x, y } => subn(state, x, y),
            ShiftLeft { x } => shl(state, x),
            SkipNotEqualRegister { x, y } => {
                skip_if(state, state.v[x as usize] != state.v[y as usize])
            }
            LoadIndex { addr } => loadi(state, addr),
            JumpOffset { addr } => jumpi(state, addr),
            Random { x, kk } => rand(state, x, kk),
            Draw { x, y, n } => draw(op, state, x, y, n)?,
            SkipPressed { x } => skip_if(state, state.is_pressed(state.v[x as usize])),
            SkipNotPressed { x } => skip_if(state, !state.is_pressed(state.v[x as usize])),
            LoadDelay { x } => moved(state, x),
            WaitKey { x } => match keyd(state, x) {
                Some(next) => next,
                None => return Ok(Execution::AwaitingKey(x)),
            },
            SetDelay { x } => loadd(state, x),
            SetSound { x } => loads(state, x),
            AddIndex { x } => addi(state, x),
            LoadSprite { x } => ldspr(state, x),
            StoreBcd { x } => bcd(op, state, x)?,
            StoreRegisters { x } => stor(op, state, x)?,
            LoadRegisters { x } => read(op, state, x)?,
            Unknown(_) => skip_if(state, false),
        };
        Ok(Execution::Next(next))
    }
}

/// Formats the instruction as assembly, e.g. `ADD V1, V2`
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;

        match *self {
            Clear => write!(f, "CLS"),
            Return => write!(f, "RET"),
            Jump { addr } => write!(f, "JP {:#05X}", addr),
            Call { addr } => write!(f, "CALL {:#05X}", addr),
            SkipEqualImmediate { x, kk } => write!(f, "SE V{:X}, {:#04X}", x, kk),
            SkipNotEqualImmediate { x, kk } => write!(f, "SNE V{:X}, {:#04X}", x, kk),
            SkipEqualRegister { x, y } => write!(f, "SE V{:X}, V{:X}", x, y),
            LoadImmediate { x, kk } => write!(f, "LD V{:X}, {:#04X}", x, kk),
            AddImmediate { x, kk } => write!(f, "ADD V{:X}, {:#04X}", x, kk),
            Move { x, y } => write!(f, "LD V{:X}, V{:X}", x, y),
            Or { x, y } => write!(f, "OR V{:X}, V{:X}", x, y),
            And { x, y } => write!(f, "AND V{:X}, V{:X}", x, y),
            Xor { x, y } => write!(f, "XOR V{:X}, V{:X}", x, y),
            AddRegister { x, y } => write!(f, "ADD V{:X}, V{:X}", x, y),
            Sub { x, y } => write!(f, "SUB V{:X}, V{:X}", x, y),
            ShiftRight { x } => write!(f, "SHR V{:X}", x),
            SubN { x, y } => write!(f, "SUBN V{:X}, V{:X}", x, y),
            ShiftLeft { x } => write!(f, "SHL V{:X}", x),
            SkipNotEqualRegister { x, y } => write!(f, "SNE V{:X}, V{:X}", x, y),
            LoadIndex { addr } => write!(f, "LD I, {:#05X}", addr),
            JumpOffset { addr } => write!(f, "JP V0, {:#05X}", addr),
            Random { x, kk } => write!(f, "RND V{:X}, {:#04X}", x, kk),
            Draw { x, y, n } => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            SkipPressed { x } => write!(f, "SKP V{:X}", x),
            SkipNotPressed { x } => write!(f, "SKNP V{:X}", x),
            LoadDelay { x } => write!(f, "LD V{:X}, DT", x),
            WaitKey { x } => write!(f, "LD V{:X}, K", x),
            SetDelay { x } => write!(f, "LD DT, V{:X}", x),
            SetSound { x } => write!(f, "LD ST, V{:X}", x),
            AddIndex { x } => write!(f, "ADD I, V{:X}", x),
            LoadSprite { x } => write!(f, "LD F, V{:X}", x),
            StoreBcd { x } => write!(f, "LD B, V{:X}", x),
            StoreRegisters { x } => write!(f, "LD [I], V{:X}", x),
            LoadRegisters { x } => write!(f, "LD V{:X}, [I]", x),
            Unknown(op) => write!(f, "??? {}", op),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Instruction::*;

    fn decode(word: u16) -> Instruction {
        Instruction::decode(Opcode(word))
    }

    #[test]
    fn test_decodes_family_0() {
        assert_eq!(decode(0x00E0), Clear);
        assert_eq!(decode(0x00EE), Return);
        // SYS addr is not supported
        assert_eq!(decode(0x0123), Unknown(Opcode(0x0123)));
        assert_eq!(decode(0x00E1), Unknown(Opcode(0x00E1)));
    }

    #[test]
    fn test_decodes_addresses() {
        assert_eq!(decode(0x1ABC), Jump { addr: 0xABC });
        assert_eq!(decode(0x2ABC), Call { addr: 0xABC });
        assert_eq!(decode(0xAABC), LoadIndex { addr: 0xABC });
        assert_eq!(decode(0xBABC), JumpOffset { addr: 0xABC });
    }

    #[test]
    fn test_decodes_immediates() {
        assert_eq!(decode(0x3122), SkipEqualImmediate { x: 1, kk: 0x22 });
        assert_eq!(decode(0x4122), SkipNotEqualImmediate { x: 1, kk: 0x22 });
        assert_eq!(decode(0x6A22), LoadImmediate { x: 0xA, kk: 0x22 });
        assert_eq!(decode(0x7A22), AddImmediate { x: 0xA, kk: 0x22 });
        assert_eq!(decode(0xC3F0), Random { x: 3, kk: 0xF0 });
    }

    #[test]
    fn test_register_compares_require_zero_low_nibble() {
        assert_eq!(decode(0x5120), SkipEqualRegister { x: 1, y: 2 });
        assert_eq!(decode(0x9120), SkipNotEqualRegister { x: 1, y: 2 });
        assert_eq!(decode(0x5121), Unknown(Opcode(0x5121)));
        assert_eq!(decode(0x912F), Unknown(Opcode(0x912F)));
    }

    #[test]
    fn test_decodes_alu_family() {
        assert_eq!(decode(0x8120), Move { x: 1, y: 2 });
        assert_eq!(decode(0x8121), Or { x: 1, y: 2 });
        assert_eq!(decode(0x8122), And { x: 1, y: 2 });
        assert_eq!(decode(0x8123), Xor { x: 1, y: 2 });
        assert_eq!(decode(0x8124), AddRegister { x: 1, y: 2 });
        assert_eq!(decode(0x8125), Sub { x: 1, y: 2 });
        assert_eq!(decode(0x8126), ShiftRight { x: 1 });
        assert_eq!(decode(0x8127), SubN { x: 1, y: 2 });
        assert_eq!(decode(0x812E), ShiftLeft { x: 1 });
        for n in [0x8, 0x9, 0xA, 0xB, 0xC, 0xD, 0xF] {
            let word = 0x8120 | n;
            assert_eq!(decode(word), Unknown(Opcode(word)));
        }
    }

    #[test]
    fn test_decodes_draw() {
        assert_eq!(decode(0xD12F), Draw { x: 1, y: 2, n: 0xF });
    }

    #[test]
    fn test_decodes_key_family() {
        assert_eq!(decode(0xE59E), SkipPressed { x: 5 });
        assert_eq!(decode(0xE5A1), SkipNotPressed { x: 5 });
        assert_eq!(decode(0xE5A2), Unknown(Opcode(0xE5A2)));
    }

    #[test]
    fn test_decodes_misc_family() {
        assert_eq!(decode(0xF507), LoadDelay { x: 5 });
        assert_eq!(decode(0xF50A), WaitKey { x: 5 });
        assert_eq!(decode(0xF515), SetDelay { x: 5 });
        assert_eq!(decode(0xF518), SetSound { x: 5 });
        assert_eq!(decode(0xF51E), AddIndex { x: 5 });
        assert_eq!(decode(0xF529), LoadSprite { x: 5 });
        assert_eq!(decode(0xF533), StoreBcd { x: 5 });
        assert_eq!(decode(0xF555), StoreRegisters { x: 5 });
        assert_eq!(decode(0xF565), LoadRegisters { x: 5 });
        assert_eq!(decode(0xF566), Unknown(Opcode(0xF566)));
    }

    #[test]
    fn test_displays_as_assembly() {
        assert_eq!(decode(0x00E0).to_string(), "CLS");
        assert_eq!(decode(0x8124).to_string(), "ADD V1, V2");
        assert_eq!(decode(0xA2F0).to_string(), "LD I, 0x2F0");
        assert_eq!(decode(0xD015).to_string(), "DRW V0, V1, 5");
        assert_eq!(decode(0xFFFF).to_string(), "??? FFFF");
    }

    #[test]
    fn test_unknown_executes_as_noop() {
        let state = State::new();
        let op = Opcode(0xE5A2);
        match decode(op.0).execute(op, &state) {
            Ok(Execution::Next(next)) => {
                assert_eq!(next.pc, 0x202);
                assert_eq!(next.v, state.v);
                assert_eq!(next.memory[..], state.memory[..]);
            }
            other => panic!("unexpected execution {:?}", other),
        }
    }

    #[test]
    fn test_wait_key_without_keys_awaits() {
        let state = State::new();
        let op = Opcode(0xF30A);
        assert_eq!(
            decode(op.0).execute(op, &state),
            Ok(Execution::AwaitingKey(3))
        );
    }
}
