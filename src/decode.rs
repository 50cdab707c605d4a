use std::fmt;

use crate::error::{Result, VmError};
use crate::memory::TypeAddr;

#[derive(Debug, Clone, Copy)]
pub struct RawInstruction {
    code: u16,
}

impl RawInstruction {
    pub fn new(code: u16) -> Self {
        RawInstruction { code }
    }

    // n is starting digit, m is length
    pub fn nth_m_digits(&self, n: u8, m: u8) -> u16 {
        // 0110 1100 1111 0001
        // -------------------
        // 1111 1111 1111 1111
        //      1111 1111 1111
        //           1111 1111
        //                1111
        let shift_places = (4 - m - (n - 1)) * 4;
        let mask = (1u32 << (m * 4)) - 1;
        (self.code >> shift_places) & mask as u16
    }

    pub fn group(&self) -> u8 {
        self.nth_m_digits(1, 1) as u8
    }

    pub fn x(&self) -> u8 {
        self.nth_m_digits(2, 1) as u8
    }

    pub fn y(&self) -> u8 {
        self.nth_m_digits(3, 1) as u8
    }

    pub fn n(&self) -> u8 {
        self.nth_m_digits(4, 1) as u8
    }

    pub fn nn(&self) -> u8 {
        self.nth_m_digits(3, 2) as u8
    }

    pub fn nnn(&self) -> TypeAddr {
        self.nth_m_digits(2, 3)
    }
}

#[test]
fn test_bit_manip() {
    assert_eq!(RawInstruction::new(0x4CEE).nth_m_digits(2, 1), 0xC);
    assert_eq!(RawInstruction::new(0x4CEE).nth_m_digits(3, 1), 0xE);
    assert_eq!(RawInstruction::new(0x4CEE).nth_m_digits(1, 1), 0x4);

    assert_eq!(RawInstruction::new(0x4CEE).nth_m_digits(1, 2), 0x4C);
    assert_eq!(RawInstruction::new(0x4CEE).nth_m_digits(2, 2), 0xCE);
    assert_eq!(RawInstruction::new(0x4CEE).nth_m_digits(2, 3), 0xCEE);
    assert_eq!(RawInstruction::new(0x4CEE).nth_m_digits(1, 4), 0x4CEE);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpCodes {
    // 00E0
    // turn all pixels to 0
    ClearScreen,
    // 1NNN
    // set PC to address NNN, "jump" to memory location
    Jump(TypeAddr),
    // 6XNN
    // set register VX to value NN
    SetRegister(u8, u8),
    // 7XNN
    // add value NN to VX, no carry
    AddToRegister(u8, u8),
    // ANNN
    // set index register I to address NNN
    SetIndexRegister(TypeAddr),
    // DXYN (hardest)
    // draw an N pixel tall sprite starting at I
    // at Coordinates (VX, VY)
    // XOR pixels on screen using sprite data
    // if pixels on screen were switched OFF: VF set to 1
    Display(u8, u8, u8),

    // 2NNN
    PushSubroutine(TypeAddr),
    // 00EE
    PopSubroutine,

    // 3XNN
    SkipEqualConstant(u8, u8),
    // 4XNN
    SkipNotEqualConstant(u8, u8),
    // 5XY0
    SkipEqualRegister(u8, u8),
    // 9XY0
    SkipNotEqualRegister(u8, u8),

    // 8XY0
    CopyRegister(u8, u8),
    // 8XY1
    Or(u8, u8),
    // 8XY2
    And(u8, u8),
    // 8XY3
    XOr(u8, u8),
    /// 8XY4
    Add(u8, u8),
    // 8XY5
    SubtractForward(u8, u8),
    // 8XY7
    SubtractBackward(u8, u8),
    // 8XYE
    LeftShift(u8, u8),
    // 8XY6
    RightShift(u8, u8),

    // BNNN
    JumpWithOffset(TypeAddr),
    // CXNN
    Random(u8, u8),

    // EX9E
    SkipIfPressed(u8),
    // EXA1
    SkipIfNotPressed(u8),

    // FX07
    CopyDelayToRegister(u8),
    // FX15
    CopyRegisterToDelay(u8),
    // FX18
    CopyRegisterToSound(u8),

    // FX1E
    AddToIndex(u8),
    // FX0A
    GetKey(u8),
    // FX29
    PointChar(u8),
    // FX33
    ToDecimal(u8),

    // FX65
    LoadRegisterFromMemory(u8),
    // FX55
    StoreRegisterToMemory(u8),
}

impl OpCodes {
    pub fn decode_raw(ins: u16) -> Result<Self> {
        let raw = RawInstruction::new(ins);
        let (x, y) = (raw.x(), raw.y());

        let op = match raw.group() {
            // 0x0 and 0xE only look at the low nibble
            0x0 => match raw.n() {
                0x0 => Self::ClearScreen,
                0xE => Self::PopSubroutine,
                _ => return Err(VmError::UnrecognizedInstruction(ins)),
            },
            0x1 => Self::Jump(raw.nnn()),
            0x2 => Self::PushSubroutine(raw.nnn()),
            0x3 => Self::SkipEqualConstant(x, raw.nn()),
            0x4 => Self::SkipNotEqualConstant(x, raw.nn()),
            0x5 => Self::SkipEqualRegister(x, y),
            0x6 => Self::SetRegister(x, raw.nn()),
            0x7 => Self::AddToRegister(x, raw.nn()),
            0x8 => match raw.n() {
                0x0 => Self::CopyRegister(x, y),
                0x1 => Self::Or(x, y),
                0x2 => Self::And(x, y),
                0x3 => Self::XOr(x, y),
                0x4 => Self::Add(x, y),
                0x5 => Self::SubtractForward(x, y),
                0x6 => Self::RightShift(x, y),
                0x7 => Self::SubtractBackward(x, y),
                0xE => Self::LeftShift(x, y),
                _ => return Err(VmError::UnrecognizedInstruction(ins)),
            },
            0x9 => Self::SkipNotEqualRegister(x, y),
            0xA => Self::SetIndexRegister(raw.nnn()),
            0xB => Self::JumpWithOffset(raw.nnn()),
            0xC => Self::Random(x, raw.nn()),
            0xD => Self::Display(x, y, raw.n()),
            0xE => match raw.n() {
                0xE => Self::SkipIfPressed(x),
                0x1 => Self::SkipIfNotPressed(x),
                _ => return Err(VmError::UnrecognizedInstruction(ins)),
            },
            0xF => match raw.nn() {
                0x07 => Self::CopyDelayToRegister(x),
                0x0A => Self::GetKey(x),
                0x15 => Self::CopyRegisterToDelay(x),
                0x18 => Self::CopyRegisterToSound(x),
                0x1E => Self::AddToIndex(x),
                0x29 => Self::PointChar(x),
                0x33 => Self::ToDecimal(x),
                0x55 => Self::StoreRegisterToMemory(x),
                0x65 => Self::LoadRegisterFromMemory(x),
                _ => return Err(VmError::UnrecognizedInstruction(ins)),
            },
            _ => return Err(VmError::UnrecognizedInstruction(ins)),
        };
        Ok(op)
    }
}

// Cowgod-style mnemonics, used for trace output.
impl fmt::Display for OpCodes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::ClearScreen => write!(f, "CLS"),
            Self::PopSubroutine => write!(f, "RET"),
            Self::Jump(addr) => write!(f, "JP {addr:#05X}"),
            Self::PushSubroutine(addr) => write!(f, "CALL {addr:#05X}"),
            Self::SkipEqualConstant(x, nn) => write!(f, "SE V{x:X}, {nn:#04X}"),
            Self::SkipNotEqualConstant(x, nn) => write!(f, "SNE V{x:X}, {nn:#04X}"),
            Self::SkipEqualRegister(x, y) => write!(f, "SE V{x:X}, V{y:X}"),
            Self::SetRegister(x, nn) => write!(f, "LD V{x:X}, {nn:#04X}"),
            Self::AddToRegister(x, nn) => write!(f, "ADD V{x:X}, {nn:#04X}"),
            Self::CopyRegister(x, y) => write!(f, "LD V{x:X}, V{y:X}"),
            Self::Or(x, y) => write!(f, "OR V{x:X}, V{y:X}"),
            Self::And(x, y) => write!(f, "AND V{x:X}, V{y:X}"),
            Self::XOr(x, y) => write!(f, "XOR V{x:X}, V{y:X}"),
            Self::Add(x, y) => write!(f, "ADD V{x:X}, V{y:X}"),
            Self::SubtractForward(x, y) => write!(f, "SUB V{x:X}, V{y:X}"),
            Self::RightShift(x, _) => write!(f, "SHR V{x:X}"),
            Self::SubtractBackward(x, y) => write!(f, "SUBN V{x:X}, V{y:X}"),
            Self::LeftShift(x, _) => write!(f, "SHL V{x:X}"),
            Self::SkipNotEqualRegister(x, y) => write!(f, "SNE V{x:X}, V{y:X}"),
            Self::SetIndexRegister(addr) => write!(f, "LD I, {addr:#05X}"),
            Self::JumpWithOffset(addr) => write!(f, "JP V0, {addr:#05X}"),
            Self::Random(x, nn) => write!(f, "RND V{x:X}, {nn:#04X}"),
            Self::Display(x, y, n) => write!(f, "DRW V{x:X}, V{y:X}, {n}"),
            Self::SkipIfPressed(x) => write!(f, "SKP V{x:X}"),
            Self::SkipIfNotPressed(x) => write!(f, "SKNP V{x:X}"),
            Self::CopyDelayToRegister(x) => write!(f, "LD V{x:X}, DT"),
            Self::GetKey(x) => write!(f, "LD V{x:X}, K"),
            Self::CopyRegisterToDelay(x) => write!(f, "LD DT, V{x:X}"),
            Self::CopyRegisterToSound(x) => write!(f, "LD ST, V{x:X}"),
            Self::AddToIndex(x) => write!(f, "ADD I, V{x:X}"),
            Self::PointChar(x) => write!(f, "LD F, V{x:X}"),
            Self::ToDecimal(x) => write!(f, "LD B, V{x:X}"),
            Self::StoreRegisterToMemory(x) => write!(f, "LD [I], V{x:X}"),
            Self::LoadRegisterFromMemory(x) => write!(f, "LD V{x:X}, [I]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_every_group() {
        let cases = [
            (0x00E0, OpCodes::ClearScreen),
            (0x00EE, OpCodes::PopSubroutine),
            (0x1ABC, OpCodes::Jump(0xABC)),
            (0x2ABC, OpCodes::PushSubroutine(0xABC)),
            (0x31FF, OpCodes::SkipEqualConstant(1, 0xFF)),
            (0x4210, OpCodes::SkipNotEqualConstant(2, 0x10)),
            (0x5340, OpCodes::SkipEqualRegister(3, 4)),
            (0x6A42, OpCodes::SetRegister(0xA, 0x42)),
            (0x7B01, OpCodes::AddToRegister(0xB, 0x01)),
            (0x8120, OpCodes::CopyRegister(1, 2)),
            (0x8121, OpCodes::Or(1, 2)),
            (0x8122, OpCodes::And(1, 2)),
            (0x8123, OpCodes::XOr(1, 2)),
            (0x8124, OpCodes::Add(1, 2)),
            (0x8125, OpCodes::SubtractForward(1, 2)),
            (0x8126, OpCodes::RightShift(1, 2)),
            (0x8127, OpCodes::SubtractBackward(1, 2)),
            (0x812E, OpCodes::LeftShift(1, 2)),
            (0x9560, OpCodes::SkipNotEqualRegister(5, 6)),
            (0xA123, OpCodes::SetIndexRegister(0x123)),
            (0xB300, OpCodes::JumpWithOffset(0x300)),
            (0xC70F, OpCodes::Random(7, 0x0F)),
            (0xD125, OpCodes::Display(1, 2, 5)),
            (0xE39E, OpCodes::SkipIfPressed(3)),
            (0xE3A1, OpCodes::SkipIfNotPressed(3)),
            (0xF407, OpCodes::CopyDelayToRegister(4)),
            (0xF40A, OpCodes::GetKey(4)),
            (0xF415, OpCodes::CopyRegisterToDelay(4)),
            (0xF418, OpCodes::CopyRegisterToSound(4)),
            (0xF41E, OpCodes::AddToIndex(4)),
            (0xF429, OpCodes::PointChar(4)),
            (0xF433, OpCodes::ToDecimal(4)),
            (0xF455, OpCodes::StoreRegisterToMemory(4)),
            (0xF465, OpCodes::LoadRegisterFromMemory(4)),
        ];
        for (word, expected) in cases {
            assert_eq!(OpCodes::decode_raw(word), Ok(expected), "{word:04X}");
        }
    }

    #[test]
    fn rejects_unknown_words() {
        for word in [
            0x0123, 0x00E1, 0x00EF, 0x8128, 0x812F, 0xE19F, 0xE1A0, 0xF100, 0xFFFF,
        ] {
            assert_eq!(
                OpCodes::decode_raw(word),
                Err(VmError::UnrecognizedInstruction(word))
            );
        }
    }

    #[test]
    fn loose_words_decode_by_nibble() {
        let cases = [
            (0x0000, OpCodes::ClearScreen),
            (0x00F0, OpCodes::ClearScreen),
            (0x012E, OpCodes::PopSubroutine),
            (0x5121, OpCodes::SkipEqualRegister(1, 2)),
            (0x912F, OpCodes::SkipNotEqualRegister(1, 2)),
            (0xE10E, OpCodes::SkipIfPressed(1)),
            (0xE2B1, OpCodes::SkipIfNotPressed(2)),
        ];
        for (word, expected) in cases {
            assert_eq!(OpCodes::decode_raw(word), Ok(expected), "{word:04X}");
        }
    }

    #[test]
    fn mnemonics() {
        assert_eq!(OpCodes::Display(1, 2, 5).to_string(), "DRW V1, V2, 5");
        assert_eq!(OpCodes::Jump(0x2AE).to_string(), "JP 0x2AE");
        assert_eq!(OpCodes::SetRegister(0xA, 0x42).to_string(), "LD VA, 0x42");
    }
}
