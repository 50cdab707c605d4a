use crate::error::{Result, VmError};
use crate::registers::{IndexRegister, ProgramCounter};

pub type TypeAddr = u16; // in reality u12
type FontBytes = [u8; 5 * 16];

pub const MEMORY_SIZE: usize = 4096;
pub const FONT_START: TypeAddr = 0x000;
pub const PROGRAM_START: TypeAddr = 0x200;
pub const MAX_ROM_SIZE: usize = MEMORY_SIZE - PROGRAM_START as usize;
pub const STACK_DEPTH: usize = 16;

// bytes per glyph
pub const GLYPH_SIZE: u16 = 5;

const DEFAULT_FONT: FontBytes = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

struct Font {
    data: FontBytes,
}

impl Default for Font {
    fn default() -> Self {
        Self { data: DEFAULT_FONT }
    }
}

pub struct Memory {
    // 4k bytes
    // font data stored from 000 -> 04F, programs from 200
    bytes: [u8; MEMORY_SIZE],
    pub pc: ProgramCounter,
    pub index: IndexRegister,
    font: Font,
    pub stack: Stack,
    program: Vec<u8>,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory {
    pub fn new() -> Self {
        let mut mem = Self {
            bytes: [0; MEMORY_SIZE],
            pc: ProgramCounter(PROGRAM_START),
            index: IndexRegister(0x0),
            stack: Stack::new(),
            font: Font::default(),
            program: vec![],
        };
        mem.load_font();
        mem
    }

    fn load_font(&mut self) {
        let start_index = FONT_START as usize;
        self.bytes[start_index..start_index + self.font.data.len()]
            .copy_from_slice(&self.font.data);
    }

    pub fn set(&mut self, addr: TypeAddr, val: u8) -> Result<()> {
        let cell = self
            .bytes
            .get_mut(addr as usize)
            .ok_or(VmError::AddressOutOfRange(addr))?;
        *cell = val;
        Ok(())
    }

    pub fn get(&self, addr: TypeAddr) -> Result<u8> {
        self.bytes
            .get(addr as usize)
            .copied()
            .ok_or(VmError::AddressOutOfRange(addr))
    }

    /// `len` bytes starting at `addr`, or the first address past the end.
    pub fn slice(&self, addr: TypeAddr, len: usize) -> Result<&[u8]> {
        let start = addr as usize;
        let end = start + len;
        if end > MEMORY_SIZE {
            let first_bad = start.max(MEMORY_SIZE);
            return Err(VmError::AddressOutOfRange(first_bad as TypeAddr));
        }
        Ok(&self.bytes[start..end])
    }

    /// Checks that `len` bytes from `addr` are writable without touching any.
    pub fn check_range(&self, addr: TypeAddr, len: usize) -> Result<()> {
        self.slice(addr, len).map(|_| ())
    }

    pub fn increment_pc(&mut self) {
        self.pc.increment();
    }

    pub fn decrement_pc(&mut self) {
        if self.pc.0 == 0 {
            return;
        }
        self.pc.decrement();
    }

    /// Reads the big-endian word at PC and moves PC past it.
    pub fn next_instruction(&mut self) -> Result<u16> {
        let word = self.word_at(self.pc.0)?;
        self.increment_pc();
        Ok(word)
    }

    pub fn word_at(&self, addr: TypeAddr) -> Result<u16> {
        let (l, r) = (self.get(addr)?, self.get(addr.wrapping_add(1))?);
        Ok(((l as u16) << 8) | r as u16)
    }

    /// Instruction words from PC - 10 up to PC + 10, skipping anything
    /// outside memory.
    pub fn words_around(&self, addr: TypeAddr) -> Vec<u16> {
        let start = addr as i32 - 10;
        (0..10)
            .map(|n| start + n * 2)
            .filter(|a| *a >= 0)
            .filter_map(|a| self.word_at(a as TypeAddr).ok())
            .collect()
    }

    pub fn set_pc(&mut self, addr: TypeAddr) {
        self.pc.set_addr(addr);
    }

    pub fn set_index(&mut self, addr: TypeAddr) {
        self.index.set_addr(addr);
    }

    // loads program instructions starting at address 0x200
    pub fn load_rom(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.len() > MAX_ROM_SIZE {
            return Err(VmError::RomTooLarge {
                size: bytes.len(),
                max: MAX_ROM_SIZE,
            });
        }
        let start_index = PROGRAM_START as usize;
        // nothing of an earlier program survives above the new one
        self.bytes[start_index..].fill(0);
        self.bytes[start_index..start_index + bytes.len()].copy_from_slice(bytes);
        self.program = bytes.to_vec();
        log::debug!("loaded {} byte program at {:#05x}", bytes.len(), start_index);
        Ok(())
    }

    pub fn rom_len(&self) -> usize {
        self.program.len()
    }

    /// Back to the power-on layout, with the last loaded program in place.
    pub fn reset(&mut self) -> Result<()> {
        let program = std::mem::take(&mut self.program);
        *self = Self::new();
        self.load_rom(&program)
    }
}

/// Return addresses for CALL/RET, at most [`STACK_DEPTH`] deep.
pub struct Stack {
    addresses: [TypeAddr; STACK_DEPTH],
    sp: usize,
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}

impl Stack {
    pub fn new() -> Self {
        Self {
            addresses: [0; STACK_DEPTH],
            sp: 0,
        }
    }

    pub fn push(&mut self, addr: TypeAddr) -> Result<()> {
        let slot = self
            .addresses
            .get_mut(self.sp)
            .ok_or(VmError::StackOverflow)?;
        *slot = addr;
        self.sp += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Result<TypeAddr> {
        if self.sp == 0 {
            return Err(VmError::StackUnderflow);
        }
        self.sp -= 1;
        Ok(self.addresses[self.sp])
    }

    pub fn depth(&self) -> usize {
        self.sp
    }
}
