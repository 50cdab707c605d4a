use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{
    config::Config,
    decode::OpCodes,
    display::FrameBuffer,
    error::{Result, VmError},
    keyboard::Keypad,
    memory::{Memory, TypeAddr, FONT_START, GLYPH_SIZE},
    registers::{Registers, FLAG},
    timer::Timers,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Running,
    /// Terminal. Holds the fault and the word that was being executed,
    /// `None` when the fetch itself failed.
    Halted { fault: VmError, opcode: Option<u16> },
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Running => write!(f, "running"),
            Status::Halted { fault, .. } => write!(f, "HALT {fault}"),
        }
    }
}

/// Everything a renderer gets to see after a frame.
#[derive(Debug)]
pub struct Frame<'a> {
    pub framebuffer: &'a FrameBuffer,
    pub pc: TypeAddr,
    /// Last word fetched successfully.
    pub opcode: u16,
    pub status: &'a Status,
    pub rom_size: usize,
    /// Instruction words around PC, for a debug overlay.
    pub nearby: Vec<u16>,
}

/// The host side of the frame hand-off. `present` may block.
pub trait Renderer {
    type Error;

    fn present(&mut self, frame: &Frame<'_>) -> std::result::Result<(), Self::Error>;
}

pub struct Emulator {
    fb: FrameBuffer,
    pub regs: Registers,
    pub mem: Memory,
    pub timers: Timers,
    keypad: Keypad,
    rng: StdRng,
    config: Config,
    status: Status,
    opcode: u16,
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Emulator {
    pub fn new(config: Config) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            fb: FrameBuffer::new(),
            regs: Registers::new(),
            mem: Memory::new(),
            timers: Timers::from_mode(config.timer),
            keypad: Keypad::new(),
            rng,
            config,
            status: Status::Running,
            opcode: 0,
        }
    }

    pub fn load_rom(&mut self, rom: &[u8]) -> Result<()> {
        self.mem.load_rom(rom)
    }

    /// Power-on state again, with the same program loaded.
    pub fn reset(&mut self) -> Result<()> {
        log::debug!("resetting vm");
        self.mem.reset()?;
        self.regs = Registers::new();
        self.fb.clear_buffer();
        self.timers.reset();
        self.status = Status::Running;
        self.opcode = 0;
        Ok(())
    }

    pub fn execute_ins(&mut self, ins: OpCodes) -> Result<()> {
        match ins {
            OpCodes::Jump(addr) => {
                self.mem.set_pc(addr);
            }
            OpCodes::SetRegister(vx, nn) => {
                self.regs.set_register(vx, nn);
            }
            OpCodes::AddToRegister(vx, nn) => {
                self.regs.add_to_register(vx, nn);
            }
            OpCodes::SetIndexRegister(addr) => self.mem.set_index(addr),
            OpCodes::ClearScreen => {
                self.fb.clear_buffer();
            }
            OpCodes::Display(reg_x, reg_y, height) => {
                let (x, y) = (self.regs.get(reg_x), self.regs.get(reg_y));
                self.regs.set_flag(false);
                // one byte per row, 8 pixels wide
                let sprite = self.mem.slice(self.mem.index.0, height as usize)?;
                let vf = self.fb.paint(x, y, sprite, self.config.sprite_edge)?;
                self.regs.set_flag(vf);
            }
            OpCodes::PushSubroutine(addr) => {
                // pc already points past the call
                self.mem.stack.push(self.mem.pc.0)?;
                self.mem.set_pc(addr);
            }
            OpCodes::PopSubroutine => {
                let addr = self.mem.stack.pop()?;
                self.mem.set_pc(addr);
            }
            OpCodes::CopyRegister(vx, vy) => {
                self.regs.set_register(vx, self.regs.get(vy));
            }
            OpCodes::Or(vx, vy) => {
                self.regs
                    .set_register(vx, self.regs.get(vy) | self.regs.get(vx));
            }
            OpCodes::And(vx, vy) => {
                self.regs
                    .set_register(vx, self.regs.get(vy) & self.regs.get(vx));
            }
            OpCodes::XOr(vx, vy) => {
                self.regs
                    .set_register(vx, self.regs.get(vy) ^ self.regs.get(vx));
            }
            // flag first, result second: with VX = VF the result wins
            OpCodes::Add(vx, vy) => {
                let (x, y) = (self.regs.get(vx), self.regs.get(vy));
                let (z, carry) = x.overflowing_add(y);
                self.regs.set_flag(carry);
                self.regs.set_register(vx, z);
            }
            OpCodes::SubtractForward(vx, vy) => {
                let (x, y) = (self.regs.get(vx), self.regs.get(vy));
                let (z, borrow) = x.overflowing_sub(y);
                self.regs.set_flag(!borrow);
                self.regs.set_register(vx, z);
            }
            OpCodes::SubtractBackward(vx, vy) => {
                let (x, y) = (self.regs.get(vx), self.regs.get(vy));
                let (z, borrow) = y.overflowing_sub(x);
                self.regs.set_flag(!borrow);
                self.regs.set_register(vx, z);
            }
            OpCodes::LeftShift(vx, _) => {
                let vx_value = self.regs.get(vx);
                self.regs.set_register(FLAG, (vx_value >> 7) & 1);
                self.regs.set_register(vx, vx_value << 1);
            }
            OpCodes::RightShift(vx, _) => {
                let vx_value = self.regs.get(vx);
                self.regs.set_register(FLAG, vx_value & 1);
                self.regs.set_register(vx, vx_value >> 1);
            }
            OpCodes::Random(vx, nn) => {
                let ransuu: u8 = self.rng.gen();
                self.regs.set_register(vx, nn & ransuu);
            }
            OpCodes::JumpWithOffset(addr) => {
                self.mem.set_pc(addr + self.regs.get(0) as u16);
            }
            OpCodes::AddToIndex(vx) => {
                self.mem
                    .set_index(self.mem.index.0.wrapping_add(self.regs.get(vx) as u16));
            }
            OpCodes::SkipEqualConstant(vx, nn) => {
                if self.regs.get(vx) == nn {
                    self.mem.increment_pc();
                }
            }
            OpCodes::SkipNotEqualConstant(vx, nn) => {
                if self.regs.get(vx) != nn {
                    self.mem.increment_pc();
                }
            }
            OpCodes::SkipEqualRegister(vx, vy) => {
                if self.regs.get(vx) == self.regs.get(vy) {
                    self.mem.increment_pc();
                }
            }
            OpCodes::SkipNotEqualRegister(vx, vy) => {
                if self.regs.get(vx) != self.regs.get(vy) {
                    self.mem.increment_pc();
                }
            }
            OpCodes::PointChar(vx) => {
                let char = self.regs.get(vx) as u16;
                self.mem.set_index(FONT_START + char * GLYPH_SIZE);
            }
            OpCodes::ToDecimal(vx) => {
                let value = self.regs.get(vx);
                let digits = [value / 100, (value / 10) % 10, value % 10];
                let index = self.mem.index.0;
                self.mem.check_range(index, digits.len())?;
                for (i, digit) in digits.into_iter().enumerate() {
                    self.mem.set(index + i as u16, digit)?;
                }
            }
            OpCodes::SkipIfPressed(vx) => {
                if self.keypad.is_pressed(self.regs.get(vx)) {
                    self.mem.increment_pc();
                }
            }
            OpCodes::SkipIfNotPressed(vx) => {
                if !self.keypad.is_pressed(self.regs.get(vx)) {
                    self.mem.increment_pc();
                }
            }
            OpCodes::CopyDelayToRegister(vx) => self.regs.set_register(vx, self.timers.delay.count),
            OpCodes::CopyRegisterToDelay(vx) => self.timers.delay.set(self.regs.get(vx)),
            OpCodes::CopyRegisterToSound(vx) => self.timers.sound.set(self.regs.get(vx)),
            OpCodes::GetKey(vx) => match self.keypad.first_pressed() {
                Some(key) => self.regs.set_register(vx, key),
                // nothing pressed: run this instruction again next step
                None => self.mem.decrement_pc(),
            },
            OpCodes::LoadRegisterFromMemory(vx) => {
                let values = self.mem.slice(self.mem.index.0, vx as usize + 1)?;
                for (reg, reg_val) in values.iter().enumerate() {
                    self.regs.set_register(reg as u8, *reg_val);
                }
            }
            OpCodes::StoreRegisterToMemory(vx) => {
                let index = self.mem.index.0;
                self.mem.check_range(index, vx as usize + 1)?;
                for reg in 0..=vx {
                    self.mem.set(index + reg as u16, self.regs.get(reg))?;
                }
            }
        }
        Ok(())
    }

    /// One fetch-decode-execute step.
    ///
    /// A fault moves the machine to [`Status::Halted`] with PC left on the
    /// faulting instruction. Once halted, every call returns the same fault
    /// and changes nothing.
    pub fn tick(&mut self) -> Result<()> {
        if let Status::Halted { fault, .. } = &self.status {
            return Err(fault.clone());
        }

        let pc = self.mem.pc.0;
        let ins = match self.mem.next_instruction() {
            Ok(ins) => ins,
            Err(fault) => {
                self.halt(fault.clone(), None);
                return Err(fault);
            }
        };
        self.opcode = ins;

        let result = OpCodes::decode_raw(ins).and_then(|op| {
            log::trace!("{pc:#05X}: {ins:04X} {op}");
            self.execute_ins(op)
        });
        if let Err(fault) = &result {
            self.mem.set_pc(pc);
            self.halt(fault.clone(), Some(ins));
        }
        result
    }

    fn halt(&mut self, fault: VmError, opcode: Option<u16>) {
        match opcode {
            Some(ins) => log::error!("halted at {:#05X} on {ins:04X}: {fault}", self.mem.pc.0),
            None => log::error!("halted fetching from {:#05X}: {fault}", self.mem.pc.0),
        }
        self.status = Status::Halted { fault, opcode };
    }

    /// Runs a frame: the configured number of steps, the renderer hand-off,
    /// then the timers. A halted machine only renders.
    pub fn run_frame<R: Renderer>(&mut self, renderer: &mut R) -> std::result::Result<(), R::Error> {
        for _ in 0..self.config.cycles_per_frame {
            if self.tick().is_err() {
                break;
            }
        }
        renderer.present(&self.frame())?;
        if self.is_running() {
            self.sync_timers();
        }
        Ok(())
    }

    pub fn sync_timers(&mut self) {
        self.timers.sync();
    }

    pub fn frame(&self) -> Frame<'_> {
        Frame {
            framebuffer: &self.fb,
            pc: self.mem.pc.0,
            opcode: self.opcode,
            status: &self.status,
            rom_size: self.mem.rom_len(),
            nearby: self.mem.words_around(self.mem.pc.0),
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == Status::Running
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn opcode(&self) -> u16 {
        self.opcode
    }

    pub fn framebuffer(&self) -> &FrameBuffer {
        &self.fb
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn set_key(&mut self, key: u8, pressed: bool) {
        self.keypad.set_key(key, pressed);
    }

    pub fn keypad(&self) -> &Keypad {
        &self.keypad
    }

    /// The sound timer is tracked but never played; hosts can ask.
    pub fn sound_active(&self) -> bool {
        self.timers.sound.count > 0
    }
}
