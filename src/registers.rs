use crate::memory::TypeAddr;

pub const FLAG: u8 = 0xF;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Registers {
    registers: [u8; 16],
}

impl Registers {
    pub fn new() -> Self {
        Self { registers: [0; 16] }
    }

    pub fn set_register(&mut self, reg_num: u8, value: u8) {
        self.registers[(reg_num & 0xF) as usize] = value;
    }

    pub fn add_to_register(&mut self, reg_num: u8, value: u8) {
        let total = self.get(reg_num).wrapping_add(value);
        self.set_register(reg_num, total);
    }

    pub fn get(&self, reg_num: u8) -> u8 {
        self.registers[(reg_num & 0xF) as usize]
    }

    pub fn set_flag(&mut self, set: bool) {
        self.set_register(FLAG, set as u8);
    }

    pub fn flag(&self) -> u8 {
        self.get(FLAG)
    }
}

// Special registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramCounter(pub TypeAddr);

impl ProgramCounter {
    pub fn increment(&mut self) {
        self.0 = self.0.wrapping_add(2);
    }

    pub fn decrement(&mut self) {
        self.0 = self.0.wrapping_sub(2);
    }

    pub fn set_addr(&mut self, addr: TypeAddr) {
        self.0 = addr;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexRegister(pub TypeAddr);

impl IndexRegister {
    pub fn set_addr(&mut self, addr: TypeAddr) {
        self.0 = addr;
    }
}

#[test]
fn test_add_wraps() {
    let mut regs = Registers::new();
    regs.set_register(3, 0xFF);
    regs.add_to_register(3, 2);
    assert_eq!(regs.get(3), 1);
    // no carry flag for immediate adds
    assert_eq!(regs.flag(), 0);
}

#[test]
fn test_set_every_register() {
    let mut regs = Registers::new();
    for x in 0..16u8 {
        regs.set_register(x, 0xA0 + x);
    }
    for x in 0..16u8 {
        assert_eq!(regs.get(x), 0xA0 + x);
    }
}
