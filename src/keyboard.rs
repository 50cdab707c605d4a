pub const KEY_COUNT: usize = 16;

/// State of the hex keypad, written by the host.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Keypad {
    keys: [bool; KEY_COUNT],
}

impl Keypad {
    pub fn new() -> Self {
        Self {
            keys: [false; KEY_COUNT],
        }
    }

    pub fn set_key(&mut self, key: u8, pressed: bool) {
        self.keys[(key & 0xF) as usize] = pressed;
    }

    // only the low nibble of VX names a key
    pub fn is_pressed(&self, key: u8) -> bool {
        self.keys[(key & 0xF) as usize]
    }

    pub fn first_pressed(&self) -> Option<u8> {
        self.keys.iter().position(|k| *k).map(|k| k as u8)
    }
}

#[test]
fn test_keypad() {
    let mut keypad = Keypad::new();
    assert_eq!(keypad.first_pressed(), None);
    keypad.set_key(0xB, true);
    keypad.set_key(0x4, true);
    assert!(keypad.is_pressed(0xB));
    assert!(keypad.is_pressed(0x1B));
    assert_eq!(keypad.first_pressed(), Some(0x4));
    keypad.set_key(0x4, false);
    assert_eq!(keypad.first_pressed(), Some(0xB));
    keypad.set_key(0xB, false);
    assert_eq!(keypad.first_pressed(), None);
}
