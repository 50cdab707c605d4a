use std::time::Duration;

use anyhow::bail;
use chipvm::display::{HEIGHT, WIDTH};
use chipvm::keyboard::KEY_COUNT;
use chipvm::{Emulator, Frame, Renderer, Status};
use minifb::{Key, KeyRepeat, Scale, Window, WindowOptions};

const TITLE: &str = "chipvm - ESC to exit, F5 to reset";

// 1 2 3 C      1 2 3 4
// 4 5 6 D  <-  Q W E R
// 7 8 9 E      A S D F
// A 0 B F      Z X C V
const KEYMAP: [(Key, u8); KEY_COUNT] = [
    (Key::X, 0x0),
    (Key::Key1, 0x1),
    (Key::Key2, 0x2),
    (Key::Key3, 0x3),
    (Key::Q, 0x4),
    (Key::W, 0x5),
    (Key::E, 0x6),
    (Key::A, 0x7),
    (Key::S, 0x8),
    (Key::D, 0x9),
    (Key::Z, 0xA),
    (Key::C, 0xB),
    (Key::Key4, 0xC),
    (Key::R, 0xD),
    (Key::F, 0xE),
    (Key::V, 0xF),
];

fn from_u8_rgb(r: u8, g: u8, b: u8) -> u32 {
    let (r, g, b) = (r as u32, g as u32, b as u32);
    (r << 16) | (g << 8) | b
}

// words around PC for the halted title
fn nearby_text(words: &[u16]) -> String {
    words
        .iter()
        .map(|w| format!("{w:04X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn scale_from(n: u32) -> anyhow::Result<Scale> {
    Ok(match n {
        1 => Scale::X1,
        2 => Scale::X2,
        4 => Scale::X4,
        8 => Scale::X8,
        16 => Scale::X16,
        32 => Scale::X32,
        _ => bail!("unsupported scale {n}, expected 1, 2, 4, 8, 16 or 32"),
    })
}

/// Paints frames into a minifb window and reads the keypad from it.
pub struct WindowRenderer {
    window: Window,
    pixel_buffer: Vec<u32>,
    title: String,
    keys: [bool; KEY_COUNT],
}

impl WindowRenderer {
    pub fn new(scale: u32) -> anyhow::Result<Self> {
        let mut window = Window::new(
            TITLE,
            WIDTH,
            HEIGHT,
            WindowOptions {
                scale: scale_from(scale)?,
                ..WindowOptions::default()
            },
        )?;
        // Limit to max ~60 fps update rate
        window.limit_update_rate(Some(Duration::from_micros(16600)));
        Ok(Self {
            window,
            pixel_buffer: vec![0; WIDTH * HEIGHT],
            title: TITLE.to_string(),
            keys: [false; KEY_COUNT],
        })
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open() && !self.window.is_key_down(Key::Escape)
    }

    /// Copies host key state into the emulator's keypad.
    pub fn poll_keys(&mut self, emu: &mut Emulator) {
        for (key, num) in KEYMAP {
            let down = self.window.is_key_down(key);
            if down != self.keys[num as usize] {
                log::info!("key {num:X} {}", if down { "down" } else { "up" });
                self.keys[num as usize] = down;
                emu.set_key(num, down);
            }
        }
        if self.window.is_key_pressed(Key::F5, KeyRepeat::No) {
            log::info!("reset requested");
            if let Err(err) = emu.reset() {
                log::error!("reset failed: {err}");
            }
        }
    }

    fn set_title(&mut self, title: String) {
        if title != self.title {
            self.window.set_title(&title);
            self.title = title;
        }
    }
}

impl Renderer for WindowRenderer {
    type Error = minifb::Error;

    fn present(&mut self, frame: &Frame<'_>) -> Result<(), Self::Error> {
        let (on, off) = match frame.status {
            Status::Running => (from_u8_rgb(0, 127, 255), from_u8_rgb(0, 0, 0)),
            Status::Halted { .. } => (from_u8_rgb(255, 64, 64), from_u8_rgb(48, 0, 0)),
        };
        for (pixel, lit) in self
            .pixel_buffer
            .iter_mut()
            .zip(frame.framebuffer.pixels())
        {
            *pixel = if *lit { on } else { off };
        }

        let title = match frame.status {
            Status::Running => format!(
                "{TITLE} | ROM {} bytes | PC {:#05X} | last opcode {:04X}",
                frame.rom_size, frame.pc, frame.opcode
            ),
            halted => format!(
                "{TITLE} | {halted} at {:#05X} | {}",
                frame.pc,
                nearby_text(&frame.nearby)
            ),
        };
        self.set_title(title);
        log::debug!("memory around pc: {:04X?}", frame.nearby);

        self.window
            .update_with_buffer(&self.pixel_buffer, WIDTH, HEIGHT)
    }
}
