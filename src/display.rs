use crate::config::SpriteEdge;
use crate::error::{Result, VmError};

pub const WIDTH: usize = 64;
pub const HEIGHT: usize = 32;

/// One bit per pixel, row-major, `x + y * WIDTH`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    bit_buffer: Vec<bool>,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self {
            bit_buffer: vec![false; WIDTH * HEIGHT],
        }
    }

    pub fn clear_buffer(&mut self) {
        self.bit_buffer.fill(false);
    }

    pub fn pixels(&self) -> &[bool] {
        &self.bit_buffer
    }

    pub fn get(&self, x: usize, y: usize) -> Option<bool> {
        if x >= WIDTH || y >= HEIGHT {
            return None;
        }
        Some(self.bit_buffer[y * WIDTH + x])
    }

    pub fn lit(&self) -> usize {
        self.bit_buffer.iter().filter(|p| **p).count()
    }

    /// XORs `sprite` onto the screen with its top-left corner at (x, y).
    ///
    /// Returns true if any lit pixel was switched off.
    pub fn paint(&mut self, x: u8, y: u8, sprite: &[u8], edge: SpriteEdge) -> Result<bool> {
        log::trace!("painting sprite at ({x}, {y}): {sprite:02X?}");
        let (x, y) = match edge {
            SpriteEdge::Clip | SpriteEdge::Wrap => (x as usize % WIDTH, y as usize % HEIGHT),
            SpriteEdge::Reject => (x as usize, y as usize),
        };

        let mut vf = false;
        for (i, row) in sprite.iter().enumerate() {
            for j in 0..8 {
                if (row >> (7 - j)) & 1 == 0 {
                    continue;
                }
                let (nx, ny) = (x + j, y + i);
                let index = match edge {
                    SpriteEdge::Clip if nx >= WIDTH || ny >= HEIGHT => continue,
                    SpriteEdge::Wrap => (ny % HEIGHT) * WIDTH + nx % WIDTH,
                    SpriteEdge::Reject if nx >= WIDTH || ny >= HEIGHT => {
                        return Err(VmError::PixelOutOfRange { x: nx, y: ny });
                    }
                    _ => ny * WIDTH + nx,
                };
                if self.bit_buffer[index] {
                    vf = true;
                }
                self.bit_buffer[index] ^= true;
            }
        }
        Ok(vf)
    }
}
