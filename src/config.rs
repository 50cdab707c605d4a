/// How DXYN treats pixels that fall off the 64x32 grid.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SpriteEdge {
    /// Wrap the starting coordinate, drop pixels past the right/bottom edge.
    #[default]
    Clip,
    /// Wrap every pixel around the screen.
    Wrap,
    /// Halt with `PixelOutOfRange` on the first pixel outside the grid.
    Reject,
}

/// What paces the delay and sound timers.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TimerMode {
    /// One tick per rendered frame, whatever the frame rate.
    #[default]
    FrameLocked,
    /// 60 ticks per second of wall-clock time.
    WallClock,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub timer: TimerMode,
    pub sprite_edge: SpriteEdge,
    /// Instructions executed between two renderer hand-offs.
    pub cycles_per_frame: u32,
    /// Seed for CXNN; `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timer: TimerMode::default(),
            sprite_edge: SpriteEdge::default(),
            cycles_per_frame: 1,
            seed: None,
        }
    }
}
