use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::config::TimerMode;

const TIMER_DEC_PER_SECOND: u64 = 60;
const TICK: Duration = Duration::from_nanos(1_000_000_000 / TIMER_DEC_PER_SECOND);

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    pub count: u8,
}

impl Timer {
    pub fn new(init_count: u8) -> Self {
        Self { count: init_count }
    }

    pub fn set(&mut self, value: u8) {
        self.count = value;
    }

    /// Counts down by one, stopping at zero. Returns whether it moved.
    pub fn tick(&mut self) -> bool {
        if self.count == 0 {
            return false;
        }
        self.count -= 1;
        true
    }
}

/// Decides how many 60 Hz ticks have passed each time a frame ends.
pub trait TimerPacer {
    fn ticks_due(&mut self) -> u32;
}

/// Legacy pacing: every frame is one tick.
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameLocked;

impl TimerPacer for FrameLocked {
    fn ticks_due(&mut self) -> u32 {
        1
    }
}

pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }
}

impl ManualClock {
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// Real-time pacing. Time that does not add up to a whole tick is carried
/// into the next frame.
pub struct WallClock<C: Clock = SystemClock> {
    clock: C,
    last_updated: Instant,
    carry: Duration,
}

impl<C: Clock> WallClock<C> {
    pub fn new(clock: C) -> Self {
        let last_updated = clock.now();
        Self {
            clock,
            last_updated,
            carry: Duration::ZERO,
        }
    }
}

impl<C: Clock> TimerPacer for WallClock<C> {
    fn ticks_due(&mut self) -> u32 {
        let now = self.clock.now();
        self.carry += now.saturating_duration_since(self.last_updated);
        self.last_updated = now;

        let ticks = (self.carry.as_nanos() / TICK.as_nanos()) as u32;
        self.carry -= TICK * ticks;
        ticks
    }
}

pub struct Timers {
    pub delay: Timer,
    pub sound: Timer,
    pacer: Box<dyn TimerPacer>,
}

impl Timers {
    pub fn new(pacer: Box<dyn TimerPacer>) -> Self {
        Self {
            delay: Timer::default(),
            sound: Timer::default(),
            pacer,
        }
    }

    pub fn from_mode(mode: TimerMode) -> Self {
        match mode {
            TimerMode::FrameLocked => Self::new(Box::new(FrameLocked)),
            TimerMode::WallClock => Self::new(Box::new(WallClock::new(SystemClock))),
        }
    }

    pub fn set_pacer(&mut self, pacer: Box<dyn TimerPacer>) {
        self.pacer = pacer;
    }

    /// Applies however many ticks the pacer says are due.
    pub fn sync(&mut self) {
        // both counters are u8, more than 255 ticks can't change anything
        let due = self.pacer.ticks_due().min(u8::MAX as u32);
        for _ in 0..due {
            self.delay.tick();
            self.sound.tick();
        }
    }

    pub fn reset(&mut self) {
        self.delay = Timer::default();
        self.sound = Timer::default();
    }
}
