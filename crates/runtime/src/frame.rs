use std::time::{Duration, Instant};

use foundation::time::Time;

/// Per-frame metadata.
///
/// Frames follow the display, not a fixed timestep: `dt_s` is whatever wall
/// time passed since the previous frame. A slow frame just produces a larger
/// `dt_s`; nothing is skipped or replayed.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Seconds since the previous frame.
    pub dt_s: f64,
    /// Seconds since the clock started.
    pub time: Time,
}

impl Frame {
    pub fn new(index: u64, dt_s: f64, time: Time) -> Self {
        Self { index, dt_s, time }
    }
}

#[derive(Debug, Clone)]
pub struct FrameClock {
    started: Instant,
    last: Option<Instant>,
    next_index: u64,
}

impl FrameClock {
    pub fn new(started: Instant) -> Self {
        Self {
            started,
            last: None,
            next_index: 0,
        }
    }

    pub fn tick(&mut self, now: Instant) -> Frame {
        let dt = self
            .last
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or(Duration::ZERO);
        self.last = Some(now);
        let index = self.next_index;
        self.next_index += 1;
        Frame::new(
            index,
            dt.as_secs_f64(),
            Time(now.saturating_duration_since(self.started).as_secs_f64()),
        )
    }

    pub fn frames_elapsed(&self) -> u64 {
        self.next_index
    }
}
