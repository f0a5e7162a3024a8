use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameTime {
    /// Time elapsed since the previous tick, in seconds.
    pub dt: f32,

    /// Time elapsed since the clock was created or reset, in seconds.
    pub elapsed: f32,

    /// Monotonic tick counter.
    pub frame_index: u64,
}

impl FrameTime {
    /// Snapshot used before the first tick.
    pub const fn zero() -> Self {
        Self { dt: 0.0, elapsed: 0.0, frame_index: 0 }
    }
}

impl Default for FrameTime {
    fn default() -> Self {
        Self::zero()
    }
}

/// Clock producing `FrameTime` snapshots for the app's frame callback.
///
/// Delta time is clamped so a stall (debugger, minimized window, a paused app
/// whose clock kept ticking) does not feed a huge step into the loops.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last: Instant,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    /// Creates a clock with custom delta-time clamps.
    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        let now = Instant::now();
        Self {
            start: now,
            last: now,
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Resets the delta baseline (e.g. on start or resume).
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    /// Advances the clock to "now".
    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    /// Advances the clock to `now`.
    pub fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);

        self.last = now;

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            elapsed: now.saturating_duration_since(self.start).as_secs_f32(),
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);

        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
