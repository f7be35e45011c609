use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Clamped seconds since the previous tick.
    pub dt: f32,

    /// Sum of every clamped `dt` since the clock started, in seconds.
    pub elapsed: f32,

    pub now: Instant,

    pub frame_index: u64,
}

/// Produces one `FrameTime` per rendered frame.
///
/// `dt` is clamped on both ends so a stall (debugger, minimized window) cannot
/// turn into one huge simulation step.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    elapsed: Duration,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: Instant::now(),
            elapsed: Duration::ZERO,
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    /// Advances the clock to `now`.
    pub fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);

        self.last = now;
        self.elapsed += dt;

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            elapsed: self.elapsed.as_secs_f32(),
            now,
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dt_is_clamped_and_elapsed_accumulates() {
        let mut clock = FrameClock::with_clamps(Duration::from_millis(1), Duration::from_millis(100));
        let start = clock.last;

        let a = clock.tick_at(start + Duration::from_millis(16));
        assert!((a.dt - 0.016).abs() < 1e-6);
        assert_eq!(a.frame_index, 0);

        // A five second stall counts as one 100 ms step.
        let b = clock.tick_at(start + Duration::from_millis(5016));
        assert!((b.dt - 0.1).abs() < 1e-6);
        assert!((b.elapsed - 0.116).abs() < 1e-5);
        assert_eq!(b.frame_index, 1);

        // Same instant twice still advances by the minimum.
        let c = clock.tick_at(start + Duration::from_millis(5016));
        assert!((c.dt - 0.001).abs() < 1e-6);
    }
}
