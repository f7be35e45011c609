use crate::colony::ColonyCensus;

/// Frame-rate and colony summary, logged at a fixed interval.
#[derive(Debug, Clone)]
pub struct TechnicalStats {
    interval_s: f32,
    window_s: f32,
    window_frames: u32,
}

/// One report produced by `TechnicalStats::record`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StatsReport {
    pub fps: f32,
    pub frame_ms: f32,
    pub census: ColonyCensus,
}

impl TechnicalStats {
    pub fn new(interval_s: f32) -> Self {
        Self { interval_s: interval_s.max(f32::EPSILON), window_s: 0.0, window_frames: 0 }
    }

    /// Adds one frame; returns a report once per interval.
    pub fn record(&mut self, dt: f32, census: ColonyCensus) -> Option<StatsReport> {
        self.window_s += dt;
        self.window_frames += 1;
        if self.window_s < self.interval_s {
            return None;
        }

        let fps = self.window_frames as f32 / self.window_s;
        let frame_ms = 1000.0 * self.window_s / self.window_frames as f32;
        self.window_s = 0.0;
        self.window_frames = 0;

        Some(StatsReport { fps, frame_ms, census })
    }
}

impl StatsReport {
    pub fn log(&self) {
        let c = self.census;
        log::info!(
            "{:.1} fps ({:.2} ms) | colony: {} growing, {} grown, {} shrinking, {} dead",
            self.fps,
            self.frame_ms,
            c.growing,
            c.grown,
            c.shrinking,
            c.dead
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_once_per_interval() {
        let mut stats = TechnicalStats::new(1.0);
        let census = ColonyCensus::default();

        let mut reports = Vec::new();
        for _ in 0..125 {
            if let Some(r) = stats.record(0.016, census) {
                reports.push(r);
            }
        }

        // 63 frames reach 1.008 s, 126 would be needed for a second report.
        assert_eq!(reports.len(), 1);
        let r = reports[0];
        assert!((r.frame_ms - 16.0).abs() < 1e-3);
        assert!((r.fps - 62.5).abs() < 1e-2);
    }
}
