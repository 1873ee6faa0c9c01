use std::time::{Duration, Instant};

/// Frame and tick rates measured over one reporting window.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopRates {
    pub fps: f32,
    pub tps: f32,
    pub frame_time_ms: f32,
}

/// Ticks owed for one presented frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FrameTicks {
    pub(crate) ticks: u32,
    /// Backlog dropped because the per-frame tick cap was reached.
    pub(crate) skipped: Duration,
}

/// Fixed-rate simulation clock. Wall time between frames is paid out as
/// whole ticks, at most `max_ticks` per frame; a backlog beyond that is
/// dropped instead of replayed.
#[derive(Debug)]
pub(crate) struct TickClock {
    tick: Duration,
    max_ticks: u32,
    owed: Duration,
    last_frame: Instant,
    window: RateWindow,
}

impl TickClock {
    pub(crate) fn new(
        target_tps: u32,
        max_ticks: u32,
        report_every: Duration,
        now: Instant,
    ) -> Self {
        Self {
            tick: Duration::from_secs_f64(1.0 / f64::from(target_tps.max(1))),
            max_ticks: max_ticks.max(1),
            owed: Duration::ZERO,
            last_frame: now,
            window: RateWindow::new(report_every, now),
        }
    }

    pub(crate) fn tick_duration(&self) -> Duration {
        self.tick
    }

    pub(crate) fn frame(&mut self, now: Instant) -> FrameTicks {
        let frame_dt = now.saturating_duration_since(self.last_frame);
        self.last_frame = now;
        self.owed = self.owed.saturating_add(frame_dt);

        let mut ticks = 0;
        while self.owed >= self.tick && ticks < self.max_ticks {
            self.owed -= self.tick;
            ticks += 1;
        }
        let skipped = if self.owed >= self.tick {
            std::mem::take(&mut self.owed)
        } else {
            Duration::ZERO
        };

        self.window.record(frame_dt, ticks);
        FrameTicks { ticks, skipped }
    }

    /// Rates since the previous report, once the reporting interval passed.
    pub(crate) fn rates(&mut self, now: Instant) -> Option<LoopRates> {
        self.window.take(now)
    }
}

#[derive(Debug)]
struct RateWindow {
    report_every: Duration,
    started: Instant,
    frames: u32,
    ticks: u32,
    frame_time: Duration,
}

impl RateWindow {
    fn new(report_every: Duration, now: Instant) -> Self {
        Self {
            report_every: if report_every.is_zero() {
                Duration::from_secs(1)
            } else {
                report_every
            },
            started: now,
            frames: 0,
            ticks: 0,
            frame_time: Duration::ZERO,
        }
    }

    fn record(&mut self, frame_dt: Duration, ticks: u32) {
        self.frames = self.frames.saturating_add(1);
        self.ticks = self.ticks.saturating_add(ticks);
        self.frame_time = self.frame_time.saturating_add(frame_dt);
    }

    fn take(&mut self, now: Instant) -> Option<LoopRates> {
        let elapsed = now.saturating_duration_since(self.started);
        if elapsed < self.report_every {
            return None;
        }
        let seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let rates = LoopRates {
            fps: self.frames as f32 / seconds,
            tps: self.ticks as f32 / seconds,
            frame_time_ms: match self.frames {
                0 => 0.0,
                frames => self.frame_time.as_secs_f32() * 1000.0 / frames as f32,
            },
        };
        *self = Self::new(self.report_every, now);
        Some(rates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock_at(base: Instant) -> TickClock {
        TickClock::new(60, 5, Duration::from_secs(1), base)
    }

    #[test]
    fn frame_pays_out_whole_ticks() {
        let base = Instant::now();
        let mut clock = clock_at(base);

        let frame = clock.frame(base + Duration::from_millis(51));

        assert_eq!(frame.ticks, 3);
        assert_eq!(frame.skipped, Duration::ZERO);
    }

    #[test]
    fn partial_tick_carries_into_next_frame() {
        let base = Instant::now();
        let mut clock = clock_at(base);

        let first = clock.frame(base + Duration::from_millis(10));
        let second = clock.frame(base + Duration::from_millis(20));

        assert_eq!(first.ticks, 0);
        assert_eq!(second.ticks, 1);
    }

    #[test]
    fn long_stall_runs_capped_ticks_and_drops_backlog() {
        let base = Instant::now();
        let mut clock = clock_at(base);

        let stalled = clock.frame(base + Duration::from_secs(1));
        let next = clock.frame(base + Duration::from_millis(1001));

        assert_eq!(stalled.ticks, 5);
        assert!(stalled.skipped > Duration::from_millis(800));
        assert_eq!(next.ticks, 0);
    }

    #[test]
    fn tick_duration_matches_rate() {
        let clock = clock_at(Instant::now());

        assert!((clock.tick_duration().as_secs_f64() - 1.0 / 60.0).abs() < 0.000_001);
    }

    #[test]
    fn rates_report_once_per_interval() {
        let base = Instant::now();
        let mut clock = clock_at(base);
        clock.frame(base + Duration::from_millis(34));
        clock.frame(base + Duration::from_millis(68));

        assert!(clock.rates(base + Duration::from_millis(500)).is_none());
        let rates = clock
            .rates(base + Duration::from_secs(1))
            .expect("rates after one second");

        assert!((rates.fps - 2.0).abs() < 0.05);
        assert!((rates.tps - 4.0).abs() < 0.05);
        assert!((rates.frame_time_ms - 34.0).abs() < 0.01);

        let quiet = clock
            .rates(base + Duration::from_secs(2))
            .expect("second window");
        assert_eq!(quiet.tps, 0.0);
        assert_eq!(quiet.frame_time_ms, 0.0);
    }
}
