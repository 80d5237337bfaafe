//! Per-frame timing.

use web_time::{Duration, Instant};

/// Monotonic clock started once at process start.
///
/// Each [`tick`](FrameClock::tick) returns the seconds elapsed since the previous
/// tick. The previous timestamp starts at zero, so the first tick measures the time
/// since the clock was started.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    origin: Instant,
    previous: Duration,
}

impl FrameClock {
    /// Starts the clock now.
    pub fn start() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Starts the clock at `origin`.
    pub fn starting_at(origin: Instant) -> Self {
        Self {
            origin,
            previous: Duration::ZERO,
        }
    }

    /// Seconds since the previous tick.
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    /// [`tick`](FrameClock::tick) with an explicit sample time.
    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let elapsed = now.saturating_duration_since(self.origin);
        let delta = elapsed.saturating_sub(self.previous);
        self.previous = self.previous.max(elapsed);
        delta.as_secs_f32()
    }

    /// Time from the start of the clock to the latest tick.
    pub fn elapsed(&self) -> Duration {
        self.previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn first_tick_measures_from_start() {
        let origin = Instant::now();
        let mut clock = FrameClock::starting_at(origin);

        let delta = clock.tick_at(origin + Duration::from_millis(250));

        assert_relative_eq!(delta, 0.25, epsilon = 1e-6);
        assert_eq!(clock.elapsed(), Duration::from_millis(250));
    }

    #[test]
    fn ticks_measure_consecutive_intervals() {
        let origin = Instant::now();
        let mut clock = FrameClock::starting_at(origin);

        clock.tick_at(origin + Duration::from_millis(100));
        let second = clock.tick_at(origin + Duration::from_millis(116));
        let third = clock.tick_at(origin + Duration::from_millis(116));

        assert_relative_eq!(second, 0.016, epsilon = 1e-6);
        assert_eq!(third, 0.0);
    }

    #[test]
    fn samples_before_the_previous_tick_give_zero() {
        let origin = Instant::now();
        let mut clock = FrameClock::starting_at(origin + Duration::from_secs(1));

        assert_eq!(clock.tick_at(origin), 0.0);

        clock.tick_at(origin + Duration::from_secs(3));
        assert_eq!(clock.tick_at(origin + Duration::from_secs(2)), 0.0);
        assert_eq!(clock.elapsed(), Duration::from_secs(2));
    }
}
