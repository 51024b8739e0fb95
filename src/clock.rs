//! Frame timing.
//!
//! All animation runs on a scaled tick: one time unit is 100 ms of wall-clock
//! time (the millisecond tick count divided by 100). The first sample has no
//! predecessor and always yields a step of zero, so the scene does not jump on
//! startup.

use std::time::{Duration, Instant};

/// Milliseconds per animation time unit.
pub const MILLIS_PER_UNIT: f32 = 100.0;

/// Converts a wall-clock duration into animation time units.
pub fn time_units(elapsed: Duration) -> f32 {
    elapsed.as_secs_f32() * 1000.0 / MILLIS_PER_UNIT
}

/// Samples a monotonic clock once per frame and reports the step since the
/// previous sample.
#[derive(Debug, Default)]
pub struct FrameClock {
    previous: Option<Instant>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Samples the clock now.
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    /// Samples the clock at `now`. Returns 0 on the first sample.
    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let dt = match self.previous {
            Some(previous) => time_units(now.saturating_duration_since(previous)),
            None => 0.0,
        };
        self.previous = Some(now);
        dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_is_zero() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick(), 0.0);
    }

    #[test]
    fn ticks_are_in_hundreds_of_milliseconds() {
        let start = Instant::now();
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick_at(start), 0.0);

        let dt = clock.tick_at(start + Duration::from_millis(250));
        assert!((dt - 2.5).abs() < 1e-5);

        let dt = clock.tick_at(start + Duration::from_millis(260));
        assert!((dt - 0.1).abs() < 1e-5);
    }

    #[test]
    fn going_backwards_is_a_zero_step() {
        let start = Instant::now();
        let mut clock = FrameClock::new();
        clock.tick_at(start + Duration::from_millis(50));
        assert_eq!(clock.tick_at(start), 0.0);
    }

    #[test]
    fn conversion() {
        assert_eq!(time_units(Duration::from_secs(1)), 10.0);
        assert_eq!(time_units(Duration::ZERO), 0.0);
    }
}
