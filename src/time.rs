//! Frame timing.

use std::time::Instant;

/// Tracks elapsed time since startup and hands out per-frame deltas.
///
/// The delta of the first frame is measured against a baseline of zero, so a
/// viewer that starts rendering late sees one large delta rather than a
/// negative or undefined one.
pub struct FrameClock {
    start: Instant,
    previous: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            previous: 0.0,
        }
    }

    /// Seconds since the clock was created.
    pub fn elapsed(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }

    /// Advance to the current time and return the delta since the last call.
    pub fn tick(&mut self) -> f32 {
        let elapsed = self.elapsed();
        self.advance(elapsed)
    }

    /// Advance to an explicit elapsed time. Split out from [`tick`](Self::tick)
    /// so the delta arithmetic is testable without real time passing.
    pub fn advance(&mut self, elapsed: f32) -> f32 {
        let delta = elapsed - self.previous;
        self.previous = elapsed;
        delta
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_delta_is_measured_from_zero() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.advance(0.25), 0.25);
    }

    #[test]
    fn subsequent_deltas_are_differences() {
        let mut clock = FrameClock::new();
        clock.advance(1.0);
        assert_eq!(clock.advance(1.75), 0.75);
        assert_eq!(clock.advance(2.0), 0.25);
    }
}
