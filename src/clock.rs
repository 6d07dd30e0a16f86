use instant::Instant;

/// One redraw as seen by the render loop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTick {
    /// Number of frames rendered before this one.
    pub frame: u64,
    /// Seconds since the clock started.
    pub elapsed: f32,
}

/// Frame counter and time source for the render loop.
///
/// There is no frame limit: the loop keeps ticking until the window or page
/// goes away.
#[derive(Debug)]
pub struct FrameClock {
    start: Instant,
    frames: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(start: Instant) -> Self {
        Self { start, frames: 0 }
    }

    pub fn tick(&mut self) -> FrameTick {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> FrameTick {
        let tick = FrameTick {
            frame: self.frames,
            elapsed: now.duration_since(self.start).as_secs_f32(),
        };
        self.frames = self.frames.wrapping_add(1);
        tick
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use instant::Duration;

    use super::*;

    #[test]
    fn every_tick_counts_one_frame() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        for i in 0..10_000u64 {
            let tick = clock.tick_at(start + Duration::from_millis(i * 16));
            assert_eq!(tick.frame, i);
        }
        assert_eq!(clock.tick().frame, 10_000);
    }

    #[test]
    fn elapsed_is_measured_from_start() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        clock.tick_at(start + Duration::from_millis(500));
        let tick = clock.tick_at(start + Duration::from_millis(1500));
        assert!((tick.elapsed - 1.5).abs() < 1e-6);
        assert_eq!(tick.frame, 1);
    }
}
