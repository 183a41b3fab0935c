use std::time::{Duration, Instant};

/// Source of display-refresh ticks.
///
/// `next_tick` suspends until the next refresh and returns its timestamp.
/// Timestamps must be monotonically increasing. `None` means the source was
/// detached and will never tick again.
pub trait TickSource {
    fn next_tick(&mut self) -> Option<Instant>;
}

/// Scripted tick sequences (tests, replays).
impl<I> TickSource for I
where
    I: Iterator<Item = Instant>,
{
    fn next_tick(&mut self) -> Option<Instant> {
        self.next()
    }
}

/// Fixed-rate tick source for headless loops.
///
/// Sleeps the calling thread until each refresh deadline. Deadlines advance by a
/// whole period from the previous deadline, so sleep overshoot does not
/// accumulate; if the caller falls more than one period behind, the schedule
/// restarts from the current time instead of replaying missed refreshes.
#[derive(Debug, Clone)]
pub struct IntervalTicker {
    period: Duration,
    next: Instant,
    detached: bool,
}

impl IntervalTicker {
    /// Creates a ticker emulating a display refreshing at `refresh_hz`.
    pub fn new(refresh_hz: f32) -> Self {
        let period = Duration::from_secs_f64(1.0 / f64::from(refresh_hz.max(1.0)));
        Self {
            period,
            next: Instant::now() + period,
            detached: false,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Stops the ticker; every later `next_tick` returns `None`.
    pub fn detach(&mut self) {
        self.detached = true;
    }
}

impl TickSource for IntervalTicker {
    fn next_tick(&mut self) -> Option<Instant> {
        if self.detached {
            return None;
        }

        let now = Instant::now();
        if now < self.next {
            std::thread::sleep(self.next - now);
        } else if now - self.next > self.period {
            self.next = now;
        }

        let tick = Instant::now().max(self.next);
        self.next += self.period;
        Some(tick)
    }
}
