//! Time-driven pipe spawning.

use std::time::{Duration, Instant};

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::game::GameEvent;
use crate::timer::Interval;

pub const DEFAULT_SPAWN_PERIOD: Duration = Duration::from_millis(2000);

/// Emits a [`GameEvent::SpawnPipe`] every period of wall-clock time,
/// whatever the frame rate.
pub struct PipeSpawner<R: Rng = StdRng> {
    interval: Interval,
    rng: R,
}

impl PipeSpawner<StdRng> {
    /// Seeded spawners repeat the same sequence of pipe heights.
    pub fn from_seed(period: Duration, start: Instant, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(period, start, rng)
    }
}

impl<R: Rng> PipeSpawner<R> {
    pub fn new(period: Duration, start: Instant, rng: R) -> Self {
        Self {
            interval: Interval::new(period, start),
            rng,
        }
    }

    pub fn poll(&mut self, now: Instant) -> Option<GameEvent> {
        if !self.interval.fire(now) {
            return None;
        }
        let roll = self.rng.gen_range(0.0..1.0);
        Some(GameEvent::SpawnPipe { roll })
    }
}
