use super::{Outcome, PredictionResponse};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::sync::{Mutex, PoisonError};

/// Predicts without any service: one uniform draw in [0, 1) is both the
/// confidence and, against the one-half threshold, the outcome.
#[derive(Debug)]
pub struct MockPredictor {
    rng: Mutex<StdRng>,
}

impl MockPredictor {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn draw(&self) -> PredictionResponse {
        let draw: f64 = self
            .rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .random();
        PredictionResponse::new(Outcome::from_draw(draw), draw)
    }
}

impl Default for MockPredictor {
    fn default() -> Self {
        Self::new()
    }
}
