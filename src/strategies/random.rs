use rand::{rngs::StdRng, Rng, SeedableRng};

use super::Policy;
use crate::{
    constants::action,
    env::{Observation, RawAction},
};

/// Uniformly random actions, the floor any learned policy has to beat
#[derive(Debug, Clone)]
pub struct RandomPolicy {
    rng: StdRng,
    granularity: usize,
}

impl RandomPolicy {
    pub fn new(granularity: usize, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            rng,
            granularity: granularity.max(1),
        }
    }
}

impl Policy for RandomPolicy {
    fn predict(&mut self, _observation: &Observation) -> RawAction {
        (
            self.rng.gen_range(0..action::TYPE_COUNT as u32),
            self.rng.gen_range(0..self.granularity as u32),
        )
    }
}
