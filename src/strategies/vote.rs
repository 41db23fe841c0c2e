use hashbrown::HashMap;

use super::Policy;
use crate::env::{Observation, RawAction};

/// The most frequent action. Ties go to whichever of the tied actions appeared first.
pub fn vote(predictions: &[RawAction]) -> Option<RawAction> {
    let mut counts: HashMap<RawAction, (usize, usize)> = HashMap::new();

    for (index, prediction) in predictions.iter().enumerate() {
        counts.entry(*prediction).or_insert((0, index)).0 += 1;
    }

    counts
        .into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|(action, _)| action)
}

/// Asks a stochastic policy `times` times about the same observation and takes the vote
pub fn predict_with_votes<P: Policy + ?Sized>(
    policy: &mut P,
    observation: &Observation,
    times: usize,
) -> Option<RawAction> {
    let predictions: Vec<RawAction> = (0..times).map(|_| policy.predict(observation)).collect();

    vote(&predictions)
}
