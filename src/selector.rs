//! Selection of the single best solution among the raw solutions of one
//! oracle call: filter by joint limits, then rank by harmonized distance
//! from the seed state.

use crate::chain::JointSpec;
use crate::kinematic_traits::{JointVector, SolutionSet};
use crate::limits::{harmonized_distance, obeys_limits};

/// Returns the limit obeying solution closest to the seed, or None if no
/// solution passes the limit filter. Ties are broken by enumeration order,
/// the first one found wins, so the result is deterministic for the same
/// solution set and seed.
pub fn closest_to_seed(
    solutions: &SolutionSet,
    joints: &[JointSpec],
    seed: &[f64],
) -> Option<JointVector> {
    let mut best: Option<(f64, JointVector)> = None;

    for raw in solutions.iter() {
        let candidate = raw.joints();
        if !obeys_limits(joints, candidate) {
            continue;
        }
        let dist = harmonized_distance(seed, candidate);
        log::debug!("Candidate at distance {} from seed", dist);
        match best {
            Some((best_dist, _)) if dist >= best_dist => {}
            _ => best = Some((dist, candidate.to_vec())),
        }
    }

    best.map(|(_, solution)| solution)
}
