//! Step enumeration for the redundant joint search: a bidirectional zig-zag
//! around the initial guess, bounded independently on each side.
//!
//! The counter sequence is `0, +1, -1, +2, -2, ...`; a side that hits its
//! bound drops out and the other side keeps stepping until both are
//! exhausted. The free joint value probed at each step is
//! `initial_guess + step_size * counter`.

use crate::chain::JointSpec;

/// Number of whole discretization steps that fit between the initial guess
/// and the joint bound on each side. An optional consistency window (how far
/// the free joint may deviate from the seed) tightens the bounds before
/// counting; the tighter of the two always wins.
pub fn increment_counts(
    spec: &JointSpec,
    initial_guess: f64,
    step: f64,
    consistency_window: Option<f64>,
) -> (i32, i32) {
    let (max_limit, min_limit) = match consistency_window {
        Some(window) => (
            f64::min(spec.max, initial_guess + window),
            f64::max(spec.min, initial_guess - window),
        ),
        None => (spec.max, spec.min),
    };

    let num_positive = ((max_limit - initial_guess) / step) as i32;
    let num_negative = ((initial_guess - min_limit) / step) as i32;
    (num_positive.max(0), num_negative.max(0))
}

/// Signed step counter of one search call. Starts at 0 (the seed value
/// itself) and zig-zags outwards, preferring to flip sign each step.
#[derive(Debug)]
pub struct StepEnumerator {
    counter: i32,
    max_count: i32,
    min_count: i32,
}

impl StepEnumerator {
    pub fn new(num_positive: i32, num_negative: i32) -> Self {
        StepEnumerator {
            counter: 0,
            max_count: num_positive,
            min_count: -num_negative,
        }
    }

    pub fn counter(&self) -> i32 {
        self.counter
    }

    /// Moves to the next counter value. Returns false when both directions
    /// are exhausted; the search reports "no solution" then.
    pub fn advance(&mut self) -> bool {
        if self.counter > 0 {
            if -self.counter >= self.min_count {
                self.counter = -self.counter;
                true
            } else if self.counter + 1 <= self.max_count {
                self.counter += 1;
                true
            } else {
                false
            }
        } else if 1 - self.counter <= self.max_count {
            self.counter = 1 - self.counter;
            true
        } else if self.counter - 1 >= self.min_count {
            self.counter -= 1;
            true
        } else {
            false
        }
    }
}
