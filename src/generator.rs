use rand::Rng;
use std::time::Duration;

use crate::session::{SessionConfig, TrialSpec};

/// Draw the `TrialSpec` for trial `index`.
///
/// The target slot is uniform over the whole grid and drawn with replacement,
/// so the same slot can come up on consecutive trials. The arm delay is
/// uniform over the inclusive delay range; equal bounds yield a constant.
/// `config` must already be validated.
pub fn next_spec<R: Rng + ?Sized>(
    config: &SessionConfig,
    index: usize,
    rng: &mut R,
) -> TrialSpec {
    let target_slot = rng.gen_range(0..config.slot_count());
    let delay_ms = rng.gen_range(config.min_delay_ms..=config.max_delay_ms);

    TrialSpec {
        index,
        target_slot,
        arm_delay: Duration::from_millis(delay_ms),
    }
}
