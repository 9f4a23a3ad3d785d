use crate::models::{PairingHistory, Participant, Week};

/// Calculate the freshness weight (>= 0) for pairing `a` with `b`
///
/// Weight formula:
/// weight = (
///     (horizon - last_week)^2      # paired before: quadratic in weeks elapsed
///     horizon * (horizon + 1)      # never paired: sentinel
/// )
///
/// The sentinel is always larger than any historical weight, so every
/// never-paired combination is used up before a pairing is repeated.
#[inline]
pub fn calculate_pair_weight(
    a: &Participant,
    b: &Participant,
    history: &PairingHistory,
    horizon: Week,
) -> u64 {
    match history.last_paired(a, b) {
        Some(week) => elapsed_weight(horizon, week),
        None => sentinel_weight(horizon),
    }
}

/// Weight of a pair that has never been paired
#[inline]
pub fn sentinel_weight(horizon: Week) -> u64 {
    let horizon = u64::from(horizon);
    horizon * (horizon + 1)
}

/// Weight of a pair last paired in `week`
#[inline]
pub fn elapsed_weight(horizon: Week, week: Week) -> u64 {
    let elapsed = u64::from(horizon.abs_diff(week));
    elapsed * elapsed
}
