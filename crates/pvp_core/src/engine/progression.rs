//! Experience thresholds and level rules.

use once_cell::sync::Lazy;

/// Cumulative experience required to complete each level.
/// `EXP_TABLE[i]` closes level `i + 1`.
static EXP_TABLE: Lazy<Vec<u64>> =
    Lazy::new(|| vec![2, 12, 37, 77, 137, 222, 332, 482, 707, 1057, 1612]);

/// Level reached with `experience` points: the greatest `i` with
/// `experience >= EXP_TABLE[i - 1]`, zero below the first threshold.
pub fn level_for(experience: u64) -> u32 {
    EXP_TABLE.iter().take_while(|&&threshold| experience >= threshold).count() as u32
}

/// Threshold that completes the current level, for progress displays.
/// Past the end of the table the last threshold is reported.
pub fn next_threshold(experience: u64) -> u64 {
    EXP_TABLE
        .iter()
        .copied()
        .find(|&threshold| experience < threshold)
        .unwrap_or_else(|| *EXP_TABLE.last().unwrap())
}

/// Experience granted to the losing side of a resolved fight.
///
/// Only a loser that does not outlevel the winner learns anything:
/// equal levels teach a single point, losing upward teaches more, and
/// losing upward against superior power teaches the most. Powers are
/// compared floored, like the resolver sees them.
pub fn defeat_experience(
    loser_level: u32,
    winner_level: u32,
    loser_power: f64,
    winner_power: f64,
) -> u64 {
    if loser_level > winner_level {
        0
    } else if loser_level == winner_level {
        1
    } else if (winner_power as i64) > (loser_power as i64) {
        3
    } else {
        2
    }
}
