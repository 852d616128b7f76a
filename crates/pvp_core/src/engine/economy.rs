//! Coin rewards and penalties.
//!
//! The payout a fighter sees is keyed off the *other* side: low-level
//! opponents pay flat tier amounts, anyone past the flat tiers pays a
//! share of their own pre-fight wallet. Penalties stop at an empty
//! wallet; a decided fight never fails over its economic side effects.

use crate::config::EngineConfig;
use crate::models::Wallet;

/// Coin amounts at stake against one specific opponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stakes {
    /// Gained when beating this opponent
    pub win: i64,
    /// Lost (down to zero) when losing to this opponent
    pub loss: i64,
}

/// Stakes for fighting an opponent of the given level, with the
/// opponent's wallet sampled before any mutation.
pub fn stakes_against(
    opponent_level: u32,
    opponent_score_before: i64,
    config: &EngineConfig,
) -> Stakes {
    for tier in &config.reward_tiers {
        if tier.level == opponent_level {
            return Stakes { win: tier.win, loss: tier.loss };
        }
    }
    let share = (config.reward_score_share * opponent_score_before as f64).floor() as i64;
    Stakes { win: share, loss: share }
}

/// Move the decided amounts between the two wallets.
///
/// Returns the signed coin delta each side experienced, winner first.
pub fn settle(winner: &mut Wallet, loser: &mut Wallet, winner_gain: i64, loser_loss: i64) -> (i64, i64) {
    let loser_before = loser.score;
    winner.credit(winner_gain);
    loser.debit_saturating(loser_loss);
    (winner_gain, loser.score - loser_before)
}
