//! Fight resolution: a skill-gap-weighted coin flip.
//!
//! Both powers are floored to integers, the stronger side is labelled
//! the champion, and the normalized power gap picks an exponent for the
//! champion's win probability. Wide gaps skip the dice entirely; a
//! character's very first fight is a scripted win so nobody debuts with
//! a loss.
//!
//! Every intermediate value lands in [`CombatDiagnostics`] and is stored
//! on the finished match for audit and balancing work.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::models::MatchOutcome;

/// Full audit trail of one resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatDiagnostics {
    pub champion_power: i64,
    pub contestant_power: i64,
    pub gap: f64,
    /// Exponent applied to the gap; 0.0 when no curve was evaluated
    pub alpha: f64,
    pub p: f64,
    /// Uniform draw in [0, 1); absent when the outcome needed no dice
    pub dice_roll: Option<f64>,
    /// Outcome from the initiating player's perspective
    pub result: MatchOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Resolution result handed to the match lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CombatOutcome {
    pub player_won: bool,
    pub diagnostics: CombatDiagnostics,
}

struct Classified {
    champion_is_player: bool,
    champion_power: i64,
    contestant_power: i64,
    gap: f64,
    /// `None` means the gap is decisive and the champion wins outright
    alpha: Option<f64>,
}

fn classify(player_power: f64, opponent_power: f64, config: &EngineConfig) -> Classified {
    let player = player_power as i64;
    let opponent = opponent_power as i64;
    let champion_is_player = player >= opponent;
    let (champion, contestant) =
        if champion_is_player { (player, opponent) } else { (opponent, player) };

    let gap =
        if champion == 0 { 0.0 } else { (champion - contestant) as f64 / champion as f64 };

    Classified {
        champion_is_player,
        champion_power: champion,
        contestant_power: contestant,
        gap,
        alpha: select_alpha(gap, config),
    }
}

fn select_alpha(gap: f64, config: &EngineConfig) -> Option<f64> {
    if gap >= config.deterministic_gap {
        return None;
    }
    for tier in &config.alpha_tiers {
        let cleared = if tier.exclusive { gap > tier.min_gap } else { gap >= tier.min_gap };
        if cleared {
            return Some(tier.alpha);
        }
    }
    Some(config.alpha_base)
}

fn conclude(classified: Classified, roll: Option<f64>) -> CombatOutcome {
    let (p, dice_roll, champion_wins) = match classified.alpha {
        None => (1.0, None, true),
        Some(alpha) => {
            // champion^a / (champion^a + contestant^a), written in terms
            // of the gap: contestant/champion is exactly 1 - gap
            let p = 1.0 / (1.0 + (1.0 - classified.gap).powf(alpha));
            let roll = roll.expect("curve tiers always draw");
            (p, Some(roll), roll <= p)
        }
    };

    let player_won = champion_wins == classified.champion_is_player;
    CombatOutcome {
        player_won,
        diagnostics: CombatDiagnostics {
            champion_power: classified.champion_power,
            contestant_power: classified.contestant_power,
            gap: classified.gap,
            alpha: classified.alpha.unwrap_or(0.0),
            p,
            dice_roll,
            result: if player_won { MatchOutcome::Win } else { MatchOutcome::Lose },
            comment: None,
        },
    }
}

fn first_match_outcome(player_power: f64, opponent_power: f64) -> CombatOutcome {
    let player = player_power as i64;
    let opponent = opponent_power as i64;
    let (champion, contestant) =
        if player >= opponent { (player, opponent) } else { (opponent, player) };
    let gap = if champion == 0 { 0.0 } else { (champion - contestant) as f64 / champion as f64 };

    CombatOutcome {
        player_won: true,
        diagnostics: CombatDiagnostics {
            champion_power: champion,
            contestant_power: contestant,
            gap,
            alpha: 0.0,
            p: 1.0,
            dice_roll: None,
            result: MatchOutcome::Win,
            comment: Some("first match".to_string()),
        },
    }
}

/// Resolve a fight, drawing the dice from `rng` only when the gap tier
/// calls for one.
pub fn resolve(
    player_power: f64,
    opponent_power: f64,
    first_match: bool,
    rng: &mut impl Rng,
    config: &EngineConfig,
) -> CombatOutcome {
    if first_match {
        return first_match_outcome(player_power, opponent_power);
    }
    let classified = classify(player_power, opponent_power, config);
    let roll = classified.alpha.map(|_| rng.gen::<f64>());
    conclude(classified, roll)
}

/// Resolve with a pre-drawn dice value. The roll is ignored on the
/// deterministic path, mirroring [`resolve`].
pub fn resolve_with_roll(
    player_power: f64,
    opponent_power: f64,
    roll: f64,
    config: &EngineConfig,
) -> CombatOutcome {
    let classified = classify(player_power, opponent_power, config);
    let roll = classified.alpha.map(|_| roll);
    conclude(classified, roll)
}
