//! Engine tuning parameters.
//!
//! Every balance constant the engine consumes lives here so a host can
//! load an adjusted table from JSON without touching engine code.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Exponent tier for the combat probability curve.
///
/// Tiers are evaluated in declaration order; the first tier whose floor
/// the gap clears selects the exponent. `exclusive` makes the floor a
/// strict `>` comparison instead of `>=`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AlphaTier {
    pub min_gap: f64,
    #[serde(default)]
    pub exclusive: bool,
    pub alpha: f64,
}

/// Flat coin reward/penalty pair for one opponent level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RewardTier {
    pub level: u32,
    pub win: i64,
    pub loss: i64,
}

/// What a skip costs and which wallet pocket pays for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipCost {
    Tickets(i64),
    Coins(i64),
}

/// Complete tuning table for the battle and progression engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    // === Energy ===
    /// Energy cap for newly created characters (standard tier)
    pub energy_standard_max: u32,
    /// Standard regeneration, points per hour
    pub energy_standard_rate: f64,
    /// Energy cap while premium is active
    pub energy_premium_max: u32,
    /// Premium regeneration, points per hour
    pub energy_premium_rate: f64,

    // === Cooldowns & windows (minutes) ===
    /// Defender cooldown after losing/winning a defense
    pub defense_window_mins: i64,
    /// Defenses per day before the extended lockout kicks in
    pub daily_defense_cap: u32,
    /// A pending match older than this needs a fresh opponent
    pub stale_after_mins: i64,
    /// How long a matchmaking reservation holds a candidate
    pub reservation_mins: i64,

    // === Matchmaking ===
    /// Half-width of the opponent level band
    pub level_band: u32,
    /// Candidate sample bound per search
    pub sample_size: usize,
    /// Candidate sample bound for premium players
    pub sample_size_premium: usize,

    // === Combat curve ===
    /// Gap at or above which the stronger side wins outright
    pub deterministic_gap: f64,
    /// Exponent tiers, widest gap first
    pub alpha_tiers: Vec<AlphaTier>,
    /// Exponent when no tier matches (near-even fights)
    pub alpha_base: f64,

    // === Economy ===
    /// Flat reward tiers for low opponent levels
    pub reward_tiers: Vec<RewardTier>,
    /// Opponent-wallet share used above the flat tiers
    pub reward_score_share: f64,
    /// Cost of skipping the assigned opponent
    pub skip_cost: SkipCost,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            energy_standard_max: 2,
            energy_standard_rate: 4.0,
            energy_premium_max: 5,
            energy_premium_rate: 12.0,

            defense_window_mins: 30,
            daily_defense_cap: 3,
            stale_after_mins: 30,
            reservation_mins: 30,

            level_band: 2,
            sample_size: 16,
            sample_size_premium: 32,

            deterministic_gap: 0.75,
            alpha_tiers: vec![
                AlphaTier { min_gap: 0.51, exclusive: false, alpha: 1.746 },
                AlphaTier { min_gap: 0.49, exclusive: false, alpha: 1.8 },
                AlphaTier { min_gap: 0.44, exclusive: true, alpha: 1.9 },
            ],
            alpha_base: 2.0,

            reward_tiers: vec![
                RewardTier { level: 0, win: 150, loss: 30 },
                RewardTier { level: 1, win: 250, loss: 50 },
            ],
            reward_score_share: 0.05,
            skip_cost: SkipCost::Tickets(1),
        }
    }
}

impl EngineConfig {
    pub fn defense_window(&self) -> Duration {
        Duration::minutes(self.defense_window_mins)
    }

    pub fn stale_after(&self) -> Duration {
        Duration::minutes(self.stale_after_mins)
    }

    pub fn reservation_window(&self) -> Duration {
        Duration::minutes(self.reservation_mins)
    }
}
