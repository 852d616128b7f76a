//! Character record and ability scores.
//!
//! `power` is a derived value: the weighted sum of the five ability
//! scores under fixed coefficients. Every mutation of the abilities must
//! go through [`Character::apply_ability_delta`] (or call
//! [`Character::recompute_power`]) so the stored value never drifts from
//! the scores it was computed from.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// Per-stat power coefficients. The same exponents drive the upgrade
// cost curve, so a stat that contributes more to power also costs more
// to raise.
const COEFF_STRENGTH: f64 = 2.595;
const COEFF_DEFENCE: f64 = 2.3425;
const COEFF_SPEED: f64 = 2.270;
const COEFF_WEIGHT: f64 = 2.380;
const COEFF_COMBINATIONS: f64 = 2.470;

/// The five trainable ability scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScores {
    pub strength: u32,
    pub defence: u32,
    pub speed: u32,
    pub weight: u32,
    pub combinations: u32,
}

/// Requested per-stat increments. Absent stats stay untouched.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AbilityDelta {
    pub strength: Option<u32>,
    pub defence: Option<u32>,
    pub speed: Option<u32>,
    pub weight: Option<u32>,
    pub combinations: Option<u32>,
}

impl Default for AbilityScores {
    fn default() -> Self {
        Self { strength: 1, defence: 1, speed: 1, weight: 1, combinations: 1 }
    }
}

impl AbilityScores {
    /// Weighted sum of all five scores.
    pub fn power(&self) -> f64 {
        self.strength as f64 * COEFF_STRENGTH
            + self.defence as f64 * COEFF_DEFENCE
            + self.speed as f64 * COEFF_SPEED
            + self.weight as f64 * COEFF_WEIGHT
            + self.combinations as f64 * COEFF_COMBINATIONS
    }

    /// Total coin cost of applying `delta` on top of the current scores.
    ///
    /// Each step from level `l` to `l+1` costs `l^coef` coins, summed per
    /// stat over the whole increment and rounded up per stat.
    pub fn upgrade_cost(&self, delta: &AbilityDelta) -> i64 {
        let mut cost = 0i64;
        if let Some(d) = delta.strength {
            cost += step_cost(self.strength, self.strength + d, COEFF_STRENGTH);
        }
        if let Some(d) = delta.defence {
            cost += step_cost(self.defence, self.defence + d, COEFF_DEFENCE);
        }
        if let Some(d) = delta.speed {
            cost += step_cost(self.speed, self.speed + d, COEFF_SPEED);
        }
        if let Some(d) = delta.weight {
            cost += step_cost(self.weight, self.weight + d, COEFF_WEIGHT);
        }
        if let Some(d) = delta.combinations {
            cost += step_cost(self.combinations, self.combinations + d, COEFF_COMBINATIONS);
        }
        cost
    }

    pub fn apply(&mut self, delta: &AbilityDelta) {
        if let Some(d) = delta.strength {
            self.strength += d;
        }
        if let Some(d) = delta.defence {
            self.defence += d;
        }
        if let Some(d) = delta.speed {
            self.speed += d;
        }
        if let Some(d) = delta.weight {
            self.weight += d;
        }
        if let Some(d) = delta.combinations {
            self.combinations += d;
        }
    }
}

fn step_cost(current: u32, target: u32, coefficient: f64) -> i64 {
    let mut cost = 0.0f64;
    for level in current..target {
        cost += (level as f64).powf(coefficient);
    }
    cost.ceil() as i64
}

/// One player's fighter.
///
/// Energy is stored as a base value plus the timestamp it was sampled
/// at; the current amount is recomputed from elapsed time on demand.
/// `invulnerable_until` doubles as the matchmaking reservation and the
/// post-defense cooldown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub user_id: u64,
    pub username: String,
    pub abilities: AbilityScores,
    pub power: f64,
    pub level: u32,
    pub experience: u64,

    pub energy_base: f64,
    pub energy_timestamp: DateTime<Utc>,
    pub energy_max: u32,
    /// Pre-paid charges, spent one per fight before timed energy
    pub energy_boost: u32,

    pub invulnerable_until: Option<DateTime<Utc>>,
    pub defences_today: u32,
    pub last_defence_date: Option<NaiveDate>,

    pub premium_until: Option<NaiveDate>,

    pub matches_total: u32,
    pub matches_won: u32,
    /// Net coins earned and lost across all finished matches
    pub loot_total: i64,
}

impl Character {
    /// Fresh character for a first profile access: base abilities, level
    /// zero, a full standard energy bar.
    pub fn new(user_id: u64, username: String, energy_max: u32, now: DateTime<Utc>) -> Self {
        let abilities = AbilityScores::default();
        let power = abilities.power();
        Self {
            user_id,
            username,
            abilities,
            power,
            level: 0,
            experience: 0,
            energy_base: energy_max as f64,
            energy_timestamp: now,
            energy_max,
            energy_boost: 0,
            invulnerable_until: None,
            defences_today: 0,
            last_defence_date: None,
            premium_until: None,
            matches_total: 0,
            matches_won: 0,
            loot_total: 0,
        }
    }

    pub fn recompute_power(&mut self) {
        self.power = self.abilities.power();
    }

    /// Apply a stat increment and refresh the derived power.
    pub fn apply_ability_delta(&mut self, delta: &AbilityDelta) {
        self.abilities.apply(delta);
        self.recompute_power();
    }

    /// Premium covers a date through the day after expiry.
    pub fn is_premium(&self, on: NaiveDate) -> bool {
        match self.premium_until {
            Some(until) => match until.succ_opt() {
                Some(grace_end) => on <= grace_end,
                None => true,
            },
            None => false,
        }
    }

    pub fn is_invulnerable(&self, now: DateTime<Utc>) -> bool {
        matches!(self.invulnerable_until, Some(until) if until > now)
    }

    /// Never fought before; such a character gets the bootstrap win.
    pub fn is_first_match(&self) -> bool {
        self.matches_total == 0
    }
}
