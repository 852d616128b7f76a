//! Read models returned by the engine operations.
//!
//! Power is floored for display; the stored float stays internal to the
//! combat math.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::character::{AbilityScores, Character};
use super::match_record::{MatchLoot, MatchOutcome};

/// Current energy as seen by the client.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CharacterEnergy {
    pub remaining: f64,
    pub maximum: u32,
    /// Seconds until the next whole energy point
    pub time_to_restore_secs: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterExperience {
    pub current: u64,
    /// Threshold that completes the current level
    pub maximum: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremiumStatus {
    pub active: bool,
    pub until: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterProfile {
    pub user_id: u64,
    pub username: String,
    pub abilities: AbilityScores,
    pub energy: CharacterEnergy,
    pub level: u32,
    pub experience: CharacterExperience,
    pub power: i64,
    pub premium: Option<PremiumStatus>,
}

/// Lifetime fight record shown next to a competitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PvpStats {
    pub total: u32,
    pub won: u32,
    pub loot: i64,
}

/// One side of a pairing as shown to the other side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Competitor {
    pub user_id: u64,
    pub username: String,
    pub level: u32,
    pub power: i64,
    pub abilities: AbilityScores,
    pub premium: bool,
    pub stats: Option<PvpStats>,
}

impl Competitor {
    pub fn from_character(character: &Character, today: NaiveDate) -> Self {
        Self {
            user_id: character.user_id,
            username: character.username.clone(),
            level: character.level,
            power: character.power as i64,
            abilities: character.abilities,
            premium: character.is_premium(today),
            stats: Some(PvpStats {
                total: character.matches_total,
                won: character.matches_won,
                loot: character.loot_total,
            }),
        }
    }
}

/// An open pairing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchView {
    pub match_id: Uuid,
    pub player: Competitor,
    pub opponent: Competitor,
}

/// Terminal outcome handed back from a started fight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResultView {
    pub result: MatchOutcome,
    pub loot: Option<MatchLoot>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_competitor_floors_power() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let character = Character::new(3, "visitor".into(), 2, now);
        let competitor = Competitor::from_character(&character, now.date_naive());
        // default power 12.0575 floors to 12
        assert_eq!(competitor.power, 12);
        assert_eq!(competitor.stats.unwrap().total, 0);
        assert!(!competitor.premium);
    }
}
