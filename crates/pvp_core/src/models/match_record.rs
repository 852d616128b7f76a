//! Match join entity.
//!
//! A match references both sides by id only; either character may be
//! mutated or deleted independently while the match is open. Resolution
//! happens exactly once, after which the record is immutable history.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::combat::CombatDiagnostics;

/// Fight result from the initiating player's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchOutcome {
    Win,
    Lose,
}

/// Coin delta applied to the initiating player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchLoot {
    pub coins: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRecord {
    pub match_id: Uuid,
    pub player_id: u64,
    pub opponent_id: u64,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub result: Option<MatchOutcome>,
    pub loot: Option<MatchLoot>,
    pub stats: Option<CombatDiagnostics>,
}

impl MatchRecord {
    pub fn new(player_id: u64, opponent_id: u64, now: DateTime<Utc>) -> Self {
        Self {
            match_id: Uuid::new_v4(),
            player_id,
            opponent_id,
            created: now,
            updated: now,
            finished_at: None,
            result: None,
            loot: None,
            stats: None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }

    /// An open match whose pairing outlived the staleness window needs a
    /// fresh opponent; the row itself is reused, never duplicated.
    pub fn is_stale(&self, now: DateTime<Utc>, stale_after: Duration) -> bool {
        !self.is_finished() && self.updated + stale_after < now
    }

    /// Point the open match at a new opponent.
    pub fn retarget(&mut self, opponent_id: u64, now: DateTime<Utc>) {
        self.opponent_id = opponent_id;
        self.updated = now;
    }

    /// Close the match with its outcome. Must only be called once.
    pub fn finish(
        &mut self,
        result: MatchOutcome,
        loot: MatchLoot,
        stats: CombatDiagnostics,
        now: DateTime<Utc>,
    ) {
        self.result = Some(result);
        self.loot = Some(loot);
        self.stats = Some(stats);
        self.finished_at = Some(now);
        self.updated = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_fresh_match_is_open() {
        let m = MatchRecord::new(1, 2, t0());
        assert!(!m.is_finished());
        assert!(!m.is_stale(t0(), Duration::minutes(30)));
    }

    #[test]
    fn test_staleness_boundary() {
        let m = MatchRecord::new(1, 2, t0());
        let window = Duration::minutes(30);
        // exactly at the boundary the pairing is still valid
        assert!(!m.is_stale(t0() + window, window));
        assert!(m.is_stale(t0() + window + Duration::seconds(1), window));
    }

    #[test]
    fn test_retarget_keeps_identity() {
        let mut m = MatchRecord::new(1, 2, t0());
        let id = m.match_id;
        m.retarget(9, t0() + Duration::minutes(40));
        assert_eq!(m.match_id, id);
        assert_eq!(m.opponent_id, 9);
        assert_eq!(m.created, t0());
        assert!(m.updated > m.created);
    }
}
