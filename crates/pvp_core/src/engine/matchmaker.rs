//! Opponent search.
//!
//! Eligibility is a level band around the searching player plus the
//! invulnerability check. Candidates come from a bounded random sample
//! supplied by the character store, so a search never scans the whole
//! population; the pick is uniform over the sample.
//!
//! The chosen opponent is reserved by stamping `invulnerable_until`.
//! That write is advisory: two concurrent searches can both read the
//! same candidate as free before either reservation lands. The window
//! is accepted and short (see the store contract).

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::models::Character;
use crate::store::CharacterStore;

/// Eligibility predicate for one search.
#[derive(Debug, Clone, Copy)]
pub struct OpponentFilter {
    pub exclude_user: u64,
    pub min_level: u32,
    pub max_level: u32,
    pub now: DateTime<Utc>,
}

impl OpponentFilter {
    /// Level band of `level_band` around the player. The floor never
    /// drops below 1 for players past level 0, so climbing out of the
    /// starter bracket also leaves its pool behind.
    pub fn for_player(
        player_id: u64,
        player_level: u32,
        now: DateTime<Utc>,
        config: &EngineConfig,
    ) -> Self {
        let min_level = if player_level == 0 {
            0
        } else {
            player_level.saturating_sub(config.level_band).max(1)
        };
        Self {
            exclude_user: player_id,
            min_level,
            max_level: player_level + config.level_band,
            now,
        }
    }

    pub fn matches(&self, candidate: &Character) -> bool {
        candidate.user_id != self.exclude_user
            && candidate.level >= self.min_level
            && candidate.level <= self.max_level
            && !candidate.is_invulnerable(self.now)
    }
}

/// Find and reserve an opponent for the player.
///
/// Fails with [`EngineError::NoOpponentAvailable`] when the sampled pool
/// is empty; callers retry later rather than widening the search here.
pub fn find_opponent<R: Rng>(
    characters: &dyn CharacterStore,
    player_id: u64,
    player_level: u32,
    player_is_premium: bool,
    now: DateTime<Utc>,
    rng: &mut R,
    config: &EngineConfig,
) -> Result<Character> {
    let filter = OpponentFilter::for_player(player_id, player_level, now, config);
    let limit =
        if player_is_premium { config.sample_size_premium } else { config.sample_size };

    let mut candidates = characters.sample_opponents(&filter, limit, &mut *rng)?;
    if candidates.is_empty() {
        return Err(EngineError::NoOpponentAvailable);
    }
    // stable pick order no matter how the backend iterates
    candidates.sort_by_key(|c| c.user_id);

    let mut opponent = candidates[rng.gen_range(0..candidates.len())].clone();
    opponent.invulnerable_until = Some(now + config.reservation_window());
    characters.upsert(&opponent)?;
    log::debug!(
        "reserved opponent {} (level {}) for player {} until {:?}",
        opponent.user_id,
        opponent.level,
        player_id,
        opponent.invulnerable_until
    );
    Ok(opponent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryBackend;
    use chrono::{Duration, TimeZone};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn character(user_id: u64, level: u32) -> Character {
        let mut c = Character::new(user_id, format!("fighter-{user_id}"), 2, t0());
        c.level = level;
        c
    }

    #[test]
    fn test_band_floor_for_starter_bracket() {
        let config = EngineConfig::default();
        let filter = OpponentFilter::for_player(1, 0, t0(), &config);
        assert_eq!((filter.min_level, filter.max_level), (0, 2));
    }

    #[test]
    fn test_band_floor_clamps_to_one_above_starter() {
        let config = EngineConfig::default();
        let filter = OpponentFilter::for_player(1, 1, t0(), &config);
        assert_eq!((filter.min_level, filter.max_level), (1, 3));

        let filter = OpponentFilter::for_player(1, 2, t0(), &config);
        assert_eq!((filter.min_level, filter.max_level), (1, 4));

        let filter = OpponentFilter::for_player(1, 6, t0(), &config);
        assert_eq!((filter.min_level, filter.max_level), (4, 8));
    }

    #[test]
    fn test_filter_rejects_self_and_invulnerable() {
        let config = EngineConfig::default();
        let filter = OpponentFilter::for_player(1, 2, t0(), &config);

        assert!(!filter.matches(&character(1, 2)));
        assert!(filter.matches(&character(2, 2)));

        let mut shielded = character(3, 2);
        shielded.invulnerable_until = Some(t0() + Duration::minutes(5));
        assert!(!filter.matches(&shielded));

        // an expired shield no longer blocks selection
        shielded.invulnerable_until = Some(t0() - Duration::minutes(5));
        assert!(filter.matches(&shielded));
    }

    #[test]
    fn test_find_opponent_reserves_choice() {
        let config = EngineConfig::default();
        let backend = MemoryBackend::new();
        backend.put_character(character(2, 1));

        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let opponent =
            find_opponent(&backend, 1, 1, false, t0(), &mut rng, &config).unwrap();
        assert_eq!(opponent.user_id, 2);
        assert_eq!(opponent.invulnerable_until, Some(t0() + Duration::minutes(30)));

        // the reservation is persisted, not just returned
        let stored = CharacterStore::get(&backend, 2).unwrap();
        assert_eq!(stored.invulnerable_until, opponent.invulnerable_until);
    }

    #[test]
    fn test_reserved_candidate_blocks_next_search() {
        let config = EngineConfig::default();
        let backend = MemoryBackend::new();
        backend.put_character(character(2, 1));

        let mut rng = ChaCha8Rng::seed_from_u64(7);
        find_opponent(&backend, 1, 1, false, t0(), &mut rng, &config).unwrap();

        let result = find_opponent(&backend, 3, 1, false, t0(), &mut rng, &config);
        assert!(matches!(result, Err(EngineError::NoOpponentAvailable)));
    }

    #[test]
    fn test_empty_pool() {
        let config = EngineConfig::default();
        let backend = MemoryBackend::new();
        // only candidates far outside the band
        backend.put_character(character(2, 9));

        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let result = find_opponent(&backend, 1, 1, false, t0(), &mut rng, &config);
        assert!(matches!(result, Err(EngineError::NoOpponentAvailable)));
    }

    #[test]
    fn test_pick_respects_filter_over_large_pool() {
        let config = EngineConfig::default();
        let backend = MemoryBackend::new();
        for user_id in 2..60 {
            backend.put_character(character(user_id, (user_id % 8) as u32));
        }

        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let opponent =
                find_opponent(&backend, 1, 3, true, t0() + Duration::hours(seed as i64), &mut rng, &config)
                    .unwrap();
            assert!(opponent.level >= 1 && opponent.level <= 5);
            assert_ne!(opponent.user_id, 1);
        }
    }
}
