//! Match lifecycle and the engine's operation surface.
//!
//! A match moves Pending → Finished; a stale pending match is
//! re-targeted at a fresh opponent instead of being replaced, so a
//! player holds at most one open match row.
//!
//! `start_match` is ordered so that every fallible check runs before the
//! first store write: if anything refuses (terminal state, expiry,
//! energy), the caller sees an error and no record changed. Once the
//! dice have decided, economic side effects saturate rather than fail
//! and the outcome is always persisted. Operations take `now` and `seed`
//! from the request layer; the same inputs replay to the same outcome.

use std::sync::Arc;

use chrono::{DateTime, Days, NaiveDate, Utc};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

use crate::config::{EngineConfig, SkipCost};
use crate::engine::{combat, economy, energy, matchmaker, progression};
use crate::error::{EngineError, Result};
use crate::models::{
    AbilityDelta, AbilityScores, Character, CharacterEnergy, CharacterExperience,
    CharacterProfile, Competitor, MatchLoot, MatchOutcome, MatchRecord, MatchResultView,
    MatchView, PremiumStatus,
};
use crate::store::{CharacterStore, MatchStore, Notifier, WalletStore};

pub struct PvpEngine {
    characters: Arc<dyn CharacterStore>,
    wallets: Arc<dyn WalletStore>,
    matches: Arc<dyn MatchStore>,
    notifier: Arc<dyn Notifier>,
    config: EngineConfig,
}

impl PvpEngine {
    pub fn new(
        characters: Arc<dyn CharacterStore>,
        wallets: Arc<dyn WalletStore>,
        matches: Arc<dyn MatchStore>,
        notifier: Arc<dyn Notifier>,
        config: EngineConfig,
    ) -> Self {
        Self { characters, wallets, matches, notifier, config }
    }

    /// Wire every seam to one shared backend.
    pub fn from_backend<B>(backend: Arc<B>, config: EngineConfig) -> Self
    where
        B: CharacterStore + WalletStore + MatchStore + Notifier + 'static,
    {
        Self::new(
            backend.clone(),
            backend.clone(),
            backend.clone(),
            backend,
            config,
        )
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Profile lookup. A first access mints a default character, but
    /// only for an existing account (one with a wallet row).
    pub fn get_profile(&self, user_id: u64, now: DateTime<Utc>) -> Result<CharacterProfile> {
        let character = match self.characters.get(user_id) {
            Ok(character) => character,
            Err(EngineError::NotFound { .. }) => {
                let wallet = self.wallets.get(user_id)?;
                let character = Character::new(
                    user_id,
                    wallet.username,
                    self.config.energy_standard_max,
                    now,
                );
                self.characters.upsert(&character)?;
                log::info!("created character for user {}", user_id);
                character
            }
            Err(err) => return Err(err),
        };
        Ok(self.profile_view(&character, now))
    }

    /// Spend coins to raise ability scores; power follows the new stats.
    pub fn upgrade_abilities(
        &self,
        user_id: u64,
        delta: &AbilityDelta,
    ) -> Result<AbilityScores> {
        let mut character = self.characters.get(user_id)?;
        let mut wallet = self.wallets.get(user_id)?;

        let cost = character.abilities.upgrade_cost(delta);
        if !wallet.can_pay(cost) {
            return Err(EngineError::InsufficientFunds {
                required: cost,
                available: wallet.score,
            });
        }

        wallet.debit_saturating(cost);
        character.apply_ability_delta(delta);
        self.characters.upsert(&character)?;
        self.wallets.upsert(&wallet)?;
        log::info!(
            "user {} paid {} coins for an upgrade, power now {:.2}",
            user_id,
            cost,
            character.power
        );
        Ok(character.abilities)
    }

    /// Current pairing for the player, creating or refreshing one as
    /// needed. An open, fresh pairing is returned untouched.
    pub fn search_match(
        &self,
        user_id: u64,
        now: DateTime<Utc>,
        seed: u64,
    ) -> Result<MatchView> {
        let player = self.characters.get(user_id)?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let (record, opponent) = match self.matches.find_open(user_id)? {
            None => {
                let opponent = self.find_opponent_for(&player, now, &mut rng)?;
                let record = MatchRecord::new(user_id, opponent.user_id, now);
                self.matches.upsert(&record)?;
                log::info!("match {} opened for user {}", record.match_id, user_id);
                (record, opponent)
            }
            Some(mut record) => {
                if record.is_stale(now, self.config.stale_after()) {
                    let opponent = self.find_opponent_for(&player, now, &mut rng)?;
                    record.retarget(opponent.user_id, now);
                    self.matches.upsert(&record)?;
                    (record, opponent)
                } else {
                    match self.characters.get(record.opponent_id) {
                        Ok(opponent) => (record, opponent),
                        Err(EngineError::NotFound { .. }) => {
                            // the paired opponent was deleted under us
                            let opponent = self.find_opponent_for(&player, now, &mut rng)?;
                            record.retarget(opponent.user_id, now);
                            self.matches.upsert(&record)?;
                            (record, opponent)
                        }
                        Err(err) => return Err(err),
                    }
                }
            }
        };

        let today = now.date_naive();
        Ok(MatchView {
            match_id: record.match_id,
            player: Competitor::from_character(&player, today),
            opponent: Competitor::from_character(&opponent, today),
        })
    }

    /// Pay the skip cost, release the assigned opponent and draw a new
    /// one into the same match row.
    pub fn skip_match(
        &self,
        match_id: Uuid,
        now: DateTime<Utc>,
        seed: u64,
    ) -> Result<Competitor> {
        let mut record = self.matches.get(match_id)?;
        if record.is_finished() {
            return Err(EngineError::MatchAlreadyFinished { match_id: match_id.to_string() });
        }

        let player = self.characters.get(record.player_id)?;
        let mut wallet = self.wallets.get(record.player_id)?;
        match self.config.skip_cost {
            SkipCost::Tickets(amount) if !wallet.can_pay_tickets(amount) => {
                return Err(EngineError::InsufficientResource {
                    resource: "tickets",
                    required: amount,
                    available: wallet.tickets,
                });
            }
            SkipCost::Coins(amount) if !wallet.can_pay(amount) => {
                return Err(EngineError::InsufficientResource {
                    resource: "coins",
                    required: amount,
                    available: wallet.score,
                });
            }
            _ => {}
        }

        // release the abandoned opponent's reservation
        match self.characters.get(record.opponent_id) {
            Ok(mut abandoned) => {
                abandoned.invulnerable_until = None;
                self.characters.upsert(&abandoned)?;
            }
            Err(EngineError::NotFound { .. }) => {}
            Err(err) => return Err(err),
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let opponent = self.find_opponent_for(&player, now, &mut rng)?;

        match self.config.skip_cost {
            SkipCost::Tickets(amount) => wallet.tickets -= amount,
            SkipCost::Coins(amount) => wallet.debit_saturating(amount),
        }
        self.wallets.upsert(&wallet)?;

        record.retarget(opponent.user_id, now);
        self.matches.upsert(&record)?;
        log::info!(
            "match {} skipped to opponent {}",
            record.match_id,
            record.opponent_id
        );
        Ok(Competitor::from_character(&opponent, now.date_naive()))
    }

    /// Fight the assigned opponent and close the match.
    pub fn start_match(
        &self,
        match_id: Uuid,
        now: DateTime<Utc>,
        seed: u64,
    ) -> Result<MatchResultView> {
        let mut record = self.matches.get(match_id)?;
        if record.is_finished() {
            return Err(EngineError::MatchAlreadyFinished { match_id: match_id.to_string() });
        }
        if record.updated + self.config.stale_after() < now {
            return Err(EngineError::MatchExpired { match_id: match_id.to_string() });
        }

        let mut player = self.characters.get(record.player_id)?;
        let mut opponent = self.characters.get(record.opponent_id)?;
        let mut player_wallet = self.wallets.get(record.player_id)?;
        let mut opponent_wallet = self.wallets.get(record.opponent_id)?;

        // last refusal point; nothing has been written yet
        energy::consume_fight_charge(&mut player, now, &self.config)?;

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let outcome = combat::resolve(
            player.power,
            opponent.power,
            player.is_first_match(),
            &mut rng,
            &self.config,
        );

        // each side's stake keys off the other side, sampled pre-settle
        let player_stakes =
            economy::stakes_against(opponent.level, opponent_wallet.score, &self.config);
        let opponent_stakes =
            economy::stakes_against(player.level, player_wallet.score, &self.config);

        let (player_delta, opponent_delta) = if outcome.player_won {
            economy::settle(
                &mut player_wallet,
                &mut opponent_wallet,
                player_stakes.win,
                opponent_stakes.loss,
            )
        } else {
            let (opponent_delta, player_delta) = economy::settle(
                &mut opponent_wallet,
                &mut player_wallet,
                opponent_stakes.win,
                player_stakes.loss,
            );
            (player_delta, opponent_delta)
        };

        {
            let (winner, loser) = if outcome.player_won {
                (&mut player, &mut opponent)
            } else {
                (&mut opponent, &mut player)
            };
            let gained = progression::defeat_experience(
                loser.level,
                winner.level,
                loser.power,
                winner.power,
            );
            if gained > 0 {
                loser.experience += gained;
                loser.level = progression::level_for(loser.experience);
            }
            winner.matches_won += 1;
        }
        player.matches_total += 1;
        opponent.matches_total += 1;
        player.loot_total += player_delta;
        opponent.loot_total += opponent_delta;

        self.apply_defense_cooldown(&mut opponent, now);

        let result = if outcome.player_won { MatchOutcome::Win } else { MatchOutcome::Lose };
        record.finish(result, MatchLoot { coins: player_delta }, outcome.diagnostics, now);

        self.characters.upsert(&player)?;
        self.characters.upsert(&opponent)?;
        self.wallets.upsert(&player_wallet)?;
        self.wallets.upsert(&opponent_wallet)?;
        self.matches.upsert(&record)?;
        log::info!(
            "match {} finished: user {} {:?} vs user {} ({:+} coins)",
            record.match_id,
            player.user_id,
            result,
            opponent.user_id,
            player_delta
        );

        let text = match result {
            MatchOutcome::Win => {
                format!("{} attacked you and took {} coins", player.username, -opponent_delta)
            }
            MatchOutcome::Lose => {
                format!("{} attacked you and lost {} coins to you", player.username, opponent_delta)
            }
        };
        if let Err(err) = self.notifier.notify(opponent.user_id, &text) {
            log::warn!("notification to user {} dropped: {}", opponent.user_id, err);
        }

        Ok(MatchResultView { result, loot: record.loot })
    }

    fn find_opponent_for(
        &self,
        player: &Character,
        now: DateTime<Utc>,
        rng: &mut ChaCha8Rng,
    ) -> Result<Character> {
        matchmaker::find_opponent(
            self.characters.as_ref(),
            player.user_id,
            player.level,
            player.is_premium(now.date_naive()),
            now,
            rng,
            &self.config,
        )
    }

    /// Defense bookkeeping for the attacked side. The counter is scoped
    /// to the calendar day; hitting the cap trades the short cooldown
    /// for a lockout until the end of the next day.
    fn apply_defense_cooldown(&self, defender: &mut Character, now: DateTime<Utc>) {
        let today = now.date_naive();
        if defender.last_defence_date != Some(today) {
            defender.defences_today = 0;
            defender.last_defence_date = Some(today);
        }
        defender.defences_today += 1;

        if defender.defences_today >= self.config.daily_defense_cap {
            defender.invulnerable_until = Some(end_of_next_day(today));
            defender.defences_today = 0;
        } else {
            defender.invulnerable_until = Some(now + self.config.defense_window());
        }
    }

    fn profile_view(&self, character: &Character, now: DateTime<Utc>) -> CharacterProfile {
        let today = now.date_naive();
        let tier = energy::tier_for(character, today, &self.config);
        let remaining = energy::remaining(
            character.energy_base,
            tier.max,
            tier.rate_per_hour,
            character.energy_timestamp,
            now,
        );
        let wait = energy::time_to_restore(remaining, tier.max, tier.rate_per_hour);

        CharacterProfile {
            user_id: character.user_id,
            username: character.username.clone(),
            abilities: character.abilities,
            energy: CharacterEnergy {
                remaining,
                maximum: tier.max,
                time_to_restore_secs: wait.num_seconds(),
            },
            level: character.level,
            experience: CharacterExperience {
                current: character.experience,
                maximum: progression::next_threshold(character.experience),
            },
            power: character.power as i64,
            premium: character.premium_until.map(|until| PremiumStatus {
                active: character.is_premium(today),
                until,
            }),
        }
    }
}

/// Midnight closing the day after `today`.
fn end_of_next_day(today: NaiveDate) -> DateTime<Utc> {
    today
        .checked_add_days(Days::new(2))
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("calendar overflow")
        .and_utc()
}
