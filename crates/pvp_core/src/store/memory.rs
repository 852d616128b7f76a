//! In-memory store backend.
//!
//! Backs all four store seams with mutex-guarded maps. Used by the test
//! suites and by hosts that embed the engine without a database.

use std::collections::BTreeMap;
use std::sync::Mutex;

use rand::seq::IteratorRandom;
use rand::RngCore;
use uuid::Uuid;

use super::{CharacterStore, MatchStore, Notifier, WalletStore};
use crate::engine::matchmaker::OpponentFilter;
use crate::error::{EngineError, Result};
use crate::models::{Character, MatchRecord, Wallet};

#[derive(Debug, Default)]
pub struct MemoryBackend {
    characters: Mutex<BTreeMap<u64, Character>>,
    wallets: Mutex<BTreeMap<u64, Wallet>>,
    matches: Mutex<BTreeMap<Uuid, MatchRecord>>,
    notifications: Mutex<Vec<(u64, String)>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_character(&self, character: Character) {
        self.characters.lock().unwrap().insert(character.user_id, character);
    }

    pub fn put_wallet(&self, wallet: Wallet) {
        self.wallets.lock().unwrap().insert(wallet.user_id, wallet);
    }

    pub fn remove_character(&self, user_id: u64) {
        self.characters.lock().unwrap().remove(&user_id);
    }

    /// Notifications delivered so far, in send order.
    pub fn sent_notifications(&self) -> Vec<(u64, String)> {
        self.notifications.lock().unwrap().clone()
    }
}

impl CharacterStore for MemoryBackend {
    fn get(&self, user_id: u64) -> Result<Character> {
        self.characters
            .lock()
            .unwrap()
            .get(&user_id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("character", user_id))
    }

    fn upsert(&self, character: &Character) -> Result<()> {
        self.characters.lock().unwrap().insert(character.user_id, character.clone());
        Ok(())
    }

    fn sample_opponents(
        &self,
        filter: &OpponentFilter,
        limit: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Character>> {
        let characters = self.characters.lock().unwrap();
        let sample = characters
            .values()
            .filter(|c| filter.matches(c))
            .cloned()
            .choose_multiple(rng, limit);
        Ok(sample)
    }
}

impl WalletStore for MemoryBackend {
    fn get(&self, user_id: u64) -> Result<Wallet> {
        self.wallets
            .lock()
            .unwrap()
            .get(&user_id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("wallet", user_id))
    }

    fn upsert(&self, wallet: &Wallet) -> Result<()> {
        self.wallets.lock().unwrap().insert(wallet.user_id, wallet.clone());
        Ok(())
    }
}

impl MatchStore for MemoryBackend {
    fn get(&self, match_id: Uuid) -> Result<MatchRecord> {
        self.matches
            .lock()
            .unwrap()
            .get(&match_id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("match", match_id))
    }

    fn find_open(&self, player_id: u64) -> Result<Option<MatchRecord>> {
        let matches = self.matches.lock().unwrap();
        Ok(matches.values().find(|m| m.player_id == player_id && !m.is_finished()).cloned())
    }

    fn upsert(&self, record: &MatchRecord) -> Result<()> {
        self.matches.lock().unwrap().insert(record.match_id, record.clone());
        Ok(())
    }
}

impl Notifier for MemoryBackend {
    fn notify(&self, user_id: u64, text: &str) -> Result<()> {
        self.notifications.lock().unwrap().push((user_id, text.to_string()));
        Ok(())
    }
}

/// Notifier that always fails. Exercises the swallow-and-log path.
#[derive(Debug, Default)]
pub struct FailingNotifier;

impl Notifier for FailingNotifier {
    fn notify(&self, _user_id: u64, _text: &str) -> Result<()> {
        Err(EngineError::Storage("notification channel down".to_string()))
    }
}
