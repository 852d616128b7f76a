//! Storage and notification seams.
//!
//! The engine owns game rules, not persistence: characters, wallets and
//! matches live behind these traits so a host can back them with its own
//! database. All methods are synchronous and best-effort; the engine
//! never retries a failed call.

pub mod memory;

use rand::RngCore;
use uuid::Uuid;

use crate::engine::matchmaker::OpponentFilter;
use crate::error::Result;
use crate::models::{Character, MatchRecord, Wallet};

pub use memory::{FailingNotifier, MemoryBackend};

pub trait CharacterStore: Send + Sync {
    fn get(&self, user_id: u64) -> Result<Character>;
    fn upsert(&self, character: &Character) -> Result<()>;

    /// Up to `limit` characters matching `filter`, randomized by the
    /// backend. This is the matchmaker's bounded-cost sample; a backend
    /// must not fall back to returning the whole eligible population.
    fn sample_opponents(
        &self,
        filter: &OpponentFilter,
        limit: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Character>>;
}

pub trait WalletStore: Send + Sync {
    fn get(&self, user_id: u64) -> Result<Wallet>;
    fn upsert(&self, wallet: &Wallet) -> Result<()>;
}

pub trait MatchStore: Send + Sync {
    fn get(&self, match_id: Uuid) -> Result<MatchRecord>;
    /// The player's single open (unfinished) match, if any.
    fn find_open(&self, player_id: u64) -> Result<Option<MatchRecord>>;
    fn upsert(&self, record: &MatchRecord) -> Result<()>;
}

/// Outbound chat notification hook. Fire-and-forget: the lifecycle logs
/// and drops any error instead of surfacing it.
pub trait Notifier: Send + Sync {
    fn notify(&self, user_id: u64, text: &str) -> Result<()>;
}

/// Notifier that only writes to the log. Useful as a default when the
/// host has no chat channel wired up.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, user_id: u64, text: &str) -> Result<()> {
        log::info!("notify user {}: {}", user_id, text);
        Ok(())
    }
}
