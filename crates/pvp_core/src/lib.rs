//! # pvp_core - PVP Battle & Progression Engine
//!
//! Rules engine for a casual PVP mini-game: who may fight whom, how a
//! fight is decided, how energy gates fight frequency and how coins and
//! levels move afterwards.
//!
//! ## Features
//! - Deterministic resolution (same state + seed = same result)
//! - Gap-weighted combat probability curve with full diagnostics
//! - Time-derived energy regeneration, no background scheduler
//! - Storage-agnostic: characters, wallets and matches live behind
//!   narrow store traits; an in-memory backend ships for tests and
//!   embedding
//! - JSON API for easy integration with game hosts

// Game engine entry points carry several explicit inputs (ids, time, seed)
#![allow(clippy::too_many_arguments)]

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod store;

// Re-export the operation surface
pub use api::{
    get_profile_json, search_match_json, skip_match_json, start_match_json,
    upgrade_abilities_json,
};
pub use config::{AlphaTier, EngineConfig, RewardTier, SkipCost};
pub use engine::{CombatDiagnostics, CombatOutcome, PvpEngine};
pub use error::{EngineError, Result};

// Re-export the data model
pub use models::{
    AbilityDelta, AbilityScores, Character, CharacterProfile, Competitor, MatchLoot,
    MatchOutcome, MatchRecord, MatchResultView, MatchView, Wallet,
};

// Re-export the storage seams
pub use store::{
    CharacterStore, LogNotifier, MatchStore, MemoryBackend, Notifier, WalletStore,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const SCHEMA_VERSION: u8 = 1;
