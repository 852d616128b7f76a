//! String-in/string-out wrappers over the engine operations.
//!
//! Hosts that embed the crate through an FFI boundary speak JSON here
//! instead of linking against the model types. Requests carry an
//! explicit `now` and, where dice or sampling are involved, a `seed`;
//! the same request string always produces the same response.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::engine::PvpEngine;
use crate::error::{EngineError, Result};
use crate::models::{
    AbilityDelta, AbilityScores, CharacterProfile, Competitor, MatchResultView, MatchView,
};
use crate::SCHEMA_VERSION;

#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    pub schema_version: u8,
    pub user_id: u64,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct UpgradeRequest {
    pub schema_version: u8,
    pub user_id: u64,
    pub delta: AbilityDelta,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub schema_version: u8,
    pub user_id: u64,
    pub now: DateTime<Utc>,
    pub seed: u64,
}

#[derive(Debug, Deserialize)]
pub struct SkipRequest {
    pub schema_version: u8,
    pub match_id: Uuid,
    pub now: DateTime<Utc>,
    pub seed: u64,
}

#[derive(Debug, Deserialize)]
pub struct StartRequest {
    pub schema_version: u8,
    pub match_id: Uuid,
    pub now: DateTime<Utc>,
    pub seed: u64,
}

#[derive(Debug, Serialize)]
struct ProfileResponse {
    schema_version: u8,
    profile: CharacterProfile,
}

#[derive(Debug, Serialize)]
struct UpgradeResponse {
    schema_version: u8,
    abilities: AbilityScores,
}

#[derive(Debug, Serialize)]
struct SearchResponse {
    schema_version: u8,
    pairing: MatchView,
}

#[derive(Debug, Serialize)]
struct SkipResponse {
    schema_version: u8,
    opponent: Competitor,
}

#[derive(Debug, Serialize)]
struct StartResponse {
    schema_version: u8,
    outcome: MatchResultView,
}

fn check_schema(found: u8) -> Result<()> {
    if found != SCHEMA_VERSION {
        return Err(EngineError::UnsupportedSchema { expected: SCHEMA_VERSION, found });
    }
    Ok(())
}

pub fn get_profile_json(engine: &PvpEngine, request_json: &str) -> Result<String> {
    let request: ProfileRequest = serde_json::from_str(request_json)?;
    check_schema(request.schema_version)?;
    let profile = engine.get_profile(request.user_id, request.now)?;
    Ok(serde_json::to_string(&ProfileResponse { schema_version: SCHEMA_VERSION, profile })?)
}

pub fn upgrade_abilities_json(engine: &PvpEngine, request_json: &str) -> Result<String> {
    let request: UpgradeRequest = serde_json::from_str(request_json)?;
    check_schema(request.schema_version)?;
    let abilities = engine.upgrade_abilities(request.user_id, &request.delta)?;
    info!("abilities upgraded for user {}", request.user_id);
    Ok(serde_json::to_string(&UpgradeResponse { schema_version: SCHEMA_VERSION, abilities })?)
}

pub fn search_match_json(engine: &PvpEngine, request_json: &str) -> Result<String> {
    let request: SearchRequest = serde_json::from_str(request_json)?;
    check_schema(request.schema_version)?;
    let pairing = engine
        .search_match(request.user_id, request.now, request.seed)
        .map_err(|err| {
            warn!("search failed for user {}: {}", request.user_id, err);
            err
        })?;
    Ok(serde_json::to_string(&SearchResponse { schema_version: SCHEMA_VERSION, pairing })?)
}

pub fn skip_match_json(engine: &PvpEngine, request_json: &str) -> Result<String> {
    let request: SkipRequest = serde_json::from_str(request_json)?;
    check_schema(request.schema_version)?;
    let opponent = engine.skip_match(request.match_id, request.now, request.seed)?;
    Ok(serde_json::to_string(&SkipResponse { schema_version: SCHEMA_VERSION, opponent })?)
}

pub fn start_match_json(engine: &PvpEngine, request_json: &str) -> Result<String> {
    let request: StartRequest = serde_json::from_str(request_json)?;
    check_schema(request.schema_version)?;
    let outcome = engine
        .start_match(request.match_id, request.now, request.seed)
        .map_err(|err| {
            warn!("start failed for match {}: {}", request.match_id, err);
            err
        })?;
    info!("match {} resolved: {:?}", request.match_id, outcome.result);
    Ok(serde_json::to_string(&StartResponse { schema_version: SCHEMA_VERSION, outcome })?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::models::{Character, Wallet};
    use crate::store::memory::MemoryBackend;
    use chrono::TimeZone;
    use serde_json::json;
    use std::sync::Arc;

    fn engine_with_two_fighters() -> (Arc<MemoryBackend>, PvpEngine) {
        let backend = Arc::new(MemoryBackend::new());
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        for user_id in 1..=2u64 {
            let mut wallet = Wallet::new(user_id, format!("user-{user_id}"));
            wallet.score = 100;
            backend.put_wallet(wallet);
            let mut character = Character::new(user_id, format!("user-{user_id}"), 2, now);
            character.matches_total = 1;
            backend.put_character(character);
        }

        let engine = PvpEngine::from_backend(backend.clone(), EngineConfig::default());
        (backend, engine)
    }

    #[test]
    fn test_profile_round_trip() {
        let (_backend, engine) = engine_with_two_fighters();
        let request = json!({
            "schema_version": 1,
            "user_id": 1,
            "now": "2024-05-01T12:00:00Z"
        });

        let response = get_profile_json(&engine, &request.to_string()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&response).unwrap();
        assert_eq!(parsed["schema_version"], 1);
        assert_eq!(parsed["profile"]["user_id"], 1);
        assert_eq!(parsed["profile"]["power"], 12);
    }

    #[test]
    fn test_search_and_start_round_trip() {
        let (_backend, engine) = engine_with_two_fighters();
        let search = json!({
            "schema_version": 1,
            "user_id": 1,
            "now": "2024-05-01T12:00:00Z",
            "seed": 42
        });

        let response = search_match_json(&engine, &search.to_string()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&response).unwrap();
        let match_id = parsed["pairing"]["match_id"].as_str().unwrap().to_string();
        assert_eq!(parsed["pairing"]["opponent"]["user_id"], 2);

        let start = json!({
            "schema_version": 1,
            "match_id": match_id,
            "now": "2024-05-01T12:05:00Z",
            "seed": 42
        });
        let response = start_match_json(&engine, &start.to_string()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&response).unwrap();
        let result = parsed["outcome"]["result"].as_str().unwrap();
        assert!(result == "win" || result == "lose");
    }

    #[test]
    fn test_same_request_same_response() {
        let (_backend, engine) = engine_with_two_fighters();
        let search = json!({
            "schema_version": 1,
            "user_id": 1,
            "now": "2024-05-01T12:00:00Z",
            "seed": 7
        })
        .to_string();

        let first = search_match_json(&engine, &search).unwrap();
        let second = search_match_json(&engine, &search).unwrap();
        assert_eq!(first, second, "an open pairing replays identically");
    }

    #[test]
    fn test_malformed_request() {
        let (_backend, engine) = engine_with_two_fighters();
        let result = get_profile_json(&engine, "{not json");
        assert!(matches!(result, Err(EngineError::Serialization(_))));
    }

    #[test]
    fn test_schema_version_is_enforced() {
        let (_backend, engine) = engine_with_two_fighters();
        let request = json!({
            "schema_version": 9,
            "user_id": 1,
            "now": "2024-05-01T12:00:00Z"
        });
        let result = get_profile_json(&engine, &request.to_string());
        assert!(matches!(
            result,
            Err(EngineError::UnsupportedSchema { expected: 1, found: 9 })
        ));
    }
}
