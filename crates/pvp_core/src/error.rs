use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("not enough energy: required {required}, available {available:.2}")]
    InsufficientEnergy { required: u32, available: f64 },

    #[error("not enough coins: required {required}, available {available}")]
    InsufficientFunds { required: i64, available: i64 },

    #[error("not enough {resource}: required {required}, available {available}")]
    InsufficientResource { resource: &'static str, required: i64, available: i64 },

    #[error("match {match_id} expired, search for a new opponent")]
    MatchExpired { match_id: String },

    #[error("match {match_id} is already finished")]
    MatchAlreadyFinished { match_id: String },

    #[error("no opponent available right now")]
    NoOpponentAvailable,

    #[error("unsupported schema version {found}, expected {expected}")]
    UnsupportedSchema { expected: u8, found: u8 },

    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EngineError {
    /// Whether the caller can fix the failure by acting (topping up a
    /// resource, re-searching) rather than by retrying the same call.
    pub fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            EngineError::InsufficientEnergy { .. }
                | EngineError::InsufficientFunds { .. }
                | EngineError::InsufficientResource { .. }
                | EngineError::MatchExpired { .. }
                | EngineError::MatchAlreadyFinished { .. }
        )
    }

    /// Transient failures where retrying later may succeed without any
    /// caller action. The engine itself never retries.
    pub fn is_transient(&self) -> bool {
        matches!(self, EngineError::NoOpponentAvailable | EngineError::Storage(_))
    }

    pub(crate) fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        EngineError::NotFound { entity, id: id.to_string() }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
