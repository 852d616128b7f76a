pub mod character;
pub mod match_record;
pub mod profile;
pub mod wallet;

pub use character::{AbilityDelta, AbilityScores, Character};
pub use match_record::{MatchLoot, MatchOutcome, MatchRecord};
pub use profile::{
    CharacterEnergy, CharacterExperience, CharacterProfile, Competitor, MatchResultView,
    MatchView, PremiumStatus, PvpStats,
};
pub use wallet::Wallet;
