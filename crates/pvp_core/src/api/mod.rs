pub mod json_api;

pub use json_api::{
    get_profile_json, search_match_json, skip_match_json, start_match_json,
    upgrade_abilities_json, ProfileRequest, SearchRequest, SkipRequest, StartRequest,
    UpgradeRequest,
};
