//! Local-first tournament registry: players, matches and tournaments persisted in a
//! key/value store, Bayesian ratings, and compact payloads for device-to-device transfer.

pub mod config;
pub mod export;
pub mod models;
pub mod payload;
pub mod rating;
pub mod registry;
pub mod store;

pub use config::Config;
pub use export::{
    export_data, import_data, standings, standings_csv, ImportError, ImportSummary, StandingRow,
};
pub use models::{
    Match, MatchFormat, MatchId, MatchPatch, MatchResult, MatchStatus, NewMatch, NewPlayer,
    NewTournament, Player, PlayerId, PlayerPatch, PlayerRef, RegistryError, Tournament,
    TournamentFormat, TournamentId, TournamentPatch, TournamentStatus, TournamentType,
    BASELINE_RATING,
};
pub use payload::{
    build_match_payload, build_tournament_payload, decode, decode_match, decode_tournament, encode,
    MatchPayload, Payload, PayloadError, PlayerSnapshot, TournamentPayload,
};
pub use rating::{bayesian_rating, matches_played, DEFAULT_CONFIDENCE_FACTOR};
pub use registry::{Registry, RegistrySettings};
pub use store::{FileStore, MemoryStore, Store, StoreError};
