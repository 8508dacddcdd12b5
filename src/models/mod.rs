//! Data structures for the registry: players, matches, tournaments.

mod error;
mod game;
mod player;
mod tournament;

pub use error::RegistryError;
pub use game::{Match, MatchFormat, MatchId, MatchPatch, MatchResult, MatchStatus, NewMatch, PlayerRef};
pub use player::{NewPlayer, Player, PlayerId, PlayerPatch, BASELINE_RATING};
pub use tournament::{
    NewTournament, Tournament, TournamentFormat, TournamentId, TournamentPatch, TournamentStatus,
    TournamentType,
};
