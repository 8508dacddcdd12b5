//! Validation errors returned by registry mutators.

use crate::models::player::PlayerId;
use thiserror::Error;

/// Why a registry mutator refused its input. Nothing is written when one of these is returned.
///
/// "Not found" is not an error: lookups return `None` and updates of unknown ids return `Ok(None)`.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum RegistryError {
    /// A required field was empty or absent.
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    /// Both sides of a match are the same player.
    #[error("a player cannot be matched against themselves")]
    SelfMatch,
    /// The same player appears twice in a tournament roster.
    #[error("player {0} is already registered in this tournament")]
    DuplicateParticipant(PlayerId),
    /// A roster entry being added does not resolve to a player.
    #[error("no player with id {0}")]
    UnknownPlayer(PlayerId),
    /// Only tournaments in registration may have an empty roster.
    #[error("a tournament past registration needs at least one player")]
    EmptyActiveTournament,
}
