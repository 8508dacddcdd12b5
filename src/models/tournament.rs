//! Tournament records: roster of player ids, pairing format, game type and status.

use crate::models::error::RegistryError;
use crate::models::player::PlayerId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Unique identifier for a tournament.
pub type TournamentId = String;

/// Pairing system.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum TournamentFormat {
    Swiss,
    #[serde(rename = "Single-Elimination")]
    SingleElimination,
    #[serde(rename = "Double-Elimination")]
    DoubleElimination,
    #[serde(rename = "Round-Robin")]
    RoundRobin,
}

/// Game type / deck construction rules.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum TournamentType {
    #[default]
    Standard,
    Modern,
    Legacy,
    Draft,
    Sealed,
}

/// Current phase of the tournament.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    /// Taking sign-ups; the only status allowed with an empty roster.
    #[default]
    Registration,
    Active,
    Completed,
    Cancelled,
}

/// A tournament. `players` holds ids only; order carries no meaning.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub format: TournamentFormat,
    #[serde(rename = "type", default)]
    pub tournament_type: TournamentType,
    #[serde(default)]
    pub players: Vec<PlayerId>,
    #[serde(default)]
    pub rounds: u32,
    #[serde(default)]
    pub status: TournamentStatus,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Tournament {
    /// Create a tournament in registration with no players.
    pub fn new(name: impl Into<String>, format: TournamentFormat) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            format,
            tournament_type: TournamentType::default(),
            players: Vec::new(),
            rounds: 0,
            status: TournamentStatus::Registration,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    pub fn has_player(&self, player_id: &str) -> bool {
        self.players.iter().any(|p| p == player_id)
    }

    /// Roster shape: no id listed twice, and only registration may be empty.
    /// Whether the ids resolve to players is left to the caller.
    pub fn validate_roster(&self) -> Result<(), RegistryError> {
        let mut seen = HashSet::new();
        if let Some(dup) = self.players.iter().find(|id| !seen.insert(id.as_str())) {
            return Err(RegistryError::DuplicateParticipant(dup.clone()));
        }
        if self.players.is_empty() && self.status != TournamentStatus::Registration {
            return Err(RegistryError::EmptyActiveTournament);
        }
        Ok(())
    }

    pub fn apply(&mut self, patch: TournamentPatch) {
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(format) = patch.format {
            self.format = format;
        }
        if let Some(tournament_type) = patch.tournament_type {
            self.tournament_type = tournament_type;
        }
        if let Some(players) = patch.players {
            self.players = players;
        }
        if let Some(rounds) = patch.rounds {
            self.rounds = rounds;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
    }
}

/// Input for `Registry::add_tournament`.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTournament {
    #[serde(default)]
    pub name: String,
    /// Required; `None` is rejected.
    #[serde(default)]
    pub format: Option<TournamentFormat>,
    #[serde(rename = "type", default)]
    pub tournament_type: Option<TournamentType>,
    #[serde(default)]
    pub players: Option<Vec<PlayerId>>,
    #[serde(default)]
    pub rounds: Option<u32>,
    #[serde(default)]
    pub status: Option<TournamentStatus>,
}

impl NewTournament {
    pub fn new(name: impl Into<String>, format: TournamentFormat) -> Self {
        Self {
            name: name.into(),
            format: Some(format),
            ..Self::default()
        }
    }

    pub fn with_players(mut self, players: Vec<PlayerId>) -> Self {
        self.players = Some(players);
        self
    }
}

/// Partial update for a tournament; `None` fields are left untouched.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub format: Option<TournamentFormat>,
    #[serde(rename = "type", default)]
    pub tournament_type: Option<TournamentType>,
    #[serde(default)]
    pub players: Option<Vec<PlayerId>>,
    #[serde(default)]
    pub rounds: Option<u32>,
    #[serde(default)]
    pub status: Option<TournamentStatus>,
}
