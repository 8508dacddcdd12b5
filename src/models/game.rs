//! Match (game) records: two players, a best-of format, a status and an optional result.

use crate::models::player::PlayerId;
use crate::models::tournament::TournamentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = String;

/// `{id, name}` snapshot of a player taken when the match was created.
/// The id is the live reference; the name is only a fallback for display.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayerRef {
    #[serde(default)]
    pub id: PlayerId,
    #[serde(default)]
    pub name: String,
}

impl PlayerRef {
    pub fn id(id: impl Into<PlayerId>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
        }
    }
}

/// How many games decide the match.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum MatchFormat {
    #[serde(rename = "Best of 1")]
    BestOf1,
    #[default]
    #[serde(rename = "Best of 3")]
    BestOf3,
    #[serde(rename = "Best of 5")]
    BestOf5,
}

impl MatchFormat {
    /// Number of games played at most.
    pub fn max_rounds(self) -> u32 {
        match self {
            MatchFormat::BestOf1 => 1,
            MatchFormat::BestOf3 => 3,
            MatchFormat::BestOf5 => 5,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

/// Outcome of a finished match.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchResult {
    Player1,
    Player2,
    Draw,
}

/// A single match between two players.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredMatch")]
pub struct Match {
    pub id: MatchId,
    pub player1: PlayerRef,
    pub player2: PlayerRef,
    pub format: MatchFormat,
    pub max_rounds: u32,
    pub status: MatchStatus,
    /// None until a result is recorded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<MatchResult>,
    /// Tournament this match was played in; None for a quick match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tournament_id: Option<TournamentId>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Stored shape of a match; a record without `maxRounds` takes its format's count.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredMatch {
    id: MatchId,
    player1: PlayerRef,
    player2: PlayerRef,
    #[serde(default)]
    format: MatchFormat,
    #[serde(default)]
    max_rounds: Option<u32>,
    #[serde(default)]
    status: MatchStatus,
    #[serde(default)]
    result: Option<MatchResult>,
    #[serde(default)]
    tournament_id: Option<TournamentId>,
    #[serde(default = "Utc::now")]
    created_at: DateTime<Utc>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl From<StoredMatch> for Match {
    fn from(stored: StoredMatch) -> Self {
        Self {
            id: stored.id,
            player1: stored.player1,
            player2: stored.player2,
            format: stored.format,
            max_rounds: stored
                .max_rounds
                .unwrap_or_else(|| stored.format.max_rounds()),
            status: stored.status,
            result: stored.result,
            tournament_id: stored.tournament_id,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        }
    }
}

impl Match {
    /// Create a scheduled match with a fresh id.
    pub fn new(player1: PlayerRef, player2: PlayerRef, format: MatchFormat) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            player1,
            player2,
            format,
            max_rounds: format.max_rounds(),
            status: MatchStatus::Scheduled,
            result: None,
            tournament_id: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// True if the player sits on either side of this match.
    pub fn involves(&self, player_id: &str) -> bool {
        self.player1.id == player_id || self.player2.id == player_id
    }

    /// Game wins needed to take the match (ceil of half the max rounds).
    pub fn required_wins(&self) -> u32 {
        self.max_rounds.div_ceil(2)
    }

    /// Merge a patch. A new format without an explicit `max_rounds` resets it from the format.
    pub fn apply(&mut self, patch: MatchPatch) {
        if let Some(player1) = patch.player1 {
            self.player1 = player1;
        }
        if let Some(player2) = patch.player2 {
            self.player2 = player2;
        }
        if let Some(format) = patch.format {
            self.format = format;
            self.max_rounds = format.max_rounds();
        }
        if let Some(max_rounds) = patch.max_rounds {
            self.max_rounds = max_rounds;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(result) = patch.result {
            self.result = Some(result);
        }
        if let Some(tournament_id) = patch.tournament_id {
            self.tournament_id = Some(tournament_id);
        }
    }
}

/// Input for `Registry::add_match`.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMatch {
    #[serde(default)]
    pub player1: PlayerRef,
    #[serde(default)]
    pub player2: PlayerRef,
    /// Defaults to best of 3.
    #[serde(default)]
    pub format: Option<MatchFormat>,
    /// Defaults to the format's game count.
    #[serde(default)]
    pub max_rounds: Option<u32>,
    /// Defaults to scheduled.
    #[serde(default)]
    pub status: Option<MatchStatus>,
    #[serde(default)]
    pub tournament_id: Option<TournamentId>,
}

impl NewMatch {
    pub fn between(player1: impl Into<PlayerId>, player2: impl Into<PlayerId>) -> Self {
        Self {
            player1: PlayerRef::id(player1),
            player2: PlayerRef::id(player2),
            ..Self::default()
        }
    }

    pub fn with_format(mut self, format: MatchFormat) -> Self {
        self.format = Some(format);
        self
    }
}

/// Partial update for a match; `None` fields are left untouched.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchPatch {
    #[serde(default)]
    pub player1: Option<PlayerRef>,
    #[serde(default)]
    pub player2: Option<PlayerRef>,
    #[serde(default)]
    pub format: Option<MatchFormat>,
    #[serde(default)]
    pub max_rounds: Option<u32>,
    #[serde(default)]
    pub status: Option<MatchStatus>,
    #[serde(default)]
    pub result: Option<MatchResult>,
    #[serde(default)]
    pub tournament_id: Option<TournamentId>,
}
