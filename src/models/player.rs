//! Player records and their create/patch inputs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque unique identifier for a player (fresh ids are v4 UUID strings).
pub type PlayerId = String;

/// Rating every player starts from, and the value ratings shrink toward.
pub const BASELINE_RATING: i32 = 1500;

fn baseline_rating() -> i32 {
    BASELINE_RATING
}

/// A registered player.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Stored skill number. Displayed ratings go through the Bayesian blend.
    #[serde(default = "baseline_rating")]
    pub rating: i32,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Player {
    /// Create a player with a fresh id. The name is stored as given.
    pub fn new(name: impl Into<String>, rating: i32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            rating,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// Merge a patch into this player. Validation is the caller's job.
    pub fn apply(&mut self, patch: PlayerPatch) {
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(rating) = patch.rating {
            self.rating = rating;
        }
    }
}

/// Input for `Registry::add_player`.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlayer {
    #[serde(default)]
    pub name: String,
    /// Defaults to [`BASELINE_RATING`].
    #[serde(default)]
    pub rating: Option<i32>,
}

impl NewPlayer {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rating: None,
        }
    }

    pub fn with_rating(mut self, rating: i32) -> Self {
        self.rating = Some(rating);
        self
    }
}

/// Partial update for a player; `None` fields are left untouched.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub rating: Option<i32>,
}
