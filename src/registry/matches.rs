//! Match mutators.

use super::Registry;
use crate::models::{
    Match, MatchPatch, MatchResult, MatchStatus, NewMatch, PlayerRef, RegistryError,
};
use crate::payload::UNKNOWN_PLAYER_NAME;
use chrono::Utc;
use std::sync::Arc;

impl Registry {
    /// Schedule a match between two players. Both ids are required and must differ.
    pub fn add_match(&mut self, input: NewMatch) -> Result<Match, RegistryError> {
        if input.player1.id.is_empty() {
            log::debug!("Rejected match without player 1");
            return Err(RegistryError::MissingField("player1.id"));
        }
        if input.player2.id.is_empty() {
            log::debug!("Rejected match without player 2");
            return Err(RegistryError::MissingField("player2.id"));
        }
        if input.player1.id == input.player2.id {
            return Err(RegistryError::SelfMatch);
        }
        let format = input.format.unwrap_or_default();
        let mut game = Match::new(
            self.player_ref(input.player1),
            self.player_ref(input.player2),
            format,
        );
        game.max_rounds = input.max_rounds.unwrap_or(format.max_rounds());
        game.status = input.status.unwrap_or(MatchStatus::Scheduled);
        game.tournament_id = input.tournament_id;
        Arc::make_mut(&mut self.matches).push(game.clone());
        self.persist_matches();
        log::info!(
            "Added match {} ({} vs {})",
            game.id,
            game.player1.name,
            game.player2.name
        );
        Ok(game)
    }

    /// Merge `patch` into a match and stamp `updated_at`. Unknown ids give `Ok(None)`.
    pub fn update_match(
        &mut self,
        id: &str,
        patch: MatchPatch,
    ) -> Result<Option<Match>, RegistryError> {
        if id.is_empty() {
            return Err(RegistryError::MissingField("id"));
        }
        let Some(index) = self.matches.iter().position(|m| m.id == id) else {
            return Ok(None);
        };
        let mut candidate = self.matches[index].clone();
        candidate.apply(patch);
        if candidate.player1.id.is_empty() {
            return Err(RegistryError::MissingField("player1.id"));
        }
        if candidate.player2.id.is_empty() {
            return Err(RegistryError::MissingField("player2.id"));
        }
        if candidate.player1.id == candidate.player2.id {
            return Err(RegistryError::SelfMatch);
        }
        candidate.updated_at = Some(Utc::now());
        Arc::make_mut(&mut self.matches)[index] = candidate.clone();
        self.persist_matches();
        Ok(Some(candidate))
    }

    /// Record the outcome of a match and mark it completed.
    pub fn record_match_result(
        &mut self,
        id: &str,
        result: MatchResult,
    ) -> Result<Option<Match>, RegistryError> {
        self.update_match(
            id,
            MatchPatch {
                result: Some(result),
                status: Some(MatchStatus::Completed),
                ..MatchPatch::default()
            },
        )
    }

    /// Remove a match. Returns whether anything was removed.
    pub fn remove_match(&mut self, id: &str) -> bool {
        if !self.matches.iter().any(|m| m.id == id) {
            return false;
        }
        Arc::make_mut(&mut self.matches).retain(|m| m.id != id);
        self.persist_matches();
        log::info!("Removed match {id}");
        true
    }

    /// Fill in the display name of a reference: live name, else the supplied one, else "Unknown".
    fn player_ref(&self, reference: PlayerRef) -> PlayerRef {
        let name = match self.get_player_by_id(&reference.id) {
            Some(player) => player.name.clone(),
            None if !reference.name.trim().is_empty() => reference.name.trim().to_string(),
            None => UNKNOWN_PLAYER_NAME.to_string(),
        };
        PlayerRef {
            id: reference.id,
            name,
        }
    }
}
