//! Player mutators.

use super::Registry;
use crate::models::{NewPlayer, Player, PlayerPatch, RegistryError, BASELINE_RATING};
use chrono::Utc;
use std::sync::Arc;

impl Registry {
    /// Register a player. The name is trimmed and must not be empty; rating defaults to the baseline.
    pub fn add_player(&mut self, input: NewPlayer) -> Result<Player, RegistryError> {
        let name = input.name.trim();
        if name.is_empty() {
            log::debug!("Rejected player without a name");
            return Err(RegistryError::MissingField("name"));
        }
        let player = Player::new(name, input.rating.unwrap_or(BASELINE_RATING));
        Arc::make_mut(&mut self.players).push(player.clone());
        self.persist_players();
        log::info!("Added player {} ({})", player.name, player.id);
        Ok(player)
    }

    /// Merge `patch` into a player and stamp `updated_at`. Unknown ids give `Ok(None)`.
    pub fn update_player(
        &mut self,
        id: &str,
        patch: PlayerPatch,
    ) -> Result<Option<Player>, RegistryError> {
        if id.is_empty() {
            return Err(RegistryError::MissingField("id"));
        }
        if patch.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(RegistryError::MissingField("name"));
        }
        let Some(index) = self.players.iter().position(|p| p.id == id) else {
            return Ok(None);
        };
        let player = &mut Arc::make_mut(&mut self.players)[index];
        player.apply(patch);
        player.updated_at = Some(Utc::now());
        let updated = player.clone();
        self.persist_players();
        Ok(Some(updated))
    }

    /// Remove a player. Matches and tournaments that reference it are left alone.
    /// Returns whether anything was removed.
    pub fn remove_player(&mut self, id: &str) -> bool {
        if !self.players.iter().any(|p| p.id == id) {
            return false;
        }
        Arc::make_mut(&mut self.players).retain(|p| p.id != id);
        self.persist_players();
        log::info!("Removed player {id}");
        true
    }
}
