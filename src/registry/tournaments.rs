//! Tournament mutators and roster management.

use super::Registry;
use crate::models::{
    NewTournament, PlayerId, RegistryError, Tournament, TournamentPatch, TournamentStatus,
};
use chrono::Utc;
use std::sync::Arc;

impl Registry {
    /// Create a tournament. Name and format are required; roster defaults to empty and
    /// status to registration.
    pub fn add_tournament(&mut self, input: NewTournament) -> Result<Tournament, RegistryError> {
        let name = input.name.trim();
        if name.is_empty() {
            log::debug!("Rejected tournament without a name");
            return Err(RegistryError::MissingField("name"));
        }
        let Some(format) = input.format else {
            log::debug!("Rejected tournament without a format");
            return Err(RegistryError::MissingField("format"));
        };
        let mut tournament = Tournament::new(name, format);
        tournament.tournament_type = input.tournament_type.unwrap_or_default();
        tournament.players = input.players.unwrap_or_default();
        tournament.rounds = input.rounds.unwrap_or(0);
        tournament.status = input.status.unwrap_or(TournamentStatus::Registration);
        self.check_roster(&tournament, &[])?;
        Arc::make_mut(&mut self.tournaments).push(tournament.clone());
        self.persist_tournaments();
        log::info!("Added tournament {} ({})", tournament.name, tournament.id);
        Ok(tournament)
    }

    /// Merge `patch` into a tournament and stamp `updated_at`. Unknown ids give `Ok(None)`.
    ///
    /// Roster entries that were already present are not re-checked, so a tournament that
    /// still lists a removed player can be edited.
    pub fn update_tournament(
        &mut self,
        id: &str,
        patch: TournamentPatch,
    ) -> Result<Option<Tournament>, RegistryError> {
        if id.is_empty() {
            return Err(RegistryError::MissingField("id"));
        }
        if patch.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(RegistryError::MissingField("name"));
        }
        let Some(index) = self.tournaments.iter().position(|t| t.id == id) else {
            return Ok(None);
        };
        let previous = self.tournaments[index].players.clone();
        let mut candidate = self.tournaments[index].clone();
        candidate.apply(patch);
        self.check_roster(&candidate, &previous)?;
        candidate.updated_at = Some(Utc::now());
        Arc::make_mut(&mut self.tournaments)[index] = candidate.clone();
        self.persist_tournaments();
        Ok(Some(candidate))
    }

    /// Register a player in a tournament's roster.
    pub fn add_participant(
        &mut self,
        tournament_id: &str,
        player_id: &str,
    ) -> Result<Option<Tournament>, RegistryError> {
        let Some(tournament) = self.get_tournament_by_id(tournament_id) else {
            return Ok(None);
        };
        let mut players = tournament.players.clone();
        players.push(player_id.to_string());
        self.update_tournament(
            tournament_id,
            TournamentPatch {
                players: Some(players),
                ..TournamentPatch::default()
            },
        )
    }

    /// Drop a player from a tournament's roster. Dropping an absent player changes nothing.
    pub fn remove_participant(
        &mut self,
        tournament_id: &str,
        player_id: &str,
    ) -> Result<Option<Tournament>, RegistryError> {
        let Some(tournament) = self.get_tournament_by_id(tournament_id) else {
            return Ok(None);
        };
        if !tournament.has_player(player_id) {
            return Ok(Some(tournament.clone()));
        }
        let players = tournament
            .players
            .iter()
            .filter(|p| p.as_str() != player_id)
            .cloned()
            .collect();
        self.update_tournament(
            tournament_id,
            TournamentPatch {
                players: Some(players),
                ..TournamentPatch::default()
            },
        )
    }

    /// Remove a tournament. Returns whether anything was removed.
    pub fn remove_tournament(&mut self, id: &str) -> bool {
        if !self.tournaments.iter().any(|t| t.id == id) {
            return false;
        }
        Arc::make_mut(&mut self.tournaments).retain(|t| t.id != id);
        self.persist_tournaments();
        log::info!("Removed tournament {id}");
        true
    }

    /// Roster rules: the shape rules of [`Tournament::validate_roster`], plus new entries
    /// must resolve to a player.
    fn check_roster(
        &self,
        tournament: &Tournament,
        already_listed: &[PlayerId],
    ) -> Result<(), RegistryError> {
        tournament.validate_roster()?;
        match tournament
            .players
            .iter()
            .find(|id| !already_listed.contains(id) && self.get_player_by_id(id).is_none())
        {
            Some(unknown) => Err(RegistryError::UnknownPlayer(unknown.clone())),
            None => Ok(()),
        }
    }
}
