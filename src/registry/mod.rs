//! Entity Registry: typed CRUD over players, matches and tournaments, backed by a [`Store`].
//!
//! Collections are held behind `Arc` and replaced copy-on-write on every mutation, so a
//! snapshot handed out by [`Registry::players`] and friends never changes under its holder.
//! Every mutator persists its collection before returning.

mod matches;
mod players;
mod tournaments;

use crate::models::{Match, MatchId, Player, Tournament, TournamentId};
use crate::payload::{self, Payload};
use crate::rating::{bayesian_rating, DEFAULT_CONFIDENCE_FACTOR};
use crate::store::{
    self, Store, MATCHES_KEY, PLAYERS_KEY, SELECTED_MATCH_KEY, SELECTED_TOURNAMENT_KEY,
    TOURNAMENTS_KEY,
};
use std::sync::Arc;

/// Tunables for derived values.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RegistrySettings {
    /// Virtual prior match count for the Bayesian rating.
    pub confidence_factor: u32,
    /// Version string stamped into payloads.
    pub app_version: String,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            confidence_factor: DEFAULT_CONFIDENCE_FACTOR,
            app_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// The registry: in-memory cache of the store plus the mutators that keep both in step.
pub struct Registry {
    store: Box<dyn Store>,
    settings: RegistrySettings,
    players: Arc<Vec<Player>>,
    matches: Arc<Vec<Match>>,
    tournaments: Arc<Vec<Tournament>>,
    selected_match_id: Option<MatchId>,
    selected_tournament_id: Option<TournamentId>,
}

impl Registry {
    /// Load every collection from `store`; missing or corrupt keys start empty.
    pub fn open(store: impl Store + 'static, settings: RegistrySettings) -> Self {
        let backend: Box<dyn Store> = Box::new(store);
        let players: Vec<Player> = store::read(backend.as_ref(), PLAYERS_KEY, Vec::new());
        let matches: Vec<Match> = store::read(backend.as_ref(), MATCHES_KEY, Vec::new());
        let tournaments: Vec<Tournament> =
            store::read(backend.as_ref(), TOURNAMENTS_KEY, Vec::new());
        let selected_match_id = store::read(backend.as_ref(), SELECTED_MATCH_KEY, None);
        let selected_tournament_id =
            store::read(backend.as_ref(), SELECTED_TOURNAMENT_KEY, None);
        log::info!(
            "Opened registry: {} player(s), {} match(es), {} tournament(s)",
            players.len(),
            matches.len(),
            tournaments.len()
        );
        Self {
            store: backend,
            settings,
            players: Arc::new(players),
            matches: Arc::new(matches),
            tournaments: Arc::new(tournaments),
            selected_match_id,
            selected_tournament_id,
        }
    }

    pub fn settings(&self) -> &RegistrySettings {
        &self.settings
    }

    /// Snapshot of the player collection.
    pub fn players(&self) -> Arc<Vec<Player>> {
        Arc::clone(&self.players)
    }

    /// Snapshot of the match collection.
    pub fn matches(&self) -> Arc<Vec<Match>> {
        Arc::clone(&self.matches)
    }

    /// Snapshot of the tournament collection.
    pub fn tournaments(&self) -> Arc<Vec<Tournament>> {
        Arc::clone(&self.tournaments)
    }

    pub fn get_player_by_id(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn get_match_by_id(&self, id: &str) -> Option<&Match> {
        self.matches.iter().find(|m| m.id == id)
    }

    pub fn get_tournament_by_id(&self, id: &str) -> Option<&Tournament> {
        self.tournaments.iter().find(|t| t.id == id)
    }

    /// Live Bayesian rating of a player (baseline for unknown ids).
    pub fn rating_for(&self, player_id: &str) -> i32 {
        bayesian_rating(
            self.get_player_by_id(player_id),
            &self.matches,
            self.settings.confidence_factor,
        )
    }

    /// Snapshot payload of a match, or `None` if the match does not exist.
    pub fn generate_match_qr_data(&self, match_id: &str) -> Option<Payload> {
        payload::build_match_payload(self, match_id).map(Payload::Match)
    }

    /// Snapshot payload of a tournament, or `None` if the tournament does not exist.
    pub fn generate_tournament_qr_data(&self, tournament_id: &str) -> Option<Payload> {
        payload::build_tournament_payload(self, tournament_id).map(Payload::Tournament)
    }

    /// Remember which match the UI has open. Passing `None` clears the selection.
    pub fn select_match(&mut self, match_id: Option<&str>) {
        self.selected_match_id = match_id.map(str::to_string);
        store::write(self.store.as_ref(), SELECTED_MATCH_KEY, &self.selected_match_id);
    }

    /// Remember which tournament the UI has open. Passing `None` clears the selection.
    pub fn select_tournament(&mut self, tournament_id: Option<&str>) {
        self.selected_tournament_id = tournament_id.map(str::to_string);
        store::write(
            self.store.as_ref(),
            SELECTED_TOURNAMENT_KEY,
            &self.selected_tournament_id,
        );
    }

    /// The selected match, if one is selected and still exists.
    pub fn selected_match(&self) -> Option<&Match> {
        self.selected_match_id
            .as_deref()
            .and_then(|id| self.get_match_by_id(id))
    }

    /// The selected tournament, if one is selected and still exists.
    pub fn selected_tournament(&self) -> Option<&Tournament> {
        self.selected_tournament_id
            .as_deref()
            .and_then(|id| self.get_tournament_by_id(id))
    }

    /// Pull in changes another process made to the shared store.
    ///
    /// Returns the keys that were refreshed. Keys whose new value is malformed keep
    /// their current in-memory value.
    pub fn sync_external_changes(&mut self) -> Vec<String> {
        let mut refreshed = Vec::new();
        for key in self.store.poll_changes() {
            let backend = self.store.as_ref();
            let applied = match key.as_str() {
                PLAYERS_KEY => store::read_changed(backend, &key)
                    .map(|players| self.players = Arc::new(players))
                    .is_some(),
                MATCHES_KEY => store::read_changed(backend, &key)
                    .map(|matches| self.matches = Arc::new(matches))
                    .is_some(),
                TOURNAMENTS_KEY => store::read_changed(backend, &key)
                    .map(|tournaments| self.tournaments = Arc::new(tournaments))
                    .is_some(),
                SELECTED_MATCH_KEY => store::read_changed(backend, &key)
                    .map(|id| self.selected_match_id = id)
                    .is_some(),
                SELECTED_TOURNAMENT_KEY => store::read_changed(backend, &key)
                    .map(|id| self.selected_tournament_id = id)
                    .is_some(),
                _ => false,
            };
            if applied {
                log::info!("Reloaded {key} after an external change");
                refreshed.push(key);
            }
        }
        refreshed
    }

    /// Swap in whole collections (used by data import). `None` leaves a collection as is.
    pub(crate) fn replace_collections(
        &mut self,
        players: Option<Vec<Player>>,
        matches: Option<Vec<Match>>,
        tournaments: Option<Vec<Tournament>>,
    ) {
        if let Some(players) = players {
            self.players = Arc::new(players);
            self.persist_players();
        }
        if let Some(matches) = matches {
            self.matches = Arc::new(matches);
            self.persist_matches();
        }
        if let Some(tournaments) = tournaments {
            self.tournaments = Arc::new(tournaments);
            self.persist_tournaments();
        }
    }

    fn persist_players(&self) {
        store::write(self.store.as_ref(), PLAYERS_KEY, self.players.as_slice());
    }

    fn persist_matches(&self) {
        store::write(self.store.as_ref(), MATCHES_KEY, self.matches.as_slice());
    }

    fn persist_tournaments(&self) {
        store::write(
            self.store.as_ref(),
            TOURNAMENTS_KEY,
            self.tournaments.as_slice(),
        );
    }
}
