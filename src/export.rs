//! Whole-registry backup (JSON export / import) and the CSV standings table.

use crate::models::{Match, Player, PlayerId, RegistryError, Tournament};
use crate::rating::matches_played;
use crate::registry::Registry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Version written into exports. Imports accept any `1.x`.
pub const EXPORT_VERSION: &str = "1.0";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportDocument<'a> {
    players: &'a [Player],
    tournaments: &'a [Tournament],
    matches: &'a [Match],
    export_date: DateTime<Utc>,
    version: &'static str,
}

#[derive(Deserialize)]
struct ImportDocument {
    #[serde(default)]
    players: Option<Vec<Player>>,
    #[serde(default)]
    tournaments: Option<Vec<Tournament>>,
    #[serde(default)]
    matches: Option<Vec<Match>>,
    #[serde(default)]
    version: Option<String>,
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("import data is not valid: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unsupported export version `{0}`")]
    UnsupportedVersion(String),
    #[error("duplicate {kind} id `{id}` in import data")]
    DuplicateId { kind: &'static str, id: String },
    #[error("tournament `{id}` has an invalid roster: {source}")]
    InvalidRoster {
        id: String,
        #[source]
        source: RegistryError,
    },
}

/// What an import replaced.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ImportSummary {
    pub players: Option<usize>,
    pub matches: Option<usize>,
    pub tournaments: Option<usize>,
}

/// Serialize every collection into one JSON document.
pub fn export_data(registry: &Registry) -> serde_json::Result<String> {
    let players = registry.players();
    let tournaments = registry.tournaments();
    let matches = registry.matches();
    serde_json::to_string_pretty(&ExportDocument {
        players: &players,
        tournaments: &tournaments,
        matches: &matches,
        export_date: Utc::now(),
        version: EXPORT_VERSION,
    })
}

/// Replace the collections present in `text`. Nothing changes if the document is rejected.
pub fn import_data(registry: &mut Registry, text: &str) -> Result<ImportSummary, ImportError> {
    let document: ImportDocument = serde_json::from_str(text)?;
    if let Some(version) = document.version.as_deref() {
        if version.split('.').next() != Some("1") {
            return Err(ImportError::UnsupportedVersion(version.to_string()));
        }
    }
    if let Some(players) = &document.players {
        check_unique("player", players.iter().map(|p| p.id.as_str()))?;
    }
    if let Some(matches) = &document.matches {
        check_unique("match", matches.iter().map(|m| m.id.as_str()))?;
    }
    if let Some(tournaments) = &document.tournaments {
        check_unique("tournament", tournaments.iter().map(|t| t.id.as_str()))?;
        // Roster ids need not resolve: orphaned references are tolerated.
        for tournament in tournaments {
            tournament
                .validate_roster()
                .map_err(|source| ImportError::InvalidRoster {
                    id: tournament.id.clone(),
                    source,
                })?;
        }
    }
    let summary = ImportSummary {
        players: document.players.as_ref().map(Vec::len),
        matches: document.matches.as_ref().map(Vec::len),
        tournaments: document.tournaments.as_ref().map(Vec::len),
    };
    registry.replace_collections(document.players, document.matches, document.tournaments);
    log::info!("Imported data: {summary:?}");
    Ok(summary)
}

fn check_unique<'a>(
    kind: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), ImportError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(ImportError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}

/// One line of the standings table.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct StandingRow {
    pub rank: usize,
    pub id: PlayerId,
    pub name: String,
    pub rating: i32,
    pub bayesian_rating: i32,
    pub matches_played: usize,
}

/// Players ordered by Bayesian rating (highest first, ties by name).
pub fn standings(registry: &Registry) -> Vec<StandingRow> {
    let matches = registry.matches();
    let mut rows: Vec<StandingRow> = registry
        .players()
        .iter()
        .map(|p| StandingRow {
            rank: 0,
            id: p.id.clone(),
            name: p.name.clone(),
            rating: p.rating,
            bayesian_rating: registry.rating_for(&p.id),
            matches_played: matches_played(&p.id, &matches),
        })
        .collect();
    rows.sort_by(|a, b| {
        b.bayesian_rating
            .cmp(&a.bayesian_rating)
            .then_with(|| a.name.cmp(&b.name))
    });
    for (i, row) in rows.iter_mut().enumerate() {
        row.rank = i + 1;
    }
    rows
}

const STANDINGS_HEADER: [&str; 6] = [
    "rank",
    "id",
    "name",
    "rating",
    "bayesian_rating",
    "matches_played",
];

/// Standings as CSV. The header row is written even when there are no players.
pub fn standings_csv(registry: &Registry) -> Result<String, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(STANDINGS_HEADER)?;
    for row in standings(registry) {
        writer.serialize(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
