//! Payload Codec: canonical snapshots of a match or tournament for out-of-band transfer.
//!
//! A payload resolves player references to `{id, name, rating}` using live registry
//! data, where `rating` is the Bayesian rating rather than the stored number. The text
//! form is compact JSON with a fixed field order and a leading `type` tag, so two
//! encodes of the same state compare equal byte for byte. The receiving side decodes
//! for display only.

use crate::models::{
    MatchFormat, MatchId, MatchStatus, PlayerId, TournamentFormat, TournamentId, TournamentStatus,
    TournamentType, BASELINE_RATING,
};
use crate::registry::Registry;
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Display name for a reference whose player no longer exists.
pub const UNKNOWN_PLAYER_NAME: &str = "Unknown";

/// Largest encoded payload, in bytes: the binary capacity of a version 40 QR symbol at
/// error-correction level H.
pub const MAX_PAYLOAD_BYTES: usize = 1273;

/// A decoded or freshly built payload, discriminated by its `type` field.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Payload {
    Match(MatchPayload),
    Tournament(TournamentPayload),
}

/// Player as seen in a payload.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub name: String,
    pub rating: i32,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchPayload {
    pub id: MatchId,
    pub player1: PlayerSnapshot,
    pub player2: PlayerSnapshot,
    pub format: MatchFormat,
    pub max_rounds: u32,
    pub status: MatchStatus,
    #[serde(with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
    pub app_version: String,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentPayload {
    pub id: TournamentId,
    pub name: String,
    pub format: TournamentFormat,
    pub tournament_type: TournamentType,
    /// One entry per roster id, in roster order; missing players are never dropped.
    pub participants: Vec<PlayerSnapshot>,
    pub rounds: u32,
    pub status: TournamentStatus,
    #[serde(with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
    pub app_version: String,
}

/// Errors from encoding or decoding payload text.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("payload text is empty")]
    Empty,
    #[error("payload is not valid: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("payload has no `type` tag")]
    MissingType,
    #[error("unknown payload type `{0}`")]
    UnknownType(String),
    #[error("expected a {expected} payload, found a {found} payload")]
    UnexpectedType {
        expected: &'static str,
        found: &'static str,
    },
    #[error("payload is {len} bytes, more than the {max} a scan-able code holds")]
    TooLarge { len: usize, max: usize },
    #[error("failed to serialize payload: {0}")]
    Encode(#[source] serde_json::Error),
}

impl Payload {
    /// Value of the `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Match(_) => "match",
            Payload::Tournament(_) => "tournament",
        }
    }

    /// Canonical text form. See [`encode`].
    pub fn encode(&self) -> Result<String, PayloadError> {
        encode(self)
    }
}

/// Snapshot a match, stamped with the current time. `None` if the match does not exist.
pub fn build_match_payload(registry: &Registry, match_id: &str) -> Option<MatchPayload> {
    build_match_payload_at(registry, match_id, Utc::now())
}

/// Snapshot a match with an explicit timestamp (truncated to milliseconds).
pub fn build_match_payload_at(
    registry: &Registry,
    match_id: &str,
    timestamp: DateTime<Utc>,
) -> Option<MatchPayload> {
    let game = registry.get_match_by_id(match_id)?;
    Some(MatchPayload {
        id: game.id.clone(),
        player1: snapshot(registry, &game.player1.id),
        player2: snapshot(registry, &game.player2.id),
        format: game.format,
        max_rounds: game.max_rounds,
        status: game.status,
        timestamp: timestamp.trunc_subsecs(3),
        app_version: registry.settings().app_version.clone(),
    })
}

/// Snapshot a tournament, stamped with the current time. `None` if it does not exist.
pub fn build_tournament_payload(
    registry: &Registry,
    tournament_id: &str,
) -> Option<TournamentPayload> {
    build_tournament_payload_at(registry, tournament_id, Utc::now())
}

/// Snapshot a tournament with an explicit timestamp (truncated to milliseconds).
pub fn build_tournament_payload_at(
    registry: &Registry,
    tournament_id: &str,
    timestamp: DateTime<Utc>,
) -> Option<TournamentPayload> {
    let tournament = registry.get_tournament_by_id(tournament_id)?;
    Some(TournamentPayload {
        id: tournament.id.clone(),
        name: tournament.name.clone(),
        format: tournament.format,
        tournament_type: tournament.tournament_type,
        participants: tournament
            .players
            .iter()
            .map(|id| snapshot(registry, id))
            .collect(),
        rounds: tournament.rounds,
        status: tournament.status,
        timestamp: timestamp.trunc_subsecs(3),
        app_version: registry.settings().app_version.clone(),
    })
}

fn snapshot(registry: &Registry, player_id: &str) -> PlayerSnapshot {
    match registry.get_player_by_id(player_id) {
        Some(player) if !player.name.is_empty() => PlayerSnapshot {
            id: player_id.to_string(),
            name: player.name.clone(),
            rating: registry.rating_for(player_id),
        },
        Some(_) => PlayerSnapshot {
            id: player_id.to_string(),
            name: UNKNOWN_PLAYER_NAME.to_string(),
            rating: registry.rating_for(player_id),
        },
        None => PlayerSnapshot {
            id: player_id.to_string(),
            name: UNKNOWN_PLAYER_NAME.to_string(),
            rating: BASELINE_RATING,
        },
    }
}

/// Compact JSON, fields in declaration order, `type` first.
/// Fails if the text would not fit a high error-correction code.
pub fn encode(payload: &Payload) -> Result<String, PayloadError> {
    let text = serde_json::to_string(payload).map_err(PayloadError::Encode)?;
    if text.len() > MAX_PAYLOAD_BYTES {
        return Err(PayloadError::TooLarge {
            len: text.len(),
            max: MAX_PAYLOAD_BYTES,
        });
    }
    Ok(text)
}

/// Parse payload text of either type.
pub fn decode(text: &str) -> Result<Payload, PayloadError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(PayloadError::Empty);
    }
    let value: serde_json::Value = serde_json::from_str(text).map_err(PayloadError::Malformed)?;
    match value.get("type").and_then(serde_json::Value::as_str) {
        Some("match") | Some("tournament") => {}
        Some(other) => return Err(PayloadError::UnknownType(other.to_string())),
        None => return Err(PayloadError::MissingType),
    }
    serde_json::from_value(value).map_err(PayloadError::Malformed)
}

/// Parse text that must be a match payload.
pub fn decode_match(text: &str) -> Result<MatchPayload, PayloadError> {
    match decode(text)? {
        Payload::Match(payload) => Ok(payload),
        other => Err(PayloadError::UnexpectedType {
            expected: "match",
            found: other.kind(),
        }),
    }
}

/// Parse text that must be a tournament payload.
pub fn decode_tournament(text: &str) -> Result<TournamentPayload, PayloadError> {
    match decode(text)? {
        Payload::Tournament(payload) => Ok(payload),
        other => Err(PayloadError::UnexpectedType {
            expected: "tournament",
            found: other.kind(),
        }),
    }
}

/// `YYYY-MM-DDTHH:MM:SS.mmmZ`, the shape a browser's `toISOString` produces.
mod iso_millis {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&at.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|at| at.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MatchPayload {
        MatchPayload {
            id: "m1".into(),
            player1: PlayerSnapshot {
                id: "1".into(),
                name: "Ada".into(),
                rating: 1510,
            },
            player2: PlayerSnapshot {
                id: "2".into(),
                name: "Grace".into(),
                rating: 1490,
            },
            format: MatchFormat::BestOf3,
            max_rounds: 3,
            status: MatchStatus::Scheduled,
            timestamp: DateTime::parse_from_rfc3339("2024-05-01T10:20:30.123Z")
                .unwrap()
                .with_timezone(&Utc),
            app_version: "1.0.0".into(),
        }
    }

    #[test]
    fn encodes_with_type_first_and_wire_field_names() {
        let text = encode(&Payload::Match(sample())).unwrap();
        assert!(text.starts_with(r#"{"type":"match","id":"m1","player1":{"id":"1","name":"Ada","rating":1510}"#));
        assert!(text.contains(r#""format":"Best of 3","maxRounds":3,"status":"scheduled""#));
        assert!(text.ends_with(r#""timestamp":"2024-05-01T10:20:30.123Z","appVersion":"1.0.0"}"#));
    }

    #[test]
    fn decode_inverts_encode() {
        let payload = Payload::Match(sample());
        let text = encode(&payload).unwrap();
        assert_eq!(decode(&text).unwrap(), payload);
        assert_eq!(decode_match(&text).unwrap(), sample());
    }

    #[test]
    fn truncated_text_is_malformed() {
        let text = encode(&Payload::Match(sample())).unwrap();
        let cut = &text[..text.len() / 2];
        assert!(matches!(decode(cut), Err(PayloadError::Malformed(_))));
    }

    #[test]
    fn match_text_is_not_accepted_as_tournament() {
        let text = encode(&Payload::Match(sample())).unwrap();
        assert!(matches!(
            decode_tournament(&text),
            Err(PayloadError::UnexpectedType {
                expected: "tournament",
                found: "match"
            })
        ));
    }

    #[test]
    fn missing_or_unknown_tag_is_rejected() {
        assert!(matches!(decode("   "), Err(PayloadError::Empty)));
        assert!(matches!(decode(r#"{"id":"m1"}"#), Err(PayloadError::MissingType)));
        assert!(matches!(
            decode(r#"{"type":"deck","id":"m1"}"#),
            Err(PayloadError::UnknownType(t)) if t == "deck"
        ));
        assert!(matches!(decode("[1,2]"), Err(PayloadError::MissingType)));
    }

    #[test]
    fn match_tag_with_tournament_fields_does_not_decode() {
        let text = r#"{"type":"match","id":"t1","name":"Cup","format":"Swiss"}"#;
        assert!(matches!(decode(text), Err(PayloadError::Malformed(_))));
    }
}
