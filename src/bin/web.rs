//! Single binary web server exposing the registry as a REST API for UI collaborators.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default and keeps its data in ./data.
//! Override with env: HOST, PORT, REGISTRY_DATA_DIR, RATING_CONFIDENCE_FACTOR.

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::sync::RwLock;
use std::time::Duration;
use tabletop_registry::{
    decode, export_data, import_data, matches_played, standings_csv, Config, FileStore,
    MatchPatch, MatchResult, MemoryStore, NewMatch, NewPlayer, NewTournament, Payload,
    PlayerPatch, Registry, RegistryError, TournamentPatch,
};

/// Shared registry. Reads take the read lock; mutators take the write lock.
type AppState = Data<RwLock<Registry>>;

/// How often changes made by other processes sharing the data directory are picked up.
const SYNC_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RatingResponse {
    id: String,
    rating: i32,
    bayesian_rating: i32,
    matches_played: usize,
}

#[derive(Deserialize)]
struct MatchResultBody {
    result: MatchResult,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SelectionBody {
    #[serde(default)]
    match_id: Option<String>,
    #[serde(default)]
    tournament_id: Option<String>,
}

/// Path segment: entity id (e.g. /api/players/{id})
#[derive(Deserialize)]
struct IdPath {
    id: String,
}

/// Path segments: tournament id and player id (e.g. /api/tournaments/{id}/players/{player_id})
#[derive(Deserialize)]
struct TournamentPlayerPath {
    id: String,
    player_id: String,
}

fn lock_error() -> HttpResponse {
    HttpResponse::InternalServerError().body("lock error")
}

fn not_found(what: &str) -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "error": format!("No {what}") }))
}

fn bad_request(err: impl Display) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({ "error": err.to_string() }))
}

/// Map an update outcome: validation failure is 400, unknown id is 404.
fn updated<T: Serialize>(result: Result<Option<T>, RegistryError>, what: &str) -> HttpResponse {
    match result {
        Ok(Some(entity)) => HttpResponse::Ok().json(entity),
        Ok(None) => not_found(what),
        Err(e) => bad_request(e),
    }
}

fn removed(found: bool, what: &str) -> HttpResponse {
    if found {
        HttpResponse::NoContent().finish()
    } else {
        not_found(what)
    }
}

/// Canonical payload text, exactly what goes into the scan-able code.
fn payload_response(payload: Option<Payload>, what: &str) -> HttpResponse {
    let Some(payload) = payload else {
        return not_found(what);
    };
    match payload.encode() {
        Ok(text) => HttpResponse::Ok()
            .content_type("application/json")
            .body(text),
        Err(e) => HttpResponse::PayloadTooLarge().json(serde_json::json!({ "error": e.to_string() })),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "tabletop-registry",
    })
}

#[get("/api/players")]
async fn api_list_players(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    HttpResponse::Ok().json(g.players().as_slice())
}

#[post("/api/players")]
async fn api_add_player(state: AppState, body: Json<NewPlayer>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.add_player(body.into_inner()) {
        Ok(player) => HttpResponse::Ok().json(player),
        Err(e) => bad_request(e),
    }
}

#[get("/api/players/{id}")]
async fn api_get_player(state: AppState, path: Path<IdPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.get_player_by_id(&path.id) {
        Some(player) => HttpResponse::Ok().json(player),
        None => not_found("player"),
    }
}

/// Stored and Bayesian rating side by side.
#[get("/api/players/{id}/rating")]
async fn api_player_rating(state: AppState, path: Path<IdPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let Some(player) = g.get_player_by_id(&path.id) else {
        return not_found("player");
    };
    HttpResponse::Ok().json(RatingResponse {
        id: player.id.clone(),
        rating: player.rating,
        bayesian_rating: g.rating_for(&player.id),
        matches_played: matches_played(&player.id, &g.matches()),
    })
}

#[put("/api/players/{id}")]
async fn api_update_player(state: AppState, path: Path<IdPath>, body: Json<PlayerPatch>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    updated(g.update_player(&path.id, body.into_inner()), "player")
}

#[delete("/api/players/{id}")]
async fn api_remove_player(state: AppState, path: Path<IdPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    removed(g.remove_player(&path.id), "player")
}

#[get("/api/matches")]
async fn api_list_matches(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    HttpResponse::Ok().json(g.matches().as_slice())
}

#[post("/api/matches")]
async fn api_add_match(state: AppState, body: Json<NewMatch>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.add_match(body.into_inner()) {
        Ok(game) => HttpResponse::Ok().json(game),
        Err(e) => bad_request(e),
    }
}

#[get("/api/matches/{id}")]
async fn api_get_match(state: AppState, path: Path<IdPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.get_match_by_id(&path.id) {
        Some(game) => HttpResponse::Ok().json(game),
        None => not_found("match"),
    }
}

#[put("/api/matches/{id}")]
async fn api_update_match(state: AppState, path: Path<IdPath>, body: Json<MatchPatch>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    updated(g.update_match(&path.id, body.into_inner()), "match")
}

/// Record the winner (or a draw) and complete the match.
#[post("/api/matches/{id}/result")]
async fn api_record_result(state: AppState, path: Path<IdPath>, body: Json<MatchResultBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    updated(g.record_match_result(&path.id, body.result), "match")
}

#[delete("/api/matches/{id}")]
async fn api_remove_match(state: AppState, path: Path<IdPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    removed(g.remove_match(&path.id), "match")
}

#[get("/api/matches/{id}/payload")]
async fn api_match_payload(state: AppState, path: Path<IdPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    payload_response(g.generate_match_qr_data(&path.id), "match")
}

#[get("/api/tournaments")]
async fn api_list_tournaments(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    HttpResponse::Ok().json(g.tournaments().as_slice())
}

#[post("/api/tournaments")]
async fn api_add_tournament(state: AppState, body: Json<NewTournament>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.add_tournament(body.into_inner()) {
        Ok(tournament) => HttpResponse::Ok().json(tournament),
        Err(e) => bad_request(e),
    }
}

#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<IdPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.get_tournament_by_id(&path.id) {
        Some(tournament) => HttpResponse::Ok().json(tournament),
        None => not_found("tournament"),
    }
}

#[put("/api/tournaments/{id}")]
async fn api_update_tournament(
    state: AppState,
    path: Path<IdPath>,
    body: Json<TournamentPatch>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    updated(g.update_tournament(&path.id, body.into_inner()), "tournament")
}

#[delete("/api/tournaments/{id}")]
async fn api_remove_tournament(state: AppState, path: Path<IdPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    removed(g.remove_tournament(&path.id), "tournament")
}

/// Register a player in the tournament roster.
#[post("/api/tournaments/{id}/players/{player_id}")]
async fn api_add_participant(state: AppState, path: Path<TournamentPlayerPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    updated(g.add_participant(&path.id, &path.player_id), "tournament")
}

/// Drop a player from the tournament roster.
#[delete("/api/tournaments/{id}/players/{player_id}")]
async fn api_remove_participant(state: AppState, path: Path<TournamentPlayerPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    updated(g.remove_participant(&path.id, &path.player_id), "tournament")
}

#[get("/api/tournaments/{id}/payload")]
async fn api_tournament_payload(state: AppState, path: Path<IdPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    payload_response(g.generate_tournament_qr_data(&path.id), "tournament")
}

/// Decode scanned payload text for display. Malformed text is 422, distinct from 404.
#[post("/api/payload/decode")]
async fn api_decode_payload(body: String) -> HttpResponse {
    match decode(&body) {
        Ok(payload) => HttpResponse::Ok().json(payload),
        Err(e) => HttpResponse::UnprocessableEntity().json(serde_json::json!({ "error": e.to_string() })),
    }
}

#[get("/api/selection")]
async fn api_get_selection(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    HttpResponse::Ok().json(SelectionBody {
        match_id: g.selected_match().map(|m| m.id.clone()),
        tournament_id: g.selected_tournament().map(|t| t.id.clone()),
    })
}

#[put("/api/selection")]
async fn api_set_selection(state: AppState, body: Json<SelectionBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    g.select_match(body.match_id.as_deref());
    g.select_tournament(body.tournament_id.as_deref());
    HttpResponse::Ok().json(body.into_inner())
}

#[get("/api/export")]
async fn api_export(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match export_data(&g) {
        Ok(text) => HttpResponse::Ok()
            .content_type("application/json")
            .body(text),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({ "error": e.to_string() })),
    }
}

#[post("/api/import")]
async fn api_import(state: AppState, body: String) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match import_data(&mut g, &body) {
        Ok(summary) => HttpResponse::Ok().json(serde_json::json!({
            "players": summary.players,
            "matches": summary.matches,
            "tournaments": summary.tournaments,
        })),
        Err(e) => bad_request(e),
    }
}

#[get("/api/standings.csv")]
async fn api_standings_csv(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match standings_csv(&g) {
        Ok(text) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .body(text),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Avoid 404 in browser tab: favicon not required for app logic.
#[get("/favicon.ico")]
async fn favicon() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env();
    let settings = config.registry_settings();
    let registry = match FileStore::open(&config.data_dir) {
        Ok(store) => {
            log::info!("Using data directory {}", store.dir().display());
            Registry::open(store, settings)
        }
        Err(e) => {
            log::error!("Data directory unavailable, keeping data in memory only: {e}");
            Registry::open(MemoryStore::new(), settings)
        }
    };

    let bind = (config.host.clone(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(RwLock::new(registry));

    // Background task: pick up writes made by other processes sharing the store.
    let state_sync = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(SYNC_INTERVAL);
        loop {
            interval.tick().await;
            let mut g = match state_sync.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            g.sync_external_changes();
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(favicon)
            .service(api_list_players)
            .service(api_add_player)
            .service(api_get_player)
            .service(api_player_rating)
            .service(api_update_player)
            .service(api_remove_player)
            .service(api_list_matches)
            .service(api_add_match)
            .service(api_get_match)
            .service(api_update_match)
            .service(api_record_result)
            .service(api_remove_match)
            .service(api_match_payload)
            .service(api_list_tournaments)
            .service(api_add_tournament)
            .service(api_get_tournament)
            .service(api_update_tournament)
            .service(api_remove_tournament)
            .service(api_add_participant)
            .service(api_remove_participant)
            .service(api_tournament_payload)
            .service(api_decode_payload)
            .service(api_get_selection)
            .service(api_set_selection)
            .service(api_export)
            .service(api_import)
            .service(api_standings_csv)
    })
    .bind(bind)?
    .run()
    .await
}
