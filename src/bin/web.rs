//! Single binary web server: HTML from templates/, static from /static, API via REST.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT.
//! MAX_REFINEMENT_PASSES caps the balancer's swap search (default 100).

use actix_files::Files;
use actix_web::{
    delete, get, post, put,
    web::{self, Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use team_balancer_web::{
    export_team_sheet_csv, generate_teams, import_players_csv, BalanceConfig, LinkKind, PlayerId,
    Roster, RosterError, RosterId,
};
use uuid::Uuid;

/// Per-roster entry: roster data + last activity time (for auto-cleanup).
struct RosterEntry {
    roster: Roster,
    last_activity: Instant,
}

/// In-memory state: many rosters by ID. Entries are removed after 12h inactivity.
type AppState = Data<RwLock<HashMap<RosterId, RosterEntry>>>;

/// Inactivity threshold: rosters not accessed for this long are removed.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(12 * 3600);

/// How often the cleanup task sweeps for inactive rosters.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(30 * 60);

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateRosterBody {
    #[serde(default)]
    name: String,
}

#[derive(Deserialize)]
struct AddPlayerBody {
    name: String,
    #[serde(default)]
    position: Option<String>,
    skill: f64,
}

#[derive(Deserialize)]
struct SkillBody {
    skill: f64,
}

#[derive(Deserialize)]
struct ActiveBody {
    active: bool,
}

#[derive(Deserialize)]
struct PositionBody {
    #[serde(default)]
    position: Option<String>,
}

#[derive(Deserialize)]
struct LinkBody {
    a: PlayerId,
    b: PlayerId,
    kind: LinkKind,
}

#[derive(Deserialize)]
struct UnlinkBody {
    a: PlayerId,
    b: PlayerId,
}

#[derive(Deserialize)]
struct GenerateTeamsBody {
    team_count: usize,
}

/// Path segment: roster id (e.g. /api/rosters/{id})
#[derive(Deserialize)]
struct RosterPath {
    id: RosterId,
}

/// Path segments: roster id and player id (e.g. /api/rosters/{id}/players/{player_id})
#[derive(Deserialize)]
struct RosterPlayerPath {
    id: RosterId,
    player_id: PlayerId,
}

/// Path segments: roster id and team sheet id
#[derive(Deserialize)]
struct RosterSheetPath {
    id: RosterId,
    sheet_id: Uuid,
}

fn no_roster() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "error": "No roster" }))
}

/// 400 with the error message; balancer rejections also carry a hint for the user.
fn bad_request(e: &RosterError) -> HttpResponse {
    match e {
        RosterError::Balance(_) => HttpResponse::BadRequest().json(serde_json::json!({
            "error": e.to_string(),
            "hint": "reduce team count or loosen must-play groups",
        })),
        _ => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

fn roster_result(result: Result<(), RosterError>, roster: &Roster) -> HttpResponse {
    match result {
        Ok(()) => HttpResponse::Ok().json(roster),
        Err(e) => bad_request(&e),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "team-balancer-web",
    })
}

/// Avoid 404 in browser tab: favicon not required for app logic.
#[get("/favicon.ico")]
async fn favicon() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

/// Create a new roster (returns it with id; client stores id for subsequent requests).
#[post("/api/rosters")]
async fn api_create_roster(state: AppState, body: Option<Json<CreateRosterBody>>) -> HttpResponse {
    let name = body
        .map(|b| b.into_inner().name)
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| "Roster".to_string());
    let roster = Roster::new(name.trim());
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let response = HttpResponse::Ok().json(&roster);
    g.insert(
        roster.id,
        RosterEntry {
            roster,
            last_activity: Instant::now(),
        },
    );
    response
}

/// Get a roster by id (404 if not found). Touching it refreshes last_activity.
#[get("/api/rosters/{id}")]
async fn api_get_roster(state: AppState, path: Path<RosterPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.get_mut(&path.id) {
        Some(entry) => {
            entry.last_activity = Instant::now();
            HttpResponse::Ok().json(&entry.roster)
        }
        None => no_roster(),
    }
}

/// Add a player.
#[post("/api/rosters/{id}/players")]
async fn api_add_player(state: AppState, path: Path<RosterPath>, body: Json<AddPlayerBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return no_roster(),
    };
    entry.last_activity = Instant::now();
    let r = &mut entry.roster;
    let body = body.into_inner();
    let result = r.add_player(body.name, body.position, body.skill).map(|_| ());
    roster_result(result, r)
}

/// Remove a player by id (also drops their links).
#[delete("/api/rosters/{id}/players/{player_id}")]
async fn api_remove_player(state: AppState, path: Path<RosterPlayerPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return no_roster(),
    };
    entry.last_activity = Instant::now();
    let r = &mut entry.roster;
    let result = r.remove_player(path.player_id);
    roster_result(result, r)
}

#[put("/api/rosters/{id}/players/{player_id}/skill")]
async fn api_set_skill(state: AppState, path: Path<RosterPlayerPath>, body: Json<SkillBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return no_roster(),
    };
    entry.last_activity = Instant::now();
    let r = &mut entry.roster;
    let result = r.set_skill(path.player_id, body.skill);
    roster_result(result, r)
}

/// Mark a player as playing or sitting out.
#[put("/api/rosters/{id}/players/{player_id}/active")]
async fn api_set_active(state: AppState, path: Path<RosterPlayerPath>, body: Json<ActiveBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return no_roster(),
    };
    entry.last_activity = Instant::now();
    let r = &mut entry.roster;
    let result = r.set_active(path.player_id, body.active);
    roster_result(result, r)
}

#[put("/api/rosters/{id}/players/{player_id}/position")]
async fn api_set_position(
    state: AppState,
    path: Path<RosterPlayerPath>,
    body: Json<PositionBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return no_roster(),
    };
    entry.last_activity = Instant::now();
    let r = &mut entry.roster;
    let result = r.set_position(path.player_id, body.into_inner().position);
    roster_result(result, r)
}

/// Link two players: must play together, or must be kept apart.
#[post("/api/rosters/{id}/links")]
async fn api_link(state: AppState, path: Path<RosterPath>, body: Json<LinkBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return no_roster(),
    };
    entry.last_activity = Instant::now();
    let r = &mut entry.roster;
    let result = r.link(body.a, body.b, body.kind);
    roster_result(result, r)
}

/// Remove every link between two players.
#[delete("/api/rosters/{id}/links")]
async fn api_unlink(state: AppState, path: Path<RosterPath>, body: Json<UnlinkBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return no_roster(),
    };
    entry.last_activity = Instant::now();
    let r = &mut entry.roster;
    let result = r.unlink(body.a, body.b);
    roster_result(result, r)
}

/// Import players from a CSV body (name,position,skill,active,must_with,avoid_with).
#[post("/api/rosters/{id}/import")]
async fn api_import_csv(state: AppState, path: Path<RosterPath>, body: String) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return no_roster(),
    };
    entry.last_activity = Instant::now();
    let r = &mut entry.roster;
    let result = import_players_csv(r, body.as_bytes()).map(|_| ());
    roster_result(result, r)
}

/// Balance the active players into teams and record the team sheet.
#[post("/api/rosters/{id}/teams")]
async fn api_generate_teams(
    state: AppState,
    config: Data<BalanceConfig>,
    path: Path<RosterPath>,
    body: Json<GenerateTeamsBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return no_roster(),
    };
    entry.last_activity = Instant::now();
    match generate_teams(&mut entry.roster, body.team_count, &config, &mut rand::thread_rng()) {
        Ok(sheet) => HttpResponse::Ok().json(sheet),
        Err(e) => bad_request(&e),
    }
}

/// All team sheets generated for this roster, oldest first.
#[get("/api/rosters/{id}/teams")]
async fn api_team_history(state: AppState, path: Path<RosterPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.get_mut(&path.id) {
        Some(entry) => {
            entry.last_activity = Instant::now();
            HttpResponse::Ok().json(&entry.roster.history)
        }
        None => no_roster(),
    }
}

/// Download one team sheet as CSV.
#[get("/api/rosters/{id}/teams/{sheet_id}/csv")]
async fn api_team_sheet_csv(state: AppState, path: Path<RosterSheetPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return no_roster(),
    };
    entry.last_activity = Instant::now();
    let sheet = match entry.roster.sheet(path.sheet_id) {
        Ok(s) => s,
        Err(e) => return HttpResponse::NotFound().json(serde_json::json!({ "error": e.to_string() })),
    };
    let mut out = Vec::new();
    match export_team_sheet_csv(sheet, &mut out) {
        Ok(()) => HttpResponse::Ok().content_type("text/csv; charset=utf-8").body(out),
        Err(e) => bad_request(&e),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Balancer config from env (MAX_REFINEMENT_PASSES), defaults otherwise.
fn balance_config_from_env() -> BalanceConfig {
    let mut config = BalanceConfig::default();
    if let Some(passes) = std::env::var("MAX_REFINEMENT_PASSES")
        .ok()
        .and_then(|p| p.parse().ok())
    {
        config.max_passes = passes;
    }
    config
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);
    let balance_config = balance_config_from_env();
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);
    log::info!("Balancer refinement capped at {} pass(es)", balance_config.max_passes);

    let state = Data::new(RwLock::new(HashMap::<RosterId, RosterEntry>::new()));
    let config = Data::new(balance_config);

    // Background task: drop rosters idle for longer than INACTIVITY_TIMEOUT
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let before = g.len();
            g.retain(|_, entry| entry.last_activity.elapsed() < INACTIVITY_TIMEOUT);
            let removed = before - g.len();
            if removed > 0 {
                log::info!(
                    "Dropped {} roster(s) idle for over {}h",
                    removed,
                    INACTIVITY_TIMEOUT.as_secs() / 3600
                );
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(config.clone())
            .route("/", web::get().to(serve_index_async))
            .service(api_health)
            .service(favicon)
            .service(api_create_roster)
            .service(api_get_roster)
            .service(api_add_player)
            .service(api_remove_player)
            .service(api_set_skill)
            .service(api_set_active)
            .service(api_set_position)
            .service(api_link)
            .service(api_unlink)
            .service(api_import_csv)
            .service(api_generate_teams)
            .service(api_team_history)
            .service(api_team_sheet_csv)
            .service(Files::new("/static", "static").show_files_listing())
    })
    .bind(bind)?
    .run()
    .await
}

async fn serve_index_async() -> HttpResponse {
    let html = include_str!("../../templates/index.html");
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html)
}
