//! JSON API over the tournament engine.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT.
//! POINTS_TABLE may point at a CSV file replacing the built-in points table.
//!
//! Regenerations are planned under a read guard and committed under the write
//! guard; a plan that lost the race is rejected with 409.

use actix_web::{
    get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use chrono::{NaiveDate, NaiveDateTime, Utc, Weekday};
use padel_tournament_engine::logic::{finals, group_play, scheduler, slots, time::parse_hhmm};
use padel_tournament_engine::{
    approve_category_change, calculate_modality_standings, evaluate_player_ascension,
    recalculate_all_rankings, record_match_result, request_category_change, transition_tournament,
    validate_transition, AvailabilityDay, Court,
    Modality, ModalityKind, Player, Registration, ServerConfig, SetScore, Store, Tournament,
    TournamentError, TournamentStatus, Winner,
};
use serde::Deserialize;
use tokio::sync::RwLock;
use uuid::Uuid;

/// The whole engine state behind one lock: one writer at a time.
type AppState = Data<RwLock<Store>>;

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    name: String,
    club_id: Uuid,
    start_date: NaiveDate,
    end_date: NaiveDate,
    #[serde(default = "default_match_duration")]
    match_duration_minutes: i64,
}

fn default_match_duration() -> i64 {
    60
}

#[derive(Deserialize)]
struct AvailabilityBody {
    weekday: Option<Weekday>,
    date: Option<NaiveDate>,
    /// "HH:MM"
    open: String,
    close: String,
}

#[derive(Deserialize)]
struct AddCourtBody {
    name: String,
    #[serde(default)]
    availability: Vec<AvailabilityBody>,
}

#[derive(Deserialize)]
struct AddModalityBody {
    name: String,
    kind: ModalityKind,
    category: String,
    point_category: String,
    min_pairs: Option<usize>,
    max_pairs: Option<usize>,
    #[serde(default)]
    order: u32,
}

#[derive(Deserialize)]
struct AddPlayerBody {
    name: String,
    association_id: Option<Uuid>,
}

#[derive(Deserialize)]
struct AddRegistrationBody {
    player_a: Uuid,
    player_b: Uuid,
    registered_at: Option<NaiveDateTime>,
}

#[derive(Deserialize)]
struct GenerateBracketBody {
    actor_id: Uuid,
}

#[derive(Deserialize)]
struct RecordResultBody {
    winner: Winner,
    #[serde(default)]
    sets: Vec<SetScore>,
}

#[derive(Deserialize)]
struct TransitionBody {
    target: TournamentStatus,
}

#[derive(Deserialize)]
struct RequestChangeBody {
    kind: ModalityKind,
    to_category: String,
    reason: String,
}

#[derive(Deserialize)]
struct EvaluateAscensionBody {
    kind: ModalityKind,
    category: String,
}

/// Path segment: a single id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct IdPath {
    id: Uuid,
}

/// Path segments: tournament id and modality id.
#[derive(Deserialize)]
struct TournamentModalityPath {
    id: Uuid,
    modality_id: Uuid,
}

#[derive(Deserialize)]
struct TransitionPath {
    id: Uuid,
    target: TournamentStatus,
}

fn error_response(e: TournamentError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e {
        TournamentError::TournamentNotFound(_)
        | TournamentError::ModalityNotFound(_)
        | TournamentError::MatchNotFound(_)
        | TournamentError::PlayerNotFound(_)
        | TournamentError::RegistrationNotFound(_)
        | TournamentError::GroupNotFound(_)
        | TournamentError::CategoryChangeNotFound(_) => HttpResponse::NotFound().json(body),
        TournamentError::StaleGeneration { .. } => HttpResponse::Conflict().json(body),
        _ => HttpResponse::BadRequest().json(body),
    }
}

fn respond<T: serde::Serialize>(result: Result<T, TournamentError>) -> HttpResponse {
    match result {
        Ok(v) => HttpResponse::Ok().json(v),
        Err(e) => error_response(e),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "padel-tournament-engine",
    })
}

/// Create a tournament in DRAFT.
#[post("/api/tournaments")]
async fn api_create_tournament(state: AppState, body: Json<CreateTournamentBody>) -> HttpResponse {
    let body = body.into_inner();
    let tournament = Tournament::new(
        body.name,
        body.club_id,
        body.start_date,
        body.end_date,
        body.match_duration_minutes,
    );
    let mut store = state.write().await;
    let id = store.add_tournament(tournament);
    respond(store.tournament(id))
}

#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<IdPath>) -> HttpResponse {
    let store = state.read().await;
    respond(store.tournament(path.id))
}

/// Add a court with its opening windows.
#[post("/api/tournaments/{id}/courts")]
async fn api_add_court(state: AppState, path: Path<IdPath>, body: Json<AddCourtBody>) -> HttpResponse {
    let mut store = state.write().await;
    if let Err(e) = store.tournament(path.id) {
        return error_response(e);
    }
    let mut court = Court::new(path.id, body.name.trim());
    for window in &body.availability {
        let day = match (window.weekday, window.date) {
            (_, Some(date)) => AvailabilityDay::Date(date),
            (Some(weekday), None) => AvailabilityDay::Weekday(weekday),
            (None, None) => {
                return HttpResponse::BadRequest()
                    .json(serde_json::json!({ "error": "Availability needs a weekday or a date" }))
            }
        };
        let (Some(open), Some(close)) = (parse_hhmm(&window.open), parse_hhmm(&window.close)) else {
            return HttpResponse::BadRequest()
                .json(serde_json::json!({ "error": "Opening hours must be HH:MM" }));
        };
        court = court.open_on(day, open, close);
    }
    let id = store.add_court(court);
    HttpResponse::Ok().json(&store.courts[&id])
}

#[post("/api/tournaments/{id}/modalities")]
async fn api_add_modality(
    state: AppState,
    path: Path<IdPath>,
    body: Json<AddModalityBody>,
) -> HttpResponse {
    let mut store = state.write().await;
    if let Err(e) = store.tournament(path.id) {
        return error_response(e);
    }
    let body = body.into_inner();
    let mut modality = Modality::new(path.id, body.name, body.kind, body.category, body.point_category);
    if let Some(min) = body.min_pairs {
        modality.min_pairs = min;
    }
    if let Some(max) = body.max_pairs {
        modality.max_pairs = max;
    }
    modality.order = body.order;
    let id = store.add_modality(modality);
    respond(store.modality(id))
}

#[post("/api/players")]
async fn api_add_player(state: AppState, body: Json<AddPlayerBody>) -> HttpResponse {
    let mut player = Player::new(body.name.trim());
    player.association_id = body.association_id;
    let mut store = state.write().await;
    let id = store.add_player(player);
    respond(store.player(id))
}

/// Register a pair into a modality.
#[post("/api/modalities/{id}/registrations")]
async fn api_add_registration(
    state: AppState,
    path: Path<IdPath>,
    body: Json<AddRegistrationBody>,
) -> HttpResponse {
    let mut store = state.write().await;
    for check in [
        store.modality(path.id).map(|_| ()),
        store.player(body.player_a).map(|_| ()),
        store.player(body.player_b).map(|_| ()),
    ] {
        if let Err(e) = check {
            return error_response(e);
        }
    }
    let registered_at = body.registered_at.unwrap_or_else(|| Utc::now().naive_utc());
    let id = store.add_registration(Registration::new(
        path.id,
        body.player_a,
        body.player_b,
        registered_at,
    ));
    respond(store.registration(id))
}

#[post("/api/tournaments/{id}/slots/generate")]
async fn api_generate_slots(state: AppState, path: Path<IdPath>) -> HttpResponse {
    let plan = slots::plan_slots(&*state.read().await, path.id);
    match plan {
        Ok(plan) => respond(slots::commit_slots(&mut *state.write().await, plan)),
        Err(e) => error_response(e),
    }
}

#[post("/api/modalities/{id}/groups/generate")]
async fn api_generate_groups(state: AppState, path: Path<IdPath>) -> HttpResponse {
    let plan = group_play::plan_groups(&*state.read().await, path.id);
    match plan {
        Ok(plan) => respond(group_play::commit_groups(&mut *state.write().await, plan)),
        Err(e) => error_response(e),
    }
}

#[post("/api/tournaments/{id}/schedule")]
async fn api_schedule(state: AppState, path: Path<IdPath>) -> HttpResponse {
    let plan = scheduler::plan_schedule(&*state.read().await, path.id);
    match plan {
        Ok(plan) => respond(scheduler::commit_schedule(&mut *state.write().await, plan)),
        Err(e) => error_response(e),
    }
}

#[post("/api/tournaments/{id}/modalities/{modality_id}/bracket")]
async fn api_generate_bracket(
    state: AppState,
    path: Path<TournamentModalityPath>,
    body: Json<GenerateBracketBody>,
) -> HttpResponse {
    let plan = finals::plan_bracket(&*state.read().await, path.id, path.modality_id, body.actor_id);
    match plan {
        Ok(plan) => respond(finals::commit_bracket(&mut *state.write().await, plan)),
        Err(e) => error_response(e),
    }
}

/// Record a result; advances the winner and updates rankings.
#[put("/api/matches/{id}/result")]
async fn api_record_result(
    state: AppState,
    path: Path<IdPath>,
    body: Json<RecordResultBody>,
) -> HttpResponse {
    let body = body.into_inner();
    let mut store = state.write().await;
    match record_match_result(&mut store, path.id, body.winner, body.sets) {
        Ok(()) => respond(store.game(path.id)),
        Err(e) => error_response(e),
    }
}

#[get("/api/modalities/{id}/standings")]
async fn api_standings(state: AppState, path: Path<IdPath>) -> HttpResponse {
    let mut store = state.write().await;
    respond(calculate_modality_standings(&mut store, path.id))
}

#[post("/api/rankings/recalculate")]
async fn api_recalculate_rankings(state: AppState) -> HttpResponse {
    let mut store = state.write().await;
    match recalculate_all_rankings(&mut store) {
        Ok(()) => HttpResponse::Ok().json(&store.rankings),
        Err(e) => error_response(e),
    }
}

#[get("/api/tournaments/{id}/transitions/{target}")]
async fn api_validate_transition(state: AppState, path: Path<TransitionPath>) -> HttpResponse {
    let store = state.read().await;
    respond(validate_transition(&store, path.id, path.target))
}

#[post("/api/tournaments/{id}/status")]
async fn api_transition(state: AppState, path: Path<IdPath>, body: Json<TransitionBody>) -> HttpResponse {
    let mut store = state.write().await;
    respond(transition_tournament(&mut store, path.id, body.target))
}

#[post("/api/category-changes/{id}/approve")]
async fn api_approve_category_change(state: AppState, path: Path<IdPath>) -> HttpResponse {
    let mut store = state.write().await;
    respond(approve_category_change(&mut store, path.id))
}

/// Open a pending promotion or demotion for a player.
#[post("/api/players/{id}/category-changes")]
async fn api_request_category_change(
    state: AppState,
    path: Path<IdPath>,
    body: Json<RequestChangeBody>,
) -> HttpResponse {
    let body = body.into_inner();
    let mut store = state.write().await;
    respond(request_category_change(
        &mut store,
        path.id,
        body.kind,
        &body.to_category,
        body.reason,
    ))
}

/// Run the ascension rules for a player now. Responds with null when no rule fires.
#[post("/api/players/{id}/ascension")]
async fn api_evaluate_ascension(
    state: AppState,
    path: Path<IdPath>,
    body: Json<EvaluateAscensionBody>,
) -> HttpResponse {
    let mut store = state.write().await;
    respond(evaluate_player_ascension(&mut store, path.id, body.kind, &body.category))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env();
    let engine = config
        .engine_config()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let bind = (config.host.clone(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(RwLock::new(Store::new(engine)));

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .service(api_add_court)
            .service(api_add_modality)
            .service(api_add_player)
            .service(api_add_registration)
            .service(api_generate_slots)
            .service(api_generate_groups)
            .service(api_schedule)
            .service(api_generate_bracket)
            .service(api_record_result)
            .service(api_standings)
            .service(api_recalculate_rankings)
            .service(api_validate_transition)
            .service(api_transition)
            .service(api_approve_category_change)
            .service(api_request_category_change)
            .service(api_evaluate_ascension)
    })
    .bind(bind)?
    .run()
    .await
}
