//! REST API routes
//!
//! Thin dispatch onto the weekly pipeline, the artifact files it writes, the
//! public stats service and a couple of league probes.

use crate::auth::with_api_key;
use crate::error::{handle_rejection, ApiError};
use crate::service::ServiceState;
use serde::{Deserialize, Serialize};
use stats_fetcher::{PlayerQuery, StatsRow, TeamElo};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::info;
use warp::http::{header, Response};
use warp::{Filter, Rejection, Reply};

fn first_week() -> u32 {
    1
}

/// `?week=N`, defaulting to week 1
#[derive(Debug, Deserialize)]
pub struct WeekParams {
    #[serde(default = "first_week")]
    pub week: u32,
}

#[derive(Debug, Deserialize)]
pub struct RefreshParams {
    #[serde(default)]
    pub force: bool,
}

#[derive(Debug, Deserialize)]
pub struct CompareParams {
    #[serde(default)]
    pub names: String,
}

#[derive(Debug, Deserialize)]
pub struct RosterParams {
    pub team_id: String,
    #[serde(default = "first_week")]
    pub week: u32,
}

/// Pipeline run response
#[derive(Debug, Serialize, Deserialize)]
pub struct RunResponse {
    pub ok: bool,
    pub week: u32,
    pub artifact: String,
    pub roster_slots: usize,
    pub stats_rows: usize,
    pub matched_records: usize,
}

/// Auth status response
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthStatusResponse {
    pub ok: bool,
    pub has_api_key: bool,
    pub has_league_id: bool,
    pub has_session_cookie: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub ok: bool,
    pub cached: bool,
    pub rows: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlayersResponse {
    pub ok: bool,
    pub count: usize,
    pub players: Vec<StatsRow>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MatchupsResponse {
    pub ok: bool,
    pub teams: Vec<TeamElo>,
}

type ApiResult = Result<warp::reply::Response, Rejection>;

fn reject(e: impl Into<ApiError>) -> Rejection {
    warp::reject::custom(e.into())
}

/// Run the pipeline for a week
pub async fn run_pipeline(params: WeekParams, state: Arc<ServiceState>) -> ApiResult {
    let pipeline = state.pipeline().map_err(reject)?;
    let outcome = pipeline.run(params.week).await.map_err(reject)?;
    info!("Run for week {} produced {:?}", outcome.week, outcome.analysis_csv);

    Ok(warp::reply::json(&RunResponse {
        ok: true,
        week: outcome.week,
        artifact: outcome.analysis_csv.to_string_lossy().to_string(),
        roster_slots: outcome.roster_slots,
        stats_rows: outcome.stats_rows,
        matched_records: outcome.matched_records,
    })
    .into_response())
}

/// Serve a weekly analysis artifact
pub async fn weekly_artifact(
    extension: &'static str,
    content_type: &'static str,
    params: WeekParams,
    state: Arc<ServiceState>,
) -> ApiResult {
    let path = state.pipeline_config.analysis_path(params.week, extension);
    let name = path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(reject(ApiError::not_found(format!(
                "Not found: {}. Hit /run?week={} first.",
                name, params.week
            ))));
        }
        Err(e) => return Err(reject(ApiError::internal(format!("Failed to read {}: {}", name, e)))),
    };

    Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", name))
        .body(bytes)
        .map(Reply::into_response)
        .map_err(|e| reject(ApiError::internal(e.to_string())))
}

pub async fn refresh_stats(params: RefreshParams, state: Arc<ServiceState>) -> ApiResult {
    let outcome = state.stats.refresh(params.force).await.map_err(reject)?;
    Ok(warp::reply::json(&RefreshResponse { ok: true, cached: outcome.cached, rows: outcome.rows }).into_response())
}

pub async fn search_stats(query: PlayerQuery, state: Arc<ServiceState>) -> ApiResult {
    let players = state.stats.search_players(&query).await.map_err(reject)?;
    Ok(warp::reply::json(&PlayersResponse { ok: true, count: players.len(), players }).into_response())
}

pub async fn compare_stats(params: CompareParams, state: Arc<ServiceState>) -> ApiResult {
    let names: Vec<String> =
        params.names.split(',').map(str::trim).filter(|n| !n.is_empty()).map(str::to_string).collect();
    if names.is_empty() {
        return Err(reject(ApiError::bad_request("names is required")));
    }

    let players = state.stats.compare_players(&names).await.map_err(reject)?;
    Ok(warp::reply::json(&PlayersResponse { ok: true, count: players.len(), players }).into_response())
}

pub async fn matchups(state: Arc<ServiceState>) -> ApiResult {
    let teams = state.stats.matchup_table().await.map_err(reject)?;
    Ok(warp::reply::json(&MatchupsResponse { ok: true, teams }).into_response())
}

pub async fn debug_teams(state: Arc<ServiceState>) -> ApiResult {
    let teams = state.league().map_err(reject)?.teams().await.map_err(reject)?;
    Ok(warp::reply::json(&serde_json::json!({ "ok": true, "count": teams.len(), "teams": teams })).into_response())
}

pub async fn debug_roster(params: RosterParams, state: Arc<ServiceState>) -> ApiResult {
    let league = state.league().map_err(reject)?;
    let teams = league.teams().await.map_err(reject)?;
    let team = teams
        .iter()
        .find(|t| t.id == params.team_id)
        .ok_or_else(|| reject(ApiError::not_found(format!("Unknown team: {}", params.team_id))))?;

    let slots = league.fetch_roster(team, params.week).await.map_err(reject)?;
    Ok(warp::reply::json(&serde_json::json!({
        "ok": true,
        "team": team,
        "week": params.week,
        "count": slots.len(),
        "slots": slots
    }))
    .into_response())
}

/// Create REST API routes
pub fn create_routes(state: Arc<ServiceState>) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let api_key = state.api_key.clone();
    let state_filter = warp::any().map(move || state.clone());
    let protected = move || with_api_key(api_key.clone());

    let root = warp::path::end().and(warp::get()).map(|| {
        warp::reply::json(&serde_json::json!({ "ok": true, "message": "Cheeky FC API" }))
    });

    // Health check endpoint
    let health = warp::path("health").and(warp::path::end()).and(warp::get()).map(|| {
        warp::reply::json(&serde_json::json!({
            "status": "healthy",
            "timestamp": chrono::Utc::now().to_rfc3339()
        }))
    });

    let auth_status = warp::path!("auth" / "status").and(warp::get()).and(state_filter.clone()).map(
        |state: Arc<ServiceState>| {
            warp::reply::json(&AuthStatusResponse {
                ok: true,
                has_api_key: state.has_api_key(),
                has_league_id: state.fantrax.has_league_id(),
                has_session_cookie: state.fantrax.has_session_cookie(),
            })
        },
    );

    let run = warp::path("run")
        .and(warp::path::end())
        .and(warp::get())
        .and(protected())
        .and(warp::query::<WeekParams>())
        .and(state_filter.clone())
        .and_then(run_pipeline);

    let weekly_csv = warp::path!("analysis" / "weekly.csv")
        .and(warp::get())
        .and(warp::query::<WeekParams>())
        .and(state_filter.clone())
        .and_then(|params: WeekParams, state: Arc<ServiceState>| async move {
            weekly_artifact("csv", "text/csv", params, state).await
        });

    let weekly_parquet = warp::path!("analysis" / "weekly.parquet")
        .and(warp::get())
        .and(warp::query::<WeekParams>())
        .and(state_filter.clone())
        .and_then(|params: WeekParams, state: Arc<ServiceState>| async move {
            weekly_artifact("parquet", "application/octet-stream", params, state).await
        });

    let stats_refresh = warp::path!("stats" / "refresh")
        .and(warp::get())
        .and(protected())
        .and(warp::query::<RefreshParams>())
        .and(state_filter.clone())
        .and_then(refresh_stats);

    let stats_search = warp::path!("stats" / "search")
        .and(warp::get())
        .and(warp::query::<PlayerQuery>())
        .and(state_filter.clone())
        .and_then(search_stats);

    let stats_compare = warp::path!("stats" / "compare")
        .and(warp::get())
        .and(warp::query::<CompareParams>())
        .and(state_filter.clone())
        .and_then(compare_stats);

    let stats_matchups =
        warp::path!("stats" / "matchups").and(warp::get()).and(state_filter.clone()).and_then(matchups);

    let league_teams = warp::path!("debug" / "league" / "teams")
        .and(warp::get())
        .and(protected())
        .and(state_filter.clone())
        .and_then(debug_teams);

    let league_roster = warp::path!("debug" / "league" / "roster")
        .and(warp::get())
        .and(protected())
        .and(warp::query::<RosterParams>())
        .and(state_filter)
        .and_then(debug_roster);

    // Combine all routes
    root.or(health)
        .or(auth_status)
        .or(run)
        .or(weekly_csv)
        .or(weekly_parquet)
        .or(stats_refresh)
        .or(stats_search)
        .or(stats_compare)
        .or(stats_matchups)
        .or(league_teams)
        .or(league_roster)
        .with(
            warp::cors()
                .allow_any_origin()
                .allow_headers(vec!["content-type", "x-api-key"])
                .allow_methods(vec!["GET", "OPTIONS"]),
        )
}

/// Routes with every rejection rendered as a JSON error
pub fn api(state: Arc<ServiceState>) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    create_routes(state).recover(handle_rejection)
}
