use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use warp::Filter;
use warp::http::StatusCode;
use warp::reply::Reply;

use crate::rate_limit::RateLimiter;
use game_persistence::GameError;
use game_persistence::repositories::{AuthProfile, GameRepository, UserRepository};

pub mod config;
pub mod frames;
pub mod rate_limit;

#[derive(Deserialize)]
struct GuessRequest {
    guess: String,
    fingerprint: String,
}

#[derive(Deserialize)]
struct ResultQuery {
    fingerprint: String,
}

#[derive(Deserialize)]
struct SyncRequest {
    auth_provider_id: String,
    display_name: Option<String>,
    avatar_url: Option<String>,
    email: Option<String>,
}

#[derive(Deserialize)]
struct ClaimRequest {
    auth_provider_id: String,
    fingerprint: String,
}

#[derive(Deserialize)]
struct UpdateProfileRequest {
    display_name: Option<String>,
    avatar_url: Option<String>,
}

#[derive(Deserialize)]
struct HistoryQuery {
    page: Option<u64>,
    limit: Option<u64>,
}

pub fn create_routes(
    game_repository: Arc<GameRepository>,
    user_repository: Arc<UserRepository>,
    rate_limiter: Arc<dyn RateLimiter>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    // Clone for filters
    let game_repository_filter = warp::any().map({
        let game_repository = game_repository.clone();
        move || game_repository.clone()
    });

    let user_repository_filter = warp::any().map({
        let user_repository = user_repository.clone();
        move || user_repository.clone()
    });

    let rate_limiter_filter = warp::any().map({
        let rate_limiter = rate_limiter.clone();
        move || rate_limiter.clone()
    });

    // Health check endpoint
    let health = warp::path("health")
        .and(warp::get())
        .map(|| warp::reply::with_status("OK", StatusCode::OK));

    // Today's scheduled game
    let todays_game = warp::path!("game" / "today")
        .and(warp::get())
        .and(game_repository_filter.clone())
        .and_then(handle_todays_game);

    // Guess submission
    let submit_guess = warp::path!("game" / Uuid / "guess")
        .and(warp::post())
        .and(warp::body::json())
        .and(game_repository_filter.clone())
        .and(rate_limiter_filter.clone())
        .and_then(handle_submit_guess);

    // Stored result lookup
    let game_result = warp::path!("game" / Uuid / "result")
        .and(warp::get())
        .and(warp::query::<ResultQuery>())
        .and(game_repository_filter.clone())
        .and_then(handle_get_result);

    // Sign-in upsert
    let user_sync = warp::path!("user" / "sync")
        .and(warp::post())
        .and(warp::body::json())
        .and(user_repository_filter.clone())
        .and_then(handle_user_sync);

    // Anonymous identity claim
    let user_claim = warp::path!("user" / "claim")
        .and(warp::post())
        .and(warp::body::json())
        .and(user_repository_filter.clone())
        .and_then(handle_user_claim);

    // User stats endpoint
    let user_stats = warp::path!("user" / Uuid / "stats")
        .and(warp::get())
        .and(user_repository_filter.clone())
        .and_then(handle_user_stats);

    // Paginated game history
    let user_history = warp::path!("user" / Uuid / "history")
        .and(warp::get())
        .and(warp::query::<HistoryQuery>())
        .and(user_repository_filter.clone())
        .and_then(handle_user_history);

    // Profile edits
    let user_update = warp::path!("user" / Uuid)
        .and(warp::patch())
        .and(warp::body::json())
        .and(user_repository_filter.clone())
        .and_then(handle_user_update);

    // Account removal
    let user_delete = warp::path!("user" / Uuid)
        .and(warp::delete())
        .and(user_repository_filter.clone())
        .and_then(handle_user_delete);

    // CORS configuration
    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type"])
        .allow_methods(vec!["GET", "POST", "PATCH", "DELETE"]);

    health
        .or(todays_game)
        .or(submit_guess)
        .or(game_result)
        .or(user_sync)
        .or(user_claim)
        .or(user_stats)
        .or(user_history)
        .or(user_update)
        .or(user_delete)
        .with(cors)
        .with(warp::log("framedle_server"))
}

async fn handle_todays_game(
    game_repository: Arc<GameRepository>,
) -> Result<warp::reply::Response, warp::Rejection> {
    match game_repository.todays_game().await {
        Ok(Some(game)) => Ok(json_with_status(&game, StatusCode::OK)),
        Ok(None) => Ok(error_body("No game scheduled today", StatusCode::NOT_FOUND)),
        Err(err) => Ok(error_reply(err)),
    }
}

async fn handle_submit_guess(
    game_id: Uuid,
    request: GuessRequest,
    game_repository: Arc<GameRepository>,
    rate_limiter: Arc<dyn RateLimiter>,
) -> Result<warp::reply::Response, warp::Rejection> {
    if request.fingerprint.is_empty() {
        return Ok(error_body("Fingerprint required", StatusCode::BAD_REQUEST));
    }

    if !rate_limiter.check_and_record(&request.fingerprint) {
        return Ok(error_body(
            "Rate limit exceeded",
            StatusCode::TOO_MANY_REQUESTS,
        ));
    }

    match game_repository
        .submit_guess(game_id, &request.guess, &request.fingerprint)
        .await
    {
        Ok(outcome) => Ok(json_with_status(&outcome, StatusCode::OK)),
        Err(err) => Ok(error_reply(err)),
    }
}

async fn handle_get_result(
    game_id: Uuid,
    query: ResultQuery,
    game_repository: Arc<GameRepository>,
) -> Result<warp::reply::Response, warp::Rejection> {
    match game_repository.get_result(game_id, &query.fingerprint).await {
        Ok(Some(result)) => Ok(json_with_status(&result, StatusCode::OK)),
        Ok(None) => Ok(error_body("Result not found", StatusCode::NOT_FOUND)),
        Err(err) => Ok(error_reply(err)),
    }
}

async fn handle_user_sync(
    request: SyncRequest,
    user_repository: Arc<UserRepository>,
) -> Result<warp::reply::Response, warp::Rejection> {
    if request.auth_provider_id.is_empty() {
        return Ok(error_body(
            "auth_provider_id required",
            StatusCode::BAD_REQUEST,
        ));
    }

    let profile = AuthProfile {
        display_name: request.display_name,
        avatar_url: request.avatar_url,
        email: request.email,
    };
    match user_repository
        .get_or_create_user(&request.auth_provider_id, profile)
        .await
    {
        Ok(user) => Ok(json_with_status(&user, StatusCode::OK)),
        Err(err) => Ok(error_reply(err)),
    }
}

async fn handle_user_claim(
    request: ClaimRequest,
    user_repository: Arc<UserRepository>,
) -> Result<warp::reply::Response, warp::Rejection> {
    match user_repository
        .claim_anonymous(&request.auth_provider_id, &request.fingerprint)
        .await
    {
        Ok(result) => Ok(json_with_status(&result, StatusCode::OK)),
        Err(err) => Ok(error_reply(err)),
    }
}

async fn handle_user_stats(
    user_id: Uuid,
    user_repository: Arc<UserRepository>,
) -> Result<warp::reply::Response, warp::Rejection> {
    match user_repository.get_user_stats(user_id).await {
        Ok(stats) => Ok(json_with_status(&stats, StatusCode::OK)),
        Err(err) => Ok(error_reply(err)),
    }
}

async fn handle_user_history(
    user_id: Uuid,
    query: HistoryQuery,
    user_repository: Arc<UserRepository>,
) -> Result<warp::reply::Response, warp::Rejection> {
    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(20);

    match user_repository.get_user_history(user_id, page, limit).await {
        Ok(history) => Ok(json_with_status(&history, StatusCode::OK)),
        Err(err) => Ok(error_reply(err)),
    }
}

async fn handle_user_update(
    user_id: Uuid,
    request: UpdateProfileRequest,
    user_repository: Arc<UserRepository>,
) -> Result<warp::reply::Response, warp::Rejection> {
    match user_repository
        .update_profile(user_id, request.display_name, request.avatar_url)
        .await
    {
        Ok(user) => Ok(json_with_status(&user, StatusCode::OK)),
        Err(err) => Ok(error_reply(err)),
    }
}

async fn handle_user_delete(
    user_id: Uuid,
    user_repository: Arc<UserRepository>,
) -> Result<warp::reply::Response, warp::Rejection> {
    match user_repository.soft_delete(user_id).await {
        Ok(()) => Ok(warp::reply::with_status(warp::reply(), StatusCode::NO_CONTENT).into_response()),
        Err(err) => Ok(error_reply(err)),
    }
}

fn json_with_status<T: serde::Serialize>(value: &T, status: StatusCode) -> warp::reply::Response {
    warp::reply::with_status(warp::reply::json(value), status).into_response()
}

fn error_body(message: &str, status: StatusCode) -> warp::reply::Response {
    warp::reply::with_status(
        warp::reply::json(&serde_json::json!({ "error": message })),
        status,
    )
    .into_response()
}

fn error_reply(err: GameError) -> warp::reply::Response {
    let status = match &err {
        GameError::GameNotFound | GameError::VideoNotFound | GameError::UserNotFound => {
            StatusCode::NOT_FOUND
        }
        GameError::AlreadyCompleted => StatusCode::CONFLICT,
        GameError::SelfMergeRejected => StatusCode::BAD_REQUEST,
        GameError::InvalidGuessData(_) | GameError::MergeAborted(_) | GameError::Database(_) => {
            tracing::error!("Request failed: {}", err);
            return error_body("Internal server error", StatusCode::INTERNAL_SERVER_ERROR);
        }
    };
    error_body(&err.to_string(), status)
}
