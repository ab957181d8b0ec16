//! Public JSON API: the feed page endpoint and the single-take endpoints.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;

use hottake_api_types::{CreatePostRequest, Post};

use crate::{
    application::{
        error::{ApiError, ErrorReport},
        feed::FeedService,
        takes::TakeService,
    },
    domain::entities::TakeRecord,
    infra::{
        db::PostgresRepositories,
        gateway::{GatewayStatus, StoreGateway},
    },
};

use super::middleware::{log_responses, set_request_context};

#[derive(Clone)]
pub struct ApiState {
    pub feed: Arc<FeedService>,
    pub takes: Arc<TakeService>,
    pub store: Arc<StoreGateway<Arc<PostgresRepositories>>>,
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/posts", get(list_posts))
        .route("/post", get(get_post).post(create_post))
        .route("/_health/db", get(db_health))
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FeedQuery {
    pub offset: Option<u64>,
    pub sort: Option<String>,
    pub seed: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TakeQuery {
    #[serde(rename = "postID")]
    pub post_id: Option<String>,
}

pub async fn list_posts(
    State(state): State<ApiState>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<Vec<Post>>, ApiError> {
    let page = state
        .feed
        .list_page(
            query.sort.as_deref(),
            query.offset.unwrap_or(0),
            query.seed.as_deref(),
        )
        .await?;

    Ok(Json(page.into_iter().map(take_to_post).collect()))
}

pub async fn get_post(
    State(state): State<ApiState>,
    Query(query): Query<TakeQuery>,
) -> Result<Json<Post>, ApiError> {
    let raw_id = query.post_id.ok_or_else(|| {
        ApiError::bad_request("infra::http::api::get_post", "Invalid arguments provided")
    })?;

    let record = state.takes.get(&raw_id).await?;
    Ok(Json(take_to_post(record)))
}

pub async fn create_post(
    State(state): State<ApiState>,
    Json(request): Json<CreatePostRequest>,
) -> Result<Json<Post>, ApiError> {
    let record = state.takes.create(&request.title).await?;
    Ok(Json(take_to_post(record)))
}

async fn db_health(State(state): State<ApiState>) -> Response {
    let status = state.store.status().await;
    if status == GatewayStatus::Ready {
        if let Ok(repos) = state.store.acquire().await {
            match repos.health_check().await {
                Ok(()) => return StatusCode::NO_CONTENT.into_response(),
                Err(err) => {
                    let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
                    ErrorReport::from_error(
                        "infra::http::api::db_health",
                        StatusCode::SERVICE_UNAVAILABLE,
                        &err,
                    )
                    .attach(&mut response);
                    return response;
                }
            }
        }
    }

    let mut response =
        (StatusCode::SERVICE_UNAVAILABLE, status.as_str().to_string()).into_response();
    ErrorReport::from_message(
        "infra::http::api::db_health",
        StatusCode::SERVICE_UNAVAILABLE,
        format!("store gateway is {}", status.as_str()),
    )
    .attach(&mut response);
    response
}

pub fn take_to_post(record: TakeRecord) -> Post {
    Post {
        id: record.id,
        title: record.title,
        agree: record.agree,
        disagree: record.disagree,
        votes: record.votes,
        interactions: record.interactions,
        reports: record.reports,
        date: record.created_at,
    }
}
