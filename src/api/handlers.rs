use axum::{
    routing::{delete, get, post},
    Router,
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;
use uuid::Uuid;
use crate::client::YouTubeClient;
use crate::logger::{RequestLog, RequestsLogger};
use crate::validation::{ParameterKind, ParameterMap};
use crate::youtubei::{
    autocomplete::AutocompletionResponse,
    captions::VideoCaptionsResponse,
    channel::ChannelInfosResponse,
    home::HomeScreenResponse,
    playlist::{PlaylistInfosContinuation, PlaylistInfosResponse},
    resolve_url::{ResolveUrlResponse, ResolveUrlResult},
    search::{SearchContinuation, SearchResponse},
    trending::{categories, TrendingVideosResponse},
};
use super::types::{
    AppState, AutocompleteRequest, ChannelLookupRequest, ChannelLookupResponse, ContinuationRequest,
    LookupType, PaginatedRequest, PlaylistItemsResponse, SearchRequest, TrendingRequest, UrlRequest,
};
use super::error::ApiError;

type JsonPayload<T> = Result<Json<T>, axum::extract::rejection::JsonRejection>;

fn parse<T>(payload: JsonPayload<T>) -> Result<T, ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
    Ok(payload)
}

async fn resolve_url(client: &YouTubeClient, url: String) -> Result<Option<ResolveUrlResult>, ApiError> {
    let response = client
        .send::<ResolveUrlResponse>(ParameterMap::new().with(ParameterKind::CustomUrl, url), None)
        .await?;
    Ok(response.result)
}

async fn fetch_channel(
    client: &YouTubeClient,
    browse_id: &str,
    params: Option<&str>,
) -> Result<ChannelInfosResponse, ApiError> {
    let mut parameters = ParameterMap::new().with(ParameterKind::BrowseId, browse_id);
    if let Some(params) = params {
        parameters = parameters.with(ParameterKind::Params, params);
    }
    Ok(client.send::<ChannelInfosResponse>(parameters, None).await?)
}

async fn channel_handler(
    State(state): State<Arc<AppState>>,
    payload: JsonPayload<ChannelLookupRequest>,
) -> Result<Json<ChannelLookupResponse>, ApiError> {
    let payload = parse(payload)?;

    let url = match payload.r#type {
        LookupType::ChannelId => None,
        LookupType::Handle => Some(format!(
            "https://www.youtube.com/@{}",
            payload.id.trim_start_matches('@')
        )),
        LookupType::CustomUrl => Some(format!("https://www.youtube.com/c/{}", payload.id)),
    };

    let mut redirect_url = None;
    let browse_id = match url {
        None => payload.id.clone(),
        Some(url) => match resolve_url(&state.client, url).await? {
            Some(ResolveUrlResult::BrowseEndpoint { browse_id, .. }) => browse_id,
            Some(ResolveUrlResult::UrlEndpoint { url }) => {
                return Err(ApiError::NotFound(format!("Channel URL points elsewhere: {}", url)))
            }
            Some(ResolveUrlResult::WatchEndpoint { .. }) => {
                return Err(ApiError::InvalidRequest("URL points to a video, not a channel".to_string()))
            }
            None => return Err(ApiError::NotFound("Channel not found".to_string())),
        },
    };

    let mut channel = fetch_channel(&state.client, &browse_id, payload.params.as_deref()).await?;

    // Follow a single redirect; the target's own redirect is reported as-is.
    if let Some(target) = channel.conditional_redirect.clone() {
        tracing::info!(from = %browse_id, to = %target, "following channel redirect");
        redirect_url = Some(format!("https://www.youtube.com/channel/{}", target));
        channel = fetch_channel(&state.client, &target, payload.params.as_deref()).await?;
    }

    if channel.channel_id.is_none() && channel.name.is_none() {
        return Err(ApiError::NotFound("Channel not found".to_string()));
    }

    Ok(Json(ChannelLookupResponse {
        channel,
        redirect_url,
    }))
}

async fn playlist_items_handler(
    State(state): State<Arc<AppState>>,
    payload: JsonPayload<PaginatedRequest>,
) -> Result<Json<PlaylistItemsResponse>, ApiError> {
    let payload = parse(payload)?;

    if let Some(page_token) = payload.page_token {
        let page = state
            .client
            .send::<PlaylistInfosContinuation>(
                ParameterMap::new().with(ParameterKind::Continuation, page_token),
                None,
            )
            .await?;
        return Ok(Json(PlaylistItemsResponse {
            title: None,
            items: page.results,
            page_token: page.continuation_token,
        }));
    }

    let playlist = state
        .client
        .send::<PlaylistInfosResponse>(
            ParameterMap::new().with(ParameterKind::BrowseId, payload.id),
            None,
        )
        .await?;

    Ok(Json(PlaylistItemsResponse {
        title: playlist.title,
        items: playlist.results,
        page_token: playlist.continuation_token,
    }))
}

async fn search_handler(
    State(state): State<Arc<AppState>>,
    payload: JsonPayload<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    let payload = parse(payload)?;
    let mut parameters = ParameterMap::new().with(ParameterKind::Query, payload.query);
    if let Some(params) = payload.params {
        parameters = parameters.with(ParameterKind::Params, params);
    }
    Ok(Json(state.client.send::<SearchResponse>(parameters, None).await?))
}

async fn search_continuation_handler(
    State(state): State<Arc<AppState>>,
    payload: JsonPayload<ContinuationRequest>,
) -> Result<Json<SearchContinuation>, ApiError> {
    let payload = parse(payload)?;
    let mut parameters = ParameterMap::new().with(ParameterKind::Continuation, payload.continuation);
    if let Some(visitor_data) = payload.visitor_data {
        parameters = parameters.with(ParameterKind::VisitorData, visitor_data);
    }
    Ok(Json(state.client.send::<SearchContinuation>(parameters, None).await?))
}

async fn autocomplete_handler(
    State(state): State<Arc<AppState>>,
    payload: JsonPayload<AutocompleteRequest>,
) -> Result<Json<AutocompletionResponse>, ApiError> {
    let payload = parse(payload)?;
    let parameters = ParameterMap::new().with(ParameterKind::Query, payload.query);
    Ok(Json(state.client.send::<AutocompletionResponse>(parameters, None).await?))
}

fn trending_params(category: Option<&str>) -> Result<Option<&'static str>, ApiError> {
    match category {
        None | Some("now") => Ok(None),
        Some("music") => Ok(Some(categories::MUSIC)),
        Some("gaming") => Ok(Some(categories::GAMING)),
        Some("movies") => Ok(Some(categories::MOVIES)),
        Some(other) => Err(ApiError::InvalidRequest(format!("Unknown trending category: {}", other))),
    }
}

async fn trending_handler(
    State(state): State<Arc<AppState>>,
    payload: JsonPayload<TrendingRequest>,
) -> Result<Json<TrendingVideosResponse>, ApiError> {
    let payload = parse(payload)?;
    let mut parameters = ParameterMap::new();
    if let Some(params) = trending_params(payload.category.as_deref())? {
        parameters = parameters.with(ParameterKind::Params, params);
    }
    Ok(Json(state.client.send::<TrendingVideosResponse>(parameters, None).await?))
}

async fn home_handler(State(state): State<Arc<AppState>>) -> Result<Json<HomeScreenResponse>, ApiError> {
    Ok(Json(state.client.send::<HomeScreenResponse>(ParameterMap::new(), None).await?))
}

async fn resolve_url_handler(
    State(state): State<Arc<AppState>>,
    payload: JsonPayload<UrlRequest>,
) -> Result<Json<ResolveUrlResponse>, ApiError> {
    let payload = parse(payload)?;
    let result = resolve_url(&state.client, payload.url).await?;
    Ok(Json(ResolveUrlResponse { result }))
}

async fn captions_handler(
    State(state): State<Arc<AppState>>,
    payload: JsonPayload<UrlRequest>,
) -> Result<Json<VideoCaptionsResponse>, ApiError> {
    let payload = parse(payload)?;
    let parameters = ParameterMap::new().with(ParameterKind::CustomUrl, payload.url);
    Ok(Json(state.client.send::<VideoCaptionsResponse>(parameters, None).await?))
}

async fn logs_handler(State(state): State<Arc<AppState>>) -> Json<Vec<RequestLog>> {
    Json(state.logger.logs())
}

async fn clear_logs_handler(State(state): State<Arc<AppState>>) -> StatusCode {
    state.logger.clear();
    StatusCode::NO_CONTENT
}

async fn clear_log_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.logger.clear_by_id(id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("No log with id {}", id)))
    }
}

pub fn create_router(client: YouTubeClient, logger: Arc<RequestsLogger>) -> Router {
    let state = Arc::new(AppState { client, logger });

    Router::new()
        .route("/api/search", post(search_handler))
        .route("/api/search/continuation", post(search_continuation_handler))
        .route("/api/autocomplete", post(autocomplete_handler))
        .route("/api/channel", post(channel_handler))
        .route("/api/playlist_items", post(playlist_items_handler))
        .route("/api/trending", post(trending_handler))
        .route("/api/home", get(home_handler))
        .route("/api/resolve_url", post(resolve_url_handler))
        .route("/api/captions", post(captions_handler))
        .route("/api/logs", get(logs_handler).delete(clear_logs_handler))
        .route("/api/logs/:id", delete(clear_log_handler))
        .with_state(state)
}
