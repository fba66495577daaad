use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::client::YouTubeClient;
use crate::logger::RequestsLogger;
use crate::models::Video;
use crate::youtubei::channel::ChannelInfosResponse;

pub struct AppState {
    pub client: YouTubeClient,
    pub logger: Arc<RequestsLogger>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LookupType {
    CustomUrl,
    Handle,
    ChannelId,
}

#[derive(Debug, Deserialize)]
pub struct ChannelLookupRequest {
    pub r#type: LookupType,
    pub id: String,
    /// Tab selector, see `youtubei::channel::tabs`.
    pub params: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChannelLookupResponse {
    pub channel: ChannelInfosResponse,
    pub redirect_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub params: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ContinuationRequest {
    pub continuation: String,
    pub visitor_data: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AutocompleteRequest {
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct TrendingRequest {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UrlRequest {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct PaginatedRequest {
    pub id: String,
    pub page_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PlaylistItemsResponse {
    pub title: Option<String>,
    pub items: Vec<Video>,
    pub page_token: Option<String>,
}
