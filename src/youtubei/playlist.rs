use serde::Serialize;
use serde_json::{json, Map, Value};

use super::search::continuation_body;
use super::{continuation_items, selected_tab_content, tab_items};
use crate::errors::DecodeError;
use crate::json::JsonView;
use crate::models::{ChannelReference, ResultsCollector, Thumbnail, Video};
use crate::request::RequestTemplate;
use crate::response::{ContinuableResponse, ContinuationResponse, YouTubeResponse};
use crate::validation::{self, ParameterKind, ParameterValidator, ValidatedParameters};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlaylistInfosResponse {
    pub playlist_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub channel: Option<ChannelReference>,
    pub video_count: Option<String>,
    pub view_count: Option<String>,
    pub privacy: Option<String>,
    pub thumbnails: Vec<Thumbnail>,
    /// Entries carry `playlist_edit_token`, needed to remove or move them.
    pub results: Vec<Video>,
    pub continuation_token: Option<String>,
}

fn playlist_body(parameters: &ValidatedParameters) -> Map<String, Value> {
    let mut body = Map::new();
    if let Some(browse_id) = parameters.get(ParameterKind::BrowseId) {
        body.insert("browseId".to_string(), json!(browse_id));
    }
    body
}

impl YouTubeResponse for PlaylistInfosResponse {
    const NAME: &'static str = "PlaylistInfosResponse";

    fn template() -> RequestTemplate {
        RequestTemplate::innertube("browse", playlist_body)
    }

    /// Browse ids of playlists are the playlist id prefixed with `VL`.
    fn validators() -> Vec<(ParameterKind, ParameterValidator)> {
        vec![(ParameterKind::BrowseId, validation::playlist_id_with_vl_prefix())]
    }

    fn required_parameters() -> &'static [ParameterKind] {
        &[ParameterKind::BrowseId]
    }

    fn decode_json(json: JsonView<'_>) -> Result<Self, DecodeError> {
        let mut playlist = PlaylistInfosResponse::default();

        let header = json.at(&["header", "playlistHeaderRenderer"]);
        if header.exists() {
            playlist.playlist_id = header.get("playlistId").as_string();
            playlist.title = header.get("title").text();
            playlist.description = header.get("descriptionText").text();
            playlist.channel = ChannelReference::from_runs(header.get("ownerText"));
            playlist.video_count = header
                .get("numVideosText")
                .text()
                .or_else(|| header.at(&["stats", "0"]).text());
            playlist.view_count = header.get("viewCountText").text();
            playlist.privacy = header.get("privacy").as_string();
            playlist.thumbnails = Thumbnail::list_from(
                header.at(&["playlistHeaderBanner", "heroPlaylistThumbnailRenderer", "thumbnail"]),
            );
        } else {
            let page_header = json.at(&["header", "pageHeaderRenderer"]);
            playlist.title = page_header.get("pageTitle").as_string();
        }

        let metadata = json.at(&["metadata", "playlistMetadataRenderer"]);
        if playlist.title.is_none() {
            playlist.title = metadata.get("title").as_string();
        }
        if playlist.description.is_none() {
            playlist.description = metadata.get("description").as_string().filter(|d| !d.is_empty());
        }
        if playlist.playlist_id.is_none() {
            playlist.playlist_id = json
                .at(&["responseContext", "serviceTrackingParams"])
                .iter()
                .flat_map(|service| service.get("params").array_or_default())
                .find(|param| param.get("key").as_str() == Some("browse_id"))
                .and_then(|param| param.get("value").as_str())
                .map(|id| validation::without_vl_prefix(id).to_string());
        }

        let collected = ResultsCollector::collect(tab_items(selected_tab_content(json)));
        playlist.continuation_token = collected.continuation.clone();
        playlist.results = collected.into_videos();

        Ok(playlist)
    }
}

impl ContinuableResponse for PlaylistInfosResponse {
    type Item = Video;
    type Continuation = PlaylistInfosContinuation;

    fn results(&self) -> &[Video] {
        &self.results
    }

    fn results_mut(&mut self) -> &mut Vec<Video> {
        &mut self.results
    }

    fn continuation_token(&self) -> Option<&str> {
        self.continuation_token.as_deref()
    }

    fn set_continuation_token(&mut self, token: Option<String>) {
        self.continuation_token = token;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlaylistInfosContinuation {
    pub results: Vec<Video>,
    pub continuation_token: Option<String>,
}

impl YouTubeResponse for PlaylistInfosContinuation {
    const NAME: &'static str = "PlaylistInfosContinuation";

    fn template() -> RequestTemplate {
        RequestTemplate::innertube("browse", continuation_body)
    }

    fn required_parameters() -> &'static [ParameterKind] {
        &[ParameterKind::Continuation]
    }

    fn decode_json(json: JsonView<'_>) -> Result<Self, DecodeError> {
        let collected = ResultsCollector::collect(continuation_items(json));
        let continuation_token = collected.continuation.clone();
        Ok(PlaylistInfosContinuation {
            results: collected.into_videos(),
            continuation_token,
        })
    }
}

impl ContinuationResponse for PlaylistInfosContinuation {
    type Item = Video;

    fn into_parts(self) -> (Vec<Video>, Option<String>) {
        (self.results, self.continuation_token)
    }
}
