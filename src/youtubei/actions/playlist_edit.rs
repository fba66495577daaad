use serde::Serialize;
use serde_json::{json, Map, Value};

use super::{ActionResponse, STATUS_SUCCEEDED};
use crate::errors::DecodeError;
use crate::json::JsonView;
use crate::request::RequestTemplate;
use crate::response::{is_logged_out, YouTubeResponse};
use crate::validation::{self, ParameterKind, ParameterValidator, ValidatedParameters};

fn edit_body(parameters: &ValidatedParameters, action: Value) -> Map<String, Value> {
    let mut body = Map::new();
    if let Some(playlist_id) = parameters.get(ParameterKind::BrowseId) {
        body.insert("playlistId".to_string(), json!(playlist_id));
    }
    body.insert("actions".to_string(), json!([action]));
    body
}

fn add_body(parameters: &ValidatedParameters) -> Map<String, Value> {
    edit_body(
        parameters,
        json!({
            "action": "ACTION_ADD_VIDEO",
            "addedVideoId": parameters.get(ParameterKind::MovingVideoId),
        }),
    )
}

fn remove_body(parameters: &ValidatedParameters) -> Map<String, Value> {
    edit_body(
        parameters,
        json!({
            "action": "ACTION_REMOVE_VIDEO",
            "setVideoId": parameters.get(ParameterKind::PlaylistEditToken),
        }),
    )
}

/// Without a predecessor the entry moves to the top of the playlist.
fn move_body(parameters: &ValidatedParameters) -> Map<String, Value> {
    let mut action = Map::new();
    action.insert("action".to_string(), json!("ACTION_MOVE_VIDEO_AFTER"));
    action.insert(
        "setVideoId".to_string(),
        json!(parameters.get(ParameterKind::PlaylistEditToken)),
    );
    if let Some(predecessor) = parameters.get(ParameterKind::VideoBeforeId) {
        action.insert("movedSetVideoIdPredecessor".to_string(), json!(predecessor));
    }
    edit_body(parameters, Value::Object(action))
}

fn edit_succeeded(json: JsonView<'_>) -> bool {
    json.get("status").as_str() == Some(STATUS_SUCCEEDED)
}

fn playlist_validator() -> (ParameterKind, ParameterValidator) {
    (ParameterKind::BrowseId, validation::playlist_id_without_vl_prefix())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AddVideoToPlaylistResponse {
    pub success: bool,
    pub is_disconnected: bool,
    pub video_id: Option<String>,
    /// Edit token of the new entry, usable for a later remove or move.
    pub playlist_edit_token: Option<String>,
}

impl YouTubeResponse for AddVideoToPlaylistResponse {
    const NAME: &'static str = "AddVideoToPlaylistResponse";
    const REQUIRES_AUTHENTICATION: bool = true;

    fn template() -> RequestTemplate {
        RequestTemplate::innertube("browse/edit_playlist", add_body)
    }

    fn validators() -> Vec<(ParameterKind, ParameterValidator)> {
        vec![
            playlist_validator(),
            (ParameterKind::MovingVideoId, validation::video_id()),
        ]
    }

    fn required_parameters() -> &'static [ParameterKind] {
        &[ParameterKind::BrowseId, ParameterKind::MovingVideoId]
    }

    fn decode_json(json: JsonView<'_>) -> Result<Self, DecodeError> {
        if is_logged_out(json) {
            return Ok(AddVideoToPlaylistResponse {
                is_disconnected: true,
                ..Default::default()
            });
        }
        if !edit_succeeded(json) {
            return Ok(AddVideoToPlaylistResponse::default());
        }
        let added = json
            .get("playlistEditResults")
            .iter()
            .map(|result| result.get("playlistEditVideoAddedResultData"))
            .find(|data| data.exists())
            .unwrap_or_default();
        Ok(AddVideoToPlaylistResponse {
            success: true,
            is_disconnected: false,
            video_id: added.get("videoId").as_string(),
            playlist_edit_token: added.get("setVideoId").as_string(),
        })
    }
}

impl ActionResponse for AddVideoToPlaylistResponse {
    fn success(&self) -> bool {
        self.success
    }

    fn is_disconnected(&self) -> bool {
        self.is_disconnected
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RemoveVideoFromPlaylistResponse {
    pub success: bool,
    pub is_disconnected: bool,
}

impl YouTubeResponse for RemoveVideoFromPlaylistResponse {
    const NAME: &'static str = "RemoveVideoFromPlaylistResponse";
    const REQUIRES_AUTHENTICATION: bool = true;

    fn template() -> RequestTemplate {
        RequestTemplate::innertube("browse/edit_playlist", remove_body)
    }

    fn validators() -> Vec<(ParameterKind, ParameterValidator)> {
        vec![playlist_validator()]
    }

    fn required_parameters() -> &'static [ParameterKind] {
        &[ParameterKind::BrowseId, ParameterKind::PlaylistEditToken]
    }

    fn decode_json(json: JsonView<'_>) -> Result<Self, DecodeError> {
        let is_disconnected = is_logged_out(json);
        Ok(RemoveVideoFromPlaylistResponse {
            success: !is_disconnected && edit_succeeded(json),
            is_disconnected,
        })
    }
}

impl ActionResponse for RemoveVideoFromPlaylistResponse {
    fn success(&self) -> bool {
        self.success
    }

    fn is_disconnected(&self) -> bool {
        self.is_disconnected
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MoveVideoInPlaylistResponse {
    pub success: bool,
    pub is_disconnected: bool,
}

impl YouTubeResponse for MoveVideoInPlaylistResponse {
    const NAME: &'static str = "MoveVideoInPlaylistResponse";
    const REQUIRES_AUTHENTICATION: bool = true;

    fn template() -> RequestTemplate {
        RequestTemplate::innertube("browse/edit_playlist", move_body)
    }

    fn validators() -> Vec<(ParameterKind, ParameterValidator)> {
        vec![playlist_validator()]
    }

    fn required_parameters() -> &'static [ParameterKind] {
        &[ParameterKind::BrowseId, ParameterKind::PlaylistEditToken]
    }

    fn decode_json(json: JsonView<'_>) -> Result<Self, DecodeError> {
        let is_disconnected = is_logged_out(json);
        Ok(MoveVideoInPlaylistResponse {
            success: !is_disconnected && edit_succeeded(json),
            is_disconnected,
        })
    }
}

impl ActionResponse for MoveVideoInPlaylistResponse {
    fn success(&self) -> bool {
        self.success
    }

    fn is_disconnected(&self) -> bool {
        self.is_disconnected
    }
}

fn create_body(parameters: &ValidatedParameters) -> Map<String, Value> {
    let mut body = Map::new();
    if let Some(title) = parameters.get(ParameterKind::Text) {
        body.insert("title".to_string(), json!(title));
    }
    if let Some(privacy) = parameters.get(ParameterKind::Privacy) {
        body.insert("privacyStatus".to_string(), json!(privacy));
    }
    let video_ids: Vec<&str> = parameters.get(ParameterKind::MovingVideoId).into_iter().collect();
    body.insert("videoIds".to_string(), json!(video_ids));
    body
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreatePlaylistResponse {
    pub success: bool,
    pub is_disconnected: bool,
    pub playlist_id: Option<String>,
}

impl YouTubeResponse for CreatePlaylistResponse {
    const NAME: &'static str = "CreatePlaylistResponse";
    const REQUIRES_AUTHENTICATION: bool = true;

    fn template() -> RequestTemplate {
        RequestTemplate::innertube("playlist/create", create_body)
    }

    fn validators() -> Vec<(ParameterKind, ParameterValidator)> {
        vec![
            (ParameterKind::Privacy, validation::privacy()),
            (ParameterKind::MovingVideoId, validation::video_id()),
        ]
    }

    fn required_parameters() -> &'static [ParameterKind] {
        &[ParameterKind::Text, ParameterKind::Privacy]
    }

    /// The returned playlist id is the only success signal this endpoint gives.
    fn decode_json(json: JsonView<'_>) -> Result<Self, DecodeError> {
        if is_logged_out(json) {
            return Ok(CreatePlaylistResponse {
                is_disconnected: true,
                ..Default::default()
            });
        }
        let playlist_id = json.get("playlistId").as_string().filter(|id| !id.is_empty());
        Ok(CreatePlaylistResponse {
            success: playlist_id.is_some(),
            is_disconnected: false,
            playlist_id,
        })
    }
}

impl ActionResponse for CreatePlaylistResponse {
    fn success(&self) -> bool {
        self.success
    }

    fn is_disconnected(&self) -> bool {
        self.is_disconnected
    }
}
