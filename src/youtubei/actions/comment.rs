use serde::Serialize;
use serde_json::{json, Map, Value};

use super::{action_succeeded, actions_named, ActionResponse};
use crate::errors::DecodeError;
use crate::json::JsonView;
use crate::models::Thumbnail;
use crate::request::RequestTemplate;
use crate::response::{is_logged_out, YouTubeResponse};
use crate::validation::{ParameterKind, ValidatedParameters};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentAuthor {
    pub channel_id: Option<String>,
    pub name: Option<String>,
    pub thumbnails: Vec<Thumbnail>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comment {
    pub comment_id: String,
    pub text: Option<String>,
    pub author: Option<CommentAuthor>,
    pub time_posted: Option<String>,
    pub like_count: Option<String>,
}

impl Comment {
    /// Decodes a `commentRenderer`, or the id-only `commentViewModel`.
    ///
    /// `Ok(None)` means no comment node at all; a node without an id fails.
    fn decode(node: JsonView<'_>) -> Result<Option<Self>, DecodeError> {
        let renderer = node.get("commentRenderer");
        if renderer.exists() {
            let comment_id = renderer
                .get("commentId")
                .as_string()
                .ok_or_else(|| DecodeError::new("reading commentId of the returned comment"))?;
            let author = renderer.get("authorText").text().map(|name| CommentAuthor {
                channel_id: renderer
                    .at(&["authorEndpoint", "browseEndpoint", "browseId"])
                    .as_string(),
                name: Some(name),
                thumbnails: Thumbnail::list_from(renderer.get("authorThumbnail")),
            });
            return Ok(Some(Comment {
                comment_id,
                text: renderer.get("contentText").text(),
                author,
                time_posted: renderer.get("publishedTimeText").text(),
                like_count: renderer.get("voteCount").text(),
            }));
        }

        let view_model = node.at(&["commentViewModel", "commentViewModel"]);
        if view_model.exists() {
            let comment_id = view_model
                .get("commentId")
                .as_string()
                .ok_or_else(|| DecodeError::new("reading commentId of the returned comment view model"))?;
            return Ok(Some(Comment {
                comment_id,
                text: None,
                author: None,
                time_posted: None,
                like_count: None,
            }));
        }

        Ok(None)
    }
}

fn create_body(parameters: &ValidatedParameters) -> Map<String, Value> {
    let mut body = Map::new();
    if let Some(text) = parameters.get(ParameterKind::Text) {
        body.insert("commentText".to_string(), json!(text));
    }
    if let Some(params) = parameters.get(ParameterKind::Params) {
        body.insert("createCommentParams".to_string(), json!(params));
    }
    body
}

fn update_body(parameters: &ValidatedParameters) -> Map<String, Value> {
    let mut body = Map::new();
    if let Some(text) = parameters.get(ParameterKind::Text) {
        body.insert("commentText".to_string(), json!(text));
    }
    if let Some(params) = parameters.get(ParameterKind::Params) {
        body.insert("updateCommentParams".to_string(), json!(params));
    }
    body
}

fn perform_body(parameters: &ValidatedParameters) -> Map<String, Value> {
    let mut body = Map::new();
    let actions: Vec<&str> = parameters.get(ParameterKind::Params).into_iter().collect();
    body.insert("actions".to_string(), json!(actions));
    body
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateCommentResponse {
    pub success: bool,
    pub is_disconnected: bool,
    pub new_comment: Option<Comment>,
}

impl YouTubeResponse for CreateCommentResponse {
    const NAME: &'static str = "CreateCommentResponse";
    const REQUIRES_AUTHENTICATION: bool = true;

    fn template() -> RequestTemplate {
        RequestTemplate::innertube("comment/create_comment", create_body)
    }

    fn required_parameters() -> &'static [ParameterKind] {
        &[ParameterKind::Params, ParameterKind::Text]
    }

    fn decode_json(json: JsonView<'_>) -> Result<Self, DecodeError> {
        if is_logged_out(json) {
            return Ok(CreateCommentResponse {
                is_disconnected: true,
                ..Default::default()
            });
        }
        if !action_succeeded(json, None) {
            return Ok(CreateCommentResponse::default());
        }
        let mut new_comment = None;
        for action in actions_named(json, "createCommentAction") {
            let thread = action.at(&["contents", "commentThreadRenderer"]);
            let node = if thread.get("comment").exists() {
                thread.get("comment")
            } else {
                thread
            };
            if let Some(comment) = Comment::decode(node)? {
                new_comment = Some(comment);
                break;
            }
        }
        Ok(CreateCommentResponse {
            success: true,
            is_disconnected: false,
            new_comment,
        })
    }
}

impl ActionResponse for CreateCommentResponse {
    fn success(&self) -> bool {
        self.success
    }

    fn is_disconnected(&self) -> bool {
        self.is_disconnected
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EditCommentResponse {
    pub success: bool,
    pub is_disconnected: bool,
    pub edited_comment: Option<Comment>,
}

impl YouTubeResponse for EditCommentResponse {
    const NAME: &'static str = "EditCommentResponse";
    const REQUIRES_AUTHENTICATION: bool = true;

    fn template() -> RequestTemplate {
        RequestTemplate::innertube("comment/update_comment", update_body)
    }

    fn required_parameters() -> &'static [ParameterKind] {
        &[ParameterKind::Params, ParameterKind::Text]
    }

    fn decode_json(json: JsonView<'_>) -> Result<Self, DecodeError> {
        if is_logged_out(json) {
            return Ok(EditCommentResponse {
                is_disconnected: true,
                ..Default::default()
            });
        }
        if !action_succeeded(json, None) {
            return Ok(EditCommentResponse::default());
        }
        let mut edited_comment = None;
        for action in actions_named(json, "updateCommentAction") {
            if let Some(comment) = Comment::decode(action.get("contents"))? {
                edited_comment = Some(comment);
                break;
            }
        }
        Ok(EditCommentResponse {
            success: true,
            is_disconnected: false,
            edited_comment,
        })
    }
}

impl ActionResponse for EditCommentResponse {
    fn success(&self) -> bool {
        self.success
    }

    fn is_disconnected(&self) -> bool {
        self.is_disconnected
    }
}

/// Comment actions sharing `perform_comment_action`, told apart by the
/// feedback tag echoed on success. `params` is the opaque action token taken
/// from the comment's menu.
macro_rules! comment_action {
    ($name:ident, $feedback:literal) => {
        #[derive(Debug, Clone, Default, PartialEq, Serialize)]
        pub struct $name {
            pub success: bool,
            pub is_disconnected: bool,
        }

        impl YouTubeResponse for $name {
            const NAME: &'static str = stringify!($name);
            const REQUIRES_AUTHENTICATION: bool = true;

            fn template() -> RequestTemplate {
                RequestTemplate::innertube("comment/perform_comment_action", perform_body)
            }

            fn required_parameters() -> &'static [ParameterKind] {
                &[ParameterKind::Params]
            }

            fn decode_json(json: JsonView<'_>) -> Result<Self, DecodeError> {
                let is_disconnected = is_logged_out(json);
                Ok($name {
                    success: !is_disconnected && action_succeeded(json, Some($feedback)),
                    is_disconnected,
                })
            }
        }

        impl ActionResponse for $name {
            fn success(&self) -> bool {
                self.success
            }

            fn is_disconnected(&self) -> bool {
                self.is_disconnected
            }
        }
    };
}

comment_action!(DeleteCommentResponse, "FEEDBACK_REMOVE");
comment_action!(LikeCommentResponse, "FEEDBACK_LIKE");
comment_action!(DislikeCommentResponse, "FEEDBACK_DISLIKE");
comment_action!(RemoveLikeFromCommentResponse, "FEEDBACK_UNLIKE");
