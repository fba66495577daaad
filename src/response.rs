//! The contract every response type implements, plus the continuation
//! sub-protocol shared by paginated responses.

use serde::Serialize;
use serde_json::Value;

use crate::errors::DecodeError;
use crate::json::JsonView;
use crate::request::RequestTemplate;
use crate::validation::{ParameterKind, ParameterValidator};

pub trait YouTubeResponse: Sized + Serialize + Send + 'static {
    /// Unique key of the response type; also used by the logger allowlist.
    const NAME: &'static str;

    /// Authenticated responses short-circuit without cookies.
    const REQUIRES_AUTHENTICATION: bool = false;

    fn template() -> RequestTemplate;

    fn validators() -> Vec<(ParameterKind, ParameterValidator)> {
        Vec::new()
    }

    fn required_parameters() -> &'static [ParameterKind] {
        &[]
    }

    fn decode_data(data: &[u8]) -> Result<Self, DecodeError> {
        let value: Value = serde_json::from_slice(data)
            .map_err(|e| DecodeError::new(format!("parsing JSON body: {}", e)))?;
        Self::decode_json(JsonView::new(&value))
    }

    fn decode_json(json: JsonView<'_>) -> Result<Self, DecodeError>;
}

/// Result elements carry their position in the flattened result list.
pub trait Positioned {
    fn position(&self) -> usize;
    fn set_position(&mut self, position: usize);
}

/// One page fetched through a continuation token.
pub trait ContinuationResponse: YouTubeResponse {
    type Item: Positioned + Send;

    fn into_parts(self) -> (Vec<Self::Item>, Option<String>);
}

pub trait ContinuableResponse: YouTubeResponse {
    type Item: Positioned + Send;
    type Continuation: ContinuationResponse<Item = Self::Item>;

    fn results(&self) -> &[Self::Item];
    fn results_mut(&mut self) -> &mut Vec<Self::Item>;
    fn continuation_token(&self) -> Option<&str>;
    fn set_continuation_token(&mut self, token: Option<String>);

    /// Session token binding a continuation to the original query, if any.
    fn visitor_data(&self) -> Option<&str> {
        None
    }

    /// Appends the page's results after the existing ones and replaces the
    /// stored token, which becomes `None` once the upstream is exhausted.
    fn merge_continuation(&mut self, continuation: Self::Continuation) {
        let (items, token) = continuation.into_parts();
        let offset = self.results().len();
        self.results_mut()
            .extend(items.into_iter().enumerate().map(|(i, mut item)| {
                item.set_position(offset + i);
                item
            }));
        self.set_continuation_token(token);
    }
}

const LOGGED_OUT_PATH: &[&str] = &["responseContext", "mainAppWebResponseContext", "loggedOut"];

/// The upstream marks responses whose session context is missing; decoders
/// return their empty value when they see it.
pub fn is_logged_out(json: JsonView<'_>) -> bool {
    json.at(LOGGED_OUT_PATH).bool_or_default()
}

/// `responseContext.visitorData`, the token correlating later continuations.
pub fn visitor_data(json: JsonView<'_>) -> Option<String> {
    json.at(&["responseContext", "visitorData"])
        .as_string()
        .filter(|v| !v.is_empty())
}

/// Token of a `continuationItemRenderer`.
pub fn continuation_token(item: JsonView<'_>) -> Option<String> {
    let renderer = item.get("continuationItemRenderer");
    renderer
        .at(&["continuationEndpoint", "continuationCommand", "token"])
        .as_string()
        .or_else(|| {
            renderer
                .at(&["button", "buttonRenderer", "command", "continuationCommand", "token"])
                .as_string()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_logged_out_marker() {
        let logged_out = json!({"responseContext": {"mainAppWebResponseContext": {"loggedOut": true}}});
        let logged_in = json!({"responseContext": {"mainAppWebResponseContext": {"loggedOut": false}}});
        assert!(is_logged_out(JsonView::new(&logged_out)));
        assert!(!is_logged_out(JsonView::new(&logged_in)));
        assert!(!is_logged_out(JsonView::new(&json!({}))));
    }

    #[test]
    fn test_continuation_token_locations() {
        let endpoint = json!({"continuationItemRenderer": {
            "continuationEndpoint": {"continuationCommand": {"token": "A"}}
        }});
        let button = json!({"continuationItemRenderer": {
            "button": {"buttonRenderer": {"command": {"continuationCommand": {"token": "B"}}}}
        }});
        assert_eq!(continuation_token(JsonView::new(&endpoint)).as_deref(), Some("A"));
        assert_eq!(continuation_token(JsonView::new(&button)).as_deref(), Some("B"));
        assert_eq!(continuation_token(JsonView::new(&json!({}))), None);
    }
}
