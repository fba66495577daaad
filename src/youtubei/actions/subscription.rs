use serde::Serialize;
use serde_json::{json, Map, Value};

use super::{actions_named, ActionResponse};
use crate::errors::DecodeError;
use crate::json::JsonView;
use crate::request::RequestTemplate;
use crate::response::{is_logged_out, YouTubeResponse};
use crate::validation::{self, ParameterKind, ParameterValidator, ValidatedParameters};

const SUBSCRIBE_PARAMS: &str = "EgIIAhgA";

fn subscription_body(parameters: &ValidatedParameters) -> Map<String, Value> {
    let mut body = Map::new();
    if let Some(channel_id) = parameters.get(ParameterKind::BrowseId) {
        body.insert("channelIds".to_string(), json!([channel_id]));
    }
    body.insert("params".to_string(), json!(SUBSCRIBE_PARAMS));
    body
}

/// Finds the `updateSubscribeButtonAction` whose `subscribed` equals the
/// wanted state and returns the channel it names.
fn subscription_state(json: JsonView<'_>, subscribed: bool) -> Option<Option<String>> {
    actions_named(json, "updateSubscribeButtonAction")
        .find(|action| action.get("subscribed").as_bool() == Some(subscribed))
        .map(|action| action.get("channelId").as_string())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SubscribeChannelResponse {
    pub success: bool,
    pub is_disconnected: bool,
    pub channel_id: Option<String>,
}

impl YouTubeResponse for SubscribeChannelResponse {
    const NAME: &'static str = "SubscribeChannelResponse";
    const REQUIRES_AUTHENTICATION: bool = true;

    fn template() -> RequestTemplate {
        RequestTemplate::innertube("subscription/subscribe", subscription_body)
    }

    fn validators() -> Vec<(ParameterKind, ParameterValidator)> {
        vec![(ParameterKind::BrowseId, validation::channel_id())]
    }

    fn required_parameters() -> &'static [ParameterKind] {
        &[ParameterKind::BrowseId]
    }

    fn decode_json(json: JsonView<'_>) -> Result<Self, DecodeError> {
        if is_logged_out(json) {
            return Ok(SubscribeChannelResponse {
                is_disconnected: true,
                ..Default::default()
            });
        }
        Ok(match subscription_state(json, true) {
            Some(channel_id) => SubscribeChannelResponse {
                success: true,
                is_disconnected: false,
                channel_id,
            },
            None => SubscribeChannelResponse::default(),
        })
    }
}

impl ActionResponse for SubscribeChannelResponse {
    fn success(&self) -> bool {
        self.success
    }

    fn is_disconnected(&self) -> bool {
        self.is_disconnected
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UnsubscribeChannelResponse {
    pub success: bool,
    pub is_disconnected: bool,
    pub channel_id: Option<String>,
}

impl YouTubeResponse for UnsubscribeChannelResponse {
    const NAME: &'static str = "UnsubscribeChannelResponse";
    const REQUIRES_AUTHENTICATION: bool = true;

    fn template() -> RequestTemplate {
        RequestTemplate::innertube("subscription/unsubscribe", subscription_body)
    }

    fn validators() -> Vec<(ParameterKind, ParameterValidator)> {
        vec![(ParameterKind::BrowseId, validation::channel_id())]
    }

    fn required_parameters() -> &'static [ParameterKind] {
        &[ParameterKind::BrowseId]
    }

    fn decode_json(json: JsonView<'_>) -> Result<Self, DecodeError> {
        if is_logged_out(json) {
            return Ok(UnsubscribeChannelResponse {
                is_disconnected: true,
                ..Default::default()
            });
        }
        Ok(match subscription_state(json, false) {
            Some(channel_id) => UnsubscribeChannelResponse {
                success: true,
                is_disconnected: false,
                channel_id,
            },
            None => UnsubscribeChannelResponse::default(),
        })
    }
}

impl ActionResponse for UnsubscribeChannelResponse {
    fn success(&self) -> bool {
        self.success
    }

    fn is_disconnected(&self) -> bool {
        self.is_disconnected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode<T: YouTubeResponse>(value: Value) -> T {
        T::decode_json(JsonView::new(&value)).unwrap()
    }

    #[test]
    fn test_logged_out_overrides_everything() {
        let response: SubscribeChannelResponse = decode(json!({
            "responseContext": {"mainAppWebResponseContext": {"loggedOut": true}},
            "actions": [{"updateSubscribeButtonAction": {"success": true}}]
        }));
        assert!(!response.success);
        assert!(response.is_disconnected);
    }

    #[test]
    fn test_subscribed() {
        let response: SubscribeChannelResponse = decode(json!({
            "responseContext": {"mainAppWebResponseContext": {"loggedOut": false}},
            "actions": [
                {"addToGuideSectionAction": {}},
                {"updateSubscribeButtonAction": {"subscribed": true, "channelId": "UCewMTclBJZPaNEfbf-qYMGA"}}
            ]
        }));
        assert!(response.success);
        assert!(!response.is_disconnected);
        assert_eq!(response.channel_id.as_deref(), Some("UCewMTclBJZPaNEfbf-qYMGA"));
    }

    #[test]
    fn test_success_needs_the_right_state() {
        let payload = json!({"actions": [{"updateSubscribeButtonAction": {"subscribed": false}}]});
        let subscribe: SubscribeChannelResponse = decode(payload.clone());
        let unsubscribe: UnsubscribeChannelResponse = decode(payload);
        assert!(!subscribe.success);
        assert!(unsubscribe.success);
        assert_eq!(unsubscribe.channel_id, None);
    }

    #[test]
    fn test_empty_payload_is_not_success() {
        let response: UnsubscribeChannelResponse = decode(json!({}));
        assert!(!response.success);
        assert!(!response.is_disconnected);
    }
}
