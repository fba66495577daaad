use serde::Serialize;
use serde_json::{json, Map, Value};

use super::search::continuation_body;
use super::{continuation_items, selected_tab_content, tab_items};
use crate::errors::DecodeError;
use crate::json::JsonView;
use crate::models::{ResultsCollector, Video};
use crate::request::RequestTemplate;
use crate::response::{visitor_data, ContinuableResponse, ContinuationResponse, YouTubeResponse};
use crate::validation::{ParameterKind, ValidatedParameters};

pub const HOME_BROWSE_ID: &str = "FEwhat_to_watch";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HomeScreenResponse {
    pub results: Vec<Video>,
    pub continuation_token: Option<String>,
    pub visitor_data: Option<String>,
}

fn home_body(_: &ValidatedParameters) -> Map<String, Value> {
    let mut body = Map::new();
    body.insert("browseId".to_string(), json!(HOME_BROWSE_ID));
    body
}

impl YouTubeResponse for HomeScreenResponse {
    const NAME: &'static str = "HomeScreenResponse";

    fn template() -> RequestTemplate {
        RequestTemplate::innertube("browse", home_body)
    }

    fn decode_json(json: JsonView<'_>) -> Result<Self, DecodeError> {
        let collected = ResultsCollector::collect(tab_items(selected_tab_content(json)));
        let continuation_token = collected.continuation.clone();
        Ok(HomeScreenResponse {
            results: collected.into_videos(),
            continuation_token,
            visitor_data: visitor_data(json),
        })
    }
}

impl ContinuableResponse for HomeScreenResponse {
    type Item = Video;
    type Continuation = HomeScreenContinuation;

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

    fn visitor_data(&self) -> Option<&str> {
        self.visitor_data.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HomeScreenContinuation {
    pub results: Vec<Video>,
    pub continuation_token: Option<String>,
}

impl YouTubeResponse for HomeScreenContinuation {
    const NAME: &'static str = "HomeScreenContinuation";

    fn template() -> RequestTemplate {
        RequestTemplate::innertube("browse", continuation_body)
    }

    fn required_parameters() -> &'static [ParameterKind] {
        &[ParameterKind::Continuation]
    }

    fn decode_json(json: JsonView<'_>) -> Result<Self, DecodeError> {
        let collected = ResultsCollector::collect(continuation_items(json));
        let continuation_token = collected.continuation.clone();
        Ok(HomeScreenContinuation {
            results: collected.into_videos(),
            continuation_token,
        })
    }
}

impl ContinuationResponse for HomeScreenContinuation {
    type Item = Video;

    fn into_parts(self) -> (Vec<Video>, Option<String>) {
        (self.results, self.continuation_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_rich_grid() {
        let value = json!({
            "responseContext": {"visitorData": "VD"},
            "contents": {"twoColumnBrowseResultsRenderer": {"tabs": [{"tabRenderer": {
                "selected": true,
                "content": {"richGridRenderer": {"contents": [
                    {"richItemRenderer": {"content": {"videoRenderer": {"videoId": "aaaaaaaaaaA"}}}},
                    {"richSectionRenderer": {"content": {"richShelfRenderer": {"contents": [
                        {"richItemRenderer": {"content": {"reelItemRenderer": {"videoId": "short"}}}}
                    ]}}}},
                    {"richItemRenderer": {"content": {"adSlotRenderer": {}}}},
                    {"richItemRenderer": {"content": {"videoRenderer": {"videoId": "bbbbbbbbbbA"}}}},
                    {"continuationItemRenderer": {"continuationEndpoint": {"continuationCommand": {"token": "HOME"}}}}
                ]}}
            }}]}}
        });
        let response = HomeScreenResponse::decode_json(JsonView::new(&value)).unwrap();
        let ids: Vec<_> = response.results.iter().map(|v| (v.id, v.video_id.as_str())).collect();
        assert_eq!(ids, vec![(0, "aaaaaaaaaaA"), (1, "bbbbbbbbbbA")]);
        assert_eq!(response.continuation_token.as_deref(), Some("HOME"));
        assert_eq!(response.visitor_data.as_deref(), Some("VD"));
    }

    #[test]
    fn test_continuation_page() {
        let value = json!({"onResponseReceivedActions": [{"appendContinuationItemsAction": {"continuationItems": [
            {"richItemRenderer": {"content": {"videoRenderer": {"videoId": "ccccccccccA"}}}}
        ]}}]});
        let page = HomeScreenContinuation::decode_json(JsonView::new(&value)).unwrap();
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.continuation_token, None);

        let mut home = HomeScreenResponse {
            results: vec![],
            continuation_token: Some("HOME".to_string()),
            visitor_data: None,
        };
        home.merge_continuation(page);
        assert_eq!(home.results[0].video_id, "ccccccccccA");
        assert_eq!(home.continuation_token, None);
    }
}
