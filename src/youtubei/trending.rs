use serde::Serialize;
use serde_json::{json, Map, Value};

use super::{selected_tab_content, tab_items};
use crate::errors::DecodeError;
use crate::json::JsonView;
use crate::models::{ResultsCollector, Video};
use crate::request::RequestTemplate;
use crate::response::YouTubeResponse;
use crate::validation::{ParameterKind, ValidatedParameters};

pub const TRENDING_BROWSE_ID: &str = "FEtrending";

/// `params` tokens selecting a trending category.
pub mod categories {
    pub const MUSIC: &str = "4gINGgt5dG1hX2NoYXJ0cw%3D%3D";
    pub const GAMING: &str = "4gIcGhpnYW1pbmdfY29ycHVzX21vc3RfcG9wdWxhcg%3D%3D";
    pub const MOVIES: &str = "4gIKGgh0cmFpbGVycw%3D%3D";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrendingVideosResponse {
    pub category_title: Option<String>,
    pub videos: Vec<Video>,
}

fn trending_body(parameters: &ValidatedParameters) -> Map<String, Value> {
    let mut body = Map::new();
    body.insert("browseId".to_string(), json!(TRENDING_BROWSE_ID));
    if let Some(params) = parameters.get(ParameterKind::Params) {
        body.insert("params".to_string(), json!(params));
    }
    body
}

impl YouTubeResponse for TrendingVideosResponse {
    const NAME: &'static str = "TrendingVideosResponse";

    fn template() -> RequestTemplate {
        RequestTemplate::innertube("browse", trending_body)
    }

    fn decode_json(json: JsonView<'_>) -> Result<Self, DecodeError> {
        let tab = json
            .at(&["contents", "twoColumnBrowseResultsRenderer", "tabs"])
            .iter()
            .find(|t| t.at(&["tabRenderer", "selected"]).bool_or_default());
        let collected = ResultsCollector::collect(tab_items(selected_tab_content(json)));
        Ok(TrendingVideosResponse {
            category_title: tab.and_then(|t| t.at(&["tabRenderer", "title"]).as_string()),
            videos: collected.into_videos(),
        })
    }
}
