use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::errors::DecodeError;
use crate::json::JsonView;
use crate::request::RequestTemplate;
use crate::response::YouTubeResponse;
use crate::validation::{self, ParameterKind, ParameterValidator, ValidatedParameters};

#[derive(Debug, Deserialize)]
struct BrowseEndpoint {
    #[serde(rename = "browseId")]
    browse_id: String,
    params: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UrlEndpoint {
    url: String,
}

#[derive(Debug, Deserialize)]
struct WatchEndpoint {
    #[serde(rename = "videoId")]
    video_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EndpointType {
    Browse {
        #[serde(rename = "browseEndpoint")]
        browse_endpoint: BrowseEndpoint,
    },
    Watch {
        #[serde(rename = "watchEndpoint")]
        watch_endpoint: WatchEndpoint,
    },
    Url {
        #[serde(rename = "urlEndpoint")]
        url_endpoint: UrlEndpoint,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResolveUrlResult {
    BrowseEndpoint {
        browse_id: String,
        params: Option<String>,
    },
    WatchEndpoint {
        video_id: String,
    },
    UrlEndpoint {
        url: String,
    },
}

/// What a platform URL (handle, custom URL, legacy `/user/` path) points to.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolveUrlResponse {
    pub result: Option<ResolveUrlResult>,
}

fn resolve_body(parameters: &ValidatedParameters) -> Map<String, Value> {
    let mut body = Map::new();
    if let Some(url) = parameters.get(ParameterKind::CustomUrl) {
        body.insert("url".to_string(), json!(url));
    }
    body
}

impl YouTubeResponse for ResolveUrlResponse {
    const NAME: &'static str = "ResolveUrlResponse";

    fn template() -> RequestTemplate {
        RequestTemplate::innertube("navigation/resolve_url", resolve_body)
    }

    fn validators() -> Vec<(ParameterKind, ParameterValidator)> {
        vec![(ParameterKind::CustomUrl, validation::url())]
    }

    fn required_parameters() -> &'static [ParameterKind] {
        &[ParameterKind::CustomUrl]
    }

    fn decode_json(json: JsonView<'_>) -> Result<Self, DecodeError> {
        let Some(endpoint) = json.get("endpoint").to_value() else {
            return Ok(ResolveUrlResponse::default());
        };
        let result = match serde_json::from_value::<EndpointType>(endpoint) {
            Ok(EndpointType::Browse { browse_endpoint }) => Some(ResolveUrlResult::BrowseEndpoint {
                browse_id: browse_endpoint.browse_id,
                params: browse_endpoint.params,
            }),
            Ok(EndpointType::Watch { watch_endpoint }) => Some(ResolveUrlResult::WatchEndpoint {
                video_id: watch_endpoint.video_id,
            }),
            Ok(EndpointType::Url { url_endpoint }) => Some(ResolveUrlResult::UrlEndpoint {
                url: url_endpoint.url,
            }),
            Err(_) => None,
        };
        Ok(ResolveUrlResponse { result })
    }
}
