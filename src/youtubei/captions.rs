use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::errors::DecodeError;
use crate::json::JsonView;
use crate::request::RequestTemplate;
use crate::response::YouTubeResponse;
use crate::validation::{self, ParameterKind, ParameterValidator};

static TRANSCRIPT_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<text start="([0-9.]+)"(?: dur="([0-9.]+)")?[^>]*>(.*?)</text>"#).unwrap()
});

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Caption {
    pub text: String,
    /// Seconds from the start of the video.
    pub start_time: f64,
    pub duration: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VideoCaptionsResponse {
    pub captions: Vec<Caption>,
}

impl YouTubeResponse for VideoCaptionsResponse {
    const NAME: &'static str = "VideoCaptionsResponse";

    /// The caption track's `baseUrl` is the request URL.
    fn template() -> RequestTemplate {
        RequestTemplate::get_from_parameter(ParameterKind::CustomUrl)
    }

    fn validators() -> Vec<(ParameterKind, ParameterValidator)> {
        vec![(ParameterKind::CustomUrl, validation::url())]
    }

    fn required_parameters() -> &'static [ParameterKind] {
        &[ParameterKind::CustomUrl]
    }

    /// Accepts the default XML transcript and the `json3` format.
    fn decode_data(data: &[u8]) -> Result<Self, DecodeError> {
        let body = String::from_utf8_lossy(data);
        if body.trim_start().starts_with('{') {
            let value: serde_json::Value = serde_json::from_str(&body)
                .map_err(|e| DecodeError::new(format!("parsing json3 transcript: {}", e)))?;
            return Self::decode_json(JsonView::new(&value));
        }
        let captions = TRANSCRIPT_LINE
            .captures_iter(&body)
            .filter_map(|caps| {
                let start_time = caps.get(1)?.as_str().parse().ok()?;
                let duration = caps
                    .get(2)
                    .and_then(|d| d.as_str().parse().ok())
                    .unwrap_or_default();
                Some(Caption {
                    text: unescape_html(caps.get(3)?.as_str()),
                    start_time,
                    duration,
                })
            })
            .collect();
        Ok(VideoCaptionsResponse { captions })
    }

    fn decode_json(json: JsonView<'_>) -> Result<Self, DecodeError> {
        let captions = json
            .get("events")
            .iter()
            .filter_map(|event| {
                let segments = event.get("segs").as_array()?;
                let text: String = segments
                    .iter()
                    .filter_map(|s| s.get("utf8").as_str())
                    .collect();
                Some(Caption {
                    text,
                    start_time: event.get("tStartMs").f64_or_default() / 1000.0,
                    duration: event.get("dDurationMs").f64_or_default() / 1000.0,
                })
            })
            .collect();
        Ok(VideoCaptionsResponse { captions })
    }
}

/// Transcript text is escaped twice: once as XML, once as HTML.
fn unescape_html(text: &str) -> String {
    let once = html_escape::decode_html_entities(text);
    html_escape::decode_html_entities(&once).into_owned()
}
