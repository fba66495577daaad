use serde::Serialize;
use serde_json::Value;

use crate::errors::DecodeError;
use crate::json::JsonView;
use crate::request::{QueryValue, RequestTemplate};
use crate::response::YouTubeResponse;
use crate::validation::ParameterKind;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AutocompletionResponse {
    pub initial_query: String,
    pub suggestions: Vec<String>,
}

impl YouTubeResponse for AutocompletionResponse {
    const NAME: &'static str = "AutocompletionResponse";

    fn template() -> RequestTemplate {
        RequestTemplate::get("https://suggestqueries-clients6.youtube.com/complete/search")
            .query("client", QueryValue::Fixed("youtube"))
            .query("ds", QueryValue::Fixed("yt"))
            .query("q", QueryValue::Parameter(ParameterKind::Query))
            .query("hl", QueryValue::Language)
            .query("gl", QueryValue::Region)
    }

    fn required_parameters() -> &'static [ParameterKind] {
        &[ParameterKind::Query]
    }

    /// The payload is a JSON array wrapped in a JS callback:
    /// `window.google.ac.h([...])`.
    fn decode_data(data: &[u8]) -> Result<Self, DecodeError> {
        let body = String::from_utf8_lossy(data);
        let body = body.trim();
        let inner = match (body.find('('), body.rfind(')')) {
            (Some(start), Some(end)) if start < end => &body[start + 1..end],
            _ => body,
        };
        let value: Value = serde_json::from_str(inner)
            .map_err(|e| DecodeError::new(format!("parsing autocompletion payload: {}", e)))?;
        Self::decode_json(JsonView::new(&value))
    }

    fn decode_json(json: JsonView<'_>) -> Result<Self, DecodeError> {
        Ok(AutocompletionResponse {
            initial_query: json.index(0).string_or_default(),
            suggestions: json
                .index(1)
                .iter()
                .filter_map(|entry| entry.index(0).as_string())
                .collect(),
        })
    }
}
