use serde::Serialize;
use serde_json::{json, Map, Value};

use super::{continuation_items, extract_initial_data};
use crate::errors::DecodeError;
use crate::json::JsonView;
use crate::models::{ResultsCollector, SearchResult};
use crate::request::{QueryValue, RequestTemplate};
use crate::response::{visitor_data, ContinuableResponse, ContinuationResponse, YouTubeResponse};
use crate::validation::{ParameterKind, ValidatedParameters};

const RESULTS_PATH: &[&str] = &[
    "contents",
    "twoColumnSearchResultsRenderer",
    "primaryContents",
    "sectionListRenderer",
    "contents",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    pub continuation_token: Option<String>,
    pub visitor_data: Option<String>,
    pub estimated_results: Option<i64>,
}

impl YouTubeResponse for SearchResponse {
    const NAME: &'static str = "SearchResponse";

    fn template() -> RequestTemplate {
        RequestTemplate::get("https://www.youtube.com/results")
            .query("search_query", QueryValue::Parameter(ParameterKind::Query))
            .query("sp", QueryValue::Parameter(ParameterKind::Params))
            .query("hl", QueryValue::Language)
            .query("gl", QueryValue::Region)
    }

    fn required_parameters() -> &'static [ParameterKind] {
        &[ParameterKind::Query]
    }

    /// The results page is HTML with the initial data embedded in a script.
    fn decode_data(data: &[u8]) -> Result<Self, DecodeError> {
        let body = String::from_utf8_lossy(data);
        let raw = match extract_initial_data(&body) {
            Some(raw) => raw,
            None if body.trim_start().starts_with('{') => body.trim(),
            None => return Err(DecodeError::new("locating ytInitialData in the results page")),
        };
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| DecodeError::new(format!("parsing ytInitialData: {}", e)))?;
        Self::decode_json(JsonView::new(&value))
    }

    fn decode_json(json: JsonView<'_>) -> Result<Self, DecodeError> {
        let collected = ResultsCollector::collect(json.at(RESULTS_PATH).iter());
        Ok(SearchResponse {
            results: collected.results,
            continuation_token: collected.continuation,
            visitor_data: visitor_data(json),
            estimated_results: json.get("estimatedResults").as_i64(),
        })
    }
}

impl ContinuableResponse for SearchResponse {
    type Item = SearchResult;
    type Continuation = SearchContinuation;

    fn results(&self) -> &[SearchResult] {
        &self.results
    }

    fn results_mut(&mut self) -> &mut Vec<SearchResult> {
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
pub struct SearchContinuation {
    pub results: Vec<SearchResult>,
    pub continuation_token: Option<String>,
}

pub(crate) fn continuation_body(parameters: &ValidatedParameters) -> Map<String, Value> {
    let mut body = Map::new();
    if let Some(token) = parameters.get(ParameterKind::Continuation) {
        body.insert("continuation".to_string(), json!(token));
    }
    body
}

impl YouTubeResponse for SearchContinuation {
    const NAME: &'static str = "SearchContinuation";

    fn template() -> RequestTemplate {
        RequestTemplate::innertube("search", continuation_body)
    }

    fn required_parameters() -> &'static [ParameterKind] {
        &[ParameterKind::Continuation]
    }

    fn decode_json(json: JsonView<'_>) -> Result<Self, DecodeError> {
        let collected = ResultsCollector::collect(continuation_items(json));
        Ok(SearchContinuation {
            results: collected.results,
            continuation_token: collected.continuation,
        })
    }
}

impl ContinuationResponse for SearchContinuation {
    type Item = SearchResult;

    fn into_parts(self) -> (Vec<SearchResult>, Option<String>) {
        (self.results, self.continuation_token)
    }
}
