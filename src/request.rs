//! Declarative request templates and their resolution into concrete requests.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Map, Value};
use sha1::{Digest, Sha1};
use url::Url;

use crate::config::ClientConfig;
use crate::validation::{ParameterKind, ValidatedParameters};

pub const YOUTUBE_ORIGIN: &str = "https://www.youtube.com";
pub const INNERTUBE_BASE: &str = "https://www.youtube.com/youtubei/v1/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
}

/// A fully resolved request, ready for the transport.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestDescriptor {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl RequestDescriptor {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryValue {
    Parameter(ParameterKind),
    Fixed(&'static str),
    Language,
    Region,
}

/// Builds the per-endpoint fields of an innertube body. The `context`
/// envelope is added by [`RequestTemplate::build`].
pub type BodyBuilder = fn(&ValidatedParameters) -> Map<String, Value>;

#[derive(Debug, Clone)]
pub struct RequestTemplate {
    pub method: HttpMethod,
    pub base_url: String,
    /// When set, the base URL is taken from this (validated) parameter.
    pub url_parameter: Option<ParameterKind>,
    pub query: Vec<(&'static str, QueryValue)>,
    pub headers: Vec<(&'static str, &'static str)>,
    pub body: Option<BodyBuilder>,
}

impl RequestTemplate {
    pub fn get(base_url: &str) -> Self {
        RequestTemplate {
            method: HttpMethod::Get,
            base_url: base_url.to_string(),
            url_parameter: None,
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get_from_parameter(kind: ParameterKind) -> Self {
        RequestTemplate {
            url_parameter: Some(kind),
            ..RequestTemplate::get("")
        }
    }

    /// POST to `youtubei/v1/{endpoint}` with a JSON body.
    pub fn innertube(endpoint: &str, body: BodyBuilder) -> Self {
        RequestTemplate {
            method: HttpMethod::Post,
            base_url: format!("{}{}", INNERTUBE_BASE, endpoint),
            url_parameter: None,
            query: vec![("prettyPrint", QueryValue::Fixed("false"))],
            headers: vec![("Content-Type", "application/json")],
            body: Some(body),
        }
    }

    pub fn query(mut self, name: &'static str, value: QueryValue) -> Self {
        self.query.push((name, value));
        self
    }

    pub fn header(mut self, name: &'static str, value: &'static str) -> Self {
        self.headers.push((name, value));
        self
    }

    pub fn is_innertube(&self) -> bool {
        self.body.is_some()
    }

    /// Resolves the template. Performs no I/O.
    pub fn build(
        &self,
        parameters: &ValidatedParameters,
        config: &ClientConfig,
        use_cookies: bool,
        now: DateTime<Utc>,
    ) -> Result<RequestDescriptor, url::ParseError> {
        let base = match self.url_parameter {
            Some(kind) => parameters.get(kind).unwrap_or_default(),
            None => self.base_url.as_str(),
        };
        let mut url = Url::parse(base)?;
        {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in &self.query {
                let value = match value {
                    QueryValue::Parameter(kind) => match parameters.get(*kind) {
                        Some(v) => v,
                        None => continue,
                    },
                    QueryValue::Fixed(v) => *v,
                    QueryValue::Language => config.language.as_str(),
                    QueryValue::Region => config.region.as_str(),
                };
                pairs.append_pair(name, value);
            }
        }
        // Drop the dangling `?` left by an empty query serializer.
        if url.query() == Some("") {
            url.set_query(None);
        }

        let mut headers: Vec<(String, String)> = vec![
            ("User-Agent".to_string(), config.user_agent.clone()),
            ("Accept-Language".to_string(), format!("{}-{},{};q=0.9", config.language, config.region, config.language)),
        ];
        headers.extend(
            self.headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        );

        let body = match self.body {
            Some(builder) => {
                headers.push(("Origin".to_string(), YOUTUBE_ORIGIN.to_string()));
                headers.push(("X-Youtube-Client-Name".to_string(), "1".to_string()));
                headers.push(("X-Youtube-Client-Version".to_string(), config.client_version.clone()));
                let mut body = builder(parameters);
                body.insert("context".to_string(), innertube_context(parameters, config));
                Some(Value::Object(body).to_string())
            }
            None => None,
        };

        if use_cookies && config.has_cookies() {
            headers.push(("Cookie".to_string(), config.cookies.clone()));
            if let Some(sapisid) = config.sapisid() {
                headers.push(("Authorization".to_string(), sapisid_hash(sapisid, now)));
                headers.push(("X-Origin".to_string(), YOUTUBE_ORIGIN.to_string()));
                headers.push(("X-Goog-AuthUser".to_string(), "0".to_string()));
            }
        }

        Ok(RequestDescriptor {
            method: self.method,
            url: url.to_string(),
            headers,
            body,
        })
    }
}

fn innertube_context(parameters: &ValidatedParameters, config: &ClientConfig) -> Value {
    let mut client = json!({
        "hl": config.language,
        "gl": config.region,
        "clientName": config.client_name,
        "clientVersion": config.client_version,
        "userAgent": config.user_agent,
        "originalUrl": YOUTUBE_ORIGIN,
    });
    let visitor_data = parameters
        .get(ParameterKind::VisitorData)
        .or(config.visitor_data.as_deref());
    if let Some(visitor_data) = visitor_data {
        client["visitorData"] = json!(visitor_data);
    }
    json!({
        "client": client,
        "user": { "lockedSafetyMode": false },
        "request": { "useSsl": true },
    })
}

/// `SAPISIDHASH <ts>_<sha1("<ts> <sapisid> <origin>")>`.
pub fn sapisid_hash(sapisid: &str, now: DateTime<Utc>) -> String {
    let timestamp = now.timestamp();
    let digest = Sha1::digest(format!("{} {} {}", timestamp, sapisid, YOUTUBE_ORIGIN).as_bytes());
    format!("SAPISIDHASH {}_{:x}", timestamp, digest)
}
