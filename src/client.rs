//! The dispatcher: validates, builds, sends, decodes and logs one request.

use chrono::Utc;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::config::ClientConfig;
use crate::errors::YouTubeError;
use crate::logger::{LogResult, RequestLog, RequestsLogger};
use crate::request::RequestDescriptor;
use crate::response::{ContinuableResponse, YouTubeResponse};
use crate::transport::{ReqwestTransport, Transport};
use crate::validation::{validate_parameters, ParameterKind, ParameterMap};
use crate::youtubei::actions::ActionResponse;

struct ClientInner {
    config: RwLock<Arc<ClientConfig>>,
    transport: Arc<dyn Transport>,
    logger: Option<Arc<RequestsLogger>>,
}

/// Cheap to clone; clones share configuration, transport and logger.
#[derive(Clone)]
pub struct YouTubeClient {
    inner: Arc<ClientInner>,
}

/// What a call produced before it succeeded or failed, kept for the log.
#[derive(Default)]
struct Attempt {
    request: Option<RequestDescriptor>,
    body: Option<Vec<u8>>,
}

impl YouTubeClient {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, Arc::new(ReqwestTransport::default()))
    }

    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        YouTubeClient {
            inner: Arc::new(ClientInner {
                config: RwLock::new(Arc::new(config)),
                transport,
                logger: None,
            }),
        }
    }

    pub fn with_logger(self, logger: Arc<RequestsLogger>) -> Self {
        YouTubeClient {
            inner: Arc::new(ClientInner {
                config: RwLock::new(self.config()),
                transport: self.inner.transport.clone(),
                logger: Some(logger),
            }),
        }
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> Arc<ClientConfig> {
        self.inner.config.read().clone()
    }

    /// Replaces the configuration. Calls already in flight keep their snapshot.
    pub fn set_config(&self, config: ClientConfig) {
        *self.inner.config.write() = Arc::new(config);
    }

    pub fn update_config(&self, update: impl FnOnce(&mut ClientConfig)) {
        let mut guard = self.inner.config.write();
        let mut config = ClientConfig::clone(&guard);
        update(&mut config);
        *guard = Arc::new(config);
    }

    pub fn logger(&self) -> Option<&Arc<RequestsLogger>> {
        self.inner.logger.as_ref()
    }

    /// Sends a request of type `T`.
    ///
    /// `use_cookies` overrides the session default; authenticated types
    /// always send cookies. The call runs on its own task, so dropping the
    /// returned future does not cancel it.
    pub async fn send<T: YouTubeResponse>(
        &self,
        parameters: ParameterMap,
        use_cookies: Option<bool>,
    ) -> Result<T, YouTubeError> {
        let client = self.clone();
        let handle = tokio::spawn(async move { client.dispatch::<T>(parameters, use_cookies).await });
        handle.await.map_err(|e| YouTubeError::Other(Box::new(e)))?
    }

    /// Spawns the call and hands its outcome to `callback` exactly once.
    pub fn send_with_callback<T, F>(
        &self,
        parameters: ParameterMap,
        use_cookies: Option<bool>,
        callback: F,
    ) -> JoinHandle<()>
    where
        T: YouTubeResponse,
        F: FnOnce(Result<T, YouTubeError>) + Send + 'static,
    {
        let client = self.clone();
        tokio::spawn(async move {
            // A panicking decoder still reaches the callback as an error.
            let call = tokio::spawn(async move { client.dispatch::<T>(parameters, use_cookies).await });
            let result = call
                .await
                .map_err(|e| YouTubeError::Other(Box::new(e)))
                .and_then(|result| result);
            callback(result);
        })
    }

    /// Sends an authenticated action and reports its outcome.
    pub async fn perform_action<T: ActionResponse>(&self, parameters: ParameterMap) -> Result<T, YouTubeError> {
        let response = self.send::<T>(parameters, Some(true)).await?;
        if response.is_disconnected() {
            tracing::warn!(response_type = T::NAME, "action answered without a session, cookies may be expired");
        } else {
            tracing::info!(response_type = T::NAME, success = response.success(), "action completed");
        }
        Ok(response)
    }

    /// Fetches the page after `response`. The stored token is left untouched.
    pub async fn fetch_continuation<R: ContinuableResponse>(
        &self,
        response: &R,
        use_cookies: Option<bool>,
    ) -> Result<R::Continuation, YouTubeError> {
        let token = response
            .continuation_token()
            .ok_or(YouTubeError::ContinuationNotDefined)?;
        let mut parameters = ParameterMap::new().with(ParameterKind::Continuation, token);
        if let Some(visitor_data) = response.visitor_data() {
            parameters = parameters.with(ParameterKind::VisitorData, visitor_data);
        }
        self.send::<R::Continuation>(parameters, use_cookies).await
    }

    /// Fetches and merges the next page. Returns whether yet another page is
    /// available.
    pub async fn load_next_page<R: ContinuableResponse>(
        &self,
        response: &mut R,
        use_cookies: Option<bool>,
    ) -> Result<bool, YouTubeError> {
        let page = self.fetch_continuation(&*response, use_cookies).await?;
        response.merge_continuation(page);
        Ok(response.continuation_token().is_some())
    }

    async fn dispatch<T: YouTubeResponse>(
        &self,
        parameters: ParameterMap,
        use_cookies: Option<bool>,
    ) -> Result<T, YouTubeError> {
        let config = self.config();
        let use_cookies = T::REQUIRES_AUTHENTICATION || use_cookies.unwrap_or(config.always_use_cookies);

        let mut attempt = Attempt::default();
        let result = self
            .attempt::<T>(&config, &parameters, use_cookies, &mut attempt)
            .await;

        if let Some(logger) = &self.inner.logger {
            if logger.should_log(T::NAME) {
                let log_result = match &result {
                    Ok(response) => LogResult::Success(serde_json::to_value(response).unwrap_or_default()),
                    Err(e) => LogResult::Failure(e.to_string()),
                };
                logger.record(RequestLog::new(
                    T::NAME,
                    parameters,
                    attempt.request,
                    attempt.body.as_deref(),
                    log_result,
                ));
            }
        }

        result
    }

    async fn attempt<T: YouTubeResponse>(
        &self,
        config: &ClientConfig,
        parameters: &ParameterMap,
        use_cookies: bool,
        attempt: &mut Attempt,
    ) -> Result<T, YouTubeError> {
        if T::REQUIRES_AUTHENTICATION && !config.has_cookies() {
            return Err(YouTubeError::AccountConnection(format!(
                "{} needs account cookies but none are configured",
                T::NAME
            )));
        }

        let validated = validate_parameters(parameters, &T::validators(), T::required_parameters())
            .map_err(YouTubeError::BadRequestData)?;

        let request = T::template()
            .build(&validated, config, use_cookies, Utc::now())
            .map_err(|e| YouTubeError::Other(Box::new(e)))?;
        attempt.request = Some(request.clone());

        tracing::debug!(response_type = T::NAME, url = %request.url, use_cookies, "sending request");
        let response = self
            .inner
            .transport
            .perform(request)
            .await
            .map_err(|e| YouTubeError::Network {
                status_code: None,
                message: e.to_string(),
            })?;
        attempt.body = Some(response.body.clone());

        match response.status {
            _ if response.is_success() => (), // Continue processing
            429 => {
                tracing::warn!(response_type = T::NAME, "rate limited");
                return Err(YouTubeError::Network {
                    status_code: Some(429),
                    message: "Too many requests".to_string(),
                });
            }
            401 | 403 => {
                tracing::warn!(response_type = T::NAME, status = response.status, "request refused");
                return Err(YouTubeError::Network {
                    status_code: Some(response.status),
                    message: "Request refused, the session may be invalid".to_string(),
                });
            }
            status => {
                let body = String::from_utf8_lossy(&response.body);
                let message: String = body.chars().take(200).collect();
                tracing::warn!(response_type = T::NAME, status, "unexpected status");
                return Err(YouTubeError::Network {
                    status_code: Some(status),
                    message,
                });
            }
        }

        T::decode_data(&response.body).map_err(|e| {
            tracing::error!(response_type = T::NAME, error = %e, "failed to decode response");
            YouTubeError::ResponseExtraction {
                response_type: T::NAME,
                step: e.0,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TransportError;
    use crate::transport::TransportResponse;
    use crate::youtubei::actions::playlist_edit::AddVideoToPlaylistResponse;
    use crate::youtubei::actions::subscription::SubscribeChannelResponse;
    use crate::youtubei::autocomplete::AutocompletionResponse;
    use crate::youtubei::search::SearchResponse;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Replays queued responses, then answers `200 {}`.
    #[derive(Default)]
    struct MockTransport {
        responses: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
        requests: Mutex<Vec<RequestDescriptor>>,
        calls: AtomicUsize,
        delay: Option<Duration>,
    }

    impl MockTransport {
        fn replying(responses: Vec<Result<TransportResponse, TransportError>>) -> Arc<Self> {
            Arc::new(MockTransport {
                responses: Mutex::new(responses.into()),
                ..Default::default()
            })
        }

        fn slow(delay: Duration) -> Arc<Self> {
            Arc::new(MockTransport {
                delay: Some(delay),
                ..Default::default()
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn last_request(&self) -> Option<RequestDescriptor> {
            self.requests.lock().last().cloned()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn perform(&self, request: RequestDescriptor) -> Result<TransportResponse, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().push(request);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.responses
                .lock()
                .pop_front()
                .unwrap_or_else(|| Ok(ok(json!({}))))
        }
    }

    fn ok(body: serde_json::Value) -> TransportResponse {
        TransportResponse {
            status: 200,
            headers: Vec::new(),
            body: body.to_string().into_bytes(),
        }
    }

    fn status(code: u16, body: &str) -> TransportResponse {
        TransportResponse {
            status: code,
            headers: Vec::new(),
            body: body.as_bytes().to_vec(),
        }
    }

    fn signed_in() -> ClientConfig {
        ClientConfig {
            cookies: "SID=abc; SAPISID=xyz".to_string(),
            ..Default::default()
        }
    }

    fn search_page(video_ids: &[&str], token: Option<&str>) -> serde_json::Value {
        let mut items: Vec<serde_json::Value> = video_ids
            .iter()
            .map(|id| json!({"videoRenderer": {"videoId": id}}))
            .collect();
        if let Some(token) = token {
            items.push(json!({"continuationItemRenderer": {"continuationEndpoint": {"continuationCommand": {"token": token}}}}));
        }
        json!({
            "responseContext": {"visitorData": "CgtWaXNpdG9y"},
            "contents": {"twoColumnSearchResultsRenderer": {"primaryContents": {"sectionListRenderer": {"contents": [
                {"itemSectionRenderer": {"contents": items}}
            ]}}}}
        })
    }

    #[tokio::test]
    async fn test_authentication_checked_before_validation() {
        let transport = MockTransport::replying(vec![]);
        let client = YouTubeClient::with_transport(ClientConfig::default(), transport.clone());

        // Invalid parameters too, but the missing session wins.
        let result = client
            .send::<SubscribeChannelResponse>(ParameterMap::new(), None)
            .await;

        match result {
            Err(YouTubeError::AccountConnection(message)) => {
                assert!(message.contains("SubscribeChannelResponse"));
            }
            other => panic!("Expected AccountConnection error, got {:?}", other.map(|_| ())),
        }
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_every_validation_failure_is_reported() {
        let transport = MockTransport::replying(vec![]);
        let client = YouTubeClient::with_transport(signed_in(), transport.clone());

        let parameters = ParameterMap::new().with(ParameterKind::MovingVideoId, "too-short");
        let result = client
            .send::<AddVideoToPlaylistResponse>(parameters, None)
            .await;

        match result {
            Err(YouTubeError::BadRequestData(errors)) => {
                let kinds: Vec<ParameterKind> = errors.iter().map(|e| e.parameter).collect();
                assert_eq!(kinds.len(), 2);
                assert!(kinds.contains(&ParameterKind::BrowseId));
                assert!(kinds.contains(&ParameterKind::MovingVideoId));
            }
            other => panic!("Expected BadRequestData error, got {:?}", other.map(|_| ())),
        }
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_search_decodes_and_logs() {
        let transport = MockTransport::replying(vec![Ok(ok(search_page(&["gfKpRpwHckY"], Some("NEXT"))))]);
        let logger = Arc::new(RequestsLogger::new(Some(10)));
        let client = YouTubeClient::with_transport(ClientConfig::default(), transport.clone())
            .with_logger(logger.clone());

        let response = client
            .send::<SearchResponse>(ParameterMap::new().with(ParameterKind::Query, "rust"), None)
            .await
            .unwrap();

        assert_eq!(response.results.len(), 1);
        assert_eq!(response.continuation_token.as_deref(), Some("NEXT"));

        let logs = logger.logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].response_type, "SearchResponse");
        assert!(logs[0].request.is_some());
        assert!(logs[0].raw_body.is_some());
        assert!(matches!(logs[0].result, LogResult::Success(_)));
    }

    #[tokio::test]
    async fn test_cookies_only_when_asked() {
        let transport = MockTransport::replying(vec![]);
        let client = YouTubeClient::with_transport(signed_in(), transport.clone());
        let parameters = ParameterMap::new().with(ParameterKind::Query, "rust");

        client.send::<SearchResponse>(parameters.clone(), None).await.unwrap();
        assert_eq!(transport.last_request().unwrap().header("Cookie"), None);

        client.send::<SearchResponse>(parameters, Some(true)).await.unwrap();
        let request = transport.last_request().unwrap();
        assert_eq!(request.header("Cookie"), Some("SID=abc; SAPISID=xyz"));
        assert!(request.header("Authorization").unwrap().starts_with("SAPISIDHASH "));
    }

    #[tokio::test]
    async fn test_status_failure_is_logged_with_partial_artifacts() {
        let transport = MockTransport::replying(vec![Ok(status(500, "upstream exploded"))]);
        let logger = Arc::new(RequestsLogger::default());
        let client = YouTubeClient::with_transport(ClientConfig::default(), transport)
            .with_logger(logger.clone());

        let result = client
            .send::<SearchResponse>(ParameterMap::new().with(ParameterKind::Query, "rust"), None)
            .await;

        match result {
            Err(YouTubeError::Network { status_code, message }) => {
                assert_eq!(status_code, Some(500));
                assert_eq!(message, "upstream exploded");
            }
            other => panic!("Expected Network error, got {:?}", other.map(|_| ())),
        }
        let logs = logger.logs();
        assert_eq!(logs[0].raw_body.as_deref(), Some("upstream exploded"));
        assert!(matches!(logs[0].result, LogResult::Failure(_)));
    }

    #[tokio::test]
    async fn test_transport_failure_has_no_status() {
        let transport = MockTransport::replying(vec![Err(TransportError::InvalidRequest("connection reset".to_string()))]);
        let client = YouTubeClient::with_transport(ClientConfig::default(), transport);

        let error = client
            .send::<SearchResponse>(ParameterMap::new().with(ParameterKind::Query, "rust"), None)
            .await
            .unwrap_err();
        assert_eq!(error.status_code(), None);
        assert!(matches!(error, YouTubeError::Network { .. }));
    }

    #[tokio::test]
    async fn test_decode_failure_names_the_type() {
        let transport = MockTransport::replying(vec![Ok(status(200, "<html>"))]);
        let client = YouTubeClient::with_transport(ClientConfig::default(), transport);

        let result = client
            .send::<AutocompletionResponse>(ParameterMap::new().with(ParameterKind::Query, "ru"), None)
            .await;
        match result {
            Err(YouTubeError::ResponseExtraction { response_type, .. }) => {
                assert_eq!(response_type, "AutocompletionResponse");
            }
            other => panic!("Expected ResponseExtraction error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_logger_allowlist_and_disabled_logger() {
        let transport = MockTransport::replying(vec![]);
        let logger = Arc::new(RequestsLogger::default());
        logger.set_logged_types(Some(["AutocompletionResponse"].into_iter().collect()));
        let client = YouTubeClient::with_transport(ClientConfig::default(), transport)
            .with_logger(logger.clone());
        let parameters = ParameterMap::new().with(ParameterKind::Query, "rust");

        client.send::<SearchResponse>(parameters.clone(), None).await.unwrap();
        assert!(logger.is_empty());

        logger.set_logged_types(None);
        logger.set_enabled(false);
        client.send::<SearchResponse>(parameters, None).await.unwrap();
        assert!(logger.is_empty());
    }

    #[tokio::test]
    async fn test_load_next_page_merges_and_forwards_visitor_data() {
        let transport = MockTransport::replying(vec![
            Ok(ok(search_page(&["gfKpRpwHckY"], Some("NEXT")))),
            Ok(ok(json!({"onResponseReceivedCommands": [{"appendContinuationItemsAction": {"continuationItems": [
                {"videoRenderer": {"videoId": "dQw4w9WgXcQ"}}
            ]}}]}))),
        ]);
        let client = YouTubeClient::with_transport(ClientConfig::default(), transport.clone());

        let mut response = client
            .send::<SearchResponse>(ParameterMap::new().with(ParameterKind::Query, "rust"), None)
            .await
            .unwrap();
        let more = client.load_next_page(&mut response, None).await.unwrap();

        assert!(!more);
        assert_eq!(response.results.len(), 2);
        assert_eq!(response.continuation_token, None);
        let body = transport.last_request().unwrap().body.unwrap();
        let body: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["continuation"], json!("NEXT"));
        assert_eq!(body["context"]["client"]["visitorData"], json!("CgtWaXNpdG9y"));

        match client.load_next_page(&mut response, None).await {
            Err(YouTubeError::ContinuationNotDefined) => {}
            other => panic!("Expected ContinuationNotDefined error, got {:?}", other),
        }
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_config_is_snapshotted_per_call() {
        let transport = MockTransport::replying(vec![]);
        let client = YouTubeClient::with_transport(ClientConfig::default(), transport.clone());
        let parameters = ParameterMap::new().with(ParameterKind::Query, "rust");

        client.send::<SearchResponse>(parameters.clone(), None).await.unwrap();
        assert!(transport.last_request().unwrap().url.contains("gl=US"));

        client.update_config(|config| config.region = "FR".to_string());
        client.send::<SearchResponse>(parameters, None).await.unwrap();
        assert!(transport.last_request().unwrap().url.contains("gl=FR"));
    }

    #[tokio::test]
    async fn test_concurrent_sends() {
        let transport = MockTransport::replying(vec![]);
        let client = YouTubeClient::with_transport(ClientConfig::default(), transport.clone());

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let client = client.clone();
                tokio::spawn(async move {
                    client
                        .send::<SearchResponse>(ParameterMap::new().with(ParameterKind::Query, format!("q{}", i)), None)
                        .await
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }
        assert_eq!(transport.calls(), 16);
    }

    #[tokio::test]
    async fn test_callback_called_once() {
        let transport = MockTransport::replying(vec![]);
        let client = YouTubeClient::with_transport(ClientConfig::default(), transport);
        let (tx, rx) = tokio::sync::oneshot::channel();

        client
            .send_with_callback::<SearchResponse, _>(
                ParameterMap::new().with(ParameterKind::Query, "rust"),
                None,
                move |result| {
                    let _ = tx.send(result.is_ok());
                },
            )
            .await
            .unwrap();

        assert!(rx.await.unwrap());
    }

    #[tokio::test]
    async fn test_callback_receives_failure() {
        let transport = MockTransport::replying(vec![Ok(status(500, "upstream exploded"))]);
        let client = YouTubeClient::with_transport(ClientConfig::default(), transport);
        let (tx, rx) = tokio::sync::oneshot::channel();

        client
            .send_with_callback::<SearchResponse, _>(
                ParameterMap::new().with(ParameterKind::Query, "rust"),
                None,
                move |result| {
                    let _ = tx.send(result.map(|_| ()));
                },
            )
            .await
            .unwrap();

        match rx.await.unwrap() {
            Err(YouTubeError::Network { status_code, .. }) => assert_eq!(status_code, Some(500)),
            other => panic!("Expected Network error, got {:?}", other),
        }
    }

    /// Decoder that always panics.
    #[derive(Debug, serde::Serialize)]
    struct PanickingResponse;

    impl YouTubeResponse for PanickingResponse {
        const NAME: &'static str = "PanickingResponse";

        fn template() -> crate::request::RequestTemplate {
            SearchResponse::template()
        }

        fn decode_data(_data: &[u8]) -> Result<Self, crate::errors::DecodeError> {
            panic!("decoder bug");
        }

        fn decode_json(_json: crate::json::JsonView<'_>) -> Result<Self, crate::errors::DecodeError> {
            panic!("decoder bug");
        }
    }

    #[tokio::test]
    async fn test_callback_called_when_decoder_panics() {
        let transport = MockTransport::replying(vec![]);
        let client = YouTubeClient::with_transport(ClientConfig::default(), transport);
        let calls = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = tokio::sync::oneshot::channel();

        let counter = calls.clone();
        client
            .send_with_callback::<PanickingResponse, _>(ParameterMap::new(), None, move |result| {
                counter.fetch_add(1, Ordering::SeqCst);
                let _ = tx.send(matches!(result, Err(YouTubeError::Other(_))));
            })
            .await
            .unwrap();

        assert!(rx.await.unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dropped_waiter_does_not_cancel_the_call() {
        let transport = MockTransport::slow(Duration::from_millis(100));
        let logger = Arc::new(RequestsLogger::default());
        let client = YouTubeClient::with_transport(ClientConfig::default(), transport.clone())
            .with_logger(logger.clone());

        let waited = tokio::time::timeout(
            Duration::from_millis(10),
            client.send::<SearchResponse>(ParameterMap::new().with(ParameterKind::Query, "rust"), None),
        )
        .await;
        assert!(waited.is_err());
        assert!(logger.is_empty());

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(transport.calls(), 1);
        let logs = logger.logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].response_type, "SearchResponse");
        assert!(matches!(logs[0].result, LogResult::Success(_)));
    }

    #[tokio::test]
    async fn test_perform_action_forces_cookies() {
        let transport = MockTransport::replying(vec![Ok(ok(json!({
            "actions": [{"updateSubscribeButtonAction": {"subscribed": true}}]
        })))]);
        let client = YouTubeClient::with_transport(signed_in(), transport.clone());

        let response = client
            .perform_action::<SubscribeChannelResponse>(
                ParameterMap::new().with(ParameterKind::BrowseId, "UCewMTclBJZPaNEfbf-qYMGA"),
            )
            .await
            .unwrap();

        assert!(response.success);
        let request = transport.last_request().unwrap();
        assert!(request.header("Cookie").is_some());
        assert!(request.url.ends_with("subscription/subscribe?prettyPrint=false"));
    }
}
