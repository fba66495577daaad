//! Bounded in-memory record of completed exchanges, for diagnostics.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use std::collections::{HashSet, VecDeque};
use uuid::Uuid;

use crate::request::RequestDescriptor;
use crate::validation::ParameterMap;

#[derive(Debug, Clone, Serialize)]
pub struct RequestLog {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub response_type: &'static str,
    pub provided_parameters: ParameterMap,
    pub request: Option<RequestDescriptor>,
    /// Raw response body, lossily decoded as UTF-8.
    pub raw_body: Option<String>,
    pub result: LogResult,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "lowercase")]
pub enum LogResult {
    Success(Value),
    Failure(String),
}

impl RequestLog {
    pub fn new(
        response_type: &'static str,
        provided_parameters: ParameterMap,
        request: Option<RequestDescriptor>,
        raw_body: Option<&[u8]>,
        result: LogResult,
    ) -> Self {
        RequestLog {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            response_type,
            provided_parameters,
            request,
            raw_body: raw_body.map(|b| String::from_utf8_lossy(b).into_owned()),
            result,
        }
    }
}

#[derive(Debug)]
struct LoggerState {
    enabled: bool,
    capacity: Option<usize>,
    logged_types: Option<HashSet<&'static str>>,
    logs: VecDeque<RequestLog>,
}

/// Ring of recent request logs. When full, the oldest entries are dropped to
/// admit new ones. A capacity of zero keeps nothing; `None` keeps everything.
#[derive(Debug)]
pub struct RequestsLogger {
    state: Mutex<LoggerState>,
}

impl Default for RequestsLogger {
    fn default() -> Self {
        RequestsLogger::new(None)
    }
}

impl RequestsLogger {
    pub fn new(capacity: Option<usize>) -> Self {
        RequestsLogger {
            state: Mutex::new(LoggerState {
                enabled: true,
                capacity,
                logged_types: None,
                logs: VecDeque::new(),
            }),
        }
    }

    pub fn is_enabled(&self) -> bool {
        let state = self.state.lock();
        state.enabled && state.capacity != Some(0)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.state.lock().enabled = enabled;
    }

    pub fn set_capacity(&self, capacity: Option<usize>) {
        let mut state = self.state.lock();
        state.capacity = capacity;
        if let Some(capacity) = capacity {
            while state.logs.len() > capacity {
                state.logs.pop_front();
            }
        }
    }

    /// Restricts logging to the given response type names; `None` logs all.
    pub fn set_logged_types(&self, types: Option<HashSet<&'static str>>) {
        self.state.lock().logged_types = types;
    }

    pub fn should_log(&self, response_type: &str) -> bool {
        let state = self.state.lock();
        state.enabled
            && state.capacity != Some(0)
            && state
                .logged_types
                .as_ref()
                .map_or(true, |types| types.contains(response_type))
    }

    pub fn record(&self, log: RequestLog) {
        let mut state = self.state.lock();
        if !state.enabled {
            return;
        }
        if let Some(capacity) = state.capacity {
            if capacity == 0 {
                return;
            }
            while state.logs.len() >= capacity {
                state.logs.pop_front();
            }
        }
        state.logs.push_back(log);
    }

    pub fn logs(&self) -> Vec<RequestLog> {
        self.state.lock().logs.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.state.lock().logs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.state.lock().logs.clear();
    }

    pub fn clear_by_id(&self, id: Uuid) -> bool {
        let mut state = self.state.lock();
        let before = state.logs.len();
        state.logs.retain(|log| log.id != id);
        state.logs.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log(name: &'static str) -> RequestLog {
        RequestLog::new(name, ParameterMap::new(), None, None, LogResult::Failure(name.to_string()))
    }

    fn names(logger: &RequestsLogger) -> Vec<&'static str> {
        logger.logs().iter().map(|l| l.response_type).collect()
    }

    #[test]
    fn test_capacity_drops_oldest_first() {
        let logger = RequestsLogger::default();
        logger.set_capacity(Some(2));
        logger.record(log("A"));
        logger.record(log("B"));
        logger.record(log("C"));
        assert_eq!(names(&logger), vec!["B", "C"]);
    }

    #[test]
    fn test_shrinking_capacity_evicts() {
        let logger = RequestsLogger::new(None);
        for name in ["A", "B", "C", "D"] {
            logger.record(log(name));
        }
        logger.set_capacity(Some(1));
        assert_eq!(names(&logger), vec!["D"]);
    }

    #[test]
    fn test_zero_capacity_disables() {
        let logger = RequestsLogger::new(Some(0));
        logger.record(log("A"));
        assert!(logger.is_empty());
        assert!(!logger.is_enabled());
    }

    #[test]
    fn test_clear_by_id() {
        let logger = RequestsLogger::default();
        let a = log("A");
        let id = a.id;
        logger.record(a);
        logger.record(log("B"));
        assert!(logger.clear_by_id(id));
        assert!(!logger.clear_by_id(id));
        assert_eq!(names(&logger), vec!["B"]);
        logger.clear();
        assert!(logger.is_empty());
    }

    #[test]
    fn test_type_allowlist() {
        let logger = RequestsLogger::default();
        logger.set_logged_types(Some(HashSet::from(["SearchResponse"])));
        assert!(logger.should_log("SearchResponse"));
        assert!(!logger.should_log("TrendingVideosResponse"));
    }
}
