//! Side-effecting requests made on behalf of the signed-in account.
//!
//! Every type here requires cookies. `success` only turns true on an explicit
//! positive tag in the payload; a 200 status alone proves nothing.

pub mod comment;
pub mod playlist_edit;
pub mod subscription;

use crate::json::JsonView;
use crate::response::YouTubeResponse;

pub const STATUS_SUCCEEDED: &str = "STATUS_SUCCEEDED";

pub trait ActionResponse: YouTubeResponse {
    fn success(&self) -> bool;

    /// True when the upstream answered as if no session was attached.
    fn is_disconnected(&self) -> bool;
}

/// `actionResults` entries, plus the single `actionResult` some endpoints use.
fn action_results<'a>(json: JsonView<'a>) -> Vec<JsonView<'a>> {
    let mut results = json.get("actionResults").array_or_default();
    let single = json.get("actionResult");
    if single.exists() {
        results.push(single);
    }
    results
}

/// Whether an action result reports `STATUS_SUCCEEDED`, paired with
/// `feedback` when one is expected.
pub(crate) fn action_succeeded(json: JsonView<'_>, feedback: Option<&str>) -> bool {
    action_results(json).iter().any(|result| {
        result.get("status").as_str() == Some(STATUS_SUCCEEDED)
            && feedback.map_or(true, |tag| result.get("feedback").as_str() == Some(tag))
    })
}

/// Entries of the `actions` list carrying `name`.
pub(crate) fn actions_named<'a>(json: JsonView<'a>, name: &'a str) -> impl Iterator<Item = JsonView<'a>> {
    json.get("actions")
        .iter()
        .map(move |action| action.get(name))
        .filter(|action| action.exists())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_with_feedback() {
        let value = json!({"actionResults": [
            {"status": "STATUS_SUCCEEDED", "feedback": "FEEDBACK_LIKE"}
        ]});
        let view = JsonView::new(&value);
        assert!(action_succeeded(view, None));
        assert!(action_succeeded(view, Some("FEEDBACK_LIKE")));
        assert!(!action_succeeded(view, Some("FEEDBACK_DISLIKE")));
    }

    #[test]
    fn test_single_action_result() {
        let value = json!({"actionResult": {"status": "STATUS_SUCCEEDED"}});
        assert!(action_succeeded(JsonView::new(&value), None));
    }

    #[test]
    fn test_failure_and_absence() {
        let failed = json!({"actionResults": [{"status": "STATUS_FAILED"}]});
        assert!(!action_succeeded(JsonView::new(&failed), None));
        assert!(!action_succeeded(JsonView::new(&json!({})), None));
    }
}
