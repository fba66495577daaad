//! Response types for the innertube and web endpoints.

pub mod actions;
pub mod autocomplete;
pub mod captions;
pub mod channel;
pub mod home;
pub mod playlist;
pub mod resolve_url;
pub mod search;
pub mod trending;

use crate::json::JsonView;

const INITIAL_DATA_MARKERS: &[&str] = &["var ytInitialData = ", "window[\"ytInitialData\"] = "];

/// Pulls the `ytInitialData` object out of a watch/results HTML page.
pub fn extract_initial_data(html: &str) -> Option<&str> {
    INITIAL_DATA_MARKERS.iter().find_map(|marker| {
        let start = html.find(marker)? + marker.len();
        let rest = &html[start..];
        let end = rest.find(";</script>")?;
        Some(&rest[..end])
    })
}

/// Content of the selected tab of a two-column browse page, falling back to
/// the first tab with content.
pub fn selected_tab_content<'a>(json: JsonView<'a>) -> JsonView<'a> {
    let tabs = json.at(&["contents", "twoColumnBrowseResultsRenderer", "tabs"]);
    let tab = tabs
        .iter()
        .find(|t| t.at(&["tabRenderer", "selected"]).bool_or_default())
        .or_else(|| tabs.iter().find(|t| t.at(&["tabRenderer", "content"]).exists()));
    match tab {
        Some(tab) => tab.at(&["tabRenderer", "content"]),
        None => JsonView::missing(),
    }
}

/// Items of a browse page's main list, whatever container it uses.
pub fn tab_items<'a>(content: JsonView<'a>) -> Vec<JsonView<'a>> {
    const CONTAINERS: &[&[&str]] = &[
        &["richGridRenderer", "contents"],
        &["sectionListRenderer", "contents"],
    ];
    CONTAINERS
        .iter()
        .map(|path| content.at(path))
        .find(|view| view.exists())
        .map(|view| view.array_or_default())
        .unwrap_or_default()
}

/// Items appended or reloaded by a continuation response.
pub fn continuation_items<'a>(json: JsonView<'a>) -> Vec<JsonView<'a>> {
    const ACTION_LISTS: &[&str] = &[
        "onResponseReceivedActions",
        "onResponseReceivedCommands",
        "onResponseReceivedEndpoints",
    ];
    const ACTIONS: &[&str] = &["appendContinuationItemsAction", "reloadContinuationItemsCommand"];

    let mut items = Vec::new();
    for list in ACTION_LISTS {
        for action in json.get(list).iter() {
            for name in ACTIONS {
                items.extend(action.at(&[*name, "continuationItems"]).iter());
            }
        }
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_initial_data() {
        let html = r#"<html><script>var ytInitialData = {"a":1};</script><script>var x = 1;</script>"#;
        assert_eq!(extract_initial_data(html), Some(r#"{"a":1}"#));
        let html = r#"<script>window["ytInitialData"] = {"b":2};</script>"#;
        assert_eq!(extract_initial_data(html), Some(r#"{"b":2}"#));
        assert_eq!(extract_initial_data("<html></html>"), None);
    }

    #[test]
    fn test_selected_tab_content() {
        let value = json!({"contents": {"twoColumnBrowseResultsRenderer": {"tabs": [
            {"tabRenderer": {"title": "Home", "content": {"first": true}}},
            {"tabRenderer": {"title": "Videos", "selected": true, "content": {"second": true}}}
        ]}}});
        let content = selected_tab_content(JsonView::new(&value));
        assert!(content.get("second").bool_or_default());
    }

    #[test]
    fn test_continuation_items_from_every_action_list() {
        let value = json!({
            "onResponseReceivedActions": [{"appendContinuationItemsAction": {"continuationItems": [1, 2]}}],
            "onResponseReceivedCommands": [{"reloadContinuationItemsCommand": {"continuationItems": [3]}}]
        });
        let items: Vec<_> = continuation_items(JsonView::new(&value))
            .iter()
            .filter_map(JsonView::as_i64)
            .collect();
        assert_eq!(items, vec![1, 2, 3]);
    }
}
