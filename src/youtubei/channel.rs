use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::HashSet;

use super::search::continuation_body;
use super::{continuation_items, selected_tab_content, tab_items};
use crate::errors::DecodeError;
use crate::json::JsonView;
use crate::models::{ResultsCollector, SearchResult, Thumbnail, VerificationStatus};
use crate::request::RequestTemplate;
use crate::response::{ContinuableResponse, ContinuationResponse, YouTubeResponse};
use crate::validation::{self, ParameterKind, ParameterValidator, ValidatedParameters};

const ALL_COUNTRIES: &[&str] = &[
    "AD", "AE", "AF", "AG", "AI", "AL", "AM", "AO", "AQ", "AR", "AS", "AT", "AU", "AW", "AX", "AZ",
    "BA", "BB", "BD", "BE", "BF", "BG", "BH", "BI", "BJ", "BL", "BM", "BN", "BO", "BQ", "BR", "BS",
    "BT", "BV", "BW", "BY", "BZ", "CA", "CC", "CD", "CF", "CG", "CH", "CI", "CK", "CL", "CM", "CN",
    "CO", "CR", "CU", "CV", "CW", "CX", "CY", "CZ", "DE", "DJ", "DK", "DM", "DO", "DZ", "EC", "EE",
    "EG", "EH", "ER", "ES", "ET", "FI", "FJ", "FK", "FM", "FO", "FR", "GA", "GB", "GD", "GE", "GF",
    "GG", "GH", "GI", "GL", "GM", "GN", "GP", "GQ", "GR", "GS", "GT", "GU", "GW", "GY", "HK", "HM",
    "HN", "HR", "HT", "HU", "ID", "IE", "IL", "IM", "IN", "IO", "IQ", "IR", "IS", "IT", "JE", "JM",
    "JO", "JP", "KE", "KG", "KH", "KI", "KM", "KN", "KP", "KR", "KW", "KY", "KZ", "LA", "LB", "LC",
    "LI", "LK", "LR", "LS", "LT", "LU", "LV", "LY", "MA", "MC", "MD", "ME", "MF", "MG", "MH", "MK",
    "ML", "MM", "MN", "MO", "MP", "MQ", "MR", "MS", "MT", "MU", "MV", "MW", "MX", "MY", "MZ", "NA",
    "NC", "NE", "NF", "NG", "NI", "NL", "NO", "NP", "NR", "NU", "NZ", "OM", "PA", "PE", "PF", "PG",
    "PH", "PK", "PL", "PM", "PN", "PR", "PS", "PT", "PW", "PY", "QA", "RE", "RO", "RS", "RU", "RW",
    "SA", "SB", "SC", "SD", "SE", "SG", "SH", "SI", "SJ", "SK", "SL", "SM", "SN", "SO", "SR", "SS",
    "ST", "SV", "SX", "SY", "SZ", "TC", "TD", "TF", "TG", "TH", "TJ", "TK", "TL", "TM", "TN", "TO",
    "TR", "TT", "TV", "TW", "TZ", "UA", "UG", "UM", "US", "UY", "UZ", "VA", "VC", "VE", "VG", "VI",
    "VN", "VU", "WF", "WS", "YE", "YT", "ZA", "ZM", "ZW"
];

/// `params` tokens selecting a channel tab.
pub mod tabs {
    pub const VIDEOS: &str = "EgZ2aWRlb3PyBgQKAjoA";
    pub const SHORTS: &str = "EgZzaG9ydHPyBgUKA5oBAA%3D%3D";
    pub const LIVE: &str = "EgdzdHJlYW1z8gYECgJ6AA%3D%3D";
    pub const PLAYLISTS: &str = "EglwbGF5bGlzdHPyBgQKAkIA";
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelTab {
    pub title: String,
    pub params: Option<String>,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelInfosResponse {
    pub channel_id: Option<String>,
    pub name: Option<String>,
    pub handle: Option<String>,
    pub description: Option<String>,
    pub subscriber_count: Option<String>,
    pub video_count: Option<String>,
    pub avatar: Vec<Thumbnail>,
    pub banner: Vec<Thumbnail>,
    pub verification: VerificationStatus,
    pub no_index: Option<bool>,
    pub blocked_countries: Option<Vec<String>>,
    /// Set when the platform redirects this browse id to another channel.
    pub conditional_redirect: Option<String>,
    pub tabs: Vec<ChannelTab>,
    pub results: Vec<SearchResult>,
    pub continuation_token: Option<String>,
}

impl Default for ChannelInfosResponse {
    fn default() -> Self {
        ChannelInfosResponse {
            channel_id: None,
            name: None,
            handle: None,
            description: None,
            subscriber_count: None,
            video_count: None,
            avatar: Vec::new(),
            banner: Vec::new(),
            verification: VerificationStatus::None,
            no_index: None,
            blocked_countries: None,
            conditional_redirect: None,
            tabs: Vec::new(),
            results: Vec::new(),
            continuation_token: None,
        }
    }
}

fn channel_body(parameters: &ValidatedParameters) -> Map<String, Value> {
    let mut body = Map::new();
    if let Some(browse_id) = parameters.get(ParameterKind::BrowseId) {
        body.insert("browseId".to_string(), json!(browse_id));
    }
    if let Some(params) = parameters.get(ParameterKind::Params) {
        body.insert("params".to_string(), json!(params));
    }
    body
}

impl YouTubeResponse for ChannelInfosResponse {
    const NAME: &'static str = "ChannelInfosResponse";

    fn template() -> RequestTemplate {
        RequestTemplate::innertube("browse", channel_body)
    }

    fn validators() -> Vec<(ParameterKind, ParameterValidator)> {
        vec![(ParameterKind::BrowseId, validation::channel_id())]
    }

    fn required_parameters() -> &'static [ParameterKind] {
        &[ParameterKind::BrowseId]
    }

    fn decode_json(json: JsonView<'_>) -> Result<Self, DecodeError> {
        let mut channel = ChannelInfosResponse::default();

        let metadata = json.at(&["metadata", "channelMetadataRenderer"]);
        channel.channel_id = metadata.get("externalId").as_string();
        channel.name = metadata.get("title").as_string();
        channel.description = metadata.get("description").as_string().filter(|d| !d.is_empty());
        channel.avatar = Thumbnail::list_from(metadata.get("avatar"));

        // Handle conditional redirect
        if let Some(redirect_id) = json
            .at(&["onResponseReceivedActions", "0", "navigateAction", "endpoint", "browseEndpoint", "browseId"])
            .as_string()
        {
            if channel.channel_id.as_deref() != Some(redirect_id.as_str()) {
                channel.conditional_redirect = Some(redirect_id);
                return Ok(channel);
            }
        }

        channel.handle = metadata
            .get("ownerUrls")
            .iter()
            .filter_map(|url| url.as_str())
            .find_map(|url| {
                url.strip_prefix("http://www.youtube.com/@")
                    .or_else(|| url.strip_prefix("https://www.youtube.com/@"))
            })
            .map(|handle| format!("@{}", handle));

        let page_header = json.at(&["header", "pageHeaderRenderer", "content", "pageHeaderViewModel"]);
        let c4_header = json.at(&["header", "c4TabbedHeaderRenderer"]);
        if page_header.exists() {
            decode_page_header(page_header, &mut channel);
        } else if c4_header.exists() {
            channel.subscriber_count = c4_header.get("subscriberCountText").text();
            channel.video_count = c4_header.get("videosCountText").text();
            channel.banner = Thumbnail::list_from(c4_header.get("banner"));
            channel.verification = VerificationStatus::from_badges(c4_header.get("badges"));
        }

        // Parse microformat data
        let microformat = json.at(&["microformat", "microformatDataRenderer"]);
        channel.no_index = microformat.get("noindex").as_bool();
        if let Some(available) = microformat.get("availableCountries").as_array() {
            let available: HashSet<&str> = available.iter().filter_map(|c| c.as_str()).collect();
            // Countries that are not in the available list are blocked
            let blocked: Vec<String> = ALL_COUNTRIES
                .iter()
                .filter(|c| !available.contains(*c))
                .map(|c| c.to_string())
                .collect();
            channel.blocked_countries = if blocked.is_empty() { None } else { Some(blocked) };
        }

        channel.tabs = json
            .at(&["contents", "twoColumnBrowseResultsRenderer", "tabs"])
            .iter()
            .filter_map(|tab| {
                let renderer = tab.get("tabRenderer");
                Some(ChannelTab {
                    title: renderer.get("title").as_string()?,
                    params: renderer
                        .at(&["endpoint", "browseEndpoint", "params"])
                        .as_string(),
                    selected: renderer.get("selected").bool_or_default(),
                })
            })
            .collect();

        let collected = ResultsCollector::collect(tab_items(selected_tab_content(json)));
        channel.results = collected.results;
        channel.continuation_token = collected.continuation;

        Ok(channel)
    }
}

fn decode_page_header(header: JsonView<'_>, channel: &mut ChannelInfosResponse) {
    // Parse verification status from badge
    let badge = header
        .at(&["title", "dynamicTextViewModel", "text", "attachmentRuns", "0"])
        .at(&["element", "type", "imageType", "image", "sources", "0", "clientResource", "imageName"])
        .as_str();
    channel.verification = match badge {
        Some("AUDIO_BADGE") => VerificationStatus::Artist,
        Some("CHECK_CIRCLE_FILLED") => VerificationStatus::Verified,
        _ => VerificationStatus::None,
    };

    let rows = header.at(&["metadata", "contentMetadataViewModel", "metadataRows"]);
    for row in rows.iter() {
        for part in row.get("metadataParts").iter() {
            let Some(text) = part.at(&["text", "content"]).as_string() else {
                continue;
            };
            if text.starts_with('@') {
                channel.handle.get_or_insert(text);
            } else if channel.subscriber_count.is_none() {
                channel.subscriber_count = Some(text);
            } else if channel.video_count.is_none() {
                channel.video_count = Some(text);
            }
        }
    }

    channel.banner = Thumbnail::list_from_sources(header.at(&["banner", "imageBannerViewModel", "image"]));
    if channel.avatar.is_empty() {
        channel.avatar = Thumbnail::list_from_sources(header.at(&[
            "image",
            "decoratedAvatarViewModel",
            "avatar",
            "avatarViewModel",
            "image",
        ]));
    }
}

impl ContinuableResponse for ChannelInfosResponse {
    type Item = SearchResult;
    type Continuation = ChannelInfosContinuation;

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
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChannelInfosContinuation {
    pub results: Vec<SearchResult>,
    pub continuation_token: Option<String>,
}

impl YouTubeResponse for ChannelInfosContinuation {
    const NAME: &'static str = "ChannelInfosContinuation";

    fn template() -> RequestTemplate {
        RequestTemplate::innertube("browse", continuation_body)
    }

    fn required_parameters() -> &'static [ParameterKind] {
        &[ParameterKind::Continuation]
    }

    fn decode_json(json: JsonView<'_>) -> Result<Self, DecodeError> {
        let collected = ResultsCollector::collect(continuation_items(json));
        Ok(ChannelInfosContinuation {
            results: collected.results,
            continuation_token: collected.continuation,
        })
    }
}

impl ContinuationResponse for ChannelInfosContinuation {
    type Item = SearchResult;

    fn into_parts(self) -> (Vec<SearchResult>, Option<String>) {
        (self.results, self.continuation_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_header_channel() -> Value {
        let available: Vec<&str> = ALL_COUNTRIES.iter().copied().filter(|c| *c != "US").collect();
        json!({
            "metadata": {"channelMetadataRenderer": {
                "externalId": "UCewMTclBJZPaNEfbf-qYMGA",
                "title": "Example",
                "description": "",
                "ownerUrls": ["http://www.youtube.com/@example"],
                "avatar": {"thumbnails": [{"url": "https://yt3.ggpht.com/a", "width": 900, "height": 900}]}
            }},
            "header": {"pageHeaderRenderer": {"content": {"pageHeaderViewModel": {
                "title": {"dynamicTextViewModel": {"text": {"content": "Example", "attachmentRuns": [
                    {"element": {"type": {"imageType": {"image": {"sources": [{"clientResource": {"imageName": "CHECK_CIRCLE_FILLED"}}]}}}}}
                ]}}},
                "metadata": {"contentMetadataViewModel": {"metadataRows": [
                    {"metadataParts": [{"text": {"content": "@example"}}]},
                    {"metadataParts": [{"text": {"content": "1.2K subscribers"}}, {"text": {"content": "42 videos"}}]}
                ]}},
                "banner": {"imageBannerViewModel": {"image": {"sources": [{"url": "https://yt3.ggpht.com/b", "width": 1060, "height": 175}]}}}
            }}}},
            "microformat": {"microformatDataRenderer": {"noindex": false, "availableCountries": available}},
            "contents": {"twoColumnBrowseResultsRenderer": {"tabs": [
                {"tabRenderer": {"title": "Home", "endpoint": {"browseEndpoint": {"params": "EghmZWF0dXJlZA%3D%3D"}}}},
                {"tabRenderer": {"title": "Videos", "selected": true, "endpoint": {"browseEndpoint": {"params": tabs::VIDEOS}},
                    "content": {"richGridRenderer": {"contents": [
                        {"richItemRenderer": {"content": {"videoRenderer": {"videoId": "gfKpRpwHckY"}}}},
                        {"continuationItemRenderer": {"continuationEndpoint": {"continuationCommand": {"token": "MORE"}}}}
                    ]}}}},
                {"expandableTabRenderer": {}}
            ]}}
        })
    }

    #[test]
    fn test_verified_channel_with_blocked_us() {
        let value = page_header_channel();
        let channel = ChannelInfosResponse::decode_json(JsonView::new(&value)).unwrap();
        assert_eq!(channel.channel_id.as_deref(), Some("UCewMTclBJZPaNEfbf-qYMGA"));
        assert_eq!(channel.handle.as_deref(), Some("@example"));
        assert_eq!(channel.description, None);
        assert_eq!(channel.verification, VerificationStatus::Verified);
        assert_eq!(channel.subscriber_count.as_deref(), Some("1.2K subscribers"));
        assert_eq!(channel.video_count.as_deref(), Some("42 videos"));
        assert_eq!(channel.banner[0].width, Some(1060));
        assert_eq!(channel.no_index, Some(false));
        assert_eq!(channel.blocked_countries, Some(vec!["US".to_string()]));
        assert_eq!(channel.tabs.len(), 2);
        assert!(channel.tabs[1].selected);
        assert_eq!(channel.results.len(), 1);
        assert_eq!(channel.continuation_token.as_deref(), Some("MORE"));
    }

    #[test]
    fn test_channel_with_redirect() {
        let value = json!({
            "metadata": {"channelMetadataRenderer": {"externalId": "UC80zzW0g4xuUwW6IffjhcDQ"}},
            "onResponseReceivedActions": [{"navigateAction": {"endpoint": {"browseEndpoint": {"browseId": "UCBR8-60-B28hp2BmDPdntcQ"}}}}]
        });
        let channel = ChannelInfosResponse::decode_json(JsonView::new(&value)).unwrap();
        assert_eq!(channel.conditional_redirect.as_deref(), Some("UCBR8-60-B28hp2BmDPdntcQ"));
        assert!(channel.results.is_empty());
    }

    #[test]
    fn test_artist_channel_legacy_header() {
        let value = json!({"header": {"c4TabbedHeaderRenderer": {
            "subscriberCountText": {"simpleText": "3M subscribers"},
            "badges": [{"metadataBadgeRenderer": {"style": "BADGE_STYLE_TYPE_VERIFIED_ARTIST"}}]
        }}});
        let channel = ChannelInfosResponse::decode_json(JsonView::new(&value)).unwrap();
        assert_eq!(channel.verification, VerificationStatus::Artist);
        assert_eq!(channel.subscriber_count.as_deref(), Some("3M subscribers"));
        assert_eq!(channel.blocked_countries, None);
    }

    #[test]
    fn test_continuation_merge_keeps_earlier_results() {
        let value = page_header_channel();
        let mut channel = ChannelInfosResponse::decode_json(JsonView::new(&value)).unwrap();
        let page = json!({"onResponseReceivedActions": [{"appendContinuationItemsAction": {"continuationItems": [
            {"richItemRenderer": {"content": {"videoRenderer": {"videoId": "aaaaaaaaaaA"}}}}
        ]}}]});
        let page = ChannelInfosContinuation::decode_json(JsonView::new(&page)).unwrap();
        channel.merge_continuation(page);
        assert_eq!(channel.results.len(), 2);
        assert_eq!(channel.continuation_token, None);
    }
}
