use serde::Serialize;

use crate::json::JsonView;
use crate::response::{continuation_token, Positioned};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Thumbnail {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl Thumbnail {
    /// Reads a `{"thumbnails": [...]}` node; malformed entries are skipped.
    pub fn list_from(json: JsonView<'_>) -> Vec<Thumbnail> {
        Self::parse_list(json.get("thumbnails"))
    }

    /// Reads the `{"sources": [...]}` node used by view-model images.
    pub fn list_from_sources(json: JsonView<'_>) -> Vec<Thumbnail> {
        Self::parse_list(json.get("sources"))
    }

    fn parse_list(items: JsonView<'_>) -> Vec<Thumbnail> {
        items
            .iter()
            .filter_map(|t| {
                let url = t.get("url").as_str()?;
                let url = match url.strip_prefix("//") {
                    Some(rest) => format!("https://{}", rest),
                    None => url.to_string(),
                };
                Some(Thumbnail {
                    url,
                    width: t.get("width").as_i64().and_then(|w| u32::try_from(w).ok()),
                    height: t.get("height").as_i64().and_then(|h| u32::try_from(h).ok()),
                })
            })
            .collect()
    }
}

#[derive(PartialEq, Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    None,
    Verified,
    Artist,
}

impl VerificationStatus {
    pub fn from_badges(badges: JsonView<'_>) -> Self {
        let mut status = VerificationStatus::None;
        for badge in badges.iter() {
            match badge.at(&["metadataBadgeRenderer", "style"]).as_str() {
                Some("BADGE_STYLE_TYPE_VERIFIED_ARTIST") => return VerificationStatus::Artist,
                Some("BADGE_STYLE_TYPE_VERIFIED") => status = VerificationStatus::Verified,
                _ => {}
            }
        }
        status
    }
}

/// Minimal reference to a channel, as shown next to videos and playlists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelReference {
    pub channel_id: String,
    pub name: Option<String>,
    pub thumbnails: Vec<Thumbnail>,
}

impl ChannelReference {
    /// Reads the first run of a `runs` text carrying a browse endpoint.
    pub fn from_runs(text: JsonView<'_>) -> Option<Self> {
        let run = text.get("runs").index(0);
        let channel_id = run
            .at(&["navigationEndpoint", "browseEndpoint", "browseId"])
            .as_string()?;
        Some(ChannelReference {
            channel_id,
            name: run.get("text").as_string(),
            thumbnails: Vec::new(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Video {
    pub id: usize,
    pub video_id: String,
    pub title: Option<String>,
    pub channel: Option<ChannelReference>,
    pub view_count: Option<String>,
    pub time_posted: Option<String>,
    pub time_length: Option<String>,
    pub thumbnails: Vec<Thumbnail>,
    /// Token for playlist edits, present on playlist entries only.
    pub playlist_edit_token: Option<String>,
}

impl Video {
    /// Decodes `videoRenderer`, `gridVideoRenderer`, `playlistVideoRenderer`
    /// and `childVideoRenderer` bodies.
    pub fn decode(renderer: JsonView<'_>) -> Option<Self> {
        let video_id = renderer.get("videoId").as_string()?;
        let byline = [
            renderer.get("ownerText"),
            renderer.get("shortBylineText"),
            renderer.get("longBylineText"),
        ]
        .into_iter()
        .find(|t| t.exists());
        let channel = byline.and_then(ChannelReference::from_runs).map(|mut channel| {
            channel.thumbnails = Thumbnail::list_from(renderer.at(&[
                "channelThumbnailSupportedRenderers",
                "channelThumbnailWithLinkRenderer",
                "thumbnail",
            ]));
            channel
        });
        let view_count = renderer
            .get("viewCountText")
            .text()
            .or_else(|| renderer.at(&["videoInfo", "runs", "0", "text"]).as_string());

        Some(Video {
            id: 0,
            video_id,
            title: renderer.get("title").text(),
            channel,
            view_count,
            time_posted: renderer.get("publishedTimeText").text(),
            time_length: renderer
                .get("lengthText")
                .text()
                .or_else(|| renderer.get("lengthSeconds").as_string()),
            thumbnails: Thumbnail::list_from(renderer.get("thumbnail")),
            playlist_edit_token: renderer.get("setVideoId").as_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Channel {
    pub id: usize,
    pub channel_id: String,
    pub name: Option<String>,
    pub handle: Option<String>,
    pub subscriber_count: Option<String>,
    pub description: Option<String>,
    pub verification: VerificationStatus,
    pub thumbnails: Vec<Thumbnail>,
}

impl Channel {
    pub fn decode(renderer: JsonView<'_>) -> Option<Self> {
        let channel_id = renderer.get("channelId").as_string()?;
        // Handles moved into the subscriber count slot; counts moved to the
        // video count slot.
        let subscriber_text = renderer.get("subscriberCountText").text();
        let (handle, subscriber_count) = match subscriber_text {
            Some(text) if text.starts_with('@') => (Some(text), renderer.get("videoCountText").text()),
            other => (None, other),
        };
        Some(Channel {
            id: 0,
            channel_id,
            name: renderer.get("title").text(),
            handle,
            subscriber_count,
            description: renderer.get("descriptionSnippet").text(),
            verification: VerificationStatus::from_badges(renderer.get("ownerBadges")),
            thumbnails: Thumbnail::list_from(renderer.get("thumbnail")),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Playlist {
    pub id: usize,
    pub playlist_id: String,
    pub title: Option<String>,
    pub channel: Option<ChannelReference>,
    pub video_count: Option<String>,
    pub thumbnails: Vec<Thumbnail>,
    pub front_videos: Vec<Video>,
}

impl Playlist {
    pub fn decode(renderer: JsonView<'_>) -> Option<Self> {
        let playlist_id = renderer.get("playlistId").as_string()?;
        let thumbnails = match renderer.at(&["thumbnails", "0"]) {
            first if first.exists() => Thumbnail::list_from(first),
            _ => Thumbnail::list_from(renderer.get("thumbnail")),
        };
        let front_videos = renderer
            .get("videos")
            .iter()
            .filter_map(|v| Video::decode(v.get("childVideoRenderer")))
            .enumerate()
            .map(|(i, mut video)| {
                video.id = i;
                video
            })
            .collect();
        Some(Playlist {
            id: 0,
            playlist_id,
            title: renderer.get("title").text(),
            channel: ChannelReference::from_runs(renderer.get("shortBylineText"))
                .or_else(|| ChannelReference::from_runs(renderer.get("longBylineText"))),
            video_count: renderer
                .get("videoCount")
                .as_string()
                .or_else(|| renderer.get("videoCountText").text()),
            thumbnails,
            front_videos,
        })
    }

    /// Decodes a `lockupViewModel`; lockups of other content types yield `None`.
    pub fn decode_lockup(lockup: JsonView<'_>) -> Option<Self> {
        if lockup.get("contentType").as_str() != Some("LOCKUP_CONTENT_TYPE_PLAYLIST") {
            return None;
        }
        let playlist_id = lockup.get("contentId").as_string()?;
        let metadata = lockup.at(&["metadata", "lockupMetadataViewModel"]);
        let owner = metadata.at(&[
            "metadata",
            "contentMetadataViewModel",
            "metadataRows",
            "0",
            "metadataParts",
            "0",
            "text",
        ]);
        let channel = owner
            .at(&["commandRuns", "0", "onTap", "innertubeCommand", "browseEndpoint", "browseId"])
            .as_string()
            .map(|channel_id| ChannelReference {
                channel_id,
                name: owner.get("content").as_string(),
                thumbnails: Vec::new(),
            });
        let thumbnail = lockup.at(&[
            "contentImage",
            "collectionThumbnailViewModel",
            "primaryThumbnail",
            "thumbnailViewModel",
        ]);
        let video_count = thumbnail
            .get("overlays")
            .iter()
            .find_map(|overlay| {
                overlay
                    .at(&["thumbnailOverlayBadgeViewModel", "thumbnailBadges", "0", "thumbnailBadgeViewModel", "text"])
                    .as_string()
            });
        Some(Playlist {
            id: 0,
            playlist_id,
            title: metadata.at(&["title", "content"]).as_string(),
            channel,
            video_count,
            thumbnails: Thumbnail::list_from_sources(thumbnail.get("image")),
            front_videos: Vec::new(),
        })
    }
}

/// One element of a heterogeneous result list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SearchResult {
    Video(Video),
    Channel(Channel),
    Playlist(Playlist),
}

impl SearchResult {
    pub fn as_video(&self) -> Option<&Video> {
        match self {
            SearchResult::Video(video) => Some(video),
            _ => None,
        }
    }

    pub fn into_video(self) -> Option<Video> {
        match self {
            SearchResult::Video(video) => Some(video),
            _ => None,
        }
    }
}

impl Positioned for SearchResult {
    fn position(&self) -> usize {
        match self {
            SearchResult::Video(v) => v.id,
            SearchResult::Channel(c) => c.id,
            SearchResult::Playlist(p) => p.id,
        }
    }

    fn set_position(&mut self, position: usize) {
        match self {
            SearchResult::Video(v) => v.id = position,
            SearchResult::Channel(c) => c.id = position,
            SearchResult::Playlist(p) => p.id = position,
        }
    }
}

impl Positioned for Video {
    fn position(&self) -> usize {
        self.id
    }

    fn set_position(&mut self, position: usize) {
        self.id = position;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Video,
    Channel,
    Playlist,
    PlaylistLockup,
}

/// Signature keys probed in order; the first present key decides the shape.
const SHAPES: &[(&str, Shape)] = &[
    ("videoRenderer", Shape::Video),
    ("gridVideoRenderer", Shape::Video),
    ("playlistVideoRenderer", Shape::Video),
    ("channelRenderer", Shape::Channel),
    ("gridChannelRenderer", Shape::Channel),
    ("playlistRenderer", Shape::Playlist),
    ("gridPlaylistRenderer", Shape::Playlist),
    ("lockupViewModel", Shape::PlaylistLockup),
];

/// Wrappers whose children are results themselves, with where they keep them.
const GROUPS: &[(&str, &[&[&str]])] = &[
    ("itemSectionRenderer", &[&["contents"]]),
    (
        "shelfRenderer",
        &[
            &["content", "verticalListRenderer", "items"],
            &["content", "horizontalListRenderer", "items"],
            &["content", "expandedShelfContentsRenderer", "items"],
            &["content", "gridRenderer", "items"],
        ],
    ),
    ("verticalListRenderer", &[&["items"]]),
    ("horizontalListRenderer", &[&["items"]]),
    ("expandedShelfContentsRenderer", &[&["items"]]),
    ("gridRenderer", &[&["items"]]),
    ("richItemRenderer", &[&["content"]]),
    ("richSectionRenderer", &[&["content", "richShelfRenderer", "contents"]]),
    ("richShelfRenderer", &[&["contents"]]),
    ("playlistVideoListRenderer", &[&["contents"]]),
];

/// Flattens a heterogeneous list into typed results, in upstream order.
///
/// Unknown shapes (ads, shorts shelves, promos) are skipped and do not consume
/// a position. The first continuation token met along the way is kept.
#[derive(Debug, Default)]
pub struct ResultsCollector {
    pub results: Vec<SearchResult>,
    pub continuation: Option<String>,
}

impl ResultsCollector {
    pub fn collect<'a>(items: impl IntoIterator<Item = JsonView<'a>>) -> Self {
        let mut collector = ResultsCollector::default();
        for item in items {
            collector.visit(item);
        }
        collector
    }

    pub fn visit(&mut self, item: JsonView<'_>) {
        for (key, shape) in SHAPES {
            let renderer = item.get(key);
            if !renderer.exists() {
                continue;
            }
            let decoded = match shape {
                Shape::Video => Video::decode(renderer).map(SearchResult::Video),
                Shape::Channel => Channel::decode(renderer).map(SearchResult::Channel),
                Shape::Playlist => Playlist::decode(renderer).map(SearchResult::Playlist),
                Shape::PlaylistLockup => Playlist::decode_lockup(renderer).map(SearchResult::Playlist),
            };
            if let Some(mut result) = decoded {
                result.set_position(self.results.len());
                self.results.push(result);
            }
            return;
        }

        for (key, paths) in GROUPS {
            let group = item.get(key);
            if !group.exists() {
                continue;
            }
            for path in paths.iter() {
                let children = group.at(path);
                if children.as_array().is_some() {
                    for child in children.iter() {
                        self.visit(child);
                    }
                } else if children.exists() {
                    self.visit(children);
                }
            }
            return;
        }

        if self.continuation.is_none() {
            self.continuation = continuation_token(item);
        }
    }

    /// Keeps only videos, renumbered from zero.
    pub fn into_videos(self) -> Vec<Video> {
        self.results
            .into_iter()
            .filter_map(SearchResult::into_video)
            .enumerate()
            .map(|(i, mut video)| {
                video.id = i;
                video
            })
            .collect()
    }
}
