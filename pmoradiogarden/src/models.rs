//! Data models for the Radio Garden API
//!
//! The `*Response` types mirror the JSON envelopes returned by the directory.
//! The `data` envelope is required; inside it every field is defaulted and
//! unknown fields are ignored, so partial or extended payloads still decode.
//!
//! [`ResolvedStation`] and [`ResolveResult`] are the values produced by the
//! resolver.

use serde::{Deserialize, Serialize};

// ============================================================================
// Channel metadata (/api/ara/content/channel/{id})
// ============================================================================

/// Envelope of the channel metadata endpoint
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ChannelResponse {
    pub data: ChannelData,
}

/// Channel metadata
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ChannelData {
    /// Station name
    #[serde(default)]
    pub title: String,
    /// Page URL of the channel (not the stream)
    #[serde(default)]
    pub url: String,
    /// Station website, often empty
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub place: PlaceRef,
    #[serde(default)]
    pub country: CountryRef,
}

/// Reference to the place a channel belongs to
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PlaceRef {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
}

/// Reference to the country a channel belongs to
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CountryRef {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
}

// ============================================================================
// Place channels (/api/ara/content/page/{id}/channels)
// ============================================================================

/// Envelope of the place channels endpoint
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PlaceChannelsResponse {
    pub data: PlaceChannelsData,
}

impl PlaceChannelsResponse {
    /// Items of every content block tagged as channel content, in page order
    pub fn channel_items(&self) -> Vec<PlaceChannelItem> {
        self.data
            .content
            .iter()
            .filter(|block| block.is_channel_list())
            .flat_map(|block| block.items.iter().cloned())
            .collect()
    }
}

/// Content of a place page
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PlaceChannelsData {
    #[serde(default)]
    pub content: Vec<PlaceContent>,
}

/// A content block of a place page
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceContent {
    #[serde(default)]
    pub items: Vec<PlaceChannelItem>,
    /// Kind of items in this block ("channel" for stations)
    #[serde(default)]
    pub items_type: String,
    /// Block layout type (list, carousel...)
    #[serde(default, rename = "type")]
    pub block_type: String,
}

impl PlaceContent {
    /// Value of `itemsType` for blocks listing stations
    pub const CHANNEL_ITEMS: &'static str = "channel";

    /// Whether this block lists channels
    pub fn is_channel_list(&self) -> bool {
        self.items_type == Self::CHANNEL_ITEMS
    }
}

/// One channel listed on a place page
///
/// Not resolved yet: pass it back to
/// [`StationResolver::resolve_from_place_item`](crate::StationResolver::resolve_from_place_item)
/// to get a playable station.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PlaceChannelItem {
    #[serde(default)]
    pub href: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub page: ChannelPage,
}

impl PlaceChannelItem {
    /// Title to show when asking the user to pick a channel
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.page.title
        } else {
            &self.title
        }
    }

    /// Link identifying the channel (`page.url`, falling back to `href`)
    pub fn link(&self) -> &str {
        if self.page.url.is_empty() {
            &self.href
        } else {
            &self.page.url
        }
    }
}

/// Page reference of a listed channel
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChannelPage {
    #[serde(default)]
    pub title: String,
    /// Relative page URL, e.g. `/listen/radio-name/mbAtEPnJ`
    #[serde(default)]
    pub url: String,
}

// ============================================================================
// Resolution results
// ============================================================================

/// A station fully resolved to a playable stream
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ResolvedStation {
    /// Directory channel id (identity of the station)
    pub channel_id: String,
    pub name: String,
    pub place: String,
    pub country: String,
    /// Final stream URL, redirects already followed
    pub stream_url: String,
    #[serde(default)]
    pub website: String,
}

impl ResolvedStation {
    /// Assemble a station from channel metadata and its resolved stream
    pub fn from_metadata(
        channel_id: impl Into<String>,
        metadata: ChannelData,
        stream_url: impl Into<String>,
    ) -> Self {
        Self {
            channel_id: channel_id.into(),
            name: metadata.title,
            place: metadata.place.title,
            country: metadata.country.title,
            stream_url: stream_url.into(),
            website: metadata.website,
        }
    }

    /// "Place, Country" line, skipping empty parts
    pub fn location(&self) -> String {
        [self.place.as_str(), self.country.as_str()]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Outcome of resolving a pasted URL
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum ResolveResult {
    /// A single station, ready to be saved
    SingleStation(ResolvedStation),
    /// A place listing several channels; the user must pick one
    ///
    /// `items` is never empty.
    MultipleStations {
        items: Vec<PlaceChannelItem>,
        place_id: String,
    },
    /// The URL was already a stream hosted outside the directory
    DirectStream(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_channel_response_ignores_unknown_fields() {
        let body = json!({
            "apiVersion": 1,
            "version": "9bd5454",
            "data": {
                "id": "mbAtEPnJ",
                "title": "Radio Aashiqanaa",
                "url": "/listen/radio-aashiqanaa/mbAtEPnJ",
                "secure": true,
                "place": { "id": "x2Fh0lXL", "title": "Kanpur" },
                "country": { "id": "In0GBkqR", "title": "India" }
            }
        });

        let response: ChannelResponse = serde_json::from_value(body).unwrap();
        assert_eq!(response.data.title, "Radio Aashiqanaa");
        assert_eq!(response.data.place.title, "Kanpur");
        assert_eq!(response.data.country.title, "India");
        assert_eq!(response.data.website, "");
    }

    #[test]
    fn test_missing_envelope_is_rejected() {
        let body = json!({ "error": "not found" });

        assert!(serde_json::from_value::<ChannelResponse>(body.clone()).is_err());
        assert!(serde_json::from_value::<PlaceChannelsResponse>(body).is_err());
    }

    #[test]
    fn test_place_channel_items_keeps_channel_blocks_only() {
        let body = json!({
            "data": {
                "content": [
                    {
                        "type": "list",
                        "itemsType": "channel",
                        "items": [
                            { "page": { "title": "A", "url": "/listen/a/aaa111" } },
                            { "page": { "title": "B", "url": "/listen/b/bbb222" } }
                        ]
                    },
                    {
                        "type": "list",
                        "itemsType": "page",
                        "items": [ { "title": "Nearby", "href": "/visit/x/xyz" } ]
                    },
                    {
                        "type": "carousel",
                        "itemsType": "channel",
                        "items": [ { "title": "C", "href": "/listen/c/ccc333" } ]
                    }
                ]
            }
        });

        let response: PlaceChannelsResponse = serde_json::from_value(body).unwrap();
        let items = response.channel_items();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].display_title(), "A");
        assert_eq!(items[2].display_title(), "C");
        assert_eq!(items[2].link(), "/listen/c/ccc333");
    }

    #[test]
    fn test_item_link_prefers_page_url() {
        let item = PlaceChannelItem {
            href: "/listen/other/zzz".to_string(),
            title: String::new(),
            page: ChannelPage {
                title: "Page".to_string(),
                url: "/listen/name/abc123".to_string(),
            },
        };
        assert_eq!(item.link(), "/listen/name/abc123");
    }

    #[test]
    fn test_station_location() {
        let station = ResolvedStation {
            channel_id: "id".to_string(),
            name: "Name".to_string(),
            place: "Pali".to_string(),
            country: String::new(),
            stream_url: "https://example.com/s".to_string(),
            website: String::new(),
        };
        assert_eq!(station.location(), "Pali");
    }
}
