//! Classification of user-supplied URLs
//!
//! A pasted string is either a stream hosted outside the directory, a
//! Radio Garden channel link (`/listen/<name>/<id>`), a Radio Garden place
//! link (`/visit/<name>/<id>`), or nothing we understand. The checks run in
//! that order and the first match wins.

use once_cell::sync::Lazy;
use regex::Regex;

/// Domain of the directory service
pub const DIRECTORY_DOMAIN: &str = "radio.garden";

static CHANNEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/listen/[^/]+/([a-zA-Z0-9_]+)").expect("valid channel regex"));

static PLACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/visit/[^/]+/([a-zA-Z0-9_]+)").expect("valid place regex"));

/// What a pasted URL points to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// A playable URL outside the directory
    DirectStream,
    /// A directory channel, with its id
    Channel(String),
    /// A directory place, with its id
    Place(String),
    Unrecognized,
}

/// Classify a pasted URL
///
/// # Example
///
/// ```
/// use pmoradiogarden::classifier::{classify, Intent};
///
/// assert_eq!(
///     classify("https://radio.garden/listen/some-name/mbAtEPnJ"),
///     Intent::Channel("mbAtEPnJ".to_string())
/// );
/// assert_eq!(classify("https://icecast.example.org/live.mp3"), Intent::DirectStream);
/// assert_eq!(classify("not a url"), Intent::Unrecognized);
/// ```
pub fn classify(input: &str) -> Intent {
    if is_direct_stream_url(input) {
        return Intent::DirectStream;
    }

    if let Some(id) = extract_channel_id(input) {
        return Intent::Channel(id);
    }

    if let Some(id) = extract_place_id(input) {
        return Intent::Place(id);
    }

    Intent::Unrecognized
}

/// Whether the input is an http(s) URL that does not belong to the directory
pub fn is_direct_stream_url(input: &str) -> bool {
    let lower = input.to_lowercase();
    (lower.starts_with("http://") || lower.starts_with("https://"))
        && !lower.contains(DIRECTORY_DOMAIN)
}

/// Extract a channel id from any string containing `/listen/<name>/<id>`
///
/// Used both on pasted URLs and on the relative page links of place items.
pub fn extract_channel_id(input: &str) -> Option<String> {
    capture_id(&CHANNEL_RE, input)
}

/// Extract a place id from any string containing `/visit/<name>/<id>`
pub fn extract_place_id(input: &str) -> Option<String> {
    capture_id(&PLACE_RE, input)
}

fn capture_id(re: &Regex, input: &str) -> Option<String> {
    re.captures(input)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_link() {
        assert_eq!(
            classify("https://radio.garden/listen/some-name/mbAtEPnJ"),
            Intent::Channel("mbAtEPnJ".to_string())
        );
        assert_eq!(
            classify("radio.garden/listen/kiss-fm/ab_12"),
            Intent::Channel("ab_12".to_string())
        );
    }

    #[test]
    fn test_place_link() {
        assert_eq!(
            classify("https://radio.garden/visit/some-city/XyZ123"),
            Intent::Place("XyZ123".to_string())
        );
    }

    #[test]
    fn test_direct_stream() {
        for url in [
            "http://stream.example.com/live",
            "https://mars.streamerr.co/8154/stream",
            "HTTPS://STREAM.ZENO.FM/vq6p5vxb4v8uv",
        ] {
            assert_eq!(classify(url), Intent::DirectStream, "{}", url);
        }
    }

    #[test]
    fn test_directory_domain_is_never_direct() {
        // Case-insensitive on the domain as well
        assert_eq!(
            classify("https://Radio.Garden/listen/x/abc"),
            Intent::Channel("abc".to_string())
        );
        assert_eq!(classify("https://radio.garden/"), Intent::Unrecognized);
    }

    #[test]
    fn test_direct_stream_wins_over_patterns() {
        // An external host with a /listen/ path is still a direct stream
        assert_eq!(
            classify("https://example.com/listen/name/abc"),
            Intent::DirectStream
        );
    }

    #[test]
    fn test_channel_wins_over_place() {
        assert_eq!(
            classify("radio.garden/visit/city/P1/listen/name/C1"),
            Intent::Channel("C1".to_string())
        );
    }

    #[test]
    fn test_unrecognized() {
        assert_eq!(classify("not a url"), Intent::Unrecognized);
        assert_eq!(classify(""), Intent::Unrecognized);
        assert_eq!(classify("ftp://example.com/x.mp3"), Intent::Unrecognized);
        assert_eq!(classify("https://radio.garden/listen/"), Intent::Unrecognized);
    }

    #[test]
    fn test_extract_channel_id_from_relative_link() {
        assert_eq!(
            extract_channel_id("/listen/radio-aashiqanaa/mbAtEPnJ"),
            Some("mbAtEPnJ".to_string())
        );
        assert_eq!(extract_channel_id("/visit/kanpur/x2Fh0lXL"), None);
    }
}
