//! # Resource Identifiers
//!
//! `scheme://authority/<table>[/<id>]` or `scheme://authority/<table>/<column>/<value>`.
//!
//! Path segments are percent-decoded on parse. Empty segments are dropped, so
//! `content://a/notes/` and `content://a/notes` address the same collection.

pub mod matcher;

pub use matcher::{extract_column_name, extract_table_name, UriMatch, UriMatcher};

use std::fmt;
use std::str::FromStr;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use url::Url;

use crate::errors::{ProviderError, ProviderResult};

/// Scheme used for every URI this crate builds
pub const CONTENT_SCHEME: &str = "content";

/// Characters escaped when a segment is rendered
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// A parsed resource identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceUri {
    scheme: String,
    authority: String,
    segments: Vec<String>,
}

impl ResourceUri {
    /// Parse a URI string. The authority is required.
    pub fn parse(input: &str) -> ProviderResult<Self> {
        let url = Url::parse(input)
            .map_err(|e| ProviderError::invalid_argument(format!("Malformed URI {}: {}", input, e)))?;

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| ProviderError::invalid_argument(format!("URI has no authority: {}", input)))?;
        let authority = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        let mut segments = Vec::new();
        if let Some(raw) = url.path_segments() {
            for segment in raw.filter(|s| !s.is_empty()) {
                let decoded = percent_decode_str(segment).decode_utf8().map_err(|_| {
                    ProviderError::invalid_argument(format!("URI segment is not UTF-8: {}", input))
                })?;
                segments.push(decoded.into_owned());
            }
        }

        Ok(Self {
            scheme: url.scheme().to_string(),
            authority,
            segments,
        })
    }

    /// `content://<authority>/<segments...>`
    pub fn content<I, S>(authority: impl Into<String>, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            scheme: CONTENT_SCHEME.to_string(),
            authority: authority.into(),
            segments: segments
                .into_iter()
                .map(Into::into)
                .filter(|s: &String| !s.is_empty())
                .collect(),
        }
    }

    /// Base URI of a table: `content://<authority>/<table>`
    pub fn for_table(authority: impl Into<String>, table: impl Into<String>) -> Self {
        Self::content(authority, [table.into()])
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn path_segments(&self) -> &[String] {
        &self.segments
    }

    pub fn last_path_segment(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Append a path segment
    pub fn with_appended_segment(&self, segment: impl Into<String>) -> Self {
        let mut uri = self.clone();
        let segment = segment.into();
        if !segment.is_empty() {
            uri.segments.push(segment);
        }
        uri
    }

    /// Append a row id as the last segment
    pub fn with_appended_id(&self, id: i64) -> Self {
        self.with_appended_segment(id.to_string())
    }

    /// Last segment parsed as a row id
    pub fn parse_id(&self) -> Option<i64> {
        self.last_path_segment().and_then(parse_row_id)
    }
}

/// Parse a digits-only segment as a row id
pub(crate) fn parse_row_id(segment: &str) -> Option<i64> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

impl fmt::Display for ResourceUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.authority)?;
        for segment in &self.segments {
            write!(f, "/{}", utf8_percent_encode(segment, SEGMENT))?;
        }
        Ok(())
    }
}

impl FromStr for ResourceUri {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ResourceUri {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ResourceUri {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_segments() {
        let uri = ResourceUri::parse("content://com.example.app/notes/title/a").unwrap();
        assert_eq!(uri.scheme(), "content");
        assert_eq!(uri.authority(), "com.example.app");
        assert_eq!(uri.path_segments(), &["notes", "title", "a"]);
        assert_eq!(uri.last_path_segment(), Some("a"));
    }

    #[test]
    fn test_trailing_slash_ignored() {
        let a = ResourceUri::parse("content://com.example.app/notes/").unwrap();
        let b = ResourceUri::parse("content://com.example.app/notes").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.path_segments().len(), 1);
    }

    #[test]
    fn test_percent_decoding_round_trip() {
        let uri = ResourceUri::parse("content://com.example.app/notes/title/hello%20world").unwrap();
        assert_eq!(uri.last_path_segment(), Some("hello world"));
        assert_eq!(
            uri.to_string(),
            "content://com.example.app/notes/title/hello%20world"
        );
    }

    #[test]
    fn test_no_path() {
        let uri = ResourceUri::parse("content://com.example.app").unwrap();
        assert!(uri.path_segments().is_empty());
        assert_eq!(uri.last_path_segment(), None);
    }

    #[test]
    fn test_missing_authority_rejected() {
        assert!(ResourceUri::parse("content:notes").is_err());
        assert!(ResourceUri::parse("not a uri").is_err());
    }

    #[test]
    fn test_with_appended_id() {
        let base = ResourceUri::for_table("com.example.app", "notes");
        let uri = base.with_appended_id(7);
        assert_eq!(uri.to_string(), "content://com.example.app/notes/7");
        assert_eq!(uri.parse_id(), Some(7));
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_row_id("42"), Some(42));
        assert_eq!(parse_row_id("-1"), None);
        assert_eq!(parse_row_id("4a"), None);
        assert_eq!(parse_row_id(""), None);
        assert_eq!(parse_row_id("99999999999999999999"), None);
    }

    #[test]
    fn test_serde_as_string() {
        let uri = ResourceUri::for_table("com.example.app", "notes");
        let json = serde_json::to_string(&uri).unwrap();
        assert_eq!(json, "\"content://com.example.app/notes\"");
        let back: ResourceUri = serde_json::from_str(&json).unwrap();
        assert_eq!(back, uri);
    }
}
