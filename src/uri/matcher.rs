//! # URI Matcher
//!
//! Structural classification of a URI against one table's three patterns:
//!
//! | shape                          | match        |
//! |--------------------------------|--------------|
//! | `<authority>/<table>`          | `Collection` |
//! | `<authority>/<table>/<digits>` | `ById`       |
//! | `<authority>/<table>/<c>/<v>`  | `ByColumn`   |

use super::{parse_row_id, ResourceUri};

/// Access pattern a URI addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UriMatch {
    /// Every row of the table
    Collection,
    /// One row by primary key
    ById,
    /// Rows whose column equals a value
    ByColumn,
}

/// Matcher bound to one authority and table name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriMatcher {
    authority: String,
    table: String,
}

impl UriMatcher {
    pub fn new(authority: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            authority: authority.into(),
            table: table.into(),
        }
    }

    /// Classify `uri`, or `None` if it is not one of this table's shapes
    pub fn classify(&self, uri: &ResourceUri) -> Option<UriMatch> {
        if uri.authority() != self.authority {
            return None;
        }

        let segments = uri.path_segments();
        if segments.first().map(String::as_str) != Some(self.table.as_str()) {
            return None;
        }

        match segments.len() {
            1 => Some(UriMatch::Collection),
            2 => parse_row_id(&segments[1]).map(|_| UriMatch::ById),
            3 => Some(UriMatch::ByColumn),
            _ => None,
        }
    }
}

/// Table name of a URI: its first path segment
pub fn extract_table_name(uri: &ResourceUri) -> Option<&str> {
    uri.path_segments().first().map(String::as_str)
}

/// Column name of a three-segment URI; `None` for any other shape
pub fn extract_column_name(uri: &ResourceUri) -> Option<&str> {
    let segments = uri.path_segments();
    if segments.len() == 3 {
        Some(segments[1].as_str())
    } else {
        None
    }
}
