//! # Change Events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::uri::ResourceUri;

/// What happened at a URI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeKind::Insert => write!(f, "INSERT"),
            ChangeKind::Update => write!(f, "UPDATE"),
            ChangeKind::Delete => write!(f, "DELETE"),
        }
    }
}

/// A change published to observers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub id: Uuid,

    /// URI observers should re-query
    pub uri: ResourceUri,

    pub kind: ChangeKind,

    pub timestamp: DateTime<Utc>,
}

impl ChangeEvent {
    pub fn new(uri: ResourceUri, kind: ChangeKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            uri,
            kind,
            timestamp: Utc::now(),
        }
    }
}
