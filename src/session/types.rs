//! Session flow types
//!
//! Each network round trip gets its own intent value, minted when the
//! user commits an action and consumed when the store answers. Session
//! state never leaks into a shared mutable place; whatever an in-flight
//! request needs rides along in the intent.

use serde::Deserialize;
use uuid::Uuid;

use crate::store::{CommentId, NewComment};

/// One pending comment creation.
#[derive(Debug, Clone)]
pub struct CreateIntent {
    /// Correlates the request with its completion in logs.
    pub token: Uuid,
    pub payload: NewComment,
}

/// One pending text edit.
#[derive(Debug, Clone)]
pub struct UpdateIntent {
    pub token: Uuid,
    pub id: CommentId,
    pub comment_text: String,
}

/// One pending deletion.
#[derive(Debug, Clone)]
pub struct DeleteIntent {
    pub token: Uuid,
    pub id: CommentId,
}

/// Server-pushed notification about a reviewed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveEvent {
    /// The file's content changed on disk.
    FileUpdated { file_path: String },
    /// Comments on the file were resolved out of band.
    CommentsResolved { file_path: String },
}

#[derive(Debug, Deserialize)]
struct LivePayload {
    file_path: String,
}

impl LiveEvent {
    /// Decode a named server-sent event. Unknown event names and
    /// malformed payloads yield `None`.
    pub fn parse(event: &str, data: &str) -> Option<LiveEvent> {
        let payload: LivePayload = serde_json::from_str(data).ok()?;
        match event {
            "file_updated" => Some(LiveEvent::FileUpdated {
                file_path: payload.file_path,
            }),
            "comments_resolved" => Some(LiveEvent::CommentsResolved {
                file_path: payload.file_path,
            }),
            _ => None,
        }
    }

    pub fn file_path(&self) -> &str {
        match self {
            LiveEvent::FileUpdated { file_path } | LiveEvent::CommentsResolved { file_path } => {
                file_path
            }
        }
    }
}

/// What a session should do about a [`LiveEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    /// The event concerns this session's file; rebuild from scratch.
    Rebuild,
    /// Some other file changed; nothing to do.
    Ignore,
}

/// Outcome of loading a batch of comments into a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Comments whose anchors resolved and now carry a highlight.
    pub highlighted: usize,
    /// Comments kept without a highlight; their anchor text no longer
    /// matches the render.
    pub unresolved: Vec<CommentId>,
}
