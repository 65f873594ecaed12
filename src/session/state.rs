//! Review session state
//!
//! Everything here runs on one task. Mutation happens in synchronous
//! `submit_*`/`complete_*` pairs; the only suspension points are the
//! network awaits between a submit and its completion, and completions
//! are applied in whatever order the store answers.

use std::collections::HashMap;

use uuid::Uuid;

use crate::anchor::{capture, CapturedSelection};
use crate::doc::{Document, LineIndex, Selection};
use crate::error::Error;
use crate::overlay::{AnnotationEntry, MaterializeOutcome, OverlayManager};
use crate::store::{Comment, CommentId, CommentStore, NewComment, StoreError};

use super::types::{CreateIntent, DeleteIntent, LiveEvent, LoadReport, Reaction, UpdateIntent};

/// One review session over one rendered file.
///
/// The session owns the rendered document, the highlight overlay, and
/// the comments fetched from the store. Each store round trip is split
/// into a `submit_*` call that mints an intent and a `complete_*` call
/// that applies the store's answer, so callers decide where the await
/// happens. A completion for a comment deleted while its request was in
/// flight is dropped and reported as [`Error::Precondition`]; nothing
/// is resurrected.
pub struct DocumentSession {
    project_directory: String,
    file_path: String,
    document: Document,
    index: LineIndex,
    overlay: OverlayManager,
    comments: HashMap<CommentId, Comment>,
    selection: Option<CapturedSelection>,
}

impl DocumentSession {
    pub fn new(
        project_directory: impl Into<String>,
        file_path: impl Into<String>,
        document: Document,
    ) -> Self {
        let index = LineIndex::build(&document);
        Self {
            project_directory: project_directory.into(),
            file_path: file_path.into(),
            document,
            index,
            overlay: OverlayManager::new(),
            comments: HashMap::new(),
            selection: None,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    pub fn project_directory(&self) -> &str {
        &self.project_directory
    }

    pub fn comment(&self, id: CommentId) -> Option<&Comment> {
        self.comments.get(&id)
    }

    pub fn comment_count(&self) -> usize {
        self.comments.len()
    }

    pub fn current_selection(&self) -> Option<&CapturedSelection> {
        self.selection.as_ref()
    }

    /// Load a batch of stored comments, materializing a highlight for
    /// each anchor that still matches the render. Comments whose anchor
    /// no longer resolves stay tracked without a highlight.
    pub fn load_comments(&mut self, comments: Vec<Comment>) -> LoadReport {
        let total = comments.len();
        let mut report = LoadReport::default();
        for comment in comments {
            let outcome = self
                .overlay
                .materialize(&mut self.document, &self.index, &comment);
            if outcome.is_highlighted() {
                report.highlighted += 1;
            } else {
                report.unresolved.push(comment.id);
            }
            self.comments.insert(comment.id, comment);
        }
        tracing::debug!(
            "Loaded {} comments for {}, {} highlighted",
            total,
            self.file_path,
            report.highlighted
        );
        report
    }

    /// Capture the user's selection so a comment can be attached to it.
    /// A rejected selection also discards whatever was captured before.
    pub fn select(&mut self, selection: &Selection) -> Result<&CapturedSelection, Error> {
        match capture(&self.document, &self.index, selection) {
            Ok(captured) => Ok(self.selection.insert(captured)),
            Err(err) => {
                self.selection = None;
                Err(err.into())
            }
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Turn the captured selection into a pending creation. The
    /// selection is consumed; empty comment text leaves it in place so
    /// the user can try again.
    pub fn submit_comment(&mut self, comment_text: &str) -> Result<CreateIntent, Error> {
        let captured = self.selection.take().ok_or(Error::NoSelection)?;
        let trimmed = comment_text.trim();
        if trimmed.is_empty() {
            self.selection = Some(captured);
            return Err(Error::EmptyComment);
        }

        let intent = CreateIntent {
            token: Uuid::new_v4(),
            payload: NewComment {
                project_directory: self.project_directory.clone(),
                file_path: self.file_path.clone(),
                line_start: captured.anchor.line_start,
                line_end: captured.anchor.line_end,
                selected_text: captured.anchor.text,
                comment_text: trimmed.to_string(),
            },
        };
        tracing::debug!(
            "Submitting comment {} on {}",
            intent.token,
            self.file_path
        );
        Ok(intent)
    }

    /// Apply the store's answer to a pending creation. On success the
    /// comment is tracked and its highlight materialized against the
    /// current render, whatever happened to the selection in the
    /// meantime. On failure the session is left exactly as it was.
    pub fn complete_create(
        &mut self,
        intent: CreateIntent,
        result: Result<Comment, StoreError>,
    ) -> Result<MaterializeOutcome, Error> {
        let comment = result.map_err(|err| {
            tracing::warn!("Comment creation {} failed: {}", intent.token, err);
            Error::Store(err)
        })?;
        tracing::debug!("Comment creation {} stored as {}", intent.token, comment.id);

        let outcome = self
            .overlay
            .materialize(&mut self.document, &self.index, &comment);
        self.comments.insert(comment.id, comment);
        Ok(outcome)
    }

    /// Start editing a tracked comment's text.
    pub fn submit_update(
        &mut self,
        id: CommentId,
        comment_text: &str,
    ) -> Result<UpdateIntent, Error> {
        if !self.comments.contains_key(&id) {
            return Err(Error::Precondition { id });
        }
        let trimmed = comment_text.trim();
        if trimmed.is_empty() {
            return Err(Error::EmptyComment);
        }
        Ok(UpdateIntent {
            token: Uuid::new_v4(),
            id,
            comment_text: trimmed.to_string(),
        })
    }

    /// Apply the store's answer to a pending edit. The stored text is
    /// authoritative. If the comment was deleted while the request was
    /// in flight the answer is dropped; the comment does not come back.
    pub fn complete_update(
        &mut self,
        intent: UpdateIntent,
        result: Result<Comment, StoreError>,
    ) -> Result<(), Error> {
        let stored = result.map_err(|err| {
            tracing::warn!("Comment update {} failed: {}", intent.token, err);
            Error::Store(err)
        })?;

        let Some(comment) = self.comments.get_mut(&intent.id) else {
            tracing::warn!(
                "Update completed for comment {} the session no longer tracks",
                intent.id
            );
            return Err(Error::Precondition { id: intent.id });
        };
        comment.comment_text = stored.comment_text;
        if self.overlay.contains(intent.id) {
            self.overlay.update(intent.id, &comment.comment_text)?;
        }
        Ok(())
    }

    /// Start deleting a tracked comment.
    pub fn submit_delete(&mut self, id: CommentId) -> Result<DeleteIntent, Error> {
        if !self.comments.contains_key(&id) {
            return Err(Error::Precondition { id });
        }
        Ok(DeleteIntent {
            token: Uuid::new_v4(),
            id,
        })
    }

    /// Apply the store's answer to a pending deletion, unwrapping the
    /// comment's highlight and restoring the text it covered.
    pub fn complete_delete(
        &mut self,
        intent: DeleteIntent,
        result: Result<(), StoreError>,
    ) -> Result<(), Error> {
        result.map_err(|err| {
            tracing::warn!("Comment deletion {} failed: {}", intent.token, err);
            Error::Store(err)
        })?;

        if !self.comments.contains_key(&intent.id) {
            tracing::warn!(
                "Deletion completed for comment {} the session no longer tracks",
                intent.id
            );
            return Err(Error::Precondition { id: intent.id });
        }
        // A comment is forgotten only once its highlight is out of the
        // tree; a failed unwrap leaves both in place.
        if self.overlay.contains(intent.id) {
            self.overlay.remove(&mut self.document, intent.id)?;
        }
        self.comments.remove(&intent.id);
        tracing::debug!("Comment {} deleted", intent.id);
        Ok(())
    }

    /// Annotation list in document order, derived from the overlay.
    pub fn snapshot(&self) -> Vec<AnnotationEntry> {
        self.overlay.snapshot(&self.document)
    }

    /// Replace the render wholesale and rebuild the overlay from the
    /// given comments. Selection, highlights, and tracked comments from
    /// the old render are all discarded first.
    pub fn rebuild(&mut self, document: Document, comments: Vec<Comment>) -> LoadReport {
        self.selection = None;
        self.overlay.clear();
        self.comments.clear();
        self.index = LineIndex::build(&document);
        self.document = document;
        tracing::debug!("Rebuilding overlay for {}", self.file_path);
        self.load_comments(comments)
    }

    /// Decide what to do about a server-pushed event.
    pub fn handle_event(&self, event: &LiveEvent) -> Reaction {
        if event.file_path() == self.file_path {
            Reaction::Rebuild
        } else {
            Reaction::Ignore
        }
    }

    /// Save the captured selection as a new comment through the store.
    pub async fn save_comment<S: CommentStore + ?Sized>(
        &mut self,
        store: &S,
        comment_text: &str,
    ) -> Result<MaterializeOutcome, Error> {
        let intent = self.submit_comment(comment_text)?;
        let result = store.create(&intent.payload).await;
        self.complete_create(intent, result)
    }

    /// Edit a tracked comment's text through the store.
    pub async fn edit_comment<S: CommentStore + ?Sized>(
        &mut self,
        store: &S,
        id: CommentId,
        comment_text: &str,
    ) -> Result<(), Error> {
        let intent = self.submit_update(id, comment_text)?;
        let result = store.update(intent.id, &intent.comment_text).await;
        self.complete_update(intent, result)
    }

    /// Delete a tracked comment through the store.
    pub async fn remove_comment<S: CommentStore + ?Sized>(
        &mut self,
        store: &S,
        id: CommentId,
    ) -> Result<(), Error> {
        let intent = self.submit_delete(id)?;
        let result = store.delete(intent.id).await;
        self.complete_delete(intent, result)
    }

    /// Rebuild against a fresh render, fetching the comment list from
    /// the store.
    pub async fn rebuild_with<S: CommentStore + ?Sized>(
        &mut self,
        store: &S,
        document: Document,
    ) -> Result<LoadReport, Error> {
        let comments = store
            .list(&self.project_directory, &self.file_path)
            .await?;
        Ok(self.rebuild(document, comments))
    }
}
