// SPDX-FileCopyrightText: 2026 WagerGenie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-view lifetimes.
//!
//! Every rendered page that can start async work gets a view id. The id is
//! bound to a [`CancellationToken`] (a child of the process shutdown token)
//! and, for chat pages, a [`ChatTranscript`]. Closing the view cancels the
//! token and drops the transcript, so late replies land nowhere.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use wagergenie_core::types::ChatMessage;

use crate::{ChatSurface, ChatTranscript};

/// A live view as seen by request handlers.
#[derive(Debug, Clone)]
pub struct View {
    pub id: String,
    pub surface: ChatSurface,
    /// User id of the session that rendered the page.
    pub owner: String,
    pub cancel: CancellationToken,
    pub transcript: ChatTranscript,
}

#[derive(Debug)]
struct Entry {
    view: View,
    opened_at: Instant,
    attached: bool,
}

/// Registry of open views, shared across handlers.
#[derive(Debug, Clone)]
pub struct ViewRegistry {
    parent: CancellationToken,
    views: Arc<DashMap<String, Entry>>,
    error_reply: Arc<str>,
}

impl ViewRegistry {
    /// Creates a registry whose view tokens are children of `parent`.
    pub fn new(parent: CancellationToken) -> Self {
        Self {
            parent,
            views: Arc::new(DashMap::new()),
            error_reply: Arc::from(crate::transcript::DEFAULT_ERROR_REPLY),
        }
    }

    /// Reply appended to transcripts of new views when the responder fails.
    pub fn with_error_reply(mut self, reply: impl Into<String>) -> Self {
        self.error_reply = Arc::from(reply.into());
        self
    }

    /// Opens a fresh view with an empty transcript.
    pub fn open(&self, surface: ChatSurface, owner: &str) -> View {
        self.open_with_history(surface, owner, Vec::new())
    }

    /// Opens a view whose transcript starts from `history`.
    pub fn open_with_history(
        &self,
        surface: ChatSurface,
        owner: &str,
        history: Vec<ChatMessage>,
    ) -> View {
        let id = uuid::Uuid::new_v4().to_string();
        let view = View {
            id: id.clone(),
            surface,
            owner: owner.to_string(),
            cancel: self.parent.child_token(),
            transcript: ChatTranscript::with_messages(history)
                .with_error_reply(self.error_reply.to_string()),
        };
        self.views.insert(
            id.clone(),
            Entry {
                view: view.clone(),
                opened_at: Instant::now(),
                attached: false,
            },
        );
        debug!(view_id = %id, %surface, "view opened");
        view
    }

    /// Looks up a live view.
    pub fn get(&self, id: &str) -> Option<View> {
        self.views.get(id).map(|entry| entry.view.clone())
    }

    /// Looks up a live view rendered for `owner`.
    pub fn get_owned(&self, id: &str, owner: &str) -> Option<View> {
        self.get(id).filter(|view| view.owner == owner)
    }

    /// Marks a view as having a connected event stream.
    ///
    /// The returned guard closes the view when dropped. Returns `None` for
    /// unknown or already-attached views.
    pub fn attach(&self, id: &str) -> Option<ViewGuard> {
        let mut entry = self.views.get_mut(id)?;
        if entry.attached {
            return None;
        }
        entry.attached = true;
        debug!(view_id = %id, "view attached");
        Some(ViewGuard {
            registry: self.clone(),
            id: id.to_string(),
        })
    }

    /// Closes a view, cancelling any in-flight work bound to it.
    pub fn close(&self, id: &str) -> bool {
        match self.views.remove(id) {
            Some((_, entry)) => {
                entry.view.cancel.cancel();
                debug!(view_id = %id, "view closed");
                true
            }
            None => false,
        }
    }

    /// Closes views whose page never connected its event stream.
    ///
    /// Returns how many were closed.
    pub fn reap_unattached(&self, older_than: Duration) -> usize {
        let stale: Vec<String> = self
            .views
            .iter()
            .filter(|e| !e.attached && e.opened_at.elapsed() >= older_than)
            .map(|e| e.key().clone())
            .collect();
        let closed = stale.iter().filter(|id| self.close(id)).count();
        if closed > 0 {
            info!(closed, "reaped unattached views");
        }
        closed
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

/// Closes its view on drop.
#[derive(Debug)]
pub struct ViewGuard {
    registry: ViewRegistry,
    id: String,
}

impl ViewGuard {
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Drop for ViewGuard {
    fn drop(&mut self) {
        self.registry.close(&self.id);
    }
}
