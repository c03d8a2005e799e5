//! Contact submissions inbox

use serde::Serialize;
use uuid::Uuid;

use crate::collection::{DataList, Refresh};
use crate::error::{Error, Result};
use crate::models::ContactSubmission;
use crate::notice::{Notice, Notices};
use crate::scope::ViewScope;
use crate::Reelhouse;

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this message?";

#[derive(Serialize)]
struct MarkRead {
    is_read: bool,
}

pub struct ContactSubmissions {
    list: DataList<ContactSubmission>,
    selected: Option<Uuid>,
    notices: Notices,
}

impl ContactSubmissions {
    pub fn new(client: Reelhouse, scope: ViewScope) -> Self {
        Self {
            list: DataList::new(client, scope),
            selected: None,
            notices: Notices::default(),
        }
    }

    /// Newest first
    pub fn submissions(&self) -> &[ContactSubmission] {
        self.list.items()
    }

    pub fn unread_count(&self) -> usize {
        self.list.items().iter().filter(|s| !s.is_read).count()
    }

    pub fn is_loading(&self) -> bool {
        self.list.is_loading()
    }

    pub fn notices(&self) -> &Notices {
        &self.notices
    }

    pub fn notices_mut(&mut self) -> &mut Notices {
        &mut self.notices
    }

    pub async fn mount(&mut self) -> Result<()> {
        match self.list.load().await {
            Ok(_) => Ok(()),
            Err(e) if e.is_cancelled() => Err(e),
            Err(e) => {
                tracing::warn!("submissions fetch failed: {}", e);
                self.notices.push(Notice::error("Failed to fetch submissions"));
                Err(e)
            }
        }
    }

    /// Open a submission. An unread one is marked read once; reading it
    /// again sends nothing.
    pub async fn view(&mut self, id: Uuid) -> Result<&ContactSubmission> {
        let is_read = self
            .list
            .get(id)
            .map(|submission| submission.is_read)
            .ok_or_else(|| Error::general(format!("Submission {} not found", id)))?;

        self.selected = Some(id);

        if !is_read {
            match self.list.update(id, &MarkRead { is_read: true }, Refresh::Local).await {
                Ok(()) => {
                    self.list.patch(id, |submission| submission.is_read = true);
                }
                Err(e) if e.is_cancelled() => return Err(e),
                // Still readable; it just stays unread.
                Err(e) => tracing::warn!(%id, "marking submission read failed: {}", e),
            }
        }

        self.list
            .get(id)
            .ok_or_else(|| Error::general(format!("Submission {} not found", id)))
    }

    pub fn selected(&self) -> Option<&ContactSubmission> {
        self.selected.and_then(|id| self.list.get(id))
    }

    pub fn close_view(&mut self) {
        self.selected = None;
    }

    /// Delete after `confirm` accepts [`DELETE_PROMPT`]. Returns whether
    /// anything was deleted.
    pub async fn delete(&mut self, id: Uuid, confirm: impl FnOnce(&str) -> bool) -> Result<bool> {
        if !confirm(DELETE_PROMPT) {
            return Ok(false);
        }

        match self.list.remove(id, Refresh::Local).await {
            Ok(()) => {
                if self.selected == Some(id) {
                    self.selected = None;
                }
                self.notices.push(Notice::new("Deleted", "Message deleted successfully"));
                Ok(true)
            }
            Err(e) if e.is_cancelled() => Err(e),
            Err(e) => {
                tracing::warn!(%id, "deleting submission failed: {}", e);
                self.notices.push(Notice::error("Failed to delete message"));
                Err(e)
            }
        }
    }
}
