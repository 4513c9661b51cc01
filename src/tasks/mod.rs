// SPDX-License-Identifier: MIT
//! Task snapshot cache and pagination.
//!
//! [`TaskCollection`] holds the authenticated user's full task list exactly as
//! last fetched from the server (server order, never client-sorted).  Every
//! successful create/update/delete triggers a full re-fetch, so the visible
//! collection is always the server's view at the last synchronization point —
//! never a merge of stale and optimistic data.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::session::SessionStore;

/// Fixed number of tasks per derived page.
pub const PAGE_SIZE: usize = 5;

// ─── Task model ───────────────────────────────────────────────────────────────

/// A task as the server returns it.
///
/// Ids are server-assigned and opaque; the backing store exposes the field as
/// `_id`.  The client never synthesizes one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(rename = "_id")]
    pub id: String,
    pub task_name: String,
    pub description: String,
    pub due_date: DateTime<Utc>,
}

/// Request payload for create and update operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFields {
    pub task_name: String,
    pub description: String,
    pub due_date: DateTime<Utc>,
}

// ─── TaskCollection ───────────────────────────────────────────────────────────

pub struct TaskCollection {
    api: ApiClient,
    session: Arc<SessionStore>,
    snapshot: Vec<Task>,
    /// 1-based, clamped to the snapshot's page range.
    current_page: usize,
}

impl TaskCollection {
    pub fn new(api: ApiClient, session: Arc<SessionStore>) -> Self {
        Self {
            api,
            session,
            snapshot: Vec::new(),
            current_page: 1,
        }
    }

    /// Replace the snapshot with the server's current task list.
    ///
    /// Resets the page to 1.  On an unauthorized response the session is torn
    /// down before the error is surfaced; the snapshot is left untouched on
    /// any failure.
    pub async fn refresh(&mut self) -> Result<(), ApiError> {
        let tasks = self
            .api
            .list_tasks()
            .await
            .map_err(|e| self.invalidate_on_unauthorized(e))?;
        debug!(count = tasks.len(), "task snapshot replaced");
        self.snapshot = tasks;
        self.current_page = 1;
        Ok(())
    }

    /// Create a task, then re-fetch the full snapshot.
    pub async fn create(&mut self, fields: &TaskFields) -> Result<(), ApiError> {
        self.api
            .create_task(fields)
            .await
            .map_err(|e| self.invalidate_on_unauthorized(e))?;
        self.refresh().await
    }

    /// Update a task by id, then re-fetch the full snapshot.
    pub async fn update(&mut self, id: &str, fields: &TaskFields) -> Result<(), ApiError> {
        self.api
            .update_task(id, fields)
            .await
            .map_err(|e| self.invalidate_on_unauthorized(e))?;
        self.refresh().await
    }

    /// Delete a task by id, then re-fetch the full snapshot.
    ///
    /// The request is issued regardless of whether the id appears in the
    /// current snapshot — the server is the authority on existence.
    pub async fn delete(&mut self, id: &str) -> Result<(), ApiError> {
        self.api
            .delete_task(id)
            .await
            .map_err(|e| self.invalidate_on_unauthorized(e))?;
        self.refresh().await
    }

    /// The tasks on page `n` (1-based), clamped to the valid page range.
    ///
    /// Pure projection over the snapshot; an empty snapshot yields an empty
    /// slice for every `n`.
    pub fn page(&self, n: usize) -> &[Task] {
        let (start, end) = page_bounds(self.snapshot.len(), n);
        &self.snapshot[start..end]
    }

    /// Move to page `n`, clamped to the valid range.
    pub fn set_page(&mut self, n: usize) {
        self.current_page = clamp_page(self.snapshot.len(), n);
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// `ceil(len / 5)` — zero for an empty snapshot.
    pub fn total_pages(&self) -> usize {
        total_pages(self.snapshot.len())
    }

    /// The full snapshot, in server order.
    pub fn tasks(&self) -> &[Task] {
        &self.snapshot
    }

    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    /// An unauthorized response from any task operation invalidates the
    /// session; the error itself is still passed through to the caller.
    fn invalidate_on_unauthorized(&self, err: ApiError) -> ApiError {
        if err.is_unauthorized() {
            info!("server rejected the session token — signing out");
            self.session.logout();
        }
        err
    }

    #[cfg(test)]
    fn seed(&mut self, tasks: Vec<Task>) {
        self.snapshot = tasks;
        self.current_page = 1;
    }
}

// ─── Pagination arithmetic ────────────────────────────────────────────────────

fn total_pages(count: usize) -> usize {
    count.div_ceil(PAGE_SIZE)
}

/// Clamp a requested 1-based page number into the snapshot's valid range.
fn clamp_page(count: usize, n: usize) -> usize {
    n.clamp(1, total_pages(count).max(1))
}

/// Half-open slice bounds `[(n-1)*5, n*5)` for the clamped page.
fn page_bounds(count: usize, n: usize) -> (usize, usize) {
    if count == 0 {
        return (0, 0);
    }
    let page = clamp_page(count, n);
    let start = (page - 1) * PAGE_SIZE;
    (start, (start + PAGE_SIZE).min(count))
}
