//! List pages and the delete confirmation dialog.

use std::sync::Arc;

use quill_client::error::ApiError;
use quill_client::query::{QuerySnapshot, ResourceQuery};
use quill_core::backend_errors::BackendErrorReport;
use quill_core::models::{ListRow, Resource};
use quill_core::pagination::ListParams;
use quill_core::types::RecordId;

use crate::toast::ToastBus;

// ---------------------------------------------------------------------------
// ListPage
// ---------------------------------------------------------------------------

/// One collection view: current filters plus cached rows.
pub struct ListPage<R: Resource> {
    query: ResourceQuery<R>,
    params: ListParams,
}

impl<R: Resource> ListPage<R> {
    pub fn new(query: ResourceQuery<R>, params: ListParams) -> Self {
        Self { query, params }
    }

    pub fn params(&self) -> &ListParams {
        &self.params
    }

    pub fn set_params(&mut self, params: ListParams) {
        self.params = params;
    }

    pub async fn records(&self) -> Result<Arc<Vec<R>>, ApiError> {
        self.query.list(&self.params).await
    }

    /// Records rendered as display rows, in server order.
    pub async fn rows(&self) -> Result<Vec<ListRow>, ApiError> {
        Ok(self.records().await?.iter().map(|r| r.row()).collect())
    }

    pub async fn snapshot(&self) -> QuerySnapshot<Vec<R>> {
        self.query.list_snapshot(&self.params).await
    }
}

// ---------------------------------------------------------------------------
// DeleteDialog
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted(RecordId),
    Failed(BackendErrorReport),
    /// `confirm` was called with the dialog closed.
    NotOpen,
}

/// Confirmation step in front of an irreversible delete.
pub struct DeleteDialog<R: Resource> {
    query: ResourceQuery<R>,
    toasts: ToastBus,
    target: Option<RecordId>,
}

impl<R: Resource> DeleteDialog<R> {
    pub fn new(query: ResourceQuery<R>, toasts: ToastBus) -> Self {
        Self {
            query,
            toasts,
            target: None,
        }
    }

    pub fn open_for(&mut self, id: RecordId) {
        self.target = Some(id);
    }

    pub fn is_open(&self) -> bool {
        self.target.is_some()
    }

    pub fn target(&self) -> Option<&RecordId> {
        self.target.as_ref()
    }

    /// Close without deleting.
    pub fn cancel(&mut self) {
        self.target = None;
    }

    /// Delete the target. Closes on success; stays open on failure.
    pub async fn confirm(&mut self) -> DeleteOutcome {
        let Some(id) = self.target.clone() else {
            return DeleteOutcome::NotOpen;
        };

        match self.query.delete(&id).await {
            Ok(()) => {
                self.target = None;
                self.toasts.success(format!("Deleted {} {id}", R::ENTITY));
                DeleteOutcome::Deleted(id)
            }
            Err(e) => {
                tracing::warn!(entity = R::ENTITY, %id, error = %e, "Delete failed");
                let mut report = e.report();
                if report == BackendErrorReport::generic() {
                    report = BackendErrorReport::message(format!(
                        "Failed to delete {}. Please try again.",
                        R::ENTITY
                    ));
                }
                self.toasts.error(report.message.clone());
                DeleteOutcome::Failed(report)
            }
        }
    }
}
