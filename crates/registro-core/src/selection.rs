//! Selection and delete-confirmation state of the access report.
//!
//! The controller only tracks which sessions are chosen and which deletion
//! awaits confirmation. Issuing the delete against the store is left to the
//! caller, which reports back through [`SelectionController::complete_delete`].

use serde::Serialize;
use std::collections::BTreeSet;
use strum::{AsRefStr, Display};

/// Whether the selection UI is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum SelectionMode {
    #[default]
    Browsing,
    Selecting,
}

/// What a delete request covers; decides the confirmation wording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum DeleteScope {
    SingleSession,
    StudentGroup { student_id: String },
    BulkSelection,
}

/// A deletion waiting for the user to confirm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteRequest {
    pub scope: DeleteScope,
    pub session_ids: BTreeSet<String>,
}

impl DeleteRequest {
    /// Confirmation prompt shown to the teacher.
    pub fn prompt(&self) -> String {
        let count = self.session_ids.len();
        match &self.scope {
            DeleteScope::SingleSession => {
                "Eliminare questa sessione e le relative attività?".to_string()
            }
            DeleteScope::StudentGroup { student_id } => format!(
                "Eliminare tutte le {} sessioni di {} e le relative attività?",
                count, student_id
            ),
            DeleteScope::BulkSelection => format!(
                "Eliminare le {} sessioni selezionate e le relative attività?",
                count
            ),
        }
    }
}

/// Browsing/selecting state machine with the chosen session ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectionController {
    mode: SelectionMode,
    selected: BTreeSet<String>,
    pending: Option<DeleteRequest>,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn selected(&self) -> &BTreeSet<String> {
        &self.selected
    }

    pub fn is_selected(&self, session_id: &str) -> bool {
        self.selected.contains(session_id)
    }

    pub fn pending(&self) -> Option<&DeleteRequest> {
        self.pending.as_ref()
    }

    /// Enters selection mode with an empty set.
    pub fn enter_selecting(&mut self) {
        self.mode = SelectionMode::Selecting;
        self.selected.clear();
    }

    /// Leaves selection mode, dropping the set.
    pub fn cancel(&mut self) {
        self.mode = SelectionMode::Browsing;
        self.selected.clear();
    }

    /// Flips one session. Ignored while browsing.
    ///
    /// Returns whether the session is selected afterwards.
    pub fn toggle_item(&mut self, session_id: &str) -> bool {
        if self.mode == SelectionMode::Browsing {
            return false;
        }
        if !self.selected.remove(session_id) {
            self.selected.insert(session_id.to_string());
            return true;
        }
        false
    }

    /// Deselects the whole group when every member is selected, otherwise
    /// selects every member. Ignored while browsing or for an empty group.
    pub fn toggle_group<S: AsRef<str>>(&mut self, group_ids: &[S]) {
        if self.mode == SelectionMode::Browsing || group_ids.is_empty() {
            return;
        }
        let all_selected = group_ids
            .iter()
            .all(|id| self.selected.contains(id.as_ref()));
        for id in group_ids {
            if all_selected {
                self.selected.remove(id.as_ref());
            } else {
                self.selected.insert(id.as_ref().to_string());
            }
        }
    }

    /// Selects every displayed session, or none when all already are.
    pub fn toggle_all<S: AsRef<str>>(&mut self, all_ids: &[S]) {
        if self.mode == SelectionMode::Browsing {
            return;
        }
        if self.selected.len() == all_ids.len() {
            self.selected.clear();
        } else {
            self.selected = all_ids.iter().map(|id| id.as_ref().to_string()).collect();
        }
    }

    /// Records a deletion to be confirmed. Nothing is removed yet.
    ///
    /// Returns `None` when there is nothing to delete.
    pub fn request_delete<I, S>(&mut self, scope: DeleteScope, session_ids: I) -> Option<&DeleteRequest>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let session_ids: BTreeSet<String> = session_ids.into_iter().map(Into::into).collect();
        if session_ids.is_empty() {
            return None;
        }
        self.pending = Some(DeleteRequest { scope, session_ids });
        self.pending.as_ref()
    }

    /// Requests deletion of the current selection.
    pub fn request_bulk_delete(&mut self) -> Option<&DeleteRequest> {
        let ids = self.selected.clone();
        self.request_delete(DeleteScope::BulkSelection, ids)
    }

    /// Hands the pending request to the caller for execution.
    pub fn take_pending(&mut self) -> Option<DeleteRequest> {
        self.pending.take()
    }

    /// Puts back a request whose execution failed, so it can be retried.
    pub fn restore_pending(&mut self, request: DeleteRequest) {
        self.pending = Some(request);
    }

    pub fn cancel_delete(&mut self) {
        self.pending = None;
    }

    /// Applies a successful deletion.
    ///
    /// Removes the deleted ids from the selection and leaves selection mode
    /// when nothing is displayed any more.
    pub fn complete_delete(&mut self, deleted: &BTreeSet<String>, remaining_displayed: usize) {
        self.selected.retain(|id| !deleted.contains(id));
        if remaining_displayed == 0 {
            self.cancel();
        }
    }

    /// Drops selected ids that are no longer displayed.
    pub fn retain_displayed<S: AsRef<str>>(&mut self, displayed: &[S]) {
        let displayed: BTreeSet<&str> = displayed.iter().map(|id| id.as_ref()).collect();
        self.selected.retain(|id| displayed.contains(id.as_str()));
    }
}
