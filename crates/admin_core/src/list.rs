use std::sync::Arc;

use shared::domain::User;
use tokio::sync::Mutex;
use tracing::warn;

use crate::{error::GatewayError, media::MediaGateway, users::UserGateway};

/// Confirmation dialog for a pending delete. Stays open with an inline error
/// when the delete fails, so the user can retry.
#[derive(Debug, Clone)]
pub struct DeleteDialog {
    pub target: User,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ListSnapshot {
    pub users: Vec<User>,
    pub loading: bool,
    pub error: Option<String>,
    pub pending_delete: Option<DeleteDialog>,
}

#[derive(Default)]
struct ListState {
    users: Vec<User>,
    loading: bool,
    error: Option<String>,
    pending_delete: Option<DeleteDialog>,
}

/// Holds the collection view: a full refetch on every mutation, a loading
/// flag for UI feedback, and the delete-confirmation workflow.
pub struct ListController {
    users: Arc<dyn UserGateway>,
    media: Arc<dyn MediaGateway>,
    inner: Mutex<ListState>,
}

impl ListController {
    pub fn new(users: Arc<dyn UserGateway>, media: Arc<dyn MediaGateway>) -> Self {
        Self {
            users,
            media,
            inner: Mutex::new(ListState::default()),
        }
    }

    /// Reloads the entire collection. No pagination or filtering; every
    /// refresh fetches everything.
    pub async fn refresh(&self) -> Result<(), GatewayError> {
        {
            let mut state = self.inner.lock().await;
            state.loading = true;
            state.error = None;
        }

        let fetched = self.users.list().await;

        let mut state = self.inner.lock().await;
        state.loading = false;
        match fetched {
            Ok(users) => {
                state.users = users;
                Ok(())
            }
            Err(err) => {
                state.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    pub async fn snapshot(&self) -> ListSnapshot {
        let state = self.inner.lock().await;
        ListSnapshot {
            users: state.users.clone(),
            loading: state.loading,
            error: state.error.clone(),
            pending_delete: state.pending_delete.clone(),
        }
    }

    pub async fn request_delete(&self, target: User) {
        let mut state = self.inner.lock().await;
        state.pending_delete = Some(DeleteDialog {
            target,
            error: None,
        });
    }

    pub async fn cancel_delete(&self) {
        let mut state = self.inner.lock().await;
        state.pending_delete = None;
    }

    /// Deletes the record held by the confirmation dialog. Success closes
    /// the dialog, best-effort removes the record's profile image asset from
    /// the media host, and refreshes; failure keeps the dialog open with an
    /// inline error.
    pub async fn confirm_delete(&self) -> Result<(), GatewayError> {
        let target = {
            let state = self.inner.lock().await;
            state.pending_delete.as_ref().map(|d| d.target.clone())
        };
        let Some(target) = target else {
            return Ok(());
        };

        match self.users.delete(&target.id).await {
            Ok(()) => {
                if let Some(image) = target.profile_image() {
                    if let Err(err) = self.media.delete_asset(&image.public_id).await {
                        warn!(
                            user = %target.id,
                            asset = %image.public_id,
                            "profile image cleanup failed after user delete: {err}"
                        );
                    }
                }

                {
                    let mut state = self.inner.lock().await;
                    state.pending_delete = None;
                }
                if let Err(err) = self.refresh().await {
                    warn!(user = %target.id, "list refresh after delete failed: {err}");
                }
                Ok(())
            }
            Err(err) => {
                let mut state = self.inner.lock().await;
                if let Some(dialog) = state.pending_delete.as_mut() {
                    dialog.error = Some(err.to_string());
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/list_tests.rs"]
mod tests;
