use std::sync::Arc;

use shared::{
    domain::{AssetId, ImageRef, User, UserId},
    protocol::UserPayload,
};
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};

use crate::{
    error::{FormError, ValidationError},
    image::{validate_image, ImageSlot, LocalFile},
    media::MediaGateway,
    users::UserGateway,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit { id: UserId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    Idle,
    Editing,
    UploadingImage,
    Submitting,
}

/// The editable fields of one form session. The password is blank unless the
/// user typed one this session; a blank password is never sent on update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDraft {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub phone_number: u64,
    pub is_active: bool,
}

impl Default for UserDraft {
    fn default() -> Self {
        Self {
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            password: String::new(),
            phone_number: 0,
            is_active: true,
        }
    }
}

#[derive(Debug, Clone)]
pub enum FormEvent {
    /// A create or update was persisted; listeners should refresh the list.
    /// Carries the record id when known (updates only; the create ack does
    /// not return one).
    Saved { id: Option<UserId> },
    Closed,
}

/// Read-only copy of the form for rendering.
#[derive(Debug, Clone)]
pub struct FormSnapshot {
    pub phase: FormPhase,
    pub mode: Option<FormMode>,
    pub draft: UserDraft,
    /// Pending preview when an upload is unresolved, else the committed URL.
    pub image_url: Option<String>,
    pub error: Option<String>,
}

struct FormState {
    phase: FormPhase,
    mode: Option<FormMode>,
    draft: UserDraft,
    image: ImageSlot,
    error: Option<String>,
}

impl FormState {
    fn closed() -> Self {
        Self {
            phase: FormPhase::Idle,
            mode: None,
            draft: UserDraft::default(),
            image: ImageSlot::default(),
            error: None,
        }
    }
}

/// Orchestrates one create/edit session: field capture, the image
/// replacement protocol, and the final submit. Upload and submit are
/// mutually exclusive within a session; the phase guards enforce that even
/// when calls race.
pub struct FormController {
    users: Arc<dyn UserGateway>,
    media: Arc<dyn MediaGateway>,
    max_image_bytes: u64,
    inner: Mutex<FormState>,
    events: broadcast::Sender<FormEvent>,
}

impl FormController {
    pub fn new(
        users: Arc<dyn UserGateway>,
        media: Arc<dyn MediaGateway>,
        max_image_bytes: u64,
    ) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            users,
            media,
            max_image_bytes,
            inner: Mutex::new(FormState::closed()),
            events,
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<FormEvent> {
        self.events.subscribe()
    }

    pub async fn open_create(&self) {
        let mut state = self.inner.lock().await;
        *state = FormState::closed();
        state.phase = FormPhase::Editing;
        state.mode = Some(FormMode::Create);
    }

    /// Opens in edit mode with every field preloaded from the record. The
    /// password field always starts blank, even here.
    pub async fn open_edit(&self, user: &User) {
        let mut state = self.inner.lock().await;
        *state = FormState::closed();
        state.phase = FormPhase::Editing;
        state.mode = Some(FormMode::Edit {
            id: user.id.clone(),
        });
        state.draft = UserDraft {
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            password: String::new(),
            phone_number: user.phone_number,
            is_active: user.is_active,
        };
        state.image = ImageSlot::from_committed(user.profile_image());
    }

    /// Replaces the editable fields with what the user has typed so far.
    pub async fn set_draft(&self, draft: UserDraft) -> Result<(), FormError> {
        let mut state = self.inner.lock().await;
        self.guard_editing(&state)?;
        state.draft = draft;
        Ok(())
    }

    pub async fn snapshot(&self) -> FormSnapshot {
        let state = self.inner.lock().await;
        FormSnapshot {
            phase: state.phase,
            mode: state.mode.clone(),
            draft: state.draft.clone(),
            image_url: state.image.display_url().map(str::to_string),
            error: state.error.clone(),
        }
    }

    /// The image replacement protocol: validate locally, stage an optimistic
    /// preview, upload, best-effort delete the displaced asset, then commit
    /// the new pair. On upload failure the preview is rolled back and the
    /// previously committed image stays untouched.
    pub async fn attach_image(&self, file: LocalFile) -> Result<(), FormError> {
        {
            let mut state = self.inner.lock().await;
            self.guard_editing(&state)?;
            if let Err(err) = validate_image(&file, self.max_image_bytes) {
                state.error = Some(err.to_string());
                return Err(err.into());
            }
            state.image.set_pending(file.clone());
            state.phase = FormPhase::UploadingImage;
            state.error = None;
        }

        match self.media.upload(&file).await {
            Ok(asset) => {
                let displaced = {
                    let state = self.inner.lock().await;
                    state.image.committed().cloned()
                };
                if let Some(old) = displaced {
                    self.best_effort_delete_asset(&old.public_id).await;
                }

                let mut state = self.inner.lock().await;
                state.image.commit(ImageRef {
                    url: asset.url,
                    public_id: asset.public_id,
                });
                state.phase = FormPhase::Editing;
                Ok(())
            }
            Err(err) => {
                let mut state = self.inner.lock().await;
                state.image.discard_pending();
                state.phase = FormPhase::Editing;
                state.error = Some(err.to_string());
                Err(err.into())
            }
        }
    }

    /// Drops any staged file; if an asset is committed, best-effort deletes
    /// it remotely and clears the url/id pair locally. The cleared state is
    /// only persisted when the form is submitted.
    pub async fn remove_image(&self) -> Result<(), FormError> {
        let committed = {
            let mut state = self.inner.lock().await;
            self.guard_editing(&state)?;
            state.image.discard_pending();
            state.image.committed().cloned()
        };

        if let Some(old) = committed {
            self.best_effort_delete_asset(&old.public_id).await;
            let mut state = self.inner.lock().await;
            state.image.clear();
        }
        Ok(())
    }

    /// Assembles the full payload and persists it via create or update by
    /// mode. Success resets and closes the form and emits
    /// [`FormEvent::Saved`]; failure keeps the session open with the draft
    /// intact so the user can retry.
    pub async fn submit(&self) -> Result<(), FormError> {
        let (mode, payload) = {
            let mut state = self.inner.lock().await;
            self.guard_editing(&state)?;
            let mode = state.mode.clone().ok_or(FormError::NotOpen)?;
            if let Err(err) = validate_draft(&state.draft, &mode) {
                state.error = Some(err.to_string());
                return Err(err.into());
            }
            let payload = build_payload(&state.draft, state.image.committed());
            state.phase = FormPhase::Submitting;
            state.error = None;
            (mode, payload)
        };

        let result = match &mode {
            FormMode::Create => self.users.create(&payload).await.map(|_| None),
            FormMode::Edit { id } => self
                .users
                .update(id, &payload)
                .await
                .map(|()| Some(id.clone())),
        };

        let mut state = self.inner.lock().await;
        match result {
            Ok(id) => {
                info!(email = %payload.email, "user saved");
                *state = FormState::closed();
                let _ = self.events.send(FormEvent::Saved { id });
                Ok(())
            }
            Err(err) => {
                state.phase = FormPhase::Editing;
                state.error = Some(err.to_string());
                Err(err.into())
            }
        }
    }

    /// Discards the session and returns to idle.
    pub async fn close(&self) {
        let mut state = self.inner.lock().await;
        *state = FormState::closed();
        let _ = self.events.send(FormEvent::Closed);
    }

    fn guard_editing(&self, state: &FormState) -> Result<(), FormError> {
        match state.phase {
            FormPhase::Idle => Err(FormError::NotOpen),
            FormPhase::UploadingImage => Err(FormError::UploadInFlight),
            FormPhase::Submitting => Err(FormError::SubmitInFlight),
            FormPhase::Editing => Ok(()),
        }
    }

    async fn best_effort_delete_asset(&self, public_id: &AssetId) {
        if let Err(err) = self.media.delete_asset(public_id).await {
            warn!(asset = %public_id, "media asset delete failed: {err}");
        }
    }
}

fn validate_draft(draft: &UserDraft, mode: &FormMode) -> Result<(), ValidationError> {
    if draft.email.trim().is_empty() {
        return Err(ValidationError::missing("email"));
    }
    if draft.first_name.trim().is_empty() {
        return Err(ValidationError::missing("first name"));
    }
    if draft.last_name.trim().is_empty() {
        return Err(ValidationError::missing("last name"));
    }
    if matches!(mode, FormMode::Create) && draft.password.is_empty() {
        return Err(ValidationError::missing("password"));
    }
    Ok(())
}

fn build_payload(draft: &UserDraft, image: Option<&ImageRef>) -> UserPayload {
    UserPayload {
        email: draft.email.clone(),
        first_name: draft.first_name.clone(),
        last_name: draft.last_name.clone(),
        password: if draft.password.is_empty() {
            None
        } else {
            Some(draft.password.clone())
        },
        phone_number: draft.phone_number,
        is_active: draft.is_active,
        profile_image_url: image.map(|i| i.url.clone()),
        profile_image_public_id: image.map(|i| i.public_id.clone()),
    }
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
