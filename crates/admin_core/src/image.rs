use base64::{engine::general_purpose::STANDARD, Engine as _};
use shared::domain::ImageRef;

use crate::error::ValidationError;

/// An image the user picked locally, before any network call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl LocalFile {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Checks the constraints the media host is never asked to enforce: the file
/// must declare an image content type and fit the configured size limit.
pub fn validate_image(file: &LocalFile, max_bytes: u64) -> Result<(), ValidationError> {
    if !file.content_type.starts_with("image/") {
        return Err(ValidationError::NotAnImage {
            filename: file.filename.clone(),
            content_type: file.content_type.clone(),
        });
    }
    if file.size() > max_bytes {
        return Err(ValidationError::ImageTooLarge {
            filename: file.filename.clone(),
            size: file.size(),
            limit: max_bytes,
        });
    }
    Ok(())
}

fn preview_data_url(file: &LocalFile) -> String {
    format!(
        "data:{};base64,{}",
        file.content_type,
        STANDARD.encode(&file.bytes)
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingUpload {
    file: LocalFile,
    preview: String,
}

/// The single authoritative "current image" of a form session.
///
/// `committed` is the pair confirmed persisted on the media host; `pending`
/// is the tentative local value shown while an upload is unresolved. The
/// transitions below are the only way either side changes, which keeps the
/// URL and its delete identifier from ever drifting apart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageSlot {
    committed: Option<ImageRef>,
    pending: Option<PendingUpload>,
}

impl ImageSlot {
    pub fn from_committed(committed: Option<ImageRef>) -> Self {
        Self {
            committed,
            pending: None,
        }
    }

    /// Stages a freshly picked file and returns its optimistic preview.
    pub fn set_pending(&mut self, file: LocalFile) -> String {
        let preview = preview_data_url(&file);
        self.pending = Some(PendingUpload {
            file,
            preview: preview.clone(),
        });
        preview
    }

    /// Promotes an upload result to the committed value, dropping the
    /// pending preview. Returns the displaced previous committed pair.
    pub fn commit(&mut self, image: ImageRef) -> Option<ImageRef> {
        self.pending = None;
        self.committed.replace(image)
    }

    /// Rolls back to the previously committed value.
    pub fn discard_pending(&mut self) {
        self.pending = None;
    }

    /// Clears both halves, returning the committed pair that was dropped.
    pub fn clear(&mut self) -> Option<ImageRef> {
        self.pending = None;
        self.committed.take()
    }

    pub fn committed(&self) -> Option<&ImageRef> {
        self.committed.as_ref()
    }

    pub fn pending_file(&self) -> Option<&LocalFile> {
        self.pending.as_ref().map(|p| &p.file)
    }

    /// What the UI should render right now: a pending preview wins over the
    /// committed URL.
    pub fn display_url(&self) -> Option<&str> {
        self.pending
            .as_ref()
            .map(|p| p.preview.as_str())
            .or_else(|| self.committed.as_ref().map(|c| c.url.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::AssetId;

    fn png(bytes: &[u8]) -> LocalFile {
        LocalFile {
            filename: "avatar.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: bytes.to_vec(),
        }
    }

    fn image_ref(id: &str) -> ImageRef {
        ImageRef {
            url: format!("https://media.test/{id}.png"),
            public_id: AssetId::from(id),
        }
    }

    #[test]
    fn rejects_non_image_content_types() {
        let file = LocalFile {
            filename: "notes.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            bytes: vec![1, 2, 3],
        };
        assert_eq!(
            validate_image(&file, 1024),
            Err(ValidationError::NotAnImage {
                filename: "notes.pdf".to_string(),
                content_type: "application/pdf".to_string(),
            })
        );
    }

    #[test]
    fn rejects_files_over_the_limit() {
        let file = png(&[0u8; 10]);
        assert!(matches!(
            validate_image(&file, 9),
            Err(ValidationError::ImageTooLarge { size: 10, limit: 9, .. })
        ));
        assert_eq!(validate_image(&file, 10), Ok(()));
    }

    #[test]
    fn pending_preview_is_a_data_url_and_wins_over_committed() {
        let mut slot = ImageSlot::from_committed(Some(image_ref("old")));
        assert_eq!(slot.display_url(), Some("https://media.test/old.png"));

        let preview = slot.set_pending(png(b"abc"));
        assert_eq!(preview, "data:image/png;base64,YWJj");
        assert_eq!(slot.display_url(), Some(preview.as_str()));
        // Staging never touches the committed pair.
        assert_eq!(slot.committed(), Some(&image_ref("old")));
    }

    #[test]
    fn commit_displaces_the_previous_pair() {
        let mut slot = ImageSlot::from_committed(Some(image_ref("old")));
        slot.set_pending(png(b"abc"));

        let displaced = slot.commit(image_ref("new"));
        assert_eq!(displaced, Some(image_ref("old")));
        assert_eq!(slot.committed(), Some(&image_ref("new")));
        assert!(slot.pending_file().is_none());
    }

    #[test]
    fn discard_rolls_back_to_committed() {
        let mut slot = ImageSlot::from_committed(Some(image_ref("old")));
        slot.set_pending(png(b"abc"));
        slot.discard_pending();
        assert_eq!(slot.display_url(), Some("https://media.test/old.png"));
    }

    #[test]
    fn clear_drops_both_halves_together() {
        let mut slot = ImageSlot::from_committed(Some(image_ref("old")));
        slot.set_pending(png(b"abc"));
        assert_eq!(slot.clear(), Some(image_ref("old")));
        assert_eq!(slot.display_url(), None);
    }
}
