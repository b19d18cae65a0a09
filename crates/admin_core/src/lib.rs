pub mod config;
pub mod error;
pub mod form;
pub mod image;
pub mod list;
pub mod media;
pub mod users;

pub use config::{load_settings, Settings};
pub use error::{FormError, GatewayError, UploadError, ValidationError};
pub use form::{FormController, FormEvent, FormMode, FormPhase, FormSnapshot, UserDraft};
pub use image::{ImageSlot, LocalFile};
pub use list::{DeleteDialog, ListController, ListSnapshot};
pub use media::{HttpMediaGateway, MediaGateway};
pub use users::{HttpUserGateway, UserGateway};
