use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::AssetId;

/// Create/update body for a user. Server-assigned fields (id, timestamps)
/// never appear here, and the password is carried only when the caller set
/// one: an omitted password on update leaves the stored password unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub phone_number: u64,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_public_id: Option<AssetId>,
}

/// Acknowledgement body returned by `POST /users`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserAck {
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Successful upload response from the media host.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedAsset {
    pub url: String,
    pub public_id: AssetId,
}
