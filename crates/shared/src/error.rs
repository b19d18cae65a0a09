use serde::{Deserialize, Serialize};

/// Error body shape the admin API and the media host both use for failed
/// requests. Not every failure carries one, so decoding is always lenient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

/// Extracts a human-readable message from a raw error response body: the
/// `message` field of a JSON error body when present, the raw text when the
/// body is non-empty, otherwise `None`.
pub fn remote_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(trimmed) {
        return Some(parsed.message);
    }
    Some(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_the_json_message_field() {
        assert_eq!(
            remote_message(r#"{"message":"email already taken"}"#),
            Some("email already taken".to_string())
        );
    }

    #[test]
    fn falls_back_to_raw_text() {
        assert_eq!(
            remote_message("Internal Server Error"),
            Some("Internal Server Error".to_string())
        );
        assert_eq!(remote_message("   "), None);
    }
}
