use std::{collections::HashMap, fs};

use anyhow::Context;
use serde::Deserialize;
use tracing::warn;
use url::Url;

use crate::{media::HttpMediaGateway, users::HttpUserGateway};

pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// Base URL of the admin REST API; `/users` hangs off this.
    pub api_url: String,
    /// Base URL of the external media host.
    pub media_url: String,
    /// Largest image accepted for upload, in bytes.
    pub max_image_bytes: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3000/taskflow-pro".into(),
            media_url: "http://localhost:3000/media".into(),
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}

/// Loads settings from an optional `admin.toml` in the working directory,
/// then applies environment overrides. Unknown file keys are ignored.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("admin.toml") {
        apply_file_settings(&mut settings, &raw);
    }

    if let Ok(v) = std::env::var("API_URL") {
        settings.api_url = v;
    }
    if let Ok(v) = std::env::var("APP__API_URL") {
        settings.api_url = v;
    }

    if let Ok(v) = std::env::var("MEDIA_URL") {
        settings.media_url = v;
    }
    if let Ok(v) = std::env::var("APP__MEDIA_URL") {
        settings.media_url = v;
    }

    if let Ok(v) = std::env::var("APP__MAX_IMAGE_BYTES") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.max_image_bytes = parsed,
            Err(err) => warn!(value = %v, "ignoring APP__MAX_IMAGE_BYTES: {err}"),
        }
    }

    settings
}

fn apply_file_settings(settings: &mut Settings, raw: &str) {
    let file_cfg = match toml::from_str::<HashMap<String, String>>(raw) {
        Ok(cfg) => cfg,
        Err(err) => {
            warn!("ignoring malformed admin.toml: {err}");
            return;
        }
    };
    if let Some(v) = file_cfg.get("api_url") {
        settings.api_url = v.clone();
    }
    if let Some(v) = file_cfg.get("media_url") {
        settings.media_url = v.clone();
    }
    if let Some(v) = file_cfg.get("max_image_bytes") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.max_image_bytes = parsed,
            Err(err) => warn!(value = %v, "ignoring max_image_bytes: {err}"),
        }
    }
}

/// Validates a configured base URL and strips any trailing slashes so path
/// joins stay predictable.
pub fn prepare_base_url(raw: &str) -> anyhow::Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed =
        Url::parse(trimmed).with_context(|| format!("invalid base url '{raw}'"))?;
    match parsed.scheme() {
        "http" | "https" => Ok(trimmed.to_string()),
        other => anyhow::bail!("unsupported base url scheme '{other}' in '{raw}'"),
    }
}

impl Settings {
    /// Builds both HTTP gateways from validated base URLs.
    pub fn build_gateways(&self) -> anyhow::Result<(HttpUserGateway, HttpMediaGateway)> {
        let api_url = prepare_base_url(&self.api_url)?;
        let media_url = prepare_base_url(&self.media_url)?;
        Ok((
            HttpUserGateway::new(api_url),
            HttpMediaGateway::new(media_url),
        ))
    }
}
