//! Webhook key generation.
//!
//! A webhook key is the credential embedded in the ingestion URL. Keys are `whk_` followed by 32
//! random bytes in URL-safe base64 without padding, so they are safe as a single path segment.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::prelude::RngExt;
use rand::rng;

/// Prefix for webhook keys.
pub const KEY_PREFIX: &str = "whk_";

/// Generate a new webhook key.
pub fn generate_webhook_key() -> String {
    let mut key_bytes = [0u8; 32];
    rng().fill(&mut key_bytes);

    format!("{KEY_PREFIX}{}", URL_SAFE_NO_PAD.encode(key_bytes))
}

/// Only the first few characters, for logs and list views
pub fn redact_key(key: &str) -> String {
    let visible: String = key.chars().take(KEY_PREFIX.len() + 4).collect();
    format!("{visible}…")
}
