//! Preview cookie handling.
//!
//! The viewer's preview data travels in a single cookie holding URL-safe
//! base64 of its JSON followed by a keyed BLAKE3 hash of that payload:
//! `<payload>.<mac>`. Only cookies whose hash matches the server's key are
//! read; anything else is treated as absent.

use std::fmt;

use axum::http::{header::COOKIE, HeaderMap};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::Rng;

use lectern_content::PreviewData;

/// Name of the preview cookie.
pub const PREVIEW_COOKIE: &str = "lectern_preview";

const KEY_CONTEXT: &str = "lectern 2024-06 preview cookie signing key";

/// Key that signs and verifies preview cookies.
#[derive(Clone)]
pub struct PreviewKey([u8; 32]);

impl PreviewKey {
    /// Derive a key from the `preview_secret` in `site.toml`.
    pub fn from_secret(secret: &str) -> Self {
        Self(blake3::derive_key(KEY_CONTEXT, secret.as_bytes()))
    }

    /// A random key. Cookies signed with it do not survive a restart.
    pub fn generate() -> Self {
        let mut key = [0u8; 32];
        rand::thread_rng().fill(&mut key);
        Self(key)
    }

    fn mac(&self, payload: &str) -> blake3::Hash {
        blake3::keyed_hash(&self.0, payload.as_bytes())
    }
}

impl fmt::Debug for PreviewKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PreviewKey(..)")
    }
}

/// A fresh secret for `site.toml`.
pub fn generate_secret() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    blake3::Hash::from(bytes).to_hex().to_string()
}

/// Encode and sign preview data as a cookie value.
pub fn encode_preview(data: &PreviewData, key: &PreviewKey) -> Result<String, serde_json::Error> {
    let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(data)?);
    let mac = key.mac(&payload);
    Ok(format!("{}.{}", payload, mac.to_hex()))
}

/// Verify and decode a cookie value. Unsigned, tampered or malformed values
/// are treated as absent.
pub fn decode_preview(value: &str, key: &PreviewKey) -> Option<PreviewData> {
    let Some((payload, mac)) = value.trim().split_once('.') else {
        tracing::warn!("Ignoring unsigned preview cookie");
        return None;
    };

    // `Hash` equality is constant time
    match blake3::Hash::from_hex(mac) {
        Ok(mac) if mac == key.mac(payload) => {}
        _ => {
            tracing::warn!("Ignoring preview cookie with a bad signature");
            return None;
        }
    }

    let bytes = match URL_SAFE_NO_PAD.decode(payload) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("Ignoring preview cookie: {}", e);
            return None;
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(data) => Some(data),
        Err(e) => {
            tracing::warn!("Ignoring preview cookie: {}", e);
            None
        }
    }
}

/// Read the preview data from a request's `Cookie` headers.
pub fn read_preview(headers: &HeaderMap, key: &PreviewKey) -> Option<PreviewData> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == PREVIEW_COOKIE)
        .and_then(|(_, value)| decode_preview(value, key))
}

/// `Set-Cookie` value that stores preview data.
pub fn preview_cookie(
    data: &PreviewData,
    key: &PreviewKey,
    secure: bool,
) -> Result<String, serde_json::Error> {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        PREVIEW_COOKIE,
        encode_preview(data, key)?
    );
    if secure {
        cookie.push_str("; Secure");
    }
    Ok(cookie)
}

/// `Set-Cookie` value that removes the preview cookie.
pub fn clear_preview_cookie() -> String {
    format!("{}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax", PREVIEW_COOKIE)
}
