use axum_extra::extract::cookie::{Cookie, Key, SameSite, SignedCookieJar};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::{Digest, Sha512};

use crate::domain::Admin;

pub const SESSION_COOKIE: &str = "gymdesk_session";

/// Cookie signing and lifetime settings, built once at startup.
#[derive(Clone)]
pub struct SessionConfig {
    pub key: Key,
    pub duration: Duration,
    pub secure: bool,
}

impl SessionConfig {
    /// Without a secret a random key is used, so sessions end when the process does.
    pub fn new(secret: Option<&str>, duration_hours: i64, secure: bool) -> Self {
        let key = match secret {
            Some(secret) => derive_key(secret.as_bytes()),
            None => random_key(),
        };

        Self {
            key,
            duration: Duration::hours(duration_hours.max(1)),
            secure,
        }
    }
}

/// Stretch an arbitrary-length secret to the 64 bytes a signing key needs.
pub fn derive_key(secret: &[u8]) -> Key {
    let digest = Sha512::digest(secret);
    Key::from(digest.as_slice())
}

fn random_key() -> Key {
    use rand::RngCore;
    let mut bytes = [0u8; 64];
    rand::thread_rng().fill_bytes(&mut bytes);
    Key::from(&bytes[..])
}

/// What the signed session cookie carries for a logged-in administrator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdminSession {
    pub authenticated: bool,
    pub username: String,
    pub full_name: String,
    pub issued_at: DateTime<Utc>,
}

impl AdminSession {
    pub fn new(admin: &Admin, now: DateTime<Utc>) -> Self {
        Self {
            authenticated: true,
            username: admin.username.clone(),
            full_name: admin.full_name.clone(),
            issued_at: now,
        }
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        self.authenticated && now - self.issued_at < max_age
    }

    /// Reads the session from the jar, ignoring tampered, malformed or stale cookies.
    pub fn from_jar(jar: &SignedCookieJar, config: &SessionConfig, now: DateTime<Utc>) -> Option<Self> {
        let cookie = jar.get(SESSION_COOKIE)?;
        let session: AdminSession = decode_payload(cookie.value())?;

        session.is_valid_at(now, config.duration).then_some(session)
    }

    pub fn store(&self, jar: SignedCookieJar, config: &SessionConfig) -> SignedCookieJar {
        let value = encode_payload(self);
        let cookie = Cookie::build((SESSION_COOKIE, value))
            .path("/")
            .same_site(SameSite::Lax)
            .http_only(true)
            .secure(config.secure)
            .max_age(cookie::time::Duration::seconds(config.duration.num_seconds()))
            .build();

        jar.add(cookie)
    }

    pub fn clear(jar: SignedCookieJar) -> SignedCookieJar {
        jar.remove(Cookie::build(SESSION_COOKIE).path("/").build())
    }
}

/// base64(JSON) so cookie values never contain separators.
pub fn encode_payload<T: Serialize>(value: &T) -> String {
    // Serializing plain structs of strings and timestamps cannot fail.
    let json = serde_json::to_vec(value).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json)
}

pub fn decode_payload<T: DeserializeOwned>(raw: &str) -> Option<T> {
    let bytes = URL_SAFE_NO_PAD.decode(raw).ok()?;
    serde_json::from_slice(&bytes).ok()
}
