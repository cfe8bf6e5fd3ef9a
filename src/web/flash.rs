use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use serde::{Deserialize, Serialize};

use crate::auth::session::{decode_payload, encode_payload};

pub const FLASH_COOKIE: &str = "gymdesk_flash";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Warning,
    Danger,
}

impl FlashLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Info => "info",
            FlashLevel::Warning => "warning",
            FlashLevel::Danger => "danger",
        }
    }
}

/// A one-shot status message shown on the next rendered page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub text: String,
}

impl FlashMessage {
    pub fn new(level: FlashLevel, text: impl Into<String>) -> Self {
        Self { level, text: text.into() }
    }
}

/// Queue a message for the next page render.
pub fn push(jar: SignedCookieJar, level: FlashLevel, text: impl Into<String>) -> SignedCookieJar {
    let mut messages = pending(&jar);
    messages.push(FlashMessage::new(level, text));

    let cookie = Cookie::build((FLASH_COOKIE, encode_payload(&messages)))
        .path("/")
        .same_site(SameSite::Lax)
        .http_only(true)
        .build();

    jar.add(cookie)
}

/// Remove and return every queued message.
pub fn take(jar: SignedCookieJar) -> (SignedCookieJar, Vec<FlashMessage>) {
    let messages = pending(&jar);
    if messages.is_empty() {
        return (jar, messages);
    }
    (clear(jar), messages)
}

pub fn clear(jar: SignedCookieJar) -> SignedCookieJar {
    jar.remove(Cookie::build(FLASH_COOKIE).path("/").build())
}

fn pending(jar: &SignedCookieJar) -> Vec<FlashMessage> {
    jar.get(FLASH_COOKIE)
        .and_then(|cookie| decode_payload(cookie.value()))
        .unwrap_or_default()
}
