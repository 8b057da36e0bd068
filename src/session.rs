use axum::http::StatusCode;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

pub const SESSION_COOKIE: &str = "session";
pub const FLASH_COOKIE: &str = "flash";

const SESSION_HOURS: i64 = 12;

// ─── Session tokens ───

/// What a signed session carries: the user id, display name and role.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: i64,
    pub full_name: String,
    pub role: String,
    pub exp: usize,
}

pub fn create_session_token(
    secret: &str,
    user_id: i64,
    full_name: &str,
    role: &str,
) -> Result<String, (StatusCode, String)> {
    let expiration = chrono::Utc::now()
        .checked_add_signed(chrono::Duration::hours(SESSION_HOURS))
        .unwrap()
        .timestamp() as usize;

    let claims = Claims {
        sub: user_id,
        full_name: full_name.to_string(),
        role: role.to_string(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Session error: {e}")))
}

pub fn decode_session_token(secret: &str, token: &str) -> Option<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .ok()
}

/// The claims of the current request's session cookie, if it carries a
/// valid one.
pub fn session_claims(secret: &str, jar: &CookieJar) -> Option<Claims> {
    let cookie = jar.get(SESSION_COOKIE)?;
    decode_session_token(secret, cookie.value())
}

pub fn with_session(jar: CookieJar, token: String) -> CookieJar {
    jar.add(
        Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax),
    )
}

pub fn without_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

// ─── Flash messages ───
// One-shot messages shown on the next rendered page. They travel in a
// short-lived cookie as base64 JSON and are removed when read.

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub message: String,
    pub kind: String,
}

pub fn flash_success(jar: CookieJar, message: impl Into<String>) -> CookieJar {
    set_flash(jar, message.into(), "success")
}

pub fn flash_error(jar: CookieJar, message: impl Into<String>) -> CookieJar {
    set_flash(jar, message.into(), "error")
}

fn set_flash(jar: CookieJar, message: String, kind: &str) -> CookieJar {
    let flash = Flash {
        message,
        kind: kind.to_string(),
    };
    jar.add(
        Cookie::build((FLASH_COOKIE, encode_flash(&flash)))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax),
    )
}

/// Read and clear the pending flash message. A malformed cookie yields no
/// flash rather than an error.
pub fn take_flash(jar: CookieJar) -> (CookieJar, Option<Flash>) {
    let flash = jar
        .get(FLASH_COOKIE)
        .and_then(|cookie| decode_flash(cookie.value()));
    let jar = jar.remove(Cookie::build(FLASH_COOKIE).path("/"));
    (jar, flash)
}

fn encode_flash(flash: &Flash) -> String {
    let json = serde_json::to_string(flash).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json.as_bytes())
}

fn decode_flash(encoded: &str) -> Option<Flash> {
    let bytes = URL_SAFE_NO_PAD.decode(encoded).ok()?;
    serde_json::from_slice(&bytes).ok()
}
