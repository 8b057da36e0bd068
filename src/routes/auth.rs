use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::{ConnectInfo, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use sqlx::SqlitePool;
use std::net::SocketAddr;

use crate::session;
use crate::state::AppState;
use crate::views::{render, LoginPage};

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// The slice of a user row needed to establish a session.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub full_name: String,
    pub role: String,
}

// ─── Routes ───

pub async fn login_page(jar: CookieJar) -> Result<Response, (StatusCode, String)> {
    let (jar, flash) = session::take_flash(jar);
    let page = render(LoginPage { flash })?;
    Ok((jar, page).into_response())
}

pub async fn login(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, (StatusCode, String)> {
    if !state.auth_rate_limiter.check(&addr.ip().to_string()) {
        return Ok((
            StatusCode::TOO_MANY_REQUESTS,
            "Too many login attempts, try again later.",
        )
            .into_response());
    }

    let user = authenticate(&state.db, form.username.trim(), &form.password)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    // Unknown username and wrong password are deliberately indistinguishable
    let Some(user) = user else {
        let jar = session::flash_error(jar, "Invalid username or password.");
        return Ok((jar, Redirect::to("/login")).into_response());
    };

    let token =
        session::create_session_token(&state.session_secret, user.id, &user.full_name, &user.role)?;
    let jar = session::with_session(jar, token);
    Ok((jar, Redirect::to("/select")).into_response())
}

pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    (session::without_session(jar), Redirect::to("/login"))
}

// ─── Credential checks ───

/// Look up a user by exact username and verify the password against the
/// stored hash. Returns None for unknown usernames and bad passwords alike.
pub async fn authenticate(
    db: &SqlitePool,
    username: &str,
    password: &str,
) -> Result<Option<AuthenticatedUser>, sqlx::Error> {
    #[derive(sqlx::FromRow)]
    struct UserRow {
        id: i64,
        password_hash: String,
        full_name: String,
        role: String,
    }

    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, password_hash, full_name, role FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(db)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    if !verify_password(&row.password_hash, password) {
        return Ok(None);
    }

    Ok(Some(AuthenticatedUser {
        id: row.id,
        full_name: row.full_name,
        role: row.role,
    }))
}

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

pub fn verify_password(stored_hash: &str, password: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::seeded_pool;

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("password").unwrap();
        assert!(verify_password(&hash, "password"));
        assert!(!verify_password(&hash, "Password"));
        assert!(!verify_password("not-a-phc-string", "password"));
    }

    #[tokio::test]
    async fn authenticate_accepts_seeded_credentials() {
        let pool = seeded_pool().await;
        let user = authenticate(&pool, "jdoe", "password").await.unwrap().unwrap();
        assert_eq!(user.full_name, "John Doe");
        assert_eq!(user.role, "instructor");

        let student = authenticate(&pool, "student", "password").await.unwrap().unwrap();
        assert_eq!(student.role, "student");
    }

    #[tokio::test]
    async fn authenticate_fails_uniformly() {
        let pool = seeded_pool().await;
        // Unknown user and wrong password produce the same outcome
        assert!(authenticate(&pool, "nobody", "password").await.unwrap().is_none());
        assert!(authenticate(&pool, "jdoe", "wrong").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn authenticate_is_case_sensitive() {
        let pool = seeded_pool().await;
        assert!(authenticate(&pool, "JDOE", "password").await.unwrap().is_none());
    }
}
