use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;

use crate::session;
use crate::state::AppState;
use crate::views::{render, RoleSelectPage};

pub async fn index(State(state): State<AppState>, jar: CookieJar) -> Redirect {
    if session::session_claims(&state.session_secret, &jar).is_some() {
        Redirect::to("/select")
    } else {
        Redirect::to("/login")
    }
}

pub async fn role_select(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, (StatusCode, String)> {
    let Some(claims) = session::session_claims(&state.session_secret, &jar) else {
        return Ok(Redirect::to("/login").into_response());
    };

    let (jar, flash) = session::take_flash(jar);
    let page = render(RoleSelectPage {
        full_name: claims.full_name,
        role: claims.role,
        flash,
    })?;
    Ok((jar, page).into_response())
}
