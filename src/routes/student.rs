use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use sqlx::SqlitePool;

use crate::models::{Department, DirectoryEntry};
use crate::session;
use crate::state::AppState;
use crate::views::{render, DepartmentDetailPage, StudentDashboardPage};

// ─── Routes ───

pub async fn student_dashboard(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, (StatusCode, String)> {
    if session::session_claims(&state.session_secret, &jar).is_none() {
        return Ok(Redirect::to("/login").into_response());
    }

    let departments = list_departments(&state.db)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    let (jar, flash) = session::take_flash(jar);
    let page = render(StudentDashboardPage { departments, flash })?;
    Ok((jar, page).into_response())
}

pub async fn department_detail(
    State(state): State<AppState>,
    Path(dept_id): Path<i64>,
    jar: CookieJar,
) -> Result<Response, (StatusCode, String)> {
    if session::session_claims(&state.session_secret, &jar).is_none() {
        return Ok(Redirect::to("/login").into_response());
    }

    let dept = department(&state.db, dept_id)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    let Some(department) = dept else {
        let jar = session::flash_error(jar, "Department not found.");
        return Ok((jar, Redirect::to("/student")).into_response());
    };

    let instructors = department_instructors(&state.db, dept_id)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    let (jar, flash) = session::take_flash(jar);
    let page = render(DepartmentDetailPage {
        department,
        instructors,
        flash,
    })?;
    Ok((jar, page).into_response())
}

// ─── Queries ───

pub async fn list_departments(db: &SqlitePool) -> Result<Vec<Department>, sqlx::Error> {
    sqlx::query_as("SELECT id, name, code FROM departments ORDER BY name")
        .fetch_all(db)
        .await
}

pub async fn department(db: &SqlitePool, dept_id: i64) -> Result<Option<Department>, sqlx::Error> {
    sqlx::query_as("SELECT id, name, code FROM departments WHERE id = ?")
        .bind(dept_id)
        .fetch_optional(db)
        .await
}

pub async fn department_instructors(
    db: &SqlitePool,
    dept_id: i64,
) -> Result<Vec<DirectoryEntry>, sqlx::Error> {
    sqlx::query_as(
        "SELECT i.id, u.full_name, i.status
         FROM instructors i
         JOIN users u ON u.id = i.user_id
         WHERE i.department_id = ?
         ORDER BY u.full_name",
    )
    .bind(dept_id)
    .fetch_all(db)
    .await
}
