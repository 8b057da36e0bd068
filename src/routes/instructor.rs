use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::db::now_timestamp;
use crate::models::{ActivityEntry, InstructorProfile, Role, Schedule, ScheduleType, Status};
use crate::session::{self, Claims};
use crate::state::AppState;
use crate::views::{render, InstructorDashboardPage};

/// The dashboard shows at most this many activity entries.
const ACTIVITY_LIMIT: i64 = 20;

#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ScheduleForm {
    pub schedule_type: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub reason: Option<String>,
}

/// Session plus role gate for the instructor-only routes. Students get a
/// uniform "Access denied." and land back on the role selection page.
fn require_instructor(state: &AppState, jar: CookieJar) -> Result<(CookieJar, Claims), Response> {
    let Some(claims) = session::session_claims(&state.session_secret, &jar) else {
        return Err(Redirect::to("/login").into_response());
    };
    if Role::parse(&claims.role) != Some(Role::Instructor) {
        let jar = session::flash_error(jar, "Access denied.");
        return Err((jar, Redirect::to("/select")).into_response());
    }
    Ok((jar, claims))
}

// ─── Routes ───

pub async fn dashboard(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, (StatusCode, String)> {
    let (jar, claims) = match require_instructor(&state, jar) {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };

    let profile = load_profile(&state.db, claims.sub)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    let Some(profile) = profile else {
        let jar = session::flash_error(jar, "Instructor profile not found.");
        return Ok((jar, Redirect::to("/select")).into_response());
    };

    let schedules = list_schedules(&state.db, profile.id)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;
    let logs = recent_activity(&state.db, profile.id)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    let (jar, flash) = session::take_flash(jar);
    let page = render(InstructorDashboardPage {
        profile,
        schedules,
        logs,
        flash,
    })?;
    Ok((jar, page).into_response())
}

pub async fn update_status(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<StatusForm>,
) -> Result<Response, (StatusCode, String)> {
    let (jar, claims) = match require_instructor(&state, jar) {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };

    let Some(new_status) = form.status.as_deref().and_then(Status::parse) else {
        let jar = session::flash_error(jar, "Invalid status.");
        return Ok((jar, Redirect::to("/instructor")).into_response());
    };

    let profile = load_profile(&state.db, claims.sub)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;
    let Some(profile) = profile else {
        let jar = session::flash_error(jar, "Instructor profile not found.");
        return Ok((jar, Redirect::to("/select")).into_response());
    };

    change_status(&state.db, profile.id, new_status)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    let jar = session::flash_success(jar, format!("Status updated to {new_status}."));
    Ok((jar, Redirect::to("/instructor")).into_response())
}

pub async fn add_schedule(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<ScheduleForm>,
) -> Result<Response, (StatusCode, String)> {
    let (jar, claims) = match require_instructor(&state, jar) {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };

    let Some(kind) = form.schedule_type.as_deref().and_then(ScheduleType::parse) else {
        let jar = session::flash_error(jar, "Invalid schedule type.");
        return Ok((jar, Redirect::to("/instructor")).into_response());
    };

    let start_date = form.start_date.unwrap_or_default();
    let end_date = form.end_date.unwrap_or_default();
    if start_date.is_empty() || end_date.is_empty() {
        let jar = session::flash_error(jar, "Start and end dates are required.");
        return Ok((jar, Redirect::to("/instructor")).into_response());
    }
    let reason = form.reason.as_deref().unwrap_or("").trim().to_string();

    let profile = load_profile(&state.db, claims.sub)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;
    let Some(profile) = profile else {
        let jar = session::flash_error(jar, "Instructor profile not found.");
        return Ok((jar, Redirect::to("/select")).into_response());
    };

    schedule_absence(&state.db, profile.id, kind, &start_date, &end_date, &reason)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    let jar = session::flash_success(jar, format!("{} scheduled successfully.", kind.label()));
    Ok((jar, Redirect::to("/instructor")).into_response())
}

// ─── Queries ───

/// The instructor row owned by a user, joined with display name and
/// department. None when the user has no instructor row.
pub async fn load_profile(
    db: &SqlitePool,
    user_id: i64,
) -> Result<Option<InstructorProfile>, sqlx::Error> {
    sqlx::query_as(
        "SELECT i.id, u.full_name, d.name AS dept_name, i.status
         FROM instructors i
         JOIN users u ON u.id = i.user_id
         JOIN departments d ON d.id = i.department_id
         WHERE i.user_id = ?",
    )
    .bind(user_id)
    .fetch_optional(db)
    .await
}

pub async fn list_schedules(
    db: &SqlitePool,
    instructor_id: i64,
) -> Result<Vec<Schedule>, sqlx::Error> {
    sqlx::query_as(
        "SELECT schedule_type, start_date, end_date, reason, created_at
         FROM schedules
         WHERE instructor_id = ?
         ORDER BY start_date DESC, id DESC",
    )
    .bind(instructor_id)
    .fetch_all(db)
    .await
}

pub async fn recent_activity(
    db: &SqlitePool,
    instructor_id: i64,
) -> Result<Vec<ActivityEntry>, sqlx::Error> {
    sqlx::query_as(
        "SELECT action, details, timestamp
         FROM activity_log
         WHERE instructor_id = ?
         ORDER BY timestamp DESC, id DESC
         LIMIT ?",
    )
    .bind(instructor_id)
    .bind(ACTIVITY_LIMIT)
    .fetch_all(db)
    .await
}

// ─── Domain operations ───

/// Overwrite the instructor's status and record the transition. Both writes
/// commit together or not at all.
pub async fn change_status(
    db: &SqlitePool,
    instructor_id: i64,
    new_status: Status,
) -> Result<(), sqlx::Error> {
    let mut tx = db.begin().await?;

    let old_status: String = sqlx::query_scalar("SELECT status FROM instructors WHERE id = ?")
        .bind(instructor_id)
        .fetch_one(&mut *tx)
        .await?;

    sqlx::query("UPDATE instructors SET status = ? WHERE id = ?")
        .bind(new_status.as_str())
        .bind(instructor_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        "INSERT INTO activity_log (instructor_id, action, details, timestamp) VALUES (?, 'Status changed', ?, ?)",
    )
    .bind(instructor_id)
    .bind(format!("Changed from {old_status} to {new_status}"))
    .bind(now_timestamp())
    .execute(&mut *tx)
    .await?;

    tx.commit().await
}

/// Record a planned absence: insert the schedule row, overwrite the status
/// with the derived one (last write wins) and append an activity entry, as
/// one transaction.
pub async fn schedule_absence(
    db: &SqlitePool,
    instructor_id: i64,
    kind: ScheduleType,
    start_date: &str,
    end_date: &str,
    reason: &str,
) -> Result<(), sqlx::Error> {
    let mut tx = db.begin().await?;

    sqlx::query(
        "INSERT INTO schedules (instructor_id, schedule_type, start_date, end_date, reason, created_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(instructor_id)
    .bind(kind.as_str())
    .bind(start_date)
    .bind(end_date)
    .bind(reason)
    .bind(now_timestamp())
    .execute(&mut *tx)
    .await?;

    sqlx::query("UPDATE instructors SET status = ? WHERE id = ?")
        .bind(kind.resulting_status().as_str())
        .bind(instructor_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        "INSERT INTO activity_log (instructor_id, action, details, timestamp) VALUES (?, ?, ?, ?)",
    )
    .bind(instructor_id)
    .bind(format!("Scheduled {}", kind.as_str()))
    .bind(format!("{} from {start_date} to {end_date}: {reason}", kind.label()))
    .bind(now_timestamp())
    .execute(&mut *tx)
    .await?;

    tx.commit().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::seeded_pool;

    async fn instructor_id(pool: &SqlitePool, username: &str) -> i64 {
        sqlx::query_scalar(
            "SELECT i.id FROM instructors i JOIN users u ON u.id = i.user_id WHERE u.username = ?",
        )
        .bind(username)
        .fetch_one(pool)
        .await
        .unwrap()
    }

    async fn user_id(pool: &SqlitePool, username: &str) -> i64 {
        sqlx::query_scalar("SELECT id FROM users WHERE username = ?")
            .bind(username)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    async fn current_status(pool: &SqlitePool, instructor_id: i64) -> String {
        sqlx::query_scalar("SELECT status FROM instructors WHERE id = ?")
            .bind(instructor_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    async fn log_count(pool: &SqlitePool, instructor_id: i64) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM activity_log WHERE instructor_id = ?")
            .bind(instructor_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn profile_joins_user_and_department() {
        let pool = seeded_pool().await;
        let uid = user_id(&pool, "jdoe").await;
        let profile = load_profile(&pool, uid).await.unwrap().unwrap();
        assert_eq!(profile.full_name, "John Doe");
        assert_eq!(profile.dept_name, "College of Computing Studies");
        assert_eq!(profile.status, "In");
    }

    #[tokio::test]
    async fn student_has_no_profile() {
        let pool = seeded_pool().await;
        let uid = user_id(&pool, "student").await;
        assert!(load_profile(&pool, uid).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn change_status_updates_row_and_appends_log() {
        let pool = seeded_pool().await;
        let id = instructor_id(&pool, "jdoe").await;
        let before = log_count(&pool, id).await;

        change_status(&pool, id, Status::Out).await.unwrap();

        assert_eq!(current_status(&pool, id).await, "Out");
        assert_eq!(log_count(&pool, id).await, before + 1);

        let logs = recent_activity(&pool, id).await.unwrap();
        assert_eq!(logs[0].action, "Status changed");
        assert_eq!(logs[0].details.as_deref(), Some("Changed from In to Out"));
    }

    #[tokio::test]
    async fn schedule_absence_bundles_three_writes() {
        let pool = seeded_pool().await;
        let id = instructor_id(&pool, "jdoe").await;

        schedule_absence(
            &pool,
            id,
            ScheduleType::Leave,
            "2026-03-01",
            "2026-03-05",
            "Personal leave",
        )
        .await
        .unwrap();

        assert_eq!(current_status(&pool, id).await, "On Leave");

        let schedules = list_schedules(&pool, id).await.unwrap();
        assert_eq!(schedules.len(), 1);
        assert_eq!(schedules[0].schedule_type, "leave");
        assert_eq!(schedules[0].reason.as_deref(), Some("Personal leave"));

        let logs = recent_activity(&pool, id).await.unwrap();
        assert_eq!(logs[0].action, "Scheduled leave");
        assert_eq!(
            logs[0].details.as_deref(),
            Some("Leave from 2026-03-01 to 2026-03-05: Personal leave")
        );
    }

    #[tokio::test]
    async fn travel_schedule_sets_on_travel() {
        let pool = seeded_pool().await;
        let id = instructor_id(&pool, "jdoe").await;

        schedule_absence(&pool, id, ScheduleType::Travel, "2026-04-01", "2026-04-03", "Conference")
            .await
            .unwrap();

        assert_eq!(current_status(&pool, id).await, "On Travel");
    }

    #[tokio::test]
    async fn repeated_scheduling_is_last_write_wins() {
        let pool = seeded_pool().await;
        let id = instructor_id(&pool, "jdoe").await;

        schedule_absence(&pool, id, ScheduleType::Leave, "2026-03-01", "2026-03-05", "")
            .await
            .unwrap();
        schedule_absence(&pool, id, ScheduleType::Travel, "2026-03-02", "2026-03-04", "")
            .await
            .unwrap();

        assert_eq!(current_status(&pool, id).await, "On Travel");
        assert_eq!(list_schedules(&pool, id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn schedules_are_listed_newest_start_first() {
        let pool = seeded_pool().await;
        let id = instructor_id(&pool, "jdoe").await;

        for date in ["2026-03-01", "2026-05-01", "2026-04-01"] {
            schedule_absence(&pool, id, ScheduleType::Leave, date, "2026-06-01", "")
                .await
                .unwrap();
        }

        let schedules = list_schedules(&pool, id).await.unwrap();
        let starts: Vec<&str> = schedules.iter().map(|s| s.start_date.as_str()).collect();
        assert_eq!(starts, ["2026-05-01", "2026-04-01", "2026-03-01"]);
    }

    #[tokio::test]
    async fn recent_activity_is_capped() {
        let pool = seeded_pool().await;
        let id = instructor_id(&pool, "jdoe").await;

        for i in 0..25 {
            let status = if i % 2 == 0 { Status::Out } else { Status::In };
            change_status(&pool, id, status).await.unwrap();
        }

        assert!(log_count(&pool, id).await > ACTIVITY_LIMIT);
        let logs = recent_activity(&pool, id).await.unwrap();
        assert_eq!(logs.len(), ACTIVITY_LIMIT as usize);
        // Newest first: the 25th transition went from In back to Out
        assert_eq!(logs[0].details.as_deref(), Some("Changed from In to Out"));
    }
}
