use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;

use crate::models::{Role, Status};
use crate::routes::auth::hash_password;

pub async fn init_pool(db_path: &str) -> SqlitePool {
    let abs_path =
        std::fs::canonicalize(db_path).unwrap_or_else(|_| std::path::PathBuf::from(db_path));
    tracing::info!("Database absolute path: {:?}", abs_path);

    // Ensure parent directory exists
    if let Some(parent) = Path::new(db_path).parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .expect("Failed to connect to SQLite")
}

/// Current UTC time in the text format every table stores.
pub fn now_timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT UNIQUE NOT NULL,
        password_hash TEXT NOT NULL,
        full_name TEXT NOT NULL,
        role TEXT NOT NULL CHECK(role IN ('student','instructor'))
    )",
    "CREATE TABLE IF NOT EXISTS departments (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT UNIQUE NOT NULL,
        code TEXT UNIQUE NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS instructors (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER UNIQUE NOT NULL REFERENCES users(id),
        department_id INTEGER NOT NULL REFERENCES departments(id),
        status TEXT NOT NULL DEFAULT 'In' CHECK(status IN ('In','Out','On Leave','On Travel'))
    )",
    "CREATE TABLE IF NOT EXISTS schedules (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        instructor_id INTEGER NOT NULL REFERENCES instructors(id),
        schedule_type TEXT NOT NULL CHECK(schedule_type IN ('leave','travel')),
        start_date TEXT NOT NULL,
        end_date TEXT NOT NULL,
        reason TEXT,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS activity_log (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        instructor_id INTEGER NOT NULL REFERENCES instructors(id),
        action TEXT NOT NULL,
        details TEXT,
        timestamp TEXT NOT NULL
    )",
];

/// Create the five tables if they do not exist yet. Safe to run on every
/// startup.
pub async fn create_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for stmt in SCHEMA {
        sqlx::query(stmt).execute(pool).await?;
    }
    Ok(())
}

const SEED_DEPARTMENTS: &[(&str, &str)] = &[
    ("College of Computing Studies", "CCS"),
    ("College of Engineering", "COE"),
    ("College of Education", "CED"),
    ("College of Arts and Sciences", "CAS"),
    ("College of Business Administration", "CBA"),
];

// (username, full name, department id, initial status)
const SEED_INSTRUCTORS: &[(&str, &str, i64, Status)] = &[
    ("jdoe", "John Doe", 1, Status::In),
    ("asmith", "Anna Smith", 1, Status::Out),
    ("bcruz", "Benjamin Cruz", 2, Status::OnLeave),
    ("mgarcia", "Maria Garcia", 2, Status::In),
    ("rlopez", "Roberto Lopez", 3, Status::OnTravel),
    ("lreyes", "Lorna Reyes", 3, Status::In),
    ("pnavarro", "Pedro Navarro", 4, Status::Out),
    ("ctan", "Carmen Tan", 4, Status::In),
    ("jsantos", "Jose Santos", 5, Status::In),
    ("mvillar", "Marta Villar", 5, Status::OnLeave),
];

/// Insert demo data when the database is empty. Skipped entirely once any
/// user row exists, so restarting against a live database is a no-op.
pub async fn seed_demo_data(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let user_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    if user_count > 0 {
        return Ok(());
    }

    tracing::info!("Empty database, seeding demo data");

    // All demo accounts share one hash (password is 'password')
    let demo_hash = hash_password("password").expect("Failed to hash demo password");

    let mut tx = pool.begin().await?;

    for (name, code) in SEED_DEPARTMENTS {
        sqlx::query("INSERT INTO departments (name, code) VALUES (?, ?)")
            .bind(name)
            .bind(code)
            .execute(&mut *tx)
            .await?;
    }

    for (username, full_name, dept_id, status) in SEED_INSTRUCTORS {
        let user_id = sqlx::query(
            "INSERT INTO users (username, password_hash, full_name, role) VALUES (?, ?, ?, ?)",
        )
        .bind(username)
        .bind(&demo_hash)
        .bind(full_name)
        .bind(Role::Instructor.as_str())
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        let instructor_id = sqlx::query(
            "INSERT INTO instructors (user_id, department_id, status) VALUES (?, ?, ?)",
        )
        .bind(user_id)
        .bind(dept_id)
        .bind(status.as_str())
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        sqlx::query(
            "INSERT INTO activity_log (instructor_id, action, details, timestamp) VALUES (?, 'Status set', ?, ?)",
        )
        .bind(instructor_id)
        .bind(format!("Status set to {status}"))
        .bind(now_timestamp())
        .execute(&mut *tx)
        .await?;
    }

    sqlx::query(
        "INSERT INTO users (username, password_hash, full_name, role) VALUES ('student', ?, 'Juan Antonio', ?)",
    )
    .bind(&demo_hash)
    .bind(Role::Student.as_str())
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!("Seeded demo departments, instructors and student account");
    Ok(())
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::new().in_memory(true).foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("Failed to open in-memory SQLite");
    create_schema(&pool).await.expect("Failed to create schema");
    pool
}

#[cfg(test)]
pub(crate) async fn seeded_pool() -> SqlitePool {
    let pool = test_pool().await;
    seed_demo_data(&pool).await.expect("Failed to seed");
    pool
}
