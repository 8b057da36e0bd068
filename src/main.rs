mod db;
mod models;
mod routes;
mod session;
mod state;
mod views;

use std::net::SocketAddr;

use axum::{
    routing::{get, post},
    Router,
};
use clap::Parser;
use tower_http::trace::TraceLayer;

use state::AppState;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Database path
    #[arg(short, long, env = "DATABASE_PATH", default_value = "faculty.db")]
    db_path: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    // Session secret: from env, from file, or generate and save to file
    let session_secret = std::env::var("SECRET_KEY").unwrap_or_else(|_| {
        let secret_path = std::path::Path::new("session_secret.key");
        if let Ok(saved) = std::fs::read_to_string(secret_path) {
            let saved = saved.trim().to_string();
            if !saved.is_empty() {
                tracing::info!("Loaded session secret from session_secret.key");
                return saved;
            }
        }
        use rand::Rng;
        let secret: String = rand::thread_rng()
            .sample_iter(&rand::distributions::Alphanumeric)
            .take(64)
            .map(char::from)
            .collect();
        if let Err(e) = std::fs::write(secret_path, &secret) {
            tracing::warn!("Could not save session secret to file: {e}");
        } else {
            tracing::info!("Generated and saved session secret to session_secret.key");
        }
        secret
    });

    tracing::info!("Initializing database at {}", args.db_path);
    let pool = db::init_pool(&args.db_path).await;
    db::create_schema(&pool)
        .await
        .expect("Failed to create schema");
    db::seed_demo_data(&pool)
        .await
        .expect("Failed to seed demo data");

    let state = AppState::new(pool, session_secret);
    let app = router(state);

    let addr = format!("0.0.0.0:{}", args.port);
    tracing::info!("Listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::pages::index))
        .route(
            "/login",
            get(routes::auth::login_page).post(routes::auth::login),
        )
        .route("/logout", get(routes::auth::logout))
        .route("/select", get(routes::pages::role_select))
        .route("/student", get(routes::student::student_dashboard))
        .route(
            "/student/department/{id}",
            get(routes::student::department_detail),
        )
        .route("/instructor", get(routes::instructor::dashboard))
        .route("/instructor/status", post(routes::instructor::update_status))
        .route(
            "/instructor/schedule",
            post(routes::instructor::add_schedule),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
