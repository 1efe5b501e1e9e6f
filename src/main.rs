use school_announcements::{
    AppState,
    auth::{InMemoryTeacherDirectory, PostgresTeacherDirectory, TeacherDirectoryState},
    config::{AppConfig, Env},
    create_router,
    models::Teacher,
    repository::{AnnouncementStoreState, InMemoryAnnouncementStore, PostgresAnnouncementStore},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Loads configuration, initialises logging, builds the store and directory collaborators
/// and serves the router.
#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // RUST_LOG wins; otherwise verbose for this crate, quieter for the HTTP stack.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "school_announcements=debug,tower_http=info,axum=trace".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    let (store, directory) = match &config.db_url {
        Some(db_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(db_url)
                .await
                .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .expect("FATAL: Failed to run database migrations.");

            let directory = PostgresTeacherDirectory::new(pool.clone());
            for username in &config.local_teachers {
                directory
                    .upsert(&Teacher::with_username(username.as_str()))
                    .await
                    .expect("FATAL: Failed to seed local teachers.");
            }

            tracing::info!("Using Postgres announcement store");
            (
                Arc::new(PostgresAnnouncementStore::new(pool)) as AnnouncementStoreState,
                Arc::new(directory) as TeacherDirectoryState,
            )
        }
        None => {
            // Only reachable in Env::Local: AppConfig::load() refuses production without a database.
            tracing::warn!(
                teachers = ?config.local_teachers,
                "DATABASE_URL not set, announcements are kept in memory"
            );
            (
                Arc::new(InMemoryAnnouncementStore::new()) as AnnouncementStoreState,
                Arc::new(InMemoryTeacherDirectory::new(config.local_teachers.clone()))
                    as TeacherDirectoryState,
            )
        }
    };

    let app = create_router(AppState::new(store, directory));

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .expect("FATAL: Failed to bind HTTP listener. Check BIND_ADDR.");

    tracing::info!("Listening on {}", config.bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at /swagger-ui");

    axum::serve(listener, app)
        .await
        .expect("FATAL: HTTP server terminated unexpectedly.");
}
