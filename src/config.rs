use std::env;

/// Default listener address when `BIND_ADDR` is not set.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Teachers seeded into a local deployment when `LOCAL_TEACHERS` is not set.
pub const DEFAULT_LOCAL_TEACHERS: &[&str] = &["mrodriguez", "mchen", "principal"];

/// AppConfig
///
/// Holds the application's configuration, loaded once at startup and immutable afterwards.
/// Only `main` reads it: it picks the log format, the collaborators and the listener address.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls log format and whether a database is mandatory.
    pub env: Env,
    // Postgres connection string. `None` selects the in-memory store (local only).
    pub db_url: Option<String>,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
    // Usernames registered as teachers when running locally.
    pub local_teachers: Vec<String>,
}

/// Env
///
/// Defines the runtime context. Local favours convenience (in-memory collaborators,
/// seeded teachers, pretty logs); Production demands a database and emits JSON logs.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// default
    ///
    /// A non-panicking configuration for tests: local, in-memory, default teachers.
    fn default() -> Self {
        Self {
            env: Env::Local,
            db_url: None,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            local_teachers: DEFAULT_LOCAL_TEACHERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables and fails fast.
    ///
    /// # Panics
    /// Panics in `Env::Production` when `DATABASE_URL` is missing, so the server never
    /// starts against an in-memory store in production.
    pub fn load() -> Self {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let db_url = match env {
            Env::Production => Some(
                env::var("DATABASE_URL").expect("FATAL: DATABASE_URL required in production"),
            ),
            Env::Local => env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
        };

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        // Seeding only ever happens locally; production teachers are managed in the database.
        let local_teachers = match env {
            Env::Production => Vec::new(),
            Env::Local => match env::var("LOCAL_TEACHERS") {
                Ok(list) => parse_teacher_list(&list),
                Err(_) => DEFAULT_LOCAL_TEACHERS
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            },
        };

        Self {
            env,
            db_url,
            bind_addr,
            local_teachers,
        }
    }
}

/// Splits a comma-separated username list, dropping blanks.
pub fn parse_teacher_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
