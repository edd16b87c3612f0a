use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    /// Email that is granted the superadmin role when it registers.
    pub superadmin_email: Option<String>,
    pub low_stock_threshold: i32,
    pub event_buffer: usize,
    pub db_max_connections: u32,
    pub cors_allow_origin: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET is not set"))?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parse_or("APP_PORT", 3000);
        let superadmin_email = env::var("SUPERADMIN_EMAIL")
            .ok()
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty());
        let cors_allow_origin = env::var("CORS_ALLOW_ORIGIN")
            .ok()
            .filter(|o| !o.is_empty());

        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret,
            jwt_ttl_hours: parse_or("JWT_TTL_HOURS", 24),
            superadmin_email,
            low_stock_threshold: parse_or("LOW_STOCK_THRESHOLD", 5),
            event_buffer: parse_or("EVENT_BUFFER", 256),
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", 10),
            cors_allow_origin,
        })
    }

    /// Local defaults for tests and tooling; only the database URL and secret vary.
    pub fn for_database(database_url: impl Into<String>, jwt_secret: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            host: "127.0.0.1".to_string(),
            port: 3000,
            jwt_secret: jwt_secret.into(),
            jwt_ttl_hours: 24,
            superadmin_email: None,
            low_stock_threshold: 5,
            event_buffer: 256,
            db_max_connections: 5,
            cors_allow_origin: None,
        }
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
