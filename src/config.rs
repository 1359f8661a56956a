use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: Option<String>,
    pub session_cookie_name: String,
    pub session_ttl_hours: i64,
    pub session_cookie_secure: bool,
    pub starting_points: i64,
    pub seed_sample_data: bool,
    pub admin_username: String,
    pub admin_password: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            cors_origin: None,
            session_cookie_name: "sid".to_string(),
            session_ttl_hours: 24,
            session_cookie_secure: false,
            starting_points: 500,
            seed_sample_data: true,
            admin_username: "admin@campus.edu".to_string(),
            admin_password: "admin123".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();
        let session_ttl_hours = parsed("SESSION_TTL_HOURS")?.unwrap_or(defaults.session_ttl_hours);
        if session_ttl_hours <= 0 {
            anyhow::bail!("SESSION_TTL_HOURS must be positive");
        }

        Ok(Self {
            host: env::var("APP_HOST").unwrap_or(defaults.host),
            port: env::var("APP_PORT")
                .ok()
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(defaults.port),
            cors_origin: env::var("CORS_ORIGIN").ok().filter(|o| !o.is_empty()),
            session_cookie_name: env::var("SESSION_COOKIE_NAME")
                .unwrap_or(defaults.session_cookie_name),
            session_ttl_hours,
            session_cookie_secure: parsed("SESSION_COOKIE_SECURE")?
                .unwrap_or(defaults.session_cookie_secure),
            starting_points: parsed("STARTING_POINTS")?.unwrap_or(defaults.starting_points),
            seed_sample_data: parsed("SEED_SAMPLE_DATA")?.unwrap_or(defaults.seed_sample_data),
            admin_username: env::var("ADMIN_USERNAME").unwrap_or(defaults.admin_username),
            admin_password: env::var("ADMIN_PASSWORD").unwrap_or(defaults.admin_password),
        })
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.session_ttl_hours)
    }
}

fn parsed<T>(key: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("invalid {key}: {e}")),
        Err(_) => Ok(None),
    }
}
