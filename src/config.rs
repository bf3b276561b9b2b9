use std::env;

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_url: String,
    pub session_db: String,
    pub mock_port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            api_url: env::var("HIRELINK_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            session_db: env::var("HIRELINK_SESSION_DB")
                .unwrap_or_else(|_| "hirelink-session.db".to_string()),
            mock_port: env::var("HIRELINK_MOCK_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
        }
    }
}
