use std::env;

use chrono::FixedOffset;
use secrecy::SecretString;

const DEFAULT_JWT_SECRET: &str = "dev_secret_key_change_in_production";
const DEFAULT_MANAGER_PASSWORD: &str = "123";

#[derive(Clone, Debug)]
pub struct Config {
    pub mongo_conn_string: String,
    pub mongo_db_name: String,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub jwt_secret: SecretString,
    pub jwt_expiration_hours: i64,
    pub manager_username: String,
    pub manager_password: SecretString,
    /// Fixed offset (minutes east of UTC) used to decide which calendar day a
    /// submission belongs to. `None` means the server's local date.
    pub submission_offset_minutes: Option<i32>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            mongo_conn_string: env::var("MONGO_CONN_STRING")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            mongo_db_name: env::var("MONGO_DB_NAME")
                .unwrap_or_else(|_| "deepsleep-local".to_string()),
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            web_server_port: env::var("WEB_SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            jwt_secret: SecretString::from(
                env::var("JWT_SECRET").unwrap_or_else(|_| DEFAULT_JWT_SECRET.to_string()),
            ),
            jwt_expiration_hours: env::var("JWT_EXPIRATION_HOURS")
                .ok()
                .and_then(|h| h.parse().ok())
                .unwrap_or(24),
            manager_username: env::var("MANAGER_USERNAME").unwrap_or_else(|_| "123".to_string()),
            manager_password: SecretString::from(
                env::var("MANAGER_PASSWORD")
                    .unwrap_or_else(|_| DEFAULT_MANAGER_PASSWORD.to_string()),
            ),
            submission_offset_minutes: env::var("SUBMISSION_TIMEZONE_OFFSET_MINUTES")
                .ok()
                .and_then(|m| m.parse().ok()),
        }
    }

    /// Offset used for "today" when a submission carries no explicit date.
    pub fn submission_offset(&self) -> Option<FixedOffset> {
        self.submission_offset_minutes
            .and_then(|minutes| FixedOffset::east_opt(minutes * 60))
    }

    /// Validate that production-critical configuration is set
    /// Panics if required secrets are using default values
    pub fn validate_for_production(&self) {
        use secrecy::ExposeSecret;

        let jwt_secret = self.jwt_secret.expose_secret();

        if jwt_secret == DEFAULT_JWT_SECRET {
            panic!(
                "FATAL: JWT_SECRET is using default value! Set JWT_SECRET environment variable to a secure random string."
            );
        }

        if jwt_secret.len() < 32 {
            panic!(
                "FATAL: JWT_SECRET is too short ({}). Must be at least 32 characters for security.",
                jwt_secret.len()
            );
        }

        if self.manager_password.expose_secret() == DEFAULT_MANAGER_PASSWORD {
            panic!(
                "FATAL: MANAGER_PASSWORD is using default value! Set MANAGER_PASSWORD environment variable."
            );
        }
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            mongo_conn_string: "mongodb://localhost:27017".to_string(),
            mongo_db_name: "deepsleep-test".to_string(),
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 3000,
            jwt_secret: SecretString::from("test_jwt_secret_key".to_string()),
            jwt_expiration_hours: 1,
            manager_username: "manager".to_string(),
            manager_password: SecretString::from("manager-password".to_string()),
            submission_offset_minutes: Some(120),
        }
    }
}
