use serde::Deserialize;
use config::{Config, ConfigError, Environment, File};

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub portal: PortalConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub session_duration_hours: i64,
    #[serde(default)]
    pub secure_cookies: bool,
}

/// Listing sizes for the dashboards and the admin activity log.
#[derive(Debug, Deserialize, Clone)]
pub struct PortalConfig {
    pub recent_announcements: usize,
    pub page_size: i64,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            recent_announcements: 5,
            page_size: 20,
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.base_url", "http://localhost:8080")?
            .set_default("database.url", "sqlite://schoolhouse.db")?
            .set_default("database.max_connections", 10)?
            .set_default("auth.session_duration_hours", 24)?
            .set_default("auth.secure_cookies", false)?
            .set_default("portal.recent_announcements", 5)?
            .set_default("portal.page_size", 20)?

            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))

            // SCHOOLHOUSE__SERVER__PORT=9000 and friends
            .add_source(Environment::with_prefix("SCHOOLHOUSE").separator("__"))

            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                base_url: "http://localhost:8080".to_string(),
            },
            database: DatabaseConfig {
                url: "sqlite://schoolhouse.db".to_string(),
                max_connections: 10,
            },
            auth: AuthConfig {
                session_duration_hours: 24,
                secure_cookies: false,
            },
            portal: PortalConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.portal.recent_announcements, 5);
        assert_eq!(settings.portal.page_size, 20);
        assert!(!settings.auth.secure_cookies);
    }
}
