use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }

    /// Colored log output is only emitted for development runs.
    pub fn colored_logs(self) -> bool {
        matches!(self, Self::Development)
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub notifications: NotificationConfig,
    pub bootstrap: BootstrapConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::parse(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let notifications = NotificationConfig {
            api_url: non_blank_var("WHATSAPP_API_URL"),
            api_key: non_blank_var("WHATSAPP_API_KEY"),
        };

        let superadmin = non_blank_var("APP_BOOTSTRAP_SUPERADMIN")
            .map(|raw| BootstrapUser::parse(&raw))
            .transpose()?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                ansi: environment.colored_logs(),
            },
            notifications,
            bootstrap: BootstrapConfig { superadmin },
        })
    }
}

fn non_blank_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub ansi: bool,
}

/// WhatsApp gateway endpoint and credential. Either value missing leaves the
/// dispatcher in its "not configured" state.
#[derive(Clone, Default)]
pub struct NotificationConfig {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
}

impl NotificationConfig {
    pub fn is_configured(&self) -> bool {
        self.api_url.is_some() && self.api_key.is_some()
    }
}

impl fmt::Debug for NotificationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Seed records applied to freshly started in-memory stores.
#[derive(Debug, Clone, Default)]
pub struct BootstrapConfig {
    pub superadmin: Option<BootstrapUser>,
}

/// `uid:name:phone` triple read from `APP_BOOTSTRAP_SUPERADMIN`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapUser {
    pub uid: String,
    pub name: String,
    pub phone: String,
}

impl BootstrapUser {
    fn parse(raw: &str) -> Result<Self, ConfigError> {
        let mut parts = raw.splitn(3, ':').map(str::trim);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(uid), Some(name), Some(phone))
                if !uid.is_empty() && !name.is_empty() && !phone.is_empty() =>
            {
                Ok(Self {
                    uid: uid.to_string(),
                    name: name.to_string(),
                    phone: phone.to_string(),
                })
            }
            _ => Err(ConfigError::InvalidBootstrapUser),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidBootstrapUser,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidBootstrapUser => {
                write!(f, "APP_BOOTSTRAP_SUPERADMIN must look like uid:name:phone")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidBootstrapUser => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
