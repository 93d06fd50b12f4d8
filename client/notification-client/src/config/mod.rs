use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use resilience::BackoffConfig;

use crate::error::{ClientError, Result};

const DEFAULT_API_URL: &str = "http://localhost:8080/api/v1";
const API_PREFIX: &str = "/api/v1";
const NOTIFICATION_SOCKET_PATH: &str = "/api/v1/ws/notifications";

#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub socket: SocketConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the REST API, including the `/api/v1` prefix
    pub base_url: String,
    pub request_timeout: Duration,
    /// Page size used for the initial notification load
    pub initial_page_size: u32,
}

#[derive(Debug, Clone)]
pub struct SocketConfig {
    /// Host (and port) serving the notification socket
    pub host: String,
    /// Use `wss` instead of `ws`
    pub secure: bool,
    pub reconnect: BackoffConfig,
    /// Upper bound for the websocket handshake
    pub connect_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// File holding the persisted session token
    pub token_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let base_url = env_or("TIMEBANK_API_URL", DEFAULT_API_URL);
        let secure = match std::env::var("TIMEBANK_WS_SECURE") {
            Ok(v) => parse_bool("TIMEBANK_WS_SECURE", &v)?,
            Err(_) => base_url.starts_with("https://"),
        };

        Ok(Config {
            socket: SocketConfig {
                host: socket_host(&base_url),
                secure,
                reconnect: BackoffConfig::new(
                    Duration::from_millis(env_parse("TIMEBANK_WS_RECONNECT_BASE_DELAY_MS", 1000)?),
                    env_parse("TIMEBANK_WS_MAX_RECONNECT_ATTEMPTS", 5)?,
                ),
                connect_timeout: Duration::from_secs(env_parse(
                    "TIMEBANK_WS_CONNECT_TIMEOUT_SECS",
                    10,
                )?),
            },
            api: ApiConfig {
                base_url: base_url.trim_end_matches('/').to_string(),
                request_timeout: Duration::from_secs(env_parse("TIMEBANK_API_TIMEOUT_SECS", 15)?),
                initial_page_size: env_parse("TIMEBANK_INITIAL_PAGE_SIZE", 20)?,
            },
            session: SessionConfig {
                token_path: PathBuf::from(env_or("TIMEBANK_TOKEN_PATH", ".timebank/token")),
            },
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api: ApiConfig {
                base_url: DEFAULT_API_URL.to_string(),
                request_timeout: Duration::from_secs(15),
                initial_page_size: 20,
            },
            socket: SocketConfig::for_api_url(DEFAULT_API_URL),
            session: SessionConfig {
                token_path: PathBuf::from(".timebank/token"),
            },
        }
    }
}

impl SocketConfig {
    /// Socket settings derived from the REST base URL; `https` upgrades to `wss`.
    pub fn for_api_url(api_url: &str) -> Self {
        SocketConfig {
            host: socket_host(api_url),
            secure: api_url.starts_with("https://"),
            reconnect: BackoffConfig::default(),
            connect_timeout: Duration::from_secs(10),
        }
    }

    fn scheme(&self) -> &'static str {
        if self.secure {
            "wss"
        } else {
            "ws"
        }
    }

    /// Full socket URL carrying the session token as a query parameter
    pub fn endpoint_url(&self, token: &str) -> String {
        format!(
            "{}?token={}",
            self.redacted_url(),
            urlencoding::encode(token)
        )
    }

    /// Socket URL without credentials, safe to log
    pub fn redacted_url(&self) -> String {
        format!("{}://{}{}", self.scheme(), self.host, NOTIFICATION_SOCKET_PATH)
    }
}

/// Strip the scheme, the API prefix and any trailing slash from the REST URL
fn socket_host(api_url: &str) -> String {
    let without_scheme = api_url
        .strip_prefix("https://")
        .or_else(|| api_url.strip_prefix("http://"))
        .unwrap_or(api_url);
    without_scheme
        .replacen(API_PREFIX, "", 1)
        .trim_end_matches('/')
        .to_string()
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| ClientError::Config(format!("{key}={raw:?}: {e}"))),
        Err(_) => Ok(default),
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(ClientError::Config(format!("{key}={raw:?}: expected a boolean"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_http_uses_ws() {
        let socket = SocketConfig::for_api_url("http://localhost:8080/api/v1");
        assert_eq!(
            socket.endpoint_url("abc"),
            "ws://localhost:8080/api/v1/ws/notifications?token=abc"
        );
    }

    #[test]
    fn test_https_upgrades_to_wss() {
        let socket = SocketConfig::for_api_url("https://api.timebank.example/api/v1/");
        assert!(socket.secure);
        assert_eq!(
            socket.redacted_url(),
            "wss://api.timebank.example/api/v1/ws/notifications"
        );
    }

    #[test]
    fn test_token_is_url_encoded() {
        let socket = SocketConfig::for_api_url("http://localhost:8080/api/v1");
        let url = socket.endpoint_url("a+b/c=");
        assert!(url.ends_with("?token=a%2Bb%2Fc%3D"));
    }

    #[test]
    fn test_redacted_url_has_no_token() {
        let socket = SocketConfig::for_api_url("http://localhost:8080/api/v1");
        assert!(!socket.redacted_url().contains("token"));
    }

    #[test]
    fn test_host_without_prefix() {
        assert_eq!(socket_host("http://example.com:9000"), "example.com:9000");
    }

    #[test]
    fn test_default_reconnect_policy() {
        let config = Config::default();
        assert_eq!(config.socket.reconnect.max_attempts, 5);
        assert_eq!(config.socket.reconnect.base_delay, Duration::from_millis(1000));
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("K", "TRUE").unwrap());
        assert!(!parse_bool("K", "0").unwrap());
        assert!(matches!(parse_bool("K", "maybe"), Err(ClientError::Config(_))));
    }
}
