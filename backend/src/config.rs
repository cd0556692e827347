use std::env;
use std::str::FromStr;
use tracing::warn;

/// Port the desktop clients connect to
pub const DEFAULT_PORT: u16 = 60429;
/// Simultaneously running connection handlers
pub const DEFAULT_MAX_HANDLERS: usize = 200;
/// Both seats of a pair hold a handler at once
pub const MIN_MAX_HANDLERS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind_addr: String,
    pub port: u16,
    pub max_handlers: usize,
    /// Port of the HTTP health/stats endpoint; disabled when unset
    pub ops_port: Option<u16>,
}

fn var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

fn handler_budget(requested: Option<usize>) -> usize {
    match requested {
        Some(n) if n >= MIN_MAX_HANDLERS => n,
        Some(n) => {
            warn!(requested = n, "MAX_HANDLERS cannot seat a pair, using default");
            DEFAULT_MAX_HANDLERS
        }
        None => DEFAULT_MAX_HANDLERS,
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: var("PORT").unwrap_or(defaults.port),
            max_handlers: handler_budget(var("MAX_HANDLERS")),
            ops_port: var("OPS_PORT"),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_max_handlers(mut self, max_handlers: usize) -> Self {
        self.max_handlers = max_handlers.max(MIN_MAX_HANDLERS);
        self
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    pub fn ops_addr(&self) -> Option<String> {
        self.ops_port.map(|port| format!("{}:{}", self.bind_addr, port))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            max_handlers: DEFAULT_MAX_HANDLERS,
            ops_port: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();

        assert_eq!(config.addr(), "0.0.0.0:60429");
        assert_eq!(config.max_handlers, 200);
        assert_eq!(config.ops_addr(), None);
    }

    #[test]
    fn builders_override_fields() {
        let config = Config {
            bind_addr: "127.0.0.1".to_string(),
            ops_port: Some(8080),
            ..Config::default()
        }
        .with_port(0)
        .with_max_handlers(4);

        assert_eq!(config.addr(), "127.0.0.1:0");
        assert_eq!(config.ops_addr().as_deref(), Some("127.0.0.1:8080"));
        assert_eq!(config.max_handlers, 4);
    }

    #[test]
    fn handler_budget_must_seat_a_pair() {
        assert_eq!(handler_budget(None), DEFAULT_MAX_HANDLERS);
        assert_eq!(handler_budget(Some(0)), DEFAULT_MAX_HANDLERS);
        assert_eq!(handler_budget(Some(1)), DEFAULT_MAX_HANDLERS);
        assert_eq!(handler_budget(Some(2)), 2);
        assert_eq!(handler_budget(Some(64)), 64);

        assert_eq!(Config::default().with_max_handlers(1).max_handlers, MIN_MAX_HANDLERS);
    }
}
