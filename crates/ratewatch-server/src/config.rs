use std::env;

/// Server process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address the listener binds to.
    pub listen_addr: String,
    /// Directory the comparison UI is served from.
    pub static_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: String::from("0.0.0.0:8080"),
            static_dir: String::from("static"),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            listen_addr: env::var("RATEWATCH_LISTEN_ADDR").unwrap_or(defaults.listen_addr),
            static_dir: env::var("RATEWATCH_STATIC_DIR").unwrap_or(defaults.static_dir),
        }
    }
}
