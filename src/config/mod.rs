// Configuration module entry point
// Loads layered configuration and holds the shared application state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{
    AdminConfig, Config, HealthConfig, HttpConfig, LoggingConfig, PerformanceConfig,
    ServerConfig, StorageConfig,
};

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("PORTAL")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.show_headers", false)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "school-portal")?
            .set_default("http.enable_cors", false)?
            .set_default("http.max_body_size", 26_214_400)? // 25MB
            .set_default("storage.data_dir", "data")?
            .set_default("storage.uploads_dir", "uploads")?
            .set_default("storage.index_page", "index.html")?
            .set_default("admin.username", types::DEFAULT_ADMIN_USERNAME)?
            .set_default("admin.password", types::DEFAULT_ADMIN_PASSWORD)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Create the data, students and uploads directories if missing
    pub fn prepare_storage(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.storage.data_dir)?;
        std::fs::create_dir_all(self.storage.students_dir())?;
        std::fs::create_dir_all(&self.storage.uploads_dir)
    }
}

/// Configuration rooted in a scratch directory, for unit tests
#[cfg(test)]
pub fn test_config(root: &std::path::Path) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            workers: None,
        },
        logging: LoggingConfig {
            level: "info".to_string(),
            access_log: false,
            show_headers: false,
            access_log_format: "combined".to_string(),
            access_log_file: None,
            error_log_file: None,
        },
        performance: PerformanceConfig {
            keep_alive_timeout: 75,
            read_timeout: 30,
            write_timeout: 30,
            max_connections: None,
        },
        http: HttpConfig {
            server_name: "school-portal".to_string(),
            enable_cors: false,
            max_body_size: 1_048_576,
        },
        storage: StorageConfig {
            data_dir: root.join("data"),
            uploads_dir: root.join("uploads"),
            index_page: root.join("index.html"),
        },
        admin: AdminConfig::default(),
        health: HealthConfig::default(),
    }
}
