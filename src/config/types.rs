// Configuration types module
// Sections of the portal configuration file, one struct per table

use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    pub storage: StorageConfig,
    pub admin: AdminConfig,
    #[serde(default)]
    pub health: HealthConfig,
}

/// Bind address and runtime sizing
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Tokio worker threads; the runtime default when unset
    pub workers: Option<usize>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Reported in the startup banner
    pub level: String,
    pub access_log: bool,
    pub show_headers: bool,
    /// `combined`, `common`, `json` or a `$variable` pattern
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Stdout when unset
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Stderr when unset
    #[serde(default)]
    pub error_log_file: Option<String>,
}

fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Connection lifetimes, in seconds
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    /// Zero disables keep-alive
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    /// Sent as the `Server` header
    pub server_name: String,
    pub enable_cors: bool,
    /// Largest accepted request body, uploads included
    pub max_body_size: u64,
}

/// On-disk locations for records and uploads
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Holds `files.json` and the `students/` directory
    pub data_dir: PathBuf,
    /// Uploaded binaries, mounted at `/uploads`
    pub uploads_dir: PathBuf,
    /// Landing page served at `/`
    pub index_page: PathBuf,
}

impl StorageConfig {
    pub fn students_dir(&self) -> PathBuf {
        self.data_dir.join("students")
    }
}

/// The single admin credential pair
#[derive(Debug, Deserialize, Clone)]
pub struct AdminConfig {
    pub username: String,
    pub password: String,
}

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

impl AdminConfig {
    pub fn uses_default_password(&self) -> bool {
        self.password == DEFAULT_ADMIN_PASSWORD
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: DEFAULT_ADMIN_USERNAME.to_string(),
            password: DEFAULT_ADMIN_PASSWORD.to_string(),
        }
    }
}

/// Liveness and readiness probes; every field may be omitted
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HealthConfig {
    pub enabled: bool,
    pub liveness_path: String,
    pub readiness_path: String,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            liveness_path: "/healthz".to_string(),
            readiness_path: "/readyz".to_string(),
        }
    }
}
