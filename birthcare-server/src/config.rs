use birthcare_client::ClientConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Console configuration loaded from YAML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub server: ServerSettings,
    pub upstream: UpstreamSettings,
    pub auth: AuthSettings,
    pub storage: StorageSettings,
    pub workflow: WorkflowSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// The remote birthcare API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// Reject requests without a bearer token
    pub required: bool,
    /// When set, bearer tokens must be HS256 JWTs signed with this secret
    pub jwt_secret: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Sqlite,
    Redb,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub data_dir: PathBuf,
    pub backend: StoreBackend,
    /// Defaults to `discharge.sqlite` or `discharge.redb` by backend
    pub discharge_db: Option<String>,
    pub audit_db: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowSettings {
    /// Prefix of the discharge slip routes
    pub route_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub level: String,
    pub json: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            required: true,
            jwt_secret: None,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            backend: StoreBackend::Sqlite,
            discharge_db: None,
            audit_db: "audit.sqlite".to_string(),
        }
    }
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            route_prefix: "/birthcare".to_string(),
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl ServerConfig {
    /// Load configuration from a YAML file
    pub fn load_from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: ServerConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<&str>) -> Result<Self, Box<dyn std::error::Error>> {
        let mut config = if let Some(path) = config_path {
            Self::load_from_file(path)?
        } else {
            Self::default()
        };

        // Override with environment variables
        if let Ok(port) = std::env::var("BIRTHCARE_PORT")
            && let Ok(port_num) = port.parse()
        {
            config.server.port = port_num;
        }

        if let Ok(host) = std::env::var("BIRTHCARE_HOST") {
            config.server.host = host;
        }

        if let Ok(url) = std::env::var("BIRTHCARE_UPSTREAM_URL") {
            config.upstream.base_url = url;
        }

        if let Ok(data_dir) = std::env::var("BIRTHCARE_DATA_DIR") {
            config.storage.data_dir = PathBuf::from(data_dir);
        }

        if let Ok(secret) = std::env::var("BIRTHCARE_JWT_SECRET")
            && !secret.is_empty()
        {
            config.auth.jwt_secret = Some(secret);
        }

        Ok(config)
    }

    /// Get the full path to the discharge workflow database
    pub fn discharge_db_path(&self) -> PathBuf {
        let file = match (&self.storage.discharge_db, self.storage.backend) {
            (Some(name), _) => name.as_str(),
            (None, StoreBackend::Sqlite) => "discharge.sqlite",
            (None, StoreBackend::Redb) => "discharge.redb",
        };
        self.storage.data_dir.join(file)
    }

    /// Get the full path to the audit database
    pub fn audit_db_path(&self) -> PathBuf {
        self.storage.data_dir.join(&self.storage.audit_db)
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.upstream.base_url.clone(),
            timeout: Duration::from_secs(self.upstream.timeout_secs),
            ..ClientConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert!(config.auth.required);
        assert_eq!(config.workflow.route_prefix, "/birthcare");
        assert_eq!(config.storage.backend, StoreBackend::Sqlite);
    }

    #[test]
    fn test_db_paths() {
        let mut config = ServerConfig::default();
        assert_eq!(
            config.discharge_db_path(),
            PathBuf::from("data/discharge.sqlite")
        );
        assert_eq!(config.audit_db_path(), PathBuf::from("data/audit.sqlite"));

        config.storage.backend = StoreBackend::Redb;
        assert_eq!(
            config.discharge_db_path(),
            PathBuf::from("data/discharge.redb")
        );

        config.storage.discharge_db = Some("workflow.db".to_string());
        assert_eq!(config.discharge_db_path(), PathBuf::from("data/workflow.db"));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
upstream:
  base_url: https://api.birthcare.example
storage:
  backend: redb
log:
  json: true
"#;
        let config: ServerConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.upstream.base_url, "https://api.birthcare.example");
        assert_eq!(config.upstream.timeout_secs, 30);
        assert_eq!(config.storage.backend, StoreBackend::Redb);
        assert!(config.log.json);
        assert_eq!(config.log.level, "info");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_client_config() {
        let mut config = ServerConfig::default();
        config.upstream.timeout_secs = 5;
        let client = config.client_config();
        assert_eq!(client.base_url, "http://localhost:8000");
        assert_eq!(client.timeout, Duration::from_secs(5));
    }
}
