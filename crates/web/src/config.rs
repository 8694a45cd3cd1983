//! Configuration of the bridge.
//!
//! Every field has a default, so the bridge runs without any configuration file. A TOML file
//! given with `--config` is loaded first, then command line flags override it.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub listener: ListenerConfig,
    pub tls: TlsConfig,
    pub site: SiteConfig,
    pub shutdown: ShutdownConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self { host: "localhost".to_string(), port: 4443 }
    }
}

/// Certificate and key, PEM encoded.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TlsConfig {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self { cert_path: beside_executable("localhost.pem"), key_path: beside_executable("localhost-key.pem") }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Static files and relative filesystem paths are resolved against this directory.
    pub root_dir: PathBuf,
    /// Page opened in the browser at startup.
    pub entry_file: String,
    /// File served as `/@api.js`.
    pub client_script: PathBuf,
    pub open_browser: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("."),
            entry_file: "index.html".to_string(),
            client_script: beside_executable("api.js"),
            open_browser: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ShutdownConfig {
    /// How often the control loop checks for an exit request.
    pub poll_interval_ms: u64,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self { poll_interval_ms: 1000 }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("can't read {}: {source}", path.display())]
    Io { path: PathBuf, source: std::io::Error },

    #[error("can't parse config: {source}")]
    Parse {
        #[from]
        source: toml::de::Error,
    },

    #[error("invalid config: {}", .0.join(", "))]
    Validation(Vec<String>),
}

impl BridgeConfig {
    /// Loads a TOML configuration file.
    ///
    /// Not validated here: command line overrides still apply, call [`BridgeConfig::validate`]
    /// on the final value.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Points the site at a page: its directory becomes the root, its file name the entry file.
    pub fn with_page(mut self, page: &Path) -> Self {
        if let Some(file_name) = page.file_name() {
            self.site.entry_file = file_name.to_string_lossy().into_owned();
        }
        if let Some(parent) = page.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            self.site.root_dir = parent.to_path_buf();
        }
        self
    }

    /// Collects every problem instead of stopping at the first.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.listener.host.trim().is_empty() {
            errors.push("listener.host must not be empty".to_string());
        }
        if self.listener.port == 0 {
            errors.push("listener.port must be non-zero".to_string());
        }
        if self.shutdown.poll_interval_ms == 0 {
            errors.push("shutdown.poll_interval_ms must be non-zero".to_string());
        }
        if self.site.entry_file.is_empty() {
            errors.push("site.entry_file must not be empty".to_string());
        }

        if errors.is_empty() { Ok(()) } else { Err(ConfigError::Validation(errors)) }
    }

    /// `https://localhost:4443/index.html`, or `http://` without TLS.
    pub fn entry_url(&self, tls: bool) -> String {
        let scheme = if tls { "https" } else { "http" };
        format!("{scheme}://{}:{}/{}", self.listener.host, self.listener.port, self.site.entry_file)
    }
}

/// Resolves `file_name` in the directory of the running executable.
fn beside_executable(file_name: &str) -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_default()
        .join(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn defaults() {
        let config = BridgeConfig::default();

        assert_eq!(config.listener.host, "localhost");
        assert_eq!(config.listener.port, 4443);
        assert_eq!(config.shutdown.poll_interval_ms, 1000);
        assert_eq!(config.site.entry_file, "index.html");
        assert!(config.site.open_browser);
        assert!(config.tls.cert_path.ends_with("localhost.pem"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml() {
        let config = BridgeConfig::from_toml(indoc! {r#"
            [listener]
            port = 8443

            [site]
            root_dir = "/srv/app"
            open_browser = false
        "#})
        .unwrap();

        assert_eq!(config.listener.host, "localhost");
        assert_eq!(config.listener.port, 8443);
        assert_eq!(config.site.root_dir, PathBuf::from("/srv/app"));
        assert!(!config.site.open_browser);
        assert_eq!(config.shutdown, ShutdownConfig::default());
    }

    #[test]
    fn validation_collects_all_errors() {
        let config = BridgeConfig::from_toml("listener = { port = 0 }\nshutdown = { poll_interval_ms = 0 }").unwrap();

        let Err(ConfigError::Validation(errors)) = config.validate() else {
            panic!("expect validation error");
        };
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn page_sets_root_and_entry() {
        let config = BridgeConfig::default().with_page(Path::new("/home/me/app/main.html"));
        assert_eq!(config.site.root_dir, PathBuf::from("/home/me/app"));
        assert_eq!(config.site.entry_file, "main.html");

        let config = BridgeConfig::default().with_page(Path::new("main.html"));
        assert_eq!(config.site.root_dir, PathBuf::from("."));
        assert_eq!(config.entry_url(false), "http://localhost:4443/main.html");
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.toml");
        fs::write(&path, "[listener]\nhost = \"127.0.0.1\"\n").unwrap();

        let config = BridgeConfig::load(&path).unwrap();
        assert_eq!(config.listener.host, "127.0.0.1");

        assert!(matches!(BridgeConfig::load(&dir.path().join("missing.toml")), Err(ConfigError::Io { .. })));
        assert!(matches!(BridgeConfig::from_toml("listener = 3"), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn load_leaves_validation_to_caller() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.toml");
        fs::write(&path, "[listener]\nport = 0\n").unwrap();

        let mut config = BridgeConfig::load(&path).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        config.listener.port = 8080;
        assert!(config.validate().is_ok());
    }
}
