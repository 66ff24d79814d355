use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "marks_predictor.toml";

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub model_path: PathBuf,
    pub scaler_path: PathBuf,
    /// Directory holding `index.html` / `script.js` overrides. The embedded
    /// page is served when unset or when a file is missing.
    pub static_dir: Option<PathBuf>,
    /// Rotating log file. `None` logs to stderr only.
    pub log_file: Option<PathBuf>,
    pub log_max_bytes: u64,
    pub log_backups: usize,
    pub cors: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 10000,
            model_path: PathBuf::from("final_marks_predictor_model.bin"),
            scaler_path: PathBuf::from("scaler.bin"),
            static_dir: None,
            log_file: Some(PathBuf::from("app.log")),
            log_max_bytes: 10_000,
            log_backups: 1,
            cors: true,
        }
    }
}

impl ServiceConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        toml::from_str(&content).map_err(|e| anyhow!(e))
    }

    /// An explicit path must exist; otherwise the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    /// `PORT` overrides the configured port.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_port_var(std::env::var("PORT").ok().as_deref())
    }

    fn apply_port_var(&mut self, value: Option<&str>) -> Result<()> {
        if let Some(raw) = value {
            self.port = raw
                .trim()
                .parse()
                .with_context(|| format!("invalid PORT value '{raw}'"))?;
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg: ServiceConfig = toml::from_str(
            r#"
            port = 8080
            model_path = "artifacts/model.json"
            log_file = "logs/service.log"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.model_path, PathBuf::from("artifacts/model.json"));
        assert_eq!(cfg.scaler_path, PathBuf::from("scaler.bin"));
        assert_eq!(cfg.log_file, Some(PathBuf::from("logs/service.log")));
        assert!(cfg.cors);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ServiceConfig::load(Some(dir.path().join("nope.toml").as_path())).is_err());
    }

    #[test]
    fn load_reads_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("svc.toml");
        fs::write(&path, "host = \"127.0.0.1\"\nlog_backups = 3\n").unwrap();
        let cfg = ServiceConfig::load(Some(path.as_path())).unwrap();
        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.log_backups, 3);
    }

    #[test]
    fn port_variable_overrides_and_validates() {
        let mut cfg = ServiceConfig::default();
        cfg.apply_port_var(None).unwrap();
        assert_eq!(cfg.port, 10000);
        cfg.apply_port_var(Some("5000")).unwrap();
        assert_eq!(cfg.port, 5000);
        assert!(cfg.apply_port_var(Some("not-a-port")).is_err());
    }

    #[test]
    fn listen_addr_combines_host_and_port() {
        let cfg = ServiceConfig {
            host: "127.0.0.1".into(),
            port: 9000,
            ..ServiceConfig::default()
        };
        assert_eq!(cfg.listen_addr().unwrap(), "127.0.0.1:9000".parse::<SocketAddr>().unwrap());
    }
}
