use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_DATABASE: &str = "kepegawaian.db";
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct KepegawaianConfig {
    pub database: Option<String>,
    pub upload_dir: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub dist_dir: Option<String>,
}

impl KepegawaianConfig {
    /// A config file with every default spelled out
    pub fn with_defaults() -> Self {
        Self {
            database: Some(DEFAULT_DATABASE.to_string()),
            upload_dir: Some(DEFAULT_UPLOAD_DIR.to_string()),
            host: Some(DEFAULT_HOST.to_string()),
            port: Some(DEFAULT_PORT),
            dist_dir: None,
        }
    }
}

/// Fully resolved settings for the HTTP service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeSettings {
    pub database: PathBuf,
    pub upload_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub dist_dir: Option<PathBuf>,
}

impl ServeSettings {
    pub fn from_config(config: &KepegawaianConfig) -> Self {
        Self {
            database: PathBuf::from(config.database.as_deref().unwrap_or(DEFAULT_DATABASE)),
            upload_dir: PathBuf::from(config.upload_dir.as_deref().unwrap_or(DEFAULT_UPLOAD_DIR)),
            host: config.host.clone().unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: config.port.unwrap_or(DEFAULT_PORT),
            dist_dir: config.dist_dir.as_ref().map(PathBuf::from),
        }
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("kepegawaian.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<KepegawaianConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: KepegawaianConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &KepegawaianConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
