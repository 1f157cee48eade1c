//! Configuration Vault – reads/writes `~/.lightmap/config.toml`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

use lightmap_memory::mindmap::DEFAULT_ROOT_LABEL;
use lightmap_server::DEFAULT_PORT;

/// Console log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Compact => write!(f, "compact"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

/// Persisted configuration stored in `~/.lightmap/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Address the HTTP API binds to.
    #[serde(default = "default_bind_address")]
    pub bind_address: IpAddr,

    /// HTTP port for the API.
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Label of the synthetic root shown at the top of the mind map.
    #[serde(default = "default_root_label")]
    pub root_label: String,
}

fn default_bind_address() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_root_label() -> String {
    DEFAULT_ROOT_LABEL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            log_format: LogFormat::default(),
            root_label: default_root_label(),
        }
    }
}

/// Return the path to `~/.lightmap/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".lightmap").join("config.toml")
}

/// Load the config from disk.  Returns `None` if the file does not exist.
/// Environment overrides are applied by [`effective`].
pub fn load() -> Result<Option<Config>, String> {
    load_from(&config_path())
}

/// Resolve the configuration to run with.
///
/// A missing or unreadable file falls back to [`Config::default`].
/// `LIGHTMAP_*` overrides apply in every case; a load error is handed back
/// so the caller can report it.
pub fn effective(loaded: Result<Option<Config>, String>) -> (Config, Option<String>) {
    let (mut cfg, error) = match loaded {
        Ok(cfg) => (cfg.unwrap_or_default(), None),
        Err(e) => (Config::default(), Some(e)),
    };
    apply_env_overrides(&mut cfg);
    (cfg, error)
}

/// Load the config from a specific path, without environment overrides.
pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let cfg: Config =
        toml::from_str(&raw).map_err(|e| format!("Failed to parse config: {}", e))?;
    Ok(Some(cfg))
}

/// Apply `LIGHTMAP_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `LIGHTMAP_BIND` | `bind_address` |
/// | `LIGHTMAP_PORT` | `port` |
/// | `LIGHTMAP_ROOT_LABEL` | `root_label` |
///
/// Unparseable values are ignored.
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("LIGHTMAP_BIND")
        && let Ok(addr) = v.parse::<IpAddr>()
    {
        cfg.bind_address = addr;
    }
    if let Ok(v) = std::env::var("LIGHTMAP_PORT")
        && let Ok(port) = v.parse::<u16>()
    {
        cfg.port = port;
    }
    if let Ok(v) = std::env::var("LIGHTMAP_ROOT_LABEL")
        && !v.trim().is_empty()
    {
        cfg.root_label = v;
    }
}

/// Save the config to disk, creating `~/.lightmap/` if necessary.
pub fn save(cfg: &Config) -> Result<(), String> {
    save_to(cfg, &config_path())
}

/// Save the config to a specific path.
pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(parent, fs::Permissions::from_mode(0o700))
                .map_err(|e| format!("Failed to set config directory permissions: {}", e))?;
        }
    }
    let raw =
        toml::to_string_pretty(cfg).map_err(|e| format!("Failed to serialize config: {}", e))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut f| {
                use std::io::Write;
                f.write_all(raw.as_bytes())
            })
            .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    }
    #[cfg(not(unix))]
    fs::write(path, raw)
        .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    Ok(())
}
