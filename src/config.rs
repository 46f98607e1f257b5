use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BACKUP_FILE: &str = "./testDB.txt";
pub const DEFAULT_IMAGES_DIR: &str = "images";
pub const DEFAULT_LOG_FILTER: &str = "movie_catalog=debug,tower_http=debug";

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ServerSection {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub enable_cors: Option<bool>,
    pub log_level: Option<String>,
    pub log_json: Option<bool>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CatalogSection {
    pub backup_file_path: Option<String>,
    pub images_dir: Option<String>,
    #[serde(default)]
    pub load_concurrency: Option<usize>, // None = auto-detect
    pub reset_images_dir: Option<bool>,
    pub strict_image_paths: Option<bool>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub catalog: CatalogSection,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
    pub log_level: String,
    pub log_json: bool,
    pub backup_file_path: PathBuf,
    pub images_dir: PathBuf,
    pub load_concurrency: usize,
    pub reset_images_dir: bool,
    /// Reject image filenames that could escape `images_dir`.
    pub strict_image_paths: bool,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let base_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let file = read_config_file(&base_dir)?;

        Ok(Self::resolve(&base_dir, file, |key| std::env::var(key).ok()))
    }

    /// Like `load()`, but an unusable config file only drops the file layer.
    pub fn from_env() -> Self {
        let base_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::from_dir(&base_dir, |key| std::env::var(key).ok())
    }

    pub fn from_dir<F>(base_dir: &Path, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = read_config_file(base_dir).unwrap_or_else(|e| {
            eprintln!(
                "Warning: Failed to load config file: {}. Using environment and defaults.",
                e
            );
            ConfigFile::default()
        });

        Self::resolve(base_dir, file, env)
    }

    /// Merge env vars over the config file over defaults.
    pub fn resolve<F>(base_dir: &Path, file: ConfigFile, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let ConfigFile { server, catalog } = file;

        let host = env("HOST")
            .or(server.host)
            .unwrap_or_else(|| "0.0.0.0".to_string());

        let port = env("PORT")
            .and_then(|p| p.parse().ok())
            .or(server.port)
            .unwrap_or(DEFAULT_PORT);

        let enable_cors = env("ENABLE_CORS")
            .and_then(|v| parse_flag(&v))
            .or(server.enable_cors)
            .unwrap_or(false);

        let log_level = env("RUST_LOG")
            .or(server.log_level)
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        let log_json = env("LOG_JSON")
            .and_then(|v| parse_flag(&v))
            .or(server.log_json)
            .unwrap_or(false);

        let backup_file_path = env("BACKUP_FILE_PATH")
            .or(catalog.backup_file_path)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BACKUP_FILE));

        let images_dir_str = env("IMAGES_DIR")
            .or(catalog.images_dir)
            .unwrap_or_else(|| DEFAULT_IMAGES_DIR.to_string());
        let images_dir = resolve_dir(base_dir, &images_dir_str);

        let load_concurrency = env("LOAD_CONCURRENCY")
            .and_then(|v| v.parse().ok())
            .or(catalog.load_concurrency)
            .filter(|&v| v > 0)
            .unwrap_or_else(default_concurrency);

        let reset_images_dir = env("RESET_IMAGES_DIR")
            .and_then(|v| parse_flag(&v))
            .or(catalog.reset_images_dir)
            .unwrap_or(false);

        let strict_image_paths = env("STRICT_IMAGE_PATHS")
            .and_then(|v| parse_flag(&v))
            .or(catalog.strict_image_paths)
            .unwrap_or(false);

        Self {
            host,
            port,
            enable_cors,
            log_level,
            log_json,
            backup_file_path,
            images_dir,
            load_concurrency,
            reset_images_dir,
            strict_image_paths,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        let base_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::resolve(&base_dir, ConfigFile::default(), |_| None)
    }
}

/// `config.toml` in `base_dir`, or an empty file layer when there is none.
fn read_config_file(base_dir: &Path) -> anyhow::Result<ConfigFile> {
    let config_path = base_dir.join("config.toml");
    if !config_path.exists() {
        return Ok(ConfigFile::default());
    }

    let content = std::fs::read_to_string(&config_path)?;
    Ok(toml::from_str::<ConfigFile>(&content)?)
}

fn resolve_dir(base_dir: &Path, dir: &str) -> PathBuf {
    let path = PathBuf::from(dir);
    if path.is_absolute() {
        path
    } else {
        base_dir.join(path)
    }
}

fn default_concurrency() -> usize {
    num_cpus::get().saturating_sub(1).clamp(2, 8)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
