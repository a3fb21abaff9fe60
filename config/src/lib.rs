#[macro_use]
extern crate tracing;

mod app_config;
mod args;
mod layout;

use app_config::AppConfig;
pub use app_config::{
    get_config_dir,
    get_data_dir,
};
pub use args::Args;
pub use layout::{
    LayoutConfig,
    LayoutMode,
    LayoutPreferences,
    PreferencesError,
    DEFAULT_TILES_VISIBLE,
    MAX_TILES_VISIBLE,
    MIN_TILES_VISIBLE,
    PREFERENCES_KEY,
    USABLE_TILES_FLOOR,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    collections::HashMap,
    path::{
        Path,
        PathBuf,
    },
};
use strum::{
    Display,
    EnumString,
};

/// Backend used for persisting layout preferences.
#[derive(Debug, Default, Clone, Copy, Display, EnumString, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StorageKind {
    #[default]
    File,
    Memory,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(flatten, skip_serializing)]
    app_config: AppConfig,
    pub auto_tiled_threshold: usize,
    pub usable_tiles_floor: u32,
    #[serde(default)]
    pub storage: StorageKind,
    #[serde(default)]
    pub verbose: bool,
}

const DEFAULT_CONFIG: &str = include_str!("default-config.yaml");

impl Default for Config {
    fn default() -> Self {
        serde_yml::from_str(DEFAULT_CONFIG).expect("Failed to parse default config")
    }
}

impl config::Source for Config {
    fn clone_into_box(&self) -> Box<dyn config::Source + Send + Sync> {
        Box::new((*self).clone())
    }

    fn collect(&self) -> Result<config::Map<String, config::Value>, config::ConfigError> {
        let mut cache = HashMap::<String, config::Value>::new();
        cache.insert(
            "auto_tiled_threshold".to_string(),
            (self.auto_tiled_threshold as u64).into(),
        );
        cache.insert(
            "usable_tiles_floor".to_string(),
            u64::from(self.usable_tiles_floor).into(),
        );
        cache.insert("storage".to_string(), self.storage.to_string().into());
        cache.insert("verbose".to_string(), self.verbose.into());
        Ok(cache)
    }
}

impl Config {
    /// Layers the built-in defaults, `config.yaml` from the config directory and the command-line arguments.
    pub fn new(args: Args) -> Result<Self, config::ConfigError> {
        Self::from_dirs(get_data_dir(), get_config_dir(), args)
    }

    pub fn from_dirs(
        data_dir: impl Into<PathBuf>,
        config_dir: impl Into<PathBuf>,
        args: Args,
    ) -> Result<Self, config::ConfigError> {
        let data_dir = data_dir.into();
        let config_dir = config_dir.into();
        let mut builder =
            config::Config::builder().set_default("data_dir", data_dir.to_string_lossy().to_string())?;

        builder = builder.add_source(Config::default());

        let config_files = [("config.yaml", config::FileFormat::Yaml)];

        for (file, format) in &config_files {
            let source = config::File::from(config_dir.join(file))
                .format(*format)
                .required(false);
            builder = builder.add_source(source);
        }

        builder = builder.add_source(args);

        let cfg: Self = builder.build()?.try_deserialize()?;

        debug!(?cfg, ?config_dir, "configuration loaded");

        Ok(cfg)
    }

    pub fn data_dir(&self) -> &Path {
        &self.app_config.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use temp_dir::TempDir;

    #[test]
    fn default_config_parses() {
        let config = Config::default();
        assert_eq!(config.auto_tiled_threshold, 9);
        assert_eq!(config.usable_tiles_floor, USABLE_TILES_FLOOR);
        assert_eq!(config.storage, StorageKind::File);
        assert!(!config.verbose);
    }

    fn args(extra: &[&str]) -> Args {
        use clap::Parser as _;

        let mut argv = vec!["meetsolis-layout", "--roster", "roster.json"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn args_override_defaults() {
        let dir = TempDir::new().unwrap();
        let args = args(&["--auto-threshold", "4", "--ephemeral"]);
        let config = Config::from_dirs(dir.path(), dir.path(), args).unwrap();
        assert_eq!(config.auto_tiled_threshold, 4);
        assert_eq!(config.storage, StorageKind::Memory);
        assert_eq!(config.usable_tiles_floor, 9);
        assert_eq!(config.data_dir(), dir.path());
    }

    #[test]
    fn config_file_sits_between_defaults_and_args() {
        let data = TempDir::new().unwrap();
        let conf = TempDir::new().unwrap();
        std::fs::write(
            conf.path().join("config.yaml"),
            "auto_tiled_threshold: 5\nusable_tiles_floor: 4\nverbose: true\n",
        )
        .unwrap();

        let from_file = Config::from_dirs(data.path(), conf.path(), args(&[])).unwrap();
        assert_eq!(from_file.auto_tiled_threshold, 5);
        assert_eq!(from_file.usable_tiles_floor, 4);
        assert!(from_file.verbose);
        assert_eq!(from_file.storage, StorageKind::File);

        let overridden = Config::from_dirs(data.path(), conf.path(), args(&["--auto-threshold", "12"])).unwrap();
        assert_eq!(overridden.auto_tiled_threshold, 12);
        assert_eq!(overridden.usable_tiles_floor, 4);
    }

    #[test]
    fn malformed_config_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("config.yaml"), "auto_tiled_threshold: [nine]\n").unwrap();
        assert!(Config::from_dirs(dir.path(), dir.path(), args(&[])).is_err());
    }
}
