use crate::LayoutMode;
use clap::Parser;
use std::path::PathBuf;

/// Compute the meeting grid layout for a participant roster.
#[derive(Parser, Debug, Clone)]
#[command(author, version = version(), about, long_about = None)]
pub struct Args {
    /// JSON file with the participant roster as reported by the video SDK.
    #[clap(long, value_name = "FILE")]
    pub roster: PathBuf,

    /// Layout mode to use instead of the stored preference.
    #[clap(long, value_name = "auto|tiled|spotlight|sidebar")]
    pub mode: Option<LayoutMode>,

    /// Maximum number of visible tiles instead of the stored preference.
    #[clap(long = "max-tiles", value_name = "N")]
    pub max_tiles: Option<u32>,

    /// Hide participants without an active video track in the tiled grid.
    #[clap(long = "hide-no-video", value_name = "BOOL")]
    pub hide_no_video: Option<bool>,

    /// Participant identity to pin into the spotlight.
    #[clap(long, value_name = "ID")]
    pub spotlight: Option<String>,

    /// Roster size up to which `auto` mode keeps the tiled grid.
    #[clap(long = "auto-threshold", value_name = "N")]
    pub auto_threshold: Option<usize>,

    /// Keep preferences in memory only, nothing is read from or written to disk.
    #[clap(long, action)]
    pub ephemeral: bool,

    /// Persist the resulting layout settings as the new preferences.
    #[clap(long, action)]
    pub save: bool,

    /// Enables debug logging.
    #[clap(long, short, action)]
    pub verbose: bool,
}

mod config_ext {
    use super::*;
    use config::{
        Map,
        Source,
        Value,
    };
    use std::collections::HashMap;

    impl Source for Args {
        fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
            Box::new((*self).clone())
        }

        fn collect(&self) -> Result<Map<String, Value>, config::ConfigError> {
            let mut cache = HashMap::<String, Value>::new();
            if let Some(threshold) = self.auto_threshold {
                cache.insert("auto_tiled_threshold".to_string(), (threshold as u64).into());
            }
            if self.ephemeral {
                cache.insert("storage".to_string(), crate::StorageKind::Memory.to_string().into());
            }
            if self.verbose {
                cache.insert("verbose".to_string(), true.into());
            }
            Ok(cache)
        }
    }
}

pub fn version() -> String {
    let author = clap::crate_authors!();
    let config_dir_path = crate::get_config_dir().display().to_string();
    let data_dir_path = crate::get_data_dir().display().to_string();

    format!(
        "{}

Authors: {author}

Config directory: {config_dir_path}
Data directory: {data_dir_path}",
        clap::crate_version!()
    )
}
