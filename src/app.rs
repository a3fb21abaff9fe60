use color_eyre::Result;
use eyre::Context as _;
use meetsolis_layout_config::{
    Args,
    Config,
    StorageKind,
};
use meetsolis_layout_engine::{
    participant::adapter,
    FileStorage,
    LayoutMessage,
    LayoutPolicy,
    LayoutSession,
    MemoryStorage,
    PreferenceStore,
    PreferenceWriter,
    SessionUpdate,
    StorageBackend,
};
use std::sync::Arc;

pub struct App {
    args: Args,
    config: Config,
    store: PreferenceStore<Arc<dyn StorageBackend>>,
}

impl App {
    pub fn new(args: Args, config: Config) -> Self {
        let backend: Arc<dyn StorageBackend> = match config.storage {
            StorageKind::File => Arc::new(FileStorage::new(config.data_dir())),
            StorageKind::Memory => Arc::new(MemoryStorage::new()),
        };
        debug!(storage = %config.storage, data_dir = ?config.data_dir(), "preference storage selected");

        Self {
            args,
            config,
            store: PreferenceStore::new(backend),
        }
    }

    pub async fn run(self) -> Result<()> {
        let update = self.compute().await?;
        if update.config_corrected && !self.args.save {
            warn!("The layout configuration had to be corrected, run with --save to persist the corrected values");
        }
        let plan = serde_json::to_string_pretty(&update.plan).context("Failed to serialize render plan")?;
        println!("{plan}");
        Ok(())
    }

    /// Joins a session with the stored preferences, feeds it the roster and the command-line overrides, and
    /// returns the last update once queued preference writes have landed.
    #[instrument(level = "debug", skip(self), fields(roster = ?self.args.roster))]
    pub async fn compute(&self) -> Result<SessionUpdate> {
        let roster_json = std::fs::read_to_string(&self.args.roster)
            .wrap_err_with(|| format!("Failed to read roster from {:?}", self.args.roster))?;
        let roster = adapter::roster_from_json(&roster_json)?;
        info!(participants = roster.len(), "roster loaded");

        let (prefs, corrupt) = self.store.read();
        let writer = PreferenceWriter::spawn(self.store.clone());
        if corrupt {
            writer.save(prefs.clone());
        }
        let mut session = LayoutSession::join(
            &prefs,
            LayoutPolicy::from(&self.config),
            self.config.usable_tiles_floor,
            Some(writer.clone()),
        );

        let mut update = session.handle(LayoutMessage::RosterChanged(roster));
        for message in self.overrides() {
            update = session.handle(message);
        }
        if self.args.save {
            update = session.handle(LayoutMessage::SavePreferences);
            info!(prefs = ?session.config().preferences(), "layout preferences saved");
        }
        writer.flush().await;

        Ok(update)
    }

    fn overrides(&self) -> Vec<LayoutMessage> {
        let mut messages = Vec::new();
        if let Some(mode) = self.args.mode {
            messages.push(LayoutMessage::SetMode(mode));
        }
        if let Some(max_tiles) = self.args.max_tiles {
            messages.push(LayoutMessage::SetMaxTiles(max_tiles));
        }
        if let Some(hide_no_video) = self.args.hide_no_video {
            messages.push(LayoutMessage::SetHideNoVideo(hide_no_video));
        }
        // Pinning implies spotlight mode, so it goes last.
        if let Some(identity) = &self.args.spotlight {
            messages.push(LayoutMessage::Pin(identity.clone()));
        }
        messages
    }
}
