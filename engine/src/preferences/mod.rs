mod backend;
mod writer;

pub use backend::{
    FileStorage,
    MemoryStorage,
    StorageBackend,
};
use eyre::{
    Context as _,
    Result,
};
use meetsolis_layout_config::{
    LayoutPreferences,
    PREFERENCES_KEY,
};
pub use writer::PreferenceWriter;

/// Owns the durable layout preferences behind a single key of an injected storage backend.
#[derive(Debug, Clone)]
pub struct PreferenceStore<B> {
    backend: B,
    key: String,
}

impl<B: StorageBackend> PreferenceStore<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            key: PREFERENCES_KEY.to_string(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Reads the stored preferences. Never fails: absent, unreadable or corrupt values give the defaults, and
    /// a corrupt value is overwritten with them.
    pub fn load(&self) -> LayoutPreferences {
        let (prefs, corrupt) = self.read();
        if corrupt {
            self.save(&prefs);
        }
        prefs
    }

    /// Like [`load`](Self::load) but leaves storage untouched. The flag is set when the stored value is
    /// corrupt and should be replaced by the returned defaults, e.g. through a
    /// [`PreferenceWriter`](super::PreferenceWriter).
    #[instrument(level = "debug", skip(self), fields(key = %self.key))]
    pub fn read(&self) -> (LayoutPreferences, bool) {
        let raw = match self.backend.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("no stored layout preferences, using defaults");
                return (LayoutPreferences::default(), false);
            }
            Err(err) => {
                warn!("Failed to read layout preferences: {err:#}");
                return (LayoutPreferences::default(), false);
            }
        };

        match parse(&raw) {
            Ok(prefs) => {
                debug!(?prefs, "loaded layout preferences");
                (prefs, false)
            }
            Err(err) => {
                warn!("Stored layout preferences are corrupt, resetting to defaults: {err:#}");
                (LayoutPreferences::default(), true)
            }
        }
    }

    /// Best-effort write. Failures are logged and otherwise ignored.
    pub fn save(&self, prefs: &LayoutPreferences) {
        match self.try_save(prefs) {
            Ok(()) => debug!(?prefs, "saved layout preferences"),
            Err(err) => warn!("Failed to save layout preferences: {err:#}"),
        }
    }

    pub fn try_save(&self, prefs: &LayoutPreferences) -> Result<()> {
        let content = serde_json::to_string(prefs).context("Failed to serialize layout preferences")?;
        self.backend.set(&self.key, &content)
    }

    pub fn clear(&self) {
        if let Err(err) = self.backend.remove(&self.key) {
            warn!("Failed to clear layout preferences: {err:#}");
        }
    }
}

fn parse(raw: &str) -> Result<LayoutPreferences> {
    let prefs: LayoutPreferences = serde_json::from_str(raw).context("invalid JSON")?;
    prefs.validate()?;
    Ok(prefs)
}
