use crate::{
    messages::LayoutMessage,
    participant::Participant,
    preferences::PreferenceWriter,
    selector::{
        compute_layout,
        LayoutPolicy,
        RenderPlan,
    },
};
use meetsolis_layout_config::{
    LayoutConfig,
    LayoutMode,
    LayoutPreferences,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUpdate {
    pub plan: RenderPlan,
    /// Some configuration value had to be corrected. Saving the preferences persists the corrected value.
    pub config_corrected: bool,
}

/// Layout state of one meeting. Owns the live [`LayoutConfig`], which is only written back to the preferences
/// on an explicit save.
#[derive(Debug)]
pub struct LayoutSession {
    config: LayoutConfig,
    policy: LayoutPolicy,
    roster: Vec<Participant>,
    writer: Option<PreferenceWriter>,
    unsaved_correction: bool,
}

impl LayoutSession {
    pub fn join(
        prefs: &LayoutPreferences,
        policy: LayoutPolicy,
        usable_tiles_floor: u32,
        writer: Option<PreferenceWriter>,
    ) -> Self {
        let (config, corrected) = LayoutConfig::from_preferences(prefs, usable_tiles_floor);
        if corrected {
            warn!(
                stored = prefs.max_tiles_visible,
                reset_to = config.max_tiles_visible,
                "stored tile cap is unusable, resetting"
            );
        }
        info!(mode = %config.mode, max_tiles = config.max_tiles_visible, "joined meeting layout session");

        Self {
            config,
            policy,
            roster: Vec::new(),
            writer,
            unsaved_correction: corrected,
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn roster(&self) -> &[Participant] {
        &self.roster
    }

    pub fn writer(&self) -> Option<&PreferenceWriter> {
        self.writer.as_ref()
    }

    pub fn plan(&self) -> RenderPlan {
        compute_layout(&self.roster, &self.config, &self.policy)
    }

    #[instrument(level = "debug", skip_all, fields(message = %message))]
    pub fn handle(&mut self, message: LayoutMessage) -> SessionUpdate {
        match message {
            LayoutMessage::RosterChanged(roster) => self.roster = roster,
            LayoutMessage::SetMode(mode) => self.config.mode = mode,
            LayoutMessage::SetMaxTiles(max_tiles_visible) => self.config.max_tiles_visible = max_tiles_visible,
            LayoutMessage::SetHideNoVideo(hide_no_video) => self.config.hide_no_video = hide_no_video,
            LayoutMessage::Pin(identity) => {
                self.config.spotlight_participant_id = Some(identity);
                self.config.mode = LayoutMode::Spotlight;
            }
            LayoutMessage::Unpin => self.config.spotlight_participant_id = None,
            LayoutMessage::SavePreferences => self.save_preferences(),
        }

        let plan = self.plan();
        SessionUpdate {
            config_corrected: plan.config_corrected || self.unsaved_correction,
            plan,
        }
    }

    /// Hands the durable subset of the live config to the background writer without waiting for it.
    pub fn save_preferences(&mut self) {
        let prefs = self.config.preferences();
        match &self.writer {
            Some(writer) => {
                writer.save(prefs);
                self.unsaved_correction = false;
            }
            None => debug!("no preference writer attached, not saving"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        participant::TrackSource,
        preferences::{
            MemoryStorage,
            PreferenceStore,
        },
        selector::TileSlot,
    };
    use meetsolis_layout_config::USABLE_TILES_FLOOR;
    use pretty_assertions::assert_eq;

    fn camera(id: &str) -> Participant {
        Participant::new(id).with_track(TrackSource::Camera, false)
    }

    fn join(prefs: &LayoutPreferences) -> LayoutSession {
        LayoutSession::join(prefs, LayoutPolicy::default(), USABLE_TILES_FLOOR, None)
    }

    #[test]
    fn join_flags_unusable_tile_cap_until_saved() {
        let prefs = LayoutPreferences {
            max_tiles_visible: 3,
            ..Default::default()
        };
        let mut session = join(&prefs);
        assert_eq!(session.config().max_tiles_visible, 25);

        let update = session.handle(LayoutMessage::RosterChanged(vec![camera("a")]));
        assert!(update.config_corrected);
        assert!(!update.plan.config_corrected);

        // Without a writer nothing is persisted, so the flag stays.
        let update = session.handle(LayoutMessage::SavePreferences);
        assert!(update.config_corrected);
    }

    #[test]
    fn roster_changes_recompute_the_plan() {
        let mut session = join(&LayoutPreferences::default());
        assert!(session.plan().is_empty());

        let update = session.handle(LayoutMessage::RosterChanged(vec![camera("a"), camera("b")]));
        assert_eq!(update.plan.mode, LayoutMode::Tiled);
        assert_eq!(update.plan.tiles.len(), 2);
        assert!(!update.config_corrected);

        let update = session.handle(LayoutMessage::RosterChanged(Vec::new()));
        assert!(update.plan.is_empty());
    }

    #[test]
    fn pin_switches_to_spotlight_and_falls_back_when_participant_leaves() {
        let mut session = join(&LayoutPreferences::default());
        session.handle(LayoutMessage::RosterChanged(vec![camera("a"), camera("b"), camera("c")]));

        let update = session.handle(LayoutMessage::Pin("c".to_string()));
        assert_eq!(update.plan.mode, LayoutMode::Spotlight);
        assert_eq!(update.plan.main().unwrap().participant_id, "c");

        let update = session.handle(LayoutMessage::RosterChanged(vec![camera("a"), camera("b")]));
        assert_eq!(session.config().spotlight_participant_id.as_deref(), Some("c"));
        assert_eq!(update.plan.main().unwrap().participant_id, "a");
        assert_eq!(update.plan.tiles[1].slot, TileSlot::Filmstrip { index: 0 });

        session.handle(LayoutMessage::Unpin);
        assert_eq!(session.config().spotlight_participant_id, None);
    }

    #[test]
    fn out_of_range_tile_cap_is_flagged() {
        let mut session = join(&LayoutPreferences::default());
        session.handle(LayoutMessage::RosterChanged((0..5).map(|i| camera(&format!("p{i}"))).collect()));

        let update = session.handle(LayoutMessage::SetMaxTiles(0));
        assert!(update.config_corrected);
        assert_eq!(update.plan.tiles.len(), 1);
        assert_eq!(update.plan.overflow, 4);
    }

    #[tokio::test]
    async fn saving_writes_live_config_as_preferences() {
        let store = PreferenceStore::new(MemoryStorage::new());
        let writer = PreferenceWriter::spawn(store.clone());
        let prefs = LayoutPreferences {
            max_tiles_visible: 2,
            ..Default::default()
        };
        let mut session = LayoutSession::join(&prefs, LayoutPolicy::default(), USABLE_TILES_FLOOR, Some(writer));

        session.handle(LayoutMessage::SetMode(LayoutMode::Sidebar));
        session.handle(LayoutMessage::SetHideNoVideo(true));
        // Live changes stay in memory until saved.
        session.writer().unwrap().flush().await;
        assert_eq!(store.load(), LayoutPreferences::default());

        let update = session.handle(LayoutMessage::SavePreferences);
        assert!(!update.config_corrected);
        session.writer().unwrap().flush().await;

        assert_eq!(
            store.load(),
            LayoutPreferences {
                preferred_mode: LayoutMode::Sidebar,
                max_tiles_visible: 25,
                hide_no_video: true,
            }
        );
    }
}
