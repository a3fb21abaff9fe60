use chrono::{
    DateTime,
    Utc,
};
use serde::{
    Deserialize,
    Serialize,
};

pub mod adapter;
mod classifier;

pub use classifier::{
    classify,
    filter_camera_participants,
    select_screen_share,
    Classification,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackSource {
    Camera,
    Microphone,
    ScreenShare,
    ScreenShareAudio,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedTrack {
    pub sid: String,
    pub source: TrackSource,
    pub muted: bool,
}

/// A single roster entry, decoupled from the video SDK's own participant type.
///
/// The SDK reports a screen share as its own roster entry, so a user who is sharing shows up twice: once with
/// their camera and once with a [`TrackSource::ScreenShare`] track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub identity: String,
    pub name: Option<String>,
    pub tracks: Vec<PublishedTrack>,
    /// When this participant was last detected speaking.
    pub last_spoke_at: Option<DateTime<Utc>>,
}

impl Participant {
    pub fn new(identity: impl ToString) -> Self {
        Self {
            identity: identity.to_string(),
            name: None,
            tracks: Vec::new(),
            last_spoke_at: None,
        }
    }

    pub fn with_name(mut self, name: impl ToString) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_track(mut self, source: TrackSource, muted: bool) -> Self {
        let sid = format!("TR_{}_{}", self.identity, self.tracks.len());
        self.tracks.push(PublishedTrack { sid, source, muted });
        self
    }

    pub fn with_last_spoke_at(mut self, at: DateTime<Utc>) -> Self {
        self.last_spoke_at = Some(at);
        self
    }

    pub fn is_screen_share(&self) -> bool {
        self.tracks.iter().any(|track| track.source == TrackSource::ScreenShare)
    }

    pub fn has_active_video(&self) -> bool {
        self.tracks
            .iter()
            .any(|track| matches!(track.source, TrackSource::Camera | TrackSource::ScreenShare) && !track.muted)
    }

    /// The name if it is set and not blank, otherwise the identity.
    pub fn name_or_identity(&self) -> &str {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => &self.identity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn muted_camera_is_not_active_video() {
        let participant = Participant::new("alice")
            .with_track(TrackSource::Microphone, false)
            .with_track(TrackSource::Camera, true);
        assert!(!participant.has_active_video());
        assert!(!participant.is_screen_share());

        let participant = participant.with_track(TrackSource::ScreenShare, false);
        assert!(participant.has_active_video());
        assert!(participant.is_screen_share());
    }

    #[test]
    fn blank_name_falls_back_to_identity() {
        assert_eq!(Participant::new("bob").name_or_identity(), "bob");
        assert_eq!(Participant::new("bob").with_name("   ").name_or_identity(), "bob");
        assert_eq!(Participant::new("bob").with_name(" Bob ").name_or_identity(), "Bob");
    }
}
