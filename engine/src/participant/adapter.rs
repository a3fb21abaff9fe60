//! Maps participant records as reported by the video SDK onto [`Participant`].

use super::{
    Participant,
    PublishedTrack,
    TrackSource,
};
use chrono::{
    DateTime,
    Utc,
};
use eyre::{
    Context as _,
    Result,
};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SdkParticipant {
    pub identity: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub track_publications: Vec<SdkTrackPublication>,
    /// Epoch milliseconds.
    #[serde(default)]
    pub last_spoke_at: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SdkTrackPublication {
    #[serde(default)]
    pub track_sid: String,
    #[serde(default)]
    pub source: SdkTrackSource,
    #[serde(default)]
    pub kind: SdkTrackKind,
    #[serde(default)]
    pub muted: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SdkTrackSource {
    Camera,
    Microphone,
    ScreenShare,
    ScreenShareAudio,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdkTrackKind {
    Audio,
    Video,
    #[default]
    #[serde(other)]
    Unknown,
}

pub fn from_sdk(participant: &SdkParticipant) -> Participant {
    let tracks = participant
        .track_publications
        .iter()
        .map(|publication| PublishedTrack {
            sid: publication.track_sid.clone(),
            source: track_source(publication.source, publication.kind),
            muted: publication.muted,
        })
        .collect();

    let last_spoke_at = participant.last_spoke_at.and_then(DateTime::<Utc>::from_timestamp_millis);

    Participant {
        identity: participant.identity.clone(),
        name: participant.name.clone(),
        tracks,
        last_spoke_at,
    }
}

fn track_source(source: SdkTrackSource, kind: SdkTrackKind) -> TrackSource {
    match (source, kind) {
        (SdkTrackSource::Camera, _) => TrackSource::Camera,
        (SdkTrackSource::Microphone, _) => TrackSource::Microphone,
        (SdkTrackSource::ScreenShare, _) => TrackSource::ScreenShare,
        (SdkTrackSource::ScreenShareAudio, _) => TrackSource::ScreenShareAudio,
        // Older SDK builds leave the source empty for camera publications.
        (SdkTrackSource::Unknown, SdkTrackKind::Video) => TrackSource::Camera,
        (SdkTrackSource::Unknown, _) => TrackSource::Unknown,
    }
}

/// Parses a JSON array of SDK participant records into a roster, keeping the order.
pub fn roster_from_json(json: &str) -> Result<Vec<Participant>> {
    let records: Vec<SdkParticipant> = serde_json::from_str(json).context("Failed to parse participant roster")?;
    debug!(count = records.len(), "parsed roster");
    Ok(records.iter().map(from_sdk).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn maps_sdk_records() {
        let roster = roster_from_json(
            r#"[
                {
                    "identity": "u-1",
                    "name": "Ada",
                    "trackPublications": [
                        { "trackSid": "TR_a", "source": "camera", "kind": "video", "muted": false },
                        { "trackSid": "TR_b", "source": "microphone", "kind": "audio", "muted": true }
                    ],
                    "lastSpokeAt": 1700000000000
                },
                {
                    "identity": "u-1:screen",
                    "trackPublications": [
                        { "trackSid": "TR_c", "source": "screen_share", "kind": "video" },
                        { "trackSid": "TR_d", "source": "virtual_background", "kind": "video" }
                    ]
                },
                { "identity": "u-2" }
            ]"#,
        )
        .unwrap();

        assert_eq!(roster.len(), 3);
        assert_eq!(roster[0].name.as_deref(), Some("Ada"));
        assert_eq!(
            roster[0].tracks,
            vec![
                PublishedTrack {
                    sid: "TR_a".to_string(),
                    source: TrackSource::Camera,
                    muted: false,
                },
                PublishedTrack {
                    sid: "TR_b".to_string(),
                    source: TrackSource::Microphone,
                    muted: true,
                },
            ]
        );
        assert_eq!(roster[0].last_spoke_at.map(|at| at.timestamp()), Some(1_700_000_000));
        assert!(roster[1].is_screen_share());
        assert_eq!(roster[1].tracks[1].source, TrackSource::Camera);
        assert!(roster[2].tracks.is_empty());
        assert_eq!(roster[2].last_spoke_at, None);
    }

    #[test]
    fn unknown_audio_source_stays_unknown() {
        let roster = roster_from_json(r#"[{ "identity": "x", "trackPublications": [{ "kind": "audio" }] }]"#).unwrap();
        assert_eq!(roster[0].tracks[0].source, TrackSource::Unknown);
        assert!(!roster[0].has_active_video());
    }

    #[test]
    fn rejects_non_array_roster() {
        assert!(roster_from_json(r#"{ "identity": "x" }"#).is_err());
    }
}
