use super::Participant;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub is_screen_share: bool,
    pub display_name: String,
}

pub fn classify(participant: &Participant) -> Classification {
    let is_screen_share = participant.is_screen_share();
    let name = participant.name_or_identity();
    let display_name = if is_screen_share {
        format!("{name}'s Screen")
    } else {
        name.to_string()
    };

    trace!(identity = %participant.identity, is_screen_share, %display_name, "classified participant");

    Classification {
        is_screen_share,
        display_name,
    }
}

/// The first screen share in roster order. Further screen shares are never surfaced.
pub fn select_screen_share(participants: &[Participant]) -> Option<&Participant> {
    participants.iter().find(|participant| participant.is_screen_share())
}

pub fn filter_camera_participants(participants: &[Participant]) -> Vec<&Participant> {
    participants
        .iter()
        .filter(|participant| !participant.is_screen_share())
        .collect()
}
