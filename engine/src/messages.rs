use crate::participant::Participant;
use derive_more::Display;
use meetsolis_layout_config::LayoutMode;

/// Events a meeting session reacts to, delivered by the video SDK or the user.
#[derive(Debug, Clone, Display)]
pub enum LayoutMessage {
    #[display("RosterChanged({})", _0.len())]
    RosterChanged(Vec<Participant>),
    #[display("SetMode({_0})")]
    SetMode(LayoutMode),
    #[display("SetMaxTiles({_0})")]
    SetMaxTiles(u32),
    #[display("SetHideNoVideo({_0})")]
    SetHideNoVideo(bool),
    /// Pins a participant into the spotlight and switches to spotlight mode.
    #[display("Pin({_0})")]
    Pin(String),
    Unpin,
    SavePreferences,
}
