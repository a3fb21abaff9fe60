//! Meeting layout engine: turns the live participant roster into a render plan for the video grid and keeps
//! the user's layout preferences.

#[macro_use]
extern crate tracing;

pub mod messages;
pub mod participant;
pub mod preferences;
pub mod selector;
mod session;

pub use messages::LayoutMessage;
pub use participant::{
    Participant,
    PublishedTrack,
    TrackSource,
};
pub use preferences::{
    FileStorage,
    MemoryStorage,
    PreferenceStore,
    PreferenceWriter,
    StorageBackend,
};
pub use selector::{
    compute_layout,
    GridDimensions,
    LayoutPolicy,
    RenderPlan,
    TileAssignment,
    TileSlot,
};
pub use session::{
    LayoutSession,
    SessionUpdate,
};
