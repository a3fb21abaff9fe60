//! Decides which participants are rendered, where, and how many did not fit.

use crate::participant::{
    classify,
    Participant,
};
use meetsolis_layout_config::{
    Config,
    LayoutConfig,
    LayoutMode,
};
use serde::Serialize;

/// Tunables of the selection heuristics that are not part of the user's preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutPolicy {
    /// Roster size up to which `auto` keeps the tiled grid when nobody shares a screen.
    pub auto_tiled_threshold: usize,
}

impl Default for LayoutPolicy {
    fn default() -> Self {
        Self {
            auto_tiled_threshold: 9,
        }
    }
}

impl From<&Config> for LayoutPolicy {
    fn from(config: &Config) -> Self {
        Self {
            auto_tiled_threshold: config.auto_tiled_threshold,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TileSlot {
    Main,
    Grid { row: usize, column: usize },
    Filmstrip { index: usize },
    Sidebar { index: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TileAssignment {
    pub participant_id: String,
    pub display_name: String,
    pub is_screen_share: bool,
    pub slot: TileSlot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridDimensions {
    pub rows: usize,
    pub columns: usize,
}

impl GridDimensions {
    /// Near-square grid: `rows = ceil(sqrt(n))`, `columns = ceil(n / rows)`.
    pub fn for_tiles(tiles: usize) -> Self {
        if tiles == 0 {
            return Self { rows: 0, columns: 0 };
        }
        let rows = ceil_sqrt(tiles);
        Self {
            rows,
            columns: tiles.div_ceil(rows),
        }
    }
}

fn ceil_sqrt(n: usize) -> usize {
    let mut root = (n as f64).sqrt() as usize;
    while root * root < n {
        root += 1;
    }
    while root > 1 && (root - 1) * (root - 1) >= n {
        root -= 1;
    }
    root
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderPlan {
    pub requested_mode: LayoutMode,
    /// The sub-mode that was laid out, never [`LayoutMode::Auto`].
    pub mode: LayoutMode,
    pub tiles: Vec<TileAssignment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid: Option<GridDimensions>,
    /// Participants that did not fit, for a "+N more" affordance.
    pub overflow: usize,
    /// Participants left out of the grid because they have no active video.
    pub hidden: usize,
    pub max_tiles_visible: u32,
    /// The supplied tile cap was out of range and has been clamped.
    pub config_corrected: bool,
}

impl RenderPlan {
    fn empty(requested_mode: LayoutMode, mode: LayoutMode, max_tiles_visible: u32, config_corrected: bool) -> Self {
        Self {
            requested_mode,
            mode,
            tiles: Vec::new(),
            grid: None,
            overflow: 0,
            hidden: 0,
            max_tiles_visible,
            config_corrected,
        }
    }

    pub fn main(&self) -> Option<&TileAssignment> {
        self.tiles.iter().find(|tile| tile.slot == TileSlot::Main)
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

fn assign(participant: &Participant, slot: TileSlot) -> TileAssignment {
    let classification = classify(participant);
    TileAssignment {
        participant_id: participant.identity.clone(),
        display_name: classification.display_name,
        is_screen_share: classification.is_screen_share,
        slot,
    }
}

/// Computes the render plan for a roster snapshot. Pure: the same input always yields the same plan.
#[instrument(level = "trace", skip_all, fields(mode = %config.mode, participants = participants.len()))]
pub fn compute_layout(participants: &[Participant], config: &LayoutConfig, policy: &LayoutPolicy) -> RenderPlan {
    let (max_tiles, config_corrected) = config.clamped_max_tiles();
    if config_corrected {
        warn!(
            requested = config.max_tiles_visible,
            clamped = max_tiles,
            "max tiles visible out of range, clamping"
        );
    }
    let max_tiles = max_tiles as usize;

    // Only the first screen share is surfaced, later ones are left out entirely.
    let share_index = participants.iter().position(Participant::is_screen_share);
    let visible = participants
        .iter()
        .enumerate()
        .filter(|(index, participant)| !participant.is_screen_share() || Some(*index) == share_index)
        .map(|(_, participant)| participant)
        .collect::<Vec<_>>();
    let suppressed = participants.len() - visible.len();
    if suppressed > 0 {
        debug!(suppressed, "ignoring additional screen shares");
    }
    let share_position = visible.iter().position(|participant| participant.is_screen_share());

    let mode = match config.mode {
        LayoutMode::Auto if share_position.is_none() && visible.len() <= policy.auto_tiled_threshold => {
            LayoutMode::Tiled
        }
        LayoutMode::Auto => LayoutMode::Spotlight,
        mode => mode,
    };

    let mut plan = RenderPlan::empty(config.mode, mode, max_tiles as u32, config_corrected);
    if visible.is_empty() {
        return plan;
    }

    match mode {
        LayoutMode::Tiled => {
            let eligible = visible
                .iter()
                .copied()
                .filter(|participant| !config.hide_no_video || participant.has_active_video())
                .collect::<Vec<_>>();
            let shown = eligible.len().min(max_tiles);
            let grid = GridDimensions::for_tiles(shown);

            plan.tiles = eligible
                .iter()
                .take(shown)
                .enumerate()
                .map(|(index, participant)| {
                    let slot = TileSlot::Grid {
                        row: index / grid.columns,
                        column: index % grid.columns,
                    };
                    assign(participant, slot)
                })
                .collect();
            plan.grid = (shown > 0).then_some(grid);
            plan.hidden = visible.len() - eligible.len();
            plan.overflow = eligible.len() - shown;
        }
        LayoutMode::Spotlight | LayoutMode::Auto => {
            let main_index = share_position
                .or_else(|| match config.mode {
                    LayoutMode::Auto => most_recent_speaker(&visible),
                    _ => config.spotlight_participant_id.as_ref().and_then(|pinned| {
                        let found = visible.iter().position(|participant| &participant.identity == pinned);
                        if found.is_none() {
                            debug!(%pinned, "pinned participant left the roster, falling back");
                        }
                        found
                    }),
                })
                .unwrap_or(0);

            let filmstrip_cap = max_tiles.saturating_sub(1);
            let rest = visible
                .iter()
                .enumerate()
                .filter(|(index, _)| *index != main_index)
                .map(|(_, participant)| *participant)
                .collect::<Vec<_>>();
            let shown = rest.len().min(filmstrip_cap);

            plan.tiles = std::iter::once(assign(visible[main_index], TileSlot::Main))
                .chain(
                    rest.iter()
                        .take(shown)
                        .enumerate()
                        .map(|(index, participant)| assign(participant, TileSlot::Filmstrip { index })),
                )
                .collect();
            plan.overflow = rest.len() - shown;
        }
        LayoutMode::Sidebar => {
            let main = share_position.map(|index| assign(visible[index], TileSlot::Main));
            let sidebar = visible
                .iter()
                .filter(|participant| !participant.is_screen_share())
                .enumerate()
                .map(|(index, participant)| assign(participant, TileSlot::Sidebar { index }));
            plan.tiles = main.into_iter().chain(sidebar).collect();
        }
    }

    trace!(
        resolved = %plan.mode,
        tiles = plan.tiles.len(),
        overflow = plan.overflow,
        hidden = plan.hidden,
        "computed layout"
    );
    plan
}

/// Index of the participant with the latest activity timestamp. Ties go to the earlier roster entry.
fn most_recent_speaker(participants: &[&Participant]) -> Option<usize> {
    participants
        .iter()
        .enumerate()
        .filter_map(|(index, participant)| participant.last_spoke_at.map(|at| (index, at)))
        .fold(None, |best, (index, at)| match best {
            Some((_, best_at)) if best_at >= at => best,
            _ => Some((index, at)),
        })
        .map(|(index, _)| index)
}
