//! Two-way view synchronisation between the halves of split mode.

use crate::core::{map::Map, slot::MapSlot, slot::SlotMap};

/// Latch guarding the sync handler against the echo of its own write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncState {
    #[default]
    Idle,
    /// A view was copied onto `target`; its next `echoes` view changes are ours
    Propagating { target: MapSlot, echoes: usize },
}

/// What handling one view change did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The partner map was moved to match
    Propagated,
    /// The partner already showed the same view
    AlreadyInSync,
    /// The change was the partner echoing a propagated view
    Echo,
    /// No partner map to sync with
    Skipped,
}

/// View sync for one split-mode session
#[derive(Debug, Default)]
pub struct ViewSync {
    state: SyncState,
    propagations: usize,
}

impl ViewSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Number of times a view was copied across since the last reset
    pub fn propagations(&self) -> usize {
        self.propagations
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Handles a view change of the map in `source`
    ///
    /// The partner's view is only written when it differs, so the two maps
    /// settle after one copy.
    pub fn on_view_changed(&mut self, source: MapSlot, maps: &mut SlotMap<Option<Map>>) -> SyncOutcome {
        if let SyncState::Propagating { target, echoes } = self.state {
            if target == source {
                self.state = match echoes.saturating_sub(1) {
                    0 => SyncState::Idle,
                    echoes => SyncState::Propagating { target, echoes },
                };
                return SyncOutcome::Echo;
            }
        }

        let Some(partner) = source.partner() else {
            return SyncOutcome::Skipped;
        };
        let (from, to) = maps.pair_mut(source, partner);
        let (Some(from), Some(to)) = (from.as_ref(), to.as_mut()) else {
            return SyncOutcome::Skipped;
        };

        let view = *from.view();
        if !to.set_view(view) {
            return SyncOutcome::AlreadyInSync;
        }
        self.state = SyncState::Propagating {
            target: partner,
            echoes: 1,
        };
        self.propagations += 1;
        log::debug!("View sync {} -> {}", source, partner);
        SyncOutcome::Propagated
    }
}
