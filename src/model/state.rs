use std::sync::Arc;

use serde::Serialize;

use super::record::Table;
use super::translation::{Dictionaries, Dictionary};

/// Fetch lifecycle, derived from `loading`, `errors` and `loaded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Loading,
    Loaded,
    Errored,
}

/// Immutable snapshot of the core.
///
/// Transitions never mutate a `State`; they build a new one that shares the
/// untouched parts (`dataset`, `dictionaries`, unchanged output rows) with
/// its predecessor. `version` grows by one on every transition that changed
/// something, so two snapshots with the same version are equal.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct State {
    pub version: u64,
    pub loading: bool,
    pub errors: Option<String>,
    /// A fetch has succeeded at least once.
    pub loaded: bool,
    pub dataset: Table,
    pub dictionaries: Arc<Dictionaries>,
    pub output: Table,
}

impl State {
    pub fn phase(&self) -> Phase {
        if self.loading {
            Phase::Loading
        } else if self.errors.is_some() {
            Phase::Errored
        } else if self.loaded {
            Phase::Loaded
        } else {
            Phase::Idle
        }
    }

    pub fn dictionary(&self, column_id: &str) -> Option<&Dictionary> {
        self.dictionaries.get(column_id)
    }

    /// Successor of `self`, with the version bumped.
    pub(crate) fn next(&self) -> State {
        State {
            version: self.version + 1,
            ..self.clone()
        }
    }
}

/// Wire form of a state, with the derived phase included.
#[derive(Debug, Serialize)]
pub struct Snapshot<'a> {
    pub phase: Phase,
    #[serde(flatten)]
    pub state: &'a State,
}

impl<'a> From<&'a State> for Snapshot<'a> {
    fn from(state: &'a State) -> Self {
        Snapshot {
            phase: state.phase(),
            state,
        }
    }
}
