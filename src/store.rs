//! The single state store.
//!
//! Holds the current [`State`] and applies actions through
//! [`engine::reduce`]. A rejected action leaves the held state untouched.

use tracing::warn;

use crate::engine::{self, Action};
use crate::error::EngineError;
use crate::model::State;
use crate::services::loader::DatasetLoader;

#[derive(Debug, Default)]
pub struct Store {
    state: State,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn dispatch(&mut self, action: Action) -> Result<&State, EngineError> {
        let name = action.name();
        match engine::reduce(&self.state, action) {
            Ok(next) => {
                self.state = next;
                Ok(&self.state)
            }
            Err(e) => {
                warn!(action = name, error = %e, "command rejected");
                Err(e)
            }
        }
    }

    /// Runs a full fetch cycle against `loader`.
    ///
    /// The loader outcome is fed back as `FetchSucceeded` or `FetchFailed`;
    /// neither can be rejected, so this always yields the new state.
    pub fn fetch(&mut self, loader: &dyn DatasetLoader) -> &State {
        self.apply(Action::BeginFetch);

        let outcome = match loader.load() {
            Ok(records) => Action::FetchSucceeded(records),
            Err(e) => Action::FetchFailed(e.to_string()),
        };
        self.apply(outcome);

        &self.state
    }

    fn apply(&mut self, action: Action) {
        if let Ok(next) = engine::reduce(&self.state, action) {
            self.state = next;
        }
    }
}
