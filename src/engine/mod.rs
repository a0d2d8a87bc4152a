//! Action processor: the pure `(State, Action) -> State` transition.
//!
//! Every command lands in [`reduce`]. A command either produces a successor
//! state (version bumped), leaves the state as it was (no-op, same version),
//! or is rejected with an [`EngineError`], in which case the caller keeps the
//! state it passed in.

mod dataset;
mod dictionary;
mod output;

use serde_json::Value;
use tracing::debug;

use crate::error::EngineError;
use crate::model::{Record, State, TranslationId};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    BeginFetch,
    FetchSucceeded(Vec<Record>),
    FetchFailed(String),
    CreateDictionary {
        column_id: String,
    },
    DeleteDictionary {
        column_id: String,
    },
    CreateTranslation {
        value: Value,
        translation_id: TranslationId,
        column_id: String,
    },
    UpdateTranslation {
        value: Value,
        translation_id: TranslationId,
        column_id: String,
    },
    DeleteTranslation {
        translation_id: TranslationId,
        column_id: String,
    },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::BeginFetch => "begin_fetch",
            Action::FetchSucceeded(_) => "fetch_succeeded",
            Action::FetchFailed(_) => "fetch_failed",
            Action::CreateDictionary { .. } => "create_dictionary",
            Action::DeleteDictionary { .. } => "delete_dictionary",
            Action::CreateTranslation { .. } => "create_translation",
            Action::UpdateTranslation { .. } => "update_translation",
            Action::DeleteTranslation { .. } => "delete_translation",
        }
    }
}

pub fn reduce(state: &State, action: Action) -> Result<State, EngineError> {
    let name = action.name();

    let next = match action {
        Action::BeginFetch => dataset::begin_fetch(state),
        Action::FetchSucceeded(records) => Some(dataset::fetch_succeeded(state, records)),
        Action::FetchFailed(message) => Some(dataset::fetch_failed(state, message)),

        Action::CreateDictionary { column_id } => {
            dictionary::create_dictionary(state, &column_id)?
        }
        Action::DeleteDictionary { column_id } => {
            dictionary::delete_dictionary(state, &column_id)
        }
        Action::CreateTranslation {
            value,
            translation_id,
            column_id,
        } => dictionary::create_translation(state, value, translation_id, &column_id)?,
        Action::DeleteTranslation {
            translation_id,
            column_id,
        } => dictionary::delete_translation(state, translation_id, &column_id),

        Action::UpdateTranslation {
            value,
            translation_id,
            column_id,
        } => output::update_translation(state, value, translation_id, &column_id)?,
    };

    match next {
        Some(next) => {
            debug!(action = name, version = next.version, "state advanced");
            Ok(next)
        }
        None => {
            debug!(action = name, version = state.version, "no-op");
            Ok(state.clone())
        }
    }
}

fn require_loaded(state: &State) -> Result<(), EngineError> {
    if state.loaded {
        Ok(())
    } else {
        Err(EngineError::DatasetNotLoaded)
    }
}
