use std::sync::Arc;

use tracing::info;

use crate::model::{Dictionaries, Dictionary, Record, State, Table};

pub(super) fn begin_fetch(state: &State) -> Option<State> {
    if state.loading {
        return None;
    }

    let mut next = state.next();
    next.loading = true;
    next.errors = None;
    Some(next)
}

/// Replaces dataset and output with `records`. Output edits are discarded.
pub(super) fn fetch_succeeded(state: &State, records: Vec<Record>) -> State {
    let dataset = Table::from(records);
    info!(rows = dataset.len(), "dataset loaded");

    let mut next = state.next();
    next.loading = false;
    next.errors = None;
    next.loaded = true;
    next.dictionaries = prune_rows(&state.dictionaries, dataset.len());
    next.output = dataset.clone();
    next.dataset = dataset;
    next
}

pub(super) fn fetch_failed(state: &State, message: String) -> State {
    info!(error = %message, "dataset fetch failed");

    let mut next = state.next();
    next.loading = false;
    next.errors = Some(message);
    next
}

/// Drops entries pointing past the end of a dataset of `len` rows.
fn prune_rows(dictionaries: &Arc<Dictionaries>, len: usize) -> Arc<Dictionaries> {
    let in_range = dictionaries
        .values()
        .flat_map(|d| d.keys())
        .all(|id| id.row() < len);
    if in_range {
        return Arc::clone(dictionaries);
    }

    let pruned: Dictionaries = dictionaries
        .iter()
        .map(|(column_id, dict)| {
            let kept: Dictionary = dict
                .iter()
                .filter(|(id, _)| id.row() < len)
                .map(|(id, e)| (*id, e.clone()))
                .collect();
            (column_id.clone(), kept)
        })
        .filter(|(_, dict)| !dict.is_empty())
        .collect();

    Arc::new(pruned)
}
