use std::sync::Arc;

use serde_json::Value;

use super::require_loaded;
use crate::error::EngineError;
use crate::model::{Dictionary, State, TranslationEntry, TranslationId};

/// Builds the identity dictionary for `column_id` unless one exists.
///
/// An empty dataset produces no entries, so no dictionary is stored.
pub(super) fn create_dictionary(
    state: &State,
    column_id: &str,
) -> Result<Option<State>, EngineError> {
    require_loaded(state)?;

    if state.dictionaries.contains_key(column_id) {
        return Ok(None);
    }

    let dictionary_id = next_dictionary_id(state);
    let dict: Dictionary = (0..state.dataset.len())
        .map(|row| {
            let from = state.dataset.cell(row, column_id).unwrap_or(Value::Null);
            let id = TranslationId(row);
            let entry = TranslationEntry {
                id,
                column_id: column_id.to_string(),
                dictionary_id,
                to: from.clone(),
                from,
            };
            (id, entry)
        })
        .collect();

    if dict.is_empty() {
        return Ok(None);
    }

    let mut next = state.next();
    Arc::make_mut(&mut next.dictionaries).insert(column_id.to_string(), dict);
    Ok(Some(next))
}

/// One past the highest ordinal in use, so a deleted dictionary's ordinal
/// is never handed out again while a later one still holds it.
fn next_dictionary_id(state: &State) -> usize {
    state
        .dictionaries
        .values()
        .filter_map(|d| d.values().next())
        .map(|e| e.dictionary_id + 1)
        .max()
        .unwrap_or(0)
}

/// Removes the dictionary. Output edits made through it stay in place.
pub(super) fn delete_dictionary(state: &State, column_id: &str) -> Option<State> {
    if !state.dictionaries.contains_key(column_id) {
        return None;
    }

    let mut next = state.next();
    Arc::make_mut(&mut next.dictionaries).remove(column_id);
    Some(next)
}

/// Upserts an entry with `to = value`, creating the dictionary if needed.
pub(super) fn create_translation(
    state: &State,
    value: Value,
    translation_id: TranslationId,
    column_id: &str,
) -> Result<Option<State>, EngineError> {
    require_loaded(state)?;

    let row = translation_id.row();
    let from = state
        .dataset
        .cell(row, column_id)
        .ok_or(EngineError::RowOutOfRange {
            row,
            len: state.dataset.len(),
        })?;

    let existing = state.dictionaries.get(column_id);
    if let Some(entry) = existing.and_then(|d| d.get(&translation_id)) {
        if entry.to == value {
            return Ok(None);
        }
    }

    let dictionary_id = existing
        .and_then(|d| d.values().next())
        .map(|e| e.dictionary_id)
        .unwrap_or_else(|| next_dictionary_id(state));

    let mut next = state.next();
    let dict = Arc::make_mut(&mut next.dictionaries)
        .entry(column_id.to_string())
        .or_default();

    dict.entry(translation_id)
        .and_modify(|e| e.to = value.clone())
        .or_insert_with(|| TranslationEntry {
            id: translation_id,
            column_id: column_id.to_string(),
            dictionary_id,
            from,
            to: value,
        });

    Ok(Some(next))
}

/// Removes one entry; a dictionary left empty is removed with it.
pub(super) fn delete_translation(
    state: &State,
    translation_id: TranslationId,
    column_id: &str,
) -> Option<State> {
    let present = state
        .dictionaries
        .get(column_id)
        .is_some_and(|d| d.contains_key(&translation_id));
    if !present {
        return None;
    }

    let mut next = state.next();
    let dictionaries = Arc::make_mut(&mut next.dictionaries);
    let now_empty = match dictionaries.get_mut(column_id) {
        Some(dict) => {
            dict.remove(&translation_id);
            dict.is_empty()
        }
        None => false,
    };
    if now_empty {
        dictionaries.remove(column_id);
    }

    Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Record, Table};
    use serde_json::json;

    fn loaded(rows: Value) -> State {
        let records: Vec<Record> = serde_json::from_value(rows).unwrap();
        let dataset = Table::from(records);
        State {
            loaded: true,
            output: dataset.clone(),
            dataset,
            ..State::default()
        }
    }

    #[test]
    fn create_requires_a_loaded_dataset() {
        let err = create_dictionary(&State::default(), "color").unwrap_err();
        assert_eq!(err, EngineError::DatasetNotLoaded);
    }

    #[test]
    fn create_on_empty_dataset_stores_nothing() {
        let state = loaded(json!([]));
        assert!(create_dictionary(&state, "color").unwrap().is_none());
    }

    #[test]
    fn second_dictionary_gets_next_ordinal() {
        let state = loaded(json!([{"color": "Red", "price": "1"}]));
        let state = create_dictionary(&state, "color").unwrap().unwrap();
        let state = create_dictionary(&state, "price").unwrap().unwrap();

        assert_eq!(state.dictionaries["color"][&TranslationId(0)].dictionary_id, 0);
        assert_eq!(state.dictionaries["price"][&TranslationId(0)].dictionary_id, 1);
    }

    #[test]
    fn ordinals_are_not_reused_after_a_delete() {
        let state = loaded(json!([{"color": "Red", "price": "1", "size": "M"}]));
        let state = create_dictionary(&state, "color").unwrap().unwrap();
        let state = create_dictionary(&state, "price").unwrap().unwrap();
        let state = delete_dictionary(&state, "color").unwrap();
        let state = create_dictionary(&state, "size").unwrap().unwrap();
        let state = create_translation(&state, json!("Rouge"), TranslationId(0), "color")
            .unwrap()
            .unwrap();

        assert_eq!(state.dictionaries["price"][&TranslationId(0)].dictionary_id, 1);
        assert_eq!(state.dictionaries["size"][&TranslationId(0)].dictionary_id, 2);
        assert_eq!(state.dictionaries["color"][&TranslationId(0)].dictionary_id, 3);
    }

    #[test]
    fn missing_column_maps_null_to_null() {
        let state = loaded(json!([{"name": "Bolt"}]));
        let state = create_dictionary(&state, "color").unwrap().unwrap();
        let entry = &state.dictionaries["color"][&TranslationId(0)];
        assert_eq!(entry.from, Value::Null);
        assert_eq!(entry.to, Value::Null);
    }

    #[test]
    fn create_translation_keeps_from_of_existing_entry() {
        let state = loaded(json!([{"color": "Red"}, {"color": "Blue"}]));
        let state = create_dictionary(&state, "color").unwrap().unwrap();
        let state = create_translation(&state, json!("red"), TranslationId(0), "color")
            .unwrap()
            .unwrap();

        let entry = &state.dictionaries["color"][&TranslationId(0)];
        assert_eq!(entry.from, json!("Red"));
        assert_eq!(entry.to, json!("red"));
    }

    #[test]
    fn create_translation_builds_missing_dictionary() {
        let state = loaded(json!([{"color": "Red"}, {"color": "Blue"}]));
        let state = create_translation(&state, json!("blue"), TranslationId(1), "color")
            .unwrap()
            .unwrap();

        let dict = &state.dictionaries["color"];
        assert_eq!(dict.len(), 1);
        assert_eq!(dict[&TranslationId(1)].from, json!("Blue"));
        assert_eq!(dict[&TranslationId(1)].to, json!("blue"));
    }

    #[test]
    fn create_translation_with_same_value_is_noop() {
        let state = loaded(json!([{"color": "Red"}]));
        let state = create_dictionary(&state, "color").unwrap().unwrap();
        let result = create_translation(&state, json!("Red"), TranslationId(0), "color").unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn create_translation_rejects_rows_past_the_dataset() {
        let state = loaded(json!([{"color": "Red"}]));
        let err = create_translation(&state, json!("x"), TranslationId(5), "color").unwrap_err();
        assert_eq!(err, EngineError::RowOutOfRange { row: 5, len: 1 });
    }

    #[test]
    fn delete_translation_on_missing_targets_is_noop() {
        let state = loaded(json!([{"color": "Red"}]));
        assert!(delete_translation(&state, TranslationId(0), "color").is_none());

        let state = create_dictionary(&state, "color").unwrap().unwrap();
        assert!(delete_translation(&state, TranslationId(3), "color").is_none());
    }
}
