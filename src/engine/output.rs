use serde_json::Value;

use super::require_loaded;
use crate::error::EngineError;
use crate::model::{State, TranslationId};

/// Writes `value` into `output[row][column_id]`.
///
/// Dictionaries are left alone: the output is edited independently of the
/// entry that names the same row.
pub(super) fn update_translation(
    state: &State,
    value: Value,
    translation_id: TranslationId,
    column_id: &str,
) -> Result<Option<State>, EngineError> {
    require_loaded(state)?;

    let row = translation_id.row();
    let out_of_range = || EngineError::RowOutOfRange {
        row,
        len: state.output.len(),
    };

    let record = state.output.row(row).ok_or_else(out_of_range)?;
    if record.get(column_id) == Some(&value) {
        return Ok(None);
    }

    let output = state
        .output
        .with_cell(row, column_id, value)
        .ok_or_else(out_of_range)?;

    let mut next = state.next();
    next.output = output;
    Ok(Some(next))
}
