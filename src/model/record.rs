use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One dataset row: column name -> scalar value, in source column order.
pub type Record = Map<String, Value>;

/// Row-aligned table shared between states.
///
/// Rows are reference counted individually, so writing one cell clones only
/// the row being written and the outer vector of pointers. Every other row is
/// shared with the table it was derived from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Table(Arc<Vec<Arc<Record>>>);

impl Table {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<&Record> {
        self.0.get(index).map(|r| r.as_ref())
    }

    /// Cell value, `Null` when the row exists but lacks the column.
    pub fn cell(&self, index: usize, column_id: &str) -> Option<Value> {
        self.row(index)
            .map(|r| r.get(column_id).cloned().unwrap_or(Value::Null))
    }

    pub fn rows(&self) -> impl Iterator<Item = &Record> {
        self.0.iter().map(|r| r.as_ref())
    }

    /// Index of the first row whose `column_id` cell equals `value`.
    pub fn position(&self, column_id: &str, value: &Value) -> Option<usize> {
        self.rows().position(|r| r.get(column_id) == Some(value))
    }

    /// Returns a new table where only `(index, column_id)` differs.
    ///
    /// `None` when `index` is out of bounds.
    pub fn with_cell(&self, index: usize, column_id: &str, value: Value) -> Option<Table> {
        if index >= self.len() {
            return None;
        }

        let mut rows = self.0.clone();
        let slot = &mut Arc::make_mut(&mut rows)[index];
        Arc::make_mut(slot).insert(column_id.to_string(), value);

        Some(Table(rows))
    }

    /// True when both tables point at the same row storage for `index`.
    pub fn shares_row(&self, other: &Table, index: usize) -> bool {
        match (self.0.get(index), other.0.get(index)) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<Vec<Record>> for Table {
    fn from(records: Vec<Record>) -> Self {
        Table(Arc::new(records.into_iter().map(Arc::new).collect()))
    }
}

impl FromIterator<Record> for Table {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Table(Arc::new(iter.into_iter().map(Arc::new).collect()))
    }
}
