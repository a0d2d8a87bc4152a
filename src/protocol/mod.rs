//! JSON line protocol between the rendering layer and the store.
//!
//! One request per line: `{"id": .., "cmd": "..", "payload": {..}}`.
//! One response per line: `{"id": .., "status": "ok", "payload": {..}}` or
//! `{"id": .., "status": "error", "message": ".."}`.

use serde_json::{json, Value};
use tracing::debug;

use crate::config::Config;
use crate::engine::Action;
use crate::error::{EngineError, FetchError};
use crate::model::{Record, Snapshot, State, TranslationId};
use crate::services::loader::{self, records_from_value};
use crate::store::Store;

mod command;
pub use command::Command;

fn get_cmd(req: &Value) -> &str {
    req.get("cmd").and_then(|v| v.as_str()).unwrap_or("")
}

fn get_id(req: &Value) -> Value {
    req.get("id").cloned().unwrap_or(Value::Null)
}

fn get_payload(req: &Value) -> &Value {
    static EMPTY: Value = Value::Null;
    req.get("payload").unwrap_or(&EMPTY)
}

fn ok(id: Value, payload: Value) -> String {
    json!({
        "id": id,
        "status": "ok",
        "payload": payload
    })
    .to_string()
}

fn err(id: Value, message: impl Into<String>) -> String {
    json!({
        "id": id,
        "status": "error",
        "message": message.into()
    })
    .to_string()
}

fn snapshot(state: &State) -> Value {
    json!({ "state": Snapshot::from(state) })
}

fn required_str<'a>(payload: &'a Value, key: &str) -> Result<&'a str, String> {
    payload
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("payload.{key} is required"))
}

fn required_value(payload: &Value, key: &str) -> Result<Value, String> {
    payload
        .get(key)
        .cloned()
        .ok_or_else(|| format!("payload.{key} is required"))
}

fn translation_id(payload: &Value) -> Result<TranslationId, String> {
    required_str(payload, "translation_id")?
        .parse()
        .map_err(|e: EngineError| e.to_string())
}

fn records_from_payload(payload: &Value) -> Result<Vec<Record>, String> {
    let records = payload
        .get("records")
        .filter(|v| v.is_array())
        .cloned()
        .ok_or_else(|| "payload.records must be an array".to_string())?;

    records_from_value(records).map_err(|e| e.to_string())
}

/// Store plus the configuration the `fetch` command needs.
#[derive(Debug, Default)]
pub struct Session {
    store: Store,
    config: Config,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self {
            store: Store::new(),
            config,
        }
    }

    pub fn state(&self) -> &State {
        self.store.state()
    }

    pub fn handle(&mut self, input: &str) -> String {
        let req: Value = match serde_json::from_str(input) {
            Ok(v) => v,
            Err(_) => {
                return json!({
                    "status": "error",
                    "message": "invalid json"
                })
                .to_string();
            }
        };

        let id = get_id(&req);
        let cmd_str = get_cmd(&req);
        let payload = get_payload(&req);

        debug!(cmd = cmd_str, "request");

        let action = match Command::from(cmd_str) {
            Command::Ping => return ok(id, json!({ "message": "remap-core alive" })),
            Command::State => return ok(id, snapshot(self.store.state())),
            Command::Fetch => return self.fetch(id, payload),
            Command::RecordFind => return self.find_record(id, payload),
            Command::Unknown => return err(id, "unknown command"),
            other => match action_from(other, payload) {
                Ok(Some(action)) => action,
                Ok(None) => return ok(id, snapshot(self.store.state())),
                Err(e) => return err(id, e),
            },
        };

        match self.store.dispatch(action) {
            Ok(state) => ok(id, snapshot(state)),
            Err(e) => err(id, e.to_string()),
        }
    }

    fn fetch(&mut self, id: Value, payload: &Value) -> String {
        let if_empty = payload
            .get("if_empty")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        let state = self.store.state();
        if if_empty && state.loaded && !state.dataset.is_empty() {
            return ok(id, snapshot(state));
        }

        let source = payload
            .get("source")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .or_else(|| self.config.source.clone());
        let Some(source) = source else {
            return err(id, FetchError::NoSource.to_string());
        };

        let loader = loader::for_source(&source, &self.config.fetch);
        let state = self.store.fetch(loader.as_ref());
        ok(id, snapshot(state))
    }

    fn find_record(&self, id: Value, payload: &Value) -> String {
        let column_id = match required_str(payload, "column_id") {
            Ok(v) => v,
            Err(e) => return err(id, e),
        };
        let value = match required_value(payload, "value") {
            Ok(v) => v,
            Err(e) => return err(id, e),
        };

        let dataset = &self.store.state().dataset;
        match dataset.position(column_id, &value) {
            Some(index) => ok(id, json!({ "index": index, "record": dataset.row(index) })),
            None => ok(id, json!({ "index": null, "record": null })),
        }
    }
}

/// Maps a store command to its action. `None` means the request names
/// nothing that can exist and leaves the state as is.
fn action_from(cmd: Command, payload: &Value) -> Result<Option<Action>, String> {
    let action = match cmd {
        Command::FetchBegin => Action::BeginFetch,
        Command::FetchSucceeded => Action::FetchSucceeded(records_from_payload(payload)?),
        Command::FetchFailed => {
            Action::FetchFailed(required_str(payload, "message")?.to_string())
        }
        Command::DictionaryCreate => Action::CreateDictionary {
            column_id: required_str(payload, "column_id")?.to_string(),
        },
        Command::DictionaryDelete => Action::DeleteDictionary {
            column_id: required_str(payload, "column_id")?.to_string(),
        },
        Command::TranslationCreate => Action::CreateTranslation {
            value: required_value(payload, "value")?,
            translation_id: translation_id(payload)?,
            column_id: required_str(payload, "column_id")?.to_string(),
        },
        Command::TranslationUpdate => Action::UpdateTranslation {
            value: required_value(payload, "value")?,
            translation_id: translation_id(payload)?,
            column_id: required_str(payload, "column_id")?.to_string(),
        },
        Command::TranslationDelete => {
            let column_id = required_str(payload, "column_id")?.to_string();
            // An id outside the `translation_{i}` form cannot match any entry.
            match translation_id(payload) {
                Ok(translation_id) => Action::DeleteTranslation {
                    translation_id,
                    column_id,
                },
                Err(e) if payload.get("translation_id").is_some_and(Value::is_string) => {
                    debug!(column_id = %column_id, reason = %e, "translation.delete names no entry");
                    return Ok(None);
                }
                Err(e) => return Err(e),
            }
        }
        Command::Ping
        | Command::State
        | Command::Fetch
        | Command::RecordFind
        | Command::Unknown => return Err("unknown command".into()),
    };
    Ok(Some(action))
}
