//! Dataset loaders: the collaborator that produces the records a fetch
//! cycle feeds into the store.

use std::fs;
use std::path::PathBuf;
use std::{thread, time::Duration};

use rand::{thread_rng, Rng};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::FetchConfig;
use crate::error::FetchError;
use crate::model::Record;
use crate::services::encoding;

const BASE_DELAY_MS: u64 = 400;
const MAX_DELAY_MS: u64 = 10_000;

pub trait DatasetLoader {
    fn load(&self) -> Result<Vec<Record>, FetchError>;
}

/// Picks a loader for `source`: http(s) URLs go over the network, anything
/// else (optionally prefixed with `file://`) is read from disk.
pub fn for_source(source: &str, cfg: &FetchConfig) -> Box<dyn DatasetLoader> {
    let source = source.trim();
    if source.starts_with("http://") || source.starts_with("https://") {
        Box::new(HttpLoader {
            url: source.to_string(),
            timeout: cfg.timeout,
            max_attempts: cfg.max_attempts,
        })
    } else {
        let path = source.strip_prefix("file://").unwrap_or(source);
        Box::new(FileLoader {
            path: PathBuf::from(path),
        })
    }
}

/// Parses a JSON array of flat objects into records.
pub fn parse_records(text: &str) -> Result<Vec<Record>, FetchError> {
    let value: Value = serde_json::from_str(text).map_err(|e| FetchError::Parse(e.to_string()))?;
    records_from_value(value)
}

/// Checks that `value` is an array of objects holding only scalars.
pub fn records_from_value(value: Value) -> Result<Vec<Record>, FetchError> {
    let Value::Array(items) = value else {
        return Err(FetchError::Parse("expected a JSON array of records".into()));
    };

    let mut records: Vec<Record> = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let Value::Object(record) = item else {
            return Err(FetchError::Record {
                index,
                reason: "expected an object".into(),
            });
        };

        if let Some((column, _)) = record
            .iter()
            .find(|(_, v)| matches!(v, Value::Array(_) | Value::Object(_)))
        {
            return Err(FetchError::Record {
                index,
                reason: format!("column '{column}' is not a scalar"),
            });
        }

        records.push(record);
    }

    Ok(records)
}

#[derive(Debug, Clone)]
pub struct FileLoader {
    pub path: PathBuf,
}

impl DatasetLoader for FileLoader {
    fn load(&self) -> Result<Vec<Record>, FetchError> {
        let bytes = fs::read(&self.path).map_err(|source| FetchError::Read {
            path: self.path.display().to_string(),
            source,
        })?;

        let decoded = encoding::decode(&bytes);
        if decoded.had_errors {
            warn!(
                path = %self.path.display(),
                encoding = decoded.encoding,
                "dataset file contained undecodable bytes"
            );
        }
        debug!(path = %self.path.display(), encoding = decoded.encoding, "read dataset file");

        parse_records(&decoded.text)
    }
}

#[derive(Debug, Clone)]
pub struct HttpLoader {
    pub url: String,
    pub timeout: Duration,
    pub max_attempts: usize,
}

impl DatasetLoader for HttpLoader {
    fn load(&self) -> Result<Vec<Record>, FetchError> {
        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let attempts = self.max_attempts.max(1);
        let mut last_err = FetchError::Transport("no attempt made".into());

        for attempt in 0..attempts {
            let retry = attempt + 1 < attempts;

            let resp = match client.get(&self.url).send() {
                Ok(r) => r,
                Err(e) => {
                    last_err = FetchError::Transport(e.to_string());
                    if retry {
                        wait(attempt, &self.url, &last_err);
                        continue;
                    }
                    break;
                }
            };

            let status = resp.status();
            let text = match resp.text() {
                Ok(t) => t,
                Err(e) => {
                    last_err = FetchError::Transport(e.to_string());
                    if retry {
                        wait(attempt, &self.url, &last_err);
                        continue;
                    }
                    break;
                }
            };

            if !status.is_success() {
                last_err = FetchError::Http(extract_error_message(status, &text));
                if should_retry_http(status) && retry {
                    wait(attempt, &self.url, &last_err);
                    continue;
                }
                break;
            }

            return parse_records(&text);
        }

        Err(last_err)
    }
}

fn wait(attempt: usize, url: &str, err: &FetchError) {
    let delay = backoff(attempt);
    warn!(url, attempt, delay_ms = delay.as_millis() as u64, error = %err, "retrying dataset fetch");
    thread::sleep(delay);
}

fn backoff(attempt: usize) -> Duration {
    let jitter: u64 = thread_rng().gen_range(0..200);
    let exp = BASE_DELAY_MS.saturating_mul(2_u64.saturating_pow(attempt as u32));
    Duration::from_millis(exp.min(MAX_DELAY_MS) + jitter)
}

fn should_retry_http(status: StatusCode) -> bool {
    status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
}

fn extract_error_message(status: StatusCode, body_text: &str) -> String {
    if let Ok(v) = serde_json::from_str::<Value>(body_text) {
        let msg = v
            .get("error")
            .and_then(|e| e.get("message").or(Some(e)))
            .and_then(|m| m.as_str())
            .or_else(|| v.get("message").and_then(|m| m.as_str()));
        if let Some(msg) = msg {
            return format!("HTTP {}: {}", status.as_u16(), msg);
        }
    }

    let trimmed = body_text.trim();
    let snippet: String = trimmed.chars().take(400).collect();
    if snippet.len() < trimmed.len() {
        format!("HTTP {}: {}...", status.as_u16(), snippet)
    } else {
        format!("HTTP {}: {}", status.as_u16(), snippet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flat_records_in_order() {
        let records = parse_records(r#"[{"product":"Bike","color":"Red","price":10}]"#).unwrap();
        assert_eq!(records.len(), 1);
        let columns: Vec<_> = records[0].keys().cloned().collect();
        assert_eq!(columns, vec!["product", "color", "price"]);
    }

    #[test]
    fn rejects_non_array_documents() {
        assert!(matches!(
            parse_records(r#"{"color":"Red"}"#),
            Err(FetchError::Parse(_))
        ));
    }

    #[test]
    fn names_the_offending_row() {
        let err = parse_records(r#"[{"color":"Red"}, 3]"#).unwrap_err();
        assert!(matches!(err, FetchError::Record { index: 1, .. }));

        let err = parse_records(r#"[{"color":["Red"]}]"#).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid record at index 0: column 'color' is not a scalar"
        );
    }

    #[test]
    fn error_message_prefers_json_fields() {
        let msg = extract_error_message(
            StatusCode::SERVICE_UNAVAILABLE,
            r#"{"error":{"message":"maintenance"}}"#,
        );
        assert_eq!(msg, "HTTP 503: maintenance");

        let msg = extract_error_message(StatusCode::NOT_FOUND, r#"{"error":"no such table"}"#);
        assert_eq!(msg, "HTTP 404: no such table");

        let msg = extract_error_message(StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(msg, "HTTP 502: upstream down");
    }

    #[test]
    fn retries_only_transient_statuses() {
        assert!(should_retry_http(StatusCode::TOO_MANY_REQUESTS));
        assert!(should_retry_http(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(!should_retry_http(StatusCode::NOT_FOUND));
    }

    #[test]
    fn backoff_grows_then_caps() {
        assert!(backoff(0) < Duration::from_millis(BASE_DELAY_MS + 200));
        assert!(backoff(2) >= Duration::from_millis(BASE_DELAY_MS * 4));
        for attempt in [5, 11, 40, 200] {
            assert!(backoff(attempt) < Duration::from_millis(MAX_DELAY_MS + 200));
        }
    }

    #[test]
    fn picks_loader_by_scheme() {
        let cfg = FetchConfig::default();
        // Only the file loader can run without a network; it reports the path it tried.
        let err = for_source("file:///definitely/missing.json", &cfg)
            .load()
            .unwrap_err();
        assert!(err.to_string().contains("/definitely/missing.json"));
    }
}
