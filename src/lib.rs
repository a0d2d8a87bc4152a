//! State-transition core for remapping column values of a tabular dataset
//! through per-column translation dictionaries.

pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod model;
pub mod protocol;
pub mod services;
pub mod store;

pub use engine::{reduce, Action};
pub use error::{ConfigError, EngineError, FetchError};
pub use model::{Phase, Record, State, Table, TranslationEntry, TranslationId};
pub use store::Store;
