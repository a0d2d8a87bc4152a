pub mod record;
pub mod state;
pub mod translation;

pub use record::{Record, Table};
pub use state::{Phase, Snapshot, State};
pub use translation::{Dictionaries, Dictionary, TranslationEntry, TranslationId};
