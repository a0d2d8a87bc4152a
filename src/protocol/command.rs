#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ping,
    State,
    Fetch,
    FetchBegin,
    FetchSucceeded,
    FetchFailed,
    DictionaryCreate,
    DictionaryDelete,
    TranslationCreate,
    TranslationUpdate,
    TranslationDelete,
    RecordFind,
    Unknown,
}

impl From<&str> for Command {
    fn from(s: &str) -> Self {
        match s {
            "ping" => Command::Ping,
            "state" => Command::State,
            "fetch" => Command::Fetch,
            "fetch.begin" => Command::FetchBegin,
            "fetch.succeeded" => Command::FetchSucceeded,
            "fetch.failed" => Command::FetchFailed,
            "dictionary.create" => Command::DictionaryCreate,
            "dictionary.delete" => Command::DictionaryDelete,
            "translation.create" => Command::TranslationCreate,
            "translation.update" => Command::TranslationUpdate,
            "translation.delete" => Command::TranslationDelete,
            "record.find" => Command::RecordFind,
            _ => Command::Unknown,
        }
    }
}
