#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed JSON document: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("failed to replace catalog file: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("image not found: {0:?}")]
    ImageNotFound(String),

    #[error("category not found: {0:?}")]
    CategoryNotFound(String),

    #[error("page {page} out of range ({total_pages} pages total)")]
    PageOutOfRange { page: usize, total_pages: usize },

    #[error("missing required argument `{0}`")]
    MissingArgument(&'static str),

    #[error("invalid value for `{name}`: {value:?}")]
    InvalidArgument { name: &'static str, value: String },

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("no category codes left (01-99 are all assigned)")]
    CategoryCodesExhausted,

    #[error("no image IDs left in category {0}")]
    ImageIdsExhausted(String),
}

pub type Result<T> = std::result::Result<T, Error>;
