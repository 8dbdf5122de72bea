use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config: {0}")]
    Config(#[source] toml::de::Error),

    #[error("invalid test plan: {0}")]
    Plan(#[source] toml::de::Error),

    #[error("test id {id} is used more than once")]
    DuplicateTestId { id: String },

    #[error("invalid manual content: {0}")]
    Content(#[source] toml::de::Error),

    #[error("template slot `{name}` has no content")]
    MissingSlot { name: String },

    #[error("failed to pack DOCX: {0}")]
    Pack(String),

    #[error("typst export failed: {0}")]
    Typst(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
