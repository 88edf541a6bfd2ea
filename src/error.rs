use std::io;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The input could not be read as a DOCX package.
    #[error("corrupt document: {0}")]
    CorruptDocument(String),

    /// A section or footer the injectors need is absent and cannot be created.
    #[error("missing document structure: {0}")]
    MissingStructure(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Failure while writing the output package.
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("invalid rules file: {0}")]
    Rules(#[from] serde_json::Error),
}

impl From<roxmltree::Error> for Error {
    fn from(err: roxmltree::Error) -> Self {
        Error::CorruptDocument(format!("malformed XML: {err}"))
    }
}
