use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("docx parse failed for {file}: {detail}")]
    DocxParse { file: String, detail: String },
}

pub type Result<T> = std::result::Result<T, IndexError>;
