use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BrochureError>;

#[derive(Debug, Error)]
pub enum BrochureError {
    #[error("no page template available")]
    MissingPageTemplate,

    #[error("flowable cannot fit on any page: {0}")]
    UnplaceableFlowable(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("invalid color: {0}")]
    InvalidColor(String),

    #[error("style '{0}' is not defined")]
    UndefinedStyle(String),

    #[error("style '{0}' is already defined")]
    DuplicateStyle(String),

    #[error("asset error: {0}")]
    Asset(String),

    #[error("pdf inspection failed: {0}")]
    Inspect(String),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl From<lopdf::Error> for BrochureError {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => BrochureError::Io(e),
            other => BrochureError::Inspect(other.to_string()),
        }
    }
}
