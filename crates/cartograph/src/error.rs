#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("diagram request failed with HTTP status {status}")]
    Fetch { status: u16 },

    #[error("diagram request failed: {message}")]
    Transport { message: String },

    #[error(transparent)]
    Core(#[from] cartograph_core::Error),

    #[error("invalid navigation URL: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, PageError>;
