pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid cartography config: {message}")]
    Config { message: String },

    #[error("Diagram markup could not be parsed: {0}")]
    Markup(#[from] roxmltree::Error),

    #[error("Invalid identifier map JSON: {0}")]
    IdentifierMap(#[from] serde_json::Error),

    #[error("Unrecognized content transform: {input}")]
    Transform { input: String },
}
