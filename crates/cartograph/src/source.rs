//! Where the diagram markup comes from.

use crate::error::{PageError, Result};
use std::future::Future;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramResponse {
    pub status: u16,
    pub body: String,
}

impl DiagramResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn not_found() -> Self {
        Self {
            status: 404,
            body: String::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One-shot fetch of the diagram markup (`GET`, markup-over-text).
///
/// `Err` is a transport failure; HTTP error statuses are reported through
/// [`DiagramResponse::status`].
pub trait DiagramSource {
    fn fetch(&self) -> impl Future<Output = Result<DiagramResponse>>;
}

/// An in-memory response, for embedding and tests.
#[derive(Debug, Clone)]
pub struct StaticSource {
    response: std::result::Result<DiagramResponse, String>,
}

impl StaticSource {
    pub fn new(response: DiagramResponse) -> Self {
        Self {
            response: Ok(response),
        }
    }

    pub fn markup(body: impl Into<String>) -> Self {
        Self::new(DiagramResponse::ok(body))
    }

    pub fn transport_error(message: impl Into<String>) -> Self {
        Self {
            response: Err(message.into()),
        }
    }
}

impl DiagramSource for StaticSource {
    async fn fetch(&self) -> Result<DiagramResponse> {
        self.response.clone().map_err(|message| PageError::Transport { message })
    }
}

/// Reads the diagram from disk; a missing file behaves like a `404`.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DiagramSource for FileSource {
    async fn fetch(&self) -> Result<DiagramResponse> {
        match std::fs::read_to_string(&self.path) {
            Ok(body) => Ok(DiagramResponse::ok(body)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Ok(DiagramResponse::not_found())
            }
            Err(err) => Err(PageError::Transport {
                message: format!("{}: {err}", self.path.display()),
            }),
        }
    }
}
