use std::path::PathBuf;

use thiserror::Error;

use crate::filter::FilterError;

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Not a media file: {0}")]
    NotMedia(String),

    #[error("Invalid progress value: {0}")]
    InvalidProgress(f64),

    #[error("Not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, MediaError>;
