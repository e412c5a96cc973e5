//! Ошибки detection-слоя
//!
//! Рантайм tick'а ошибок не возвращает (fail closed по capability),
//! `DetectionError` появляется только на границах: сборка collaborators и
//! загрузка профилей.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DetectionError {
    #[error("Missing required collaborator: {0}")]
    MissingCollaborator(&'static str),

    #[error("Failed to read detection profile {path:?}: {source}")]
    ProfileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse detection profile: {0}")]
    ProfileParse(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, DetectionError>;
