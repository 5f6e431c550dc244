use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataPrepError {
    #[error("I/O error while {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON parse error while {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid vocabulary: {message}")]
    InvalidVocabulary { message: String },
    #[error("unknown source type `{source_type}` in dataset source `{name}`")]
    UnknownSourceType { name: String, source_type: String },
    #[error("dataset source `{name}` is missing column `{column}`")]
    MissingColumn { name: String, column: String },
    #[error("failed to read audio `{path}`: {message}")]
    AudioRead { path: PathBuf, message: String },
    #[error("cannot collate an empty batch")]
    EmptyBatch,
    #[error("{context}: {message}")]
    Runtime {
        context: &'static str,
        message: String,
    },
}

impl DataPrepError {
    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn json(context: &'static str, source: serde_json::Error) -> Self {
        Self::Json { context, source }
    }

    pub(crate) fn invalid_vocabulary(message: impl Into<String>) -> Self {
        Self::InvalidVocabulary {
            message: message.into(),
        }
    }

    pub(crate) fn missing_column(name: impl Into<String>, column: impl Into<String>) -> Self {
        Self::MissingColumn {
            name: name.into(),
            column: column.into(),
        }
    }

    pub(crate) fn audio_read(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::AudioRead {
            path: path.into(),
            message: err.to_string(),
        }
    }

    pub(crate) fn runtime(context: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Runtime {
            context,
            message: err.to_string(),
        }
    }
}
