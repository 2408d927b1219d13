//! 错误类型（仅外围层使用；检测本身不会失败）
use std::path::PathBuf;

/// 外围层的错误
#[derive(Debug, thiserror::Error)]
pub enum HasbinError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write results: {0}")]
    Write(#[from] std::io::Error),

    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("parallel scan incomplete: {0}")]
    Worker(String),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid environment profile {path}: {source}")]
    Profile {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid file name pattern: {0}")]
    Pattern(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, HasbinError>;
