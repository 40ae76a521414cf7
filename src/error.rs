use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Reasons an extraction could not produce a real color.
///
/// None of these escape the extraction boundary: the sampler turns them into
/// the fallback gray and `extract_color` turns them into `None`. They exist so
/// the logs say what went wrong.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to fetch {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("fetching {url} returned HTTP {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("image not ready after {0:?}")]
    Timeout(Duration),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported or corrupt image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("decode task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("every sampled pixel was discarded")]
    EmptyHistogram,

    #[error("stored color {0:?} is not #RRGGBB")]
    InvalidHex(String),

    #[error("extraction cancelled")]
    Cancelled,
}
