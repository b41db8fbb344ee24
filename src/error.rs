//! Error types.

use std::path::PathBuf;

/// Error enumerates the possible httpasn error states.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Returned by [`normalize`][crate::address::normalize] when the text is neither a
    /// dotted-quad IPv4 address with octets in `[0, 255]` nor a valid IPv6 address.
    ///
    /// Callers should treat this as "no containment possible", not as a fatal condition.
    #[error("malformed address: \"{0}\"")]
    MalformedAddress(String),

    /// Returned when the range table source file can't be opened.
    #[error("range table source {} is unavailable", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Returned when the gzip compressed range table source can't be decompressed.
    #[error("range table source could not be decompressed")]
    DecompressionFailed(#[source] std::io::Error),

    /// Returned when a generic IO error occurs.
    #[error("an IO error occurred")]
    IO(#[from] std::io::Error),

    /// Returned when [trying to load a `Config`][crate::config::Config::try_from_file] fails
    /// due to invalid JSON content.
    #[error("invalid JSON")]
    InvalidJSON(#[from] serde_json::Error),
}
