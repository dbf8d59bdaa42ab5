//! Error types for fool-exchange

use thiserror::Error;

/// Failures reading the seed file during activation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataFileError {
    #[error("Unable to find {file}.")]
    Missing { file: String },

    #[error("Unable to open {file}: {reason}")]
    Unreadable { file: String, reason: String },

    #[error("Data file, {file}, was empty.")]
    Empty { file: String },
}

/// Failures talking to the historical rate API
///
/// These never escape `RateCache::get_rate`; they are logged and turned into
/// an unavailable rate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RateFetchError {
    #[error("Rate API connection failed: {0}")]
    ConnectionFailure(String),

    #[error("Rate API response failed: {0}")]
    ResponseFailure(String),
}

/// Main error type for fool-exchange
#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("Data file error: {0}")]
    DataFile(#[from] DataFileError),

    #[error("Rate fetch error: {0}")]
    RateFetch(#[from] RateFetchError),

    #[error("Invalid seed data: {0}")]
    InvalidSeed(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

/// Result type alias for fool-exchange operations
pub type Result<T> = std::result::Result<T, ExchangeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_file_messages() {
        let missing = DataFileError::Missing {
            file: "initial-data.csv".to_string(),
        };
        assert_eq!(missing.to_string(), "Unable to find initial-data.csv.");

        let empty = DataFileError::Empty {
            file: "initial-data.csv".to_string(),
        };
        assert_eq!(empty.to_string(), "Data file, initial-data.csv, was empty.");
    }

    #[test]
    fn test_wrapping_keeps_kind() {
        let err: ExchangeError = DataFileError::Empty {
            file: "x.csv".to_string(),
        }
        .into();
        assert!(matches!(
            err,
            ExchangeError::DataFile(DataFileError::Empty { .. })
        ));

        let err: ExchangeError = RateFetchError::ConnectionFailure("refused".into()).into();
        assert!(err.to_string().contains("refused"));
    }
}
