use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Exit status used when the run ends with any error other than a failed
/// connection.
pub const EXIT_UNHANDLED: i32 = 1;

/// Exit status used when the transfer endpoint could not be reached.
pub const EXIT_CONNECTION: i32 = 2;

/// Error type covering the different failure cases that can occur while the
/// job harvests, remaps, or publishes booking exports.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when the configuration file is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the CSV writer.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Errors reported by the SSH/SFTP transport.
    #[error("SFTP error: {0}")]
    Ssh(#[from] ssh2::Error),

    /// Raised when a workbook does not contain what the extractor needs.
    #[error("invalid workbook structure: {0}")]
    InvalidWorkbook(String),

    /// Raised when a source row lacks a column the mapping reads.
    #[error("missing source column '{column}'")]
    MissingColumn { column: String },

    /// Raised when a required configuration key is absent.
    #[error("missing setting '{0}'")]
    MissingSetting(String),

    /// Raised when a configuration value cannot be interpreted.
    #[error("invalid value '{value}' for setting '{key}'")]
    InvalidSetting { key: String, value: String },

    /// Raised when the input file pattern is not a valid regular expression.
    #[error("invalid input pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Raised when the endpoint session could not be established.
    #[error("unable to connect to {host}: {reason}")]
    Connection { host: String, reason: String },

    /// Raised when a transfer operation is attempted without a session.
    #[error("transfer client is not connected")]
    NotConnected,

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

impl ToolError {
    /// Process exit status the binary reports for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            ToolError::Connection { .. } => EXIT_CONNECTION,
            _ => EXIT_UNHANDLED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_failures_use_dedicated_exit_code() {
        let error = ToolError::Connection {
            host: "sftp.example.com".into(),
            reason: "refused".into(),
        };
        assert_eq!(error.exit_code(), EXIT_CONNECTION);
        assert_eq!(ToolError::NotConnected.exit_code(), EXIT_UNHANDLED);
        assert_eq!(
            ToolError::MissingColumn {
                column: "Regno".into()
            }
            .exit_code(),
            EXIT_UNHANDLED
        );
    }
}
