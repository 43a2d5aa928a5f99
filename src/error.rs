use thiserror::Error;

/// Errors raised at the collaborator boundaries (user store, passage source,
/// history log). The session engine itself is infallible.
#[derive(Debug, Error)]
pub enum Error {
    #[error("user store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// Username or password was blank after trimming.
    #[error("Enter both")]
    MissingCredentials,

    #[error("Invalid")]
    InvalidCredentials,

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("text unavailable: {0}")]
    TextUnavailable(String),

    #[error("logging setup failed: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_errors_render_as_status_text() {
        assert_eq!(Error::MissingCredentials.to_string(), "Enter both");
        assert_eq!(Error::InvalidCredentials.to_string(), "Invalid");
        assert_eq!(
            Error::UserNotFound("ada".into()).to_string(),
            "User not found: ada"
        );
    }

    #[test]
    fn io_errors_convert() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::Other, "boom").into();
        assert!(matches!(err, Error::Io(_)));
    }
}
