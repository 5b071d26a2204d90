//! Errors returned by the GitHub REST and GraphQL client.
use thiserror::Error;

/// A failed GitHub API call.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The server answered with a non-success status.
    #[error("{method} {path} failed with HTTP {status}: {message}")]
    Status {
        /// HTTP method.
        method: String,
        /// Request path relative to the API root.
        path: String,
        /// HTTP status code.
        status: u16,
        /// `message` from the error body, or the raw body.
        message: String,
    },

    /// The request could not be sent or the response not read.
    #[error("request to {path} failed: {message}")]
    Transport {
        /// Request path or URL.
        path: String,
        /// Underlying failure.
        message: String,
    },

    /// A GraphQL response carried an `errors` array.
    #[error("GraphQL error: {0}")]
    GraphQl(String),

    /// The response body did not have the expected shape.
    #[error("unexpected response from {path}: {message}")]
    Decode {
        /// Request path.
        path: String,
        /// What was wrong.
        message: String,
    },
}

impl ApiError {
    /// HTTP status code, for [`ApiError::Status`].
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// `true` for `422 Unprocessable Entity`, which GitHub returns when a
    /// name is already taken.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self.status(), Some(422))
    }

    /// `true` for `404 Not Found`.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.status(), Some(404))
    }
}

/// `true` when `err` is (or wraps) an [`ApiError`] conflict.
#[must_use]
pub fn is_conflict(err: &anyhow::Error) -> bool {
    err.downcast_ref::<ApiError>().is_some_and(ApiError::is_conflict)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context as _;

    fn status(code: u16) -> ApiError {
        ApiError::Status {
            method: "POST".to_string(),
            path: "/repos/o/r/labels".to_string(),
            status: code,
            message: "Validation Failed".to_string(),
        }
    }

    #[test]
    fn display_includes_status_and_message() {
        assert_eq!(
            status(422).to_string(),
            "POST /repos/o/r/labels failed with HTTP 422: Validation Failed"
        );
    }

    #[test]
    fn conflict_and_not_found() {
        assert!(status(422).is_conflict());
        assert!(!status(404).is_conflict());
        assert!(status(404).is_not_found());
        assert!(!ApiError::GraphQl("x".to_string()).is_conflict());
    }

    #[test]
    fn is_conflict_sees_through_context() {
        let err = Err::<(), _>(status(422))
            .context("creating label")
            .unwrap_err();
        assert!(is_conflict(&err));
        assert!(!is_conflict(&anyhow::anyhow!("plain failure")));
    }
}
