use std::fmt;

use crate::error::{JobError, StoreError};

/// Reason handed to [`RenderJob::fail`](super::RenderJob::fail).
///
/// Renderers report either a bare message or a structured error; both end up
/// as the job's `errorMessage`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    Text(String),
    Error {
        message: Option<String>,
        display: String,
    },
}

impl Failure {
    pub fn structured(message: Option<impl Into<String>>, display: impl Into<String>) -> Self {
        Failure::Error {
            message: message.map(Into::into),
            display: display.into(),
        }
    }

    pub fn from_error<E: std::error::Error + ?Sized>(err: &E) -> Self {
        Failure::Error {
            message: Some(err.to_string()),
            display: format!("{err:?}"),
        }
    }

    /// The structured message when there is one, the string form otherwise.
    pub fn message(&self) -> &str {
        match self {
            Failure::Text(text) => text,
            Failure::Error {
                message: Some(message),
                ..
            } if !message.is_empty() => message,
            Failure::Error { display, .. } => display,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl From<&str> for Failure {
    fn from(text: &str) -> Self {
        Failure::Text(text.to_string())
    }
}

impl From<String> for Failure {
    fn from(text: String) -> Self {
        Failure::Text(text)
    }
}

impl From<std::io::Error> for Failure {
    fn from(err: std::io::Error) -> Self {
        Failure::from_error(&err)
    }
}

impl From<StoreError> for Failure {
    fn from(err: StoreError) -> Self {
        Failure::from_error(&err)
    }
}

impl From<JobError> for Failure {
    fn from(err: JobError) -> Self {
        Failure::from_error(&err)
    }
}

impl From<reqwest::Error> for Failure {
    fn from(err: reqwest::Error) -> Self {
        Failure::from_error(&err)
    }
}

// The message keeps the whole context chain.
impl From<anyhow::Error> for Failure {
    fn from(err: anyhow::Error) -> Self {
        Failure::Error {
            message: Some(format!("{err:#}")),
            display: format!("{err:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_string_is_the_message() {
        assert_eq!(Failure::from("disk full").message(), "disk full");
        assert_eq!(Failure::from(String::from("disk full")).message(), "disk full");
    }

    #[test]
    fn structured_message_wins_over_display() {
        let failure = Failure::structured(Some("disk full"), "RenderError { code: 28 }");
        assert_eq!(failure.message(), "disk full");
    }

    #[test]
    fn structured_without_message_falls_back_to_display() {
        let failure = Failure::structured(None::<String>, "RenderError { code: 28 }");
        assert_eq!(failure.message(), "RenderError { code: 28 }");

        let failure = Failure::structured(Some(""), "RenderError { code: 28 }");
        assert_eq!(failure.message(), "RenderError { code: 28 }");
    }

    #[test]
    fn std_errors_use_their_display() {
        let io = std::io::Error::other("disk full");
        assert_eq!(Failure::from(io).message(), "disk full");
    }

    #[test]
    fn anyhow_errors_keep_their_context() {
        let err = anyhow::anyhow!("disk full").context("writing frame 12");
        let failure = Failure::from(err);
        assert!(matches!(failure, Failure::Error { .. }));
        assert_eq!(failure.message(), "writing frame 12: disk full");
    }

    #[tokio::test]
    async fn reqwest_errors_use_their_display() {
        let err = reqwest::Client::new()
            .get("not a url")
            .send()
            .await
            .unwrap_err();
        let expected = err.to_string();
        let failure = Failure::from(err);
        assert!(matches!(failure, Failure::Error { .. }));
        assert_eq!(failure.message(), expected);
    }
}
