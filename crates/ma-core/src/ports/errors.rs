use thiserror::Error;

/// Failures reported by the authentication/profile service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthServiceError {
    /// The service rejected the request, optionally with a user-facing message.
    #[error("request rejected{}", rejection_suffix(.message))]
    Rejected {
        code: Option<String>,
        message: Option<String>,
    },

    #[error("no authenticated user")]
    Unauthenticated,

    #[error("transport error: {0}")]
    Transport(String),
}

fn rejection_suffix(message: &Option<String>) -> String {
    match message {
        Some(message) => format!(": {message}"),
        None => String::new(),
    }
}

impl AuthServiceError {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            code: None,
            message: Some(message.into()),
        }
    }

    /// User-facing message carried by the error, if any.
    pub fn user_message(&self) -> Option<String> {
        match self {
            Self::Rejected {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => Some(message.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_rejection_has_no_user_message() {
        let err = AuthServiceError::Rejected {
            code: Some("E500".into()),
            message: Some("  ".into()),
        };
        assert_eq!(err.user_message(), None);
        assert_eq!(AuthServiceError::Transport("reset".into()).user_message(), None);
    }

    #[test]
    fn rejection_message_is_exposed() {
        let err = AuthServiceError::rejected("Email already in use.");
        assert_eq!(err.user_message().as_deref(), Some("Email already in use."));
        assert_eq!(err.to_string(), "request rejected: Email already in use.");
    }
}
