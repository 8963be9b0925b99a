use std::fmt;

/// Failures talking to the LLM provider. All of them are retryable from the
/// caller's point of view; nothing is committed before a call succeeds.
#[derive(Debug)]
pub enum LlmError {
    MissingApiKey,
    Http(reqwest::Error),
    Status { status: u16, message: String },
    EmptyCompletion,
    MalformedJson { error: serde_json::Error, raw: String },
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::MissingApiKey => write!(f, "OPENROUTER_API_KEY is not set"),
            LlmError::Http(e) => write!(f, "OpenRouter request failed: {e}"),
            LlmError::Status { status, message } => {
                write!(f, "OpenRouter request failed ({status}): {message}")
            }
            LlmError::EmptyCompletion => write!(f, "Model response was empty"),
            LlmError::MalformedJson { error, raw } => {
                write!(f, "Failed to parse model JSON: {error}. Raw response: {raw}")
            }
        }
    }
}

impl std::error::Error for LlmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LlmError::Http(e) => Some(e),
            LlmError::MalformedJson { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        LlmError::Http(e)
    }
}

pub type Result<T> = std::result::Result<T, LlmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message() {
        let e = LlmError::Status {
            status: 401,
            message: "No auth credentials found".into(),
        };
        assert_eq!(
            e.to_string(),
            "OpenRouter request failed (401): No auth credentials found"
        );
    }

    #[test]
    fn test_malformed_json_keeps_raw_text() {
        let error = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let e = LlmError::MalformedJson {
            error,
            raw: "{oops".into(),
        };
        assert!(e.to_string().ends_with("Raw response: {oops"));
        assert!(std::error::Error::source(&e).is_some());
    }
}
