//! API error taxonomy and user-facing message formatting.
//!
//! DESIGN
//! ======
//! The backend reports failures in three shapes: a single message string, an
//! array of messages, or a field-keyed validation map. `display_message`
//! normalizes all of them into one display string, falling back to fixed
//! per-status text when no usable body is present. Recoverable 401s never
//! reach this layer — the HTTP wrapper absorbs them.

use std::collections::BTreeMap;

use reqwest::StatusCode;

/// Parsed backend error body. Every field is optional; an empty body is valid.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<Messages>,
    #[serde(default)]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
}

/// Backend `message` field: a plain string or an array of strings.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(untagged)]
pub enum Messages {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("api request failed with status {status}")]
    Status {
        status: StatusCode,
        body: Option<ErrorBody>,
    },
    #[error("network error: {0}")]
    Network(String),
    #[error("response decode error: {0}")]
    Decode(String),
    #[error("http client build failed: {0}")]
    Build(String),
}

impl ApiError {
    /// Status code when the backend answered at all.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// One display string for UI presentation.
    #[must_use]
    pub fn display_message(&self) -> String {
        match self {
            ApiError::Status { status, body } => body
                .as_ref()
                .and_then(body_message)
                .unwrap_or_else(|| status_fallback(*status)),
            ApiError::Network(_) => {
                "Ошибка подключения к серверу. Проверьте подключение к интернету.".to_owned()
            }
            ApiError::Decode(_) | ApiError::Build(_) => "Произошла неизвестная ошибка".to_owned(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

fn body_message(body: &ErrorBody) -> Option<String> {
    if let Some(Messages::Many(list)) = &body.message {
        if !list.is_empty() {
            return Some(list.join(", "));
        }
    }
    if let Some(errors) = &body.errors {
        let joined = errors
            .values()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>();
        if !joined.is_empty() {
            return Some(joined.join(", "));
        }
    }
    if let Some(Messages::One(message)) = &body.message {
        if !message.is_empty() {
            return Some(message.clone());
        }
    }
    None
}

fn status_fallback(status: StatusCode) -> String {
    match status {
        StatusCode::BAD_REQUEST => "Неверный запрос".to_owned(),
        StatusCode::UNAUTHORIZED => "Необходима авторизация".to_owned(),
        StatusCode::FORBIDDEN => "Доступ запрещен".to_owned(),
        StatusCode::NOT_FOUND => "Ресурс не найден".to_owned(),
        StatusCode::CONFLICT => "Конфликт данных".to_owned(),
        StatusCode::UNPROCESSABLE_ENTITY => "Ошибка валидации данных".to_owned(),
        StatusCode::INTERNAL_SERVER_ERROR => "Внутренняя ошибка сервера".to_owned(),
        other => format!("Ошибка {}", other.as_u16()),
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
