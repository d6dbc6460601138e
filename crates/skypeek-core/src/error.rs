//! Shared error types for SkyPeek.
//!
//! Network and configuration failures are classified here so that every
//! crate reports them the same way:
//! - `Display` carries the technical detail for logs
//! - `user_message()` gives the text shown in the widget

use thiserror::Error;

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => {
                "Не удалось подключиться к серверу. Проверьте соединение."
            }
            NetworkError::Timeout => "Сервер не ответил вовремя. Попробуйте ещё раз.",
            NetworkError::ServerError { status, .. } if *status >= 500 => {
                "Сервер временно недоступен. Попробуйте позже."
            }
            NetworkError::ServerError { .. } => "Запрос не выполнен. Попробуйте ещё раз.",
            NetworkError::InvalidResponse(_) => "Получен некорректный ответ сервера.",
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Некорректная конфигурация. Проверьте настройки.",
            ConfigError::ParseError(_) => "Файл конфигурации повреждён. Проверьте настройки.",
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_connect() {
            NetworkError::ConnectionFailed(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else if self.is_decode() {
            NetworkError::InvalidResponse(self.to_string())
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}
