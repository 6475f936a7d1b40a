// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the scanner application

use crate::backends::camera::types::BindError;
use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Camera-related errors
    Camera(BindError),
    /// No camera devices found
    NoCameraFound,
    /// Image loading or decoding errors (CLI scan path)
    Image(String),
    /// No QR code was found in the input
    NoCodeFound,
    /// Configuration errors
    Config(String),
    /// Generic error with message
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Camera(e) => write!(f, "Camera error: {}", e),
            AppError::NoCameraFound => write!(f, "No camera devices found"),
            AppError::Image(msg) => write!(f, "Image error: {}", msg),
            AppError::NoCodeFound => write!(f, "No QR code found"),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<BindError> for AppError {
    fn from(err: BindError) -> Self {
        AppError::Camera(err)
    }
}

impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        AppError::Image(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Other(err.to_string())
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}
