//! Error handling for WASM bindings.
//!
//! Converts readnav's error types into JavaScript `Error` objects carrying a
//! `code` property.

use readnav_core::{ConfigError, NavError};
use readnav_traits::SurfaceError;
use thiserror::Error;
use wasm_bindgen::prelude::*;

/// Error codes for TypeScript consumption.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Invalid or malformed configuration
    Config,
    /// A required page element is missing
    MissingElement,
    /// No heading with the requested id
    UnknownHeading,
    /// The navigator was already destroyed
    Destroyed,
    /// The DOM refused an operation
    Dom,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Config => "CONFIG_ERROR",
            ErrorCode::MissingElement => "MISSING_ELEMENT",
            ErrorCode::UnknownHeading => "UNKNOWN_HEADING",
            ErrorCode::Destroyed => "DESTROYED",
            ErrorCode::Dom => "DOM_ERROR",
        }
    }
}

/// A JavaScript-friendly error.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct ReadNavError {
    code: ErrorCode,
    message: String,
}

impl ReadNavError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<NavError> for ReadNavError {
    fn from(err: NavError) -> Self {
        let code = match &err {
            NavError::UnknownHeading(_) => ErrorCode::UnknownHeading,
            NavError::TornDown => ErrorCode::Destroyed,
            NavError::Config(_) => ErrorCode::Config,
            NavError::Surface(_) => ErrorCode::Dom,
        };
        Self::new(code, err.to_string())
    }
}

impl From<ConfigError> for ReadNavError {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorCode::Config, err.to_string())
    }
}

impl From<SurfaceError> for ReadNavError {
    fn from(err: SurfaceError) -> Self {
        Self::new(ErrorCode::Dom, err.to_string())
    }
}

impl From<serde_wasm_bindgen::Error> for ReadNavError {
    fn from(err: serde_wasm_bindgen::Error) -> Self {
        Self::new(ErrorCode::Config, err.to_string())
    }
}

impl From<ReadNavError> for JsValue {
    fn from(err: ReadNavError) -> Self {
        let js_error = js_sys::Error::new(&err.message);
        js_sys::Reflect::set(
            &js_error,
            &"code".into(),
            &JsValue::from_str(err.code.as_str()),
        )
        .ok();
        js_error.into()
    }
}
