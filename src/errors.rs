use std::error::Error;
use std::fmt;
use thiserror::Error;

use crate::validation::ValidationError;

#[derive(Error, Debug)]
pub enum YouTubeError {
    #[error("Bad request data: {}", BadRequestList(.0))]
    BadRequestData(Vec<ValidationError>),
    #[error("Network error (status {}): {message}", status_label(.status_code))]
    Network {
        status_code: Option<u16>,
        message: String,
    },
    #[error("Could not extract {response_type}: {step}")]
    ResponseExtraction {
        response_type: &'static str,
        step: String,
    },
    #[error("Account connection required: {0}")]
    AccountConnection(String),
    #[error("Continuation token is not defined")]
    ContinuationNotDefined,
    #[error("Other error: {0}")]
    Other(Box<dyn Error + Send + Sync>),
}

impl YouTubeError {
    pub fn is_bad_request(&self) -> bool {
        matches!(self, YouTubeError::BadRequestData(_))
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            YouTubeError::Network { status_code, .. } => *status_code,
            _ => None,
        }
    }
}

/// Raised by a decoder when no reasonable empty value exists for the payload.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct DecodeError(pub String);

impl DecodeError {
    pub fn new(step: impl Into<String>) -> Self {
        DecodeError(step.into())
    }
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

struct BadRequestList<'a>(&'a [ValidationError]);

impl fmt::Display for BadRequestList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", e)?;
        }
        Ok(())
    }
}

fn status_label(status_code: &Option<u16>) -> String {
    match status_code {
        Some(code) => code.to_string(),
        None => "none".to_string(),
    }
}
