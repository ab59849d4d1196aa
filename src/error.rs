//! Everything that can go wrong while downloading a calendar

use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

/// The kind of a transport-level failure
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportFault {
    /// The server could not be reached
    Connect,
    /// The (resolved) calendar URL is not a valid URL
    InvalidUrl,
    /// The configured timeout was exceeded
    Timeout,
    /// Any other failure of the HTTP exchange
    Protocol,
}

impl fmt::Display for TransportFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let descr = match self {
            TransportFault::Connect => "connection error",
            TransportFault::InvalidUrl => "invalid URL",
            TransportFault::Timeout => "timeout",
            TransportFault::Protocol => "HTTP error",
        };
        write!(f, "{}", descr)
    }
}

/// A failed download attempt
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("unexpected HTTP status code {0}")]
    Status(StatusCode),

    #[error("unable to decode the response body: {0}")]
    Decode(String),

    #[error("{kind}: {message}")]
    Transport { kind: TransportFault, message: String },
}

impl FetchError {
    pub fn transport<S: ToString>(kind: TransportFault, message: S) -> Self {
        FetchError::Transport { kind, message: message.to_string() }
    }

    /// The kind of transport failure, if this is one
    pub fn transport_fault(&self) -> Option<TransportFault> {
        match self {
            FetchError::Transport { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

impl From<url::ParseError> for FetchError {
    fn from(err: url::ParseError) -> Self {
        FetchError::transport(TransportFault::InvalidUrl, err)
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        // Order matters: a timeout while connecting is reported as both
        if err.is_timeout() {
            FetchError::transport(TransportFault::Timeout, err)
        } else if err.is_builder() {
            FetchError::transport(TransportFault::InvalidUrl, err)
        } else if err.is_connect() {
            FetchError::transport(TransportFault::Connect, err)
        } else if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else if let (true, Some(status)) = (err.is_status(), err.status()) {
            FetchError::Status(status)
        } else {
            FetchError::transport(TransportFault::Protocol, err)
        }
    }
}
